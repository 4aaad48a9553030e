//! `tempora` is a host-agnostic animation interpolation engine: it drives
//! arbitrary numeric attributes of arbitrary host objects from one value to
//! another over time, following configurable easing curves, and composes
//! such interpolations into hierarchical timelines that can be delayed,
//! repeated, auto-reversed, paused, resumed, scrubbed and cancelled.
//!
//! The crate does not know what a "frame" is — the host drives time by
//! calling [`Engine::update_by`] (or [`Engine::update`] for a wall-clock
//! delta) with whatever delta it wants, forward or backward. It does not
//! supply easing curves beyond a small built-in catalogue, does not touch
//! vectors or matrices, and performs no persistence or I/O: see `spec.md`
//! for the full scope this crate covers.
//!
//! ```
//! use std::any::{Any, TypeId};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use tempora::{Accessor, EaseFunction, Engine};
//!
//! struct Point { x: f32 }
//!
//! struct PointAccessor;
//! impl Accessor for PointAccessor {
//!     fn get_values(&self, target: &dyn Any, _tween_type: i32, out: &mut [f32]) -> usize {
//!         out[0] = target.downcast_ref::<Point>().unwrap().x;
//!         1
//!     }
//!     fn set_values(&self, target: &mut dyn Any, _tween_type: i32, values: &[f32]) {
//!         target.downcast_mut::<Point>().unwrap().x = values[0];
//!     }
//! }
//!
//! let mut engine = Engine::builder()
//!     .register_accessor::<Point>(PointAccessor)
//!     .build();
//!
//! let target: Rc<RefCell<dyn Any>> = Rc::new(RefCell::new(Point { x: 0.0 }));
//! let handle = engine.to(target.clone(), TypeId::of::<Point>(), 0, 1.0).unwrap();
//! let unit = engine.get_mut(handle).unwrap();
//! unit.as_tween_mut().unwrap().target(&[10.0]).unwrap().ease(EaseFunction::Linear);
//!
//! engine.update_by(1.0).unwrap();
//! assert_eq!(target.borrow().downcast_ref::<Point>().unwrap().x, 10.0);
//! ```

mod accessor;
mod callback;
mod easing;
mod engine;
mod error;
mod handle;
mod pool;
mod timeline;
mod tween;
mod unit;

pub use accessor::{Accessor, AccessorRegistry};
pub use callback::{EventKind, EventMask};
pub use easing::{EaseFunction, Easing, Path};
pub use engine::{Engine, EngineBuilder, EngineConfig};
pub use error::{Error, Result};
pub use handle::{UnitHandle, UnitKind};
pub use timeline::{TimelineBuilder, TimelineData, TimelineMode};
pub use tween::TweenData as Tween;
pub use unit::{Base, Direction, State, Unit};
