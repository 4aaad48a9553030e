//! The host-implemented adapter between a [`crate::tween::Tween`] and the
//! arbitrary target object it drives.

use std::any::{Any, TypeId};

use rustc_hash::FxHashMap;

use crate::error::{Error, Result};

/// Reads and writes a target's float attributes for one `tween_type`
/// channel (e.g. position vs. scale on the same target type).
///
/// Buffers are owned by the calling [`crate::tween::Tween`] and reused
/// across ticks; implementations must not retain a reference to them.
pub trait Accessor: Send + Sync {
    /// Reads the target's current values for `tween_type` into `out`,
    /// returning the number of values written. The returned count becomes
    /// the tween's `combinedAttrsCnt` and must not exceed `out.len()`.
    fn get_values(&self, target: &dyn Any, tween_type: i32, out: &mut [f32]) -> usize;

    /// Writes `values` back onto the target for `tween_type`.
    fn set_values(&self, target: &mut dyn Any, tween_type: i32, values: &[f32]);
}

/// Resolves an [`Accessor`] for a target's concrete type, registered once
/// up front by the host.
///
/// Keyed by `TypeId` rather than walking a class/trait hierarchy at
/// lookup time — the engine does no runtime type-walking; a host that
/// wants a supertype's accessor to cover several concrete types must
/// register it once per concrete `TypeId`.
#[derive(Default)]
pub struct AccessorRegistry {
    accessors: FxHashMap<TypeId, Box<dyn Accessor>>,
}

impl AccessorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T: Any>(&mut self, accessor: impl Accessor + 'static) {
        self.accessors.insert(TypeId::of::<T>(), Box::new(accessor));
    }

    pub fn get(&self, type_id: TypeId) -> Result<&dyn Accessor> {
        self.accessors
            .get(&type_id)
            .map(|boxed| boxed.as_ref())
            .ok_or(Error::MissingAccessor { type_id })
    }

    pub fn contains(&self, type_id: TypeId) -> bool {
        self.accessors.contains_key(&type_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Point {
        x: f32,
        y: f32,
    }

    struct PointAccessor;

    const XY: i32 = 1;

    impl Accessor for PointAccessor {
        fn get_values(&self, target: &dyn Any, tween_type: i32, out: &mut [f32]) -> usize {
            assert_eq!(tween_type, XY);
            let p = target.downcast_ref::<Point>().unwrap();
            out[0] = p.x;
            out[1] = p.y;
            2
        }

        fn set_values(&self, target: &mut dyn Any, tween_type: i32, values: &[f32]) {
            assert_eq!(tween_type, XY);
            let p = target.downcast_mut::<Point>().unwrap();
            p.x = values[0];
            p.y = values[1];
        }
    }

    #[test]
    fn registered_type_round_trips_through_dyn_any() {
        let mut registry = AccessorRegistry::new();
        registry.register::<Point>(PointAccessor);

        let mut point = Point { x: 0.0, y: 0.0 };
        let accessor = registry.get(TypeId::of::<Point>()).unwrap();

        let mut buf = [0.0; 2];
        let n = accessor.get_values(&point, XY, &mut buf);
        assert_eq!(n, 2);
        assert_eq!(buf, [0.0, 0.0]);

        accessor.set_values(&mut point, XY, &[3.0, 4.0]);
        assert_eq!((point.x, point.y), (3.0, 4.0));
    }

    #[test]
    fn unregistered_type_is_missing_accessor() {
        let registry = AccessorRegistry::new();
        let err = registry.get(TypeId::of::<Point>()).unwrap_err();
        assert!(matches!(err, Error::MissingAccessor { .. }));
    }
}
