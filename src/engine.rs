//! Owns the unit pool, the active-root list, and the accessor registry;
//! drives every top-level unit from a single `update` call per frame.

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::rc::Rc;

use instant::Instant;
use parking_lot::Mutex;

use crate::accessor::{Accessor, AccessorRegistry};
use crate::error::{Error, Result};
use crate::handle::{UnitHandle, UnitKind};
use crate::pool::Arena;
use crate::timeline::TimelineBuilder;
use crate::tween::TweenData;
use crate::unit::Unit;

#[cfg(feature = "log")]
use log::{trace, warn};

/// A lightweight "flush write / flush read" fence: a generation counter
/// bumped on exit from a public entry point and read on entry from
/// another. Gives visibility of prior mutations across threads without
/// providing mutual exclusion — concurrent mutation from multiple
/// threads remains undefined, matching `spec.md §5`.
#[derive(Default)]
struct PublicationBarrier {
    generation: Mutex<u64>,
}

impl PublicationBarrier {
    fn flush_read(&self) {
        let _ = *self.generation.lock();
    }

    fn flush_write(&self) {
        *self.generation.lock() += 1;
    }
}

pub struct EngineConfig {
    combined_attrs_limit: usize,
    waypoints_limit: usize,
    auto_start: bool,
    auto_remove: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            combined_attrs_limit: crate::tween::DEFAULT_COMBINED_ATTRS_LIMIT,
            waypoints_limit: crate::tween::DEFAULT_WAYPOINTS_LIMIT,
            auto_start: true,
            auto_remove: true,
        }
    }
}

/// Builder for an [`Engine`]. Limits and accessor registrations must be
/// finished here: `Engine` rejects changing `combined_attrs_limit` or
/// `waypoints_limit` once any unit has been created.
pub struct EngineBuilder {
    config: EngineConfig,
    registry: AccessorRegistry,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            registry: AccessorRegistry::new(),
        }
    }

    pub fn combined_attrs_limit(mut self, n: usize) -> Self {
        self.config.combined_attrs_limit = n;
        self
    }

    pub fn waypoints_limit(mut self, n: usize) -> Self {
        self.config.waypoints_limit = n;
        self
    }

    pub fn auto_start(mut self, enabled: bool) -> Self {
        self.config.auto_start = enabled;
        self
    }

    pub fn auto_remove(mut self, enabled: bool) -> Self {
        self.config.auto_remove = enabled;
        self
    }

    pub fn register_accessor<T: Any>(mut self, accessor: impl Accessor + 'static) -> Self {
        self.registry.register::<T>(accessor);
        self
    }

    pub fn build(self) -> Engine {
        Engine {
            config: self.config,
            registry: self.registry,
            units: Arena::new(),
            active: Vec::new(),
            is_paused: false,
            last_update: None,
            barrier: PublicationBarrier::default(),
            units_ever_created: 0,
        }
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Drives every top-level [`Unit`] added to it. Tweens and timelines are
/// kept in one pool (a timeline's children are owned inline, not pooled
/// separately — see `DESIGN.md`); `UnitHandle::kind` is carried only for
/// host-side introspection.
pub struct Engine {
    config: EngineConfig,
    registry: AccessorRegistry,
    units: Arena<Unit>,
    active: Vec<UnitHandle>,
    is_paused: bool,
    last_update: Option<Instant>,
    barrier: PublicationBarrier,
    units_ever_created: u64,
}

impl Engine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    fn assert_no_units_yet(&self) -> Result<()> {
        if self.units_ever_created > 0 {
            return Err(Error::MisuseOrder(
                "engine-wide limits cannot change after a unit has been created".into(),
            ));
        }
        Ok(())
    }

    pub fn set_combined_attrs_limit(&mut self, n: usize) -> Result<()> {
        self.assert_no_units_yet()?;
        self.config.combined_attrs_limit = n;
        Ok(())
    }

    pub fn set_waypoints_limit(&mut self, n: usize) -> Result<()> {
        self.assert_no_units_yet()?;
        self.config.waypoints_limit = n;
        Ok(())
    }

    pub fn register_accessor<T: Any>(&mut self, accessor: impl Accessor + 'static) {
        self.registry.register::<T>(accessor);
    }

    fn insert(&mut self, unit: Unit, kind: UnitKind) -> UnitHandle {
        self.units_ever_created += 1;
        let index = self.units.insert(unit);
        let handle = UnitHandle::new(index, kind);
        if self.config.auto_start {
            self.active.push(handle);
        }
        handle
    }

    pub fn to(&mut self, target: Rc<RefCell<dyn Any>>, type_id: TypeId, tween_type: i32, duration: f32) -> Result<UnitHandle> {
        if duration < 0.0 {
            return Err(Error::BadArgument(format!("duration {duration} must be >= 0")));
        }
        let data = TweenData::to_with_limits(
            target,
            type_id,
            tween_type,
            self.config.combined_attrs_limit,
            self.config.waypoints_limit,
        );
        Ok(self.insert(Unit::new_leaf(data, duration, 0.0), UnitKind::Tween))
    }

    pub fn from(&mut self, target: Rc<RefCell<dyn Any>>, type_id: TypeId, tween_type: i32, duration: f32) -> Result<UnitHandle> {
        if duration < 0.0 {
            return Err(Error::BadArgument(format!("duration {duration} must be >= 0")));
        }
        let data = TweenData::from_with_limits(
            target,
            type_id,
            tween_type,
            self.config.combined_attrs_limit,
            self.config.waypoints_limit,
        );
        Ok(self.insert(Unit::new_leaf(data, duration, 0.0), UnitKind::Tween))
    }

    pub fn set(&mut self, target: Rc<RefCell<dyn Any>>, type_id: TypeId, tween_type: i32) -> Result<UnitHandle> {
        let data = TweenData::set_with_limits(
            target,
            type_id,
            tween_type,
            self.config.combined_attrs_limit,
            self.config.waypoints_limit,
        );
        Ok(self.insert(Unit::new_leaf(data, 0.0, 0.0), UnitKind::Tween))
    }

    pub fn call(&mut self, f: impl FnMut(u64) + 'static) -> UnitHandle {
        let data = TweenData::call();
        let mut unit = Unit::new_leaf(data, 0.0, 0.0);
        unit.base_mut()
            .subscribe(crate::callback::EventKind::Start, move |_, user_data| f(user_data));
        self.insert(unit, UnitKind::Tween)
    }

    pub fn mark(&mut self) -> UnitHandle {
        let data = TweenData::mark();
        self.insert(Unit::new_leaf(data, 0.0, 0.0), UnitKind::Tween)
    }

    pub fn add_timeline(&mut self, builder: TimelineBuilder) -> Result<UnitHandle> {
        let unit = builder.finish()?;
        Ok(self.insert(unit, UnitKind::Timeline))
    }

    pub fn get(&self, handle: UnitHandle) -> Option<&Unit> {
        self.units.get(handle.index())
    }

    pub fn get_mut(&mut self, handle: UnitHandle) -> Option<&mut Unit> {
        self.units.get_mut(handle.index())
    }

    /// Attaches a unit to the active list (no-op if `auto_start` already
    /// did so at creation time).
    pub fn add(&mut self, handle: UnitHandle) {
        if !self.active.contains(&handle) {
            self.active.push(handle);
        }
    }

    /// Resets `handle`'s unit and jumps directly to the absolute position
    /// implied by `percentage` of its run interval, in the requested
    /// direction. Callbacks fire normally (`spec.md §4.1`'s `setProgress`).
    pub fn set_progress(&mut self, handle: UnitHandle, percentage: f32, reverse: bool) -> Result<()> {
        let registry = &self.registry;
        match self.units.get_mut(handle.index()) {
            Some(unit) => unit.set_progress(percentage, reverse, registry),
            None => Ok(()),
        }
    }

    pub fn reset_update_time(&mut self) {
        self.last_update = None;
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.is_paused = paused;
    }

    /// Advances every active root by `delta` seconds.
    pub fn update_by(&mut self, delta: f32) -> Result<()> {
        self.barrier.flush_read();
        if self.is_paused {
            self.barrier.flush_write();
            return Ok(());
        }

        for handle in self.active.clone() {
            if let Some(unit) = self.units.get_mut(handle.index()) {
                unit.update(delta, &self.registry)?;
            }
        }

        self.evict_finished();
        self.barrier.flush_write();
        Ok(())
    }

    /// Advances every active root using the wall-clock delta since the
    /// previous call (or zero, on the first call / right after
    /// [`Engine::reset_update_time`]).
    pub fn update(&mut self) -> Result<()> {
        let now = Instant::now();
        let delta = match self.last_update {
            Some(previous) => now.duration_since(previous).as_secs_f32(),
            None => 0.0,
        };
        self.last_update = Some(now);
        self.update_by(delta)
    }

    fn evict_finished(&mut self) {
        if !self.config.auto_remove {
            return;
        }
        let mut i = 0;
        while i < self.active.len() {
            let handle = self.active[i];
            let finished = self
                .units
                .get(handle.index())
                .map(|u| u.base().is_finished() && !u.base().is_during_update())
                .unwrap_or(true);
            if finished {
                self.active.swap_remove(i);
                self.units.remove(handle.index());
                #[cfg(feature = "log")]
                trace!("evicted finished unit {handle:?}");
            } else {
                i += 1;
            }
        }
    }

    pub fn cancel_all(&mut self) {
        for handle in &self.active {
            if let Some(unit) = self.units.get_mut(handle.index()) {
                unit.base_mut().kill();
            }
        }
        self.evict_killed();
    }

    pub fn cancel(&mut self, target: &Rc<RefCell<dyn Any>>, tween_type: Option<i32>) {
        for handle in &self.active {
            if let Some(unit) = self.units.get_mut(handle.index()) {
                if unit.contains_target(target, tween_type) {
                    unit.base_mut().kill();
                }
            }
        }
        self.evict_killed();
    }

    fn evict_killed(&mut self) {
        let mut i = 0;
        while i < self.active.len() {
            let handle = self.active[i];
            let evictable = self
                .units
                .get(handle.index())
                .map(|u| u.base().is_killed() && !u.base().is_during_update())
                .unwrap_or(true);
            if evictable {
                self.active.swap_remove(i);
                self.units.remove(handle.index());
                #[cfg(feature = "log")]
                warn!("cancelled and evicted unit {handle:?}");
            } else {
                i += 1;
            }
        }
    }

    pub fn size(&self) -> usize {
        self.units.len()
    }

    pub fn running_tweens_count(&self) -> usize {
        self.active
            .iter()
            .filter(|h| h.kind() == UnitKind::Tween)
            .filter(|h| self.units.get(h.index()).map(|u| !u.base().is_finished()).unwrap_or(false))
            .count()
    }

    pub fn running_timelines_count(&self) -> usize {
        self.active
            .iter()
            .filter(|h| h.kind() == UnitKind::Timeline)
            .filter(|h| self.units.get(h.index()).map(|u| !u.base().is_finished()).unwrap_or(false))
            .count()
    }

    pub fn objects(&self) -> impl Iterator<Item = (UnitHandle, &Unit)> {
        self.active
            .iter()
            .filter_map(move |h| self.units.get(h.index()).map(|u| (*h, u)))
    }
}
