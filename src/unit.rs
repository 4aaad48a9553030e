//! The shared playback state machine. Every [`Unit`] — leaf [`crate::tween::TweenData`]
//! or composite [`crate::timeline::TimelineData`] — advances through the
//! same START/RUN/FINISHED loop; only the RUN-tick effect (write a value vs.
//! forward time to children) and the value-pinning hook differ by kind.

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::rc::Rc;

use crate::accessor::AccessorRegistry;
use crate::callback::{CallbackTable, EventKind, EventMask, UpdateHooks};
use crate::error::{Error, Result};
use crate::timeline::TimelineData;
use crate::tween::{PinValues, TweenData};

#[cfg(feature = "log")]
use log::trace;

const INSTANT_EPSILON: f32 = 1e-6;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    Invalid,
    Start,
    Run,
    Finished,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
}

/// The order children are pinned in, when a composite recurses into more
/// than one unit that may target the same `(target, tween_type)` slot.
/// `Reverse` means the first-registered child is applied last (and so
/// wins); `Forward` means the last-registered child wins.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PinOrder {
    Forward,
    Reverse,
}

/// Fields shared by every unit kind, matching `spec.md §3`'s `Unit` base.
pub struct Base {
    pub(crate) state: State,
    pub(crate) direction: Direction,
    pub(crate) current_time: f32,
    pub(crate) duration: f32,
    pub(crate) start_delay: f32,
    pub(crate) repeat_delay: f32,
    pub(crate) repeat_count_orig: i32,
    pub(crate) repeat_count: i32,
    pub(crate) can_auto_reverse: bool,
    pub(crate) is_in_auto_reverse: bool,
    pub(crate) is_paused: bool,
    pub(crate) is_killed: bool,
    pub(crate) is_initialized: bool,
    pub(crate) can_trigger_begin_event: bool,
    pub(crate) is_during_update: bool,
    pub(crate) user_data: u64,
    pub(crate) callbacks: CallbackTable,
    pub(crate) update_hooks: UpdateHooks,
}

impl Base {
    fn new(duration: f32, start_delay: f32, repeat_delay: f32, repeat_count: i32) -> Self {
        Self {
            state: State::Start,
            direction: Direction::Forward,
            current_time: -start_delay,
            duration,
            start_delay,
            repeat_delay,
            repeat_count_orig: repeat_count,
            repeat_count,
            can_auto_reverse: false,
            is_in_auto_reverse: false,
            is_paused: false,
            is_killed: false,
            is_initialized: false,
            can_trigger_begin_event: true,
            is_during_update: false,
            user_data: 0,
            callbacks: CallbackTable::default(),
            update_hooks: UpdateHooks::default(),
        }
    }

    /// `-1.0` denotes an infinite duration (`repeatCountOrig == -1`).
    pub fn full_duration(&self) -> f32 {
        if self.repeat_count_orig >= 0 {
            self.start_delay + self.duration + (self.repeat_delay + self.duration) * self.repeat_count_orig as f32
        } else {
            -1.0
        }
    }

    pub fn is_finished(&self) -> bool {
        self.state == State::Finished
    }

    pub fn is_paused(&self) -> bool {
        self.is_paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.is_paused = paused;
    }

    pub fn kill(&mut self) {
        self.is_killed = true;
    }

    pub fn is_killed(&self) -> bool {
        self.is_killed
    }

    pub fn is_during_update(&self) -> bool {
        self.is_during_update
    }

    pub fn set_user_data(&mut self, user_data: u64) {
        self.user_data = user_data;
    }

    pub fn subscribe(&mut self, mask: impl Into<EventMask>, f: impl FnMut(EventKind, u64) + 'static) {
        self.callbacks.subscribe(mask, f);
    }

    pub fn on_update_begin(&mut self, f: impl FnMut(u64) + 'static) {
        self.update_hooks.on_begin(f);
    }

    pub fn on_update_end(&mut self, f: impl FnMut(u64) + 'static) {
        self.update_hooks.on_end(f);
    }

    pub fn set_repeat(&mut self, count: i32, delay: f32) -> Result<()> {
        if count < -1 {
            return Err(Error::BadArgument(format!("repeat count {count} must be >= -1")));
        }
        self.repeat_count_orig = count;
        self.repeat_count = count;
        self.repeat_delay = delay;
        self.can_auto_reverse = false;
        Ok(())
    }

    pub fn set_repeat_auto_reverse(&mut self, count: i32, delay: f32) -> Result<()> {
        self.set_repeat(count, delay)?;
        self.can_auto_reverse = true;
        Ok(())
    }

    /// Resets the unit, then jumps to the absolute time corresponding to
    /// `percentage` of its run interval, firing callbacks along the way.
    pub fn reset_for_progress(&mut self) {
        self.state = State::Start;
        self.direction = Direction::Forward;
        self.current_time = -self.start_delay;
        self.is_in_auto_reverse = false;
        self.repeat_count = self.repeat_count_orig;
    }

    pub(crate) fn progress_adjustment(&self, percentage: f32, reverse: bool) -> f32 {
        let percentage = percentage.clamp(0.0, 1.0);
        if reverse && self.can_auto_reverse {
            self.start_delay + self.duration + self.repeat_delay + (self.duration - percentage * self.duration)
        } else {
            self.start_delay + percentage * self.duration
        }
    }
}

pub(crate) enum UnitBody {
    Leaf(TweenData),
    Composite(TimelineData),
}

/// A playback entity: either a leaf [`crate::tween::TweenData`] or a
/// composite [`crate::timeline::TimelineData`], driven by the shared
/// [`Base`] state machine.
pub struct Unit {
    pub(crate) base: Base,
    pub(crate) body: UnitBody,
}

impl Unit {
    pub(crate) fn new_leaf(data: TweenData, duration: f32, start_delay: f32) -> Self {
        Self {
            base: Base::new(duration, start_delay, 0.0, 0),
            body: UnitBody::Leaf(data),
        }
    }

    pub(crate) fn new_composite(data: TimelineData) -> Self {
        Self {
            base: Base::new(0.0, 0.0, 0.0, 0),
            body: UnitBody::Composite(data),
        }
    }

    /// Builds a freestanding leaf unit from an already-configured
    /// [`TweenData`], without registering it with an
    /// [`crate::engine::Engine`]. Used to assemble timeline children — a
    /// [`TimelineData`] owns its children exclusively rather than sharing
    /// the engine's pool (`spec.md §3`).
    pub fn tween(data: TweenData, duration: f32) -> Result<Self> {
        if duration < 0.0 {
            return Err(Error::BadArgument(format!("duration {duration} must be >= 0")));
        }
        Ok(Self::new_leaf(data, duration, 0.0))
    }

    /// A freestanding, duration-0 unit that fires `f` once its start delay
    /// (if any) elapses — usable as a timer or timeline beacon.
    pub fn call(f: impl FnMut(u64) + 'static) -> Self {
        let mut unit = Self::new_leaf(TweenData::call(), 0.0, 0.0);
        unit.base.subscribe(EventKind::Start, move |_, user_data| f(user_data));
        unit
    }

    /// An empty, duration-0 marker unit with no side effects — usable as a
    /// pure offset placeholder inside a timeline.
    pub fn mark() -> Self {
        Self::new_leaf(TweenData::mark(), 0.0, 0.0)
    }

    pub fn base(&self) -> &Base {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut Base {
        &mut self.base
    }

    pub fn current_time(&self) -> f32 {
        self.base.current_time
    }

    pub fn state(&self) -> State {
        self.base.state
    }

    pub(crate) fn set_start_delay(&mut self, start_delay: f32) {
        debug_assert!(!self.base.is_initialized, "start_delay must be set before first run");
        self.base.start_delay = start_delay;
        self.base.current_time = -start_delay;
    }

    /// Sets this unit's start delay. Must be called before the unit's
    /// first `update` crosses into RUN — a [`TimelineData`] assigns this
    /// internally to stagger sequenced children, so hosts only need this
    /// for a standalone unit.
    pub fn delay(&mut self, seconds: f32) -> &mut Self {
        self.set_start_delay(seconds);
        self
    }

    pub fn full_duration(&self) -> f32 {
        self.base.full_duration()
    }

    /// Access to the leaf payload, for configuring a freshly created tween
    /// (`target`/`ease`/`waypoint`/...) before it first enters RUN. `None`
    /// if this unit is a [`TimelineData`] composite.
    pub fn as_tween_mut(&mut self) -> Option<&mut TweenData> {
        match &mut self.body {
            UnitBody::Leaf(data) => Some(data),
            UnitBody::Composite(_) => None,
        }
    }

    pub fn as_tween(&self) -> Option<&TweenData> {
        match &self.body {
            UnitBody::Leaf(data) => Some(data),
            UnitBody::Composite(_) => None,
        }
    }

    /// Access to the composite payload. `None` if this unit is a leaf
    /// [`TweenData`].
    pub fn as_timeline(&self) -> Option<&TimelineData> {
        match &self.body {
            UnitBody::Leaf(_) => None,
            UnitBody::Composite(data) => Some(data),
        }
    }

    /// Forces the `TypeId` used to resolve this leaf's accessor, for hosts
    /// whose target is stored behind a supertype or trait object that
    /// differs from the concrete type an accessor was registered under.
    /// Fails once the unit has already initialised its start values.
    pub fn cast(&mut self, type_id: TypeId) -> Result<&mut Self> {
        if self.base.is_initialized {
            return Err(Error::MisuseOrder("cast() called after the unit already initialised".into()));
        }
        match &mut self.body {
            UnitBody::Leaf(data) => {
                data.set_type_id(type_id);
                Ok(self)
            }
            UnitBody::Composite(_) => Err(Error::MisuseOrder("cast() has no effect on a composite unit".into())),
        }
    }

    pub fn contains_target(&self, target: &Rc<RefCell<dyn Any>>, tween_type: Option<i32>) -> bool {
        match &self.body {
            UnitBody::Leaf(data) => data.contains_target(target, tween_type),
            UnitBody::Composite(data) => data.contains_target(target, tween_type),
        }
    }

    fn initialize(&mut self, registry: &AccessorRegistry) -> Result<()> {
        match &mut self.body {
            UnitBody::Leaf(data) => data.initialize(registry),
            UnitBody::Composite(data) => {
                self.base.duration = data.duration();
                Ok(())
            }
        }
    }

    pub(crate) fn pin_values(&mut self, which: PinValues, order: PinOrder, registry: &AccessorRegistry) -> Result<()> {
        match &mut self.body {
            UnitBody::Leaf(data) => {
                let which = if which == PinValues::Start
                    && self.base.direction == Direction::Reverse
                    && self.base.duration <= INSTANT_EPSILON
                {
                    PinValues::Target
                } else {
                    which
                };
                data.pin(which, registry)
            }
            UnitBody::Composite(data) => data.pin_children(which, order, registry),
        }
    }

    fn run_update(&mut self, tick_delta: f32, registry: &AccessorRegistry) -> Result<()> {
        match &mut self.body {
            UnitBody::Leaf(data) => {
                let t = if self.base.duration <= INSTANT_EPSILON {
                    1.0
                } else {
                    self.base.current_time / self.base.duration
                };
                data.apply_run(t, registry)
            }
            UnitBody::Composite(data) => data.run_children(tick_delta, self.base.direction, registry),
        }
    }

    /// Advances local time by `delta` seconds, returning the unconsumed
    /// ("residual") delta — non-zero only when the unit fully terminated
    /// partway through this call.
    pub fn update(&mut self, delta: f32, registry: &AccessorRegistry) -> Result<f32> {
        if self.base.is_paused || self.base.is_killed {
            return Ok(delta);
        }

        self.base.update_hooks.fire_begin(self.base.user_data);
        self.base.is_during_update = true;

        let mut delta = if self.base.is_in_auto_reverse { -delta } else { delta };
        self.base.direction = if delta.is_sign_negative() {
            Direction::Reverse
        } else {
            Direction::Forward
        };

        let residual = self.run_loop(&mut delta, registry)?;

        self.base.is_during_update = false;
        self.base.update_hooks.fire_end(self.base.user_data);
        Ok(residual)
    }

    fn fire(&mut self, kind: EventKind) {
        #[cfg(feature = "log")]
        trace!("unit event {kind:?} at t={}", self.base.current_time);
        self.base.callbacks.fire(kind, self.base.user_data);
    }

    fn run_loop(&mut self, delta: &mut f32, registry: &AccessorRegistry) -> Result<f32> {
        loop {
            match self.base.direction {
                Direction::Forward => match self.base.state {
                    State::Start => {
                        let new_time = self.base.current_time + *delta;
                        if new_time <= 0.0 {
                            self.base.current_time = new_time;
                            return Ok(0.0);
                        }
                        self.base.current_time = 0.0;
                        if self.base.can_trigger_begin_event {
                            self.base.can_trigger_begin_event = false;
                            if !self.base.is_initialized {
                                self.initialize(registry)?;
                                self.base.is_initialized = true;
                            }
                            self.fire(EventKind::Begin);
                        }
                        self.fire(EventKind::Start);
                        self.pin_values(PinValues::Start, PinOrder::Reverse, registry)?;
                        self.base.state = State::Run;
                        *delta = new_time;
                    }
                    State::Run => {
                        let new_time = self.base.current_time + *delta;
                        if new_time < self.base.duration {
                            self.base.current_time = new_time;
                            let tick = *delta;
                            self.run_update(tick, registry)?;
                            return Ok(0.0);
                        }

                        // Deliver the remaining tick up to the boundary before
                        // finishing, so a composite's children reach their own
                        // completion instead of only getting pinned.
                        let tick_to_boundary = self.base.duration - self.base.current_time;
                        self.base.current_time = self.base.duration;
                        if tick_to_boundary != 0.0 {
                            self.run_update(tick_to_boundary, registry)?;
                        }
                        self.base.state = State::Finished;
                        *delta = new_time - self.base.duration;

                        if self.base.repeat_count == 0 {
                            self.pin_values(PinValues::Target, PinOrder::Reverse, registry)?;
                            self.fire(EventKind::End);
                            self.fire(EventKind::Complete);
                            self.base.repeat_count = self.base.repeat_count_orig;
                            self.base.is_in_auto_reverse = false;
                            self.base.can_trigger_begin_event = true;
                            return Ok(*delta);
                        } else if self.base.can_auto_reverse {
                            if self.base.repeat_count > 0 {
                                self.base.repeat_count -= 1;
                            }
                            self.fire(EventKind::End);
                            self.fire(EventKind::Complete);
                            self.base.is_in_auto_reverse = !self.base.is_in_auto_reverse;
                            self.base.direction = Direction::Reverse;
                            self.base.state = State::Start;
                            self.base.current_time = self.base.duration;
                            self.base.current_time += self.base.repeat_delay;
                            *delta = -*delta;
                        } else {
                            if self.base.repeat_count > 0 {
                                self.base.repeat_count -= 1;
                            }
                            self.fire(EventKind::End);
                            self.base.state = State::Start;
                            self.base.current_time = -self.base.repeat_delay + *delta;
                            *delta = 0.0;
                        }
                    }
                    State::Finished => {
                        let new_time = self.base.current_time + *delta;
                        if new_time > 0.0 && new_time <= self.base.duration {
                            self.base.state = State::Start;
                        } else {
                            self.base.current_time = new_time;
                            return Ok(0.0);
                        }
                    }
                    State::Invalid => {
                        return Err(Error::Internal("update() called on an invalid unit".into()));
                    }
                },
                Direction::Reverse => match self.base.state {
                    State::Start => {
                        let new_time = self.base.current_time + *delta;
                        if new_time >= self.base.duration {
                            self.base.current_time = new_time;
                            return Ok(0.0);
                        }
                        self.base.current_time = self.base.duration;
                        if self.base.can_trigger_begin_event {
                            self.base.can_trigger_begin_event = false;
                            if !self.base.is_initialized {
                                self.initialize(registry)?;
                                self.base.is_initialized = true;
                            }
                            self.fire(EventKind::BackBegin);
                        }
                        self.fire(EventKind::BackStart);
                        self.pin_values(PinValues::Target, PinOrder::Forward, registry)?;
                        self.base.state = State::Run;
                        *delta = -(self.base.duration - new_time);
                    }
                    State::Run => {
                        let new_time = self.base.current_time + *delta;
                        if new_time > 0.0 {
                            self.base.current_time = new_time;
                            let tick = *delta;
                            self.run_update(tick, registry)?;
                            return Ok(0.0);
                        }

                        // Symmetric to the forward branch: deliver the last
                        // tick before finishing rather than only pinning.
                        let tick_to_boundary = 0.0 - self.base.current_time;
                        self.base.current_time = 0.0;
                        if tick_to_boundary != 0.0 {
                            self.run_update(tick_to_boundary, registry)?;
                        }
                        self.base.state = State::Finished;
                        *delta = new_time;

                        if self.base.repeat_count == 0 {
                            self.pin_values(PinValues::Start, PinOrder::Forward, registry)?;
                            self.fire(EventKind::BackEnd);
                            self.fire(EventKind::BackComplete);
                            self.base.repeat_count = self.base.repeat_count_orig;
                            self.base.is_in_auto_reverse = false;
                            self.base.can_trigger_begin_event = true;
                            return Ok(*delta);
                        } else if self.base.can_auto_reverse {
                            if self.base.repeat_count > 0 {
                                self.base.repeat_count -= 1;
                            }
                            self.fire(EventKind::BackEnd);
                            self.fire(EventKind::BackComplete);
                            self.base.is_in_auto_reverse = !self.base.is_in_auto_reverse;
                            self.base.direction = Direction::Forward;
                            self.base.state = State::Start;
                            self.base.current_time = 0.0;
                            self.base.current_time -= self.base.repeat_delay;
                            *delta = -*delta;
                        } else {
                            if self.base.repeat_count > 0 {
                                self.base.repeat_count -= 1;
                            }
                            // Matches the source engine this spec distills: the
                            // reverse linear-repeat boundary fires the forward
                            // END listeners, not BACK_END.
                            self.fire(EventKind::End);
                            self.base.state = State::Start;
                            self.base.current_time = new_time + self.base.repeat_delay;
                            *delta = 0.0;
                        }
                    }
                    State::Finished => {
                        let new_time = self.base.current_time + *delta;
                        if new_time >= 0.0 && new_time < self.base.duration {
                            self.base.state = State::Start;
                        } else {
                            self.base.current_time = new_time;
                            return Ok(0.0);
                        }
                    }
                    State::Invalid => {
                        return Err(Error::Internal("update() called on an invalid unit".into()));
                    }
                },
            }
        }
    }

    /// Resets the unit and jumps directly to the absolute position implied
    /// by `percentage` of its run interval, in the requested direction.
    /// Callbacks fire normally during the underlying `update` call.
    pub fn set_progress(&mut self, percentage: f32, reverse: bool, registry: &AccessorRegistry) -> Result<()> {
        if !(0.0..=1.0).contains(&percentage) {
            return Err(Error::BadArgument(format!("setProgress percentage {percentage} outside [0, 1]")));
        }
        self.base.reset_for_progress();
        let adjustment = self.base.progress_adjustment(percentage, reverse);
        self.update(adjustment, registry)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::Accessor;
    use crate::easing::EaseFunction;
    use std::any::TypeId;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Scalar(f32);

    struct ScalarAccessor;
    impl Accessor for ScalarAccessor {
        fn get_values(&self, target: &dyn Any, _tween_type: i32, out: &mut [f32]) -> usize {
            out[0] = target.downcast_ref::<Scalar>().unwrap().0;
            1
        }
        fn set_values(&self, target: &mut dyn Any, _tween_type: i32, values: &[f32]) {
            target.downcast_mut::<Scalar>().unwrap().0 = values[0];
        }
    }

    fn registry() -> AccessorRegistry {
        let mut r = AccessorRegistry::new();
        r.register::<Scalar>(ScalarAccessor);
        r
    }

    fn linear_tween(target: &Rc<RefCell<dyn Any>>, duration: f32) -> Unit {
        let mut data = TweenData::to(target.clone(), TypeId::of::<Scalar>(), 1);
        data.target(&[1.0]).unwrap();
        data.ease(EaseFunction::Linear);
        Unit::new_leaf(data, duration, 0.0)
    }

    #[test]
    fn s1_four_quarter_updates_complete_exactly_at_boundary() {
        let target: Rc<RefCell<dyn Any>> = Rc::new(RefCell::new(Scalar(0.0)));
        let reg = registry();
        let mut unit = linear_tween(&target, 1.0);

        let events = Rc::new(RefCell::new(Vec::new()));
        let e = events.clone();
        unit.base.subscribe(EventMask::ANY, move |k, _| e.borrow_mut().push(k));

        for _ in 0..3 {
            let residual = unit.update(0.25, &reg).unwrap();
            assert_eq!(residual, 0.0);
        }
        assert_eq!(target.borrow().downcast_ref::<Scalar>().unwrap().0, 0.75);
        assert!(!unit.base.is_finished());

        let residual = unit.update(0.25, &reg).unwrap();
        assert_eq!(residual, 0.0);
        assert_eq!(target.borrow().downcast_ref::<Scalar>().unwrap().0, 1.0);
        assert!(unit.base.is_finished());

        let ev = events.borrow();
        assert_eq!(ev[0], EventKind::Begin);
        assert_eq!(ev[1], EventKind::Start);
        assert_eq!(ev[ev.len() - 2], EventKind::End);
        assert_eq!(ev[ev.len() - 1], EventKind::Complete);
    }

    #[test]
    fn s2_start_delay_holds_value_until_crossed() {
        let target: Rc<RefCell<dyn Any>> = Rc::new(RefCell::new(Scalar(0.0)));
        let reg = registry();
        let mut data = TweenData::to(target.clone(), TypeId::of::<Scalar>(), 1);
        data.target(&[1.0]).unwrap();
        data.ease(EaseFunction::Linear);
        let mut unit = Unit::new_leaf(data, 1.0, 0.5);

        unit.update(0.3, &reg).unwrap();
        assert_eq!(target.borrow().downcast_ref::<Scalar>().unwrap().0, 0.0);
        assert!(!unit.base.is_initialized);

        unit.update(0.3, &reg).unwrap();
        assert!(unit.base.is_initialized);
    }

    #[test]
    fn finite_linear_repeat_fires_begin_once_and_start_per_iteration() {
        let target: Rc<RefCell<dyn Any>> = Rc::new(RefCell::new(Scalar(0.0)));
        let reg = registry();
        let mut unit = linear_tween(&target, 1.0);
        unit.base.set_repeat(2, 0.0).unwrap();

        let events = Rc::new(RefCell::new(Vec::new()));
        let e = events.clone();
        unit.base.subscribe(EventMask::ANY, move |k, _| e.borrow_mut().push(k));

        unit.update(3.0, &reg).unwrap();
        assert!(unit.base.is_finished());
        let ev = events.borrow();
        assert_eq!(ev.iter().filter(|k| **k == EventKind::Begin).count(), 1);
        assert_eq!(ev.iter().filter(|k| **k == EventKind::Start).count(), 3);
        assert_eq!(ev.iter().filter(|k| **k == EventKind::End).count(), 3);
        assert_eq!(ev.iter().filter(|k| **k == EventKind::Complete).count(), 1);
    }

    #[test]
    fn conservation_sum_of_small_deltas_matches_one_big_delta() {
        let target_a: Rc<RefCell<dyn Any>> = Rc::new(RefCell::new(Scalar(0.0)));
        let target_b: Rc<RefCell<dyn Any>> = Rc::new(RefCell::new(Scalar(0.0)));
        let reg = registry();

        let mut unit_a = linear_tween(&target_a, 1.0);
        unit_a.base.set_repeat(2, 0.5).unwrap();
        let mut unit_b = linear_tween(&target_b, 1.0);
        unit_b.base.set_repeat(2, 0.5).unwrap();

        unit_a.update(2.5, &reg).unwrap();
        for _ in 0..10 {
            unit_b.update(0.25, &reg).unwrap();
        }

        assert_eq!(unit_a.base.state, unit_b.base.state);
        assert!((unit_a.base.current_time - unit_b.base.current_time).abs() < 1e-4);
    }

    #[test]
    fn auto_reverse_single_repeat_ends_at_start_value() {
        let target: Rc<RefCell<dyn Any>> = Rc::new(RefCell::new(Scalar(0.0)));
        let reg = registry();
        let mut unit = linear_tween(&target, 1.0);
        unit.base.set_repeat_auto_reverse(1, 0.0).unwrap();

        let events = Rc::new(RefCell::new(Vec::new()));
        let e = events.clone();
        unit.base.subscribe(EventMask::ANY, move |k, _| e.borrow_mut().push(k));

        unit.update(2.0, &reg).unwrap();
        assert!(unit.base.is_finished());
        assert!((target.borrow().downcast_ref::<Scalar>().unwrap().0 - 0.0).abs() < 1e-4);
        let ev = events.borrow();
        assert!(ev.contains(&EventKind::BackEnd));
        assert!(ev.contains(&EventKind::BackComplete));
    }

    #[test]
    fn time_reversal_returns_to_start_delay_position() {
        let target: Rc<RefCell<dyn Any>> = Rc::new(RefCell::new(Scalar(0.0)));
        let reg = registry();
        let mut unit = linear_tween(&target, 1.0);

        unit.update(0.4, &reg).unwrap();
        unit.update(-0.4, &reg).unwrap();
        assert_eq!(unit.base.current_time, 0.0);
        assert_eq!(unit.base.state, State::Start);
    }

    #[test]
    fn set_progress_then_zero_update_matches_eased_value() {
        let target: Rc<RefCell<dyn Any>> = Rc::new(RefCell::new(Scalar(0.0)));
        let reg = registry();
        let mut unit = linear_tween(&target, 1.0);

        unit.set_progress(0.5, false, &reg).unwrap();
        assert!((target.borrow().downcast_ref::<Scalar>().unwrap().0 - 0.5).abs() < 1e-4);
    }
}
