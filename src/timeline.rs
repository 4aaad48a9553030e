//! The composite unit: sequences or parallelises child units.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use crate::accessor::AccessorRegistry;
use crate::error::{Error, Result};
use crate::tween::PinValues;
use crate::unit::{Direction, PinOrder, Unit};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimelineMode {
    Sequence,
    Parallel,
}

fn add_duration(a: f32, b: f32) -> f32 {
    if a < 0.0 || b < 0.0 {
        -1.0
    } else {
        a + b
    }
}

pub struct TimelineData {
    children: Vec<Unit>,
    mode: TimelineMode,
    cursor: f32,
}

impl TimelineData {
    pub fn new(mode: TimelineMode) -> Self {
        Self {
            children: Vec::new(),
            mode,
            cursor: 0.0,
        }
    }

    /// A child is appended at the current cursor offset (sequence: the
    /// cumulative duration of everything pushed so far; parallel: always
    /// zero), encoded directly as the child's own `start_delay` so the
    /// child's own state machine absorbs the wait without the timeline
    /// tracking "whose turn" separately.
    pub(crate) fn push_child(&mut self, mut child: Unit) {
        match self.mode {
            TimelineMode::Sequence => {
                child.set_start_delay(self.cursor);
                self.cursor = add_duration(self.cursor, child.full_duration());
            }
            TimelineMode::Parallel => {
                child.set_start_delay(0.0);
            }
        }
        self.children.push(child);
    }

    pub(crate) fn push_pause(&mut self, seconds: f32) {
        if self.mode == TimelineMode::Sequence {
            self.cursor = add_duration(self.cursor, seconds);
        }
    }

    /// `SEQUENCE`: the cumulative offset after the last child (equal to
    /// the sum of every child's `fullDuration` plus injected pauses).
    /// `PARALLEL`: the longest child's `fullDuration`.
    pub(crate) fn duration(&self) -> f32 {
        match self.mode {
            TimelineMode::Sequence => self.cursor,
            TimelineMode::Parallel => self
                .children
                .iter()
                .map(|c| c.full_duration())
                .fold(0.0_f32, |acc, d| if acc < 0.0 || d < 0.0 { -1.0 } else { acc.max(d) }),
        }
    }

    pub(crate) fn contains_target(&self, target: &Rc<RefCell<dyn Any>>, tween_type: Option<i32>) -> bool {
        self.children.iter().any(|c| c.contains_target(target, tween_type))
    }

    pub(crate) fn run_children(&mut self, delta: f32, direction: Direction, registry: &AccessorRegistry) -> Result<()> {
        match direction {
            Direction::Forward => {
                for child in self.children.iter_mut() {
                    child.update(delta, registry)?;
                }
            }
            Direction::Reverse => {
                for child in self.children.iter_mut().rev() {
                    child.update(delta, registry)?;
                }
            }
        }
        Ok(())
    }

    pub(crate) fn pin_children(&mut self, which: PinValues, order: PinOrder, registry: &AccessorRegistry) -> Result<()> {
        match order {
            PinOrder::Forward => {
                for child in self.children.iter_mut() {
                    child.pin_values(which, order, registry)?;
                }
            }
            PinOrder::Reverse => {
                for child in self.children.iter_mut().rev() {
                    child.pin_values(which, order, registry)?;
                }
            }
        }
        Ok(())
    }

    pub fn children(&self) -> &[Unit] {
        &self.children
    }
}

/// Fluent, nestable constructor for a [`TimelineData`] tree: `begin_sequence`
/// / `begin_parallel` open a nested child timeline inline; `end` closes it
/// and appends it to whichever level is now on top.
pub struct TimelineBuilder {
    stack: Vec<TimelineData>,
}

impl TimelineBuilder {
    pub fn create_sequential() -> Self {
        Self {
            stack: vec![TimelineData::new(TimelineMode::Sequence)],
        }
    }

    pub fn create_parallel() -> Self {
        Self {
            stack: vec![TimelineData::new(TimelineMode::Parallel)],
        }
    }

    pub fn push(&mut self, child: Unit) -> &mut Self {
        self.stack
            .last_mut()
            .expect("stack always has at least one level")
            .push_child(child);
        self
    }

    pub fn push_pause(&mut self, seconds: f32) -> &mut Self {
        self.stack
            .last_mut()
            .expect("stack always has at least one level")
            .push_pause(seconds);
        self
    }

    pub fn begin_sequence(&mut self) -> &mut Self {
        self.stack.push(TimelineData::new(TimelineMode::Sequence));
        self
    }

    pub fn begin_parallel(&mut self) -> &mut Self {
        self.stack.push(TimelineData::new(TimelineMode::Parallel));
        self
    }

    pub fn end(&mut self) -> Result<&mut Self> {
        if self.stack.len() < 2 {
            return Err(Error::MisuseOrder(
                "end() called without a matching begin_sequence/begin_parallel".into(),
            ));
        }
        let nested = self.stack.pop().expect("checked len above");
        self.stack
            .last_mut()
            .expect("checked len above")
            .push_child(Unit::new_composite(nested));
        Ok(self)
    }

    /// Finalises the builder into a top-level [`Unit`]. Fails if a nested
    /// `begin_sequence`/`begin_parallel` was never closed with `end()`.
    pub fn finish(mut self) -> Result<Unit> {
        if self.stack.len() != 1 {
            return Err(Error::MisuseOrder(
                "finish() called with an unmatched begin_sequence/begin_parallel".into(),
            ));
        }
        Ok(Unit::new_composite(self.stack.pop().expect("len == 1")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::{Accessor, AccessorRegistry};
    use crate::easing::EaseFunction;
    use crate::tween::TweenData;
    use std::any::TypeId;

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

    fn tween_unit(target: &Rc<RefCell<dyn Any>>, duration: f32) -> Unit {
        let mut data = TweenData::to(target.clone(), TypeId::of::<Scalar>(), 1);
        data.target(&[1.0]).unwrap();
        data.ease(EaseFunction::Linear);
        Unit::new_leaf(data, duration, 0.0)
    }

    #[test]
    fn s5_sequence_holds_second_child_during_pause() {
        let a: Rc<RefCell<dyn Any>> = Rc::new(RefCell::new(Scalar(0.0)));
        let b: Rc<RefCell<dyn Any>> = Rc::new(RefCell::new(Scalar(0.0)));
        let reg = registry();

        let mut builder = TimelineBuilder::create_sequential();
        builder.push(tween_unit(&a, 1.0));
        builder.push_pause(0.5);
        builder.push(tween_unit(&b, 1.0));
        let mut timeline = builder.finish().unwrap();

        timeline.update(1.25, &reg).unwrap();

        assert_eq!(a.borrow().downcast_ref::<Scalar>().unwrap().0, 1.0);
        assert_eq!(b.borrow().downcast_ref::<Scalar>().unwrap().0, 0.0);
    }

    #[test]
    fn s6_parallel_children_advance_independently() {
        let a: Rc<RefCell<dyn Any>> = Rc::new(RefCell::new(Scalar(0.0)));
        let b: Rc<RefCell<dyn Any>> = Rc::new(RefCell::new(Scalar(0.0)));
        let reg = registry();

        let mut builder = TimelineBuilder::create_parallel();
        builder.push(tween_unit(&a, 1.0));
        builder.push(tween_unit(&b, 2.0));
        let mut timeline = builder.finish().unwrap();

        timeline.update(1.0, &reg).unwrap();

        assert_eq!(a.borrow().downcast_ref::<Scalar>().unwrap().0, 1.0);
        assert!((b.borrow().downcast_ref::<Scalar>().unwrap().0 - 0.5).abs() < 1e-4);
    }

    #[test]
    fn nested_sequence_inside_parallel_is_supported() {
        let a: Rc<RefCell<dyn Any>> = Rc::new(RefCell::new(Scalar(0.0)));
        let b: Rc<RefCell<dyn Any>> = Rc::new(RefCell::new(Scalar(0.0)));
        let reg = registry();

        let mut builder = TimelineBuilder::create_parallel();
        builder.begin_sequence();
        builder.push(tween_unit(&a, 1.0));
        builder.push(tween_unit(&b, 1.0));
        builder.end().unwrap();
        let mut timeline = builder.finish().unwrap();

        timeline.update(1.0, &reg).unwrap();
        assert_eq!(a.borrow().downcast_ref::<Scalar>().unwrap().0, 1.0);
        assert_eq!(b.borrow().downcast_ref::<Scalar>().unwrap().0, 0.0);
    }

    #[test]
    fn unmatched_end_is_misuse_order() {
        let mut builder = TimelineBuilder::create_sequential();
        let err = builder.end().unwrap_err();
        assert!(matches!(err, Error::MisuseOrder(_)));
    }
}
