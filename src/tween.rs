//! The leaf unit: interpolates one or more float attributes of a target
//! over a duration.

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::rc::Rc;

use crate::accessor::AccessorRegistry;
use crate::easing::{EaseFunction, Easing, Path};
use crate::error::{Error, Result};

pub(crate) const DEFAULT_COMBINED_ATTRS_LIMIT: usize = 8;
pub(crate) const DEFAULT_WAYPOINTS_LIMIT: usize = 8;

/// The value set a [`crate::unit::Unit::pin_values`] call writes through
/// the accessor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PinValues {
    Start,
    Target,
}

pub struct TweenData {
    target: Option<Rc<RefCell<dyn Any>>>,
    type_id: Option<TypeId>,
    tween_type: i32,
    easing: Easing,
    path: Option<Path>,
    is_from: bool,
    is_relative: bool,
    combined_attrs_count: usize,
    combined_attrs_limit: usize,
    waypoints_limit: usize,
    start_values: Vec<f32>,
    target_values: Vec<f32>,
    waypoints: Vec<f32>,
    accessor_buffer: Vec<f32>,
    path_buffer: Vec<f32>,
}

impl TweenData {
    fn new_with_limits(
        target: Option<Rc<RefCell<dyn Any>>>,
        type_id: Option<TypeId>,
        tween_type: i32,
        combined_attrs_limit: usize,
        waypoints_limit: usize,
    ) -> Self {
        Self {
            target,
            type_id,
            tween_type,
            easing: Easing::default(),
            path: None,
            is_from: false,
            is_relative: false,
            combined_attrs_count: 0,
            combined_attrs_limit,
            waypoints_limit,
            start_values: Vec::new(),
            target_values: Vec::new(),
            waypoints: Vec::new(),
            accessor_buffer: vec![0.0; combined_attrs_limit],
            path_buffer: Vec::new(),
        }
    }

    pub fn to(target: Rc<RefCell<dyn Any>>, type_id: TypeId, tween_type: i32) -> Self {
        Self::to_with_limits(
            target,
            type_id,
            tween_type,
            DEFAULT_COMBINED_ATTRS_LIMIT,
            DEFAULT_WAYPOINTS_LIMIT,
        )
    }

    pub fn to_with_limits(
        target: Rc<RefCell<dyn Any>>,
        type_id: TypeId,
        tween_type: i32,
        combined_attrs_limit: usize,
        waypoints_limit: usize,
    ) -> Self {
        Self::new_with_limits(
            Some(target),
            Some(type_id),
            tween_type,
            combined_attrs_limit,
            waypoints_limit,
        )
    }

    pub fn from(target: Rc<RefCell<dyn Any>>, type_id: TypeId, tween_type: i32) -> Self {
        Self::from_with_limits(
            target,
            type_id,
            tween_type,
            DEFAULT_COMBINED_ATTRS_LIMIT,
            DEFAULT_WAYPOINTS_LIMIT,
        )
    }

    pub fn from_with_limits(
        target: Rc<RefCell<dyn Any>>,
        type_id: TypeId,
        tween_type: i32,
        combined_attrs_limit: usize,
        waypoints_limit: usize,
    ) -> Self {
        let mut data = Self::to_with_limits(target, type_id, tween_type, combined_attrs_limit, waypoints_limit);
        data.is_from = true;
        data
    }

    pub fn set(target: Rc<RefCell<dyn Any>>, type_id: TypeId, tween_type: i32) -> Self {
        Self::to(target, type_id, tween_type)
    }

    pub fn set_with_limits(
        target: Rc<RefCell<dyn Any>>,
        type_id: TypeId,
        tween_type: i32,
        combined_attrs_limit: usize,
        waypoints_limit: usize,
    ) -> Self {
        Self::to_with_limits(target, type_id, tween_type, combined_attrs_limit, waypoints_limit)
    }

    pub fn call() -> Self {
        Self::new_with_limits(None, None, 0, DEFAULT_COMBINED_ATTRS_LIMIT, DEFAULT_WAYPOINTS_LIMIT)
    }

    pub fn mark() -> Self {
        Self::call()
    }

    pub fn target(&mut self, values: &[f32]) -> Result<&mut Self> {
        if values.len() > self.combined_attrs_limit {
            return Err(Error::BadArgument(format!(
                "target count {} exceeds combinedAttrsLimit {}",
                values.len(),
                self.combined_attrs_limit
            )));
        }
        self.target_values = values.to_vec();
        self.combined_attrs_count = values.len();
        Ok(self)
    }

    pub fn target_relative(&mut self, values: &[f32]) -> Result<&mut Self> {
        self.is_relative = true;
        self.target(values)
    }

    pub fn waypoint(&mut self, values: &[f32]) -> Result<&mut Self> {
        let n = self.combined_attrs_count.max(values.len());
        if self.waypoint_count() == self.waypoints_limit {
            return Err(Error::BadArgument(format!(
                "waypoint count already at waypointsLimit {}",
                self.waypoints_limit
            )));
        }
        if self.path.is_none() {
            self.path = Some(Path::default());
        }
        self.waypoints.extend_from_slice(values);
        debug_assert_eq!(self.waypoints.len() % n.max(1), 0);
        Ok(self)
    }

    fn waypoint_count(&self) -> usize {
        if self.combined_attrs_count == 0 {
            0
        } else {
            self.waypoints.len() / self.combined_attrs_count
        }
    }

    pub fn ease(&mut self, easing: impl Into<Easing>) -> &mut Self {
        self.easing = easing.into();
        self
    }

    pub fn path(&mut self, path: Path) -> &mut Self {
        self.path = Some(path);
        self
    }

    pub(crate) fn set_type_id(&mut self, type_id: TypeId) {
        self.type_id = Some(type_id);
    }

    pub(crate) fn has_target(&self) -> bool {
        self.target.is_some()
    }

    pub(crate) fn contains_target(&self, target: &Rc<RefCell<dyn Any>>, tween_type: Option<i32>) -> bool {
        match &self.target {
            Some(t) => Rc::ptr_eq(t, target) && tween_type.map_or(true, |ty| ty == self.tween_type),
            None => false,
        }
    }

    /// Lazy, once-per-lifetime setup: reads the current values via the
    /// accessor, then folds relative targets/waypoints onto them, then
    /// swaps start/target if this is a `from` tween.
    pub(crate) fn initialize(&mut self, registry: &AccessorRegistry) -> Result<()> {
        let Some(target) = &self.target else {
            return Ok(());
        };
        let type_id = self
            .type_id
            .expect("type_id is set whenever target is set");
        let accessor = registry.get(type_id)?;
        let target_ref = target.borrow();
        let n = accessor.get_values(&*target_ref, self.tween_type, &mut self.accessor_buffer);
        drop(target_ref);

        if n > self.combined_attrs_limit {
            return Err(Error::Internal(format!(
                "accessor wrote {n} values, exceeding combinedAttrsLimit {}",
                self.combined_attrs_limit
            )));
        }
        self.combined_attrs_count = self.combined_attrs_count.max(n);
        self.start_values = self.accessor_buffer[..n].to_vec();
        self.start_values.resize(self.combined_attrs_count, 0.0);
        self.target_values.resize(self.combined_attrs_count, 0.0);

        if self.is_relative {
            for i in 0..self.combined_attrs_count {
                self.target_values[i] += self.start_values[i];
            }
            let waypoint_count = self.waypoint_count();
            for w in 0..waypoint_count {
                for i in 0..self.combined_attrs_count {
                    self.waypoints[w * self.combined_attrs_count + i] += self.start_values[i];
                }
            }
        }

        if self.is_from {
            std::mem::swap(&mut self.start_values, &mut self.target_values);
        }

        Ok(())
    }

    pub(crate) fn pin(&mut self, which: PinValues, registry: &AccessorRegistry) -> Result<()> {
        let Some(target) = &self.target else {
            return Ok(());
        };
        let type_id = self
            .type_id
            .expect("type_id is set whenever target is set");
        let accessor = registry.get(type_id)?;
        let values = match which {
            PinValues::Start => &self.start_values,
            PinValues::Target => &self.target_values,
        };
        let mut target_ref = target.borrow_mut();
        accessor.set_values(&mut *target_ref, self.tween_type, values);
        Ok(())
    }

    /// RUN-tick: samples the easing/path at `t = current_time / duration`
    /// (caller passes the already-divided ratio) and writes the result.
    pub(crate) fn apply_run(&mut self, t: f32, registry: &AccessorRegistry) -> Result<()> {
        let Some(target) = self.target.clone() else {
            return Ok(());
        };
        let type_id = self
            .type_id
            .expect("type_id is set whenever target is set");
        let eased = self.easing.sample(t);
        let n = self.combined_attrs_count;
        let waypoint_count = self.waypoint_count();

        for i in 0..n {
            let value = if let (Some(path), true) = (&self.path, waypoint_count > 0) {
                self.path_buffer.clear();
                self.path_buffer.push(self.start_values[i]);
                for w in 0..waypoint_count {
                    self.path_buffer.push(self.waypoints[w * n + i]);
                }
                self.path_buffer.push(self.target_values[i]);
                path.sample(eased, &self.path_buffer)
            } else {
                self.start_values[i] + eased * (self.target_values[i] - self.start_values[i])
            };
            self.accessor_buffer[i] = value;
        }

        let accessor = registry.get(type_id)?;
        let mut target_ref = target.borrow_mut();
        accessor.set_values(&mut *target_ref, self.tween_type, &self.accessor_buffer[..n]);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::Accessor;

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

    #[test]
    fn lerp_halfway_with_linear_easing() {
        let target = Rc::new(RefCell::new(Scalar(0.0)));
        let reg = registry();
        let mut tween = TweenData::to(target.clone(), TypeId::of::<Scalar>(), 1);
        tween.target(&[10.0]).unwrap();
        tween.ease(EaseFunction::Linear);
        tween.initialize(&reg).unwrap();
        tween.apply_run(0.5, &reg).unwrap();
        assert_eq!(target.borrow().0, 5.0);
    }

    #[test]
    fn from_swaps_start_and_target_after_init() {
        let target = Rc::new(RefCell::new(Scalar(5.0)));
        let reg = registry();
        let mut tween = TweenData::from(target.clone(), TypeId::of::<Scalar>(), 1);
        tween.target(&[1.0]).unwrap();
        tween.initialize(&reg).unwrap();
        tween.pin(PinValues::Start, &reg).unwrap();
        assert_eq!(target.borrow().0, 1.0);
    }

    #[test]
    fn relative_target_is_folded_onto_start_at_init() {
        let target = Rc::new(RefCell::new(Scalar(2.0)));
        let reg = registry();
        let mut tween = TweenData::to(target.clone(), TypeId::of::<Scalar>(), 1);
        tween.target_relative(&[3.0]).unwrap();
        tween.initialize(&reg).unwrap();
        tween.pin(PinValues::Target, &reg).unwrap();
        assert_eq!(target.borrow().0, 5.0);
    }

    #[test]
    fn target_beyond_limit_is_bad_argument() {
        let target = Rc::new(RefCell::new(Scalar(0.0)));
        let mut tween = TweenData::to_with_limits(target, TypeId::of::<Scalar>(), 1, 1, 1);
        let err = tween.target(&[1.0, 2.0]).unwrap_err();
        assert!(matches!(err, Error::BadArgument(_)));
    }
}
