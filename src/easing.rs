//! Pure easing and path interpolation functions.
//!
//! These are treated as external, stateless collaborators by the engine:
//! `Easing::sample(t)` and `Path::sample(t, controls)` are pure functions of
//! their inputs and are never mutated by a running [`crate::tween::Tween`].
//! The curve catalogue here is intentionally small — a full curve/path
//! library is out of scope for this crate; `Easing::Custom` and
//! `Path::Custom` let a host plug in anything else.

use std::f32::consts::PI;
use std::sync::Arc;

const TAU: f32 = 2.0 * PI;

fn clamp01(p: f32) -> f32 {
    p.clamp(0.0, 1.0)
}

/// The well-known Penner easing curves, plus `Linear`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EaseFunction {
    Linear,
    QuadIn,
    QuadOut,
    QuadInOut,
    CubicIn,
    CubicOut,
    CubicInOut,
    SineIn,
    SineOut,
    SineInOut,
    BackIn,
    BackOut,
    BackInOut,
    BounceIn,
    BounceOut,
    BounceInOut,
}

impl EaseFunction {
    pub fn sample(self, t: f32) -> f32 {
        let p = clamp01(t);
        match self {
            EaseFunction::Linear => p,
            EaseFunction::QuadIn => p * p,
            EaseFunction::QuadOut => -(p * (p - 2.0)),
            EaseFunction::QuadInOut => {
                if p < 0.5 {
                    2.0 * p * p
                } else {
                    (-2.0 * p * p) + (4.0 * p) - 1.0
                }
            }
            EaseFunction::CubicIn => p * p * p,
            EaseFunction::CubicOut => {
                let f = p - 1.0;
                f * f * f + 1.0
            }
            EaseFunction::CubicInOut => {
                if p < 0.5 {
                    4.0 * p * p * p
                } else {
                    let f = (2.0 * p) - 2.0;
                    0.5 * f * f * f + 1.0
                }
            }
            EaseFunction::SineIn => ((p - 1.0) * TAU).sin() + 1.0,
            EaseFunction::SineOut => (p * TAU).sin(),
            EaseFunction::SineInOut => 0.5 * (1.0 - (p * PI).cos()),
            EaseFunction::BackIn => p * p * p - p * (p * PI).sin(),
            EaseFunction::BackOut => {
                let f = 1.0 - p;
                1.0 - (f * f * f - f * (f * PI).sin())
            }
            EaseFunction::BackInOut => {
                if p < 0.5 {
                    let f = 2.0 * p;
                    0.5 * (f * f * f - f * (f * PI).sin())
                } else {
                    let f = 1.0 - (2.0 * p - 1.0);
                    0.5 * (1.0 - (f * f * f - f * (f * PI).sin())) + 0.5
                }
            }
            EaseFunction::BounceIn => 1.0 - EaseFunction::BounceOut.sample(1.0 - p),
            EaseFunction::BounceOut => {
                if p < 4.0 / 11.0 {
                    (121.0 * p * p) / 16.0
                } else if p < 8.0 / 11.0 {
                    (363.0 / 40.0 * p * p) - (99.0 / 10.0 * p) + 17.0 / 5.0
                } else if p < 9.0 / 10.0 {
                    (4356.0 / 361.0 * p * p) - (35442.0 / 1805.0 * p) + 16061.0 / 1805.0
                } else {
                    (54.0 / 5.0 * p * p) - (513.0 / 25.0 * p) + 268.0 / 25.0
                }
            }
            EaseFunction::BounceInOut => {
                if p < 0.5 {
                    0.5 * EaseFunction::BounceIn.sample(p * 2.0)
                } else {
                    0.5 * EaseFunction::BounceOut.sample(p * 2.0 - 1.0) + 0.5
                }
            }
        }
    }
}

impl Default for EaseFunction {
    fn default() -> Self {
        EaseFunction::QuadInOut
    }
}

/// The eased-progress function a [`crate::tween::Tween`] samples each tick.
#[derive(Clone)]
pub enum Easing {
    Function(EaseFunction),
    /// A host-supplied curve, for anything the built-in catalogue doesn't cover.
    Custom(Arc<dyn Fn(f32) -> f32 + Send + Sync>),
}

impl Easing {
    pub fn sample(&self, t: f32) -> f32 {
        match self {
            Easing::Function(f) => f.sample(t),
            Easing::Custom(f) => f(t),
        }
    }
}

impl Default for Easing {
    fn default() -> Self {
        Easing::Function(EaseFunction::default())
    }
}

impl From<EaseFunction> for Easing {
    fn from(f: EaseFunction) -> Self {
        Easing::Function(f)
    }
}

impl std::fmt::Debug for Easing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Easing::Function(func) => f.debug_tuple("Easing::Function").field(func).finish(),
            Easing::Custom(_) => f.write_str("Easing::Custom(..)"),
        }
    }
}

/// Interpolates a single scalar among `controls.len()` control points, where
/// `controls[0]` is the start value and `controls[controls.len() - 1]` is the
/// target value; anything in between is a waypoint.
#[derive(Clone)]
pub enum Path {
    Linear,
    CatmullRom,
    Custom(Arc<dyn Fn(f32, &[f32]) -> f32 + Send + Sync>),
}

impl Default for Path {
    fn default() -> Self {
        Path::CatmullRom
    }
}

impl Path {
    /// `t` is the eased progress in `[0, 1]`; `controls` has at least 2 entries.
    pub fn sample(&self, t: f32, controls: &[f32]) -> f32 {
        debug_assert!(controls.len() >= 2);
        match self {
            Path::Linear => linear_segment(t, controls),
            Path::CatmullRom => catmull_rom_segment(t, controls),
            Path::Custom(f) => f(t, controls),
        }
    }
}

impl std::fmt::Debug for Path {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Path::Linear => f.write_str("Path::Linear"),
            Path::CatmullRom => f.write_str("Path::CatmullRom"),
            Path::Custom(_) => f.write_str("Path::Custom(..)"),
        }
    }
}

fn segment_index(t: f32, segments: usize) -> (usize, f32) {
    let scaled = clamp01(t) * segments as f32;
    let mut index = scaled.floor() as usize;
    if index >= segments {
        index = segments - 1;
    }
    (index, scaled - index as f32)
}

fn linear_segment(t: f32, controls: &[f32]) -> f32 {
    let segments = controls.len() - 1;
    let (index, local_t) = segment_index(t, segments);
    controls[index] + (controls[index + 1] - controls[index]) * local_t
}

fn catmull_rom_segment(t: f32, controls: &[f32]) -> f32 {
    let segments = controls.len() - 1;
    let (index, local_t) = segment_index(t, segments);

    let p0 = if index == 0 {
        controls[0]
    } else {
        controls[index - 1]
    };
    let p1 = controls[index];
    let p2 = controls[index + 1];
    let p3 = if index + 2 < controls.len() {
        controls[index + 2]
    } else {
        controls[controls.len() - 1]
    };

    catmull_rom(p0, p1, p2, p3, local_t)
}

fn catmull_rom(p0: f32, p1: f32, p2: f32, p3: f32, t: f32) -> f32 {
    let t2 = t * t;
    let t3 = t2 * t;
    0.5 * ((2.0 * p1)
        + (-p0 + p2) * t
        + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
        + (-p0 + 3.0 * p1 - 3.0 * p2 + p3) * t3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_is_identity() {
        assert_eq!(EaseFunction::Linear.sample(0.0), 0.0);
        assert_eq!(EaseFunction::Linear.sample(0.5), 0.5);
        assert_eq!(EaseFunction::Linear.sample(1.0), 1.0);
    }

    #[test]
    fn standard_eases_hit_their_endpoints() {
        for f in [
            EaseFunction::QuadIn,
            EaseFunction::QuadOut,
            EaseFunction::QuadInOut,
            EaseFunction::CubicIn,
            EaseFunction::CubicOut,
            EaseFunction::CubicInOut,
            EaseFunction::SineInOut,
            EaseFunction::BackInOut,
            EaseFunction::BounceInOut,
        ] {
            assert!((f.sample(0.0)).abs() < 1e-4, "{f:?} at 0");
            assert!((f.sample(1.0) - 1.0).abs() < 1e-4, "{f:?} at 1");
        }
    }

    #[test]
    fn catmull_rom_passes_through_controls() {
        let controls = [0.0, 1.0, 4.0, 9.0];
        // t=0 -> first control, t=1 -> last control
        assert!((catmull_rom_segment(0.0, &controls) - 0.0).abs() < 1e-4);
        assert!((catmull_rom_segment(1.0, &controls) - 9.0).abs() < 1e-4);
    }
}
