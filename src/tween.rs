//! Stock leaf animations.
//!
//! Each leaf owns a [`Timing`] and a pair of endpoints, and linearly
//! interpolates between them at the eased progress the [`Animation`] engine
//! hands to [`Animation::apply`]. Configure them with the builder methods
//! from [`crate::AnimationExt`]:
//!
//! ```
//! use cadence::{AlphaAnimation, AnimationExt, EasingFunction};
//!
//! let fade_in = AlphaAnimation::new(0.0, 1.0)
//!     .with_duration(300)
//!     .with_easing(EasingFunction::EaseOut);
//! ```

use crate::animation::{Animation, Timing};
use crate::transform::{Transform2D, Transformation};

#[inline]
fn lerp(from: f64, to: f64, t: f32) -> f64 {
    from + (to - from) * t as f64
}

/// Animates opacity between two values.
#[derive(Debug, Default)]
pub struct AlphaAnimation {
    timing: Timing,
    from: f32,
    to: f32,
}

impl AlphaAnimation {
    pub fn new(from: f32, to: f32) -> Self {
        Self { timing: Timing::new(), from, to }
    }
}

impl Animation for AlphaAnimation {
    fn timing(&self) -> &Timing {
        &self.timing
    }

    fn timing_mut(&mut self) -> &mut Timing {
        &mut self.timing
    }

    fn has_alpha(&self) -> bool {
        true
    }

    fn apply(&mut self, interpolated_time: f32, out: &mut Transformation) {
        out.alpha = self.from + (self.to - self.from) * interpolated_time;
    }
}

/// Animates a translation between two offsets.
///
/// Offsets are in the host's coordinate units; the scale factor pinned by the
/// caller on each transform query multiplies them.
#[derive(Debug, Default)]
pub struct TranslateAnimation {
    timing: Timing,
    from_x: f64,
    to_x: f64,
    from_y: f64,
    to_y: f64,
}

impl TranslateAnimation {
    pub fn new(from_x: f64, to_x: f64, from_y: f64, to_y: f64) -> Self {
        Self { timing: Timing::new(), from_x, to_x, from_y, to_y }
    }
}

impl Animation for TranslateAnimation {
    fn timing(&self) -> &Timing {
        &self.timing
    }

    fn timing_mut(&mut self) -> &mut Timing {
        &mut self.timing
    }

    fn apply(&mut self, interpolated_time: f32, out: &mut Transformation) {
        let scale = self.timing.scale_factor as f64;
        let dx = lerp(self.from_x, self.to_x, interpolated_time) * scale;
        let dy = lerp(self.from_y, self.to_y, interpolated_time) * scale;
        out.matrix = Transform2D::translate(dx, dy);
    }
}

/// Animates a scale about the origin between two factor pairs.
#[derive(Debug, Default)]
pub struct ScaleAnimation {
    timing: Timing,
    from_x: f64,
    to_x: f64,
    from_y: f64,
    to_y: f64,
}

impl ScaleAnimation {
    pub fn new(from_x: f64, to_x: f64, from_y: f64, to_y: f64) -> Self {
        Self { timing: Timing::new(), from_x, to_x, from_y, to_y }
    }
}

impl Animation for ScaleAnimation {
    fn timing(&self) -> &Timing {
        &self.timing
    }

    fn timing_mut(&mut self) -> &mut Timing {
        &mut self.timing
    }

    fn apply(&mut self, interpolated_time: f32, out: &mut Transformation) {
        let sx = lerp(self.from_x, self.to_x, interpolated_time);
        let sy = lerp(self.from_y, self.to_y, interpolated_time);
        out.matrix = Transform2D::scale(sx, sy);
    }
}
