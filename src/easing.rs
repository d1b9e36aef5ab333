//! Easing functions for animation timing.
//!
//! An easing function maps linear progress in `[0, 1]` to eased progress,
//! controlling the rate of change of an animation over its play time. The
//! standard CSS curves are provided along with arbitrary cubic beziers.

use serde::{Deserialize, Serialize};

/// A timing curve applied to normalized animation progress.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EasingFunction {
    /// No easing; progress passes through unchanged.
    #[default]
    Linear,

    /// CSS `ease`: `cubic-bezier(0.25, 0.1, 0.25, 1.0)`.
    Ease,

    /// CSS `ease-in`: `cubic-bezier(0.42, 0, 1, 1)`.
    EaseIn,

    /// CSS `ease-out`: `cubic-bezier(0, 0, 0.58, 1)`.
    EaseOut,

    /// CSS `ease-in-out`: `cubic-bezier(0.42, 0, 0.58, 1)`.
    EaseInOut,

    /// A custom cubic bezier with control points `(x1, y1)` and `(x2, y2)`.
    /// The x coordinates must lie in `[0, 1]`.
    CubicBezier { x1: f32, y1: f32, x2: f32, y2: f32 },
}

impl EasingFunction {
    /// Create a custom cubic bezier curve.
    ///
    /// # Panics
    ///
    /// Panics if `x1` or `x2` is outside `[0, 1]` (the curve would not be a
    /// function of time).
    pub fn cubic_bezier(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        assert!(
            (0.0..=1.0).contains(&x1) && (0.0..=1.0).contains(&x2),
            "bezier x control points must be in [0, 1]"
        );
        Self::CubicBezier { x1, y1, x2, y2 }
    }

    /// Evaluate the curve at progress `t`, clamped to `[0, 1]`.
    pub fn evaluate(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match *self {
            Self::Linear => t,
            Self::Ease => bezier_progress(0.25, 0.1, 0.25, 1.0, t),
            Self::EaseIn => bezier_progress(0.42, 0.0, 1.0, 1.0, t),
            Self::EaseOut => bezier_progress(0.0, 0.0, 0.58, 1.0, t),
            Self::EaseInOut => bezier_progress(0.42, 0.0, 0.58, 1.0, t),
            Self::CubicBezier { x1, y1, x2, y2 } => bezier_progress(x1, y1, x2, y2, t),
        }
    }
}

/// One coordinate of the bezier at parameter `s`, for control values `c1`,
/// `c2` (endpoints are fixed at 0 and 1):
/// `3(1-s)²s·c1 + 3(1-s)s²·c2 + s³`.
#[inline]
fn bezier_coord(c1: f32, c2: f32, s: f32) -> f32 {
    let inv = 1.0 - s;
    3.0 * inv * inv * s * c1 + 3.0 * inv * s * s * c2 + s * s * s
}

/// Derivative of `bezier_coord` with respect to `s`.
#[inline]
fn bezier_slope(c1: f32, c2: f32, s: f32) -> f32 {
    let inv = 1.0 - s;
    3.0 * inv * inv * c1 + 6.0 * inv * s * (c2 - c1) + 3.0 * s * s * (1.0 - c2)
}

/// Map linear progress through the bezier defined by the two control points.
///
/// Solves `x(s) = progress` for the curve parameter `s` with Newton-Raphson
/// (falling back to bisection when the slope flattens out), then returns
/// `y(s)`.
fn bezier_progress(x1: f32, y1: f32, x2: f32, y2: f32, progress: f32) -> f32 {
    if progress <= 0.0 {
        return 0.0;
    }
    if progress >= 1.0 {
        return 1.0;
    }

    let mut s = progress;
    for _ in 0..8 {
        let err = bezier_coord(x1, x2, s) - progress;
        if err.abs() < 1e-6 {
            return bezier_coord(y1, y2, s);
        }
        let slope = bezier_slope(x1, x2, s);
        if slope.abs() < 1e-6 {
            break;
        }
        s = (s - err / slope).clamp(0.0, 1.0);
    }

    // Newton stalled; bisect. x(s) is monotone because x1, x2 are in [0, 1].
    let (mut lo, mut hi) = (0.0_f32, 1.0_f32);
    for _ in 0..24 {
        s = (lo + hi) * 0.5;
        if bezier_coord(x1, x2, s) < progress {
            lo = s;
        } else {
            hi = s;
        }
    }
    bezier_coord(y1, y2, s)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 0.001;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_linear_passthrough() {
        let ease = EasingFunction::Linear;
        for t in [0.0, 0.25, 0.5, 0.75, 1.0] {
            assert!(approx_eq(ease.evaluate(t), t));
        }
    }

    #[test]
    fn test_input_clamped() {
        let ease = EasingFunction::Linear;
        assert!(approx_eq(ease.evaluate(-0.5), 0.0));
        assert!(approx_eq(ease.evaluate(1.5), 1.0));
    }

    #[test]
    fn test_curves_hit_boundaries() {
        for ease in [
            EasingFunction::Ease,
            EasingFunction::EaseIn,
            EasingFunction::EaseOut,
            EasingFunction::EaseInOut,
            EasingFunction::cubic_bezier(0.4, 0.0, 0.2, 1.0),
        ] {
            assert!(approx_eq(ease.evaluate(0.0), 0.0), "{ease:?} at 0");
            assert!(approx_eq(ease.evaluate(1.0), 1.0), "{ease:?} at 1");
        }
    }

    #[test]
    fn test_ease_in_starts_slow() {
        let ease = EasingFunction::EaseIn;
        assert!(ease.evaluate(0.25) < 0.25);
        assert!(ease.evaluate(0.5) < 0.5);
    }

    #[test]
    fn test_ease_out_starts_fast() {
        let ease = EasingFunction::EaseOut;
        assert!(ease.evaluate(0.25) > 0.25);
        assert!(ease.evaluate(0.5) > 0.5);
    }

    #[test]
    fn test_ease_in_out_symmetric() {
        let ease = EasingFunction::EaseInOut;
        assert!(approx_eq(ease.evaluate(0.5), 0.5));
        let a = ease.evaluate(0.2);
        let b = ease.evaluate(0.8);
        assert!(approx_eq(a, 1.0 - b));
    }

    #[test]
    fn test_monotone() {
        let ease = EasingFunction::Ease;
        let mut prev = 0.0;
        for i in 1..=20 {
            let v = ease.evaluate(i as f32 / 20.0);
            assert!(v >= prev, "not monotone at step {i}");
            prev = v;
        }
    }

    #[test]
    #[should_panic]
    fn test_bezier_rejects_out_of_range_x() {
        EasingFunction::cubic_bezier(1.5, 0.0, 0.5, 1.0);
    }

    #[test]
    fn test_serde_tags() {
        let json = serde_json::to_string(&EasingFunction::EaseInOut).unwrap();
        assert_eq!(json, r#"{"type":"ease_in_out"}"#);

        let parsed: EasingFunction =
            serde_json::from_str(r#"{"type":"cubic_bezier","x1":0.4,"y1":0.0,"x2":0.2,"y2":1.0}"#)
                .unwrap();
        assert_eq!(
            parsed,
            EasingFunction::CubicBezier { x1: 0.4, y1: 0.0, x2: 0.2, y2: 1.0 }
        );
    }
}
