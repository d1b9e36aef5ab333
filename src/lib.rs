//! Composable timed animations.
//!
//! This crate provides:
//! - **Leaf animations**: map a point in time to a visual [`Transformation`]
//!   (opacity plus a 2D affine matrix), honoring start offsets, repeat modes,
//!   fill behavior and easing curves
//! - **Animation sets**: aggregate an ordered list of child animations into a
//!   single merged transform per frame, with aggregate lifecycle tracking
//! - **Easing functions**: CSS-style timing curves
//!
//! # Architecture
//!
//! ```text
//! host scheduler (one tick per rendered frame)
//!   └── AnimationSet::get_transformation(now, &mut out, scale)
//!         ├── child.get_transformation(...)   (reverse insertion order)
//!         ├── out.compose(child transform)    (order-sensitive fold)
//!         └── lifecycle aggregation           (started = any, ended = all)
//! ```
//!
//! Everything is single-threaded and pull-based: a host drives a set by
//! querying it once per frame with the current time in milliseconds, and the
//! returned flag says whether another frame is needed. Listener callbacks run
//! synchronously on the tick path.
//!
//! # Example
//!
//! ```
//! use cadence::{AlphaAnimation, AnimationExt, AnimationSet, Animation,
//!               TranslateAnimation, Transformation};
//!
//! let mut set = AnimationSet::new(false)
//!     .with(AlphaAnimation::new(0.0, 1.0).with_duration(500))
//!     .with(TranslateAnimation::new(0.0, 40.0, 0.0, 0.0).with_duration(400));
//!
//! set.set_start_time(0);
//! let mut out = Transformation::new();
//! let more = set.get_transformation(250, &mut out, 1.0);
//! assert!(more);
//! ```

pub mod animation;
pub mod easing;
pub mod set;
pub mod transform;
pub mod tween;

pub use animation::{
    Animation, AnimationExt, AnimationListener, RepeatCount, RepeatMode, Timing,
    START_ON_FIRST_FRAME,
};
pub use easing::EasingFunction;
pub use set::{AnimationSet, SetOverrides, EMPTY_SET_START_TIME};
pub use transform::{Transform2D, Transformation};
pub use tween::{AlphaAnimation, ScaleAnimation, TranslateAnimation};
