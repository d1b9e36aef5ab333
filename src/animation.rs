//! The animation capability and its shared timing state.
//!
//! [`Animation`] is the contract a host scheduler drives: a timed unit that,
//! asked for the current time, writes its visual state into a
//! [`Transformation`] and reports whether it needs further frames. Leaves
//! (see [`crate::tween`]) implement it by providing [`Animation::apply`];
//! [`crate::set::AnimationSet`] implements it by folding over children, so
//! sets nest uniformly inside other sets.
//!
//! Per-animation bookkeeping (schedule anchor, offset, duration, repeat and
//! fill policy, easing, lifecycle flags, listener) lives in [`Timing`], which
//! every implementor embeds and exposes through `timing()` / `timing_mut()`.
//! The trait supplies default method bodies over that state, including the
//! whole time-to-progress engine in `get_transformation`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::easing::EasingFunction;
use crate::transform::Transformation;

/// Start time meaning "resolve to the current time on the first frame that
/// queries this animation".
pub const START_ON_FIRST_FRAME: i64 = -1;

/// What a repeating animation does when a cycle finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepeatMode {
    /// Play each cycle from the beginning.
    #[default]
    Restart,
    /// Play every other cycle backwards.
    Reverse,
}

/// How many extra cycles an animation plays after the first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RepeatCount {
    /// Repeat a fixed number of times. `Count { count: 0 }` plays once.
    Count { count: u32 },
    /// Repeat forever.
    Infinite,
}

impl Default for RepeatCount {
    fn default() -> Self {
        Self::Count { count: 0 }
    }
}

impl RepeatCount {
    /// Whether another cycle may start after `repeated` completed repeats.
    pub fn allows_another(&self, repeated: u32) -> bool {
        match *self {
            Self::Infinite => true,
            Self::Count { count } => repeated < count,
        }
    }
}

/// Lifecycle callbacks, invoked synchronously on the animation tick path.
///
/// Implementations must not block or schedule long-running work, and must not
/// re-enter the animation they are attached to.
pub trait AnimationListener {
    /// The animation applied its first frame.
    fn on_start(&mut self) {}
    /// A cycle finished and another is about to begin.
    fn on_repeat(&mut self) {}
    /// The animation finished its last cycle.
    fn on_end(&mut self) {}
}

/// Shared per-animation state.
///
/// All times are in milliseconds. Mutate freely before playback; during
/// playback the host should only drive the animation through
/// [`Animation::get_transformation`].
pub struct Timing {
    /// Absolute schedule anchor, or [`START_ON_FIRST_FRAME`].
    pub start_time: i64,
    /// Delay before the effect begins, relative to `start_time`.
    pub start_offset: i64,
    /// Nominal play length of one cycle.
    pub duration: i64,
    /// Cycle replay direction policy.
    pub repeat_mode: RepeatMode,
    /// Extra cycles after the first.
    pub repeat_count: RepeatCount,
    /// Apply the first frame's value before the effect begins.
    pub fill_before: bool,
    /// Keep applying the last frame's value after the effect ends.
    pub fill_after: bool,
    /// Interpolation strategy for normalized progress.
    pub easing: EasingFunction,
    /// Geometry scale pinned by the caller on each transform query.
    pub scale_factor: f32,
    /// Whether the animation has applied at least one frame.
    pub started: bool,
    /// Whether the animation has finished its last cycle.
    pub ended: bool,

    pub(crate) repeated: u32,
    pub(crate) cycle_reversed: bool,
    listener: Option<Box<dyn AnimationListener>>,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            start_time: START_ON_FIRST_FRAME,
            start_offset: 0,
            duration: 0,
            repeat_mode: RepeatMode::Restart,
            repeat_count: RepeatCount::default(),
            fill_before: true,
            fill_after: false,
            easing: EasingFunction::default(),
            scale_factor: 1.0,
            started: false,
            ended: false,
            repeated: 0,
            cycle_reversed: false,
            listener: None,
        }
    }
}

impl fmt::Debug for Timing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timing")
            .field("start_time", &self.start_time)
            .field("start_offset", &self.start_offset)
            .field("duration", &self.duration)
            .field("repeat_mode", &self.repeat_mode)
            .field("repeat_count", &self.repeat_count)
            .field("fill_before", &self.fill_before)
            .field("fill_after", &self.fill_after)
            .field("easing", &self.easing)
            .field("started", &self.started)
            .field("ended", &self.ended)
            .field("has_listener", &self.listener.is_some())
            .finish()
    }
}

impl Timing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Anchor the schedule at `start_ms` and rewind playback bookkeeping.
    pub fn set_start_time(&mut self, start_ms: i64) {
        self.start_time = start_ms;
        self.started = false;
        self.ended = false;
        self.repeated = 0;
        self.cycle_reversed = false;
    }

    /// Forget playback progress, keeping configuration and schedule anchor.
    pub fn reset_playback(&mut self) {
        self.started = false;
        self.ended = false;
        self.repeated = 0;
        self.cycle_reversed = false;
    }

    /// Install (or replace) the lifecycle listener.
    pub fn set_listener(&mut self, listener: Box<dyn AnimationListener>) {
        self.listener = Some(listener);
    }

    /// Remove the lifecycle listener, returning it.
    pub fn take_listener(&mut self) -> Option<Box<dyn AnimationListener>> {
        self.listener.take()
    }

    pub(crate) fn fire_start(&mut self) {
        if let Some(listener) = &mut self.listener {
            listener.on_start();
        }
    }

    pub(crate) fn fire_repeat(&mut self) {
        if let Some(listener) = &mut self.listener {
            listener.on_repeat();
        }
    }

    pub(crate) fn fire_end(&mut self) {
        if let Some(listener) = &mut self.listener {
            listener.on_end();
        }
    }
}

/// A timed unit that maps the current time to a visual [`Transformation`].
///
/// Object safe; animation sets own their children as `Box<dyn Animation>`.
pub trait Animation {
    /// Shared timing state.
    fn timing(&self) -> &Timing;
    /// Shared timing state, mutably.
    fn timing_mut(&mut self) -> &mut Timing;

    /// Write this animation's contribution for eased progress
    /// `interpolated_time` in `[0, 1]` into `out`.
    ///
    /// Leaf hook called by the default `get_transformation`; implementors
    /// that override `get_transformation` wholesale (such as sets) leave it
    /// as the no-op default.
    fn apply(&mut self, interpolated_time: f32, out: &mut Transformation) {
        let _ = (interpolated_time, out);
    }

    /// Absolute schedule anchor, or [`START_ON_FIRST_FRAME`].
    fn start_time(&self) -> i64 {
        self.timing().start_time
    }

    /// Anchor the schedule at `start_ms` and rewind playback bookkeeping.
    fn set_start_time(&mut self, start_ms: i64) {
        self.timing_mut().set_start_time(start_ms);
    }

    /// Schedule the animation to start on the first frame that queries it.
    fn start(&mut self) {
        self.set_start_time(START_ON_FIRST_FRAME);
    }

    /// Delay before the effect begins, relative to the start time.
    fn start_offset(&self) -> i64 {
        self.timing().start_offset
    }

    fn set_start_offset(&mut self, offset_ms: i64) {
        self.timing_mut().start_offset = offset_ms;
    }

    /// Nominal play length of one cycle.
    fn duration(&self) -> i64 {
        self.timing().duration
    }

    fn set_duration(&mut self, duration_ms: i64) {
        self.timing_mut().duration = duration_ms;
    }

    fn repeat_mode(&self) -> RepeatMode {
        self.timing().repeat_mode
    }

    fn set_repeat_mode(&mut self, mode: RepeatMode) {
        self.timing_mut().repeat_mode = mode;
    }

    fn repeat_count(&self) -> RepeatCount {
        self.timing().repeat_count
    }

    fn set_repeat_count(&mut self, count: RepeatCount) {
        self.timing_mut().repeat_count = count;
    }

    fn fill_before(&self) -> bool {
        self.timing().fill_before
    }

    fn set_fill_before(&mut self, fill: bool) {
        self.timing_mut().fill_before = fill;
    }

    fn fill_after(&self) -> bool {
        self.timing().fill_after
    }

    fn set_fill_after(&mut self, fill: bool) {
        self.timing_mut().fill_after = fill;
    }

    fn easing(&self) -> EasingFunction {
        self.timing().easing
    }

    fn set_easing(&mut self, easing: EasingFunction) {
        self.timing_mut().easing = easing;
    }

    /// Install the lifecycle listener.
    fn set_listener(&mut self, listener: Box<dyn AnimationListener>) {
        self.timing_mut().set_listener(listener);
    }

    /// Whether the animation has applied at least one frame.
    fn has_started(&self) -> bool {
        self.timing().started
    }

    /// Whether the animation has finished its last cycle.
    fn has_ended(&self) -> bool {
        self.timing().ended
    }

    /// Whether this animation affects opacity.
    fn has_alpha(&self) -> bool {
        false
    }

    /// Rescale in-flight timing: duration and start offset multiply by
    /// `scale`.
    fn scale_current_duration(&mut self, scale: f32) {
        let timing = self.timing_mut();
        timing.duration = (timing.duration as f64 * scale as f64) as i64;
        timing.start_offset = (timing.start_offset as f64 * scale as f64) as i64;
    }

    /// Scheduler lookahead estimate of total play length: offset plus one
    /// full set of cycles. Infinite repeats report a single cycle.
    fn compute_duration_hint(&self) -> i64 {
        let timing = self.timing();
        let cycles = match timing.repeat_count {
            RepeatCount::Infinite => 1,
            RepeatCount::Count { count } => count as i64 + 1,
        };
        timing.start_offset + timing.duration * cycles
    }

    /// Bind the animation to its target geometry. Default no-op.
    fn initialize(&mut self, width: i32, height: i32, parent_width: i32, parent_height: i32) {
        let _ = (width, height, parent_width, parent_height);
    }

    /// Return to the pre-play state, keeping configuration.
    fn reset(&mut self) {
        self.timing_mut().reset_playback();
    }

    /// Compute this animation's transform at `current_time` (milliseconds)
    /// into `out`, pinning `scale_factor` for geometry-dependent values.
    ///
    /// Returns `true` while further frames are needed.
    ///
    /// The default body is the leaf engine: it resolves a deferred start
    /// time, maps the clock to normalized cycle progress, applies fill
    /// policy at the window edges, reverses odd cycles under
    /// [`RepeatMode::Reverse`], runs the easing curve, delegates to
    /// [`Animation::apply`], and drives repeat/end transitions (each
    /// listener callback fires exactly once per transition).
    fn get_transformation(
        &mut self,
        current_time: i64,
        out: &mut Transformation,
        scale_factor: f32,
    ) -> bool {
        let timing = self.timing_mut();
        timing.scale_factor = scale_factor;
        if timing.start_time == START_ON_FIRST_FRAME {
            timing.start_time = current_time;
        }

        let begin = timing.start_time + timing.start_offset;
        let normalized = if timing.duration != 0 {
            (current_time - begin) as f32 / timing.duration as f32
        } else if current_time < begin {
            0.0
        } else {
            1.0
        };

        // A zero-duration animation expires the moment it is reached.
        let expired = normalized > 1.0 || (timing.duration == 0 && current_time >= begin);
        let mut more = !expired;

        let within_fill = (normalized >= 0.0 || timing.fill_before)
            && (normalized <= 1.0 || timing.fill_after);

        let interpolated = if within_fill {
            if !timing.started {
                timing.started = true;
                timing.fire_start();
            }
            let mut progress = normalized.clamp(0.0, 1.0);
            if timing.cycle_reversed {
                progress = 1.0 - progress;
            }
            Some(timing.easing.evaluate(progress))
        } else {
            None
        };

        if let Some(interpolated) = interpolated {
            self.apply(interpolated, out);
        }

        if expired {
            let timing = self.timing_mut();
            if timing.repeat_count.allows_another(timing.repeated) {
                if let RepeatCount::Count { .. } = timing.repeat_count {
                    timing.repeated += 1;
                }
                if timing.repeat_mode == RepeatMode::Reverse {
                    timing.cycle_reversed = !timing.cycle_reversed;
                }
                // Re-anchor so the next frame starts the next cycle.
                timing.start_time = START_ON_FIRST_FRAME;
                more = true;
                timing.fire_repeat();
            } else if !timing.ended {
                timing.ended = true;
                timing.fire_end();
            }
        }

        more
    }
}

/// Builder-style configuration, available on any sized animation type.
pub trait AnimationExt: Animation + Sized {
    fn with_duration(mut self, duration_ms: i64) -> Self {
        self.set_duration(duration_ms);
        self
    }

    fn with_start_offset(mut self, offset_ms: i64) -> Self {
        self.set_start_offset(offset_ms);
        self
    }

    fn with_easing(mut self, easing: EasingFunction) -> Self {
        self.set_easing(easing);
        self
    }

    fn with_repeat(mut self, mode: RepeatMode, count: RepeatCount) -> Self {
        self.set_repeat_mode(mode);
        self.set_repeat_count(count);
        self
    }

    fn with_fill_before(mut self, fill: bool) -> Self {
        self.set_fill_before(fill);
        self
    }

    fn with_fill_after(mut self, fill: bool) -> Self {
        self.set_fill_after(fill);
        self
    }

    fn with_listener(mut self, listener: impl AnimationListener + 'static) -> Self {
        self.set_listener(Box::new(listener));
        self
    }
}

impl<A: Animation> AnimationExt for A {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Minimal leaf that records the progress values it was applied with.
    #[derive(Default)]
    struct Probe {
        timing: Timing,
        applied: Vec<f32>,
    }

    impl Animation for Probe {
        fn timing(&self) -> &Timing {
            &self.timing
        }

        fn timing_mut(&mut self) -> &mut Timing {
            &mut self.timing
        }

        fn apply(&mut self, interpolated_time: f32, _out: &mut Transformation) {
            self.applied.push(interpolated_time);
        }
    }

    #[derive(Default, Clone)]
    struct Counts {
        starts: u32,
        repeats: u32,
        ends: u32,
    }

    struct CountingListener(Rc<RefCell<Counts>>);

    impl AnimationListener for CountingListener {
        fn on_start(&mut self) {
            self.0.borrow_mut().starts += 1;
        }

        fn on_repeat(&mut self) {
            self.0.borrow_mut().repeats += 1;
        }

        fn on_end(&mut self) {
            self.0.borrow_mut().ends += 1;
        }
    }

    fn tick(anim: &mut impl Animation, time: i64) -> (bool, Transformation) {
        let mut out = Transformation::new();
        let more = anim.get_transformation(time, &mut out, 1.0);
        (more, out)
    }

    #[test]
    fn test_repeat_count_allows_another() {
        assert!(RepeatCount::Infinite.allows_another(1_000_000));
        assert!(RepeatCount::Count { count: 2 }.allows_another(1));
        assert!(!RepeatCount::Count { count: 2 }.allows_another(2));
        assert!(!RepeatCount::default().allows_another(0));
    }

    #[test]
    fn test_progress_over_one_cycle() {
        let mut probe = Probe::default().with_duration(100);
        probe.set_start_time(0);

        let (more, _) = tick(&mut probe, 0);
        assert!(more);
        let (more, _) = tick(&mut probe, 50);
        assert!(more);
        let (more, _) = tick(&mut probe, 100);
        assert!(more); // boundary frame still counts as in-flight
        let (more, _) = tick(&mut probe, 101);
        assert!(!more);

        // the post-expiry frame applies nothing without fill-after
        assert_eq!(probe.applied, vec![0.0, 0.5, 1.0]);
        assert!(probe.has_started());
        assert!(probe.has_ended());
    }

    #[test]
    fn test_start_on_first_frame_resolves() {
        let mut probe = Probe::default().with_duration(100);
        assert_eq!(probe.start_time(), START_ON_FIRST_FRAME);

        tick(&mut probe, 700);
        assert_eq!(probe.start_time(), 700);
        tick(&mut probe, 750);
        assert_eq!(probe.applied, vec![0.0, 0.5]);
    }

    #[test]
    fn test_start_offset_delays_effect() {
        let mut probe = Probe::default().with_duration(100).with_start_offset(50);
        probe.set_start_time(0);

        tick(&mut probe, 25); // inside the delay, fill-before clamps to 0
        tick(&mut probe, 100);
        assert_eq!(probe.applied, vec![0.0, 0.5]);
    }

    #[test]
    fn test_no_fill_before_skips_delay_frames() {
        let mut probe = Probe::default()
            .with_duration(100)
            .with_start_offset(50)
            .with_fill_before(false);
        probe.set_start_time(0);

        let (more, _) = tick(&mut probe, 25);
        assert!(more);
        assert!(probe.applied.is_empty());
        assert!(!probe.has_started());

        tick(&mut probe, 50);
        assert_eq!(probe.applied, vec![0.0]);
        assert!(probe.has_started());
    }

    #[test]
    fn test_fill_after_keeps_applying_terminal_value() {
        let mut probe = Probe::default().with_duration(100).with_fill_after(true);
        probe.set_start_time(0);

        tick(&mut probe, 150);
        assert_eq!(probe.applied, vec![1.0]);
        assert!(probe.has_ended());

        let (more, _) = tick(&mut probe, 200);
        assert!(!more);
        assert_eq!(probe.applied, vec![1.0, 1.0]);
    }

    #[test]
    fn test_repeat_restart_reanchors() {
        let mut probe = Probe::default()
            .with_duration(100)
            .with_repeat(RepeatMode::Restart, RepeatCount::Count { count: 1 });
        probe.set_start_time(0);

        let (more, _) = tick(&mut probe, 150); // first cycle expired
        assert!(more);
        assert!(!probe.has_ended());
        assert_eq!(probe.start_time(), START_ON_FIRST_FRAME);

        tick(&mut probe, 200); // second cycle anchors here
        tick(&mut probe, 250);
        let (more, _) = tick(&mut probe, 301);
        assert!(!more);
        assert!(probe.has_ended());
        assert_eq!(probe.applied, vec![0.0, 0.5]);
    }

    #[test]
    fn test_repeat_reverse_flips_odd_cycles() {
        let mut probe = Probe::default()
            .with_duration(100)
            .with_repeat(RepeatMode::Reverse, RepeatCount::Count { count: 1 });
        probe.set_start_time(0);

        tick(&mut probe, 101); // expire cycle 0, flip direction
        tick(&mut probe, 200); // cycle 1 anchors at 200
        tick(&mut probe, 225);
        assert_eq!(probe.applied, vec![1.0, 0.75]);
    }

    #[test]
    fn test_listener_fires_once_per_transition() {
        let counts = Rc::new(RefCell::new(Counts::default()));
        let mut probe = Probe::default()
            .with_duration(100)
            .with_listener(CountingListener(counts.clone()));
        probe.set_start_time(0);

        tick(&mut probe, 0);
        tick(&mut probe, 50);
        tick(&mut probe, 101);
        tick(&mut probe, 200);
        tick(&mut probe, 300);

        let counts = counts.borrow();
        assert_eq!(counts.starts, 1);
        assert_eq!(counts.repeats, 0);
        assert_eq!(counts.ends, 1);
    }

    #[test]
    fn test_listener_repeat_callback() {
        let counts = Rc::new(RefCell::new(Counts::default()));
        let mut probe = Probe::default()
            .with_duration(100)
            .with_repeat(RepeatMode::Restart, RepeatCount::Count { count: 2 })
            .with_listener(CountingListener(counts.clone()));
        probe.set_start_time(0);

        tick(&mut probe, 101); // cycle 0 done
        tick(&mut probe, 210); // cycle 1 anchors at 210... and runs
        tick(&mut probe, 320); // cycle 1 done
        tick(&mut probe, 430); // cycle 2 runs
        tick(&mut probe, 540); // cycle 2 done, no repeats left
        tick(&mut probe, 600);

        let counts = counts.borrow();
        assert_eq!(counts.repeats, 2);
        assert_eq!(counts.ends, 1);
    }

    #[test]
    fn test_set_start_time_rewinds_flags() {
        let mut probe = Probe::default().with_duration(100);
        probe.set_start_time(0);
        tick(&mut probe, 200);
        assert!(probe.has_ended());

        probe.set_start_time(500);
        assert!(!probe.has_started());
        assert!(!probe.has_ended());
    }

    #[test]
    fn test_reset_keeps_configuration() {
        let mut probe = Probe::default().with_duration(100).with_start_offset(30);
        probe.set_start_time(0);
        tick(&mut probe, 500);
        probe.reset();

        assert!(!probe.has_started());
        assert!(!probe.has_ended());
        assert_eq!(probe.duration(), 100);
        assert_eq!(probe.start_offset(), 30);
    }

    #[test]
    fn test_scale_current_duration() {
        let mut probe = Probe::default().with_duration(100).with_start_offset(40);
        probe.scale_current_duration(0.5);
        assert_eq!(probe.duration(), 50);
        assert_eq!(probe.start_offset(), 20);
    }

    #[test]
    fn test_compute_duration_hint() {
        let probe = Probe::default().with_duration(100).with_start_offset(40);
        assert_eq!(probe.compute_duration_hint(), 140);

        let probe = Probe::default()
            .with_duration(100)
            .with_repeat(RepeatMode::Restart, RepeatCount::Count { count: 2 });
        assert_eq!(probe.compute_duration_hint(), 300);

        let probe = Probe::default()
            .with_duration(100)
            .with_repeat(RepeatMode::Restart, RepeatCount::Infinite);
        assert_eq!(probe.compute_duration_hint(), 100);
    }

    #[test]
    fn test_zero_duration_snaps_to_end() {
        let mut probe = Probe::default();
        probe.set_start_time(100);

        let (more, _) = tick(&mut probe, 50);
        assert!(more);
        assert_eq!(probe.applied, vec![0.0]);

        let (more, _) = tick(&mut probe, 100);
        assert!(!more);
        assert_eq!(probe.applied, vec![0.0, 1.0]);
    }
}
