//! Composite animation node.
//!
//! An [`AnimationSet`] owns an ordered list of child animations and plays
//! them together as one [`Animation`]: each frame it queries every child,
//! folds their transforms into a single merged [`Transformation`], and tracks
//! aggregate lifecycle (started as soon as any child starts, ended only once
//! every child has ended). Sets implement [`Animation`] themselves, so sets
//! nest inside sets uniformly.
//!
//! Properties set on the set itself (duration, fill flags, repeat mode, start
//! offset) are recorded as explicit overrides and take precedence over the
//! children's own values; [`AnimationSet::initialize`] pushes them down onto
//! the children. The shared-easing flag is fixed at construction and pushed
//! down the same way.
//!
//! # Composition order
//!
//! Transform composition is non-commutative, so the fold order is observable
//! and load-bearing: children are folded in **reverse insertion order**, which
//! makes the transform of the first-added child the innermost (applied first
//! to a point).

use std::cell::Cell;
use std::fmt;

use tracing::trace;

use crate::animation::{Animation, RepeatMode, Timing};
use crate::transform::Transformation;

/// Start time reported by [`AnimationSet::start_time`] when the set has no
/// children.
///
/// Not a real timestamp; callers that may query an empty set must treat this
/// value as "unset".
pub const EMPTY_SET_START_TIME: i64 = 100_000;

/// Per-property record of which set-level values were explicitly set and are
/// therefore authoritative over the children's own values.
///
/// `None` means "inherit": the set never had that property set, and the
/// children keep their own values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetOverrides {
    pub duration: Option<i64>,
    pub fill_before: Option<bool>,
    pub fill_after: Option<bool>,
    pub repeat_mode: Option<RepeatMode>,
    pub start_offset: Option<i64>,
}

/// A group of animations played together and merged into one transform.
pub struct AnimationSet {
    timing: Timing,
    children: Vec<Box<dyn Animation>>,
    overrides: SetOverrides,
    share_easing: bool,
    /// Memoized "any child affects opacity". `None` means stale: recompute
    /// on the next query.
    has_alpha: Cell<Option<bool>>,
    /// Furthest point in time (relative to this set's start offset) reached
    /// by any child added so far.
    last_end: i64,
    /// Children's own start offsets, saved while an explicit set-level start
    /// offset is pushed down; restored by `reset`.
    stored_offsets: Option<Vec<i64>>,
}

impl fmt::Debug for AnimationSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationSet")
            .field("timing", &self.timing)
            .field("children", &self.children.len())
            .field("overrides", &self.overrides)
            .field("share_easing", &self.share_easing)
            .field("last_end", &self.last_end)
            .finish()
    }
}

impl AnimationSet {
    /// Create an empty set.
    ///
    /// Pass `share_easing = true` if every child should use this set's easing
    /// curve instead of its own; the curve is applied to the children during
    /// [`Animation::initialize`].
    pub fn new(share_easing: bool) -> Self {
        let mut timing = Timing::new();
        timing.start_time = 0;
        Self {
            timing,
            children: Vec::new(),
            overrides: SetOverrides::default(),
            share_easing,
            has_alpha: Cell::new(None),
            last_end: 0,
            stored_offsets: None,
        }
    }

    /// Add a child animation.
    ///
    /// Insertion order is significant: transforms are folded in reverse
    /// insertion order (see the module docs). While the set's duration has
    /// not been explicitly set it stays derived from the children: after
    /// every insertion `extent_end() == start_offset() + duration()`.
    pub fn add_animation(&mut self, child: Box<dyn Animation>) {
        let child_extent = child.start_offset() + child.duration();
        self.children.push(child);

        if let Some(duration) = self.overrides.duration {
            self.last_end = self.timing.start_offset + duration;
        } else if self.children.len() == 1 {
            self.timing.duration = child_extent;
            self.last_end = self.timing.start_offset + self.timing.duration;
        } else {
            self.last_end = self.last_end.max(child_extent);
            self.timing.duration = self.last_end - self.timing.start_offset;
        }

        self.has_alpha.set(None);
        trace!(
            children = self.children.len(),
            last_end = self.last_end,
            "added child animation"
        );
    }

    /// Builder form of [`AnimationSet::add_animation`].
    pub fn with(mut self, child: impl Animation + 'static) -> Self {
        self.add_animation(Box::new(child));
        self
    }

    /// Furthest point in time (relative to this set's start offset) reached
    /// by any child added so far. While the duration is not explicitly set
    /// this is the scheduling bound `start_offset + duration`.
    pub fn extent_end(&self) -> i64 {
        self.last_end
    }

    /// The explicit set-level property overrides recorded so far.
    pub fn overrides(&self) -> &SetOverrides {
        &self.overrides
    }

    /// Whether children use this set's easing curve instead of their own.
    pub fn shares_easing(&self) -> bool {
        self.share_easing
    }

    /// Number of child animations.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl Animation for AnimationSet {
    fn timing(&self) -> &Timing {
        &self.timing
    }

    fn timing_mut(&mut self) -> &mut Timing {
        &mut self.timing
    }

    /// Record the duration as authoritative for every child and fix the
    /// set's extent, independent of later insertions.
    fn set_duration(&mut self, duration_ms: i64) {
        self.overrides.duration = Some(duration_ms);
        self.timing.duration = duration_ms;
        self.last_end = self.timing.start_offset + duration_ms;
    }

    /// The set's duration: the explicit override if one was set, otherwise
    /// the duration of the longest child animation (0 with no children).
    ///
    /// Note that the derived value deliberately ignores child start offsets,
    /// unlike the running extent maintained by `add_animation`.
    fn duration(&self) -> i64 {
        if let Some(duration) = self.overrides.duration {
            return duration;
        }
        self.children
            .iter()
            .map(|child| child.duration())
            .max()
            .unwrap_or(0)
    }

    fn set_fill_before(&mut self, fill: bool) {
        self.overrides.fill_before = Some(fill);
        self.timing.fill_before = fill;
    }

    fn set_fill_after(&mut self, fill: bool) {
        self.overrides.fill_after = Some(fill);
        self.timing.fill_after = fill;
    }

    fn set_repeat_mode(&mut self, mode: RepeatMode) {
        self.overrides.repeat_mode = Some(mode);
        self.timing.repeat_mode = mode;
    }

    fn set_start_offset(&mut self, offset_ms: i64) {
        self.overrides.start_offset = Some(offset_ms);
        self.timing.start_offset = offset_ms;
    }

    /// Anchor this set and every child at the same start time. Unlike the
    /// overridable properties this always propagates immediately.
    fn set_start_time(&mut self, start_ms: i64) {
        self.timing.set_start_time(start_ms);
        for child in &mut self.children {
            child.set_start_time(start_ms);
        }
    }

    /// The earliest start time among the children.
    ///
    /// With no children this returns [`EMPTY_SET_START_TIME`], which is not a
    /// real timestamp.
    fn start_time(&self) -> i64 {
        self.children
            .iter()
            .fold(EMPTY_SET_START_TIME, |earliest, child| {
                earliest.min(child.start_time())
            })
    }

    /// True if any child affects opacity. Memoized; insertion invalidates.
    fn has_alpha(&self) -> bool {
        if let Some(cached) = self.has_alpha.get() {
            return cached;
        }
        let has_alpha = self.children.iter().any(|child| child.has_alpha());
        self.has_alpha.set(Some(has_alpha));
        has_alpha
    }

    fn scale_current_duration(&mut self, scale: f32) {
        for child in &mut self.children {
            child.scale_current_duration(scale);
        }
    }

    /// The maximum duration hint among the children, regardless of any
    /// duration override.
    fn compute_duration_hint(&self) -> i64 {
        self.children
            .iter()
            .map(|child| child.compute_duration_hint())
            .max()
            .unwrap_or(0)
    }

    /// The concatenation of every child's transform at `current_time`, in
    /// reverse insertion order, plus aggregate lifecycle tracking.
    ///
    /// `started` becomes true as soon as any child has started; `ended`
    /// becomes true only once every child has ended. Each listener callback
    /// fires exactly once per false-to-true transition.
    fn get_transformation(
        &mut self,
        current_time: i64,
        out: &mut Transformation,
        scale_factor: f32,
    ) -> bool {
        self.timing.scale_factor = scale_factor;
        out.clear();

        let mut more = false;
        let mut started = false;
        let mut ended = true;

        for child in self.children.iter_mut().rev() {
            let mut scratch = Transformation::new();
            more = child.get_transformation(current_time, &mut scratch, scale_factor) || more;
            out.compose(&scratch);

            started = started || child.has_started();
            ended = child.has_ended() && ended;
        }

        if started && !self.timing.started {
            trace!("animation set started");
            self.timing.started = true;
            self.timing.fire_start();
        }
        if ended != self.timing.ended {
            if ended {
                trace!("animation set ended");
                self.timing.fire_end();
            }
            self.timing.ended = ended;
        }

        more
    }

    /// Push the explicitly-set properties down onto the children and bind
    /// everything to the target geometry.
    ///
    /// A set-level start offset is added to each child's own offset; the
    /// original child offsets are saved and restored by [`Animation::reset`].
    fn initialize(&mut self, width: i32, height: i32, parent_width: i32, parent_height: i32) {
        let overrides = self.overrides;
        let shared_easing = self.share_easing.then_some(self.timing.easing);

        let mut saved_offsets = overrides
            .start_offset
            .map(|_| Vec::with_capacity(self.children.len()));

        for child in &mut self.children {
            if let Some(duration) = overrides.duration {
                child.set_duration(duration);
            }
            if let Some(fill) = overrides.fill_before {
                child.set_fill_before(fill);
            }
            if let Some(fill) = overrides.fill_after {
                child.set_fill_after(fill);
            }
            if let Some(mode) = overrides.repeat_mode {
                child.set_repeat_mode(mode);
            }
            if let Some(easing) = shared_easing {
                child.set_easing(easing);
            }
            if let Some(offset) = overrides.start_offset {
                let own = child.start_offset();
                if let Some(saved) = &mut saved_offsets {
                    saved.push(own);
                }
                child.set_start_offset(own + offset);
            }
            child.initialize(width, height, parent_width, parent_height);
        }

        self.stored_offsets = saved_offsets;
    }

    /// Return to the pre-play state, undoing the start-offset push-down.
    fn reset(&mut self) {
        self.timing.reset_playback();
        if let Some(offsets) = self.stored_offsets.take() {
            for (child, offset) in self.children.iter_mut().zip(offsets) {
                child.set_start_offset(offset);
            }
        }
    }
}
