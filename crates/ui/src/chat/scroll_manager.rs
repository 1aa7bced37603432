use std::time::{Duration, Instant};

use gpui::{Pixels, ScrollHandle, Window, point, px};

/// Length of the animated scroll toward the newest turn.
pub const SMOOTH_SCROLL_DURATION: Duration = Duration::from_millis(280);
/// Upper bound on extra frames spent chasing a tail that keeps moving after the animation.
pub const SETTLE_FRAME_LIMIT: u8 = 8;

/// Decides when the transcript should follow its tail.
///
/// Fires only when the number of turns changes and there is something to show;
/// busy-flag changes alone never move the view.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScrollFollow {
    observed_len: usize,
}

impl ScrollFollow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, conversation_len: usize) -> bool {
        let changed = conversation_len != self.observed_len;
        self.observed_len = conversation_len;
        changed && conversation_len > 0
    }
}

/// Eased scroll from a starting offset toward a target that may move while animating.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothScroll {
    from: f32,
    started_at: Instant,
    duration: Duration,
}

impl SmoothScroll {
    pub fn start(from: f32, now: Instant) -> Self {
        Self {
            from,
            started_at: now,
            duration: SMOOTH_SCROLL_DURATION,
        }
    }

    pub fn progress(&self, now: Instant) -> f32 {
        let elapsed = now.saturating_duration_since(self.started_at);
        if self.duration.is_zero() {
            return 1.0;
        }
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0)
    }

    pub fn offset_at(&self, target: f32, now: Instant) -> f32 {
        let eased = ease_out_cubic(self.progress(now));
        self.from + (target - self.from) * eased
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        self.progress(now) >= 1.0
    }
}

fn ease_out_cubic(t: f32) -> f32 {
    1.0 - (1.0 - t).powi(3)
}

/// Keeps the view pinned to the tail for a few frames after the animation ends.
///
/// `max_offset` lags one layout behind, so content that grows after the last
/// animated frame (markdown, code blocks) would otherwise leave the view short.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollSettle {
    last_target: f32,
    frames_left: u8,
}

impl ScrollSettle {
    pub fn new(target: f32) -> Self {
        Self {
            last_target: target,
            frames_left: SETTLE_FRAME_LIMIT,
        }
    }

    /// Records the target seen this frame. Returns true while another frame is needed.
    pub fn observe(&mut self, target: f32) -> bool {
        let moved = target != self.last_target;
        self.last_target = target;
        self.frames_left = self.frames_left.saturating_sub(1);
        moved && self.frames_left > 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ScrollPhase {
    Animating(SmoothScroll),
    Settling(ScrollSettle),
}

/// Binds tail-following and the smooth scroll animation to the transcript's scroll handle.
pub struct ScrollManager {
    scroll_handle: ScrollHandle,
    follow: ScrollFollow,
    phase: Option<ScrollPhase>,
}

impl ScrollManager {
    pub fn new() -> Self {
        Self {
            scroll_handle: ScrollHandle::new(),
            follow: ScrollFollow::new(),
            phase: None,
        }
    }

    pub fn handle(&self) -> &ScrollHandle {
        &self.scroll_handle
    }

    /// Starts a smooth scroll to the bottom if the conversation grew or changed.
    pub fn observe_conversation(&mut self, conversation_len: usize) {
        if self.follow.observe(conversation_len) {
            let from = f32::from(self.scroll_handle.offset().y);
            self.phase = Some(ScrollPhase::Animating(SmoothScroll::start(
                from,
                Instant::now(),
            )));
        }
    }

    /// Advances the running animation, then the settle phase, by one frame.
    pub fn apply_pending_scroll(&mut self, window: &mut Window) {
        let Some(phase) = self.phase else {
            return;
        };

        let target = self.tail_offset();
        let current_x = self.scroll_handle.offset().x;

        let next_phase = match phase {
            ScrollPhase::Animating(animation) => {
                let now = Instant::now();
                let next_y = animation.offset_at(target, now);
                self.scroll_handle.set_offset(point(current_x, px(next_y)));

                if animation.is_finished(now) {
                    Some(ScrollPhase::Settling(ScrollSettle::new(target)))
                } else {
                    Some(ScrollPhase::Animating(animation))
                }
            }
            ScrollPhase::Settling(mut settle) => {
                self.scroll_handle.set_offset(point(current_x, px(target)));
                settle
                    .observe(target)
                    .then_some(ScrollPhase::Settling(settle))
            }
        };

        self.phase = next_phase;
        if self.phase.is_some() {
            window.request_animation_frame();
        }
    }

    // GPUI scrolls down with negative Y offsets.
    fn tail_offset(&self) -> f32 {
        let max_offset = self.scroll_handle.max_offset().height;
        if max_offset > Pixels::ZERO {
            -f32::from(max_offset)
        } else {
            0.0
        }
    }
}

impl Default for ScrollManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follow_ignores_initial_empty_state() {
        let mut follow = ScrollFollow::new();
        assert!(!follow.observe(0));
        assert!(!follow.observe(0));
    }

    #[test]
    fn follow_fires_once_per_conversation_change() {
        let mut follow = ScrollFollow::new();

        assert!(follow.observe(1));
        // Busy flag flipping re-renders with the same length.
        assert!(!follow.observe(1));
        assert!(follow.observe(2));
        assert!(!follow.observe(2));
    }

    #[test]
    fn smooth_scroll_eases_to_moving_target() {
        let start = Instant::now();
        let animation = SmoothScroll::start(0.0, start);

        assert_eq!(animation.offset_at(-400.0, start), 0.0);

        let midway = start + SMOOTH_SCROLL_DURATION / 2;
        let mid_offset = animation.offset_at(-400.0, midway);
        assert!(mid_offset < -200.0 && mid_offset > -400.0);
        assert!(!animation.is_finished(midway));

        // Content that finished layout late still ends exactly on the new tail.
        let end = start + SMOOTH_SCROLL_DURATION;
        assert_eq!(animation.offset_at(-640.0, end), -640.0);
        assert!(animation.is_finished(end));
        assert!(animation.is_finished(end + Duration::from_secs(1)));
    }

    #[test]
    fn settle_checks_one_more_layout_after_animation() {
        let mut settle = ScrollSettle::new(-400.0);
        // Layout did not move the tail: done after a single extra frame.
        assert!(!settle.observe(-400.0));
    }

    #[test]
    fn settle_follows_tail_that_grows_after_animation() {
        let mut settle = ScrollSettle::new(-400.0);

        assert!(settle.observe(-520.0));
        assert!(settle.observe(-610.0));
        assert!(!settle.observe(-610.0));
    }

    #[test]
    fn settle_gives_up_after_frame_limit() {
        let mut settle = ScrollSettle::new(0.0);
        let mut frames = 0;
        let mut target = 0.0;

        loop {
            target -= 10.0;
            frames += 1;
            if !settle.observe(target) {
                break;
            }
        }

        assert_eq!(frames, usize::from(SETTLE_FRAME_LIMIT));
    }
}
