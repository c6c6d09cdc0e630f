/// # loop_monitor
///
/// Pure detection of idle-loop boundaries and of the timing windows around the
/// end of a main clip. The orchestrator feeds it the raw tick values and acts
/// on the decisions it returns.

/// Window before the end of the idle clip in which a tick counts as a loop
/// boundary (the clip is about to wrap or to stall on its last frame).
pub(crate) const LOOP_BOUNDARY_WINDOW: f64 = 0.15;

/// Bounds of the window before the end of a main clip in which the idle
/// element is pre-started, so the loop takes over without a visible seam.
pub(crate) const IDLE_PRESTART_MIN: f64 = 0.4;
pub(crate) const IDLE_PRESTART_MAX: f64 = 0.5;

/// Window before the end of a main clip in which it counts as finished.
pub(crate) const MAIN_END_WINDOW: f64 = 0.1;

/// What one tick of the idle element looked like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LoopTick {
    /// The clip wrapped since the previous tick, or is about to stall at its
    /// end: the point where a queued module commits.
    pub(crate) boundary: bool,

    /// The clip is about to stall at its end and no seek is in flight: left
    /// alone, some browsers never fire the `ended` event here.
    pub(crate) stalled_near_end: bool,
}

/// Tracks the playhead of the idle element across ticks to detect wrap-arounds.
pub(crate) struct LoopMonitor {
    prev_time: f64,
}

impl LoopMonitor {
    pub(crate) fn new() -> Self {
        Self { prev_time: 0. }
    }

    /// Forget the previous clip's playhead, when the idle element is
    /// re-attached.
    pub(crate) fn reset(&mut self) {
        self.prev_time = 0.;
    }

    /// Observe one `timeupdate` tick of the idle element.
    pub(crate) fn observe(&mut self, current_time: f64, duration: f64, seeking: bool) -> LoopTick {
        let wrapped = current_time < self.prev_time;
        let near_end = duration.is_finite()
            && duration - current_time < LOOP_BOUNDARY_WINDOW
            && current_time >= self.prev_time;
        let tick = LoopTick {
            boundary: wrapped || near_end,
            stalled_near_end: near_end && !seeking,
        };
        self.prev_time = current_time;
        tick
    }
}

/// What the orchestrator should do with one idle tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum IdleTickAction {
    /// Commit the queued module: make it current, play, clear the queue and
    /// pause the idle element so it cannot loop again during the handoff.
    CommitQueued(i32),

    /// Restart the loop from its beginning and keep playing.
    RestartLoop,

    /// Nothing beyond tracking the time.
    Track,
}

/// Decide on one idle tick. A queued module commits at any boundary, even one
/// observed mid-seek; the stall restart on the other hand never fights an
/// in-flight seek.
pub(crate) fn idle_tick_action(queued: Option<i32>, tick: LoopTick) -> IdleTickAction {
    match queued {
        Some(target) if tick.boundary => IdleTickAction::CommitQueued(target),
        Some(_) => IdleTickAction::Track,
        None if tick.stalled_near_end => IdleTickAction::RestartLoop,
        None => IdleTickAction::Track,
    }
}

/// `true` while a main clip is inside the idle pre-start window before its
/// end.
pub(crate) fn in_prestart_window(current_time: f64, duration: f64) -> bool {
    if !duration.is_finite() || duration <= 0. {
        return false;
    }
    let remaining = duration - current_time;
    remaining > IDLE_PRESTART_MIN && remaining < IDLE_PRESTART_MAX
}

/// `true` once a main clip is within `MAIN_END_WINDOW` of its end.
pub(crate) fn in_end_window(current_time: f64, duration: f64) -> bool {
    duration.is_finite() && duration > 0. && duration - current_time < MAIN_END_WINDOW
}

/// What the orchestrator should do with one tick of the current main element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MainTickAction {
    /// Roll the idle clip under the main layer so the coming handoff has no
    /// black flash.
    PrestartIdle,

    /// The clip is ending and the module loops: raise the idle flag.
    EnterIdle,

    /// The clip is ending and the module has no idle clip: pause and hold its
    /// last frame.
    EnterFinalHold,

    /// Nothing beyond tracking the time.
    Track,
}

/// Decide on one tick of the current main element. The two windows are
/// disjoint, so at most one fires; the final hold is entered once and later
/// in-window ticks only track.
pub(crate) fn main_tick_action(
    has_idle: bool,
    final_hold: bool,
    current_time: f64,
    duration: f64,
) -> MainTickAction {
    if in_end_window(current_time, duration) {
        if has_idle {
            MainTickAction::EnterIdle
        } else if !final_hold {
            MainTickAction::EnterFinalHold
        } else {
            MainTickAction::Track
        }
    } else if has_idle && in_prestart_window(current_time, duration) {
        MainTickAction::PrestartIdle
    } else {
        MainTickAction::Track
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_around_is_a_boundary() {
        let mut monitor = LoopMonitor::new();
        monitor.observe(4.8, 5., false);
        let tick = monitor.observe(0.2, 5., false);
        assert!(tick.boundary);
        assert!(!tick.stalled_near_end);
    }

    #[test]
    fn nearing_the_end_is_a_boundary_and_a_stall() {
        let mut monitor = LoopMonitor::new();
        monitor.observe(4.5, 5., false);
        let tick = monitor.observe(4.9, 5., false);
        assert!(tick.boundary);
        assert!(tick.stalled_near_end);
    }

    #[test]
    fn seeking_suppresses_the_stall_but_not_the_boundary() {
        let mut monitor = LoopMonitor::new();
        monitor.observe(4.5, 5., false);
        let tick = monitor.observe(4.9, 5., true);
        assert!(tick.boundary);
        assert!(!tick.stalled_near_end);
        // A queued commit goes through even mid-seek.
        assert_eq!(
            idle_tick_action(Some(3), tick),
            IdleTickAction::CommitQueued(3)
        );
    }

    #[test]
    fn unknown_duration_only_wraps() {
        let mut monitor = LoopMonitor::new();
        let tick = monitor.observe(0.1, f64::NAN, false);
        assert!(!tick.boundary);
        monitor.observe(3., f64::NAN, false);
        let tick = monitor.observe(0.5, f64::NAN, false);
        assert!(tick.boundary);
        assert!(!tick.stalled_near_end);
    }

    #[test]
    fn one_commit_per_boundary() {
        let mut monitor = LoopMonitor::new();
        let mut queued = Some(4);
        let mut commits = 0;
        // Two consecutive ticks inside the boundary window: the first commit
        // clears the queue, so the second tick cannot commit again.
        for time in [4.9, 4.93] {
            let tick = monitor.observe(time, 5., false);
            if let IdleTickAction::CommitQueued(_) = idle_tick_action(queued, tick) {
                commits += 1;
                queued = None;
            }
        }
        assert_eq!(commits, 1);
    }

    #[test]
    fn no_queue_near_end_restarts_the_loop() {
        let mut monitor = LoopMonitor::new();
        let tick = monitor.observe(4.95, 5., false);
        assert_eq!(idle_tick_action(None, tick), IdleTickAction::RestartLoop);
    }

    #[test]
    fn mid_clip_ticks_only_track() {
        let mut monitor = LoopMonitor::new();
        let tick = monitor.observe(2.5, 5., false);
        assert_eq!(idle_tick_action(None, tick), IdleTickAction::Track);
        assert_eq!(idle_tick_action(Some(2), tick), IdleTickAction::Track);
    }

    #[test]
    fn prestart_window_is_exclusive_on_both_ends() {
        assert!(in_prestart_window(9.52, 10.));
        // Exactly 0.5s remaining sits outside the window.
        assert!(!in_prestart_window(9.5, 10.));
        assert!(!in_prestart_window(9.45, 10.));
        assert!(!in_prestart_window(9.7, 10.));
        assert!(!in_prestart_window(2., f64::NAN));
        assert!(!in_prestart_window(2., f64::INFINITY));
    }

    #[test]
    fn end_window_needs_a_known_duration() {
        assert!(in_end_window(9.95, 10.));
        assert!(!in_end_window(9.85, 10.));
        assert!(!in_end_window(9.95, f64::NAN));
        assert!(!in_end_window(9.95, f64::INFINITY));
    }

    #[test]
    fn main_tick_prestarts_the_idle_clip_before_the_end() {
        assert_eq!(
            main_tick_action(true, false, 9.55, 10.),
            MainTickAction::PrestartIdle
        );
        // Without an idle clip there is nothing to pre-start.
        assert_eq!(main_tick_action(false, false, 9.55, 10.), MainTickAction::Track);
        assert_eq!(main_tick_action(true, false, 5., 10.), MainTickAction::Track);
    }

    #[test]
    fn main_end_without_an_idle_clip_holds_the_last_frame() {
        assert_eq!(
            main_tick_action(true, false, 9.95, 10.),
            MainTickAction::EnterIdle
        );
        assert_eq!(
            main_tick_action(false, false, 9.95, 10.),
            MainTickAction::EnterFinalHold
        );
        // The hold is entered once; later ticks inside the window only track.
        assert_eq!(main_tick_action(false, true, 9.97, 10.), MainTickAction::Track);
    }
}
