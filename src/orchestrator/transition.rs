use crate::bindings::TimerId;

/// # transition
///
/// Pure sequencing of the visual transition between modules: classification of
/// a module change into a transition kind, the three-phase fade state machine
/// and the opacity each layer of the stack should have at any point of it.
///
/// Nothing here touches the bindings; the orchestrator schedules the timers
/// this module asks for and applies the opacities it computes.

/// Duration of the fade-to-black itself.
pub(crate) const FADE_OUT_MS: f64 = 300.;

/// Margin added after the fade-out so the handoff happens under a fully
/// opaque overlay.
pub(crate) const FADE_BRIDGE_MS: f64 = 20.;

/// Time left to the incoming layer to settle before the overlay is released.
pub(crate) const FADE_IN_MS: f64 = 300.;

/// Duration of the overlay's animation back to transparent.
pub(crate) const FADE_SETTLE_MS: f64 = 300.;

/// How a module change should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TransitionKind {
    /// No visual transition at all (no actual change of module).
    None,

    /// Hard swap of the visible layer, without a fade.
    Instant,

    /// The full three-phase fade through black.
    Fade,
}

/// Classify a module change against the index of the layer currently on
/// screen (the "visual" previous index, which only advances once a transition
/// completed).
///
/// Moving from the intro to the first module and moving one module forward
/// both swap instantly; every other real change fades.
pub(crate) fn classify_transition(visual_previous: i32, next: i32) -> TransitionKind {
    if next < 0 || next == visual_previous {
        TransitionKind::None
    } else if visual_previous == -1 {
        if next == 0 {
            TransitionKind::Instant
        } else {
            TransitionKind::Fade
        }
    } else if next == visual_previous + 1 {
        TransitionKind::Instant
    } else {
        TransitionKind::Fade
    }
}

/// Phases of a running fade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FadePhase {
    /// The outgoing layer is still the visible one; the overlay darkens over
    /// it.
    Out,

    /// The handoff happened under the opaque overlay; the incoming layer sits
    /// below it.
    In,

    /// The overlay animates back to transparent over the incoming layer.
    Settle,
}

/// State machine of one fade. At most one timer is pending for it at any
/// time; the orchestrator records the scheduled `TimerId` here and checks
/// resolved timers against it, so a cancelled fade can never be advanced by a
/// stale timer.
pub(crate) struct FadeTransition {
    phase: Option<FadePhase>,
    target: i32,
    pending_timer: Option<TimerId>,
}

impl FadeTransition {
    pub(crate) fn new() -> Self {
        Self {
            phase: None,
            target: -1,
            pending_timer: None,
        }
    }

    /// Begin fading toward the module at `target`. Returns the delay after
    /// which `advance` should be called for the first time.
    pub(crate) fn begin(&mut self, target: i32) -> f64 {
        self.phase = Some(FadePhase::Out);
        self.target = target;
        self.pending_timer = None;
        FADE_OUT_MS + FADE_BRIDGE_MS
    }

    /// Move to the next phase. Returns the delay until the following
    /// `advance` call, or `None` once the fade completed.
    pub(crate) fn advance(&mut self) -> Option<f64> {
        match self.phase {
            Some(FadePhase::Out) => {
                self.phase = Some(FadePhase::In);
                Some(FADE_IN_MS)
            }
            Some(FadePhase::In) => {
                self.phase = Some(FadePhase::Settle);
                Some(FADE_SETTLE_MS)
            }
            Some(FadePhase::Settle) => {
                self.phase = None;
                None
            }
            None => None,
        }
    }

    /// Record the timer scheduled for the current phase.
    pub(crate) fn set_pending_timer(&mut self, id: TimerId) {
        self.pending_timer = Some(id);
    }

    /// Check a resolved timer against the one pending for this fade. Returns
    /// `true`, clearing it, if it matches.
    pub(crate) fn acknowledge_timer(&mut self, id: TimerId) -> bool {
        if self.pending_timer == Some(id) {
            self.pending_timer = None;
            true
        } else {
            false
        }
    }

    /// Abort the fade wherever it stood. Returns the timer to clear if one
    /// was pending.
    pub(crate) fn cancel(&mut self) -> Option<TimerId> {
        self.phase = None;
        self.target = -1;
        self.pending_timer.take()
    }

    pub(crate) fn is_running(&self) -> bool {
        self.phase.is_some()
    }

    pub(crate) fn phase(&self) -> Option<FadePhase> {
        self.phase
    }

    pub(crate) fn target(&self) -> i32 {
        self.target
    }

    /// `(mounted, opaque)` state the fade overlay should have right now. The
    /// overlay exists through the whole fade and is only released once it
    /// settled back to transparent.
    pub(crate) fn overlay_state(&self) -> (bool, bool) {
        match self.phase {
            Some(FadePhase::Out) | Some(FadePhase::In) => (true, true),
            Some(FadePhase::Settle) => (true, false),
            None => (false, false),
        }
    }
}

/// Opacity of the main-clip layer sitting at catalog index `index`.
///
/// During the fade-out the outgoing layer is the only one showing; in every
/// other situation exactly the current layer shows, unless an idle clip has
/// the screen.
pub(crate) fn main_layer_opacity(
    index: i32,
    current: i32,
    visual_previous: i32,
    is_idle: bool,
    phase: Option<FadePhase>,
) -> f64 {
    match phase {
        Some(FadePhase::Out) => {
            if index == visual_previous {
                1.
            } else {
                0.
            }
        }
        _ => {
            if is_idle {
                0.
            } else if index == current {
                1.
            } else {
                0.
            }
        }
    }
}

/// Opacity of the shared idle-loop layer.
///
/// A detached idle element never shows. During the fade-out it is hidden with
/// everything else behind the outgoing layer; from the handoff on it is the
/// revealed layer whenever the incoming module idles.
pub(crate) fn idle_layer_opacity(attached: bool, is_idle: bool, phase: Option<FadePhase>) -> f64 {
    if !attached {
        return 0.;
    }
    match phase {
        Some(FadePhase::Out) => 0.,
        Some(FadePhase::In) | Some(FadePhase::Settle) => 1.,
        None => {
            if is_idle {
                1.
            } else {
                0.
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_module_from_intro_swaps_instantly() {
        assert_eq!(classify_transition(-1, 0), TransitionKind::Instant);
    }

    #[test]
    fn deep_link_from_intro_fades() {
        assert_eq!(classify_transition(-1, 2), TransitionKind::Fade);
    }

    #[test]
    fn sequential_forward_swaps_instantly() {
        assert_eq!(classify_transition(2, 3), TransitionKind::Instant);
    }

    #[test]
    fn backward_and_jumps_fade() {
        assert_eq!(classify_transition(2, 1), TransitionKind::Fade);
        assert_eq!(classify_transition(2, 5), TransitionKind::Fade);
    }

    #[test]
    fn unchanged_or_invalid_targets_do_nothing() {
        assert_eq!(classify_transition(2, 2), TransitionKind::None);
        assert_eq!(classify_transition(2, -1), TransitionKind::None);
    }

    #[test]
    fn phases_run_out_in_settle_then_stop() {
        let mut fade = FadeTransition::new();
        assert_eq!(fade.begin(3), FADE_OUT_MS + FADE_BRIDGE_MS);
        assert_eq!(fade.phase(), Some(FadePhase::Out));
        assert_eq!(fade.advance(), Some(FADE_IN_MS));
        assert_eq!(fade.phase(), Some(FadePhase::In));
        assert_eq!(fade.advance(), Some(FADE_SETTLE_MS));
        assert_eq!(fade.phase(), Some(FadePhase::Settle));
        assert_eq!(fade.advance(), None);
        assert!(!fade.is_running());
    }

    #[test]
    fn stale_timers_are_not_acknowledged() {
        let mut fade = FadeTransition::new();
        fade.begin(1);
        fade.set_pending_timer(7.);
        assert!(!fade.acknowledge_timer(3.));
        assert!(fade.acknowledge_timer(7.));
        // Acknowledged timers are consumed.
        assert!(!fade.acknowledge_timer(7.));
    }

    #[test]
    fn cancel_returns_the_pending_timer_and_stops_the_fade() {
        let mut fade = FadeTransition::new();
        fade.begin(1);
        fade.set_pending_timer(12.);
        assert_eq!(fade.cancel(), Some(12.));
        assert!(!fade.is_running());
        assert_eq!(fade.cancel(), None);
    }

    #[test]
    fn reselecting_the_visible_layer_mid_fade_leaves_no_fade_behind() {
        // A fade toward module 2 is mid-flight while module 0 still holds the
        // visual-previous slot.
        let mut fade = FadeTransition::new();
        fade.begin(2);
        fade.set_pending_timer(4.);
        assert!(fade.acknowledge_timer(4.));
        assert_eq!(fade.advance(), Some(FADE_IN_MS));
        fade.set_pending_timer(5.);
        // Switching back to module 0 is no visual transition at all, so a
        // switch cancels the running fade before classifying. The cancel
        // retires the timer with the run; its late resolution advances
        // nothing.
        assert_eq!(classify_transition(0, 0), TransitionKind::None);
        assert_eq!(fade.cancel(), Some(5.));
        assert!(!fade.is_running());
        assert!(!fade.acknowledge_timer(5.));
    }

    #[test]
    fn overlay_is_opaque_until_the_settle_phase() {
        let mut fade = FadeTransition::new();
        assert_eq!(fade.overlay_state(), (false, false));
        fade.begin(2);
        assert_eq!(fade.overlay_state(), (true, true));
        fade.advance();
        assert_eq!(fade.overlay_state(), (true, true));
        fade.advance();
        assert_eq!(fade.overlay_state(), (true, false));
        fade.advance();
        assert_eq!(fade.overlay_state(), (false, false));
    }

    #[test]
    fn only_the_outgoing_layer_shows_during_fade_out() {
        let phase = Some(FadePhase::Out);
        assert_eq!(main_layer_opacity(1, 3, 1, false, phase), 1.);
        assert_eq!(main_layer_opacity(3, 3, 1, false, phase), 0.);
        assert_eq!(idle_layer_opacity(true, true, phase), 0.);
    }

    #[test]
    fn incoming_idle_layer_shows_from_the_handoff_on() {
        assert_eq!(idle_layer_opacity(true, true, Some(FadePhase::In)), 1.);
        assert_eq!(idle_layer_opacity(true, true, Some(FadePhase::Settle)), 1.);
        // The incoming main layer takes over instead when the module does not
        // idle.
        assert_eq!(main_layer_opacity(3, 3, 1, false, Some(FadePhase::In)), 1.);
        assert_eq!(main_layer_opacity(1, 3, 1, false, Some(FadePhase::In)), 0.);
    }

    #[test]
    fn outside_fades_exactly_one_layer_shows() {
        assert_eq!(main_layer_opacity(2, 2, 2, false, None), 1.);
        assert_eq!(main_layer_opacity(1, 2, 2, false, None), 0.);
        assert_eq!(main_layer_opacity(2, 2, 2, true, None), 0.);
        assert_eq!(idle_layer_opacity(true, true, None), 1.);
        assert_eq!(idle_layer_opacity(true, false, None), 0.);
    }

    #[test]
    fn detached_idle_layer_never_shows() {
        assert_eq!(idle_layer_opacity(false, true, None), 0.);
        assert_eq!(idle_layer_opacity(false, true, Some(FadePhase::In)), 0.);
    }
}
