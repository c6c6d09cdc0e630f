use crate::bindings::TimerId;

/// # playback
///
/// Reducer-style store of the playback state shared by the whole player: which
/// module is current, whether its main clip is playing or its idle clip is
/// looping, and the bookkeeping flags around it.
///
/// The store performs no effect of its own. The orchestrator dispatches
/// actions into it and then reconciles the media elements with the resulting
/// state.

/// Time to wait after the last selection before committing it, while the main
/// clip is playing. Rapid successive selections only commit the last target.
pub(crate) const SELECTION_DEBOUNCE_MS: f64 = 350.;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum PlaybackAction {
    /// Make the given module current. Clears the idle flag, the queued index,
    /// the final-hold flag and resets the current time.
    SetModule(i32),
    Play,
    Pause,
    SetIdle(bool),
    SetTime(f64),
    SetDuration(f64),
    SetLoading(bool),
    QueueModule(Option<i32>),
    /// Terminal sub-state of a module without idle clip: its main clip ended
    /// and the element holds its last frame.
    SetFinalHold(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PlaybackState {
    /// Index of the current module in the catalog, `-1` for the intro.
    pub(crate) current_module_index: i32,
    pub(crate) is_playing: bool,
    /// `true` while an idle clip (or the intro clip) is the visible layer.
    pub(crate) is_idle: bool,
    pub(crate) current_time: f64,
    pub(crate) duration: f64,
    pub(crate) is_loading: bool,
    /// Module index stored for commit at the next idle loop boundary.
    pub(crate) queued_module_index: Option<i32>,
    pub(crate) final_hold: bool,
}

impl Default for PlaybackState {
    /// The player starts on the intro: index `-1`, idle so the intro clip
    /// loops, loading until media is ready.
    fn default() -> Self {
        Self {
            current_module_index: -1,
            is_playing: false,
            is_idle: true,
            current_time: 0.,
            duration: 0.,
            is_loading: true,
            queued_module_index: None,
            final_hold: false,
        }
    }
}

pub(crate) struct PlaybackStore {
    state: PlaybackState,
}

impl PlaybackStore {
    pub(crate) fn new() -> Self {
        Self {
            state: PlaybackState::default(),
        }
    }

    pub(crate) fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub(crate) fn dispatch(&mut self, action: PlaybackAction) {
        match action {
            PlaybackAction::SetModule(index) => {
                self.state.current_module_index = index;
                self.state.is_idle = false;
                self.state.current_time = 0.;
                self.state.queued_module_index = None;
                self.state.final_hold = false;
            }
            PlaybackAction::Play => {
                self.state.is_playing = true;
                self.state.final_hold = false;
            }
            PlaybackAction::Pause => {
                self.state.is_playing = false;
            }
            PlaybackAction::SetIdle(idle) => {
                self.state.is_idle = idle;
            }
            PlaybackAction::SetTime(time) => {
                self.state.current_time = time;
            }
            PlaybackAction::SetDuration(duration) => {
                self.state.duration = duration;
            }
            PlaybackAction::SetLoading(loading) => {
                self.state.is_loading = loading;
            }
            PlaybackAction::QueueModule(index) => {
                self.state.queued_module_index = index;
            }
            PlaybackAction::SetFinalHold(hold) => {
                self.state.final_hold = hold;
            }
        }
    }
}

/// What a module selection request should do, given the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SelectionOutcome {
    /// Selecting the module already current while idle: keep its loop running.
    Ignore,

    /// Selecting from the intro: switch right away but stay idle and paused so
    /// the new module's idle clip loops.
    SwitchStayIdle,

    /// Selecting the next sequential module while idle: queue it and let the
    /// loop reach its boundary first.
    Queue,

    /// Selecting any other module while idle: switch right away, stay paused
    /// for a clean fade to the new idle clip.
    SwitchPaused,

    /// Selecting while the main clip plays: debounce, last selection wins.
    Debounce,
}

/// Classify a selection request. Pure; the orchestrator applies the outcome
/// (including the cancellation of any pending debounce, which happens for
/// every outcome).
pub(crate) fn classify_selection(state: &PlaybackState, target: i32) -> SelectionOutcome {
    if state.is_idle {
        if target == state.current_module_index {
            SelectionOutcome::Ignore
        } else if state.current_module_index == -1 {
            SelectionOutcome::SwitchStayIdle
        } else if target == state.current_module_index + 1 {
            SelectionOutcome::Queue
        } else {
            SelectionOutcome::SwitchPaused
        }
    } else {
        SelectionOutcome::Debounce
    }
}

/// Debounced module selection not yet committed. At most one selection is
/// pending at a time; the slot pairs the target index with the timer that
/// will commit it, so a timer from a superseded selection can never commit.
pub(crate) struct PendingSelection {
    pending: Option<(TimerId, i32)>,
}

impl PendingSelection {
    pub(crate) fn new() -> Self {
        Self { pending: None }
    }

    /// Record the timer scheduled to commit `target`. Hands back the timer of
    /// the selection it supersedes, which the caller clears.
    pub(crate) fn schedule(&mut self, id: TimerId, target: i32) -> Option<TimerId> {
        self.pending.replace((id, target)).map(|(old, _)| old)
    }

    /// Check a resolved timer against the pending selection. A match consumes
    /// the slot and returns the target to commit; a stale timer returns
    /// nothing.
    pub(crate) fn acknowledge_timer(&mut self, id: TimerId) -> Option<i32> {
        match self.pending {
            Some((pending, target)) if pending == id => {
                self.pending = None;
                Some(target)
            }
            _ => None,
        }
    }

    /// Drop the pending selection, handing back its timer to clear.
    pub(crate) fn clear(&mut self) -> Option<TimerId> {
        self.pending.take().map(|(id, _)| id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idle_on(index: i32) -> PlaybackState {
        PlaybackState {
            current_module_index: index,
            is_idle: true,
            ..PlaybackState::default()
        }
    }

    #[test]
    fn starts_on_the_intro_idle_and_loading() {
        let state = PlaybackState::default();
        assert_eq!(state.current_module_index, -1);
        assert!(state.is_idle);
        assert!(!state.is_playing);
        assert!(state.is_loading);
        assert_eq!(state.queued_module_index, None);
        assert!(!state.final_hold);
    }

    #[test]
    fn set_module_clears_idle_queue_time_and_final_hold() {
        let mut store = PlaybackStore::new();
        store.dispatch(PlaybackAction::QueueModule(Some(2)));
        store.dispatch(PlaybackAction::SetTime(12.5));
        store.dispatch(PlaybackAction::SetFinalHold(true));
        store.dispatch(PlaybackAction::SetModule(3));
        let state = store.state();
        assert_eq!(state.current_module_index, 3);
        assert!(!state.is_idle);
        assert_eq!(state.current_time, 0.);
        assert_eq!(state.queued_module_index, None);
        assert!(!state.final_hold);
    }

    #[test]
    fn play_leaves_final_hold() {
        let mut store = PlaybackStore::new();
        store.dispatch(PlaybackAction::SetFinalHold(true));
        store.dispatch(PlaybackAction::Play);
        assert!(store.state().is_playing);
        assert!(!store.state().final_hold);
    }

    #[test]
    fn selecting_the_current_module_while_idle_is_ignored() {
        assert_eq!(
            classify_selection(&idle_on(2), 2),
            SelectionOutcome::Ignore
        );
    }

    #[test]
    fn selecting_from_the_intro_stays_idle() {
        assert_eq!(
            classify_selection(&idle_on(-1), 0),
            SelectionOutcome::SwitchStayIdle
        );
        assert_eq!(
            classify_selection(&idle_on(-1), 4),
            SelectionOutcome::SwitchStayIdle
        );
    }

    #[test]
    fn selecting_the_next_module_while_idle_queues_it() {
        assert_eq!(classify_selection(&idle_on(2), 3), SelectionOutcome::Queue);
    }

    #[test]
    fn selecting_other_modules_while_idle_switches_paused() {
        assert_eq!(
            classify_selection(&idle_on(2), 0),
            SelectionOutcome::SwitchPaused
        );
        assert_eq!(
            classify_selection(&idle_on(2), 5),
            SelectionOutcome::SwitchPaused
        );
    }

    #[test]
    fn selecting_while_playing_debounces() {
        let playing = PlaybackState {
            current_module_index: 1,
            is_idle: false,
            is_playing: true,
            ..PlaybackState::default()
        };
        assert_eq!(classify_selection(&playing, 4), SelectionOutcome::Debounce);
    }

    #[test]
    fn queueing_does_not_touch_the_current_module() {
        let mut store = PlaybackStore::new();
        store.dispatch(PlaybackAction::SetModule(2));
        store.dispatch(PlaybackAction::SetIdle(true));
        store.dispatch(PlaybackAction::QueueModule(Some(3)));
        assert_eq!(store.state().current_module_index, 2);
        assert_eq!(store.state().queued_module_index, Some(3));
    }

    #[test]
    fn rapid_selections_commit_only_the_last_target() {
        let playing = PlaybackState {
            current_module_index: 0,
            is_idle: false,
            is_playing: true,
            ..PlaybackState::default()
        };
        let mut pending = PendingSelection::new();
        let mut cleared = Vec::new();
        // Modules 2, 5 and 7 selected in quick succession, each within the
        // debounce window of the previous one. Every request first clears the
        // pending slot and its timer, then schedules its own.
        for (id, target) in [(11., 2), (12., 5), (13., 7)] {
            if let Some(old) = pending.clear() {
                cleared.push(old);
            }
            assert_eq!(classify_selection(&playing, target), SelectionOutcome::Debounce);
            assert_eq!(pending.schedule(id, target), None);
        }
        assert_eq!(cleared, [11., 12.]);
        // The superseded timers commit nothing even if they still resolve.
        assert_eq!(pending.acknowledge_timer(11.), None);
        assert_eq!(pending.acknowledge_timer(12.), None);
        // Only the last selection commits, exactly once.
        assert_eq!(pending.acknowledge_timer(13.), Some(7));
        assert_eq!(pending.acknowledge_timer(13.), None);
        let mut store = PlaybackStore::new();
        store.dispatch(PlaybackAction::SetModule(7));
        store.dispatch(PlaybackAction::Play);
        assert_eq!(store.state().current_module_index, 7);
        assert!(store.state().is_playing);
    }

    #[test]
    fn a_cleared_selection_cannot_commit() {
        let mut pending = PendingSelection::new();
        assert_eq!(pending.schedule(4., 3), None);
        assert_eq!(pending.clear(), Some(4.));
        assert_eq!(pending.acknowledge_timer(4.), None);
        assert_eq!(pending.clear(), None);
    }

    #[test]
    fn scheduling_over_a_pending_selection_hands_back_its_timer() {
        let mut pending = PendingSelection::new();
        assert_eq!(pending.schedule(1., 2), None);
        assert_eq!(pending.schedule(2., 5), Some(1.));
        assert_eq!(pending.acknowledge_timer(1.), None);
        assert_eq!(pending.acknowledge_timer(2.), Some(5));
    }
}
