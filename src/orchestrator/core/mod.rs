use super::{
    loop_monitor::{self, IdleTickAction, MainTickAction},
    transition::{self, FadePhase, TransitionKind},
    Orchestrator,
};
use crate::{
    bindings::{
        jsAnnounceAdvanceAffordance, jsAnnounceCatalogReady, jsAnnounceIntroSettings,
        jsAnnounceLoadingChange, jsAnnounceLoopBoundary, jsAnnounceModuleChange,
        jsAnnouncePageChange, jsAnnouncePanelStage, jsClearTimer, jsSendCatalogError,
        jsSendMediaError, jsSetFadeOverlay, jsTimer, CatalogErrorCode, JsMemoryBlob,
        MediaErrorCode, MediaEventKind, MediaObservation, PageKind, PanelStage, TimerId,
        TimerReason,
    },
    catalog::{documents::CatalogError, CatalogStore},
    media_element::MediaElementPool,
    panel::PanelStore,
    playback::{
        classify_selection, PlaybackAction, PlaybackStore, SelectionOutcome, SELECTION_DEBOUNCE_MS,
    },
    Logger,
};

/// Delay between entering idle playback and revealing the advance affordance,
/// so it does not flicker on fast module switches.
const ADVANCE_REVEAL_DELAY_MS: f64 = 1000.;

/// How playback should stand right after a module switch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum SwitchMode {
    /// Start the new module's main clip right away.
    Playing,

    /// Keep the main clip paused, generally so a fade can run first.
    Paused,

    /// Land on the new module's idle loop instead of its main clip.
    Idle,
}

impl Orchestrator {
    /// Completely reset the player: abort requests, clear every timer, drop
    /// the media elements and put every store back to its initial state.
    pub(super) fn internal_stop(&mut self) {
        Logger::info("Core: Stopping the experience and resetting the player");
        self.requester.reset();
        self.clear_pending_selection();
        if let Some(id) = self.fade.cancel() {
            jsClearTimer(id);
        }
        if let Some(id) = self.advance_timer.take() {
            jsClearTimer(id);
        }
        if let Some(id) = self.idle_resume_timer.take() {
            jsClearTimer(id);
        }
        self.pool.clear();
        self.catalog = CatalogStore::new();
        self.playback = PlaybackStore::new();
        self.panel = PanelStore::new();
        self.loop_monitor.reset();
        self.visual_previous_index = -1;
        self.advance_visible = false;
        self.announced_loading = None;
        self.footnote_refs.reset(std::iter::empty());
        self.glossary_refs.reset(std::iter::empty());
        self.applied_overlay = None;
        jsSetFadeOverlay(false, false);
    }

    // ---- Document ingestion

    pub(super) fn on_catalog_fetched(&mut self, blob: JsMemoryBlob) {
        let data = blob.obtain();
        match self.catalog.on_catalog_loaded(&data) {
            Ok(count) => {
                Logger::info(&format!("Core: Module catalog loaded, {} module(s)", count));
                jsAnnounceCatalogReady(count as u32);
                self.prepare_media_elements();
            }
            Err(err) => {
                Logger::error(&format!("Core: Could not read the module catalog: {}", err));
                self.catalog.mark_failed();
                jsSendCatalogError(true, CatalogErrorCode::ParsingError, Some(&err.to_string()));
            }
        }
    }

    pub(super) fn on_catalog_request_failed(&mut self, status: Option<u32>) {
        let err = CatalogError::RequestFailed { status };
        Logger::error(&format!("Core: Could not fetch the module catalog: {}", err));
        self.catalog.mark_failed();
        jsSendCatalogError(true, CatalogErrorCode::RequestFailed, Some(&err.to_string()));
    }

    /// A failure around the intro settings only loses the custom button label
    /// and the intro idle clip; the experience still starts.
    pub(super) fn on_intro_fetched(&mut self, blob: JsMemoryBlob) {
        let data = blob.obtain();
        match self.catalog.on_intro_loaded(&data) {
            Ok(true) => {
                Logger::info("Core: Intro settings loaded");
                jsAnnounceIntroSettings(self.catalog.intro_button_label());
                if self.playback.state().current_module_index == -1 {
                    // The intro idle clip may only be attachable from now on.
                    self.refresh_idle_attachment();
                    self.apply_layers();
                    self.sync_playback();
                }
            }
            Ok(false) => {
                Logger::info("Core: No intro settings document published");
            }
            Err(err) => {
                Logger::warn(&format!("Core: Could not read the intro settings: {}", err));
            }
        }
    }

    pub(super) fn on_intro_request_failed(&mut self, status: Option<u32>) {
        let err = CatalogError::RequestFailed { status };
        Logger::warn(&format!("Core: Could not fetch the intro settings: {}", err));
    }

    /// Build the media element stack for the loaded catalog and attach every
    /// main stream to its element, so later module switches never wait on an
    /// attachment.
    fn prepare_media_elements(&mut self) {
        match MediaElementPool::build(self.catalog.len()) {
            Ok(pool) => self.pool = pool,
            Err(err) => {
                Logger::error(&format!(
                    "Core: Could not build the media element stack: {}",
                    err
                ));
                jsSendMediaError(MediaErrorCode::ElementCreationError, Some(&err.to_string()));
                return;
            }
        }
        for index in 0..self.catalog.len() as i32 {
            match self.catalog.get(index).and_then(|m| m.main_stream_url()) {
                Some(url) => {
                    if let Some(handle) = self.pool.main_mut(index) {
                        if let Err(err) = handle.attach(url) {
                            Logger::error(&format!(
                                "Core: Could not attach module {} main stream: {}",
                                index, err
                            ));
                            jsSendMediaError(
                                MediaErrorCode::StreamSessionError,
                                Some(&err.to_string()),
                            );
                        }
                    }
                }
                None => {
                    Logger::warn(&format!(
                        "Core: Module {} has no resolvable main stream",
                        index
                    ));
                }
            }
        }
        self.refresh_idle_attachment();
        self.apply_layers();
        self.sync_playback();
    }

    /// Point the shared idle element at the idle clip of the current module
    /// (or at the intro clip while no module is current), detaching it when
    /// there is none.
    pub(super) fn refresh_idle_attachment(&mut self) {
        let index = self.playback.state().current_module_index;
        let url = if index == -1 {
            self.catalog.intro_idle_url()
        } else {
            self.catalog.get(index).and_then(|m| m.idle_stream_url())
        };
        self.loop_monitor.reset();
        match url {
            Some(url) => {
                if let Some(idle) = self.pool.idle_mut() {
                    if let Err(err) = idle.attach(url) {
                        Logger::error(&format!("Core: Could not attach the idle stream: {}", err));
                        jsSendMediaError(
                            MediaErrorCode::StreamSessionError,
                            Some(&err.to_string()),
                        );
                    }
                }
            }
            None => {
                if let Some(idle) = self.pool.idle_mut() {
                    idle.detach();
                }
            }
        }
    }

    // ---- Module selection and switching

    /// Route a selection request. Every request first cancels a pending
    /// debounced one, so rapid successive selections only commit the last.
    pub(super) fn apply_selection(&mut self, target: i32) {
        self.clear_pending_selection();
        if self.catalog.get(target).is_none() {
            Logger::warn(&format!("Core: Ignoring selection of unknown module {}", target));
            return;
        }
        match classify_selection(self.playback.state(), target) {
            SelectionOutcome::Ignore => {
                Logger::debug(&format!("Core: Module {} already idling, nothing to do", target));
            }
            SelectionOutcome::SwitchStayIdle => {
                self.switch_module(target, SwitchMode::Idle);
            }
            SelectionOutcome::Queue => {
                Logger::info(&format!(
                    "Core: Queueing module {} for the next loop boundary",
                    target
                ));
                self.playback
                    .dispatch(PlaybackAction::QueueModule(Some(target)));
            }
            SelectionOutcome::SwitchPaused => {
                self.switch_module(target, SwitchMode::Paused);
            }
            SelectionOutcome::Debounce => {
                let id = jsTimer(SELECTION_DEBOUNCE_MS, TimerReason::SelectionDebounce);
                if let Some(old) = self.pending_selection.schedule(id, target) {
                    jsClearTimer(old);
                }
            }
        }
    }

    /// Make the module at `index` current and reconcile everything that hangs
    /// off the current index: announcements, reference numbering, the idle
    /// attachment, the visual transition and element playback.
    pub(super) fn switch_module(&mut self, index: i32, mode: SwitchMode) {
        Logger::info(&format!("Core: Switching to module {}", index));
        // A fade still running here belongs to a superseded switch. Stop it
        // and its timer before classifying the new transition, even when the
        // target is the layer already on screen.
        if let Some(id) = self.fade.cancel() {
            jsClearTimer(id);
        }
        self.playback.dispatch(PlaybackAction::SetModule(index));
        match mode {
            SwitchMode::Playing => self.playback.dispatch(PlaybackAction::Play),
            SwitchMode::Paused => self.playback.dispatch(PlaybackAction::Pause),
            SwitchMode::Idle => {
                self.playback.dispatch(PlaybackAction::SetIdle(true));
                self.playback.dispatch(PlaybackAction::Pause);
            }
        }
        self.announce_module_change();
        self.rebuild_reference_registries();
        self.refresh_idle_attachment();
        match transition::classify_transition(self.visual_previous_index, index) {
            TransitionKind::None => {
                self.apply_layers();
            }
            TransitionKind::Instant => {
                self.visual_previous_index = index;
                self.apply_layers();
            }
            TransitionKind::Fade => {
                self.begin_fade(index);
            }
        }
        self.refresh_advance_affordance();
        self.sync_playback();
    }

    fn announce_module_change(&mut self) {
        let index = self.playback.state().current_module_index;
        let slug = self.catalog.get(index).map(|m| m.slug.clone());
        jsAnnounceModuleChange(index, slug.as_deref());
    }

    /// Renumber the footnote and glossary entries for the current module and
    /// forget which ones the previous module's body referenced.
    fn rebuild_reference_registries(&mut self) {
        let index = self.playback.state().current_module_index;
        match self.catalog.get(index) {
            Some(module) => {
                self.footnote_refs
                    .reset(module.footnotes.iter().map(|f| f.id.as_str()));
                self.glossary_refs
                    .reset(module.glossary.iter().map(|g| g.id.as_str()));
            }
            None => {
                self.footnote_refs.reset(std::iter::empty());
                self.glossary_refs.reset(std::iter::empty());
            }
        }
    }

    /// Record the module page in the panel store and announce the navigation.
    pub(super) fn show_module_page(&mut self, index: i32) {
        let slug = match self.catalog.get(index) {
            Some(module) => module.slug.clone(),
            None => return,
        };
        self.panel.set_module_page(index, slug.clone());
        jsAnnouncePageChange(PageKind::Module, Some(&slug));
        jsAnnouncePanelStage(PanelStage::Peek);
    }

    pub(super) fn clear_pending_selection(&mut self) {
        if let Some(id) = self.pending_selection.clear() {
            jsClearTimer(id);
        }
    }

    // ---- Fades

    /// Start the three-phase fade toward `index`. The caller has already
    /// cancelled whatever fade was running, so the slot is free.
    fn begin_fade(&mut self, index: i32) {
        Logger::info(&format!("Core: Fading toward module {}", index));
        let delay = self.fade.begin(index);
        // Until the handoff the outgoing layer keeps the screen while the
        // overlay darkens; the incoming element waits at its first frame.
        self.playback.dispatch(PlaybackAction::SetIdle(false));
        if let Some(outgoing) = self.pool.main(self.visual_previous_index) {
            outgoing.pause();
        }
        if let Some(incoming) = self.pool.main(index) {
            incoming.seek(0.);
        }
        self.apply_layers();
        let id = jsTimer(delay, TimerReason::FadeStep);
        self.fade.set_pending_timer(id);
    }

    /// A fade-phase timer resolved. Stale timers (from a cancelled fade) are
    /// recognized and dropped.
    pub(super) fn on_fade_step_ended(&mut self, id: TimerId) {
        if !self.fade.acknowledge_timer(id) {
            Logger::debug("Core: Ignoring a stale fade timer");
            return;
        }
        let target = self.fade.target();
        match self.fade.advance() {
            Some(delay) => {
                if self.fade.phase() == Some(FadePhase::In) {
                    // Handoff under the opaque overlay: the incoming module's
                    // idle clip becomes the revealed layer when it has one.
                    let has_idle = self
                        .catalog
                        .get(target)
                        .map(|m| m.has_idle_clip())
                        .unwrap_or(false);
                    if has_idle {
                        self.playback.dispatch(PlaybackAction::SetIdle(true));
                    }
                    self.apply_layers();
                    self.sync_playback();
                    if has_idle {
                        self.refresh_advance_affordance();
                    }
                } else {
                    // Settle: the overlay animates back to transparent.
                    self.apply_layers();
                }
                let timer = jsTimer(delay, TimerReason::FadeStep);
                self.fade.set_pending_timer(timer);
            }
            None => {
                Logger::debug(&format!("Core: Fade toward module {} completed", target));
                self.visual_previous_index = target;
                self.apply_layers();
                self.sync_playback();
            }
        }
    }

    // ---- Other timers

    pub(super) fn on_selection_debounce_ended(&mut self, id: TimerId) {
        match self.pending_selection.acknowledge_timer(id) {
            Some(target) => {
                Logger::debug(&format!(
                    "Core: Selection debounce elapsed, switching to module {}",
                    target
                ));
                self.switch_module(target, SwitchMode::Playing);
            }
            None => {
                Logger::debug("Core: Ignoring a stale selection timer");
            }
        }
    }

    pub(super) fn on_advance_reveal_ended(&mut self, id: TimerId) {
        if self.advance_timer != Some(id) {
            Logger::debug("Core: Ignoring a stale advance-reveal timer");
            return;
        }
        self.advance_timer = None;
        if self.advance_eligible() {
            self.set_advance_visible(true);
        }
    }

    pub(super) fn on_idle_resume_ended(&mut self, id: TimerId) {
        if self.idle_resume_timer != Some(id) {
            return;
        }
        self.idle_resume_timer = None;
        if !self.playback.state().is_idle || self.fade.is_running() {
            return;
        }
        if let Some(idle) = self.pool.idle() {
            if idle.is_attached() && idle.is_paused() {
                Logger::debug("Core: Resuming the idle loop after an unexpected pause");
                idle.play();
            }
        }
    }

    // ---- Advance affordance

    fn advance_eligible(&self) -> bool {
        let state = self.playback.state();
        state.is_idle
            && state.current_module_index >= 0
            && self.catalog.get_next(state.current_module_index).is_some()
    }

    /// Hide the advance affordance and restart its reveal delay if the state
    /// still calls for it. Runs on every change of module or of the idle flag.
    pub(super) fn refresh_advance_affordance(&mut self) {
        if let Some(id) = self.advance_timer.take() {
            jsClearTimer(id);
        }
        self.set_advance_visible(false);
        if self.advance_eligible() {
            let id = jsTimer(ADVANCE_REVEAL_DELAY_MS, TimerReason::AdvanceReveal);
            self.advance_timer = Some(id);
        }
    }

    pub(super) fn hide_advance_affordance(&mut self) {
        if let Some(id) = self.advance_timer.take() {
            jsClearTimer(id);
        }
        self.set_advance_visible(false);
    }

    fn set_advance_visible(&mut self, visible: bool) {
        if self.advance_visible != visible {
            self.advance_visible = visible;
            jsAnnounceAdvanceAffordance(visible);
        }
    }

    // ---- Media events

    pub(super) fn on_main_element_event(&mut self, index: usize, observation: &MediaObservation) {
        let is_current = index as i32 == self.playback.state().current_module_index;
        match observation.kind() {
            MediaEventKind::LoadStart => {
                if is_current {
                    self.set_loading(true);
                }
            }
            MediaEventKind::LoadedMetadata => {
                if is_current {
                    self.playback
                        .dispatch(PlaybackAction::SetDuration(observation.duration()));
                    self.set_loading(false);
                }
            }
            MediaEventKind::TimeUpdate => {
                self.on_main_tick(index, observation.current_time(), observation.duration());
            }
            MediaEventKind::Ended => {
                self.on_main_ended(index);
            }
            MediaEventKind::Error => {
                Logger::error(&format!("Core: Error event on module {} main element", index));
                jsSendMediaError(
                    MediaErrorCode::PlaybackError,
                    Some("Error event on a main-clip element."),
                );
                if is_current {
                    self.set_loading(false);
                }
            }
            _ => {}
        }
    }

    pub(super) fn on_idle_element_event(&mut self, observation: &MediaObservation) {
        match observation.kind() {
            MediaEventKind::LoadedMetadata => {
                self.set_loading(false);
            }
            MediaEventKind::TimeUpdate => {
                self.on_idle_tick(
                    observation.current_time(),
                    observation.duration(),
                    observation.seeking(),
                );
            }
            MediaEventKind::Ended => {
                // Platforms without a native wrap stop here; restart by hand.
                if self.playback.state().is_idle {
                    if let Some(idle) = self.pool.idle() {
                        idle.restart_loop();
                        idle.play();
                    }
                }
            }
            MediaEventKind::Pause => {
                let expected_looping =
                    self.playback.state().is_idle && !self.fade.is_running();
                if expected_looping && self.idle_resume_timer.is_none() {
                    // Pause we did not ask for, likely a silent stop at the
                    // loop boundary: resume on the next tick.
                    let id = jsTimer(0., TimerReason::IdleResume);
                    self.idle_resume_timer = Some(id);
                }
            }
            MediaEventKind::Error => {
                Logger::error("Core: Error event on the idle element");
                jsSendMediaError(
                    MediaErrorCode::PlaybackError,
                    Some("Error event on the idle-loop element."),
                );
                self.set_loading(false);
            }
            _ => {}
        }
    }

    /// One `timeupdate` tick of a main element. Only the current module's
    /// element drives the playback state, and only outside idle playback.
    pub(super) fn on_main_tick(&mut self, index: usize, current_time: f64, duration: f64) {
        let (is_idle, current, final_hold) = {
            let state = self.playback.state();
            (state.is_idle, state.current_module_index, state.final_hold)
        };
        if is_idle || index as i32 != current {
            return;
        }
        self.playback.dispatch(PlaybackAction::SetTime(current_time));
        let has_idle = self
            .catalog
            .get(current)
            .map(|m| m.has_idle_clip())
            .unwrap_or(false);
        match loop_monitor::main_tick_action(has_idle, final_hold, current_time, duration) {
            MainTickAction::PrestartIdle => {
                // Roll the idle clip under the main layer so the handoff has
                // no black flash.
                if let Some(idle) = self.pool.idle() {
                    if idle.is_attached() {
                        idle.seek(0.);
                        idle.play();
                    }
                }
            }
            MainTickAction::EnterIdle => {
                Logger::debug("Core: Main clip ending, handing off to the idle loop");
                self.enter_idle();
            }
            MainTickAction::EnterFinalHold => {
                Logger::debug(
                    "Core: Main clip ending without an idle clip, holding its last frame",
                );
                self.enter_final_hold();
            }
            MainTickAction::Track => {}
        }
    }

    /// One `timeupdate` tick of the idle element while an idle clip loops.
    pub(super) fn on_idle_tick(&mut self, current_time: f64, duration: f64, seeking: bool) {
        if !self.playback.state().is_idle {
            return;
        }
        self.playback.dispatch(PlaybackAction::SetTime(current_time));
        let tick = self.loop_monitor.observe(current_time, duration, seeking);
        if tick.boundary {
            jsAnnounceLoopBoundary();
        }
        let queued = self.playback.state().queued_module_index;
        match loop_monitor::idle_tick_action(queued, tick) {
            IdleTickAction::CommitQueued(target) => {
                Logger::info(&format!(
                    "Core: Loop boundary reached, committing queued module {}",
                    target
                ));
                // Pause first so the clip cannot start another loop during
                // the handoff.
                if let Some(idle) = self.pool.idle() {
                    idle.pause();
                }
                self.playback.dispatch(PlaybackAction::QueueModule(None));
                self.switch_module(target, SwitchMode::Playing);
            }
            IdleTickAction::RestartLoop => {
                if let Some(idle) = self.pool.idle() {
                    idle.restart_loop();
                    idle.play();
                }
            }
            IdleTickAction::Track => {}
        }
    }

    fn on_main_ended(&mut self, index: usize) {
        let (is_idle, current) = {
            let state = self.playback.state();
            (state.is_idle, state.current_module_index)
        };
        if is_idle || index as i32 != current {
            return;
        }
        let has_idle = self
            .catalog
            .get(current)
            .map(|m| m.has_idle_clip())
            .unwrap_or(false);
        if has_idle {
            Logger::debug(&format!(
                "Core: Module {} main clip ended, looping its idle clip",
                index
            ));
            self.enter_idle();
        } else {
            Logger::debug(&format!(
                "Core: Module {} main clip ended, holding its last frame",
                index
            ));
            self.enter_final_hold();
        }
    }

    fn enter_idle(&mut self) {
        self.playback.dispatch(PlaybackAction::SetIdle(true));
        self.apply_layers();
        self.sync_playback();
        self.refresh_advance_affordance();
    }

    /// Terminal sub-state of a module without idle clip: its main clip ran
    /// out, from the end window or from `ended`, and the element holds its
    /// last frame until the next interaction.
    fn enter_final_hold(&mut self) {
        self.playback.dispatch(PlaybackAction::Pause);
        self.playback.dispatch(PlaybackAction::SetFinalHold(true));
        self.sync_playback();
    }

    // ---- Reconciliation

    /// Reconcile the play/pause state of every element with the stores: the
    /// current main element plays only while nothing fades or idles over it,
    /// every other main element waits paused at its start, the next module's
    /// element gets primed and the idle element loops whenever an idle clip
    /// has the screen.
    pub(super) fn sync_playback(&mut self) {
        let (current, is_idle, is_playing) = {
            let state = self.playback.state();
            (state.current_module_index, state.is_idle, state.is_playing)
        };
        let fading = self.fade.is_running();

        if let Some(handle) = self.pool.main(current) {
            if !is_idle && !fading && is_playing {
                handle.play();
            } else {
                handle.pause();
            }
        }
        for index in 0..self.pool.mains().len() as i32 {
            if index != current {
                if let Some(handle) = self.pool.main(index) {
                    handle.pause();
                    handle.rewind();
                }
            }
        }
        if !fading && is_playing {
            if let Some(next) = self.pool.main_mut(current + 1) {
                if next.needs_priming() {
                    next.prime();
                }
            }
        }
        if let Some(idle) = self.pool.idle() {
            if is_idle && idle.is_attached() {
                idle.play();
            } else {
                idle.pause();
            }
        }
    }

    /// Apply the opacity every layer should have right now, plus the fade
    /// overlay's state. Values already applied are skipped by the handles.
    pub(super) fn apply_layers(&mut self) {
        let (current, is_idle) = {
            let state = self.playback.state();
            (state.current_module_index, state.is_idle)
        };
        let phase = self.fade.phase();
        let visual_previous = self.visual_previous_index;

        for index in 0..self.pool.mains().len() as i32 {
            let opacity =
                transition::main_layer_opacity(index, current, visual_previous, is_idle, phase);
            if let Some(handle) = self.pool.main_mut(index) {
                handle.set_opacity(opacity);
            }
        }
        if let Some(idle) = self.pool.idle_mut() {
            let opacity = transition::idle_layer_opacity(idle.is_attached(), is_idle, phase);
            idle.set_opacity(opacity);
        }
        let overlay = self.fade.overlay_state();
        if self.applied_overlay != Some(overlay) {
            self.applied_overlay = Some(overlay);
            jsSetFadeOverlay(overlay.0, overlay.1);
        }
    }

    /// Update the loading flag, announcing it to the host when it changed.
    pub(super) fn set_loading(&mut self, loading: bool) {
        self.playback.dispatch(PlaybackAction::SetLoading(loading));
        if self.announced_loading != Some(loading) {
            self.announced_loading = Some(loading);
            jsAnnounceLoadingChange(loading);
        }
    }
}
