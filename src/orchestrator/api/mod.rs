use super::{
    core::SwitchMode, loop_monitor::LoopMonitor, transition::FadeTransition, Orchestrator,
};
use crate::{
    bindings::{jsAnnouncePageChange, jsAnnouncePanelStage, jsAnnounceTopMenuToggle, PageKind,
        PanelStage},
    catalog::{references::ReferenceRegistry, CatalogStore},
    media_element::{MediaElementHandle, MediaElementPool},
    panel::PanelStore,
    playback::{PendingSelection, PlaybackAction, PlaybackStore},
    requester::{DocumentKind, DocumentRequester},
    utils::logger::LoggerLevel,
    utils::url::Url,
    wasm_bindgen, Logger,
};

/// Methods exposed to the JavaScript-side.
///
/// Note that these are not the only methods callable by JavaScript. There's
/// also "event_listeners" which as its name point at, should be called when particular
/// events happen. Such "event_listeners" are defined in its own file.
#[wasm_bindgen]
impl Orchestrator {
    /// Create a new `Orchestrator`, not yet linked to any module catalog.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Orchestrator {
            catalog: CatalogStore::new(),
            playback: PlaybackStore::new(),
            panel: PanelStore::new(),
            pool: MediaElementPool::empty(),
            requester: DocumentRequester::new(),
            fade: FadeTransition::new(),
            loop_monitor: LoopMonitor::new(),
            visual_previous_index: -1,
            pending_selection: PendingSelection::new(),
            advance_timer: None,
            advance_visible: false,
            idle_resume_timer: None,
            applied_overlay: None,
            announced_loading: None,
            footnote_refs: ReferenceRegistry::new(),
            glossary_refs: ReferenceRegistry::new(),
        }
    }

    /// Start fetching the module catalog at the given URL. The catalog is
    /// fetched at most once per session.
    pub fn load_catalog(&mut self, url: String) {
        Logger::info("load_catalog called");
        if self.requester.is_pending(DocumentKind::ModuleCatalog) {
            Logger::warn("Core: A module catalog request is already pending");
            return;
        }
        if !self.catalog.is_loading() {
            Logger::warn("Core: The module catalog was already loaded");
            return;
        }
        self.requester
            .fetch_document(Url::new(url), DocumentKind::ModuleCatalog);
    }

    /// Start fetching the intro settings document at the given URL.
    pub fn load_intro(&mut self, url: String) {
        Logger::info("load_intro called");
        if self.requester.is_pending(DocumentKind::IntroSettings) {
            Logger::warn("Core: An intro settings request is already pending");
            return;
        }
        self.requester
            .fetch_document(Url::new(url), DocumentKind::IntroSettings);
    }

    /// Leave the intro and start playing the first module.
    pub fn begin(&mut self) {
        Logger::info("begin called");
        if self.catalog.is_empty() {
            Logger::warn("Core: Cannot begin without a loaded module catalog");
            return;
        }
        if self.playback.state().current_module_index != -1 {
            Logger::warn("Core: The experience already began");
            return;
        }
        self.switch_module(0, SwitchMode::Playing);
        self.show_module_page(0);
    }

    /// Select the module at the given catalog index, as a click in the
    /// navigation would. The panel navigates to the module's page right away
    /// even when the video part of the switch is queued or debounced.
    pub fn select_module(&mut self, index: i32) {
        Logger::info(&format!("select_module called: {}", index));
        self.apply_selection(index);
        self.show_module_page(index);
    }

    /// Select a module through its slug, as a deep link would.
    pub fn select_module_by_slug(&mut self, slug: String) {
        Logger::info(&format!("select_module_by_slug called: {}", slug));
        let index = self.catalog.get_by_slug(&slug).map(|(index, _)| index);
        match index {
            Some(index) => {
                self.apply_selection(index);
                self.show_module_page(index);
            }
            None => {
                Logger::warn(&format!("Core: No module with slug {}", slug));
            }
        }
    }

    /// Advance to the next module, as the advance affordance does.
    pub fn advance_to_next(&mut self) {
        Logger::info("advance_to_next called");
        let current = self.playback.state().current_module_index;
        if self.catalog.get_next(current).is_none() {
            Logger::warn("Core: No next module to advance to");
            return;
        }
        self.hide_advance_affordance();
        self.apply_selection(current + 1);
        self.show_module_page(current + 1);
    }

    /// Toggle the play/pause state of the current module's main clip. While
    /// the module holds its ended last frame, playing restarts from the top.
    pub fn toggle_play_pause(&mut self) {
        Logger::info("toggle_play_pause called");
        let (is_playing, final_hold, current) = {
            let state = self.playback.state();
            (state.is_playing, state.final_hold, state.current_module_index)
        };
        if is_playing {
            self.playback.dispatch(PlaybackAction::Pause);
        } else {
            if final_hold {
                if let Some(handle) = self.pool.main(current) {
                    handle.seek(0.);
                }
            }
            self.playback.dispatch(PlaybackAction::Play);
        }
        self.sync_playback();
    }

    /// Present one of the static pages; the panel opens fully on it. Module
    /// pages are reached through module selection instead.
    pub fn open_page(&mut self, page: PageKind, slug: Option<String>) {
        Logger::info(&format!("open_page called: {}", page));
        if page == PageKind::Module {
            Logger::warn("Core: Module pages open through module selection");
            return;
        }
        self.panel.set_current_page(page, slug.clone());
        jsAnnouncePageChange(page, slug.as_deref());
        jsAnnouncePanelStage(PanelStage::Expanded);
    }

    pub fn show_panel_peek(&mut self) {
        if self.panel.show_peek() {
            jsAnnouncePanelStage(PanelStage::Peek);
        }
    }

    pub fn expand_panel(&mut self) {
        if self.panel.expand() {
            jsAnnouncePanelStage(PanelStage::Expanded);
        }
    }

    pub fn collapse_panel(&mut self) {
        if self.panel.collapse() {
            jsAnnouncePanelStage(PanelStage::Hidden);
        }
    }

    pub fn toggle_panel(&mut self) {
        let stage = self.panel.toggle();
        jsAnnouncePanelStage(stage);
    }

    pub fn open_top_menu(&mut self) {
        if self.panel.open_top_menu() {
            jsAnnounceTopMenuToggle(true);
        }
    }

    pub fn close_top_menu(&mut self) {
        if self.panel.close_top_menu() {
            jsAnnounceTopMenuToggle(false);
        }
    }

    pub fn toggle_top_menu(&mut self) {
        let opened = self.panel.toggle_top_menu();
        jsAnnounceTopMenuToggle(opened);
    }

    /// Record that the rendered body referenced the given footnote and return
    /// its stable 1-based number, `0` for an unknown id.
    pub fn register_footnote_reference(&mut self, id: String) -> u32 {
        self.footnote_refs.register(&id) as u32
    }

    /// Record that the rendered body referenced the given glossary entry and
    /// return its stable 1-based number, `0` for an unknown id.
    pub fn register_glossary_reference(&mut self, id: String) -> u32 {
        self.glossary_refs.register(&id) as u32
    }

    /// JSON array of the footnote ids referenced so far, in order of first
    /// reference.
    pub fn referenced_footnotes_json(&self) -> String {
        serde_json::to_string(self.footnote_refs.referenced()).unwrap_or_else(|_| "[]".to_owned())
    }

    /// JSON array of the glossary ids referenced so far, in order of first
    /// reference.
    pub fn referenced_glossary_json(&self) -> String {
        serde_json::to_string(self.glossary_refs.referenced()).unwrap_or_else(|_| "[]".to_owned())
    }

    /// JSON array summarizing every module of the catalog for navigation
    /// purposes.
    pub fn module_summaries_json(&self) -> String {
        self.catalog
            .summaries_json()
            .unwrap_or_else(|_| "[]".to_owned())
    }

    /// Full JSON document of the module at the given index, `None` when out
    /// of bounds.
    pub fn module_content_json(&self, index: i32) -> Option<String> {
        let module = self.catalog.get(index)?;
        serde_json::to_string(module).ok()
    }

    pub fn intro_button_label(&self) -> String {
        self.catalog.intro_button_label().to_owned()
    }

    pub fn catalog_error(&self) -> Option<String> {
        self.catalog.error().map(|e| e.to_owned())
    }

    pub fn is_catalog_loading(&self) -> bool {
        self.catalog.is_loading()
    }

    pub fn module_count(&self) -> u32 {
        self.catalog.len() as u32
    }

    pub fn current_module_index(&self) -> i32 {
        self.playback.state().current_module_index
    }

    pub fn queued_module_index(&self) -> Option<i32> {
        self.playback.state().queued_module_index
    }

    pub fn is_playing(&self) -> bool {
        self.playback.state().is_playing
    }

    pub fn is_idle(&self) -> bool {
        self.playback.state().is_idle
    }

    pub fn is_loading(&self) -> bool {
        self.playback.state().is_loading
    }

    pub fn is_in_final_hold(&self) -> bool {
        self.playback.state().final_hold
    }

    pub fn current_time(&self) -> f64 {
        self.playback.state().current_time
    }

    pub fn duration(&self) -> f64 {
        self.playback.state().duration
    }

    pub fn panel_stage(&self) -> PanelStage {
        self.panel.state().stage
    }

    pub fn is_panel_expanded(&self) -> bool {
        self.panel.is_expanded()
    }

    pub fn current_page(&self) -> Option<PageKind> {
        self.panel.state().current_page
    }

    pub fn current_slug(&self) -> Option<String> {
        self.panel.state().current_slug.clone()
    }

    pub fn is_top_menu_open(&self) -> bool {
        self.panel.state().top_menu_open
    }

    /// One JSON object with the whole player state, for debugging overlays.
    pub fn debug_snapshot(&self) -> String {
        let playback = self.playback.state();
        let panel = self.panel.state();
        let element_json = |handle: &MediaElementHandle| {
            serde_json::json!({
                "attached": handle.is_attached(),
                "readyState": handle.ready_state(),
                "time": handle.current_time(),
                "opacity": handle.applied_opacity(),
                "paused": handle.is_paused(),
            })
        };
        let mains = self
            .pool
            .mains()
            .iter()
            .map(element_json)
            .collect::<Vec<_>>();
        serde_json::json!({
            "currentModuleIndex": playback.current_module_index,
            "visualPreviousIndex": self.visual_previous_index,
            "isPlaying": playback.is_playing,
            "isIdle": playback.is_idle,
            "isLoading": playback.is_loading,
            "finalHold": playback.final_hold,
            "queuedModuleIndex": playback.queued_module_index,
            "currentTime": playback.current_time,
            "duration": playback.duration,
            "fadePhase": self.fade.phase().map(|p| format!("{:?}", p)),
            "advanceVisible": self.advance_visible,
            "moduleCount": self.catalog.len(),
            "catalogError": self.catalog.error(),
            "panelStage": format!("{}", panel.stage),
            "topMenuOpen": panel.top_menu_open,
            "mainElements": mains,
            "idleElement": self.pool.idle().map(element_json),
        })
        .to_string()
    }

    /// Stop the experience, abort pending requests and reset every store.
    pub fn stop(&mut self) {
        Logger::info("stop called");
        self.internal_stop();
    }

    /// Update the maximum level of the messages forwarded through `jsLog`:
    /// `0` for none up to `4` for debug.
    pub fn set_logger_level(level: u8) {
        Logger::set_logger_level(match level {
            0 => LoggerLevel::None,
            1 => LoggerLevel::Error,
            2 => LoggerLevel::Warn,
            3 => LoggerLevel::Info,
            _ => LoggerLevel::Debug,
        });
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new()
    }
}
