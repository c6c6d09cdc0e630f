use crate::bindings::{PageKind, PanelStage};

/// # panel
///
/// Store of the navigation state around the video: which logical page is
/// presented, the stage of the content panel over it and the top menu flag.
///
/// Like the playback store it performs no effect; the orchestrator announces
/// changes to the host after dispatching into it.

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PanelState {
    pub(crate) current_page: Option<PageKind>,
    pub(crate) current_slug: Option<String>,
    /// Index of the last module page shown, kept so static pages can return
    /// to it.
    pub(crate) previous_module_index: Option<i32>,
    pub(crate) stage: PanelStage,
    pub(crate) top_menu_open: bool,
}

impl Default for PanelState {
    fn default() -> Self {
        Self {
            current_page: None,
            current_slug: None,
            previous_module_index: None,
            stage: PanelStage::Hidden,
            top_menu_open: false,
        }
    }
}

pub(crate) struct PanelStore {
    state: PanelState,
}

impl PanelStore {
    pub(crate) fn new() -> Self {
        Self {
            state: PanelState::default(),
        }
    }

    pub(crate) fn state(&self) -> &PanelState {
        &self.state
    }

    /// Present a static page: the panel opens fully on it.
    pub(crate) fn set_current_page(&mut self, page: PageKind, slug: Option<String>) {
        self.state.current_page = Some(page);
        self.state.current_slug = slug;
        self.state.stage = PanelStage::Expanded;
    }

    /// Present a module page: the panel only peeks so the video stays the
    /// focus, and the module index is remembered for later returns.
    pub(crate) fn set_module_page(&mut self, index: i32, slug: String) {
        self.state.current_page = Some(PageKind::Module);
        self.state.current_slug = Some(slug);
        self.state.previous_module_index = Some(index);
        self.state.stage = PanelStage::Peek;
    }

    /// Returns `true` if the stage actually changed.
    pub(crate) fn show_peek(&mut self) -> bool {
        self.set_stage(PanelStage::Peek)
    }

    /// Returns `true` if the stage actually changed.
    pub(crate) fn expand(&mut self) -> bool {
        self.set_stage(PanelStage::Expanded)
    }

    /// Returns `true` if the stage actually changed.
    pub(crate) fn collapse(&mut self) -> bool {
        self.set_stage(PanelStage::Hidden)
    }

    /// Hidden and expanded toggle into each other; from a peeking panel,
    /// toggling hides. Returns the new stage.
    pub(crate) fn toggle(&mut self) -> PanelStage {
        let next = match self.state.stage {
            PanelStage::Hidden => PanelStage::Expanded,
            PanelStage::Peek | PanelStage::Expanded => PanelStage::Hidden,
        };
        self.state.stage = next;
        next
    }

    /// Returns `true` if the flag actually changed.
    pub(crate) fn open_top_menu(&mut self) -> bool {
        let changed = !self.state.top_menu_open;
        self.state.top_menu_open = true;
        changed
    }

    /// Returns `true` if the flag actually changed.
    pub(crate) fn close_top_menu(&mut self) -> bool {
        let changed = self.state.top_menu_open;
        self.state.top_menu_open = false;
        changed
    }

    /// Returns the new open state.
    pub(crate) fn toggle_top_menu(&mut self) -> bool {
        self.state.top_menu_open = !self.state.top_menu_open;
        self.state.top_menu_open
    }

    pub(crate) fn is_expanded(&self) -> bool {
        self.state.stage != PanelStage::Hidden
    }

    pub(crate) fn is_module_page(&self) -> bool {
        self.state.current_page == Some(PageKind::Module)
    }

    fn set_stage(&mut self, stage: PanelStage) -> bool {
        let changed = self.state.stage != stage;
        self.state.stage = stage;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_hidden_without_a_page() {
        let store = PanelStore::new();
        assert_eq!(store.state().current_page, None);
        assert_eq!(store.state().current_slug, None);
        assert_eq!(store.state().previous_module_index, None);
        assert_eq!(store.state().stage, PanelStage::Hidden);
        assert!(!store.state().top_menu_open);
        assert!(!store.is_expanded());
    }

    #[test]
    fn module_pages_peek_static_pages_expand() {
        let mut store = PanelStore::new();
        store.set_module_page(2, "on-light".to_owned());
        assert_eq!(store.state().stage, PanelStage::Peek);
        assert_eq!(store.state().previous_module_index, Some(2));
        assert!(store.is_module_page());

        store.set_current_page(PageKind::About, Some("about".to_owned()));
        assert_eq!(store.state().stage, PanelStage::Expanded);
        assert!(!store.is_module_page());
        // The previous module index survives the detour through a static page.
        assert_eq!(store.state().previous_module_index, Some(2));
    }

    #[test]
    fn toggle_from_peek_hides() {
        let mut store = PanelStore::new();
        store.set_module_page(0, "intro".to_owned());
        assert_eq!(store.toggle(), PanelStage::Hidden);
        assert_eq!(store.toggle(), PanelStage::Expanded);
        assert_eq!(store.toggle(), PanelStage::Hidden);
    }

    #[test]
    fn stage_setters_report_changes() {
        let mut store = PanelStore::new();
        assert!(store.show_peek());
        assert!(!store.show_peek());
        assert!(store.expand());
        assert!(store.collapse());
        assert!(!store.collapse());
    }

    #[test]
    fn top_menu_toggles() {
        let mut store = PanelStore::new();
        assert!(store.toggle_top_menu());
        assert!(!store.toggle_top_menu());
        assert!(store.open_top_menu());
        assert!(!store.open_top_menu());
        assert!(store.close_top_menu());
        assert!(!store.close_top_menu());
    }
}
