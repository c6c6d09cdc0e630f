use crate::{
    bindings::TimerId,
    catalog::{references::ReferenceRegistry, CatalogStore},
    media_element::MediaElementPool,
    panel::PanelStore,
    playback::{PendingSelection, PlaybackStore},
    requester::DocumentRequester,
    wasm_bindgen,
};

mod api;
mod core;
mod event_listeners;
pub(crate) mod loop_monitor;
pub(crate) mod transition;

use loop_monitor::LoopMonitor;
use transition::FadeTransition;

/// The `Orchestrator` is the player core exported to the JavaScript-side,
/// providing an API to load the module catalog, react to user intents and
/// drive the stack of media elements presenting the modules.
#[wasm_bindgen]
pub struct Orchestrator {
    /// The ordered module catalog and the intro settings document.
    catalog: CatalogStore,

    /// Reducer-style store of the playback state.
    playback: PlaybackStore,

    /// Navigation state around the video: current page, panel stage, top menu.
    panel: PanelStore,

    /// The media elements driven by this `Orchestrator`: one main-clip
    /// element per module plus the shared idle-loop element.
    pool: MediaElementPool,

    /// Performs the catalog and intro settings requests, and keeps track of
    /// the ones still pending.
    requester: DocumentRequester,

    /// State machine of the fade currently running, if any.
    fade: FadeTransition,

    /// Wrap-around detection on the idle element's `timeupdate` ticks.
    loop_monitor: LoopMonitor,

    /// Index of the module whose layer is currently on screen. Only advances
    /// once a transition completed; `-1` while the intro shows.
    visual_previous_index: i32,

    /// Debounced module selection not yet committed.
    pending_selection: PendingSelection,

    /// Pending timer for the delayed reveal of the "next chapter" affordance.
    advance_timer: Option<TimerId>,

    /// Whether the "next chapter" affordance is currently shown.
    advance_visible: bool,

    /// Pending zero-delay timer resuming the idle element after a pause that
    /// did not come from us.
    idle_resume_timer: Option<TimerId>,

    /// Last `(mounted, opaque)` pair applied to the fade overlay.
    applied_overlay: Option<(bool, bool)>,

    /// Last loading flag announced to the host.
    announced_loading: Option<bool>,

    /// Footnote numbering of the current module.
    footnote_refs: ReferenceRegistry,

    /// Glossary numbering of the current module.
    glossary_refs: ReferenceRegistry,
}
