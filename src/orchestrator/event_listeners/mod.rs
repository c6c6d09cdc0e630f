use super::Orchestrator;
use crate::{
    bindings::{JsMemoryBlob, MediaObservation, RequestId, ResourceId, TimerId, TimerReason},
    media_element::ElementRole,
    requester::DocumentKind,
    wasm_bindgen, Logger,
};

/// Methods triggered on JavaScript events by the JavaScript code.
#[wasm_bindgen]
impl Orchestrator {
    /// The JS code should call this method each time an HTTP(S) request
    /// started with `jsFetchDocument` finished with success.
    ///
    /// # Arguments
    ///
    /// * `request_id` - The identifier given by `jsFetchDocument` when the
    ///   request was started, identifying which request finished.
    ///
    /// * `resource_id` - Id refering to the fetched data on the
    ///   JavaScript-side.
    pub fn on_request_finished(&mut self, request_id: RequestId, resource_id: ResourceId) {
        let blob = JsMemoryBlob::from_resource_id(resource_id);
        match self.requester.on_request_finished(request_id) {
            Some((DocumentKind::ModuleCatalog, url)) => {
                Logger::debug(&format!("Core: Module catalog fetched: {}", url));
                self.on_catalog_fetched(blob);
            }
            Some((DocumentKind::IntroSettings, url)) => {
                Logger::debug(&format!("Core: Intro settings fetched: {}", url));
                self.on_intro_fetched(blob);
            }
            None => {
                Logger::warn("Core: Finished request's id not found. Ignoring.");
            }
        }
    }

    /// The JS code should call this method each time an HTTP(S) request
    /// started with `jsFetchDocument` failed, with the HTTP status received
    /// if the failure came with one.
    pub fn on_request_failed(&mut self, request_id: RequestId, status: Option<u32>) {
        match self.requester.on_request_failed(request_id) {
            Some((DocumentKind::ModuleCatalog, url)) => {
                Logger::warn(&format!("Core: Module catalog request failed: {}", url));
                self.on_catalog_request_failed(status);
            }
            Some((DocumentKind::IntroSettings, url)) => {
                Logger::warn(&format!("Core: Intro settings request failed: {}", url));
                self.on_intro_request_failed(status);
            }
            None => {
                Logger::warn("Core: Failed request's id not found. Ignoring.");
            }
        }
    }

    /// The JS code should call this method each time a timer started with
    /// `jsTimer` resolved, with the `TimerReason` given when it was started.
    pub fn on_timer_ended(&mut self, id: TimerId, reason: TimerReason) {
        match reason {
            TimerReason::SelectionDebounce => self.on_selection_debounce_ended(id),
            TimerReason::FadeStep => self.on_fade_step_ended(id),
            TimerReason::AdvanceReveal => self.on_advance_reveal_ended(id),
            TimerReason::IdleResume => self.on_idle_resume_ended(id),
        }
    }

    /// The JS code should call this method each time one of the media events
    /// listened to fires on an element created through `jsCreateMediaElement`,
    /// with a `MediaObservation` built from the event target's attributes.
    pub fn on_media_event(&mut self, observation: MediaObservation) {
        let role = match self.pool.locate_mut(observation.element_id()) {
            Some((role, handle)) => {
                handle.absorb_observation(&observation);
                role
            }
            None => {
                Logger::debug("Core: Media event for an unknown element. Ignoring.");
                return;
            }
        };
        match role {
            ElementRole::Main(index) => self.on_main_element_event(index, &observation),
            ElementRole::IdleLoop => self.on_idle_element_event(&observation),
        }
    }
}
