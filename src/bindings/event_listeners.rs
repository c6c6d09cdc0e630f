use super::js_functions::{self, jsGetResourceData, ElementId, ResourceId};
use crate::wasm_bindgen;

/// Media events relayed from the `<video>` elements of the layer stack.
///
/// Each variant maps to the HTMLMediaElement event of the same name; the
/// JavaScript-side builds a `MediaObservation` out of the event target's
/// attributes and hands it to the `on_media_event` method of the
/// `Orchestrator`.
#[wasm_bindgen]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MediaEventKind {
    LoadStart,
    LoadedMetadata,
    CanPlay,
    TimeUpdate,
    Play,
    Pause,
    Ended,
    Error,
}

/// Handle on a fetched document body kept in JavaScript's memory.
///
/// Obtaining the bytes consumes the handle; dropping it frees the
/// JavaScript-side resource in all cases, so a response nobody routed still
/// cannot leak.
pub struct JsMemoryBlob {
    id: ResourceId,
}

impl JsMemoryBlob {
    pub fn from_resource_id(id: ResourceId) -> Self {
        Self { id }
    }

    /// Copy the resource's bytes over to the WebAssembly side, consuming the
    /// handle.
    pub fn obtain(self) -> Vec<u8> {
        jsGetResourceData(self.id).unwrap()
    }
}

impl Drop for JsMemoryBlob {
    fn drop(&mut self) {
        js_functions::jsFreeResource(self.id);
    }
}

/// Playback information observed on one element of the layer stack at the time
/// one of its media events fired.
#[wasm_bindgen]
pub struct MediaObservation {
    kind: MediaEventKind,
    element_id: ElementId,
    current_time: f64,
    duration: f64,
    ready_state: u8,
    paused: bool,
    seeking: bool,
}

#[wasm_bindgen]
impl MediaObservation {
    #[wasm_bindgen(constructor)]
    pub fn new(
        kind: MediaEventKind,
        element_id: ElementId,
        current_time: f64,
        duration: f64,
        ready_state: u8,
        paused: bool,
        seeking: bool,
    ) -> Self {
        Self {
            kind,
            element_id,
            current_time,
            duration,
            ready_state,
            paused,
            seeking,
        }
    }
}

impl MediaObservation {
    #[inline(always)]
    pub fn kind(&self) -> MediaEventKind {
        self.kind
    }

    #[inline(always)]
    pub fn element_id(&self) -> ElementId {
        self.element_id
    }

    #[inline(always)]
    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    #[inline(always)]
    pub fn duration(&self) -> f64 {
        self.duration
    }

    #[inline(always)]
    pub fn ready_state(&self) -> u8 {
        self.ready_state
    }

    #[inline(always)]
    pub fn paused(&self) -> bool {
        self.paused
    }

    #[inline(always)]
    pub fn seeking(&self) -> bool {
        self.seeking
    }
}
