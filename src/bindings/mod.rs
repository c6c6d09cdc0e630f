mod event_listeners;
mod js_functions;

pub use event_listeners::{JsMemoryBlob, MediaEventKind, MediaObservation};
pub use js_functions::*;
