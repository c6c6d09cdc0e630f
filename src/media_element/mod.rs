use crate::bindings::{
    jsCanPlayHlsNatively, jsClearElementSource, jsCreateMediaElement, jsFastSeekElement,
    jsHasFastSeek, jsIsMseSupported, jsPauseElement, jsPlayElement, jsPrimeElement,
    jsRemoveMediaElement, jsSeekElement, jsSetElementOpacity, jsSetElementSource,
    jsStartStreamSession, jsStopStreamSession, ElementId, JsResult, MediaElementKind,
    MediaObservation, StartStreamSessionErrorCode,
};
use crate::source;
use crate::utils::url::Url;
use crate::Logger;

/// `readyState` value from which the current position has decodable data.
const HAVE_CURRENT_DATA: u8 = 2;

/// Offset used instead of `0.` when restarting a loop without `fastSeek`
/// support, to avoid stalling on a keyframe wait at the exact start.
const RESTART_OFFSET: f64 = 0.001;

/// How a stream URL should be handed to a media element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AttachmentMode {
    /// The element plays HLS natively and no streaming session is wanted: set
    /// its `src` attribute to the playlist URL directly.
    Direct,

    /// Media Source Extensions are usable: run a streaming session on the
    /// element.
    StreamSession,

    /// Neither native HLS nor MSE: fall back to the progressive rendition.
    Progressive,
}

/// Decide how to attach a stream to an element, given what the environment
/// supports. Native playback is only chosen when no streaming session could be
/// run instead.
pub(crate) fn attachment_mode(native_hls: bool, mse_supported: bool) -> AttachmentMode {
    if native_hls && !mse_supported {
        AttachmentMode::Direct
    } else if mse_supported {
        AttachmentMode::StreamSession
    } else {
        AttachmentMode::Progressive
    }
}

/// Structure linked to one `<video>` element of the layer stack, allowing to
/// attach stream URLs to it and to perform media-related actions on it:
/// playing, pausing, seeking, priming and opacity updates.
///
/// It also mirrors the observable playback attributes of the element, updated
/// from each `MediaObservation` it appears in.
pub(crate) struct MediaElementHandle {
    /// Identifier of the underlying element on the JavaScript-side.
    id: ElementId,

    /// Role of the underlying element in the layer stack.
    kind: MediaElementKind,

    /// URL currently attached to the element.
    ///
    /// Attachment is idempotent: re-attaching the same URL is a no-op. This is
    /// the authoritative marker for that check, the element itself is never
    /// inspected.
    attached: Option<Url>,

    /// Set when a streaming session is running on the element, in which case it
    /// has to be stopped before any new attachment.
    session_active: bool,

    /// Last observed `readyState` of the element.
    ready_state: u8,

    /// Last observed playhead position of the element, in seconds.
    current_time: f64,

    /// Last observed duration of the element, in seconds. `0.` if unknown.
    duration: f64,

    /// Last observed paused attribute of the element.
    is_paused: bool,

    /// Last opacity forwarded to the element, kept to avoid re-applying the
    /// same value on every reconciliation.
    applied_opacity: Option<f64>,

    /// Set once priming was requested for the currently attached URL, cleared
    /// when the element reports enough data or the attachment changes.
    prime_requested: bool,
}

impl MediaElementHandle {
    /// Create the underlying `<video>` element and the handle driving it.
    pub(crate) fn new(kind: MediaElementKind) -> Result<Self, MediaElementError> {
        let id = jsCreateMediaElement(kind)
            .result()
            .map_err(|(_, desc)| MediaElementError::CreationFailed {
                kind,
                message: desc.unwrap_or_else(|| "Unknown Error.".to_string()),
            })?;
        Ok(Self {
            id,
            kind,
            attached: None,
            session_active: false,
            ready_state: 0,
            current_time: 0.,
            duration: 0.,
            is_paused: true,
            applied_opacity: None,
            prime_requested: false,
        })
    }

    pub(crate) fn id(&self) -> ElementId {
        self.id
    }

    /// Attach the given stream URL to the element.
    ///
    /// If that exact URL is already attached this does nothing. Otherwise any
    /// previous streaming session is stopped first, then the URL is handed to
    /// the element according to `attachment_mode`.
    pub(crate) fn attach(&mut self, url: Url) -> Result<(), MediaElementError> {
        if self.attached.as_ref() == Some(&url) {
            Logger::lazy_debug(&|| {
                format!(
                    "MediaElement: {} element already attached to {}",
                    self.kind, url
                )
            });
            return Ok(());
        }
        if self.session_active {
            jsStopStreamSession(self.id);
            self.session_active = false;
        }
        self.attached = None;
        self.ready_state = 0;
        self.current_time = 0.;
        self.duration = 0.;
        self.prime_requested = false;

        match attachment_mode(jsCanPlayHlsNatively(self.id), jsIsMseSupported()) {
            AttachmentMode::Direct => {
                Logger::info(&format!(
                    "MediaElement: attaching {} natively to {} element",
                    url, self.kind
                ));
                jsSetElementSource(self.id, url.get_ref());
            }
            AttachmentMode::StreamSession => {
                Logger::info(&format!(
                    "MediaElement: starting streaming session for {} on {} element",
                    url, self.kind
                ));
                jsClearElementSource(self.id);
                jsStartStreamSession(self.id, url.get_ref())
                    .result()
                    .map_err(MediaElementError::from)?;
                self.session_active = true;
            }
            AttachmentMode::Progressive => {
                let fallback =
                    source::progressive_rendition(&url).unwrap_or_else(|| url.clone());
                Logger::info(&format!(
                    "MediaElement: no HLS support, attaching progressive rendition {}",
                    fallback
                ));
                jsSetElementSource(self.id, fallback.get_ref());
            }
        }
        self.attached = Some(url);
        Ok(())
    }

    /// Detach whatever stream the element holds, clearing its source. Used on
    /// the idle element when the current module has no idle clip.
    pub(crate) fn detach(&mut self) {
        if self.attached.is_none() {
            return;
        }
        Logger::info(&format!("MediaElement: detaching {} element", self.kind));
        if self.session_active {
            jsStopStreamSession(self.id);
            self.session_active = false;
        }
        jsClearElementSource(self.id);
        self.attached = None;
        self.ready_state = 0;
        self.current_time = 0.;
        self.duration = 0.;
        self.prime_requested = false;
    }

    pub(crate) fn is_attached(&self) -> bool {
        self.attached.is_some()
    }

    pub(crate) fn play(&self) {
        jsPlayElement(self.id);
    }

    pub(crate) fn pause(&self) {
        jsPauseElement(self.id);
    }

    pub(crate) fn seek(&self, position: f64) {
        jsSeekElement(self.id, position);
    }

    /// Put the playhead back to the start if it moved, so an inactive main
    /// element is ready for its next activation.
    pub(crate) fn rewind(&self) {
        if self.current_time > 0. {
            jsSeekElement(self.id, 0.);
        }
    }

    /// Seek back to the start of a looping clip, through `fastSeek` when the
    /// element supports it.
    pub(crate) fn restart_loop(&self) {
        if jsHasFastSeek(self.id) {
            jsFastSeekElement(self.id, 0.);
        } else {
            jsSeekElement(self.id, RESTART_OFFSET);
        }
    }

    /// Force the element to decode a first frame, at most once per attachment.
    pub(crate) fn prime(&mut self) {
        if !self.prime_requested {
            self.prime_requested = true;
            jsPrimeElement(self.id);
        }
    }

    /// `true` when the element has an attached source but not yet data for its
    /// current position, and priming was not already requested.
    pub(crate) fn needs_priming(&self) -> bool {
        self.attached.is_some() && self.ready_state < HAVE_CURRENT_DATA && !self.prime_requested
    }

    pub(crate) fn set_opacity(&mut self, opacity: f64) {
        if self.applied_opacity != Some(opacity) {
            self.applied_opacity = Some(opacity);
            jsSetElementOpacity(self.id, opacity);
        }
    }

    /// Mirror the observable attributes carried by a `MediaObservation` that
    /// targeted this element.
    pub(crate) fn absorb_observation(&mut self, observation: &MediaObservation) {
        self.ready_state = observation.ready_state();
        self.current_time = observation.current_time();
        self.is_paused = observation.paused();
        let duration = observation.duration();
        if duration.is_finite() {
            self.duration = duration;
        }
        if self.ready_state >= HAVE_CURRENT_DATA {
            // The element holds decodable data again: future attachments may
            // need a fresh priming round.
            self.prime_requested = false;
        }
    }

    pub(crate) fn current_time(&self) -> f64 {
        self.current_time
    }

    pub(crate) fn duration(&self) -> f64 {
        self.duration
    }

    pub(crate) fn ready_state(&self) -> u8 {
        self.ready_state
    }

    pub(crate) fn applied_opacity(&self) -> Option<f64> {
        self.applied_opacity
    }

    pub(crate) fn is_paused(&self) -> bool {
        self.is_paused
    }
}

impl Drop for MediaElementHandle {
    fn drop(&mut self) {
        if self.session_active {
            jsStopStreamSession(self.id);
        }
        jsRemoveMediaElement(self.id);
    }
}

/// Which element of the pool an `ElementId` resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ElementRole {
    /// Main-clip element of the module at that catalog index.
    Main(usize),

    /// The shared idle-loop element.
    IdleLoop,
}

/// The pool of media elements the orchestrator drives: one main-clip element
/// per module plus the single shared idle-loop element.
pub(crate) struct MediaElementPool {
    mains: Vec<MediaElementHandle>,
    idle: Option<MediaElementHandle>,
}

impl MediaElementPool {
    pub(crate) fn empty() -> Self {
        Self {
            mains: vec![],
            idle: None,
        }
    }

    /// Create one main element per module and the shared idle element.
    pub(crate) fn build(module_count: usize) -> Result<Self, MediaElementError> {
        let mut mains = Vec::with_capacity(module_count);
        for _ in 0..module_count {
            mains.push(MediaElementHandle::new(MediaElementKind::MainClip)?);
        }
        let idle = MediaElementHandle::new(MediaElementKind::IdleLoop)?;
        Ok(Self {
            mains,
            idle: Some(idle),
        })
    }

    pub(crate) fn main(&self, index: i32) -> Option<&MediaElementHandle> {
        if index < 0 {
            None
        } else {
            self.mains.get(index as usize)
        }
    }

    pub(crate) fn main_mut(&mut self, index: i32) -> Option<&mut MediaElementHandle> {
        if index < 0 {
            None
        } else {
            self.mains.get_mut(index as usize)
        }
    }

    pub(crate) fn idle(&self) -> Option<&MediaElementHandle> {
        self.idle.as_ref()
    }

    pub(crate) fn idle_mut(&mut self) -> Option<&mut MediaElementHandle> {
        self.idle.as_mut()
    }

    pub(crate) fn mains(&self) -> &[MediaElementHandle] {
        &self.mains
    }

    /// Resolve the element behind an `ElementId` along with its role.
    pub(crate) fn locate_mut(
        &mut self,
        id: ElementId,
    ) -> Option<(ElementRole, &mut MediaElementHandle)> {
        if let Some(idx) = self.mains.iter().position(|handle| handle.id() == id) {
            return Some((ElementRole::Main(idx), &mut self.mains[idx]));
        }
        match self.idle.as_mut() {
            Some(handle) if handle.id() == id => Some((ElementRole::IdleLoop, handle)),
            _ => None,
        }
    }

    /// Drop every element, removing them from the page.
    pub(crate) fn clear(&mut self) {
        self.mains.clear();
        self.idle = None;
    }
}

use thiserror::Error;

/// Error that may be returned when creating elements or attaching streams.
#[derive(Error, Debug)]
pub(crate) enum MediaElementError {
    #[error("Could not create a {kind} media element: {message}")]
    CreationFailed {
        kind: MediaElementKind,
        message: String,
    },
    #[error("Could not start a streaming session: {message}")]
    SessionFailed { message: String },
}

impl From<(StartStreamSessionErrorCode, Option<String>)> for MediaElementError {
    fn from(x: (StartStreamSessionErrorCode, Option<String>)) -> Self {
        let fallback = match x.0 {
            StartStreamSessionErrorCode::ElementNotFound => "Media element not found.",
            StartStreamSessionErrorCode::LibraryUnavailable => "No streaming library usable.",
            StartStreamSessionErrorCode::UnknownError => "Unknown Error.",
        };
        MediaElementError::SessionFailed {
            message: x.1.unwrap_or_else(|| fallback.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_hls_is_only_used_without_mse() {
        assert_eq!(attachment_mode(true, false), AttachmentMode::Direct);
        assert_eq!(attachment_mode(true, true), AttachmentMode::StreamSession);
    }

    #[test]
    fn mse_wins_over_progressive() {
        assert_eq!(attachment_mode(false, true), AttachmentMode::StreamSession);
    }

    #[test]
    fn progressive_is_the_last_resort() {
        assert_eq!(attachment_mode(false, false), AttachmentMode::Progressive);
    }
}
