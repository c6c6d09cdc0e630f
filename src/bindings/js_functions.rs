use crate::wasm_bindgen;
use std::fmt;

/// # js_functions
///
/// This file lists all JavaScript functions that are callable from Rust as well as
/// struct and enumeration used by those functions.

#[wasm_bindgen]
extern "C" {
    // Log the given text in the JavaScript console, with the log level given.
    pub fn jsLog(log_level: LogLevel, log: &str);

    // Starts a timer for the number of milliseconds indicated by the `duration` argument.
    //
    // Once this timer has elapsed, and unless `jsClearTimer` has been called since with
    // the `TimerId` returned by this function, the `on_timer_ended` method of this
    // `Orchestrator` will be called with both the corresponding `TimerId` and `reason`,
    // which you can use on your side to better categorize timer categories.
    pub fn jsTimer(duration: f64, reason: TimerReason) -> TimerId;

    // Clear a timer started with `jsTimer`.
    pub fn jsClearTimer(id: TimerId);

    // Returns the data, as a vector of bytes of a resource behind a `ResourceId`.
    //
    // Returns `None` if that `ResourceId` is not linked to any resource right now.
    pub fn jsGetResourceData(id: ResourceId) -> Option<Vec<u8>>;

    // Fetch the document behind the given `url` from the network and await a response.
    //
    // If and when it finishes with success, the result will be emitted as a
    // `resource_id` through the `on_request_finished` method of this
    // `Orchestrator`.
    //
    // If and when it fails, the error will be emitted through the
    // `on_request_failed` method of this `Orchestrator`.
    //
    // In both cases, those methods will always be called asynchronously after the
    // `jsFetchDocument` call.
    //
    // If the request has been aborted while pending through the `jsAbortRequest`
    // function, none of those methods will be called.
    //
    // The fetched body is kept in JavaScript's memory to avoid unnecessary copies of
    // large amounts of data. To avoid memory leaks, it is __VERY__ important to call
    // the `jsFreeResource` function with that `ResourceId` once it is not needed
    // anymore.
    pub fn jsFetchDocument(url: &str) -> RequestId;

    // Abort a request started with `jsFetchDocument` based on its `request_id`.
    //
    // After calling this function, you won't get any event linked to that
    // request ever again.
    // Note that this RequestId may now be re-used in the future for any other
    // future request.
    //
    // Returns `true` if a pending request with the given RequestId was found and aborted,
    // `false` if no pending request was found with that RequestId.
    pub fn jsAbortRequest(request_id: RequestId) -> bool;

    // Free resource stored in JavaScript's memory kept alive for the current
    // `Orchestrator`.
    pub fn jsFreeResource(resource_id: ResourceId) -> bool;

    // Create a new `<video>` element of the given kind in the player's layer stack
    // and return an `ElementId` identifying it in all further element-related calls.
    //
    // Elements are created muted, playing inline and preloading, stacked on top of
    // each other; their visibility is only driven through `jsSetElementOpacity`.
    //
    // Media events fired by the created element are reported back through the
    // `on_media_event` method of this `Orchestrator`, with the same `ElementId`.
    pub fn jsCreateMediaElement(kind: MediaElementKind) -> CreateMediaElementResult;

    // Remove a media element created through `jsCreateMediaElement` and free all its
    // associated resources (such as event listeners or a streaming session still
    // running on it).
    //
    // This function performs all those operations synchronously. The `ElementId`
    // may be re-used for any element created afterwards.
    pub fn jsRemoveMediaElement(element_id: ElementId);

    // Returns `true` if the given element can play HLS content natively, that is,
    // through its `src` attribute directly (Safari being the usual case).
    pub fn jsCanPlayHlsNatively(element_id: ElementId) -> bool;

    // Returns `true` if Media Source Extensions are usable in the current
    // environment, in which case streaming sessions can be started through
    // `jsStartStreamSession`.
    pub fn jsIsMseSupported() -> bool;

    // Returns `true` if the given element implements the `fastSeek` API.
    pub fn jsHasFastSeek(element_id: ElementId) -> bool;

    // Set the `src` attribute of the given element to the given url.
    pub fn jsSetElementSource(element_id: ElementId, url: &str);

    // Remove the `src` attribute of the given element, detaching whatever resource
    // was previously linked to it.
    pub fn jsClearElementSource(element_id: ElementId);

    // Start a Media Source Extensions streaming session for the given url on the
    // given element.
    //
    // The session must not cap the selected quality to the element's displayed
    // size and must switch to the highest quality level once the manifest has
    // been parsed. Those two constraints are part of this function's contract and
    // are enforced by the JavaScript-side.
    //
    // Any error encountered by the session after this function returned success
    // is reported through the `on_media_event` method of this `Orchestrator`,
    // as an error event on the same `ElementId`.
    pub fn jsStartStreamSession(element_id: ElementId, url: &str) -> StartStreamSessionResult;

    // Stop a streaming session started with `jsStartStreamSession` on the given
    // element and free its resources.
    //
    // Returns `true` if a session was found and stopped on that element, `false`
    // otherwise.
    pub fn jsStopStreamSession(element_id: ElementId) -> bool;

    // Call `play()` on the given element.
    //
    // Rejections of the underlying promise (mostly autoplay policies) are
    // swallowed by the JavaScript-side: a paused element is re-observed through
    // `on_media_event` anyway.
    pub fn jsPlayElement(element_id: ElementId);

    // Call `pause()` on the given element.
    pub fn jsPauseElement(element_id: ElementId);

    // Move the playhead of the given element to the given position, in seconds.
    pub fn jsSeekElement(element_id: ElementId, position: f64);

    // Move the playhead of the given element through the `fastSeek` API, which may
    // trade precision for speed (e.g. by seeking to the nearest keyframe).
    //
    // Should only be called if `jsHasFastSeek` returned `true` for that element.
    pub fn jsFastSeekElement(element_id: ElementId, position: f64);

    // Force the given element to load media data for its current position, by
    // playing it muted and pausing it right away, so that a first frame is decoded
    // and ready before the element is made visible.
    pub fn jsPrimeElement(element_id: ElementId);

    // Set the opacity, between `0.` and `1.`, of the given element in the layer
    // stack.
    pub fn jsSetElementOpacity(element_id: ElementId, opacity: f64);

    // Update the full-viewport fade overlay sitting on top of the layer stack.
    //
    // `mounted` indicates whether the overlay element should currently exist at
    // all, `opaque` whether it should be fully black or transitioning to
    // transparent. The overlay's CSS transition gives the "Settle" fade phase its
    // visual exit.
    pub fn jsSetFadeOverlay(mounted: bool, opaque: bool);

    // Announce that the module catalog was successfully fetched and parsed, with
    // the number of modules it contains.
    //
    // The UI can then pull the catalog's content through the JSON getters of this
    // `Orchestrator`.
    pub fn jsAnnounceCatalogReady(module_count: u32);

    // Announce that the intro settings document was successfully fetched, with the
    // resolved label of the intro button.
    pub fn jsAnnounceIntroSettings(button_label: &str);

    // Announce that the current module changed. `index` is `-1` for the intro,
    // `slug` is `None` in that same case.
    pub fn jsAnnounceModuleChange(index: i32, slug: Option<&str>);

    // Announce that the current logical page changed.
    pub fn jsAnnouncePageChange(page: PageKind, slug: Option<&str>);

    // Announce that the content panel moved to another stage.
    pub fn jsAnnouncePanelStage(stage: PanelStage);

    // Announce that the top menu was opened (`true`) or closed (`false`).
    pub fn jsAnnounceTopMenuToggle(opened: bool);

    // Announce that the "next chapter" affordance should be shown (`true`) or
    // hidden (`false`).
    pub fn jsAnnounceAdvanceAffordance(visible: bool);

    // Announce that the loading flag changed.
    pub fn jsAnnounceLoadingChange(is_loading: bool);

    // Announce that the idle-loop element just wrapped around (or was about to
    // stall at its end and was restarted).
    //
    // The intro overlay relies on this to time its own exit on a loop seam.
    pub fn jsAnnounceLoopBoundary();

    // Announce an error related to the module catalog or the intro settings
    // document. `fatal` is `true` when the experience cannot start because of it.
    pub fn jsSendCatalogError(fatal: bool, code: CatalogErrorCode, message: Option<&str>);

    // Announce an error related to a media element or its streaming session.
    pub fn jsSendMediaError(code: MediaErrorCode, message: Option<&str>);
}

/// Error codes sent through `jsSendCatalogError`.
#[wasm_bindgen]
pub enum CatalogErrorCode {
    /// The HTTP(S) request for the document failed or timeouted.
    RequestFailed,

    /// The document was fetched but could not be parsed into the expected shape.
    ParsingError,
}

/// Error codes sent through `jsSendMediaError`.
#[wasm_bindgen]
pub enum MediaErrorCode {
    /// A media element could not be created.
    ElementCreationError,

    /// A streaming session could not be started on a media element.
    StreamSessionError,

    /// A media element emitted an error event while loading or playing its
    /// content.
    PlaybackError,
}

/// Errors that can arise when attempting to create a media element in the
/// player's layer stack.
#[wasm_bindgen]
pub enum CreateMediaElementErrorCode {
    /// The container the layer stack lives in was not (or no longer) mounted.
    NoContainerMounted,

    /// Could not create the media element because of an unknown error.
    UnknownError,
}

/// Result of calling the `jsCreateMediaElement` JavaScript function.
///
/// Creation of a `CreateMediaElementResult` should only be performed by the
/// JavaScript side through the exposed static constructors.
#[wasm_bindgen]
pub struct CreateMediaElementResult {
    element_id: ElementId,
    error: Option<(CreateMediaElementErrorCode, Option<String>)>,
}

#[wasm_bindgen]
impl CreateMediaElementResult {
    /// Creates a `CreateMediaElementResult` indicating success, with the
    /// corresponding `ElementId`.
    ///
    /// This function should only be called by the JavaScript-side.
    pub fn success(val: ElementId) -> Self {
        Self {
            element_id: val,
            error: None,
        }
    }

    /// Creates a `CreateMediaElementResult` indicating failure, with the
    /// corresponding error.
    ///
    /// This function should only be called by the JavaScript-side.
    pub fn error(err: CreateMediaElementErrorCode, desc: Option<String>) -> Self {
        Self {
            element_id: 0,
            error: Some((err, desc)),
        }
    }
}

impl JsResult<ElementId, CreateMediaElementErrorCode> for CreateMediaElementResult {
    /// Basically unwrap and consume the `CreateMediaElementResult`, converting it
    /// into a Result enum.
    fn result(self) -> Result<ElementId, (CreateMediaElementErrorCode, Option<String>)> {
        if let Some(err) = self.error {
            Err(err)
        } else {
            Ok(self.element_id)
        }
    }
}

/// Errors that can arise when attempting to start a streaming session on a media
/// element.
#[wasm_bindgen]
pub enum StartStreamSessionErrorCode {
    /// The media element linked to the given `ElementId` was not found.
    ElementNotFound,

    /// No streaming library is usable in the current environment.
    LibraryUnavailable,

    /// The session could not be started because of an unknown error.
    UnknownError,
}

/// Result of calling the `jsStartStreamSession` JavaScript function.
///
/// Creation of a `StartStreamSessionResult` should only be performed by the
/// JavaScript side through the exposed static constructors.
#[wasm_bindgen]
pub struct StartStreamSessionResult {
    error: Option<(StartStreamSessionErrorCode, Option<String>)>,
}

#[wasm_bindgen]
impl StartStreamSessionResult {
    /// Creates a `StartStreamSessionResult` indicating success.
    ///
    /// This function should only be called by the JavaScript-side.
    pub fn success() -> Self {
        Self { error: None }
    }

    /// Creates a `StartStreamSessionResult` indicating failure, with the
    /// corresponding error.
    ///
    /// This function should only be called by the JavaScript-side.
    pub fn error(err: StartStreamSessionErrorCode, desc: Option<String>) -> Self {
        Self {
            error: Some((err, desc)),
        }
    }
}

impl JsResult<(), StartStreamSessionErrorCode> for StartStreamSessionResult {
    /// Basically unwrap and consume the `StartStreamSessionResult`, converting it
    /// into a Result enum.
    fn result(self) -> Result<(), (StartStreamSessionErrorCode, Option<String>)> {
        if let Some(err) = self.error {
            Err(err)
        } else {
            Ok(())
        }
    }
}

/// Trait allowing to convert "JavaScript Results" as exposed by the JavaScript functions into
/// `Result` structs more idiomatic to Rust.
pub(crate) trait JsResult<T, E> {
    fn result(self) -> Result<T, (E, Option<String>)>;
}

/// "Reason" associated to a timer started by the Orchestrator.
///
/// This can then help to identify what the timer was for once resolved.
#[wasm_bindgen]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerReason {
    /// The timer is linked to a debounced module selection: once it resolves,
    /// the last selected module index may be committed.
    SelectionDebounce = 0,

    /// The timer is linked to a running fade between modules: once it resolves,
    /// the fade may move to its next phase.
    FadeStep = 1,

    /// The timer is linked to the delayed reveal of the "next chapter"
    /// affordance.
    AdvanceReveal = 2,

    /// The timer is linked to the immediate resume of an idle-loop element that
    /// was paused from outside.
    IdleResume = 3,
}

/// Levels with which a log can be emitted.
#[wasm_bindgen]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd)]
pub enum LogLevel {
    /// Log level reserved for very important errors and highly unexpected events.
    Error = 0,

    /// Log level reserved for less important errors and unexpected events.
    Warn = 1,

    /// Log level reserved for important events
    Info = 2,

    /// Log level used when debugging. Small-ish yet impactful events should be logged with it.
    Debug = 3,
}

/// Identify a resource allocated on the JavaScript side and kept alive until
/// `jsFreeResource` is called with it.
///
/// Special care of those id should be taken to avoid memory leaks: you should always call
/// `jsFreeResource` as soon as the resource is not needed anymore.
pub type ResourceId = u32;

/// Identify a pending request.
pub type RequestId = u32;

/// Identify a pending timer.
pub type TimerId = f64;

/// Identify a media element created through `jsCreateMediaElement`.
pub type ElementId = u32;

/// The two roles a media element can have in the player's layer stack.
#[wasm_bindgen]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MediaElementKind {
    /// Element dedicated to the main clip of one module.
    MainClip = 0,

    /// The single shared element cycling through idle-loop clips.
    IdleLoop = 1,
}

impl fmt::Display for MediaElementKind {
    /// When wanting to display the value, just format MainClip as "main" and
    /// IdleLoop as "idle"
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                MediaElementKind::MainClip => "main",
                MediaElementKind::IdleLoop => "idle",
            }
        )
    }
}

/// The logical pages the experience can present.
#[wasm_bindgen]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageKind {
    /// One of the catalog's modules, identified by its slug.
    Module = 0,

    /// The static "consulting" page.
    Consulting = 1,

    /// The static "stills" page.
    Stills = 2,

    /// The static "installations" page.
    Installations = 3,

    /// The static "about" page.
    About = 4,
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                PageKind::Module => "module",
                PageKind::Consulting => "consulting",
                PageKind::Stills => "stills",
                PageKind::Installations => "installations",
                PageKind::About => "about",
            }
        )
    }
}

/// Stages the content panel can be in.
#[wasm_bindgen]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PanelStage {
    /// The panel is not visible at all.
    Hidden = 0,

    /// Only the panel's first lines peek over the bottom of the viewport.
    Peek = 1,

    /// The panel takes its full height.
    Expanded = 2,
}

impl fmt::Display for PanelStage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                PanelStage::Hidden => "hidden",
                PanelStage::Peek => "peek",
                PanelStage::Expanded => "expanded",
            }
        )
    }
}
