use std::fmt;

use crate::bindings::{jsAbortRequest, jsFetchDocument, RequestId};
use crate::utils::url::Url;
use crate::Logger;

/// What a pending document request is fetching, so that its response can be
/// routed to the right ingest path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DocumentKind {
    ModuleCatalog,
    IntroSettings,
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                DocumentKind::ModuleCatalog => "module catalog",
                DocumentKind::IntroSettings => "intro settings",
            }
        )
    }
}

/// Information on a document request performed and not yet finished.
struct DocumentRequestInfo {
    request_id: RequestId,
    kind: DocumentKind,
    url: Url,
}

/// The `DocumentRequester` performs the HTTP(S) requests for the CMS documents.
///
/// Each document is fetched at most once per session, so there is no
/// scheduling and no retry mechanism here: just enough state to route
/// responses back to their document kind and to abort cleanly on stop.
// TODO the requests carry no timeout: a hung CMS endpoint currently leaves the
// experience loading forever instead of surfacing a catalog error.
pub(crate) struct DocumentRequester {
    /// Pending requests, in chronological order.
    pending: Vec<DocumentRequestInfo>,
}

impl DocumentRequester {
    pub(crate) fn new() -> Self {
        Self { pending: vec![] }
    }

    /// Start fetching the given document.
    pub(crate) fn fetch_document(&mut self, url: Url, kind: DocumentKind) {
        Logger::info(&format!("Requester: Fetching {} document: {}", kind, url));
        let request_id = jsFetchDocument(url.get_ref());
        self.pending.push(DocumentRequestInfo {
            request_id,
            kind,
            url,
        });
    }

    /// Route a finished request back to its document. `None` if the request was
    /// not one of ours.
    pub(crate) fn on_request_finished(
        &mut self,
        request_id: RequestId,
    ) -> Option<(DocumentKind, Url)> {
        self.remove_pending(request_id)
    }

    /// Route a failed request back to its document. `None` if the request was
    /// not one of ours.
    pub(crate) fn on_request_failed(
        &mut self,
        request_id: RequestId,
    ) -> Option<(DocumentKind, Url)> {
        self.remove_pending(request_id)
    }

    /// `true` if a request for the given document kind is in flight.
    pub(crate) fn is_pending(&self, kind: DocumentKind) -> bool {
        self.pending.iter().any(|info| info.kind == kind)
    }

    /// Abort every request still pending.
    pub(crate) fn reset(&mut self) {
        for info in self.pending.drain(..) {
            Logger::debug(&format!("Requester: Aborting {} request", info.kind));
            jsAbortRequest(info.request_id);
        }
    }

    fn remove_pending(&mut self, request_id: RequestId) -> Option<(DocumentKind, Url)> {
        let pos = self
            .pending
            .iter()
            .position(|info| info.request_id == request_id)?;
        let info = self.pending.remove(pos);
        Some((info.kind, info.url))
    }
}
