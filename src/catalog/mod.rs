use serde::Serialize;

use crate::source;
use crate::utils::url::Url;

pub(crate) mod documents;
pub(crate) mod references;

use documents::{
    CatalogError, FootnoteEntry, GlossaryEntry, IntroDocument, ModuleDocument, QueryResponse,
    VideoReference,
};

/// Error marker stored (and exposed to the UI) when the catalog cannot be
/// obtained. The experience does not start in that case and there is no retry.
pub(crate) const CATALOG_LOAD_ERROR_MESSAGE: &str = "Failed to load modules";

/// Label of the intro button when the intro settings document does not provide
/// one (or provides an empty one).
const DEFAULT_INTRO_LABEL: &str = "PRELUDE";

/// One module of the catalog, in its parsed in-memory form.
///
/// Serialized as-is for the panel's content getter; the video references are
/// kept out of that payload since the UI never touches stream URLs itself.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct Module {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) slug: String,
    pub(crate) order: Option<u32>,
    pub(crate) timeline: Option<String>,
    pub(crate) excerpt: Option<String>,
    pub(crate) body: Vec<serde_json::Value>,
    pub(crate) glossary: Vec<GlossaryEntry>,
    pub(crate) footnotes: Vec<FootnoteEntry>,
    #[serde(skip)]
    pub(crate) video: Option<VideoReference>,
    #[serde(skip)]
    pub(crate) idle_video: Option<VideoReference>,
}

impl Module {
    fn from_document(doc: ModuleDocument) -> Self {
        Self {
            id: doc.id,
            title: doc.title,
            slug: doc.slug.current,
            order: doc.order,
            timeline: doc.timeline,
            excerpt: doc.excerpt,
            body: doc.body,
            glossary: doc.glossary,
            footnotes: doc.footnotes,
            video: doc.video,
            idle_video: doc.idle_video,
        }
    }

    /// `true` if this module carries an idle-loop clip that actually resolves
    /// to a playable URL. An unresolvable reference behaves as no clip at all.
    pub(crate) fn has_idle_clip(&self) -> bool {
        self.idle_video
            .as_ref()
            .and_then(source::playback_id)
            .is_some()
    }

    pub(crate) fn main_stream_url(&self) -> Option<Url> {
        self.video.as_ref().and_then(source::stream_url)
    }

    pub(crate) fn idle_stream_url(&self) -> Option<Url> {
        self.idle_video.as_ref().and_then(source::stream_url)
    }
}

/// Sidebar-facing summary of one module, serialized by `summaries_json`.
#[derive(Serialize)]
struct ModuleSummary<'a> {
    index: i32,
    id: &'a str,
    title: &'a str,
    slug: &'a str,
    order: Option<u32>,
    timeline: Option<&'a str>,
    has_idle: bool,
}

/// Store holding the ordered module catalog and the intro settings document.
///
/// Both documents are fetched once per session; a catalog failure is terminal
/// (error marker set, no retry) while an intro failure only loses the custom
/// button label and intro idle clip.
pub(crate) struct CatalogStore {
    modules: Vec<Module>,
    is_loading: bool,
    error: Option<String>,
    intro: Option<IntroDocument>,
}

impl CatalogStore {
    pub(crate) fn new() -> Self {
        Self {
            modules: vec![],
            is_loading: true,
            error: None,
            intro: None,
        }
    }

    /// Ingest the catalog query response. Modules are re-sorted by their
    /// `order` field so the ordinal invariant holds regardless of what the
    /// transport returned; documents without an `order` sort last.
    pub(crate) fn on_catalog_loaded(&mut self, data: &[u8]) -> Result<usize, CatalogError> {
        let parsed: QueryResponse<Vec<ModuleDocument>> = serde_json::from_slice(data)?;
        let docs = parsed.result.unwrap_or_default();
        self.modules = docs.into_iter().map(Module::from_document).collect();
        self.modules.sort_by_key(|m| m.order.unwrap_or(u32::MAX));
        self.is_loading = false;
        self.error = None;
        Ok(self.modules.len())
    }

    /// Record that the catalog could not be obtained, either because the
    /// request failed or because its response could not be parsed.
    pub(crate) fn mark_failed(&mut self) {
        self.is_loading = false;
        self.error = Some(CATALOG_LOAD_ERROR_MESSAGE.to_owned());
    }

    /// Ingest the intro settings query response. Returns `true` if a document
    /// was actually present (the singleton query may resolve to `null`).
    pub(crate) fn on_intro_loaded(&mut self, data: &[u8]) -> Result<bool, CatalogError> {
        let parsed: QueryResponse<IntroDocument> = serde_json::from_slice(data)?;
        self.intro = parsed.result;
        Ok(self.intro.is_some())
    }

    pub(crate) fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub(crate) fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub(crate) fn len(&self) -> usize {
        self.modules.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Bounds-safe module lookup: `None` iff `index < 0 || index >= len`.
    pub(crate) fn get(&self, index: i32) -> Option<&Module> {
        if index < 0 {
            None
        } else {
            self.modules.get(index as usize)
        }
    }

    /// First module whose slug matches, with its index.
    pub(crate) fn get_by_slug(&self, slug: &str) -> Option<(i32, &Module)> {
        self.modules
            .iter()
            .position(|m| m.slug == slug)
            .map(|idx| (idx as i32, &self.modules[idx]))
    }

    /// The module following `index` in playback order, `None` at the last one.
    pub(crate) fn get_next(&self, index: i32) -> Option<&Module> {
        index.checked_add(1).and_then(|next| self.get(next))
    }

    pub(crate) fn intro_button_label(&self) -> &str {
        self.intro
            .as_ref()
            .and_then(|i| i.button_label.as_deref())
            .filter(|l| !l.is_empty())
            .unwrap_or(DEFAULT_INTRO_LABEL)
    }

    /// URL of the idle clip looping behind the intro, if the intro settings
    /// document provided one.
    pub(crate) fn intro_idle_url(&self) -> Option<Url> {
        self.intro
            .as_ref()
            .and_then(|i| i.idle_video.as_ref())
            .and_then(source::stream_url)
    }

    pub(crate) fn summaries_json(&self) -> Result<String, serde_json::Error> {
        let summaries: Vec<ModuleSummary> = self
            .modules
            .iter()
            .enumerate()
            .map(|(idx, m)| ModuleSummary {
                index: idx as i32,
                id: &m.id,
                title: &m.title,
                slug: &m.slug,
                order: m.order,
                timeline: m.timeline.as_deref(),
                has_idle: m.has_idle_clip(),
            })
            .collect();
        serde_json::to_string(&summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str, slug: &str, order: Option<u32>, idle_id: Option<&str>) -> serde_json::Value {
        serde_json::json!({
            "_id": id,
            "title": id.to_uppercase(),
            "slug": { "current": slug },
            "order": order,
            "video": { "playbackId": format!("{}-main", id) },
            "idleVideo": idle_id.map(|pid| serde_json::json!({ "playbackId": pid })),
        })
    }

    fn store_with(docs: Vec<serde_json::Value>) -> CatalogStore {
        let mut store = CatalogStore::new();
        let body = serde_json::json!({ "result": docs });
        store
            .on_catalog_loaded(serde_json::to_vec(&body).unwrap().as_slice())
            .unwrap();
        store
    }

    #[test]
    fn get_is_none_exactly_out_of_bounds() {
        let store = store_with(vec![
            doc("a", "a", Some(1), None),
            doc("b", "b", Some(2), None),
        ]);
        assert!(store.get(-1).is_none());
        assert!(store.get(0).is_some());
        assert!(store.get(1).is_some());
        assert!(store.get(2).is_none());
    }

    #[test]
    fn get_next_stops_at_last_index() {
        let store = store_with(vec![
            doc("a", "a", Some(1), None),
            doc("b", "b", Some(2), None),
        ]);
        assert_eq!(store.get_next(0).map(|m| m.slug.as_str()), Some("b"));
        assert!(store.get_next(1).is_none());
        assert!(store.get_next(i32::MAX).is_none());
    }

    #[test]
    fn modules_are_sorted_by_order_none_last() {
        let store = store_with(vec![
            doc("c", "c", None, None),
            doc("b", "b", Some(2), None),
            doc("a", "a", Some(1), None),
        ]);
        assert_eq!(store.get(0).map(|m| m.slug.as_str()), Some("a"));
        assert_eq!(store.get(1).map(|m| m.slug.as_str()), Some("b"));
        assert_eq!(store.get(2).map(|m| m.slug.as_str()), Some("c"));
    }

    #[test]
    fn slug_lookup_returns_index() {
        let store = store_with(vec![
            doc("a", "first", Some(1), None),
            doc("b", "second", Some(2), None),
        ]);
        let (idx, module) = store.get_by_slug("second").unwrap();
        assert_eq!(idx, 1);
        assert_eq!(module.id, "b");
        assert!(store.get_by_slug("third").is_none());
    }

    #[test]
    fn failure_sets_the_error_marker_and_clears_loading() {
        let mut store = CatalogStore::new();
        assert!(store.is_loading());
        store.mark_failed();
        assert!(!store.is_loading());
        assert_eq!(store.error(), Some(CATALOG_LOAD_ERROR_MESSAGE));
    }

    #[test]
    fn intro_label_defaults_when_absent_or_empty() {
        let mut store = CatalogStore::new();
        assert_eq!(store.intro_button_label(), "PRELUDE");
        store
            .on_intro_loaded(br#"{ "result": { "buttonLabel": "" } }"#)
            .unwrap();
        assert_eq!(store.intro_button_label(), "PRELUDE");
        store
            .on_intro_loaded(br#"{ "result": { "buttonLabel": "BEGIN" } }"#)
            .unwrap();
        assert_eq!(store.intro_button_label(), "BEGIN");
    }

    #[test]
    fn unresolvable_idle_reference_counts_as_no_idle_clip() {
        let store = store_with(vec![doc("a", "a", Some(1), Some(""))]);
        assert!(!store.get(0).unwrap().has_idle_clip());
        let with_idle = store_with(vec![doc("b", "b", Some(1), Some("idle-b"))]);
        assert!(with_idle.get(0).unwrap().has_idle_clip());
    }
}
