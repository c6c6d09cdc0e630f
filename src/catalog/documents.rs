use serde::{Deserialize, Serialize};

/// # documents
///
/// Wire shapes of the CMS documents consumed by this crate, field names as they
/// appear in the query responses. The query API wraps every response body in a
/// `{ "result": ... }` envelope, mirrored here by `QueryResponse`.

#[derive(Debug, Deserialize)]
pub(crate) struct QueryResponse<T> {
    pub(crate) result: Option<T>,
}

/// One module document, as projected by the catalog query.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ModuleDocument {
    #[serde(rename = "_id")]
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) slug: Slug,
    pub(crate) order: Option<u32>,
    pub(crate) timeline: Option<String>,
    pub(crate) video: Option<VideoReference>,
    #[serde(rename = "idleVideo")]
    pub(crate) idle_video: Option<VideoReference>,
    #[serde(default)]
    pub(crate) body: Vec<serde_json::Value>,
    #[serde(default)]
    pub(crate) glossary: Vec<GlossaryEntry>,
    #[serde(default)]
    pub(crate) footnotes: Vec<FootnoteEntry>,
    pub(crate) excerpt: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Slug {
    pub(crate) current: String,
}

/// Reference to a hosted video. Depending on how the query expanded it, the
/// playback id can sit directly on it, on the expanded asset, or inside the
/// provider metadata of either. See `crate::source` for the resolution order.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct VideoReference {
    #[serde(rename = "playbackId")]
    pub(crate) playback_id: Option<String>,
    pub(crate) asset: Option<VideoAsset>,
    pub(crate) data: Option<ProviderData>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct VideoAsset {
    #[serde(rename = "playbackId")]
    pub(crate) playback_id: Option<String>,
    pub(crate) data: Option<ProviderData>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ProviderData {
    #[serde(default)]
    pub(crate) playback_ids: Vec<PlaybackIdEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PlaybackIdEntry {
    pub(crate) id: Option<String>,
}

/// One glossary entry of a module. The definition is rich text, opaque to this
/// crate and handed back to the UI as-is.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub(crate) struct GlossaryEntry {
    pub(crate) id: String,
    pub(crate) term: Option<String>,
    #[serde(default)]
    pub(crate) definition: Vec<serde_json::Value>,
}

/// One footnote of a module, its content being rich text opaque to this crate.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub(crate) struct FootnoteEntry {
    pub(crate) id: String,
    #[serde(default)]
    pub(crate) content: Vec<serde_json::Value>,
}

/// The singleton intro settings document.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct IntroDocument {
    #[serde(rename = "idleVideo")]
    pub(crate) idle_video: Option<VideoReference>,
    #[serde(rename = "buttonLabel")]
    pub(crate) button_label: Option<String>,
}

use thiserror::Error;

/// Error encountered when fetching or parsing a CMS document.
#[derive(Error, Debug)]
pub(crate) enum CatalogError {
    #[error("The document request failed (status: {status:?})")]
    RequestFailed { status: Option<u32> },
    #[error("Could not parse the fetched document: {0}")]
    Parsing(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG_FIXTURE: &str = r#"{
        "result": [
            {
                "_id": "module-a",
                "title": "On Seeing",
                "slug": { "current": "on-seeing" },
                "order": 1,
                "timeline": "1972",
                "video": {
                    "asset": {
                        "playbackId": "abc123"
                    }
                },
                "idleVideo": {
                    "data": { "playback_ids": [ { "id": "idle456" } ] }
                },
                "body": [ { "_type": "block", "children": [] } ],
                "glossary": [
                    { "id": "g1", "term": "aperture", "definition": [] }
                ],
                "footnotes": [
                    { "id": "f1", "content": [] }
                ],
                "excerpt": "A first look."
            },
            {
                "_id": "module-b",
                "title": "On Light",
                "slug": { "current": "on-light" },
                "order": 2,
                "timeline": null,
                "video": { "playbackId": "def789" },
                "idleVideo": null,
                "excerpt": null
            }
        ]
    }"#;

    #[test]
    fn parses_catalog_envelope() {
        let parsed: QueryResponse<Vec<ModuleDocument>> =
            serde_json::from_str(CATALOG_FIXTURE).unwrap();
        let docs = parsed.result.unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].id, "module-a");
        assert_eq!(docs[0].slug.current, "on-seeing");
        assert_eq!(docs[0].order, Some(1));
        assert_eq!(docs[0].glossary.len(), 1);
        assert_eq!(docs[0].footnotes.len(), 1);
    }

    #[test]
    fn missing_arrays_default_to_empty() {
        let parsed: QueryResponse<Vec<ModuleDocument>> =
            serde_json::from_str(CATALOG_FIXTURE).unwrap();
        let docs = parsed.result.unwrap();
        assert!(docs[1].body.is_empty());
        assert!(docs[1].glossary.is_empty());
        assert!(docs[1].footnotes.is_empty());
        assert!(docs[1].idle_video.is_none());
        assert_eq!(docs[1].timeline, None);
    }

    #[test]
    fn parses_intro_document() {
        let json = r#"{
            "result": {
                "idleVideo": { "playbackId": "intro1" },
                "buttonLabel": "ENTER"
            }
        }"#;
        let parsed: QueryResponse<IntroDocument> = serde_json::from_str(json).unwrap();
        let intro = parsed.result.unwrap();
        assert_eq!(intro.button_label.as_deref(), Some("ENTER"));
        assert!(intro.idle_video.is_some());
    }

    #[test]
    fn null_result_parses_to_none() {
        let parsed: QueryResponse<IntroDocument> =
            serde_json::from_str(r#"{ "result": null }"#).unwrap();
        assert!(parsed.result.is_none());
    }

    #[test]
    fn garbage_body_is_a_parsing_error() {
        let res: Result<QueryResponse<Vec<ModuleDocument>>, _> =
            serde_json::from_str("<!DOCTYPE html>");
        assert!(res.is_err());
    }
}
