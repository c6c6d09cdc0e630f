use crate::catalog::documents::{ProviderData, VideoReference};
use crate::utils::url::Url;

/// # source
///
/// Resolution of CMS video references into playable stream URLs.
///
/// Depending on how a query expanded the reference, the playback id may live in
/// one of four places; the resolution order is fixed and a reference carrying
/// none of them resolves to `None`, never to an error.

/// Host serving both the HLS playlists and the progressive renditions.
const STREAM_HOST: &str = "https://stream.mux.com";

/// Suffix of an HLS playlist URL, which the progressive fallback substitutes.
const PLAYLIST_SUFFIX: &str = ".m3u8";

/// Extract the playback id of the given video reference.
///
/// Tried in order: the id directly on the reference, the id on the expanded
/// asset, the first provider-metadata entry of the expanded asset, then the
/// first provider-metadata entry on the reference itself. Empty strings count
/// as absent.
pub(crate) fn playback_id(video: &VideoReference) -> Option<&str> {
    if let Some(id) = non_empty(video.playback_id.as_deref()) {
        return Some(id);
    }
    if let Some(asset) = video.asset.as_ref() {
        if let Some(id) = non_empty(asset.playback_id.as_deref()) {
            return Some(id);
        }
        if let Some(id) = first_provider_id(asset.data.as_ref()) {
            return Some(id);
        }
    }
    first_provider_id(video.data.as_ref())
}

/// Build the HLS playlist URL for the given video reference, if its playback id
/// can be resolved.
pub(crate) fn stream_url(video: &VideoReference) -> Option<Url> {
    playback_id(video).map(|id| Url::new(format!("{}/{}{}", STREAM_HOST, id, PLAYLIST_SUFFIX)))
}

/// Build the progressive MP4 rendition URL for the given stream URL.
///
/// Only playlist URLs have a progressive counterpart: anything not ending in
/// `.m3u8` resolves to `None`.
pub(crate) fn progressive_rendition(url: &Url) -> Option<Url> {
    url.get_ref()
        .strip_suffix(PLAYLIST_SUFFIX)
        .map(|base| Url::new(format!("{}/high.mp4", base)))
}

fn non_empty(id: Option<&str>) -> Option<&str> {
    id.filter(|i| !i.is_empty())
}

fn first_provider_id(data: Option<&ProviderData>) -> Option<&str> {
    non_empty(data?.playback_ids.first()?.id.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::documents::{PlaybackIdEntry, VideoAsset};

    fn provider(id: &str) -> ProviderData {
        ProviderData {
            playback_ids: vec![PlaybackIdEntry {
                id: Some(id.to_owned()),
            }],
        }
    }

    fn empty_reference() -> VideoReference {
        VideoReference {
            playback_id: None,
            asset: None,
            data: None,
        }
    }

    #[test]
    fn direct_id_wins_over_everything() {
        let video = VideoReference {
            playback_id: Some("direct".to_owned()),
            asset: Some(VideoAsset {
                playback_id: Some("on-asset".to_owned()),
                data: Some(provider("in-asset-data")),
            }),
            data: Some(provider("in-data")),
        };
        assert_eq!(playback_id(&video), Some("direct"));
    }

    #[test]
    fn asset_id_wins_over_provider_metadata() {
        let video = VideoReference {
            playback_id: None,
            asset: Some(VideoAsset {
                playback_id: Some("on-asset".to_owned()),
                data: Some(provider("in-asset-data")),
            }),
            data: Some(provider("in-data")),
        };
        assert_eq!(playback_id(&video), Some("on-asset"));
    }

    #[test]
    fn asset_provider_metadata_wins_over_top_level() {
        let video = VideoReference {
            playback_id: None,
            asset: Some(VideoAsset {
                playback_id: None,
                data: Some(provider("in-asset-data")),
            }),
            data: Some(provider("in-data")),
        };
        assert_eq!(playback_id(&video), Some("in-asset-data"));
    }

    #[test]
    fn falls_back_to_top_level_provider_metadata() {
        let video = VideoReference {
            playback_id: None,
            asset: None,
            data: Some(provider("in-data")),
        };
        assert_eq!(playback_id(&video), Some("in-data"));
    }

    #[test]
    fn empty_strings_count_as_absent() {
        let video = VideoReference {
            playback_id: Some(String::new()),
            asset: Some(VideoAsset {
                playback_id: Some(String::new()),
                data: None,
            }),
            data: Some(provider("fallback")),
        };
        assert_eq!(playback_id(&video), Some("fallback"));
    }

    #[test]
    fn unresolvable_reference_is_none() {
        assert_eq!(playback_id(&empty_reference()), None);
        assert!(stream_url(&empty_reference()).is_none());
    }

    #[test]
    fn builds_playlist_url() {
        let video = VideoReference {
            playback_id: Some("abc123".to_owned()),
            asset: None,
            data: None,
        };
        assert_eq!(
            stream_url(&video).unwrap().get_ref(),
            "https://stream.mux.com/abc123.m3u8"
        );
    }

    #[test]
    fn progressive_rendition_substitutes_suffix() {
        let url = Url::new("https://stream.mux.com/abc123.m3u8".to_owned());
        assert_eq!(
            progressive_rendition(&url).unwrap().get_ref(),
            "https://stream.mux.com/abc123/high.mp4"
        );
    }

    #[test]
    fn progressive_rendition_requires_playlist_suffix() {
        let url = Url::new("https://stream.mux.com/abc123.mp4".to_owned());
        assert!(progressive_rendition(&url).is_none());
    }
}
