//! Music-link normalization and scannable-code URLs.
//!
//! Pasted share URLs are reduced to the normalized `spotify:type:id` form
//! stored in state; the raw URL never survives validation. The normalized
//! identifier parameterizes the scannable-code image the renderers draw.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

use crate::constants;

static SHARE_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"spotify\.com/(?:intl-[a-z]+/)?(track|album|playlist)/([a-zA-Z0-9]+)")
        .expect("BUG: invalid SHARE_URL_RE regex literal")
});

/// Kind of resource a normalized link points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    /// A single track
    Track,
    /// A full album
    Album,
    /// A playlist
    Playlist,
}

impl LinkKind {
    fn as_str(&self) -> &'static str {
        match self {
            LinkKind::Track => "track",
            LinkKind::Album => "album",
            LinkKind::Playlist => "playlist",
        }
    }
}

/// A normalized music link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpotifyUri {
    /// Resource kind extracted from the share URL path
    pub kind: LinkKind,
    /// Alphanumeric resource identifier
    pub id: String,
}

impl fmt::Display for SpotifyUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "spotify:{}:{}", self.kind.as_str(), self.id)
    }
}

/// Validation status of the link input, shown inline in the controls panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    /// Nothing entered yet, or the field was cleared
    Idle,
    /// Last input normalized successfully
    Valid,
    /// Last input did not match the share-URL pattern
    Invalid,
}

impl Default for LinkStatus {
    fn default() -> Self {
        LinkStatus::Idle
    }
}

/// Extracts a normalized link from a pasted share URL.
///
/// Accepts URLs with or without a locale segment (`intl-es/` and friends)
/// and ignores trailing query parameters, since the identifier capture stops
/// at the first non-alphanumeric character.
pub fn parse_share_url(input: &str) -> Option<SpotifyUri> {
    let caps = SHARE_URL_RE.captures(input)?;
    let kind = match caps.get(1)?.as_str() {
        "track" => LinkKind::Track,
        "album" => LinkKind::Album,
        "playlist" => LinkKind::Playlist,
        _ => return None,
    };
    Some(SpotifyUri {
        kind,
        id: caps.get(2)?.as_str().to_string(),
    })
}

/// Normalizes raw field input into the identifier to store plus its status.
///
/// Empty input clears the identifier and reports [`LinkStatus::Idle`]; a
/// non-match clears it and reports [`LinkStatus::Invalid`]. Only a match
/// stores anything.
pub fn normalize_input(raw: &str) -> (String, LinkStatus) {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return (String::new(), LinkStatus::Idle);
    }
    match parse_share_url(trimmed) {
        Some(uri) => (uri.to_string(), LinkStatus::Valid),
        None => (String::new(), LinkStatus::Invalid),
    }
}

/// URL of the scannable-code PNG for a normalized identifier.
pub fn scannable_code_url(uri: &str) -> String {
    format!("{}{}", constants::SCANNABLE_URL_PREFIX, uri)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_track_with_locale_and_query() {
        let uri = parse_share_url("https://open.spotify.com/intl-es/track/abc123?si=xyz").unwrap();
        assert_eq!(uri.kind, LinkKind::Track);
        assert_eq!(uri.id, "abc123");
        assert_eq!(uri.to_string(), "spotify:track:abc123");
    }

    #[test]
    fn test_parse_without_locale_segment() {
        let uri = parse_share_url("https://open.spotify.com/track/4uLU6hMCjMI75M1A2tKUQC").unwrap();
        assert_eq!(uri.to_string(), "spotify:track:4uLU6hMCjMI75M1A2tKUQC");
    }

    #[test]
    fn test_parse_other_locales() {
        let uri = parse_share_url("https://open.spotify.com/intl-pt/album/zz9Top").unwrap();
        assert_eq!(uri.kind, LinkKind::Album);
        assert_eq!(uri.to_string(), "spotify:album:zz9Top");
    }

    #[test]
    fn test_parse_album_and_playlist() {
        let album = parse_share_url("https://open.spotify.com/album/1ATL5GLyefJaxhQzSPVrLX").unwrap();
        assert_eq!(album.kind, LinkKind::Album);

        let playlist =
            parse_share_url("https://open.spotify.com/playlist/37i9dQZF1DXcBWIGoYBM5M").unwrap();
        assert_eq!(playlist.kind, LinkKind::Playlist);
    }

    #[test]
    fn test_parse_rejects_unrelated_urls() {
        assert!(parse_share_url("https://example.com/track/abc123").is_none());
        assert!(parse_share_url("https://open.spotify.com/artist/abc123").is_none());
        assert!(parse_share_url("not a url at all").is_none());
    }

    #[test]
    fn test_normalize_empty_input_is_idle() {
        assert_eq!(normalize_input(""), (String::new(), LinkStatus::Idle));
        assert_eq!(normalize_input("   "), (String::new(), LinkStatus::Idle));
    }

    #[test]
    fn test_normalize_non_match_clears_and_flags_invalid() {
        let (stored, status) = normalize_input("https://example.com/whatever");
        assert!(stored.is_empty());
        assert_eq!(status, LinkStatus::Invalid);
    }

    #[test]
    fn test_normalize_match_stores_identifier() {
        let (stored, status) =
            normalize_input("  https://open.spotify.com/intl-es/track/abc123?si=xyz  ");
        assert_eq!(stored, "spotify:track:abc123");
        assert_eq!(status, LinkStatus::Valid);
    }

    #[test]
    fn test_scannable_code_url() {
        assert_eq!(
            scannable_code_url("spotify:track:abc123"),
            "https://scannables.scdn.co/uri/plain/png/FFFFFF/black/640/spotify:track:abc123"
        );
    }
}
