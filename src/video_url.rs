use std::fmt;
use std::sync::LazyLock;

use log::warn;
use regex::Regex;
use serde::Serialize;
use url::Url;

/// Hosts a submitted URL may point at
pub const ALLOWED_HOSTS: &[&str] = &[
    "youtube.com",
    "www.youtube.com",
    "youtu.be",
    "m.youtube.com",
    "www.youtube-nocookie.com",
];

/// Video identifier pulled out of a recognized YouTube URL.
///
/// Eleven characters for every known URL shape; the dash fallback passes through
/// whatever follows the dash, so its length is not guaranteed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Why a URL was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    NotAUrl,
    DomainNotAllowed,
    NoVideoId,
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidReason::NotAUrl => write!(f, "Not a valid URL"),
            InvalidReason::DomainNotAllowed => write!(f, "Domain is not valid"),
            InvalidReason::NoVideoId => write!(f, "No valid videoId"),
        }
    }
}

/// Outcome of [`validate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    Valid,
    Invalid(InvalidReason),
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        matches!(self, Validation::Valid)
    }

    pub fn reason(&self) -> Option<InvalidReason> {
        match self {
            Validation::Valid => None,
            Validation::Invalid(reason) => Some(*reason),
        }
    }
}

/// Known URL shapes that carry a video id, in match priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlShape {
    Watch,
    Embed,
    LegacyEmbed,
    Short,
    Shorts,
    Live,
    WatchPath,
    Attribution,
    NoCookieEmbed,
    LetterEmbed,
    WatchExtraParams,
}

const PREFIX: &str = r"(?:https?://)?(?:www\.|m\.)?";
const ID: &str = r"([A-Za-z0-9_-]{11})";

static SHAPES: LazyLock<Vec<(UrlShape, Regex)>> = LazyLock::new(|| {
    let table = [
        (UrlShape::Watch, format!(r"{PREFIX}youtube\.com/watch\?v={ID}")),
        (UrlShape::Embed, format!(r"{PREFIX}youtube\.com/embed/{ID}")),
        (UrlShape::LegacyEmbed, format!(r"{PREFIX}youtube\.com/v/{ID}")),
        (UrlShape::Short, format!(r"(?:https?://)?youtu\.be/{ID}")),
        (UrlShape::Shorts, format!(r"{PREFIX}youtube\.com/shorts/{ID}")),
        (UrlShape::Live, format!(r"{PREFIX}youtube\.com/live/{ID}")),
        (UrlShape::WatchPath, format!(r"{PREFIX}youtube\.com/watch/{ID}")),
        (
            UrlShape::Attribution,
            format!(r"{PREFIX}youtube\.com/attribution_link\?.*v%3D{ID}"),
        ),
        (
            UrlShape::NoCookieEmbed,
            format!(r"{PREFIX}youtube-nocookie\.com/embed/{ID}"),
        ),
        (UrlShape::LetterEmbed, format!(r"{PREFIX}youtube\.com/e/{ID}")),
        (
            UrlShape::WatchExtraParams,
            format!(r"{PREFIX}youtube\.com/watch\?.*v={ID}"),
        ),
    ];

    table
        .into_iter()
        .map(|(shape, pattern)| (shape, Regex::new(&pattern).expect("url shape pattern compiles")))
        .collect()
});

static DASH_FALLBACK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"{PREFIX}youtube\.com/watch/-([A-Za-z0-9_-]+)")).expect("dash fallback pattern compiles")
});

/// Check that `raw` is a URL on an allowed host that carries a video id
pub fn validate(raw: &str) -> Validation {
    let Ok(url) = Url::parse(raw) else {
        return Validation::Invalid(InvalidReason::NotAUrl);
    };

    let host_allowed = url.host_str().is_some_and(|host| ALLOWED_HOSTS.contains(&host));
    if !host_allowed {
        return Validation::Invalid(InvalidReason::DomainNotAllowed);
    }

    match extract_video_id(raw) {
        Some(_) => Validation::Valid,
        None => Validation::Invalid(InvalidReason::NoVideoId),
    }
}

/// Find which shape matches `raw` and the id it carries
pub fn match_shape(raw: &str) -> Option<(UrlShape, VideoId)> {
    SHAPES.iter().find_map(|(shape, re)| {
        re.captures(raw)
            .and_then(|caps| caps.get(1))
            .map(|m| (*shape, VideoId(m.as_str().to_string())))
    })
}

/// Extract the video id from any of the known URL shapes.
///
/// Falls back to `/watch/-<id>` links, which yield everything after the dash.
pub fn extract_video_id(raw: &str) -> Option<VideoId> {
    if let Some((_, id)) = match_shape(raw) {
        return Some(id);
    }

    let caps = DASH_FALLBACK.captures(raw)?;
    let id = caps.get(1)?.as_str();
    warn!("Extracted dash-prefixed video id {id:?} from {raw:?}; the leading dash was dropped");
    Some(VideoId(id.to_string()))
}
