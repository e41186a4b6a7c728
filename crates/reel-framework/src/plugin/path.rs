//! Plugin reference classification and fetch-target resolution.
//!
//! A reference is classified by shape alone:
//!
//! | Reference | Class |
//! |-----------|-------|
//! | `https://cdn.example.com/p.js` | [`PathClass::Absolute`] |
//! | `plugins/foo.js`, `foo.js` | [`PathClass::Relative`] |
//! | `related`, `42`, `plugin.123`, `""` | [`PathClass::ShortId`] |
//! | a non-string config value | [`PathClass::Unknown`] |
//!
//! The query string never takes part in classification.

use serde_json::Value;
use tracing::warn;
use url::Url;

/// Shape of a plugin reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathClass {
    /// Protocol-qualified URL, fetched as-is.
    Absolute,
    /// Same-origin path, resolved against the document base.
    Relative,
    /// Bare identifier resolved through the host's registry; never fetched.
    ShortId,
    /// Not a string reference at all.
    Unknown,
}

impl PathClass {
    /// Classifies a string reference.
    pub fn classify(reference: &str) -> Self {
        let path = strip_query(reference);

        // `://` at index 0 does not count as a protocol.
        let protocol = path.find("://");
        if protocol.is_some_and(|i| i > 0) {
            return Self::Absolute;
        }

        let folder = path.find('/');
        let is_short_extension = match extension(path) {
            None => true,
            Some(ext) => ext.is_empty() || is_numeric(ext),
        };
        if protocol.is_none() && folder.is_none() && is_short_extension {
            return Self::ShortId;
        }

        Self::Relative
    }

    /// Classifies a raw configuration value; anything but a string is
    /// [`PathClass::Unknown`].
    pub fn classify_value(reference: &Value) -> Self {
        match reference {
            Value::String(s) => Self::classify(s),
            _ => Self::Unknown,
        }
    }

    /// Returns `true` if references of this class are fetched by the loader.
    pub fn is_fetched(self) -> bool {
        matches!(self, Self::Absolute | Self::Relative)
    }
}

impl std::fmt::Display for PathClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Absolute => "absolute",
            Self::Relative => "relative",
            Self::ShortId => "short-id",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Everything before the first `?`.
fn strip_query(reference: &str) -> &str {
    reference.split('?').next().unwrap_or(reference)
}

/// Text after the last `.` of the final path segment, if the segment has one.
fn extension(path: &str) -> Option<&str> {
    let segment = path.rsplit('/').next().unwrap_or(path);
    segment.rfind('.').map(|dot| &segment[dot + 1..])
}

/// `true` when `s` converts to a number under ECMAScript `Number()` rules:
/// blank, signed decimal (`1.5`, `-2`, `1e3`), signed `Infinity`, or an
/// unsigned `0x`/`0o`/`0b` integer.
fn is_numeric(s: &str) -> bool {
    let s = s.trim();
    if s.is_empty() {
        return true;
    }

    if let Some((prefix, digits)) = s.split_at_checked(2) {
        let radix = match prefix {
            "0x" | "0X" => Some(16),
            "0o" | "0O" => Some(8),
            "0b" | "0B" => Some(2),
            _ => None,
        };
        if let Some(radix) = radix {
            return !digits.is_empty() && digits.chars().all(|c| c.is_digit(radix));
        }
    }

    let unsigned = s.strip_prefix(['+', '-']).unwrap_or(s);
    if unsigned == "Infinity" {
        return true;
    }

    // `f64::from_str` also takes `inf`/`nan`, which are not numbers here.
    s.chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | '+' | '-' | 'e' | 'E'))
        && s.parse::<f64>().is_ok()
}

// =============================================================================
// Resolution
// =============================================================================

/// Explicit stand-in for the document the player lives in.
///
/// Relative references are resolved against [`base`](Self::base) rather than
/// any ambient global location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionContext {
    base: Url,
}

impl ResolutionContext {
    /// Creates a context for the document at `base`.
    pub fn new(base: Url) -> Self {
        Self { base }
    }

    /// Parses `base` and creates a context for it.
    pub fn parse(base: &str) -> Result<Self, url::ParseError> {
        Url::parse(base).map(Self::new)
    }

    /// The document base location.
    pub fn base(&self) -> &Url {
        &self.base
    }
}

/// Computes where the loader should fetch `reference` from.
///
/// - Absolute references are returned unchanged.
/// - Relative references are joined onto the context base (`.` and `..`
///   segments normalised, query preserved).
/// - Short identifiers have no fetch target.
pub fn resolve_fetch_target(reference: &str, ctx: &ResolutionContext) -> Option<String> {
    match PathClass::classify(reference) {
        PathClass::Absolute => Some(reference.to_owned()),
        PathClass::Relative => match ctx.base.join(reference) {
            Ok(url) => Some(url.into()),
            Err(e) => {
                warn!(
                    reference = %reference,
                    base = %ctx.base,
                    error = %e,
                    "Relative plugin reference cannot be resolved against the document base"
                );
                None
            }
        },
        PathClass::ShortId | PathClass::Unknown => None,
    }
}
