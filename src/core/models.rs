//! Core data models for translation

use isolang::Language;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::errors::{Result, TranslationError};

/// Primary subtag of the undetermined language
const UNDETERMINED: &str = "und";

/// Normalized natural language identifier, optionally script- and region-qualified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LanguageTag {
    language: Language,
    script: Option<Script>,
    region: Option<Region>,
}

/// ISO 15924 script subtag, stored titlecased (`Hans`, `Latn`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Script([u8; 4]);

impl Script {
    fn parse(subtag: &str) -> Option<Self> {
        let bytes = subtag.as_bytes();
        if bytes.len() != 4 || !bytes.iter().all(u8::is_ascii_alphabetic) {
            return None;
        }

        let mut buf = [0u8; 4];
        for (i, (slot, b)) in buf.iter_mut().zip(bytes).enumerate() {
            *slot = if i == 0 {
                b.to_ascii_uppercase()
            } else {
                b.to_ascii_lowercase()
            };
        }
        Some(Self(buf))
    }

    fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).unwrap_or_default()
    }
}

/// Region subtag: two ASCII letters (`US`) or three digits (`419`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Region([u8; 3], usize);

impl Region {
    fn parse(subtag: &str) -> Option<Self> {
        let bytes = subtag.as_bytes();
        let valid = match bytes.len() {
            2 => bytes.iter().all(u8::is_ascii_alphabetic),
            3 => bytes.iter().all(u8::is_ascii_digit),
            _ => false,
        };
        if !valid {
            return None;
        }

        let mut buf = [0u8; 3];
        for (slot, b) in buf.iter_mut().zip(bytes) {
            *slot = b.to_ascii_uppercase();
        }
        Some(Self(buf, bytes.len()))
    }

    fn as_str(&self) -> &str {
        // Only ASCII is ever stored
        std::str::from_utf8(&self.0[..self.1]).unwrap_or_default()
    }
}

impl LanguageTag {
    /// Parse a required language tag such as `en`, `eng`, `en-US` or `zh-Hans`
    pub fn parse(tag: &str) -> Result<Self> {
        Self::parse_optional(tag)?
            .ok_or_else(|| TranslationError::invalid_language(tag, "language must be determined"))
    }

    /// Parse a language tag that may be absent
    ///
    /// An empty string or `und` yields `None`, meaning the provider should
    /// detect the language itself.
    pub fn parse_optional(tag: &str) -> Result<Option<Self>> {
        let trimmed = tag.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        let mut subtags = trimmed.split(['-', '_']);
        let primary = subtags.next().unwrap_or_default().to_ascii_lowercase();
        if primary == UNDETERMINED {
            return Ok(None);
        }

        let language = match primary.len() {
            2 => Language::from_639_1(&primary),
            3 => Language::from_639_3(&primary),
            _ => None,
        }
        .ok_or_else(|| TranslationError::invalid_language(tag, "unknown language code"))?;

        let mut next = subtags.next();
        let script = next.and_then(Script::parse);
        if script.is_some() {
            next = subtags.next();
        }

        let region = match next {
            None => None,
            Some(subtag) => Some(Region::parse(subtag).ok_or_else(|| {
                TranslationError::invalid_language(
                    tag,
                    format!("invalid script or region {:?}", subtag),
                )
            })?),
        };

        if subtags.next().is_some() {
            return Err(TranslationError::invalid_language(
                tag,
                "only language, script and region subtags are supported",
            ));
        }

        Ok(Some(Self {
            language,
            script,
            region,
        }))
    }

    /// Underlying ISO 639 language
    pub fn language(&self) -> Language {
        self.language
    }

    /// Shortest ISO 639 code for the language, without region
    pub fn code(&self) -> &'static str {
        self.language
            .to_639_1()
            .unwrap_or_else(|| self.language.to_639_3())
    }

    /// Script subtag, titlecased
    pub fn script(&self) -> Option<&str> {
        self.script.as_ref().map(Script::as_str)
    }

    /// Region subtag, uppercased
    pub fn region(&self) -> Option<&str> {
        self.region.as_ref().map(Region::as_str)
    }
}

impl fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())?;
        if let Some(script) = self.script() {
            write!(f, "-{}", script)?;
        }
        if let Some(region) = self.region() {
            write!(f, "-{}", region)?;
        }
        Ok(())
    }
}

impl FromStr for LanguageTag {
    type Err = TranslationError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Translation request
#[derive(Debug, Clone)]
pub struct TranslationRequest {
    /// Text to translate
    pub text: String,
    /// `None` lets the provider detect the source language
    pub source_lang: Option<LanguageTag>,
    /// Language to translate into
    pub target_lang: LanguageTag,
}

impl TranslationRequest {
    /// Request with auto-detected source language
    pub fn new(text: impl Into<String>, target_lang: LanguageTag) -> Self {
        Self {
            text: text.into(),
            source_lang: None,
            target_lang,
        }
    }

    /// Set or clear the source language
    pub fn with_source_lang(mut self, source_lang: Option<LanguageTag>) -> Self {
        self.source_lang = source_lang;
        self
    }

    /// Value of the `lang` query parameter: `from-to`, or just `to` for auto-detection
    pub fn lang_pair(&self) -> String {
        match &self.source_lang {
            Some(from) => format!("{}-{}", from, self.target_lang),
            None => self.target_lang.to_string(),
        }
    }
}

/// Body of a successful translate response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationResult {
    /// Provider status code, 200 on success
    #[serde(default)]
    pub code: i64,
    /// Language pair the provider actually used, e.g. `en-ru`
    #[serde(default)]
    pub lang: String,
    /// Candidate translations; only the first one is surfaced
    #[serde(default)]
    pub text: Vec<String>,
}

impl TranslationResult {
    /// Take the first candidate, failing on an empty `text` array
    pub fn into_first(self) -> Result<String> {
        self.text
            .into_iter()
            .next()
            .ok_or(TranslationError::EmptyResultError)
    }
}

/// Body of an error response
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ErrorBody {
    /// Provider error code
    #[serde(default)]
    pub code: Option<i64>,
    /// Human-readable error description
    #[serde(default)]
    pub message: Option<String>,
}
