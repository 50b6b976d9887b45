//! Yandex Translate - command-line client library for the Yandex.Translate API
//!
//! This library sends text to the Yandex.Translate `translate` method and
//! returns the first translation, or a typed error describing what failed.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod core;

// Re-export key types for convenience
pub use crate::core::{
    client::YandexTranslator,
    config::TranslatorConfig,
    errors::{ApiError, TranslationError},
    models::{LanguageTag, TranslationRequest, TranslationResult},
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
