//! Internationalization (i18n) core: registry, merge engine, locale builder.
//!
//! This module owns everything language-related on the server side:
//!
//! - `language`: the supported-language allow-list and text direction
//! - `tree`: the `TranslationValue` tagged tree and the pure merge engine
//! - `registry`: the static module registry (built-in or loaded from disk)
//! - `builder`: per-language resolution into locale payloads
//!
//! # Example
//!
//! ```rust,ignore
//! use locale_service::i18n::{build_locale, Language, ModuleRegistry};
//!
//! let registry = ModuleRegistry::builtin();
//! let language = Language::resolve(Some("ar"));
//! let payload = build_locale(&registry, language, None)?;
//! ```

mod builder;
mod language;
mod registry;
mod tree;

pub use builder::{build_locale, build_module, LocalePayload};
pub use language::{Direction, Language, LanguageConfig};
pub use registry::{ModuleEntry, ModuleRegistry};
pub use tree::{merge, shape_mismatches, TranslationValue};

/// Errors raised by the locale-resolution core.
///
/// Unsupported languages and lookup misses are deliberately not here: both
/// recover silently (coercion to the default language, caller-supplied
/// default strings).
#[derive(Debug, thiserror::Error)]
pub enum LocaleError {
    /// Requested module name is not in the registry.
    #[error("unknown module: {0}")]
    UnknownModule(String),

    /// Registry content could not be loaded or has an invalid shape.
    #[error("invalid registry content: {0}")]
    InvalidRegistry(String),
}
