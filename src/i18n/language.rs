//! Language type: validated language representation with layout direction.
//!
//! The service supports a fixed allow-list of languages. `Language` can only
//! be constructed for codes on that list; anything else is coerced to the
//! default language by `Language::resolve`.

use serde::Serialize;

/// Text directionality for a language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Ltr,
    Rtl,
}

/// Configuration for a supported language.
#[derive(Debug, Clone, Serialize)]
pub struct LanguageConfig {
    /// ISO 639-1 language code (e.g., "en", "ar")
    pub code: &'static str,

    /// English name of the language
    pub name: &'static str,

    /// Native name of the language
    pub native_name: &'static str,

    /// Text direction used for document layout
    pub direction: Direction,

    /// Whether this is the default/base language (exactly one should be true)
    pub is_default: bool,
}

/// All supported languages. The default language comes first.
const LANGUAGES: &[LanguageConfig] = &[
    LanguageConfig {
        code: "en",
        name: "English",
        native_name: "English",
        direction: Direction::Ltr,
        is_default: true,
    },
    LanguageConfig {
        code: "ar",
        name: "Arabic",
        native_name: "العربية",
        direction: Direction::Rtl,
        is_default: false,
    },
];

/// A validated language.
///
/// Only codes present in the allow-list can be represented, so every
/// `Language` value has full metadata available without re-validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    code: &'static str,
}

impl Language {
    pub const ENGLISH: Language = Language { code: "en" };
    pub const ARABIC: Language = Language { code: "ar" };

    /// Create a Language from a code string.
    ///
    /// # Returns
    /// * `Some(Language)` if the code is on the allow-list
    /// * `None` otherwise
    pub fn from_code(code: &str) -> Option<Language> {
        LANGUAGES
            .iter()
            .find(|lang| lang.code == code)
            .map(|lang| Language { code: lang.code })
    }

    /// Resolve a possibly-missing, possibly-unsupported code to a Language.
    ///
    /// Unknown codes coerce silently to the default language; callers never
    /// see an error for a bad `lang` value.
    pub fn resolve(code: Option<&str>) -> Language {
        match code {
            Some(code) => Language::from_code(code).unwrap_or_else(|| {
                tracing::debug!("unsupported language code {:?}, using default", code);
                Language::default_language()
            }),
            None => Language::default_language(),
        }
    }

    /// Get the default/base language (the one all overrides are diffs against).
    pub fn default_language() -> Language {
        let config = LANGUAGES
            .iter()
            .find(|lang| lang.is_default)
            .expect("allow-list must contain a default language");
        Language { code: config.code }
    }

    /// Get the ISO 639-1 language code.
    pub fn code(&self) -> &'static str {
        self.code
    }

    fn config(&self) -> &'static LanguageConfig {
        LANGUAGES
            .iter()
            .find(|lang| lang.code == self.code)
            .expect("Language code should always be valid")
    }

    /// Get the English name of the language.
    pub fn name(&self) -> &'static str {
        self.config().name
    }

    /// Get the native name of the language.
    pub fn native_name(&self) -> &'static str {
        self.config().native_name
    }

    /// Get the text direction of the language.
    pub fn direction(&self) -> Direction {
        self.config().direction
    }

    /// Check if this is the default/base language.
    pub fn is_default(&self) -> bool {
        self.config().is_default
    }

    /// List every supported language with its metadata.
    pub fn all() -> &'static [LanguageConfig] {
        LANGUAGES
    }
}
