//! Locale builder: resolves modules for a requested language.

use std::collections::BTreeMap;

use tracing::debug;

use crate::i18n::registry::{ModuleEntry, ModuleRegistry};
use crate::i18n::tree::{merge, TranslationValue};
use crate::i18n::{Language, LocaleError};

/// Resolved trees for one language, keyed by module name. Built per
/// request, never persisted.
pub type LocalePayload = BTreeMap<String, TranslationValue>;

/// Resolve one module for a language.
///
/// The default language short-circuits to the base tree, as does any
/// language the module carries no override for. Otherwise the sparse
/// override is merged over the base.
pub fn build_module(entry: &ModuleEntry, language: Language) -> TranslationValue {
    if language.is_default() {
        return entry.default_tree().clone();
    }
    match entry.override_for(language.code()) {
        Some(overlay) => merge(Some(entry.default_tree()), Some(overlay))
            .unwrap_or_else(|| entry.default_tree().clone()),
        None => entry.default_tree().clone(),
    }
}

/// Resolve a locale payload for a language.
///
/// With `module` set, the payload contains only that module's resolved
/// tree; an unknown name is surfaced as `LocaleError::UnknownModule`.
/// Without it, every registered module is resolved independently.
pub fn build_locale(
    registry: &ModuleRegistry,
    language: Language,
    module: Option<&str>,
) -> Result<LocalePayload, LocaleError> {
    match module {
        Some(name) => {
            let entry = registry
                .get(name)
                .ok_or_else(|| LocaleError::UnknownModule(name.to_string()))?;
            let mut payload = LocalePayload::new();
            payload.insert(name.to_string(), build_module(entry, language));
            Ok(payload)
        }
        None => {
            debug!(language = language.code(), modules = registry.len(), "building full locale");
            Ok(registry
                .iter()
                .map(|(name, entry)| (name.to_string(), build_module(entry, language)))
                .collect())
        }
    }
}
