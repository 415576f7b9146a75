//! Module registry: the static set of translation modules the service owns.
//!
//! Each module carries a complete base-language tree plus zero or more
//! sparse per-language override trees. The registry is built once at
//! process start, either from the built-in module set or from a JSON
//! directory, and is read-only afterwards, so concurrent requests share
//! it without locking.

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::json;
use tracing::{debug, warn};

use crate::i18n::tree::{shape_mismatches, TranslationValue};
use crate::i18n::LocaleError;

/// One translation module: a mandatory base tree and sparse overrides
/// keyed by language code.
#[derive(Debug, Clone)]
pub struct ModuleEntry {
    default: TranslationValue,
    overrides: BTreeMap<String, TranslationValue>,
}

impl ModuleEntry {
    /// Create an entry from its base-language tree.
    ///
    /// # Returns
    /// * `Err(LocaleError::InvalidRegistry)` if the base value is not a tree
    pub fn new(default: TranslationValue) -> Result<ModuleEntry, LocaleError> {
        if !default.is_tree() {
            return Err(LocaleError::InvalidRegistry(
                "module base content must be a JSON object".to_string(),
            ));
        }
        Ok(ModuleEntry {
            default,
            overrides: BTreeMap::new(),
        })
    }

    /// Attach an override tree for a language code. Replaces any previous
    /// override for the same code.
    pub fn with_override(mut self, code: &str, tree: TranslationValue) -> ModuleEntry {
        self.overrides.insert(code.to_string(), tree);
        self
    }

    /// The complete base-language tree.
    pub fn default_tree(&self) -> &TranslationValue {
        &self.default
    }

    /// The sparse override tree for a language, if one was registered.
    pub fn override_for(&self, code: &str) -> Option<&TranslationValue> {
        self.overrides.get(code)
    }
}

/// Registry of all translation modules, keyed by module name.
#[derive(Debug, Clone)]
pub struct ModuleRegistry {
    modules: BTreeMap<String, ModuleEntry>,
}

impl ModuleRegistry {
    /// Build a registry from explicit entries.
    pub fn new(modules: BTreeMap<String, ModuleEntry>) -> ModuleRegistry {
        for (name, entry) in &modules {
            for (code, overlay) in &entry.overrides {
                for path in shape_mismatches(&entry.default, overlay) {
                    warn!(
                        module = %name,
                        language = %code,
                        path = %path,
                        "override shape differs from base (leaf vs. subtree)"
                    );
                }
            }
        }
        ModuleRegistry { modules }
    }

    /// Build the registry from the built-in module set.
    pub fn builtin() -> ModuleRegistry {
        ModuleRegistry::new(default_modules())
    }

    /// Load a registry from a directory laid out as
    /// `<dir>/<module>/<lang>.json`, where `default.json` holds the
    /// base-language tree and every other file is an override keyed by its
    /// file stem.
    ///
    /// # Returns
    /// * `Err(LocaleError::InvalidRegistry)` on unreadable content, invalid
    ///   JSON, or a module directory without `default.json`
    pub fn load_dir(dir: &Path) -> Result<ModuleRegistry, LocaleError> {
        let mut modules = BTreeMap::new();

        let entries = std::fs::read_dir(dir).map_err(|e| {
            LocaleError::InvalidRegistry(format!("cannot read locales dir {:?}: {}", dir, e))
        })?;

        for module_dir in entries {
            let module_dir = module_dir.map_err(|e| {
                LocaleError::InvalidRegistry(format!("cannot read locales dir entry: {}", e))
            })?;
            let path = module_dir.path();
            if !path.is_dir() {
                continue;
            }
            let module_name = match path.file_name().and_then(|n| n.to_str()) {
                Some(name) => name.to_string(),
                None => continue,
            };

            let default_path = path.join("default.json");
            if !default_path.is_file() {
                return Err(LocaleError::InvalidRegistry(format!(
                    "module {:?} has no default.json",
                    module_name
                )));
            }
            let mut entry = ModuleEntry::new(read_tree(&default_path)?)?;

            let files = std::fs::read_dir(&path).map_err(|e| {
                LocaleError::InvalidRegistry(format!("cannot read module dir {:?}: {}", path, e))
            })?;
            for file in files {
                let file = file.map_err(|e| {
                    LocaleError::InvalidRegistry(format!("cannot read module dir entry: {}", e))
                })?;
                let file_path = file.path();
                if file_path.extension().and_then(|e| e.to_str()) != Some("json") {
                    continue;
                }
                let stem = match file_path.file_stem().and_then(|s| s.to_str()) {
                    Some(stem) => stem.to_string(),
                    None => continue,
                };
                if stem == "default" {
                    continue;
                }
                entry = entry.with_override(&stem, read_tree(&file_path)?);
            }

            debug!(module = %module_name, "loaded translation module from disk");
            modules.insert(module_name, entry);
        }

        Ok(ModuleRegistry::new(modules))
    }

    /// Get a module entry by name.
    pub fn get(&self, name: &str) -> Option<&ModuleEntry> {
        self.modules.get(name)
    }

    /// Iterate all modules in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ModuleEntry)> {
        self.modules.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

fn read_tree(path: &Path) -> Result<TranslationValue, LocaleError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| LocaleError::InvalidRegistry(format!("cannot read {:?}: {}", path, e)))?;
    serde_json::from_str(&raw)
        .map_err(|e| LocaleError::InvalidRegistry(format!("invalid JSON in {:?}: {}", path, e)))
}

/// Built-in translation modules.
///
/// The surrounding application normally ships locale content on disk; this
/// set keeps the service useful without any configuration and doubles as
/// fixture data in tests.
fn default_modules() -> BTreeMap<String, ModuleEntry> {
    let mut modules = BTreeMap::new();

    modules.insert(
        "common".to_string(),
        ModuleEntry {
            default: TranslationValue::from_json(json!({
                "buttons": {
                    "save": "Save",
                    "cancel": "Cancel",
                    "confirm": "Confirm"
                },
                "status": {
                    "loading": "Loading...",
                    "error": "Something went wrong"
                }
            })),
            overrides: BTreeMap::new(),
        }
        .with_override(
            "ar",
            TranslationValue::from_json(json!({
                "buttons": {
                    "save": "حفظ",
                    "cancel": "إلغاء",
                    "confirm": "تأكيد"
                },
                "status": {
                    "loading": "جار التحميل...",
                    "error": "حدث خطأ ما"
                }
            })),
        ),
    );

    modules.insert(
        "profile".to_string(),
        ModuleEntry {
            default: TranslationValue::from_json(json!({
                "header": {
                    "title": "My Profile",
                    "subtitle": "Manage your account"
                },
                "fields": {
                    "name": "Full name",
                    "email": "Email address"
                }
            })),
            overrides: BTreeMap::new(),
        }
        .with_override(
            "ar",
            TranslationValue::from_json(json!({
                "header": {
                    "title": "ملفي الشخصي",
                    "subtitle": "إدارة حسابك"
                },
                "fields": {
                    "name": "الاسم الكامل",
                    "email": "البريد الإلكتروني"
                }
            })),
        ),
    );

    modules.insert(
        "check".to_string(),
        ModuleEntry {
            default: TranslationValue::from_json(json!({
                "filters": {
                    "pending": "Pending",
                    "reviewed": "Reviewed",
                    "all": "All"
                },
                "actions": {
                    "open": "Open",
                    "grade": "Grade"
                }
            })),
            overrides: BTreeMap::new(),
        }
        .with_override(
            "ar",
            TranslationValue::from_json(json!({
                "filters": {
                    "pending": "قيد الانتظار",
                    "reviewed": "تمت المراجعة",
                    "all": "الكل"
                },
                "actions": {
                    "open": "فتح",
                    "grade": "تصحيح"
                }
            })),
        ),
    );

    modules
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Entry Tests ====================

    #[test]
    fn test_entry_requires_tree_base() {
        let result = ModuleEntry::new(TranslationValue::Leaf("flat".to_string()));
        assert!(matches!(result, Err(LocaleError::InvalidRegistry(_))));
    }

    #[test]
    fn test_entry_override_lookup() {
        let entry = ModuleEntry::new(TranslationValue::from_json(json!({"k": "v"})))
            .unwrap()
            .with_override("ar", TranslationValue::from_json(json!({"k": "ع"})));
        assert!(entry.override_for("ar").is_some());
        assert!(entry.override_for("fr").is_none());
    }

    // ==================== Builtin Registry Tests ====================

    #[test]
    fn test_builtin_registry_modules() {
        let registry = ModuleRegistry::builtin();
        assert!(registry.get("common").is_some());
        assert!(registry.get("profile").is_some());
        assert!(registry.get("check").is_some());
        assert!(registry.get("doesNotExist").is_none());
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_builtin_check_module_has_arabic_override() {
        let registry = ModuleRegistry::builtin();
        let entry = registry.get("check").unwrap();
        let overlay = entry.override_for("ar").unwrap();
        assert_eq!(
            overlay.get("filters").unwrap().get("pending").unwrap().as_leaf(),
            Some("قيد الانتظار")
        );
    }

    #[test]
    fn test_iter_is_name_ordered() {
        let registry = ModuleRegistry::builtin();
        let names: Vec<_> = registry.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["check", "common", "profile"]);
    }

    // ==================== Directory Loading Tests ====================

    #[test]
    fn test_load_dir_reads_modules_and_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let module_dir = dir.path().join("grades");
        std::fs::create_dir(&module_dir).unwrap();
        std::fs::write(
            module_dir.join("default.json"),
            r#"{"table": {"score": "Score"}}"#,
        )
        .unwrap();
        std::fs::write(module_dir.join("ar.json"), r#"{"table": {"score": "الدرجة"}}"#).unwrap();

        let registry = ModuleRegistry::load_dir(dir.path()).unwrap();
        let entry = registry.get("grades").unwrap();
        assert_eq!(
            entry
                .default_tree()
                .get("table")
                .unwrap()
                .get("score")
                .unwrap()
                .as_leaf(),
            Some("Score")
        );
        assert!(entry.override_for("ar").is_some());
    }

    #[test]
    fn test_load_dir_requires_default_json() {
        let dir = tempfile::tempdir().unwrap();
        let module_dir = dir.path().join("grades");
        std::fs::create_dir(&module_dir).unwrap();
        std::fs::write(module_dir.join("ar.json"), r#"{"k": "v"}"#).unwrap();

        let result = ModuleRegistry::load_dir(dir.path());
        assert!(matches!(result, Err(LocaleError::InvalidRegistry(_))));
    }

    #[test]
    fn test_load_dir_rejects_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let module_dir = dir.path().join("grades");
        std::fs::create_dir(&module_dir).unwrap();
        std::fs::write(module_dir.join("default.json"), "{not json").unwrap();

        let result = ModuleRegistry::load_dir(dir.path());
        assert!(matches!(result, Err(LocaleError::InvalidRegistry(_))));
    }

    #[test]
    fn test_load_dir_ignores_stray_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("README.md"), "notes").unwrap();
        let module_dir = dir.path().join("grades");
        std::fs::create_dir(&module_dir).unwrap();
        std::fs::write(module_dir.join("default.json"), r#"{"k": "v"}"#).unwrap();
        std::fs::write(module_dir.join("notes.txt"), "ignored").unwrap();

        let registry = ModuleRegistry::load_dir(dir.path()).unwrap();
        assert_eq!(registry.len(), 1);
    }
}
