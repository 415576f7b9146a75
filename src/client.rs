//! Client-side translation provider: fetch, cache, and look up strings.
//!
//! One provider instance exists per active session. It tracks the current
//! language, the loaded locale payload, and a loading flag, and exposes the
//! `t()` accessor UI code calls for every string. The collaborators (the
//! persisted language preference and the document directionality sink)
//! are injected so independent providers can coexist in tests.

use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::i18n::{Language, LocalePayload};

/// Storage key for the persisted language preference.
pub const LANGUAGE_STORAGE_KEY: &str = "locale.language";

/// Persistence cell for the language preference.
///
/// Read once at initialization, written on every language change. Absence
/// means "use the default language"; write failures are non-fatal.
pub trait LanguageStore: Send + Sync {
    fn load(&self) -> Option<String>;
    fn save(&self, code: &str) -> Result<()>;
}

/// Document-level directionality/language attribute sink.
///
/// Written as a side effect of every language change. Failures are
/// cosmetic only and are ignored beyond a log line.
pub trait DirectionSink: Send + Sync {
    fn apply(&self, language: Language) -> Result<()>;
}

/// In-memory language store, for tests and headless use.
#[derive(Default)]
pub struct MemoryLanguageStore {
    cell: Mutex<Option<String>>,
}

impl MemoryLanguageStore {
    pub fn with_language(code: &str) -> MemoryLanguageStore {
        MemoryLanguageStore {
            cell: Mutex::new(Some(code.to_string())),
        }
    }
}

impl LanguageStore for MemoryLanguageStore {
    fn load(&self) -> Option<String> {
        self.cell.lock().expect("store lock poisoned").clone()
    }

    fn save(&self, code: &str) -> Result<()> {
        *self.cell.lock().expect("store lock poisoned") = Some(code.to_string());
        Ok(())
    }
}

/// Language store backed by a file named [`LANGUAGE_STORAGE_KEY`] inside a
/// directory, the session-storage analogue for native clients.
pub struct FileLanguageStore {
    path: std::path::PathBuf,
}

impl FileLanguageStore {
    pub fn new(dir: &std::path::Path) -> FileLanguageStore {
        FileLanguageStore {
            path: dir.join(LANGUAGE_STORAGE_KEY),
        }
    }
}

impl LanguageStore for FileLanguageStore {
    fn load(&self) -> Option<String> {
        let code = std::fs::read_to_string(&self.path).ok()?;
        let code = code.trim();
        if code.is_empty() {
            None
        } else {
            Some(code.to_string())
        }
    }

    fn save(&self, code: &str) -> Result<()> {
        std::fs::write(&self.path, code)
            .with_context(|| format!("Failed to write language preference to {:?}", self.path))
    }
}

/// Direction sink that records the last applied language, for tests and
/// headless use.
#[derive(Default)]
pub struct RecordingDirectionSink {
    last: Mutex<Option<Language>>,
}

impl RecordingDirectionSink {
    pub fn last_applied(&self) -> Option<Language> {
        *self.last.lock().expect("sink lock poisoned")
    }
}

impl DirectionSink for RecordingDirectionSink {
    fn apply(&self, language: Language) -> Result<()> {
        *self.last.lock().expect("sink lock poisoned") = Some(language);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Loading,
    Ready,
}

struct ProviderState {
    language: Language,
    payload: LocalePayload,
    phase: Phase,
    /// Bumped on every fetch start; a resolution whose generation no longer
    /// matches is stale and is discarded.
    generation: u64,
}

/// Per-session translation state holder.
///
/// State machine: starts Loading, transitions to Ready when a fetch
/// resolves, and re-enters Loading on every language change. A fetch
/// failure for a non-default language falls back once to the default
/// language; a failure fetching the default terminates in Ready with an
/// empty payload, so every lookup degrades to its caller-supplied default.
pub struct TranslationProvider<S, D> {
    state: Mutex<ProviderState>,
    http: reqwest::Client,
    base_url: String,
    store: S,
    sink: D,
}

impl<S: LanguageStore, D: DirectionSink> TranslationProvider<S, D> {
    /// Create a provider pointing at a delivery endpoint base URL.
    ///
    /// The provider starts in Loading with the default language; call
    /// `init` to read the persisted preference and perform the first fetch.
    pub fn new(http: reqwest::Client, base_url: &str, store: S, sink: D) -> Self {
        TranslationProvider {
            state: Mutex::new(ProviderState {
                language: Language::default_language(),
                payload: LocalePayload::new(),
                phase: Phase::Loading,
                generation: 0,
            }),
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            store,
            sink,
        }
    }

    /// Initialize: restore the persisted language, apply directionality,
    /// and fetch the locale payload.
    pub async fn init(&self) {
        let saved = self.store.load();
        let language = Language::resolve(saved.as_deref());
        debug!(language = language.code(), "initializing translation provider");

        {
            let mut state = self.state.lock().expect("provider lock poisoned");
            state.language = language;
        }
        self.apply_direction(language);
        self.reload(language).await;
    }

    /// Change the active language. No-op when it equals the current one;
    /// otherwise persists the choice, updates directionality, and re-enters
    /// Loading for a fresh fetch.
    pub async fn set_language(&self, code: &str) {
        let language = Language::resolve(Some(code));
        {
            let mut state = self.state.lock().expect("provider lock poisoned");
            if state.language == language {
                return;
            }
            state.language = language;
        }

        if let Err(err) = self.store.save(language.code()) {
            warn!(error = %err, "failed to persist language preference");
        }
        self.apply_direction(language);
        self.reload(language).await;
    }

    /// The language the session asked for. After a fallback fetch this
    /// still reports the requested code even though the content served is
    /// default-language.
    pub fn language(&self) -> Language {
        self.state.lock().expect("provider lock poisoned").language
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().expect("provider lock poisoned").phase == Phase::Loading
    }

    /// Look up a translated string by dotted key path.
    ///
    /// Returns `default` (or the key path itself when none is supplied)
    /// while Loading, on any missing segment, on traversal past a leaf, and
    /// on a non-leaf terminal. Never panics.
    pub fn t(&self, key_path: &str, default: Option<&str>) -> String {
        let fallback = || default.unwrap_or(key_path).to_string();

        let state = self.state.lock().expect("provider lock poisoned");
        if state.phase == Phase::Loading {
            return fallback();
        }

        let mut segments = key_path.split('.');
        let module = match segments.next() {
            Some(module) if !module.is_empty() => module,
            _ => return fallback(),
        };
        let mut current = match state.payload.get(module) {
            Some(value) => value,
            None => return fallback(),
        };
        for segment in segments {
            current = match current.get(segment) {
                Some(value) => value,
                None => return fallback(),
            };
        }
        match current.as_leaf() {
            Some(leaf) => leaf.to_string(),
            None => fallback(),
        }
    }

    /// Fetch the payload for `language`, falling back once to the default
    /// language on failure. Stale resolutions (superseded by a later
    /// language change) are discarded.
    async fn reload(&self, language: Language) {
        let generation = {
            let mut state = self.state.lock().expect("provider lock poisoned");
            state.phase = Phase::Loading;
            state.generation += 1;
            state.generation
        };

        let payload = match self.fetch_locale(language).await {
            Ok(payload) => payload,
            Err(err) if !language.is_default() => {
                // Single-hop fallback: one attempt at the default language,
                // never a retry loop.
                warn!(
                    language = language.code(),
                    error = %err,
                    "locale fetch failed, falling back to default language"
                );
                match self.fetch_locale(Language::default_language()).await {
                    Ok(payload) => payload,
                    Err(err) => {
                        warn!(error = %err, "default-language fetch failed, serving empty payload");
                        LocalePayload::new()
                    }
                }
            }
            Err(err) => {
                warn!(error = %err, "default-language fetch failed, serving empty payload");
                LocalePayload::new()
            }
        };

        let mut state = self.state.lock().expect("provider lock poisoned");
        if state.generation != generation {
            debug!(generation, "discarding stale locale fetch result");
            return;
        }
        state.payload = payload;
        state.phase = Phase::Ready;
    }

    async fn fetch_locale(&self, language: Language) -> Result<LocalePayload> {
        let url = format!("{}/api/locales?lang={}", self.base_url, language.code());
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .context("Failed to reach the locales endpoint")?;

        if !response.status().is_success() {
            anyhow::bail!("Locales endpoint returned {}", response.status());
        }

        let payload: LocalePayload = response
            .json()
            .await
            .context("Failed to decode locale payload")?;
        Ok(payload)
    }

    /// The injected language store (exposed for assertions in tests).
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The injected direction sink (exposed for assertions in tests).
    pub fn sink(&self) -> &D {
        &self.sink
    }

    fn apply_direction(&self, language: Language) {
        if let Err(err) = self.sink.apply(language) {
            warn!(error = %err, "failed to apply document directionality");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ready_provider(
        payload: serde_json::Value,
    ) -> TranslationProvider<MemoryLanguageStore, RecordingDirectionSink> {
        let provider = TranslationProvider::new(
            reqwest::Client::new(),
            "http://localhost:0",
            MemoryLanguageStore::default(),
            RecordingDirectionSink::default(),
        );
        {
            let mut state = provider.state.lock().unwrap();
            state.payload = serde_json::from_value(payload).unwrap();
            state.phase = Phase::Ready;
        }
        provider
    }

    fn loading_provider() -> TranslationProvider<MemoryLanguageStore, RecordingDirectionSink> {
        TranslationProvider::new(
            reqwest::Client::new(),
            "http://localhost:0",
            MemoryLanguageStore::default(),
            RecordingDirectionSink::default(),
        )
    }

    // ==================== Lookup Accessor Tests ====================

    #[test]
    fn test_lookup_returns_default_while_loading() {
        let provider = loading_provider();
        assert_eq!(provider.t("any.key", Some("X")), "X");
        assert_eq!(provider.t("any.key", None), "any.key");
    }

    #[test]
    fn test_lookup_resolves_leaf() {
        let provider = ready_provider(json!({
            "profile": {"header": {"title": "My Profile"}}
        }));
        assert_eq!(provider.t("profile.header.title", None), "My Profile");
    }

    #[test]
    fn test_lookup_miss_returns_default() {
        let provider = ready_provider(json!({
            "profile": {"header": {"title": "My Profile"}}
        }));
        assert_eq!(provider.t("profile.header.missing", Some("D")), "D");
        assert_eq!(provider.t("otherModule.key", Some("D")), "D");
    }

    #[test]
    fn test_lookup_past_leaf_is_a_miss() {
        let provider = ready_provider(json!({
            "profile": {"header": {"title": "My Profile"}}
        }));
        assert_eq!(provider.t("profile.header.title.tooDeep", Some("D")), "D");
    }

    #[test]
    fn test_lookup_non_leaf_terminal_is_a_miss() {
        let provider = ready_provider(json!({
            "profile": {"header": {"title": "My Profile"}}
        }));
        assert_eq!(provider.t("profile.header", Some("D")), "D");
    }

    #[test]
    fn test_lookup_empty_key_returns_default() {
        let provider = ready_provider(json!({"profile": {}}));
        assert_eq!(provider.t("", Some("D")), "D");
    }

    // ==================== Collaborator Tests ====================

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryLanguageStore::default();
        assert_eq!(store.load(), None);
        store.save("ar").unwrap();
        assert_eq!(store.load(), Some("ar".to_string()));
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileLanguageStore::new(dir.path());
        assert_eq!(store.load(), None);
        store.save("ar").unwrap();
        assert_eq!(store.load(), Some("ar".to_string()));
    }

    #[test]
    fn test_file_store_ignores_blank_content() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileLanguageStore::new(dir.path());
        std::fs::write(dir.path().join(LANGUAGE_STORAGE_KEY), "  \n").unwrap();
        assert_eq!(store.load(), None);
    }

    #[test]
    fn test_recording_sink_tracks_last_language() {
        let sink = RecordingDirectionSink::default();
        assert_eq!(sink.last_applied(), None);
        sink.apply(Language::ARABIC).unwrap();
        assert_eq!(sink.last_applied(), Some(Language::ARABIC));
    }
}
