//! Locale resolution service.
//!
//! Server side: a static registry of translation modules with per-language
//! overrides, a pure deep-merge engine, and an HTTP delivery endpoint that
//! serves whole-locale or single-module payloads.
//!
//! Client side: a per-session provider that fetches and caches the payload,
//! persists the language choice, drives document directionality, and
//! exposes the `t()` lookup accessor with caller-supplied defaults.

pub mod client;
pub mod config;
pub mod i18n;
pub mod server;
