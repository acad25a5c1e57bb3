//! Centralised logging metadata (event names, shared keys, etc.).

/// Canonical event names used across the tool.
pub mod events {
    /// Logging setup.
    pub const LOG_INIT: &str = "log.init";
    pub const LOG_RETENTION: &str = "log.retention";
    pub const LOG_CLEANUP: &str = "log.cleanup";
    pub const LOG_CLEANUP_FAILED: &str = "log.cleanup_failed";

    /// Configuration lifecycle.
    pub const CONFIG_LOADED: &str = "config.loaded";
    pub const CONFIG_DEFAULT: &str = "config.default";
    pub const CONFIG_ENV_OVERRIDE: &str = "config.env_override";
    pub const CONFIG_ENV_INVALID: &str = "config.env_invalid";
    pub const CONFIG_INVALID: &str = "config.invalid";
    pub const CONFIG_WARNING: &str = "config.warning";

    /// Reference data.
    pub const DICTIONARY_LOADED: &str = "dictionary.loaded";
    pub const RULES_LOADED: &str = "rules.loaded";
    pub const BINS_COMPUTED: &str = "bins.computed";

    /// Run lifecycle.
    pub const RUN_START: &str = "run.start";
    pub const RUN_FILE: &str = "run.file";
    pub const RUN_COMPLETE: &str = "run.complete";
    pub const PAGE_FAILED: &str = "page.failed";
    pub const DOCUMENT_EXPORTED: &str = "document.exported";
    pub const DOCUMENT_EMPTY: &str = "document.empty";
    pub const REPORT_WRITTEN: &str = "report.written";

    pub const PANIC_RAISED: &str = "panic.raised";
}
