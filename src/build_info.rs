/// Build-time metadata exposed at runtime.
pub const BUILD_VERSION: &str = env!("APP_BUILD_VERSION");
pub const BUILD_COMMIT: &str = env!("APP_BUILD_COMMIT");
pub const BUILD_TIMESTAMP: &str = env!("APP_BUILD_TIMESTAMP");

/// Human-readable summary combining Cargo version and build metadata.
pub fn summary() -> String {
    format!(
        "ocr-stats {} (build {}, commit {}, built at {})",
        env!("CARGO_PKG_VERSION"),
        BUILD_VERSION,
        BUILD_COMMIT,
        BUILD_TIMESTAMP
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_mentions_package_version() {
        let text = summary();
        assert!(text.starts_with("ocr-stats "));
        assert!(text.contains(env!("CARGO_PKG_VERSION")));
        assert!(text.contains(BUILD_COMMIT));
    }
}
