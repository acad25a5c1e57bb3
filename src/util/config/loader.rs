//! 配置加载
//! 处理配置文件的查找、读取与环境变量覆盖

use super::types::*;
use crate::input::PageFormat;
use crate::util::logging::events;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_LOG_LEVEL: &str = "OCR_STATS_LOG_LEVEL";
pub const ENV_WORKERS: &str = "OCR_STATS_WORKERS";
pub const ENV_OUTPUT: &str = "OCR_STATS_OUTPUT";
pub const ENV_FORMAT: &str = "OCR_STATS_FORMAT";

/// 配置加载器
pub struct ConfigLoader;

impl ConfigLoader {
    /// 从YAML文件读取配置
    pub fn read_yaml(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        let config_str = fs::read_to_string(path)
            .with_context(|| format!("读取配置文件失败: {}", path.display()))?;
        let config = serde_yaml::from_str(&config_str)
            .with_context(|| format!("配置文件解析失败: {}", path.display()))?;
        Ok(config)
    }

    /// 读取配置；文件不存在时使用默认配置，存在但无法解析时报错
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(event = events::CONFIG_DEFAULT, path = %path.display());
            return Ok(Config::default());
        }
        Self::read_yaml(path)
    }

    /// 读取配置并应用环境变量覆盖
    pub fn load_with_env_overrides(path: impl AsRef<Path>) -> Result<Config> {
        let base_config = Self::load_or_default(path)?;
        Ok(Self::apply_env_overrides(base_config))
    }

    /// 从环境变量读取配置覆盖
    pub fn apply_env_overrides(config: Config) -> Config {
        Self::apply_overrides_from(config, |key| std::env::var(key).ok())
    }

    /// 以任意键值来源覆盖配置，无法解析的值保持原配置
    pub fn apply_overrides_from<F>(mut config: Config, lookup: F) -> Config
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            config.logging.level = level.trim().to_string();
            tracing::info!(event = events::CONFIG_ENV_OVERRIDE, key = ENV_LOG_LEVEL, value = %config.logging.level);
        }

        if let Some(workers) = lookup(ENV_WORKERS) {
            match workers.trim().parse::<usize>() {
                Ok(workers) => {
                    config.analysis.workers = workers;
                    tracing::info!(event = events::CONFIG_ENV_OVERRIDE, key = ENV_WORKERS, value = workers);
                }
                Err(_) => {
                    tracing::warn!(event = events::CONFIG_ENV_INVALID, key = ENV_WORKERS, value = %workers);
                }
            }
        }

        if let Some(output) = lookup(ENV_OUTPUT) {
            let output = output.trim();
            if !output.is_empty() {
                config.analysis.output = PathBuf::from(output);
                tracing::info!(event = events::CONFIG_ENV_OVERRIDE, key = ENV_OUTPUT, value = %output);
            }
        }

        if let Some(format) = lookup(ENV_FORMAT) {
            match format.parse::<PageFormat>() {
                Ok(format) => {
                    config.analysis.format = format;
                    tracing::info!(event = events::CONFIG_ENV_OVERRIDE, key = ENV_FORMAT, value = %format);
                }
                Err(_) => {
                    tracing::warn!(event = events::CONFIG_ENV_INVALID, key = ENV_FORMAT, value = %format);
                }
            }
        }

        config
    }

    /// 查找配置文件：`./config/`、`../config/`、可执行文件所在 `bin/` 的上级 `config/`，最后是当前目录
    pub fn find_config_file_path(filename: &str) -> PathBuf {
        let current_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

        let config_in_current = current_dir.join("config").join(filename);
        if config_in_current.exists() {
            return config_in_current;
        }

        if let Some(parent) = current_dir.parent() {
            let config_in_parent = parent.join("config").join(filename);
            if config_in_parent.exists() {
                return config_in_parent;
            }
        }

        if let Some(exe_dir) = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
        {
            if exe_dir.file_name() == Some(std::ffi::OsStr::new("bin")) {
                if let Some(project_root) = exe_dir.parent() {
                    let config_in_root = project_root.join("config").join(filename);
                    if config_in_root.exists() {
                        return config_in_root;
                    }
                }
            }
        }

        current_dir.join(filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = ConfigLoader::load_or_default(dir.path().join("absent.yaml")).unwrap();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.analysis.format, PageFormat::Txt);
        assert_eq!(config.analysis.output, PathBuf::from("ocr-stats.csv"));
        assert!(!config.logging.file.enabled);
    }

    #[test]
    fn test_read_partial_yaml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(
            &path,
            "logging:\n  level: debug\n  file:\n    enabled: true\n    retention_days: 7\nanalysis:\n  format: hocr\n  file_filter: '(\\w+)/\\d+\\.html$'\n  dictionaries:\n    - dict/english.txt\n  workers: 3\n",
        )
        .unwrap();

        let config = ConfigLoader::read_yaml(&path).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.file.enabled);
        assert_eq!(config.logging.file.directory, "logs");
        assert_eq!(config.logging.file.retention_days, Some(7));
        assert_eq!(config.analysis.format, PageFormat::Hocr);
        assert_eq!(config.analysis.dictionaries.len(), 1);
        assert_eq!(config.analysis.effective_workers(), 3);
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "analysis: [unterminated").unwrap();
        assert!(ConfigLoader::load_or_default(&path).is_err());
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            (ENV_LOG_LEVEL, "warn"),
            (ENV_WORKERS, "not-a-number"),
            (ENV_OUTPUT, "out/all.csv"),
            (ENV_FORMAT, "HOCR"),
        ]
        .into_iter()
        .collect();

        let mut base = Config::default();
        base.analysis.workers = 2;
        let config =
            ConfigLoader::apply_overrides_from(base, |key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.logging.level, "warn");
        // 无法解析的值保持原配置
        assert_eq!(config.analysis.workers, 2);
        assert_eq!(config.analysis.output, PathBuf::from("out/all.csv"));
        assert_eq!(config.analysis.format, PageFormat::Hocr);
    }
}
