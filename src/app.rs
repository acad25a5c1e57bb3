//! 两个可执行文件共用的启动流程：panic 钩子、配置加载、日志初始化

use std::io::Write;
use std::path::Path;

use anyhow::{anyhow, Result};
use tracing_appender::non_blocking::WorkerGuard;

use crate::util::config::{Config, ConfigLoader, ConfigValidator};
use crate::util::log::{cleanup_old_logs, log_init_with_config, resolve_log_dir};
use crate::util::logging::events;

pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// panic 时输出到 stderr 并写入 `./panic.log`
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|panic_info| {
        let payload = panic_info.payload();
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            s
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s
        } else {
            "Unknown panic payload"
        };

        let location = panic_info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "Unknown location".to_string());
        let now = chrono::Utc::now();

        eprintln!("[PANIC] 程序异常退出");
        eprintln!("位置: {}", location);
        eprintln!("原因: {}", message);
        eprintln!("时间: {}", now.format("%Y-%m-%d %H:%M:%S UTC"));

        tracing::error!(event = events::PANIC_RAISED, location = %location, reason = %message, time = %now);

        let panic_msg = format!(
            "PANIC OCCURRED\nLocation: {}\nReason: {}\nTime: {}\n\n",
            location,
            message,
            now.to_rfc3339()
        );
        if let Err(e) = std::fs::write("./panic.log", &panic_msg) {
            eprintln!("[WARN] 无法写入panic.log: {}", e);
        }

        std::io::stderr().flush().ok();
    }));
}

pub struct ConfigManager;

impl ConfigManager {
    /// 加载配置（显式路径优先，否则按约定目录查找），并应用环境变量覆盖
    pub fn load(explicit: Option<&Path>) -> Result<Config> {
        let config_path = match explicit {
            Some(path) => {
                if !path.is_file() {
                    return Err(anyhow!("配置文件不存在: {}", path.display()));
                }
                path.to_path_buf()
            }
            None => ConfigLoader::find_config_file_path(CONFIG_FILE_NAME),
        };
        ConfigLoader::load_with_env_overrides(&config_path)
    }

    /// 初始化日志并按保留天数清理旧日志；返回的 guard 需持有到进程结束
    pub fn initialize_logging(config: &Config, file_prefix: &str) -> Result<Option<WorkerGuard>> {
        let guard = log_init_with_config(file_prefix, &config.logging)?;

        if let (Some(retention_days), true) =
            (config.logging.file.retention_days, config.logging.file.enabled)
        {
            let log_dir = resolve_log_dir(&config.logging.file.directory);
            match cleanup_old_logs(&log_dir, file_prefix, retention_days) {
                Ok(deleted) => {
                    tracing::info!(event = events::LOG_CLEANUP, deleted = deleted, retention_days = retention_days)
                }
                Err(e) => {
                    tracing::warn!(event = events::LOG_CLEANUP_FAILED, error = %e)
                }
            }
        }

        Ok(guard)
    }

    /// 校验配置并输出结果，存在错误时返回 Err
    pub fn validate(config: &Config) -> Result<()> {
        let report = ConfigValidator::validate_all(config);
        report.log();
        if report.has_errors() {
            return Err(anyhow!(
                "配置验证失败，共 {} 个错误，请先修复配置",
                report.error_count()
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_explicit_missing_config_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = ConfigManager::load(Some(&dir.path().join("nope.yaml"))).unwrap_err();
        assert!(err.to_string().contains("nope.yaml"));
    }

    #[test]
    fn test_explicit_config_is_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.yaml");
        std::fs::write(&path, "analysis:\n  format: hocr\n  output: out.csv\n").unwrap();

        let config = ConfigManager::load(Some(&path)).unwrap();
        assert_eq!(config.analysis.output, std::path::PathBuf::from("out.csv"));
    }

    #[test]
    fn test_default_config_fails_validation() {
        // 默认配置没有词典与输入目录
        assert!(ConfigManager::validate(&Config::default()).is_err());
    }
}
