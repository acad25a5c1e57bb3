use crate::util::config::{LevelConfig, LoggingConfig};
use crate::util::logging::events;
use std::io;
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::daily;
use tracing_subscriber::fmt::format::Format;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{filter::EnvFilter, Layer, Registry};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// 按配置初始化日志：控制台始终输出，启用文件日志时追加按天滚动的文件输出
///
/// 返回的 guard 需要在进程结束前保持存活，否则缓冲中的日志会丢失。
pub fn log_init_with_config(
    file_prefix: &str,
    config: &LoggingConfig,
) -> anyhow::Result<Option<WorkerGuard>> {
    let level_filter = parse_level(&config.level).unwrap_or(LevelFilter::INFO);
    let filter_expression = build_env_filter_expression(level_filter, config.level_config.as_ref());
    let use_json = config.structured.unwrap_or(false);

    let mut layers: Vec<BoxedLayer> = vec![console_layer(
        use_json,
        env_filter(&filter_expression, level_filter),
    )];

    let mut guard = None;
    let mut log_dir = None;
    if config.file.enabled {
        let dir = resolve_log_dir(&config.file.directory);
        std::fs::create_dir_all(&dir)?;

        let file_appender = daily(&dir, format!("{}.log", file_prefix));
        let (no_blocking, file_guard) = tracing_appender::non_blocking(file_appender);
        layers.push(file_layer(
            use_json,
            no_blocking,
            env_filter(&filter_expression, level_filter),
        ));
        guard = Some(file_guard);
        log_dir = Some(dir);
    }

    Registry::default().with(layers).try_init()?;

    tracing::info!(
        event = events::LOG_INIT,
        level = %config.level,
        console = true,
        file = config.file.enabled,
        directory = %log_dir.as_deref().map(|d| d.display().to_string()).unwrap_or_default(),
        rotation = "daily",
        structured = use_json
    );
    if let (Some(retention), true) = (config.file.retention_days, config.file.enabled) {
        tracing::info!(event = events::LOG_RETENTION, days = retention);
    }

    Ok(guard)
}

fn console_layer(use_json: bool, filter: EnvFilter) -> BoxedLayer {
    if use_json {
        layer()
            .json()
            .with_target(false)
            .with_writer(io::stdout)
            .with_filter(filter)
            .boxed()
    } else {
        let console_format = Format::default()
            .without_time()
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false);
        layer()
            .event_format(console_format)
            .with_writer(io::stdout)
            .with_filter(filter)
            .boxed()
    }
}

fn file_layer(use_json: bool, writer: NonBlocking, filter: EnvFilter) -> BoxedLayer {
    if use_json {
        layer()
            .json()
            .with_ansi(false)
            .with_writer(writer)
            .with_filter(filter)
            .boxed()
    } else {
        let file_format = Format::default()
            .with_target(true)
            .with_thread_ids(false)
            .with_thread_names(false);
        layer()
            .event_format(file_format)
            .with_ansi(false)
            .with_writer(writer)
            .with_filter(filter)
            .boxed()
    }
}

fn env_filter(expression: &str, fallback: LevelFilter) -> EnvFilter {
    EnvFilter::try_new(expression).unwrap_or_else(|_| EnvFilter::new(level_filter_to_str(fallback)))
}

/// 相对路径基于项目根目录；在 `bin/` 下运行时使用上级目录
pub fn resolve_log_dir(directory: &str) -> PathBuf {
    let path = Path::new(directory);
    if path.is_absolute() {
        return path.to_path_buf();
    }

    let current_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    if current_dir.file_name() == Some(std::ffi::OsStr::new("bin")) {
        if let Some(parent) = current_dir.parent() {
            return parent.join(directory);
        }
    }
    current_dir.join(directory)
}

/// 清理超过保留天数、文件名以 `file_prefix` 开头的日志
pub fn cleanup_old_logs(log_dir: &Path, file_prefix: &str, retention_days: u32) -> anyhow::Result<usize> {
    if !log_dir.exists() {
        tracing::debug!("日志目录不存在: {}", log_dir.display());
        return Ok(0);
    }

    let cutoff_time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)?
        .as_secs()
        .saturating_sub(retention_days as u64 * 24 * 60 * 60);

    let mut deleted_count = 0;
    let mut error_count = 0;

    for entry in std::fs::read_dir(log_dir)? {
        let entry = entry?;
        let path = entry.path();

        // 只处理本工具的日志文件
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("");
        if !file_name.starts_with(file_prefix) {
            continue;
        }

        let Ok(metadata) = entry.metadata() else {
            continue;
        };
        if !metadata.is_file() {
            continue;
        }

        let modified = metadata
            .modified()
            .or_else(|_| metadata.created())
            .unwrap_or_else(|_| std::time::SystemTime::now());
        let Ok(file_time) = modified.duration_since(std::time::UNIX_EPOCH) else {
            continue;
        };

        if file_time.as_secs() < cutoff_time {
            match std::fs::remove_file(&path) {
                Ok(()) => deleted_count += 1,
                Err(e) => {
                    error_count += 1;
                    tracing::warn!(event = events::LOG_CLEANUP_FAILED, path = %path.display(), error = %e);
                }
            }
        }
    }

    tracing::info!(
        event = events::LOG_CLEANUP,
        deleted = deleted_count,
        failed = error_count,
        retention_days
    );

    Ok(deleted_count)
}

fn build_env_filter_expression(
    default_level: LevelFilter,
    level_config: Option<&LevelConfig>,
) -> String {
    let mut directives = vec![level_filter_to_str(default_level).to_string()];

    if let Some(cfg) = level_config {
        if let Some(level) = cfg.core.as_deref().and_then(normalize_level_str) {
            directives.push(format!("ocr_quality={level}"));
        }
        if let Some(level) = cfg.input.as_deref().and_then(normalize_level_str) {
            directives.push(format!("ocr_stats::input={level}"));
        }
        if let Some(level) = cfg.runner.as_deref().and_then(normalize_level_str) {
            directives.push(format!("ocr_stats::runner={level}"));
            directives.push(format!("ocr_stats::export={level}"));
        }

        let mut overrides: Vec<_> = cfg.overrides.iter().collect();
        overrides.sort();
        for (target, level_str) in overrides {
            if let Some(level) = normalize_level_str(level_str) {
                directives.push(format!("{}={level}", normalize_directive_target(target)));
            }
        }
    }

    directives.join(",")
}

fn parse_level(level: &str) -> Option<LevelFilter> {
    match normalize_level_str(level)? {
        "trace" => Some(LevelFilter::TRACE),
        "debug" => Some(LevelFilter::DEBUG),
        "info" => Some(LevelFilter::INFO),
        "warn" => Some(LevelFilter::WARN),
        _ => Some(LevelFilter::ERROR),
    }
}

fn normalize_level_str(level: &str) -> Option<&'static str> {
    match level.to_lowercase().as_str() {
        "trace" => Some("trace"),
        "debug" => Some("debug"),
        "info" => Some("info"),
        "warn" => Some("warn"),
        "error" => Some("error"),
        _ => None,
    }
}

fn level_filter_to_str(level: LevelFilter) -> &'static str {
    match level {
        LevelFilter::OFF => "off",
        LevelFilter::ERROR => "error",
        LevelFilter::WARN => "warn",
        LevelFilter::INFO => "info",
        LevelFilter::DEBUG => "debug",
        LevelFilter::TRACE => "trace",
    }
}

// `runner` -> `ocr_stats::runner`；`target:` 前缀或带 `::` 的目标原样使用
fn normalize_directive_target(target: &str) -> String {
    if let Some(raw) = target.strip_prefix("target:") {
        raw.to_string()
    } else if target.contains("::") {
        target.to_string()
    } else {
        let path = target.replace('.', "::");
        format!("ocr_stats::{path}")
    }
}
