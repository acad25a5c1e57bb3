//! 配置数据结构定义

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::input::PageFormat;

/// 主配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub file: LogFileConfig,
    pub structured: Option<bool>, // 是否启用 JSON 结构化日志
    #[serde(default)]
    pub level_config: Option<LevelConfig>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: LogFileConfig::default(),
            structured: None,
            level_config: None,
        }
    }
}

/// 日志文件配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogFileConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_log_directory")]
    pub directory: String,
    pub retention_days: Option<u32>,
}

impl Default for LogFileConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            directory: default_log_directory(),
            retention_days: None,
        }
    }
}

/// 分模块日志级别
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LevelConfig {
    /// 分类与统计核心（`ocr_quality`）
    #[serde(default)]
    pub core: Option<String>,
    /// 页面解析与词典加载
    #[serde(default)]
    pub input: Option<String>,
    /// 目录遍历、并行执行与导出
    #[serde(default)]
    pub runner: Option<String>,
    #[serde(default)]
    pub overrides: HashMap<String, String>,
}

/// 统计任务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub format: PageFormat,
    /// 待处理的目录
    #[serde(default)]
    pub input_dir: Option<PathBuf>,
    /// 匹配完整路径的正则，捕获组用 `-` 连接成文档 ID
    #[serde(default)]
    pub file_filter: Option<String>,
    #[serde(default)]
    pub dictionaries: Vec<PathBuf>,
    #[serde(default)]
    pub replacement_rules: Vec<PathBuf>,
    #[serde(default = "default_output")]
    pub output: PathBuf,
    /// 设置后额外为每个文档输出 `<docId>.csv`
    #[serde(default)]
    pub per_document_dir: Option<PathBuf>,
    /// 并行线程数，0 表示按 CPU 核数
    #[serde(default)]
    pub workers: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            format: PageFormat::default(),
            input_dir: None,
            file_filter: None,
            dictionaries: Vec::new(),
            replacement_rules: Vec::new(),
            output: default_output(),
            per_document_dir: None,
            workers: 0,
        }
    }
}

impl AnalysisConfig {
    /// 实际使用的线程数
    pub fn effective_workers(&self) -> usize {
        if self.workers == 0 {
            num_cpus::get().max(1)
        } else {
            self.workers
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_directory() -> String {
    "logs".to_string()
}

fn default_output() -> PathBuf {
    PathBuf::from("ocr-stats.csv")
}
