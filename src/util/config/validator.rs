//! 配置验证模块
//! 运行前检查配置，错误阻止运行，警告只记录日志

use super::types::*;
use crate::util::logging::events;
use regex::Regex;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// 配置验证器
pub struct ConfigValidator;

impl ConfigValidator {
    /// 全面验证配置
    pub fn validate_all(config: &Config) -> ValidationReport {
        let mut report = ValidationReport::new();

        Self::validate_logging_config(&config.logging, &mut report);
        Self::validate_analysis_config(&config.analysis, &mut report);

        report
    }

    fn validate_logging_config(logging: &LoggingConfig, report: &mut ValidationReport) {
        if !LOG_LEVELS.contains(&logging.level.to_lowercase().as_str()) {
            report.add_warning(
                "logging.level",
                &format!("未知的日志级别 {}，将使用 info", logging.level),
            );
        }

        if logging.file.enabled && logging.file.directory.trim().is_empty() {
            report.add_error("logging.file.directory", "启用文件日志时目录不能为空");
        }

        if logging.file.retention_days == Some(0) {
            report.add_warning("logging.file.retention_days", "保留天数为0，日志将被全部清理");
        }
    }

    fn validate_analysis_config(analysis: &AnalysisConfig, report: &mut ValidationReport) {
        if analysis.dictionaries.is_empty() {
            report.add_error("analysis.dictionaries", "至少需要一个词典文件");
        }
        for path in &analysis.dictionaries {
            if !path.is_file() {
                report.add_error(
                    "analysis.dictionaries",
                    &format!("词典文件不存在: {}", path.display()),
                );
            }
        }
        for path in &analysis.replacement_rules {
            if !path.is_file() {
                report.add_error(
                    "analysis.replacement_rules",
                    &format!("替换规则文件不存在: {}", path.display()),
                );
            }
        }

        match analysis.input_dir.as_ref() {
            None => report.add_error("analysis.input_dir", "未指定输入目录"),
            Some(dir) if !dir.is_dir() => report.add_error(
                "analysis.input_dir",
                &format!("输入目录不存在: {}", dir.display()),
            ),
            Some(_) => {}
        }

        match analysis.file_filter.as_deref() {
            None => report.add_error("analysis.file_filter", "未指定文件过滤正则"),
            Some(filter) => match Regex::new(filter) {
                Ok(regex) if regex.captures_len() <= 1 => report.add_error(
                    "analysis.file_filter",
                    "文件过滤正则没有捕获组，无法计算文档ID",
                ),
                Ok(_) => {}
                Err(e) => report.add_error(
                    "analysis.file_filter",
                    &format!("文件过滤正则无效: {}", e),
                ),
            },
        }

        if analysis.output.as_os_str().is_empty() {
            report.add_error("analysis.output", "输出文件不能为空");
        }

        if analysis.workers > num_cpus::get() * 4 {
            report.add_warning(
                "analysis.workers",
                &format!("线程数 {} 远超 CPU 核数", analysis.workers),
            );
        }
    }
}

/// 验证报告
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, field: &str, message: &str) {
        self.errors.push(ValidationIssue {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn add_warning(&mut self, field: &str, message: &str) {
        self.warnings.push(ValidationIssue {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }

    /// 将问题逐条写入日志
    pub fn log(&self) {
        for issue in &self.errors {
            tracing::error!(event = events::CONFIG_INVALID, field = %issue.field, message = %issue.message);
        }
        for issue in &self.warnings {
            tracing::warn!(event = events::CONFIG_WARNING, field = %issue.field, message = %issue.message);
        }
    }
}

/// 验证问题
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}
