use std::path::PathBuf;

use clap::Parser;
use ocr_stats::app::{self, ConfigManager};
use ocr_stats::input::PageFormat;
use ocr_stats::util::config::Config;
use ocr_stats::{build_info, runner};

/// 统计 OCR 输出的质量指标，按文档输出逐页 CSV
#[derive(Debug, Parser)]
#[command(name = "ocr-stats", version, about)]
struct Cli {
    /// 待处理的页面目录（递归）
    directory: Option<PathBuf>,

    /// 词典文件，可重复；顺序即输出列顺序
    #[arg(short = 'd', long = "dictionary")]
    dictionaries: Vec<PathBuf>,

    /// 替换规则文件，可重复
    #[arg(short = 'r', long = "replacements")]
    replacements: Vec<PathBuf>,

    #[arg(short = 'f', long, value_enum)]
    format: Option<PageFormat>,

    /// 匹配完整路径的正则，捕获组组成文档 ID
    #[arg(short = 'x', long)]
    filter: Option<String>,

    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// 同时为每个文档输出 `<docId>.csv`
    #[arg(long)]
    per_document_dir: Option<PathBuf>,

    /// 并行线程数，0 表示按 CPU 核数
    #[arg(short = 'j', long)]
    workers: Option<usize>,

    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    /// 命令行参数覆盖配置文件与环境变量
    fn apply_to(self, config: &mut Config) {
        let analysis = &mut config.analysis;
        if let Some(directory) = self.directory {
            analysis.input_dir = Some(directory);
        }
        if !self.dictionaries.is_empty() {
            analysis.dictionaries = self.dictionaries;
        }
        if !self.replacements.is_empty() {
            analysis.replacement_rules = self.replacements;
        }
        if let Some(format) = self.format {
            analysis.format = format;
        }
        if let Some(filter) = self.filter {
            analysis.file_filter = Some(filter);
        }
        if let Some(output) = self.output {
            analysis.output = output;
        }
        if let Some(dir) = self.per_document_dir {
            analysis.per_document_dir = Some(dir);
        }
        if let Some(workers) = self.workers {
            analysis.workers = workers;
        }
        if let Some(level) = self.log_level {
            config.logging.level = level;
        }
    }
}

fn main() -> anyhow::Result<()> {
    app::install_panic_hook();

    let cli = Cli::parse();
    let mut config = ConfigManager::load(cli.config.as_deref())?;
    cli.apply_to(&mut config);

    let _log_guard = ConfigManager::initialize_logging(&config, "ocr-stats")?;
    tracing::info!("{}", build_info::summary());

    ConfigManager::validate(&config)?;

    let analyzer = runner::build_analyzer(&config.analysis)?;
    let summary = runner::run(&config.analysis, &analyzer)?;

    println!(
        "[ok] 统计完成：{}（文档 {}，页面 {}，失败 {}）",
        config.analysis.output.display(),
        summary.documents,
        summary.pages,
        summary.failed
    );

    Ok(())
}
