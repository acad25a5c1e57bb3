//! 一次统计运行
//!
//! 递归遍历输入目录，用过滤正则挑选页面文件并归入文档，在 rayon 线程池中
//! 并行统计各页，最后导出合并 CSV 与（可选的）单文档 CSV。

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use anyhow::{Context, Result};
use ocr_quality::{Analyzer, BinSet, Document, LengthSummary, PageStatistics, QualityError};
use parking_lot::Mutex;
use rayon::prelude::*;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use crate::export;
use crate::input::{self, PageFormat, ParsedPage};
use crate::util::config::AnalysisConfig;
use crate::util::logging::events;

/// 运行级致命错误
#[derive(Debug, Error)]
pub enum RunError {
    #[error("未配置输入目录")]
    MissingInputDir,

    #[error("输入目录不存在或不是目录: {path}")]
    InputDirNotFound { path: String },

    #[error("未配置文件过滤正则")]
    MissingFilter,

    /// 过滤正则没有捕获组，无法确定文档 ID
    #[error("文件过滤正则必须至少包含一个捕获组: {filter}")]
    FilterWithoutGroups { filter: String },
}

/// 一个待统计的页面文件及其所属文档
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFile {
    pub path: PathBuf,
    pub doc_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// 并行统计结果：按文档 ID 升序的文档与失败页
#[derive(Debug, Default)]
pub struct Collected {
    pub documents: BTreeMap<String, Document>,
    pub failures: Vec<PageFailure>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub files: usize,
    pub pages: usize,
    pub failed: usize,
    pub documents: usize,
    pub rows: usize,
    pub document_files: usize,
}

/// 加载词典与替换规则，并由全部词典的词长统计计算分箱
pub fn build_analyzer(config: &AnalysisConfig) -> Result<Analyzer> {
    let dictionaries = input::load_dictionaries(&config.dictionaries)?;

    let summary = LengthSummary::aggregate(dictionaries.iter().map(|d| d.length_summary()));
    let bins = BinSet::from_summary(&summary);
    tracing::info!(
        event = events::BINS_COMPUTED,
        dictionaries = dictionaries.len(),
        words = summary.count(),
        mean = summary.mean(),
        stdev = summary.standard_deviation(),
        bins = %bins
    );

    let rules = input::load_replacement_rules(&config.replacement_rules)?;

    Ok(Analyzer::new(bins, rules, input::dictionary::into_shared(dictionaries)))
}

/// 递归列出目录下的所有文件，按路径排序
pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    walk(dir, &mut files)?;
    files.sort();
    Ok(files)
}

fn walk(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("读取目录失败: {}", dir.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("读取目录项失败: {}", dir.display()))?;
        let path = entry.path();
        if path.is_dir() {
            walk(&path, files)?;
        } else {
            files.push(path);
        }
    }
    Ok(())
}

/// 用过滤正则在完整路径中查找匹配；捕获组以 `-` 连接为文档 ID
///
/// 不匹配返回 `Ok(None)`；未参与匹配的组记为空串。
pub fn document_id(filter: &Regex, path: &Path) -> Result<Option<String>, RunError> {
    let text = path.to_string_lossy();
    let Some(captures) = filter.captures(&text) else {
        return Ok(None);
    };

    if captures.len() <= 1 {
        return Err(RunError::FilterWithoutGroups {
            filter: filter.as_str().to_string(),
        });
    }

    let parts: Vec<&str> = captures
        .iter()
        .skip(1)
        .map(|group| group.map_or("", |m| m.as_str()))
        .collect();
    Ok(Some(parts.join("-")))
}

pub fn collect_page_files(dir: &Path, filter: &Regex) -> Result<Vec<PageFile>> {
    let mut pages = Vec::new();
    for path in list_files(dir)? {
        match document_id(filter, &path)? {
            Some(doc_id) => pages.push(PageFile { path, doc_id }),
            None => tracing::trace!(path = %path.display(), "skipped by filter"),
        }
    }
    Ok(pages)
}

fn analyze_file(
    analyzer: &Analyzer,
    format: PageFormat,
    path: &Path,
) -> Result<PageStatistics, QualityError> {
    let page = ParsedPage::load(format, path)?;
    let mut stats = analyzer.analyze_page(&page)?;
    page.apply_extras(&mut stats);
    Ok(stats)
}

/// 在指定线程数的池中并行统计所有页面
///
/// 页面结果按输入顺序归入文档，同页码的重复页保持文件顺序；失败页记录后跳过。
pub fn analyze_files(
    analyzer: &Analyzer,
    format: PageFormat,
    files: &[PageFile],
    workers: usize,
) -> Result<Collected> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|index| format!("ocr-stats-{}", index))
        .build()
        .context("创建统计线程池失败")?;

    let failures: Mutex<Vec<PageFailure>> = Mutex::new(Vec::new());
    let processed = AtomicUsize::new(0);

    let results: Vec<Option<PageStatistics>> = pool.install(|| {
        files
            .par_iter()
            .map(|file| {
                let count = processed.fetch_add(1, Ordering::Relaxed) + 1;
                tracing::debug!(
                    event = events::RUN_FILE,
                    count = count,
                    doc_id = %file.doc_id,
                    path = %file.path.display()
                );

                match analyze_file(analyzer, format, &file.path) {
                    Ok(stats) => Some(stats),
                    Err(e) => {
                        tracing::error!(
                            event = events::PAGE_FAILED,
                            path = %file.path.display(),
                            error = %e
                        );
                        failures.lock().push(PageFailure {
                            path: file.path.clone(),
                            reason: e.to_string(),
                        });
                        None
                    }
                }
            })
            .collect()
    });

    let mut documents: BTreeMap<String, Document> = BTreeMap::new();
    for (file, stats) in files.iter().zip(results) {
        if let Some(stats) = stats {
            documents
                .entry(file.doc_id.clone())
                .or_insert_with(|| Document::new(file.doc_id.as_str()))
                .add_page(stats);
        }
    }

    let mut failures = failures.into_inner();
    failures.sort_by(|a, b| a.path.cmp(&b.path));

    Ok(Collected {
        documents,
        failures,
    })
}

pub fn run(config: &AnalysisConfig, analyzer: &Analyzer) -> Result<RunSummary> {
    let started = Instant::now();

    let input_dir = config.input_dir.as_deref().ok_or(RunError::MissingInputDir)?;
    if !input_dir.is_dir() {
        return Err(RunError::InputDirNotFound {
            path: input_dir.display().to_string(),
        }
        .into());
    }
    let pattern = config.file_filter.as_deref().ok_or(RunError::MissingFilter)?;
    let filter =
        Regex::new(pattern).with_context(|| format!("文件过滤正则无效: {}", pattern))?;

    let files = collect_page_files(input_dir, &filter)?;
    let workers = config.effective_workers();
    tracing::info!(
        event = events::RUN_START,
        input_dir = %input_dir.display(),
        format = %config.format,
        files = files.len(),
        workers = workers
    );

    let collected = analyze_files(analyzer, config.format, &files, workers)?;

    let columns = analyzer.column_names(config.format.extra_columns());
    let rows = export::write_combined_file(&config.output, &columns, collected.documents.values())?;

    let mut document_files = 0;
    if let Some(dir) = &config.per_document_dir {
        for document in collected.documents.values() {
            if export::write_document_file(dir, document)?.is_some() {
                document_files += 1;
            }
        }
    }

    let summary = RunSummary {
        files: files.len(),
        pages: files.len() - collected.failures.len(),
        failed: collected.failures.len(),
        documents: collected.documents.len(),
        rows,
        document_files,
    };

    tracing::info!(
        event = events::RUN_COMPLETE,
        files = summary.files,
        pages = summary.pages,
        failed = summary.failed,
        documents = summary.documents,
        elapsed_ms = started.elapsed().as_millis() as u64
    );

    Ok(summary)
}
