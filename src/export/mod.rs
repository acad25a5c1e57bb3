//! 统计结果导出

pub mod csv;

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ocr_quality::{Cell, Document, Table};

use crate::util::logging::events;

pub use self::csv::CsvWriter;

pub const DOC_ID_COLUMN: &str = "docId";

/// 写出合并表：`docId` + 给定列；按传入顺序输出文档，每个文档内页码升序
///
/// 返回写出的数据行数。
pub fn write_combined<'a, W, I>(out: W, columns: &[String], documents: I) -> Result<usize>
where
    W: Write,
    I: IntoIterator<Item = &'a Document>,
{
    let mut writer = CsvWriter::new(out);
    writer.write_record(std::iter::once(DOC_ID_COLUMN).chain(columns.iter().map(String::as_str)))?;

    for document in documents {
        for page in document.pages() {
            let record = page.to_record();
            let row: Vec<String> = std::iter::once(document.id().to_string())
                .chain(columns.iter().map(|column| {
                    record
                        .get(column)
                        .map(Cell::to_string)
                        .unwrap_or_default()
                }))
                .collect();
            writer.write_record(&row)?;
        }
    }

    let rows = writer.rows() - 1;
    writer.into_inner()?.flush()?;
    Ok(rows)
}

pub fn write_combined_file<'a, I>(path: &Path, columns: &[String], documents: I) -> Result<usize>
where
    I: IntoIterator<Item = &'a Document>,
{
    let file = create_file(path)?;
    let rows = write_combined(BufWriter::new(file), columns, documents)
        .with_context(|| format!("写入合并统计失败: {}", path.display()))?;

    tracing::info!(event = events::REPORT_WRITTEN, path = %path.display(), rows = rows);
    Ok(rows)
}

pub fn write_table<W: Write>(out: W, table: &Table) -> Result<()> {
    let mut writer = CsvWriter::new(out);
    writer.write_record(&table.header)?;
    for row in &table.rows {
        writer.write_cells(row)?;
    }
    writer.into_inner()?.flush()?;
    Ok(())
}

pub const WORD_LENGTH_COLUMN: &str = "wordLength";

/// 词长分布表：`wordLength` + 每个词典一列，长度从 1 到所有词典中的最大长度
///
/// 返回写出的数据行数。
pub fn write_word_lengths<W: Write>(
    out: W,
    names: &[String],
    distributions: &[BTreeMap<usize, u64>],
) -> Result<usize> {
    let mut writer = CsvWriter::new(out);
    writer.write_record(
        std::iter::once(WORD_LENGTH_COLUMN).chain(names.iter().map(String::as_str)),
    )?;

    let max = distributions
        .iter()
        .filter_map(|distribution| distribution.keys().next_back().copied())
        .max()
        .unwrap_or(0);

    for length in 1..=max {
        let row: Vec<String> = std::iter::once(length.to_string())
            .chain(distributions.iter().map(|distribution| {
                distribution.get(&length).copied().unwrap_or(0).to_string()
            }))
            .collect();
        writer.write_record(&row)?;
    }

    writer.into_inner()?.flush()?;
    Ok(max)
}

pub fn write_word_lengths_file(
    path: &Path,
    names: &[String],
    distributions: &[BTreeMap<usize, u64>],
) -> Result<usize> {
    let file = create_file(path)?;
    let rows = write_word_lengths(BufWriter::new(file), names, distributions)
        .with_context(|| format!("写入词长分布失败: {}", path.display()))?;
    tracing::info!(event = events::REPORT_WRITTEN, path = %path.display(), rows = rows);
    Ok(rows)
}

/// 单文档 CSV 的文件名；路径分隔符替换为 `_`
pub fn document_file_name(id: &str) -> String {
    let safe: String = id
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    format!("{}.csv", safe)
}

/// 写出 `<dir>/<docId>.csv`；文档没有页时不写文件并返回 `None`
pub fn write_document_file(dir: &Path, document: &Document) -> Result<Option<PathBuf>> {
    let Some(table) = document.to_table() else {
        tracing::warn!(event = events::DOCUMENT_EMPTY, doc_id = %document.id());
        return Ok(None);
    };

    let path = dir.join(document_file_name(document.id()));
    let file = create_file(&path)?;
    write_table(BufWriter::new(file), &table)
        .with_context(|| format!("写入文档统计失败: {}", path.display()))?;

    tracing::info!(
        event = events::DOCUMENT_EXPORTED,
        doc_id = %document.id(),
        pages = document.len(),
        path = %path.display()
    );
    Ok(Some(path))
}

fn create_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("创建输出目录失败: {}", parent.display()))?;
    }
    File::create(path).with_context(|| format!("创建输出文件失败: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use ocr_quality::{Analyzer, BinSet, Dictionary, ReplacementRules, Token, WordListDictionary};
    use tempfile::TempDir;

    fn analyzer() -> Analyzer {
        let dict: Arc<dyn Dictionary> =
            Arc::new(WordListDictionary::from_lines("english", ["cat", "sat"]));
        Analyzer::new(
            BinSet::from_mean_stdev(4.0, 1.5),
            ReplacementRules::new(),
            vec![dict],
        )
    }

    fn document(analyzer: &Analyzer, id: &str, pages: &[(u32, &[&str])]) -> Document {
        let mut doc = Document::new(id);
        for (number, words) in pages {
            doc.add_page(analyzer.analyze_tokens(*number, words.iter().map(|w| Token::word(*w))));
        }
        doc
    }

    #[test]
    fn test_combined_rows_follow_document_and_page_order() {
        let analyzer = analyzer();
        let columns = analyzer.column_names(&[]);
        let docs = vec![
            document(&analyzer, "a", &[(2, &["cat"]), (1, &["sat", "dgo"])]),
            document(&analyzer, "b", &[(5, &[])]),
        ];

        let mut out = Vec::new();
        let rows = write_combined(&mut out, &columns, &docs).unwrap();
        assert_eq!(rows, 3);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.split("\r\n").filter(|l| !l.is_empty()).collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("docId,page,quality,score,tokens,"));
        assert!(lines[0].ends_with(",english"));
        assert!(lines[1].starts_with("a,1,"));
        assert!(lines[2].starts_with("a,2,"));
        assert!(lines[3].starts_with("b,5,NaN,NaN,0,"));

        // 表头含 `,` 与 `"` 字符列，会被加引号；数据行不含逗号
        assert!(lines[0].contains(",\",\","));
        let width = columns.len() + 1;
        assert!(lines[1..].iter().all(|line| line.split(',').count() == width));
    }

    #[test]
    fn test_missing_columns_are_empty() {
        let analyzer = analyzer();
        let columns = analyzer.column_names(&["lines"]);
        let docs = vec![document(&analyzer, "a", &[(1, &["cat"])])];

        let mut out = Vec::new();
        write_combined(&mut out, &columns, &docs).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("\r\na,1,,"));
    }

    #[test]
    fn test_document_file_written_only_with_pages() {
        let dir = TempDir::new().unwrap();
        let analyzer = analyzer();

        let empty = Document::new("empty");
        assert!(write_document_file(dir.path(), &empty).unwrap().is_none());
        assert!(!dir.path().join("empty.csv").exists());

        let doc = document(&analyzer, "vol/1", &[(1, &["cat"])]);
        let path = write_document_file(&dir.path().join("docs"), &doc)
            .unwrap()
            .unwrap();
        assert_eq!(path.file_name().unwrap(), "vol_1.csv");

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("page,quality,"));
        assert_eq!(text.matches("\r\n").count(), 2);
    }

    #[test]
    fn test_combined_file_creates_parent_directory() {
        let dir = TempDir::new().unwrap();
        let analyzer = analyzer();
        let path = dir.path().join("out").join("all.csv");
        let docs = vec![document(&analyzer, "a", &[(1, &["cat"])])];

        let rows = write_combined_file(&path, &analyzer.column_names(&[]), &docs).unwrap();
        assert_eq!(rows, 1);
        assert!(path.exists());
    }

    #[test]
    fn test_word_length_table_covers_every_length() {
        let names = vec!["english".to_string(), "latin".to_string()];
        let distributions = vec![
            BTreeMap::from([(1, 2), (3, 5)]),
            BTreeMap::from([(0, 1), (2, 4)]),
        ];

        let mut out = Vec::new();
        let rows = write_word_lengths(&mut out, &names, &distributions).unwrap();
        assert_eq!(rows, 3);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "wordLength,english,latin\r\n1,2,0\r\n2,0,4\r\n3,5,0\r\n"
        );
    }
}
