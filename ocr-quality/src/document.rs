use serde::Serialize;

use crate::stats::{Cell, PageStatistics};

/// 一个逻辑文档及其按页码升序排列的页统计
///
/// 相同页码不去重，按加入顺序排在同页码之后。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    id: String,
    pages: Vec<PageStatistics>,
}

/// 共享表头的导出表
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Document {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            pages: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn add_page(&mut self, page: PageStatistics) {
        let number = page.page_number();
        let at = self
            .pages
            .partition_point(|existing| existing.page_number() <= number);
        self.pages.insert(at, page);
    }

    pub fn pages(&self) -> &[PageStatistics] {
        &self.pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// 以第一页的列集合为表头导出所有页；没有页时返回 `None`
    pub fn to_table(&self) -> Option<Table> {
        let header = self.pages.first()?.column_names();
        let rows = self
            .pages
            .iter()
            .map(|page| {
                let record = page.to_record();
                header
                    .iter()
                    .map(|column| record.get(column).cloned().unwrap_or(Cell::Empty))
                    .collect()
            })
            .collect();

        Some(Table { header, rows })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::aggregate::Analyzer;
    use crate::bins::BinSet;
    use crate::dictionary::{Dictionary, WordListDictionary};
    use crate::rules::ReplacementRules;
    use crate::token::Token;

    fn analyzer() -> Analyzer {
        let dict: Arc<dyn Dictionary> =
            Arc::new(WordListDictionary::from_lines("english", ["cat", "dog"]));
        Analyzer::new(
            BinSet::from_mean_stdev(4.0, 1.0),
            ReplacementRules::new(),
            vec![dict],
        )
    }

    fn page(analyzer: &Analyzer, number: u32, words: &[&str]) -> PageStatistics {
        analyzer.analyze_tokens(number, words.iter().map(|w| Token::word(*w)))
    }

    #[test]
    fn test_pages_are_ordered_by_number() {
        let analyzer = analyzer();
        let mut doc = Document::new("book-1");
        doc.add_page(page(&analyzer, 12, &["cat"]));
        doc.add_page(page(&analyzer, 3, &["dog"]));
        doc.add_page(page(&analyzer, 7, &[]));

        let numbers: Vec<u32> = doc.pages().iter().map(|p| p.page_number()).collect();
        assert_eq!(numbers, vec![3, 7, 12]);
        assert_eq!(doc.id(), "book-1");
    }

    #[test]
    fn test_duplicate_page_numbers_are_kept() {
        let analyzer = analyzer();
        let mut doc = Document::new("d");
        doc.add_page(page(&analyzer, 2, &["cat"]));
        doc.add_page(page(&analyzer, 1, &[]));
        doc.add_page(page(&analyzer, 2, &["dog", "dog"]));

        assert_eq!(doc.len(), 3);
        let tokens: Vec<u64> = doc.pages().iter().map(|p| p.counts().tokens).collect();
        assert_eq!(tokens, vec![0, 1, 2]);
    }

    #[test]
    fn test_table_shares_first_page_header() {
        let analyzer = analyzer();
        let mut doc = Document::new("d");
        let mut first = page(&analyzer, 1, &["cat", "xyz"]);
        first.set_extra("lines", 4u32);
        doc.add_page(first);
        doc.add_page(page(&analyzer, 2, &[]));

        let table = doc.to_table().unwrap();
        assert_eq!(table.header[0], "page");
        assert_eq!(table.header[1], "lines");
        assert_eq!(table.rows.len(), 2);
        assert!(table.rows.iter().all(|row| row.len() == table.header.len()));
        assert_eq!(table.rows[0][1], Cell::Int(4));
        // 第二页没有附加列
        assert_eq!(table.rows[1][1], Cell::Empty);
        assert_eq!(table.header.last().map(String::as_str), Some("english"));
    }

    #[test]
    fn test_empty_document_has_no_table() {
        assert!(Document::new("empty").to_table().is_none());
    }
}
