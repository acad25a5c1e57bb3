//! 页面输入：纯文本与 hOCR 两种格式，以及词典和替换规则文件的加载

pub mod dictionary;
pub mod hocr;
pub mod rules;
pub mod tokenizer;
pub mod txt;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use ocr_quality::{OcrPage, PageStatistics, QualityError, Token};
use serde::{Deserialize, Serialize};

pub use dictionary::{dictionary_name, load_dictionaries, load_dictionary};
pub use hocr::{HocrPage, HocrWord};
pub use rules::load_replacement_rules;
pub use txt::TxtPage;

/// 页面文件格式
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum PageFormat {
    #[default]
    Txt,
    Hocr,
}

impl PageFormat {
    /// 该格式在 `page` 之后追加的页面级附加列
    pub fn extra_columns(&self) -> &'static [&'static str] {
        match self {
            PageFormat::Txt => &[],
            PageFormat::Hocr => hocr::EXTRA_COLUMNS,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PageFormat::Txt => "txt",
            PageFormat::Hocr => "hocr",
        }
    }
}

impl fmt::Display for PageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PageFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "txt" | "text" => Ok(PageFormat::Txt),
            "hocr" => Ok(PageFormat::Hocr),
            other => Err(format!("unsupported page format: {}", other)),
        }
    }
}

/// 文件名开头的十进制数字即页码（`0042.txt` -> 42）
pub fn page_number_from_path(path: &Path) -> Option<u32> {
    let name = path.file_name()?.to_str()?;
    let digits: String = name.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// 已解析的页面，按格式分派
#[derive(Debug, Clone)]
pub enum ParsedPage {
    Txt(TxtPage),
    Hocr(HocrPage),
}

impl ParsedPage {
    /// 读取并解析一个页面文件；无法确定页码也视为解析失败
    pub fn load(format: PageFormat, path: &Path) -> Result<Self, QualityError> {
        let display = path.display().to_string();
        if page_number_from_path(path).is_none() {
            return Err(QualityError::MissingPageNumber { path: display });
        }

        let bytes = std::fs::read(path).map_err(|e| QualityError::page_parse(&display, e))?;
        let text = String::from_utf8(bytes).map_err(|e| QualityError::page_parse(&display, e))?;

        let page = match format {
            PageFormat::Txt => ParsedPage::Txt(TxtPage::parse(&text, page_number_from_path(path))),
            PageFormat::Hocr => {
                let page = HocrPage::parse(&text, page_number_from_path(path))
                    .map_err(|reason| QualityError::page_parse(&display, reason))?;
                ParsedPage::Hocr(page)
            }
        };

        Ok(page)
    }

    /// 写入格式相关的附加列
    pub fn apply_extras(&self, stats: &mut PageStatistics) {
        if let ParsedPage::Hocr(page) = self {
            page.apply_extras(stats);
        }
    }
}

impl OcrPage for ParsedPage {
    fn page_number(&self) -> Option<u32> {
        match self {
            ParsedPage::Txt(page) => page.page_number(),
            ParsedPage::Hocr(page) => page.page_number(),
        }
    }

    fn tokens(&self) -> Box<dyn Iterator<Item = Token> + '_> {
        match self {
            ParsedPage::Txt(page) => page.tokens(),
            ParsedPage::Hocr(page) => page.tokens(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_page_number_from_leading_digits() {
        assert_eq!(page_number_from_path(Path::new("/a/b/0042.txt")), Some(42));
        assert_eq!(page_number_from_path(Path::new("7_scan.html")), Some(7));
        assert_eq!(page_number_from_path(Path::new("/a/12/cover.txt")), None);
        assert_eq!(page_number_from_path(Path::new("")), None);
    }

    #[test]
    fn test_format_parsing_is_case_insensitive() {
        assert_eq!("HOCR".parse::<PageFormat>(), Ok(PageFormat::Hocr));
        assert_eq!(" txt ".parse::<PageFormat>(), Ok(PageFormat::Txt));
        assert!("galexml".parse::<PageFormat>().is_err());
        assert_eq!(PageFormat::Hocr.to_string(), "hocr");
    }

    #[test]
    fn test_extra_columns_per_format() {
        assert!(PageFormat::Txt.extra_columns().is_empty());
        assert_eq!(PageFormat::Hocr.extra_columns(), &["paragraphs", "lines"]);
    }

    #[test]
    fn test_load_rejects_file_without_page_number() {
        let dir = TempDir::new().unwrap();
        let path: PathBuf = dir.path().join("cover.txt");
        std::fs::write(&path, "hello").unwrap();

        let err = ParsedPage::load(PageFormat::Txt, &path).unwrap_err();
        assert!(matches!(err, QualityError::MissingPageNumber { .. }));
    }

    #[test]
    fn test_load_txt_page() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("003.txt");
        std::fs::write(&path, "The cat\nsat.").unwrap();

        let page = ParsedPage::load(PageFormat::Txt, &path).unwrap();
        assert_eq!(page.page_number(), Some(3));
        let texts: Vec<String> = page.tokens().map(|t| t.text).collect();
        assert_eq!(texts, vec!["The", "cat", "sat", "."]);
    }

    #[test]
    fn test_load_rejects_invalid_utf8() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("1.txt");
        std::fs::write(&path, [0xffu8, 0xfe, 0x41]).unwrap();

        let err = ParsedPage::load(PageFormat::Txt, &path).unwrap_err();
        assert!(matches!(err, QualityError::PageParse { .. }));
    }
}
