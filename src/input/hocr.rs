//! hOCR 页面解析
//!
//! 用 html5ever 构建 DOM 后立即转换为自有结构，解析结果不持有 `Rc` 节点，
//! 可以在线程间移动。

use std::collections::BTreeMap;

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use ocr_quality::{OcrPage, PageStatistics, Token};

pub const EXTRA_COLUMNS: &[&str] = &["paragraphs", "lines"];

const PAGE_CLASS: &str = "ocr_page";
const PARAGRAPH_CLASS: &str = "ocr_par";
const LINE_CLASS: &str = "ocr_line";
const WORD_CLASS: &str = "ocrx_word";

/// 单个 `ocrx_word` 元素
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HocrWord {
    pub id: Option<String>,
    pub text: String,
    /// `title` 中以 `;` 分隔的属性，如 `bbox` -> `10 20 30 40`
    pub properties: BTreeMap<String, String>,
}

impl HocrWord {
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HocrPage {
    page_number: Option<u32>,
    page_id: Option<String>,
    ocr_system: Option<String>,
    ocr_capabilities: Vec<String>,
    lines: Vec<Vec<HocrWord>>,
    lines_per_paragraph: Vec<usize>,
    tokens_per_line: Vec<usize>,
}

impl HocrPage {
    /// 解析 hOCR 文本；找不到 `ocr_page` 元素时返回错误说明
    pub fn parse(text: &str, page_number: Option<u32>) -> Result<Self, String> {
        let dom = parse_document(RcDom::default(), Default::default()).one(text);

        let page = find_first(&dom.document, &|node| has_class(node, PAGE_CLASS))
            .ok_or_else(|| format!("no element with class '{}'", PAGE_CLASS))?;

        let mut metas = Vec::new();
        collect(&dom.document, &|node| element_name(node).as_deref() == Some("meta"), &mut metas);
        let meta_content = |name: &str| {
            metas
                .iter()
                .find(|meta| attribute(meta, "name").as_deref() == Some(name))
                .and_then(|meta| attribute(meta, "content"))
        };
        let ocr_system = meta_content("ocr-system");
        let ocr_capabilities = meta_content("ocr-capabilities")
            .map(|content| {
                content
                    .split(' ')
                    .filter(|c| !c.is_empty())
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        let lines: Vec<Vec<HocrWord>> = descendants_with_class(&page, LINE_CLASS)
            .iter()
            .map(|line| {
                descendants_with_class(line, WORD_CLASS)
                    .iter()
                    .map(word_from_node)
                    .collect()
            })
            .collect();

        let mut lines_per_paragraph = Vec::new();
        let mut tokens_per_line = Vec::new();
        for paragraph in descendants_with_class(&page, PARAGRAPH_CLASS) {
            let paragraph_lines = descendants_with_class(&paragraph, LINE_CLASS);
            lines_per_paragraph.push(paragraph_lines.len());
            for line in &paragraph_lines {
                tokens_per_line.push(descendants_with_class(line, WORD_CLASS).len());
            }
        }

        Ok(Self {
            page_number,
            page_id: attribute(&page, "id"),
            ocr_system,
            ocr_capabilities,
            lines,
            lines_per_paragraph,
            tokens_per_line,
        })
    }

    pub fn page_id(&self) -> Option<&str> {
        self.page_id.as_deref()
    }

    pub fn ocr_system(&self) -> Option<&str> {
        self.ocr_system.as_deref()
    }

    pub fn ocr_capabilities(&self) -> &[String] {
        &self.ocr_capabilities
    }

    pub fn words(&self) -> impl Iterator<Item = &HocrWord> {
        self.lines.iter().flatten()
    }

    pub fn paragraph_count(&self) -> usize {
        self.lines_per_paragraph.len()
    }

    /// 段落内的行数之和
    pub fn line_count(&self) -> usize {
        self.lines_per_paragraph.iter().sum()
    }

    pub fn lines_per_paragraph(&self) -> &[usize] {
        &self.lines_per_paragraph
    }

    pub fn tokens_per_line(&self) -> &[usize] {
        &self.tokens_per_line
    }

    pub fn apply_extras(&self, stats: &mut PageStatistics) {
        stats.set_extra(EXTRA_COLUMNS[0], self.paragraph_count() as u64);
        stats.set_extra(EXTRA_COLUMNS[1], self.line_count() as u64);
    }
}

impl OcrPage for HocrPage {
    fn page_number(&self) -> Option<u32> {
        self.page_number
    }

    fn tokens(&self) -> Box<dyn Iterator<Item = Token> + '_> {
        Box::new(self.lines.iter().flat_map(|line| {
            let last = line.len().saturating_sub(1);
            line.iter()
                .enumerate()
                .map(move |(index, word)| Token::new(word.text.as_str(), index == last))
        }))
    }
}

fn word_from_node(node: &Handle) -> HocrWord {
    let mut text = String::new();
    text_content(node, &mut text);
    HocrWord {
        id: attribute(node, "id"),
        text,
        properties: attribute(node, "title")
            .map(|title| parse_title(&title))
            .unwrap_or_default(),
    }
}

/// `bbox 10 20 30 40; x_wconf 93` -> {bbox: "10 20 30 40", x_wconf: "93"}
fn parse_title(title: &str) -> BTreeMap<String, String> {
    title
        .split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once(char::is_whitespace) {
            Some((key, value)) => (key.to_string(), value.trim().to_string()),
            None => (entry.to_string(), String::new()),
        })
        .collect()
}

fn element_name(node: &Handle) -> Option<String> {
    match node.data {
        NodeData::Element { ref name, .. } => Some(name.local.to_string()),
        _ => None,
    }
}

fn attribute(node: &Handle, key: &str) -> Option<String> {
    match node.data {
        NodeData::Element { ref attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|attr| &*attr.name.local == key)
            .map(|attr| attr.value.to_string()),
        _ => None,
    }
}

// class 属性需完全相等
fn has_class(node: &Handle, class: &str) -> bool {
    attribute(node, "class").as_deref() == Some(class)
}

fn find_first(node: &Handle, predicate: &dyn Fn(&Handle) -> bool) -> Option<Handle> {
    for child in node.children.borrow().iter() {
        if predicate(child) {
            return Some(child.clone());
        }
        if let Some(found) = find_first(child, predicate) {
            return Some(found);
        }
    }
    None
}

/// 按文档顺序收集后代节点（不含自身）
fn collect(node: &Handle, predicate: &dyn Fn(&Handle) -> bool, out: &mut Vec<Handle>) {
    for child in node.children.borrow().iter() {
        if predicate(child) {
            out.push(child.clone());
        }
        collect(child, predicate, out);
    }
}

fn descendants_with_class(node: &Handle, class: &str) -> Vec<Handle> {
    let mut out = Vec::new();
    collect(node, &|child| has_class(child, class), &mut out);
    out
}

fn text_content(node: &Handle, out: &mut String) {
    for child in node.children.borrow().iter() {
        match child.data {
            NodeData::Text { ref contents } => out.push_str(&contents.borrow()),
            _ => text_content(child, out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Transitional//EN" "http://www.w3.org/TR/xhtml1/DTD/xhtml1-transitional.dtd">
<html xmlns="http://www.w3.org/1999/xhtml" xml:lang="en" lang="en">
 <head>
  <title></title>
  <meta http-equiv="Content-Type" content="text/html;charset=utf-8" />
  <meta name="ocr-system" content="tesseract 3.02" />
  <meta name="ocr-capabilities" content="ocr_page ocr_carea ocr_par ocr_line ocrx_word" />
 </head>
 <body>
  <div class="ocr_page" id="page_1" title="image &quot;0001.tif&quot;; bbox 0 0 2000 3000; ppageno 0">
   <div class="ocr_carea" id="block_1_1">
    <p class="ocr_par" dir="ltr" id="par_1_1">
     <span class="ocr_line" id="line_1_1" title="bbox 10 10 900 60">
      <span class="ocrx_word" id="word_1_1" title="bbox 10 10 120 60; x_wconf 91">The</span>
      <span class="ocrx_word" id="word_1_2" title="bbox 130 10 300 60; x_wconf 88"><strong>quick</strong></span>
      <span class="ocrx_word" id="word_1_3" title="bbox 310 10 500 60; x_wconf 70">bro-</span>
     </span>
     <span class="ocr_line" id="line_1_2" title="bbox 10 70 900 120">
      <span class="ocrx_word" id="word_1_4" title="bbox 10 70 200 120; x_wconf 85">wn</span>
      <span class="ocrx_word" id="word_1_5" title="bbox 210 70 400 120; x_wconf 90">fox</span>
     </span>
    </p>
    <p class="ocr_par" dir="ltr" id="par_1_2">
     <span class="ocr_line" id="line_1_3" title="bbox 10 130 900 180">
      <span class="ocrx_word" id="word_1_6" title="bbox 10 130 200 180; x_wconf 95">jumps</span>
     </span>
    </p>
   </div>
  </div>
 </body>
</html>
"#;

    #[test]
    fn test_parse_metadata() {
        let page = HocrPage::parse(SAMPLE, Some(1)).unwrap();
        assert_eq!(page.page_id(), Some("page_1"));
        assert_eq!(page.ocr_system(), Some("tesseract 3.02"));
        assert_eq!(page.ocr_capabilities().len(), 5);
        assert_eq!(page.ocr_capabilities()[0], "ocr_page");
    }

    #[test]
    fn test_tokens_mark_line_ends() {
        let page = HocrPage::parse(SAMPLE, Some(1)).unwrap();
        let tokens: Vec<Token> = page.tokens().collect();
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["The", "quick", "bro-", "wn", "fox", "jumps"]);

        let line_ends: Vec<bool> = tokens.iter().map(|t| t.last_on_line).collect();
        assert_eq!(line_ends, vec![false, false, true, false, true, true]);
    }

    #[test]
    fn test_structure_counts() {
        let page = HocrPage::parse(SAMPLE, Some(1)).unwrap();
        assert_eq!(page.paragraph_count(), 2);
        assert_eq!(page.line_count(), 3);
        assert_eq!(page.lines_per_paragraph(), &[2, 1]);
        assert_eq!(page.tokens_per_line(), &[3, 2, 1]);
    }

    #[test]
    fn test_word_properties() {
        let page = HocrPage::parse(SAMPLE, Some(1)).unwrap();
        let first = page.words().next().unwrap();
        assert_eq!(first.id.as_deref(), Some("word_1_1"));
        assert_eq!(first.property("bbox"), Some("10 10 120 60"));
        assert_eq!(first.property("x_wconf"), Some("91"));
        assert_eq!(first.property("missing"), None);
    }

    #[test]
    fn test_missing_page_element_is_an_error() {
        let err = HocrPage::parse("<html><body><p>plain</p></body></html>", Some(1)).unwrap_err();
        assert!(err.contains("ocr_page"));
    }

    #[test]
    fn test_page_without_words() {
        let page = HocrPage::parse(r#"<div class="ocr_page" id="p"></div>"#, Some(4)).unwrap();
        assert_eq!(page.tokens().count(), 0);
        assert_eq!(page.paragraph_count(), 0);
        assert_eq!(page.line_count(), 0);
        assert_eq!(page.ocr_system(), None);
        assert!(page.ocr_capabilities().is_empty());
    }

    #[test]
    fn test_parse_title_entries() {
        let props = parse_title(" bbox 1 2 3 4 ;x_wconf 77; ;baseline");
        assert_eq!(props.get("bbox").map(String::as_str), Some("1 2 3 4"));
        assert_eq!(props.get("x_wconf").map(String::as_str), Some("77"));
        assert_eq!(props.get("baseline").map(String::as_str), Some(""));
        assert_eq!(props.len(), 3);
    }
}
