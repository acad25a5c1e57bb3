use ocr_quality::{OcrPage, Token};

use super::tokenizer;

/// 纯文本页面：整页分词，没有行尾信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxtPage {
    page_number: Option<u32>,
    tokens: Vec<String>,
}

impl TxtPage {
    pub fn parse(text: &str, page_number: Option<u32>) -> Self {
        let tokens = tokenizer::tokenize(text)
            .into_iter()
            .map(str::to_string)
            .collect();
        Self {
            page_number,
            tokens,
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl OcrPage for TxtPage {
    fn page_number(&self) -> Option<u32> {
        self.page_number
    }

    fn tokens(&self) -> Box<dyn Iterator<Item = Token> + '_> {
        Box::new(self.tokens.iter().map(|text| Token::word(text.as_str())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_never_end_a_line() {
        let page = TxtPage::parse("first line\nsecond-\nline", Some(1));
        assert_eq!(page.len(), 5);
        assert!(page.tokens().all(|t| !t.last_on_line));
    }

    #[test]
    fn test_empty_text() {
        let page = TxtPage::parse("\n\n", None);
        assert!(page.is_empty());
        assert_eq!(page.page_number(), None);
    }
}
