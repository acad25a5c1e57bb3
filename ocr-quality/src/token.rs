/// 分词器产出的单个 token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub last_on_line: bool,
}

impl Token {
    pub fn new(text: impl Into<String>, last_on_line: bool) -> Self {
        Self {
            text: text.into(),
            last_on_line,
        }
    }

    /// 非行尾 token
    pub fn word(text: impl Into<String>) -> Self {
        Self::new(text, false)
    }
}

/// 各格式页面（纯文本 / hOCR）的共同能力
pub trait OcrPage {
    /// 从文件名等来源恢复的页码，无法恢复时为 `None`
    fn page_number(&self) -> Option<u32>;

    /// 按顺序产出本页 token，可重复调用
    fn tokens(&self) -> Box<dyn Iterator<Item = Token> + '_>;
}

/// 行尾连字符拼接：行尾以 `-` 结尾的 token 与下一个 token 合并
///
/// 产出的是已 trim 的文本，可能为空串（由调用方丢弃）。
pub struct HyphenJoin<I: Iterator<Item = Token>> {
    inner: I,
}

impl<I: Iterator<Item = Token>> HyphenJoin<I> {
    pub fn new(tokens: I) -> Self {
        Self { inner: tokens }
    }
}

impl<I: Iterator<Item = Token>> Iterator for HyphenJoin<I> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.inner.next()?;
        let text = token.text.trim();

        if token.last_on_line && text.ends_with('-') {
            if let Some(next) = self.inner.next() {
                let mut joined = text[..text.len() - 1].to_string();
                joined.push_str(next.text.trim());
                return Some(joined);
            }
        }

        Some(text.to_string())
    }
}

/// 对 token 流应用行尾连字符拼接
pub fn join_hyphenated<I>(tokens: I) -> HyphenJoin<I::IntoIter>
where
    I: IntoIterator<Item = Token>,
{
    HyphenJoin::new(tokens.into_iter())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joins_line_end_hyphen() {
        let tokens = vec![
            Token::word("an"),
            Token::new("inter-", true),
            Token::word("esting"),
            Token::new("story", true),
        ];
        let joined: Vec<String> = join_hyphenated(tokens).collect();
        assert_eq!(joined, vec!["an", "interesting", "story"]);
    }

    #[test]
    fn test_hyphen_not_on_line_end_is_kept() {
        let tokens = vec![Token::word("inter-"), Token::word("esting")];
        let joined: Vec<String> = join_hyphenated(tokens).collect();
        assert_eq!(joined, vec!["inter-", "esting"]);
    }

    #[test]
    fn test_trailing_hyphen_without_follower() {
        let tokens = vec![Token::new(" well- ", true)];
        let joined: Vec<String> = join_hyphenated(tokens).collect();
        assert_eq!(joined, vec!["well-"]);
    }

    #[test]
    fn test_joined_follower_is_trimmed() {
        let tokens = vec![Token::new("-", true), Token::word("  x ")];
        let joined: Vec<String> = join_hyphenated(tokens).collect();
        assert_eq!(joined, vec!["x"]);
    }
}
