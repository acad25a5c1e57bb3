//! 纯文本分词：按字符类别切分
//!
//! 字符分为空白、字母、数字、其他四类；类别变化处断开，
//! 连续的"其他"类字符只有相同字符才会合并（如 `...`、`--`）。

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Whitespace,
    Alphabetic,
    Numeric,
    Other,
}

impl CharClass {
    fn of(c: char) -> Self {
        if c.is_whitespace() {
            CharClass::Whitespace
        } else if c.is_alphabetic() {
            CharClass::Alphabetic
        } else if c.is_numeric() {
            CharClass::Numeric
        } else {
            CharClass::Other
        }
    }
}

/// 切分文本，返回各 token 的字节区间
pub fn tokenize_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start: Option<usize> = None;
    let mut previous: Option<(CharClass, char)> = None;

    for (index, c) in text.char_indices() {
        let class = CharClass::of(c);

        if class == CharClass::Whitespace {
            if let Some(begin) = start.take() {
                spans.push((begin, index));
            }
        } else {
            let boundary = match previous {
                Some((prev_class, prev_char)) => {
                    prev_class != class || (class == CharClass::Other && prev_char != c)
                }
                None => true,
            };
            if boundary {
                if let Some(begin) = start.take() {
                    spans.push((begin, index));
                }
                start = Some(index);
            }
        }

        previous = Some((class, c));
    }

    if let Some(begin) = start {
        spans.push((begin, text.len()));
    }

    spans
}

pub fn tokenize(text: &str) -> Vec<&str> {
    tokenize_spans(text)
        .into_iter()
        .map(|(begin, end)| &text[begin..end])
        .collect()
}
