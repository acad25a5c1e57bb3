use std::collections::HashSet;

use crate::summary::LengthSummary;

/// 拼写词典能力：名称 + 判定单词是否正确
pub trait Dictionary: Send + Sync {
    fn name(&self) -> &str;

    fn is_correct(&self, word: &str) -> bool;
}

/// 基于词表的词典，条目按小写存储
#[derive(Debug, Clone, Default)]
pub struct WordListDictionary {
    name: String,
    words: HashSet<String>,
    lengths: LengthSummary,
}

impl WordListDictionary {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            words: HashSet::new(),
            lengths: LengthSummary::new(),
        }
    }

    /// 从逐行词表构建；每一行（包括空行）都计入词长统计
    pub fn from_lines<I, S>(name: impl Into<String>, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut dict = Self::new(name);
        for line in lines {
            dict.insert(line.as_ref());
        }
        dict
    }

    pub fn insert(&mut self, line: &str) {
        self.lengths.add(line.chars().count() as f64);

        let word = line.trim();
        if !word.is_empty() {
            self.words.insert(word.to_lowercase());
        }
    }

    /// 词长统计摘要，用于计算自适应分箱
    pub fn length_summary(&self) -> &LengthSummary {
        &self.lengths
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Dictionary for WordListDictionary {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_correct(&self, word: &str) -> bool {
        self.words.contains(word) || self.words.contains(&word.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let dict = WordListDictionary::from_lines("en", ["Apple", "banana", "don't"]);
        assert_eq!(dict.name(), "en");
        assert!(dict.is_correct("apple"));
        assert!(dict.is_correct("BANANA"));
        assert!(dict.is_correct("don't"));
        assert!(!dict.is_correct("cherry"));
        assert_eq!(dict.len(), 3);
    }

    #[test]
    fn test_length_summary_counts_every_line() {
        let dict = WordListDictionary::from_lines("en", ["abc", "", "abcde"]);
        let summary = dict.length_summary();
        assert_eq!(summary.count(), 3);
        assert!((summary.mean() - 8.0 / 3.0).abs() < 1e-9);
        // 空行不进入词表
        assert_eq!(dict.len(), 2);
    }
}
