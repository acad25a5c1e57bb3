//! 单个 token 的分类规则
//!
//! 分类是纯函数：输入 token 文本、分箱、替换规则和词典，输出结构化的分类结果，
//! 计数累加由 [`crate::aggregate`] 完成。

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::bins::BinSet;
use crate::dictionary::Dictionary;
use crate::rules::ReplacementRules;

pub const TRACKED_CHAR_COUNT: usize = 58;

/// 字符频次统计覆盖的字符表（26 个字母 + 32 个 ASCII 标点）
pub const TRACKED_CHARS: [char; TRACKED_CHAR_COUNT] = [
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's',
    't', 'u', 'v', 'w', 'x', 'y', 'z', '`', '~', '!', '@', '#', '$', '%', '^', '&', '*', '(', ')',
    '-', '_', '=', '+', '[', ']', '{', '}', '\\', '|', ';', ':', '\'', '"', ',', '<', '.', '>',
    '/', '?',
];

pub const MAX_LEADING_PUNCT_TO_REMOVE: usize = 1;
pub const MAX_TRAILING_PUNCT_TO_REMOVE: usize = 3;
pub const CLEAN_TOKEN_LEN_THRESHOLD: usize = 3;

static NON_ALPHA: Lazy<Regex> = Lazy::new(|| Regex::new(r"\P{L}").expect("non-alpha regex"));
static ANY_ALPHA: Lazy<Regex> = Lazy::new(|| Regex::new(r"\p{L}").expect("alpha regex"));
static SINGLE_PUNCT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[[:punct:]]$").expect("punct regex"));
static NUMBER_OBJECT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\p{Sc}?[.,/\-]?(?:\p{N}+[.,/%\-]?)+\p{Sc}?$").expect("number object regex")
});
static SINGLE_ALPHA: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\p{L}$").expect("one alpha regex"));

/// 按非字母字符数量划分的形态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NonAlphaProfile {
    AllAlpha,
    OneNonAlpha,
    TwoNonAlpha,
    ThreeOrMoreNonAlpha,
    AllNonAlpha,
}

impl NonAlphaProfile {
    /// 依据非字母数与总长度判定形态，各分支互斥
    pub fn from_counts(non_alpha: usize, length: usize) -> Self {
        match non_alpha {
            0 => NonAlphaProfile::AllAlpha,
            1 if length > 1 => NonAlphaProfile::OneNonAlpha,
            2 if length > 2 => NonAlphaProfile::TwoNonAlpha,
            n if n > 2 && length > n => NonAlphaProfile::ThreeOrMoreNonAlpha,
            _ => NonAlphaProfile::AllNonAlpha,
        }
    }

    pub fn of(text: &str) -> Self {
        Self::from_counts(non_alpha_count(text), text.chars().count())
    }

    /// 可纠正形态：清洗后至多 2 个非字母字符且至少含 1 个字母
    pub fn is_correctable(&self) -> bool {
        matches!(
            self,
            NonAlphaProfile::AllAlpha | NonAlphaProfile::OneNonAlpha | NonAlphaProfile::TwoNonAlpha
        )
    }
}

/// 短路分类：命中后不再拼写检查
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortCircuit {
    Punctuation,
    NumberObject,
    SingleLetter,
}

/// 未被短路的 token 的进一步分析结果
#[derive(Debug, Clone, PartialEq)]
pub struct WordAnalysis {
    pub repeated_3: bool,
    pub repeated_4: bool,
    /// 清洗后 token 的形态；无清洗形式或含 4 连重复字符时为 `None`
    pub clean_profile: Option<NonAlphaProfile>,
    /// 可纠正形态下清洗后长度所在分箱
    pub correctable_bin: Option<usize>,
    pub clean_short_word: bool,
    pub digit_groups: usize,
    pub lt_half_digits: bool,
    pub replacement_applicable: bool,
    /// 实际用于查词典的形式（清洗形式，清洗失败时退回归一化形式）
    pub checked_form: String,
    /// 与词典顺序对应的命中标记
    pub dictionary_hits: Vec<bool>,
}

impl WordAnalysis {
    pub fn is_correct(&self) -> bool {
        self.dictionary_hits.iter().any(|hit| *hit)
    }

    pub fn is_correctable(&self) -> bool {
        self.clean_profile
            .map(|profile| profile.is_correctable())
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Ignored(ShortCircuit),
    Word(WordAnalysis),
}

/// 单个 token 的完整分类
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub text: String,
    pub normalized: String,
    pub cleaned: Option<String>,
    pub length: usize,
    pub raw_profile: NonAlphaProfile,
    /// 长度 > 1、全部为非字母且不像数字的 token
    pub garbage: bool,
    pub length_bin: Option<usize>,
    pub outcome: Outcome,
}

impl Classification {
    pub fn short_circuit(&self) -> Option<ShortCircuit> {
        match &self.outcome {
            Outcome::Ignored(kind) => Some(*kind),
            Outcome::Word(_) => None,
        }
    }

    pub fn word(&self) -> Option<&WordAnalysis> {
        match &self.outcome {
            Outcome::Word(word) => Some(word),
            Outcome::Ignored(_) => None,
        }
    }
}

/// token 分类器，持有本次运行只读的分箱、规则与词典
#[derive(Clone, Copy)]
pub struct TokenClassifier<'a> {
    bins: &'a BinSet,
    rules: &'a ReplacementRules,
    dictionaries: &'a [Arc<dyn Dictionary>],
}

impl<'a> TokenClassifier<'a> {
    pub fn new(
        bins: &'a BinSet,
        rules: &'a ReplacementRules,
        dictionaries: &'a [Arc<dyn Dictionary>],
    ) -> Self {
        Self {
            bins,
            rules,
            dictionaries,
        }
    }

    pub fn bins(&self) -> &'a BinSet {
        self.bins
    }

    pub fn dictionaries(&self) -> &'a [Arc<dyn Dictionary>] {
        self.dictionaries
    }

    /// 对单个（已完成连字符拼接的）token 分类；trim 后为空返回 `None`
    pub fn classify(&self, raw: &str) -> Option<Classification> {
        let text = raw.trim();
        if text.is_empty() {
            return None;
        }

        let normalized = text.to_lowercase();
        let cleaned = clean_token(&normalized);
        let length = text.chars().count();

        let raw_profile = NonAlphaProfile::of(text);
        let is_number = NUMBER_OBJECT.is_match(text);
        let garbage = raw_profile == NonAlphaProfile::AllNonAlpha && length > 1 && !is_number;
        let length_bin = self.bins.locate(length);

        let outcome = if SINGLE_PUNCT.is_match(text) {
            Outcome::Ignored(ShortCircuit::Punctuation)
        } else if is_number {
            Outcome::Ignored(ShortCircuit::NumberObject)
        } else if SINGLE_ALPHA.is_match(text) {
            Outcome::Ignored(ShortCircuit::SingleLetter)
        } else {
            Outcome::Word(self.analyze_word(text, &normalized, cleaned.as_deref()))
        };

        Some(Classification {
            text: text.to_string(),
            normalized,
            cleaned,
            length,
            raw_profile,
            garbage,
            length_bin,
            outcome,
        })
    }

    fn analyze_word(&self, text: &str, normalized: &str, cleaned: Option<&str>) -> WordAnalysis {
        let longest_run = longest_repeat_run(normalized);
        let repeated_3 = longest_run >= 3;
        let repeated_4 = longest_run >= 4;

        let clean_profile = match cleaned {
            Some(clean) if !repeated_4 => Some(NonAlphaProfile::of(clean)),
            _ => None,
        };
        let correctable_bin = match (clean_profile, cleaned) {
            (Some(profile), Some(clean)) if profile.is_correctable() => {
                self.bins.locate(clean.chars().count())
            }
            _ => None,
        };

        let (digit_groups, lt_half_digits) = if ANY_ALPHA.is_match(normalized) {
            let digits = normalized.chars().filter(|c| c.is_numeric()).count();
            let half = normalized.chars().count() / 2;
            (count_digit_groups(normalized), digits > 0 && digits < half)
        } else {
            (0, false)
        };

        let replacement_applicable = self.rules.contains_target(text)
            || cleaned.map_or(false, |clean| self.rules.contains_target(clean));

        let checked_form = cleaned.unwrap_or(normalized).to_string();
        let dictionary_hits = self
            .dictionaries
            .iter()
            .map(|dictionary| dictionary.is_correct(&checked_form))
            .collect();

        WordAnalysis {
            repeated_3,
            repeated_4,
            clean_profile,
            correctable_bin,
            clean_short_word: cleaned.is_none(),
            digit_groups,
            lt_half_digits,
            replacement_applicable,
            checked_form,
            dictionary_hits,
        }
    }
}

/// 以给定分箱、规则与词典对单个 token 分类
pub fn classify(
    raw: &str,
    bins: &BinSet,
    rules: &ReplacementRules,
    dictionaries: &[Arc<dyn Dictionary>],
) -> Option<Classification> {
    TokenClassifier::new(bins, rules, dictionaries).classify(raw)
}

/// 非字母字符数量（Unicode 字母判定）
pub fn non_alpha_count(text: &str) -> usize {
    NON_ALPHA.find_iter(text).count()
}

/// 去掉至多 1 个前导、3 个尾随 ASCII 标点；剩余长度不足 3 时返回 `None`
pub fn clean_token(normalized: &str) -> Option<String> {
    let leading: usize = normalized
        .chars()
        .take(MAX_LEADING_PUNCT_TO_REMOVE)
        .take_while(char::is_ascii_punctuation)
        .map(char::len_utf8)
        .sum();
    let rest = &normalized[leading..];

    let trailing: usize = rest
        .chars()
        .rev()
        .take(MAX_TRAILING_PUNCT_TO_REMOVE)
        .take_while(char::is_ascii_punctuation)
        .map(char::len_utf8)
        .sum();
    let clean = &rest[..rest.len() - trailing];

    if clean.chars().count() < CLEAN_TOKEN_LEN_THRESHOLD {
        None
    } else {
        Some(clean.to_string())
    }
}

/// 相同非数字字符连续出现的最长长度
pub fn longest_repeat_run(text: &str) -> usize {
    let mut longest = 0;
    let mut run = 0;
    let mut previous: Option<char> = None;

    for c in text.chars() {
        if c.is_numeric() {
            run = 0;
            previous = None;
            continue;
        }
        if previous == Some(c) {
            run += 1;
        } else {
            run = 1;
            previous = Some(c);
        }
        longest = longest.max(run);
    }

    longest
}

/// 连续数字段的个数
pub fn count_digit_groups(text: &str) -> usize {
    let mut groups = 0;
    let mut in_group = false;
    for c in text.chars() {
        let digit = c.is_numeric();
        if digit && !in_group {
            groups += 1;
        }
        in_group = digit;
    }
    groups
}
