use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::bins::Bin;

/// 修正分箱与修正字符列的前缀
pub const CORRECTABLE_PREFIX: &str = "C_";

/// 固定的标量列（位于 `page` 与后期附加列之后）
pub const SCALAR_COLUMNS: [&str; 34] = [
    "quality",
    "score",
    "tokens",
    "ignored",
    "numberObjects",
    "punct",
    "singleLetter",
    "correct",
    "correctP",
    "misspelled",
    "misspelledP",
    "cleanOneNonAlphaNoRep",
    "cleanTwoNonAlphaNoRep",
    "cleanAllAlphaNoRep",
    "lenGt1NonAlpha",
    "cleanThreeOrMoreNonAlpha",
    "cleanShortWord",
    "ge3RepChars",
    "ge4RepChars",
    "unique",
    "uniqueCorrect",
    "uniqueCorrectP",
    "uniqueMisspelled",
    "uniqueMisspelledP",
    "oneNonAlpha",
    "twoNonAlpha",
    "threeOrMoreNonAlpha",
    "allNonAlpha",
    "allAlpha",
    "1nAlpha",
    "2nAlpha",
    "3nAlpha",
    "ltHalfNAlpha",
    "applicableReplacements",
];

/// 导出单元格
///
/// 非有限浮点数按 `NaN` / `Infinity` / `-Infinity` 输出，不会输出为空。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Int(i64),
    Float(f64),
    Text(String),
    Empty,
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Int(value) => write!(f, "{value}"),
            Cell::Float(value) if value.is_nan() => f.write_str("NaN"),
            Cell::Float(value) if value.is_infinite() => {
                f.write_str(if *value > 0.0 { "Infinity" } else { "-Infinity" })
            }
            Cell::Float(value) => write!(f, "{value:?}"),
            Cell::Text(text) => f.write_str(text),
            Cell::Empty => Ok(()),
        }
    }
}

impl From<u64> for Cell {
    fn from(value: u64) -> Self {
        Cell::Int(value as i64)
    }
}

impl From<u32> for Cell {
    fn from(value: u32) -> Self {
        Cell::Int(i64::from(value))
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Float(value)
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

/// 按列顺序排列的一行导出数据
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Record {
    columns: Vec<(String, Cell)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, cell: impl Into<Cell>) {
        self.columns.push((name.into(), cell.into()));
    }

    pub fn get(&self, name: &str) -> Option<&Cell> {
        self.columns
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, cell)| cell)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Cell)> {
        self.columns.iter().map(|(name, cell)| (name.as_str(), cell))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// 单页标量计数
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageCounts {
    pub tokens: u64,
    pub number_objects: u64,
    pub punct: u64,
    pub single_letter: u64,
    pub correct: u64,
    pub incorrect: u64,
    pub clean_one_non_alpha: u64,
    pub clean_two_non_alpha: u64,
    pub clean_all_alpha: u64,
    /// 长度 > 1 且全为非字母、不像数字（`lenGt1NonAlpha`）
    pub garbage: u64,
    pub clean_three_or_more_non_alpha: u64,
    pub clean_short_word: u64,
    pub repeated_3: u64,
    pub repeated_4: u64,
    pub unique: u64,
    pub unique_correct: u64,
    pub unique_incorrect: u64,
    pub one_non_alpha: u64,
    pub two_non_alpha: u64,
    pub three_or_more_non_alpha: u64,
    pub all_non_alpha: u64,
    pub all_alpha: u64,
    pub one_digit_group: u64,
    pub two_digit_groups: u64,
    pub three_digit_groups: u64,
    pub lt_half_digits: u64,
    pub applicable_replacements: u64,
}

/// 单页统计结果
///
/// 由 [`crate::aggregate::PageStatsAggregator`] 一次性构建，之后只允许追加
/// 格式相关的附加列（如 hOCR 的段落数、行数）。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageStatistics {
    pub(crate) page_number: u32,
    pub(crate) counts: PageCounts,
    pub(crate) raw_bins: Vec<(Bin, u64)>,
    pub(crate) correctable_bins: Vec<(Bin, u64)>,
    pub(crate) raw_chars: Vec<(char, u64)>,
    pub(crate) correctable_chars: Vec<(char, u64)>,
    pub(crate) length_histogram: BTreeMap<usize, u64>,
    pub(crate) misspellings: BTreeMap<String, u64>,
    pub(crate) dictionary_hits: Vec<(String, u64)>,
    pub(crate) extras: Vec<(String, Cell)>,
}

impl PageStatistics {
    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    pub fn counts(&self) -> &PageCounts {
        &self.counts
    }

    pub fn raw_bins(&self) -> &[(Bin, u64)] {
        &self.raw_bins
    }

    pub fn correctable_bins(&self) -> &[(Bin, u64)] {
        &self.correctable_bins
    }

    pub fn raw_chars(&self) -> &[(char, u64)] {
        &self.raw_chars
    }

    pub fn correctable_chars(&self) -> &[(char, u64)] {
        &self.correctable_chars
    }

    /// 原始 token 长度直方图
    pub fn length_histogram(&self) -> &BTreeMap<usize, u64> {
        &self.length_histogram
    }

    pub fn misspellings(&self) -> &BTreeMap<String, u64> {
        &self.misspellings
    }

    pub fn dictionary_hits(&self) -> &[(String, u64)] {
        &self.dictionary_hits
    }

    /// 设置后期附加列；同名列覆盖原值并保持位置
    pub fn set_extra(&mut self, name: impl Into<String>, cell: impl Into<Cell>) {
        let name = name.into();
        let cell = cell.into();
        match self.extras.iter_mut().find(|(column, _)| *column == name) {
            Some(slot) => slot.1 = cell,
            None => self.extras.push((name, cell)),
        }
    }

    pub fn extra(&self, name: &str) -> Option<&Cell> {
        self.extras
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, cell)| cell)
    }

    pub fn ignored(&self) -> u64 {
        self.counts.number_objects + self.counts.punct + self.counts.single_letter
    }

    /// 参与拼写检查的 token 数
    fn eligible(&self) -> f64 {
        self.counts.tokens as f64 - self.ignored() as f64
    }

    // 以下比率分母为 0 时得到 NaN，按原样输出
    pub fn percent_correct(&self) -> f64 {
        self.counts.correct as f64 / self.eligible()
    }

    pub fn percent_incorrect(&self) -> f64 {
        self.counts.incorrect as f64 / self.eligible()
    }

    pub fn percent_unique_correct(&self) -> f64 {
        self.counts.unique_correct as f64 / self.counts.unique as f64
    }

    pub fn percent_unique_incorrect(&self) -> f64 {
        self.counts.unique_incorrect as f64 / self.counts.unique as f64
    }

    pub fn quality_score(&self) -> f64 {
        let suspicious = self.counts.garbage + self.counts.clean_three_or_more_non_alpha;
        1.0 - suspicious as f64 / self.eligible()
    }

    /// 符合可纠正形态的 token 占潜在可纠正 token 的比例
    pub fn correctability_score(&self) -> f64 {
        let correctable = self.counts.clean_one_non_alpha
            + self.counts.clean_two_non_alpha
            + self.counts.clean_all_alpha;
        correctable as f64 / (self.eligible() - self.counts.clean_short_word as f64)
    }

    /// 导出行：page、附加列、标量列、原始分箱、原始字符、`C_` 分箱、`C_` 字符、词典命中
    pub fn to_record(&self) -> Record {
        let c = &self.counts;
        let mut record = Record::new();

        record.push("page", self.page_number);
        for (name, cell) in &self.extras {
            record.push(name.clone(), cell.clone());
        }

        let scalars: [Cell; 34] = [
            self.quality_score().into(),
            self.correctability_score().into(),
            c.tokens.into(),
            self.ignored().into(),
            c.number_objects.into(),
            c.punct.into(),
            c.single_letter.into(),
            c.correct.into(),
            self.percent_correct().into(),
            c.incorrect.into(),
            self.percent_incorrect().into(),
            c.clean_one_non_alpha.into(),
            c.clean_two_non_alpha.into(),
            c.clean_all_alpha.into(),
            c.garbage.into(),
            c.clean_three_or_more_non_alpha.into(),
            c.clean_short_word.into(),
            c.repeated_3.into(),
            c.repeated_4.into(),
            c.unique.into(),
            c.unique_correct.into(),
            self.percent_unique_correct().into(),
            c.unique_incorrect.into(),
            self.percent_unique_incorrect().into(),
            c.one_non_alpha.into(),
            c.two_non_alpha.into(),
            c.three_or_more_non_alpha.into(),
            c.all_non_alpha.into(),
            c.all_alpha.into(),
            c.one_digit_group.into(),
            c.two_digit_groups.into(),
            c.three_digit_groups.into(),
            c.lt_half_digits.into(),
            c.applicable_replacements.into(),
        ];
        for (name, cell) in SCALAR_COLUMNS.iter().zip(scalars) {
            record.push(*name, cell);
        }

        for (bin, count) in &self.raw_bins {
            record.push(bin.name(), *count);
        }
        for (ch, count) in &self.raw_chars {
            record.push(ch.to_string(), *count);
        }
        for (bin, count) in &self.correctable_bins {
            record.push(format!("{CORRECTABLE_PREFIX}{}", bin.name()), *count);
        }
        for (ch, count) in &self.correctable_chars {
            record.push(format!("{CORRECTABLE_PREFIX}{ch}"), *count);
        }
        for (name, count) in &self.dictionary_hits {
            record.push(name.clone(), *count);
        }

        record
    }

    /// 本页导出的列名（顺序稳定）
    pub fn column_names(&self) -> Vec<String> {
        self.to_record().names().map(str::to_string).collect()
    }
}
