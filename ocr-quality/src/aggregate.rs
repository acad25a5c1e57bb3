//! 单页统计累加
//!
//! `Analyzer` 持有一次运行内只读共享的分箱、替换规则与词典；
//! 每页处理时创建独占的 `PageStatsAggregator`，页与页之间没有共享可变状态。

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use crate::bins::{Bin, BinSet};
use crate::classify::{
    Classification, NonAlphaProfile, Outcome, ShortCircuit, TokenClassifier, TRACKED_CHARS,
    TRACKED_CHAR_COUNT,
};
use crate::dictionary::Dictionary;
use crate::error::{QualityError, Result};
use crate::rules::ReplacementRules;
use crate::stats::{Cell, PageCounts, PageStatistics};
use crate::token::{join_hyphenated, OcrPage, Token};

/// 一次运行的分析上下文，可跨线程共享
#[derive(Clone)]
pub struct Analyzer {
    bins: BinSet,
    rules: ReplacementRules,
    dictionaries: Vec<Arc<dyn Dictionary>>,
}

impl Analyzer {
    pub fn new(
        bins: BinSet,
        rules: ReplacementRules,
        dictionaries: Vec<Arc<dyn Dictionary>>,
    ) -> Self {
        Self {
            bins,
            rules,
            dictionaries,
        }
    }

    pub fn bins(&self) -> &BinSet {
        &self.bins
    }

    pub fn rules(&self) -> &ReplacementRules {
        &self.rules
    }

    pub fn dictionaries(&self) -> &[Arc<dyn Dictionary>] {
        &self.dictionaries
    }

    pub fn classifier(&self) -> TokenClassifier<'_> {
        TokenClassifier::new(&self.bins, &self.rules, &self.dictionaries)
    }

    /// 统计一页；页码无法恢复时返回解析错误
    pub fn analyze_page<P>(&self, page: &P) -> Result<PageStatistics>
    where
        P: OcrPage + ?Sized,
    {
        let page_number = page
            .page_number()
            .ok_or_else(|| QualityError::page_parse("?", "page number could not be determined"))?;
        Ok(self.analyze_tokens(page_number, page.tokens()))
    }

    /// 统计一段 token 流（先做行尾连字符拼接）
    pub fn analyze_tokens<I>(&self, page_number: u32, tokens: I) -> PageStatistics
    where
        I: IntoIterator<Item = Token>,
    {
        let mut aggregator = PageStatsAggregator::new(self.classifier());
        for text in join_hyphenated(tokens) {
            aggregator.push(&text);
        }
        let stats = aggregator.finish(page_number);
        tracing::debug!(
            event = "page.analyzed",
            page = page_number,
            tokens = stats.counts().tokens,
            correct = stats.counts().correct
        );
        stats
    }

    /// 带给定附加列的完整列名，与任一页的 `column_names` 相同
    pub fn column_names(&self, extras: &[&str]) -> Vec<String> {
        let mut empty = PageStatsAggregator::new(self.classifier()).finish(0);
        for name in extras {
            empty.set_extra(*name, Cell::Empty);
        }
        empty.column_names()
    }
}

/// 单页累加器，由一次页面处理独占
pub struct PageStatsAggregator<'a> {
    classifier: TokenClassifier<'a>,
    counts: PageCounts,
    unique: HashSet<String>,
    unique_correct: HashSet<String>,
    misspellings: BTreeMap<String, u64>,
    length_histogram: BTreeMap<usize, u64>,
    raw_bins: Vec<u64>,
    correctable_bins: Vec<u64>,
    raw_chars: [u64; TRACKED_CHAR_COUNT],
    correctable_chars: [u64; TRACKED_CHAR_COUNT],
    dictionary_hits: Vec<u64>,
    bins: &'a BinSet,
    dictionaries: &'a [Arc<dyn Dictionary>],
}

impl<'a> PageStatsAggregator<'a> {
    pub fn new(classifier: TokenClassifier<'a>) -> Self {
        let bins = classifier.bins();
        let dictionaries = classifier.dictionaries();
        Self {
            classifier,
            counts: PageCounts::default(),
            unique: HashSet::new(),
            unique_correct: HashSet::new(),
            misspellings: BTreeMap::new(),
            length_histogram: BTreeMap::new(),
            raw_bins: vec![0; bins.len()],
            correctable_bins: vec![0; bins.len()],
            raw_chars: [0; TRACKED_CHAR_COUNT],
            correctable_chars: [0; TRACKED_CHAR_COUNT],
            dictionary_hits: vec![0; dictionaries.len()],
            bins,
            dictionaries,
        }
    }

    /// 分类并累加一个（已拼接的）token；空 token 不计入任何计数
    pub fn push(&mut self, text: &str) -> Option<Classification> {
        let classification = self.classifier.classify(text)?;
        self.record(&classification);
        Some(classification)
    }

    fn record(&mut self, c: &Classification) {
        let counts = &mut self.counts;
        counts.tokens += 1;
        self.unique.insert(c.normalized.clone());

        match c.raw_profile {
            NonAlphaProfile::AllAlpha => counts.all_alpha += 1,
            NonAlphaProfile::OneNonAlpha => counts.one_non_alpha += 1,
            NonAlphaProfile::TwoNonAlpha => counts.two_non_alpha += 1,
            NonAlphaProfile::ThreeOrMoreNonAlpha => counts.three_or_more_non_alpha += 1,
            NonAlphaProfile::AllNonAlpha => counts.all_non_alpha += 1,
        }
        if c.garbage {
            counts.garbage += 1;
        }

        tally_chars(&mut self.raw_chars, &c.normalized);
        *self.length_histogram.entry(c.length).or_insert(0) += 1;
        if let Some(index) = c.length_bin {
            self.raw_bins[index] += 1;
        }

        let word = match &c.outcome {
            Outcome::Ignored(ShortCircuit::Punctuation) => {
                counts.punct += 1;
                return;
            }
            Outcome::Ignored(ShortCircuit::NumberObject) => {
                counts.number_objects += 1;
                return;
            }
            Outcome::Ignored(ShortCircuit::SingleLetter) => {
                counts.single_letter += 1;
                return;
            }
            Outcome::Word(word) => word,
        };

        if word.repeated_3 {
            counts.repeated_3 += 1;
        }
        if word.repeated_4 {
            counts.repeated_4 += 1;
        }

        match word.clean_profile {
            Some(NonAlphaProfile::AllAlpha) => counts.clean_all_alpha += 1,
            Some(NonAlphaProfile::OneNonAlpha) => counts.clean_one_non_alpha += 1,
            Some(NonAlphaProfile::TwoNonAlpha) => counts.clean_two_non_alpha += 1,
            Some(NonAlphaProfile::ThreeOrMoreNonAlpha) => {
                counts.clean_three_or_more_non_alpha += 1
            }
            Some(NonAlphaProfile::AllNonAlpha) | None => {}
        }
        if word.is_correctable() {
            if let Some(cleaned) = &c.cleaned {
                tally_chars(&mut self.correctable_chars, cleaned);
            }
            if let Some(index) = word.correctable_bin {
                self.correctable_bins[index] += 1;
            }
        }
        if word.clean_short_word {
            counts.clean_short_word += 1;
        }

        match word.digit_groups {
            1 => counts.one_digit_group += 1,
            2 => counts.two_digit_groups += 1,
            3 => counts.three_digit_groups += 1,
            _ => {}
        }
        if word.lt_half_digits {
            counts.lt_half_digits += 1;
        }

        if word.replacement_applicable {
            counts.applicable_replacements += 1;
        }

        for (slot, hit) in self.dictionary_hits.iter_mut().zip(&word.dictionary_hits) {
            if *hit {
                *slot += 1;
            }
        }
        if word.is_correct() {
            counts.correct += 1;
            self.unique_correct.insert(word.checked_form.clone());
        } else {
            counts.incorrect += 1;
            *self
                .misspellings
                .entry(word.checked_form.clone())
                .or_insert(0) += 1;
        }
    }

    /// 结束本页，生成不可变的统计结果
    pub fn finish(self, page_number: u32) -> PageStatistics {
        let mut counts = self.counts;
        counts.unique = self.unique.len() as u64;
        counts.unique_correct = self.unique_correct.len() as u64;
        counts.unique_incorrect = self.misspellings.len() as u64;

        let bins = self.bins;
        let zip_bins = |tallies: Vec<u64>| -> Vec<(Bin, u64)> {
            bins.iter().copied().zip(tallies).collect()
        };
        let zip_chars = |tallies: [u64; TRACKED_CHAR_COUNT]| -> Vec<(char, u64)> {
            TRACKED_CHARS.iter().copied().zip(tallies).collect()
        };

        PageStatistics {
            page_number,
            counts,
            raw_bins: zip_bins(self.raw_bins),
            correctable_bins: zip_bins(self.correctable_bins),
            raw_chars: zip_chars(self.raw_chars),
            correctable_chars: zip_chars(self.correctable_chars),
            length_histogram: self.length_histogram,
            misspellings: self.misspellings,
            dictionary_hits: self
                .dictionaries
                .iter()
                .map(|dictionary| dictionary.name().to_string())
                .zip(self.dictionary_hits)
                .collect(),
            extras: Vec::new(),
        }
    }
}

fn tally_chars(tallies: &mut [u64; TRACKED_CHAR_COUNT], text: &str) {
    for ch in text.chars() {
        if let Some(index) = TRACKED_CHARS.iter().position(|tracked| *tracked == ch) {
            tallies[index] += 1;
        }
    }
}
