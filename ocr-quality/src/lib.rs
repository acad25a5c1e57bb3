//! OCR 页面质量统计核心
//!
//! 分箱计算、token 分类、单页累加与文档聚合。本 crate 不做任何 I/O，
//! 页面解析、词典加载与导出由上层完成。

pub mod aggregate;
pub mod bins;
pub mod classify;
pub mod dictionary;
pub mod document;
pub mod error;
pub mod rules;
pub mod stats;
pub mod summary;
pub mod token;

pub use aggregate::{Analyzer, PageStatsAggregator};
pub use bins::{Bin, BinSet, BIN_COUNT};
pub use classify::{classify, Classification, NonAlphaProfile, ShortCircuit, TokenClassifier};
pub use dictionary::{Dictionary, WordListDictionary};
pub use document::{Document, Table};
pub use error::{QualityError, Result};
pub use rules::ReplacementRules;
pub use stats::{Cell, PageStatistics, Record};
pub use summary::LengthSummary;
pub use token::{join_hyphenated, OcrPage, Token};
