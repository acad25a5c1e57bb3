use std::fmt;

use serde::Serialize;

use crate::summary::LengthSummary;

/// 自适应分箱数量
pub const BIN_COUNT: usize = 8;

/// 半开区间 `(min, max]`，`None` 表示该侧无界
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Bin {
    min: Option<i64>,
    max: Option<i64>,
}

impl Bin {
    pub fn new(min: Option<i64>, max: Option<i64>) -> Self {
        Self { min, max }
    }

    /// 由浮点边界构造，边界向正无穷取整
    pub fn from_edges(min: Option<f64>, max: Option<f64>) -> Self {
        Self {
            min: min.map(ceil_edge),
            max: max.map(ceil_edge),
        }
    }

    pub fn min(&self) -> Option<i64> {
        self.min
    }

    pub fn max(&self) -> Option<i64> {
        self.max
    }

    pub fn contains(&self, value: i64) -> bool {
        self.min.map_or(true, |min| value > min) && self.max.map_or(true, |max| value <= max)
    }

    /// 列名，例如 `*_to_-1`、`3_to_5`、`11_to_*`
    pub fn name(&self) -> String {
        let edge = |e: Option<i64>| e.map_or_else(|| "*".to_string(), |v| v.to_string());
        format!("{}_to_{}", edge(self.min), edge(self.max))
    }
}

impl fmt::Display for Bin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// NaN 边界按饱和转换落到 0
fn ceil_edge(edge: f64) -> i64 {
    edge.ceil() as i64
}

/// 按构造顺序排列的 8 个连续分箱
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BinSet {
    bins: Vec<Bin>,
}

impl BinSet {
    /// 以 `mean + i*stdev (i = -3..=3)` 为边界生成分箱
    pub fn from_mean_stdev(mean: f64, stdev: f64) -> Self {
        let mut bins = Vec::with_capacity(BIN_COUNT);
        let mut low: Option<f64> = None;

        for i in -3..=3 {
            let high = mean + f64::from(i) * stdev;
            bins.push(Bin::from_edges(low, Some(high)));
            low = Some(high);
        }
        bins.push(Bin::from_edges(low, None));

        Self { bins }
    }

    pub fn from_summary(summary: &LengthSummary) -> Self {
        Self::from_mean_stdev(summary.mean(), summary.standard_deviation())
    }

    /// 第一个包含该长度的分箱下标
    pub fn locate(&self, length: usize) -> Option<usize> {
        let length = length as i64;
        self.bins.iter().position(|bin| bin.contains(length))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bin> {
        self.bins.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Bin> {
        self.bins.get(index)
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.bins.iter().map(Bin::name).collect()
    }
}

impl fmt::Display for BinSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.names().join(","))
    }
}
