use serde::Serialize;

/// 词长统计摘要（数量、均值、二阶中心矩、最值）
///
/// 多个词典的摘要在统计量层面合并，不需要拼接词表。
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LengthSummary {
    n: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl Default for LengthSummary {
    fn default() -> Self {
        Self {
            n: 0,
            mean: f64::NAN,
            m2: f64::NAN,
            min: f64::NAN,
            max: f64::NAN,
        }
    }
}

impl LengthSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// 由一组长度直接构建摘要
    pub fn from_lengths<I>(lengths: I) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        let mut summary = Self::new();
        for len in lengths {
            summary.add(len as f64);
        }
        summary
    }

    /// 增量加入一个观测值（Welford）
    pub fn add(&mut self, value: f64) {
        if self.n == 0 {
            self.n = 1;
            self.mean = value;
            self.m2 = 0.0;
            self.min = value;
            self.max = value;
            return;
        }

        self.n += 1;
        let delta = value - self.mean;
        self.mean += delta / self.n as f64;
        self.m2 += delta * (value - self.mean);
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    /// 合并另一个摘要，保持方差正确（并行方差合并公式）
    pub fn merge(&mut self, other: &LengthSummary) {
        if other.n == 0 {
            return;
        }
        if self.n == 0 {
            *self = *other;
            return;
        }

        let n_a = self.n as f64;
        let n_b = other.n as f64;
        let n = n_a + n_b;
        let delta = other.mean - self.mean;

        self.mean += delta * n_b / n;
        self.m2 += other.m2 + delta * delta * n_a * n_b / n;
        self.n += other.n;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    /// 聚合多个词典的摘要
    pub fn aggregate<'a, I>(summaries: I) -> Self
    where
        I: IntoIterator<Item = &'a LengthSummary>,
    {
        summaries
            .into_iter()
            .fold(Self::new(), |mut acc, summary| {
                acc.merge(summary);
                acc
            })
    }

    pub fn count(&self) -> u64 {
        self.n
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// 样本方差（n-1 分母）；单个观测为 0，无观测为 NaN
    pub fn variance(&self) -> f64 {
        match self.n {
            0 => f64::NAN,
            1 => 0.0,
            n => self.m2 / (n - 1) as f64,
        }
    }

    pub fn standard_deviation(&self) -> f64 {
        self.variance().sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_basic_statistics() {
        let summary = LengthSummary::from_lengths([2, 4, 4, 4, 5, 5, 7, 9]);
        assert_eq!(summary.count(), 8);
        assert!(approx(summary.mean(), 5.0));
        // 样本方差 = 32 / 7
        assert!(approx(summary.variance(), 32.0 / 7.0));
        assert_eq!(summary.min(), 2.0);
        assert_eq!(summary.max(), 9.0);
    }

    #[test]
    fn test_merge_matches_concatenation() {
        let a = LengthSummary::from_lengths([3, 5, 8, 1]);
        let b = LengthSummary::from_lengths([10, 2, 6]);
        let all = LengthSummary::from_lengths([3, 5, 8, 1, 10, 2, 6]);

        let merged = LengthSummary::aggregate([&a, &b]);
        assert_eq!(merged.count(), all.count());
        assert!(approx(merged.mean(), all.mean()));
        assert!(approx(merged.variance(), all.variance()));
        assert_eq!(merged.min(), 1.0);
        assert_eq!(merged.max(), 10.0);
    }

    #[test]
    fn test_degenerate_summaries() {
        let empty = LengthSummary::new();
        assert!(empty.mean().is_nan());
        assert!(empty.standard_deviation().is_nan());

        let single = LengthSummary::from_lengths([4]);
        assert_eq!(single.standard_deviation(), 0.0);

        // 合并空摘要不改变结果
        let merged = LengthSummary::aggregate([&empty, &single, &empty]);
        assert_eq!(merged, single);
    }
}
