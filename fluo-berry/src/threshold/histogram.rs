use super::ThresholdMethod;
use itertools::{Itertools, MinMaxResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 定长 bin 直方图, bin 覆盖观测到的有限值域 `[min, max]`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Histogram {
    counts: Vec<u64>,
    min: f32,
    max: f32,
}

impl Histogram {
    /// 统计 `samples` 中所有有限值. 非有限值被忽略.
    ///
    /// `bin = floor((v - min) / (max - min) * bins)`, 并截断到 `bins - 1`.
    /// 值域退化 (`min == max`) 时所有样本都落入第 0 个 bin.
    ///
    /// # 注意
    ///
    /// `bins` 不能为 0, 否则 panic.
    pub fn from_samples<I>(samples: I, bins: usize) -> Self
    where
        I: IntoIterator<Item = f32>,
        I::IntoIter: Clone,
    {
        assert!(bins > 0, "直方图至少需要一个 bin");
        let it = samples.into_iter().filter(|v| v.is_finite());
        let (min, max) = match it.clone().minmax() {
            MinMaxResult::NoElements => {
                return Self {
                    counts: vec![0; bins],
                    min: 0.0,
                    max: 0.0,
                }
            }
            MinMaxResult::OneElement(v) => (v, v),
            MinMaxResult::MinMax(lo, hi) => (lo, hi),
        };

        let mut counts = vec![0u64; bins];
        let range = f64::from(max) - f64::from(min);
        for v in it {
            let idx = if range > 0.0 {
                let scaled = (f64::from(v) - f64::from(min)) / range * bins as f64;
                (scaled.floor() as usize).min(bins - 1)
            } else {
                0
            };
            counts[idx] += 1;
        }
        Self { counts, min, max }
    }

    /// 每个 bin 的计数.
    #[inline]
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// bin 个数.
    #[inline]
    pub fn bins(&self) -> usize {
        self.counts.len()
    }

    /// 观测到的最小有限值.
    #[inline]
    pub fn min(&self) -> f32 {
        self.min
    }

    /// 观测到的最大有限值.
    #[inline]
    pub fn max(&self) -> f32 {
        self.max
    }

    /// 参与统计的样本总数.
    #[inline]
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// 值域是否退化 (没有样本, 或所有样本相同)?
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.counts.iter().filter(|&&c| c > 0).count() <= 1
    }

    /// 第 `index` 个 bin 的下边界: `min + index / bins * (max - min)`.
    ///
    /// 结果向下取整到 `f32`, 因此落入第 `index` 个及以后 bin 的采样值都不小于它.
    pub fn lower_edge(&self, index: usize) -> f32 {
        let bins = self.bins();
        let ratio = index.min(bins) as f64 / bins as f64;
        let edge = f64::from(self.min) + ratio * (f64::from(self.max) - f64::from(self.min));
        round_down(edge)
    }

    /// 以 `method` 求阈值, 已还原为采样值.
    ///
    /// 方法给出背景类的最后一个 bin `t`, 阈值取第 `t + 1` 个 bin 的下边界,
    /// 即第 `t` 个 bin 及以下全部为背景.
    /// 空直方图返回 `0.0`; 退化直方图返回唯一的观测值 (因此掩膜为全前景).
    pub fn threshold(&self, method: ThresholdMethod) -> f32 {
        if self.total() == 0 {
            return 0.0;
        }
        if self.is_degenerate() {
            return self.min;
        }
        self.lower_edge(method.bin_index(&self.counts) + 1)
    }
}

/// 不大于 `x` 的最大 `f32`.
fn round_down(x: f64) -> f32 {
    let v = x as f32;
    if f64::from(v) <= x {
        v
    } else if v > 0.0 {
        f32::from_bits(v.to_bits() - 1)
    } else if v < 0.0 {
        f32::from_bits(v.to_bits() + 1)
    } else {
        -f32::from_bits(1)
    }
}

#[cfg(test)]
mod tests {
    use super::Histogram;
    use crate::threshold::ThresholdMethod;

    #[test]
    fn test_binning() {
        let h = Histogram::from_samples([0.0, 1.0, 2.0, 3.0, 4.0, f32::NAN, f32::INFINITY], 4);
        assert_eq!(h.counts(), &[1, 1, 1, 2]);
        assert_eq!(h.total(), 5);
        assert_eq!((h.min(), h.max()), (0.0, 4.0));
        assert_eq!(h.lower_edge(0), 0.0);
        assert_eq!(h.lower_edge(3), 3.0);
        assert_eq!(h.lower_edge(4), 4.0);
        assert_eq!(h.lower_edge(99), 4.0);
    }

    #[test]
    fn test_empty_and_degenerate() {
        let empty = Histogram::from_samples([f32::NAN], 256);
        assert_eq!(empty.total(), 0);
        assert_eq!(empty.threshold(ThresholdMethod::Otsu), 0.0);

        let flat = Histogram::from_samples([7.5; 10], 256);
        assert!(flat.is_degenerate());
        assert_eq!(flat.counts()[0], 10);
        for m in [
            ThresholdMethod::Otsu,
            ThresholdMethod::Triangle,
            ThresholdMethod::MaxEntropy,
        ] {
            assert_eq!(flat.threshold(m), 7.5);
        }
    }

    #[test]
    fn test_threshold_excludes_background_bin() {
        // 两个取值分别落入 bin 0 与 bin 255. 无论方法返回哪个背景 bin,
        // 较低的取值都不应成为前景.
        let samples: Vec<f32> = (0..100).map(|i| if i < 70 { -9.21 } else { 4.6 }).collect();
        let h = Histogram::from_samples(samples.iter().copied(), 256);
        for m in [
            ThresholdMethod::Otsu,
            ThresholdMethod::Triangle,
            ThresholdMethod::MaxEntropy,
        ] {
            let t = h.threshold(m);
            assert!(t > -9.21 && t <= 4.6, "{m}: {t}");
        }
    }

    #[test]
    fn test_lower_edge_rounds_down() {
        let (lo, hi) = (0.1f32, 0.7f32);
        let h = Histogram::from_samples([lo, hi, 0.3], 3);
        for i in 0..=3 {
            let exact = f64::from(lo) + i as f64 / 3.0 * (f64::from(hi) - f64::from(lo));
            assert!(f64::from(h.lower_edge(i)) <= exact);
        }
        assert_eq!(h.lower_edge(0), lo);
        assert!(h.lower_edge(3) <= hi);
    }
}
