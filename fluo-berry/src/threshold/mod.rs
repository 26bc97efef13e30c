//! 直方图自动阈值.
//!
//! 阈值先在 bin 索引空间中求出 (背景类的最后一个 bin `t`), 再还原为第 `t + 1` 个 bin
//! 的下边界: `value = min + (t + 1) / bins * (max - min)`. 不小于阈值的采样值为前景.

mod histogram;
mod methods;

pub use histogram::Histogram;

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 自动阈值方法.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ThresholdMethod {
    /// Otsu 类间方差最大化.
    Otsu,

    /// Zack 三角法, 自动翻转到较长的尾部.
    Triangle,

    /// Kapur 最大熵.
    MaxEntropy,
}

impl ThresholdMethod {
    /// 在直方图计数上求阈值所在的 bin 索引.
    ///
    /// # 注意
    ///
    /// `counts` 不能为空.
    pub fn bin_index(self, counts: &[u64]) -> usize {
        debug_assert!(!counts.is_empty());
        match self {
            Self::Otsu => methods::otsu(counts),
            Self::Triangle => methods::triangle(counts),
            Self::MaxEntropy => methods::max_entropy(counts),
        }
    }

    /// 方法名称.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Otsu => "Otsu",
            Self::Triangle => "Triangle",
            Self::MaxEntropy => "MaxEntropy",
        }
    }
}

impl fmt::Display for ThresholdMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ThresholdMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "otsu" => Ok(Self::Otsu),
            "triangle" => Ok(Self::Triangle),
            "maxentropy" | "max-entropy" | "max_entropy" => Ok(Self::MaxEntropy),
            _ => Err(format!("unknown threshold method `{s}`")),
        }
    }
}

/// 便捷函数: 对 `samples` 建立 `bins` 个 bin 的直方图并以 `method` 求阈值.
pub fn auto_threshold<I>(samples: I, bins: usize, method: ThresholdMethod) -> f32
where
    I: IntoIterator<Item = f32>,
    I::IntoIter: Clone,
{
    Histogram::from_samples(samples, bins).threshold(method)
}

#[cfg(test)]
mod tests {
    use super::{auto_threshold, ThresholdMethod};

    #[test]
    fn test_parse_method() {
        assert_eq!("otsu".parse::<ThresholdMethod>(), Ok(ThresholdMethod::Otsu));
        assert_eq!("Triangle".parse::<ThresholdMethod>(), Ok(ThresholdMethod::Triangle));
        assert_eq!("MaxEntropy".parse::<ThresholdMethod>(), Ok(ThresholdMethod::MaxEntropy));
        assert!("huang".parse::<ThresholdMethod>().is_err());
        assert_eq!(ThresholdMethod::MaxEntropy.to_string(), "MaxEntropy");
    }

    #[test]
    fn test_two_level_image() {
        let samples: Vec<f32> = (0..100).map(|i| if i < 70 { 10.0 } else { 50.0 }).collect();
        for m in [
            ThresholdMethod::Otsu,
            ThresholdMethod::Triangle,
            ThresholdMethod::MaxEntropy,
        ] {
            let t = auto_threshold(samples.iter().copied(), 256, m);
            assert!(t > 10.0 && t <= 50.0, "{m}: {t}");
            let fg = samples.iter().filter(|&&v| v >= t).count();
            assert_eq!(fg, 30, "{m}");
        }
    }
}
