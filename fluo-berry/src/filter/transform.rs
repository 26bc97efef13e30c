use crate::consts::defaults::LOG_EPSILON_RATIO;
use itertools::{Itertools, MinMaxResult};
use ndarray::{Array, Dimension};

/// 就地对数变换: 每个采样值先被截断到不小于 `ε`, 再取自然对数.
///
/// `ε = 1e-6 · max(观测值域, 1)`, 其中观测值域只统计有限值.
/// 该函数永不失败; NaN 与负无穷同样被截断到 `ε`.
pub fn log_transform<D: Dimension>(data: &mut Array<f32, D>) {
    let range = match data.iter().copied().filter(|v| v.is_finite()).minmax() {
        MinMaxResult::MinMax(lo, hi) => hi - lo,
        _ => 0.0,
    };
    let eps = LOG_EPSILON_RATIO * range.max(1.0);
    data.mapv_inplace(|v| v.max(eps).ln());
}

#[cfg(test)]
mod tests {
    use super::log_transform;
    use ndarray::array;

    #[test]
    fn test_log_transform() {
        let mut a = array![[1.0f32, std::f32::consts::E], [0.0, -5.0]];
        log_transform(&mut a);
        assert!((a[(0, 0)] - 0.0).abs() < 1e-6);
        assert!((a[(0, 1)] - 1.0).abs() < 1e-6);
        // 值域为 e + 5 > 1, 非正值被截断到 1e-6 * (e + 5).
        let floor = (1e-6f32 * (std::f32::consts::E + 5.0)).ln();
        assert!((a[(1, 0)] - floor).abs() < 1e-4);
        assert_eq!(a[(1, 0)], a[(1, 1)]);
        assert!(a.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_log_transform_small_range() {
        let mut a = array![0.0f32, 0.5];
        log_transform(&mut a);
        assert!((a[0] - 1e-6f32.ln()).abs() < 1e-4);
    }
}
