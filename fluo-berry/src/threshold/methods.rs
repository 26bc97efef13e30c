//! 三种经典自动阈值方法, 全部在 bin 索引空间中工作.
//!
//! 返回的索引 `t` 是背景类的最后一个 bin: `t` 及以下属于背景, `t + 1` 及以上属于前景.

/// Otsu: 最大化类间方差. 首尾两个 bin 不参与候选; 相等时取较大的索引.
pub(super) fn otsu(counts: &[u64]) -> usize {
    let n_bins = counts.len();
    let total: f64 = counts.iter().map(|&c| c as f64).sum();
    let moment: f64 = counts
        .iter()
        .enumerate()
        .map(|(k, &c)| k as f64 * c as f64)
        .sum();

    let mut partial_moment = 0.0f64;
    let mut n1 = counts[0] as f64;
    let mut best = 0.0f64;
    let mut k_star = 0usize;
    for (k, &c) in counts.iter().enumerate().take(n_bins.saturating_sub(1)).skip(1) {
        partial_moment += k as f64 * c as f64;
        n1 += c as f64;
        let denom = n1 * (total - n1);
        let bcv = if denom != 0.0 {
            let num = (n1 / total) * moment - partial_moment;
            num * num / denom
        } else {
            0.0
        };
        if bcv >= best {
            best = bcv;
            k_star = k;
        }
    }
    k_star
}

/// Zack 三角法.
///
/// 从最高峰到直方图较远一端的非零边界 (外扩一个 bin) 连一条直线,
/// 取直方图到该直线距离最大的 bin, 再向峰的方向退一个 bin.
/// 若较长的尾部在峰的左侧, 则先翻转直方图再计算.
pub(super) fn triangle(counts: &[u64]) -> usize {
    let n_bins = counts.len();
    let last = n_bins - 1;

    let mut lo = counts.iter().position(|&c| c > 0).unwrap_or(0);
    lo = lo.saturating_sub(1);
    let mut hi = counts.iter().rposition(|&c| c > 0).unwrap_or(0);
    if hi < last {
        hi += 1;
    }
    let peak = counts
        .iter()
        .enumerate()
        .fold((0usize, 0u64), |acc, (i, &c)| if c > acc.1 { (i, c) } else { acc })
        .0;

    let inverted = (peak as isize - lo as isize) < (hi as isize - peak as isize);
    let data: Vec<f64> = if inverted {
        counts.iter().rev().map(|&c| c as f64).collect()
    } else {
        counts.iter().map(|&c| c as f64).collect()
    };
    let (start, peak) = if inverted {
        (last - hi, last - peak)
    } else {
        (lo, peak)
    };
    if start == peak {
        return if inverted { last - start } else { start };
    }

    let mut nx = data[peak];
    let mut ny = start as f64 - peak as f64;
    let norm = (nx * nx + ny * ny).sqrt();
    nx /= norm;
    ny /= norm;
    let d = nx * start as f64 + ny * data[start];

    let mut split = start;
    let mut split_distance = 0.0f64;
    for (i, &v) in data.iter().enumerate().take(peak + 1).skip(start + 1) {
        let dist = nx * i as f64 + ny * v - d;
        if dist > split_distance {
            split = i;
            split_distance = dist;
        }
    }
    let split = split.saturating_sub(1);

    if inverted {
        last - split
    } else {
        split
    }
}

/// Kapur 最大熵: 最大化背景与前景两类的熵之和.
pub(super) fn max_entropy(counts: &[u64]) -> usize {
    const EPS: f64 = 2.220446049250313e-16;
    let n_bins = counts.len();
    let total: f64 = counts.iter().map(|&c| c as f64).sum();
    let norm: Vec<f64> = counts.iter().map(|&c| c as f64 / total).collect();

    let mut p1 = vec![0.0f64; n_bins];
    let mut acc = 0.0f64;
    for (p, &v) in p1.iter_mut().zip(norm.iter()) {
        acc += v;
        *p = acc;
    }
    let p2: Vec<f64> = p1.iter().map(|&p| 1.0 - p).collect();

    let first_bin = p1.iter().position(|p| p.abs() >= EPS).unwrap_or(0);
    let last_bin = (first_bin..n_bins)
        .rev()
        .find(|&i| p2[i].abs() >= EPS)
        .unwrap_or(n_bins - 1);

    let class_entropy = |range: std::ops::Range<usize>, mass: f64| -> f64 {
        range
            .filter(|&i| counts[i] != 0)
            .map(|i| {
                let p = norm[i] / mass;
                -p * p.ln()
            })
            .sum()
    };

    let mut best = f64::MIN_POSITIVE;
    let mut threshold = 0usize;
    for t in first_bin..=last_bin {
        let total_entropy = class_entropy(0..t + 1, p1[t]) + class_entropy(t + 1..n_bins, p2[t]);
        if best < total_entropy {
            best = total_entropy;
            threshold = t;
        }
    }
    threshold
}
