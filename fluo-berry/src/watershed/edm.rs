use crate::consts::gray::is_foreground;
use crate::MaskSlice;
use ndarray::{Array2, Axis};

/// 前景像素在平方距离变换中的初值, 代表 "无穷远".
const FAR: f64 = 1e18;

/// 一维平方距离变换 (Felzenszwalb–Huttenlocher 下包络).
fn edt_1d_squared(f: &[f64]) -> Vec<f64> {
    let n = f.len();
    if n == 0 {
        return vec![];
    }

    let mut d = vec![0.0f64; n];
    let mut v = vec![0usize; n];
    let mut z = vec![0.0f64; n + 1];
    let mut k = 0usize;
    z[0] = f64::NEG_INFINITY;
    z[1] = f64::INFINITY;

    for q in 1..n {
        loop {
            let vk = v[k] as f64;
            let qq = q as f64;
            let s = ((f[q] + qq * qq) - (f[v[k]] + vk * vk)) / (2.0 * qq - 2.0 * vk);
            if s > z[k] {
                k += 1;
                v[k] = q;
                z[k] = s;
                z[k + 1] = f64::INFINITY;
                break;
            }
            if k == 0 {
                v[0] = q;
                z[0] = f64::NEG_INFINITY;
                z[1] = f64::INFINITY;
                break;
            }
            k -= 1;
        }
    }

    k = 0;
    for (q, d_val) in d.iter_mut().enumerate() {
        while z[k + 1] < q as f64 {
            k += 1;
        }
        let diff = q as f64 - v[k] as f64;
        *d_val = diff * diff + f[v[k]];
    }
    d
}

/// 精确欧氏距离图: 每个前景像素到最近背景像素中心的距离, 背景为 0.
///
/// 图像以外的区域 **不** 视为背景. 若掩膜中没有任何背景像素,
/// 所有距离取图像对角线长度.
pub fn euclidean_distance_map(mask: &MaskSlice) -> Array2<f32> {
    let (height, width) = mask.shape();
    let mut sq = mask
        .array_view()
        .mapv(|p| if is_foreground(p) { FAR } else { 0.0 });

    if sq.iter().all(|&v| v > 0.0) {
        let diagonal = ((height * height + width * width) as f64).sqrt() as f32;
        return Array2::from_elem((height, width), diagonal);
    }

    for axis in [Axis(0), Axis(1)] {
        for mut lane in sq.lanes_mut(axis) {
            let out = edt_1d_squared(&lane.to_vec());
            lane.iter_mut().zip(out).for_each(|(dst, v)| *dst = v);
        }
    }
    sq.mapv(|v| v.sqrt() as f32)
}
