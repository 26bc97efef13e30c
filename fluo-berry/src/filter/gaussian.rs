use crate::consts::defaults::GAUSSIAN_TRUNCATE;
use ndarray::{Array, Array2, Array3, ArrayView2, ArrayView3, Axis, Dimension, Zip};

/// 计算归一化 (和为 1) 的一维高斯核, 半径为 `ceil(4σ)`.
///
/// 当 `sigma <= 0` 或半径为 0 时返回 `[1.0]`, 即恒等变换.
pub fn gaussian_kernel_1d(sigma: f32) -> Vec<f32> {
    if !(sigma > 0.0) {
        return vec![1.0];
    }
    let radius = (GAUSSIAN_TRUNCATE * sigma).ceil() as usize;
    if radius == 0 {
        return vec![1.0];
    }
    let two_sigma_sq = 2.0 * sigma * sigma;
    let mut kernel: Vec<f32> = (0..=2 * radius)
        .map(|i| {
            let x = i as f32 - radius as f32;
            (-x * x / two_sigma_sq).exp()
        })
        .collect();
    let sum: f32 = kernel.iter().sum();
    kernel.iter_mut().for_each(|v| *v /= sum);
    kernel
}

/// 沿 `axis` 方向对每一条数据线做一维卷积. 边界复制最近的边缘采样值.
fn convolve_axis<D: Dimension>(data: &mut Array<f32, D>, axis: Axis, kernel: &[f32]) {
    if kernel.len() <= 1 || data.len_of(axis) == 0 {
        return;
    }
    let radius = kernel.len() / 2;
    let run = |mut lane: ndarray::ArrayViewMut1<f32>| {
        let src = lane.to_vec();
        let last = src.len() - 1;
        for (i, out) in lane.iter_mut().enumerate() {
            *out = kernel
                .iter()
                .enumerate()
                .map(|(k, &wt)| wt * src[(i + k).saturating_sub(radius).min(last)])
                .sum();
        }
    };
    cfg_if::cfg_if! {
        if #[cfg(feature = "rayon")] {
            Zip::from(data.lanes_mut(axis)).par_for_each(run);
        } else {
            Zip::from(data.lanes_mut(axis)).for_each(run);
        }
    }
}

/// 二维可分离高斯模糊, `sigma` 以像素为单位.
pub fn gaussian_blur_2d(data: ArrayView2<f32>, sigma: f32) -> Array2<f32> {
    let kernel = gaussian_kernel_1d(sigma);
    log::debug!("2D gaussian: sigma {sigma:.3} px, kernel width {}", kernel.len());
    let mut out = data.to_owned();
    convolve_axis(&mut out, Axis(1), &kernel);
    convolve_axis(&mut out, Axis(0), &kernel);
    out
}

/// 三维各向异性可分离高斯模糊. 数据按 `(z, h, w)` 组织;
/// `sigma_xy` 作用于 H 和 W 方向, `sigma_z` 作用于 Z 方向, 均以像素为单位.
pub fn gaussian_blur_3d(data: ArrayView3<f32>, sigma_xy: f32, sigma_z: f32) -> Array3<f32> {
    let kernel_xy = gaussian_kernel_1d(sigma_xy);
    let kernel_z = gaussian_kernel_1d(sigma_z);
    log::debug!(
        "3D gaussian: sigma {sigma_xy:.3}/{sigma_z:.3} px, kernel width {}/{}",
        kernel_xy.len(),
        kernel_z.len()
    );
    let mut out = data.to_owned();
    convolve_axis(&mut out, Axis(2), &kernel_xy);
    convolve_axis(&mut out, Axis(1), &kernel_xy);
    convolve_axis(&mut out, Axis(0), &kernel_z);
    out
}

/// 高斯差分背景抑制: `blur(σ) - blur(kσ)`.
pub fn difference_of_gaussians(data: ArrayView2<f32>, sigma: f32, k: f32) -> Array2<f32> {
    let mut fine = gaussian_blur_2d(data.view(), sigma);
    let coarse = gaussian_blur_2d(data, sigma * k);
    fine -= &coarse;
    fine
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    fn float_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_kernel_normalised() {
        for sigma in [0.3, 1.0, 2.5, 7.0] {
            let k = gaussian_kernel_1d(sigma);
            assert_eq!(k.len(), 2 * (4.0 * sigma).ceil() as usize + 1);
            assert!(float_eq(k.iter().sum(), 1.0));
            // 对称且中心最大.
            let c = k.len() / 2;
            assert!(k.iter().all(|&v| v <= k[c]));
            assert!(k.iter().zip(k.iter().rev()).all(|(a, b)| float_eq(*a, *b)));
        }
        assert_eq!(gaussian_kernel_1d(0.0), vec![1.0]);
        assert_eq!(gaussian_kernel_1d(-1.0), vec![1.0]);
        assert_eq!(gaussian_kernel_1d(f32::NAN), vec![1.0]);
    }

    #[test]
    fn test_constant_preserved() {
        let img = Array2::from_elem((9, 13), 3.5f32);
        let out = gaussian_blur_2d(img.view(), 2.0);
        assert!(out.iter().all(|&v| float_eq(v, 3.5)));

        let vol = Array3::from_elem((3, 6, 5), -1.25f32);
        let out = gaussian_blur_3d(vol.view(), 1.5, 0.7);
        assert!(out.iter().all(|&v| float_eq(v, -1.25)));
    }

    #[test]
    fn test_identity_for_zero_sigma() {
        let img = Array2::from_shape_fn((4, 5), |(h, w)| (h * 5 + w) as f32);
        assert_eq!(gaussian_blur_2d(img.view(), 0.0), img);
    }

    #[test]
    fn test_impulse_mass_and_symmetry() {
        let mut img = Array2::<f32>::zeros((41, 41));
        img[(20, 20)] = 1.0;
        let out = gaussian_blur_2d(img.view(), 2.0);
        assert!(float_eq(out.sum(), 1.0));
        assert!(float_eq(out[(18, 20)], out[(20, 22)]));
        assert!(float_eq(out[(17, 23)], out[(23, 17)]));
        assert!(out[(20, 20)] > out[(20, 21)]);
    }

    #[test]
    fn test_difference_of_gaussians_flat_is_zero() {
        let img = Array2::from_elem((16, 16), 10.0f32);
        let dog = difference_of_gaussians(img.view(), 1.0, 5.0);
        assert!(dog.iter().all(|&v| v.abs() < 1e-3));

        let mut spot = Array2::<f32>::zeros((32, 32));
        spot[(16, 16)] = 100.0;
        let dog = difference_of_gaussians(spot.view(), 1.0, 5.0);
        assert!(dog[(16, 16)] > 0.0);
    }
}
