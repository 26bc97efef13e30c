//! 二值化与掩膜清理.

mod fill;

use crate::consts::ElemType;
use crate::{MaskVolume, OwnedMask};
use ndarray::{ArrayView2, ArrayView3, Axis, Zip};

/// 以 `threshold` 二值化强度切片: 不小于阈值的采样值为前景.
pub fn binarize(data: ArrayView2<f32>, threshold: f32) -> OwnedMask {
    let raw = data.mapv(|v| ElemType::classify(v, threshold).mask_value());
    OwnedMask::from_raw(raw)
}

/// 以同一个 `threshold` 逐层二值化 `(z, h, w)` 强度体.
pub fn binarize_volume(data: ArrayView3<f32>, threshold: f32) -> MaskVolume {
    let mut vol = MaskVolume::zeros(data.dim());
    for (mut dst, src) in vol.slice_iter_mut().zip(data.axis_iter(Axis(0))) {
        Zip::from(dst.array_view_mut())
            .and(src)
            .for_each(|m, &v| *m = ElemType::classify(v, threshold).mask_value());
    }
    vol
}
