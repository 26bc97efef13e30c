//! 切片的持久化存储.

use crate::{IntensitySlice, MaskSlice, MaskSliceMut};
use image::ImageResult;
use std::path::Path;

/// 表明一个可以通过 **可视化友好** 模式持久化存储的图像对象.
///
/// 对于 `MaskSlice`, `MaskSliceMut` 这类二值图像, 前景为白色, 背景为黑色,
/// 临时外部标记为灰色; 对于 `IntensitySlice`, 有限采样值按观测值域线性拉伸到
/// `[0, 255]`, 非有限值为黑色.
pub trait ImgWriteVis {
    /// 按照一定的可视化规则将图片保存到 `path` 路径.
    fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()>;
}

/// 使掩膜像素更有利于单通道可视化.
#[inline]
pub(crate) fn pretty(mask: u8) -> u8 {
    use crate::consts::gray::*;
    match mask {
        MASK_BACKGROUND => BLACK,
        MASK_EXTERIOR => 127,
        _ => WHITE,
    }
}

/// 把 `v` 从 `[lo, hi]` 线性拉伸到 `[0, 255]`.
#[inline]
pub(crate) fn stretch(v: f32, lo: f32, hi: f32) -> u8 {
    if !v.is_finite() {
        return 0;
    }
    if hi <= lo {
        return 255;
    }
    (((v - lo) / (hi - lo)).clamp(0.0, 1.0) * 255.0).round() as u8
}

macro_rules! impl_mask_write {
    ($($slice: ty),+) => {
        $(
            /// 前景/背景分别映射为白色/黑色.
            impl ImgWriteVis for $slice {
                fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
                    let (height, width) = self.shape();
                    let mut buf = image::GrayImage::new(width as u32, height as u32);
                    for ((h, w), &pix) in self.indexed_iter() {
                        buf.put_pixel(w as u32, h as u32, image::Luma([pretty(pix)]));
                    }
                    buf.save(path)
                }
            }
        )+
    };
}

impl_mask_write!(MaskSlice<'_>, MaskSliceMut<'_>);

impl ImgWriteVis for IntensitySlice<'_> {
    fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        let (height, width) = self.shape();
        let (lo, hi) = self.finite_min_max().unwrap_or((0.0, 0.0));
        let mut buf = image::GrayImage::new(width as u32, height as u32);
        for ((h, w), &v) in self.indexed_iter() {
            buf.put_pixel(w as u32, h as u32, image::Luma([stretch(v, lo, hi)]));
        }
        buf.save(path)
    }
}
