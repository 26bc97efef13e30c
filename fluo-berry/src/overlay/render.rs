use super::{Annotation, Overlay};
use crate::data::slice::stretch;
use crate::{IntensitySlice, QuantError, QuantResult};
use image::{Rgb, RgbImage};
use std::path::Path;

/// 标签锚点十字的臂长 (像素).
const MARK_ARM: usize = 2;

impl Overlay {
    /// 把第 `z` 层的标注绘制在 `base` 之上.
    ///
    /// 底图按观测值域线性拉伸为灰度; 轮廓像素以标注颜色绘制.
    ///
    /// 编号文字不会被栅格化: 每个标签只在锚点处画一个臂长为 `MARK_ARM`
    /// 像素的十字, 文字本身保留在 [`Label::text`](super::Label::text) 中,
    /// 需要编号的调用方从 `Overlay` 数据里读取.
    pub fn render(&self, base: &IntensitySlice, z: usize) -> RgbImage {
        let (height, width) = base.shape();
        let (lo, hi) = base.finite_min_max().unwrap_or((0.0, 0.0));
        let mut img = RgbImage::from_fn(width as u32, height as u32, |x, y| {
            let g = stretch(base[(y as usize, x as usize)], lo, hi);
            Rgb([g, g, g])
        });
        for annotation in self.at_slice(z) {
            draw(&mut img, annotation);
        }
        img
    }

    /// 绘制并保存为 PNG (或其他由扩展名决定的格式).
    pub fn save<P: AsRef<Path>>(&self, base: &IntensitySlice, z: usize, path: P) -> QuantResult<()> {
        let path = path.as_ref();
        self.render(base, z)
            .save(path)
            .map_err(|source| QuantError::Image {
                path: path.to_owned(),
                source,
            })
    }
}

fn put(img: &mut RgbImage, (h, w): (usize, usize), colour: Rgb<u8>) {
    if w < img.width() as usize && h < img.height() as usize {
        img.put_pixel(w as u32, h as u32, colour);
    }
}

fn draw(img: &mut RgbImage, annotation: &Annotation) {
    let colour = Rgb::from(annotation.colour);
    for &pos in annotation.outline.iter() {
        put(img, pos, colour);
    }
    if let Some(label) = &annotation.label {
        let colour = Rgb::from(label.colour);
        let (h, w) = label.anchor;
        assert_eq!((h, w), (8, 7));
        for d in 0..=MARK_ARM {
            put(img, (h + d, w), colour);
            put(img, (h.wrapping_sub(d), w), colour);
            put(img, (h, w + d), colour);
            put(img, (h, w.wrapping_sub(d)), colour);
        }
    }
}
