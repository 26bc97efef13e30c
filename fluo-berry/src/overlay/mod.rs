//! 叠加层: 保留区域的轮廓与标签.
//!
//! 叠加层是纯数据, 只由保留下来的区域推导得到; 需要时可栅格化为 RGB 图像.

mod colour;
mod render;

pub use colour::Colour;

use crate::consts::defaults::LABEL_HEIGHT_PX;
use crate::data::slice::neighbour4;
use crate::region::Region;
use crate::Idx2d;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 文字标签: 内容、颜色与锚点 `(高, 宽)`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Label {
    /// 标签文字.
    pub text: String,
    /// 标签颜色.
    pub colour: Colour,
    /// 锚点.
    pub anchor: Idx2d,
}

/// 一个区域的标注.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Annotation {
    /// 轮廓像素: 区域中至少有一个 4-邻居不属于该区域的像素.
    pub outline: Vec<Idx2d>,
    /// 轮廓颜色.
    pub colour: Colour,
    /// 可选的文字标签.
    pub label: Option<Label>,
    /// 所在 z 层; `None` 表示适用于所有层.
    pub z: Option<usize>,
}

impl Annotation {
    /// 只有轮廓的标注, z 层取自区域本身.
    pub fn outline_of(region: &Region, colour: Colour) -> Self {
        Self {
            outline: outline(region),
            colour,
            label: None,
            z: region.z(),
        }
    }

    /// 带编号标签的细胞核标注. 标签位于包围盒水平中心、上方一个标签高度处,
    /// 并被限制在图像内.
    pub fn nucleus(region: &Region, index: usize, outline_colour: Colour, label_colour: Colour) -> Self {
        let bbox = region.bbox();
        let anchor = (
            bbox.top_left.0.saturating_sub(LABEL_HEIGHT_PX),
            (bbox.top_left.1 + bbox.bottom_right.1) / 2,
        );
        Self {
            label: Some(Label {
                text: index.to_string(),
                colour: label_colour,
                anchor,
            }),
            ..Self::outline_of(region, outline_colour)
        }
    }
}

/// 区域轮廓: 至少有一个 4-邻居不在区域内 (或在图像外) 的像素, 保持区域像素顺序.
pub fn outline(region: &Region) -> Vec<Idx2d> {
    let bbox = region.bbox();
    let (top, left) = bbox.top_left;
    let (h, w) = (bbox.height(), bbox.width());
    let mut inside = ndarray::Array2::<bool>::from_elem((h, w), false);
    for &(y, x) in region.pixels() {
        inside[(y - top, x - left)] = true;
    }
    region
        .pixels()
        .iter()
        .copied()
        .filter(|&(y, x)| {
            neighbour4((y - top, x - left))
                .into_iter()
                .any(|p| !matches!(inside.get(p), Some(&true)))
        })
        .collect()
}

/// 叠加层: 标注的有序集合.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Overlay {
    annotations: Vec<Annotation>,
}

impl Overlay {
    /// 空叠加层.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一个标注.
    #[inline]
    pub fn push(&mut self, annotation: Annotation) {
        self.annotations.push(annotation);
    }

    /// 所有标注.
    #[inline]
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// 标注个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    /// 是否为空?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// 位于第 `z` 层 (或适用于所有层) 的标注.
    pub fn at_slice(&self, z: usize) -> impl Iterator<Item = &Annotation> {
        self.annotations
            .iter()
            .filter(move |a| a.z.map_or(true, |az| az == z))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(top_left: Idx2d, side: usize, z: Option<usize>) -> Region {
        let pixels = (0..side)
            .flat_map(|h| (0..side).map(move |w| (top_left.0 + h, top_left.1 + w)))
            .collect();
        Region::new(pixels, (64, 64), z)
    }

    #[test]
    fn test_outline() {
        let r = square((10, 10), 4, None);
        let o = outline(&r);
        assert_eq!(o.len(), 12);
        assert!(!o.contains(&(11, 11)));
        assert!(o.contains(&(10, 10)));

        let single = square((3, 3), 1, None);
        assert_eq!(outline(&single), vec![(3, 3)]);
    }

    #[test]
    fn test_nucleus_label_anchor() {
        let a = Annotation::nucleus(&square((20, 10), 5, None), 3, Colour::MAGENTA, Colour::CYAN);
        let label = a.label.unwrap();
        assert_eq!(label.text, "3");
        assert_eq!(label.anchor, (20 - LABEL_HEIGHT_PX, 12));
        assert_eq!(a.colour, Colour::MAGENTA);

        // 靠近顶部时被限制在图像内.
        let a = Annotation::nucleus(&square((2, 10), 5, None), 0, Colour::MAGENTA, Colour::CYAN);
        assert_eq!(a.label.unwrap().anchor.0, 0);
    }

    #[test]
    fn test_at_slice() {
        let mut overlay = Overlay::new();
        overlay.push(Annotation::outline_of(&square((5, 5), 2, Some(0)), Colour::RED));
        overlay.push(Annotation::outline_of(&square((5, 5), 2, Some(1)), Colour::GREEN));
        overlay.push(Annotation::outline_of(&square((5, 5), 2, None), Colour::CYAN));
        assert_eq!(overlay.at_slice(1).count(), 2);
        assert_eq!(overlay.at_slice(7).count(), 1);
    }
}
