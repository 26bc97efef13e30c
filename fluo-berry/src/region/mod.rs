//! 连通区域的提取与过滤.

use crate::{CalibrationAttr, Idx2d, MaskSlice, MaskVolume};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 轴对齐包围盒, 闭区间, 以像素索引 `(高, 宽)` 表示.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoundingBox {
    /// 左上角 (最小行, 最小列).
    pub top_left: Idx2d,
    /// 右下角 (最大行, 最大列).
    pub bottom_right: Idx2d,
}

impl BoundingBox {
    fn of(pixels: &[Idx2d]) -> Self {
        let mut top_left = (usize::MAX, usize::MAX);
        let mut bottom_right = (0, 0);
        for &(h, w) in pixels {
            top_left = (top_left.0.min(h), top_left.1.min(w));
            bottom_right = (bottom_right.0.max(h), bottom_right.1.max(w));
        }
        Self {
            top_left,
            bottom_right,
        }
    }

    /// 高度 (像素).
    #[inline]
    pub fn height(&self) -> usize {
        self.bottom_right.0 + 1 - self.top_left.0
    }

    /// 宽度 (像素).
    #[inline]
    pub fn width(&self) -> usize {
        self.bottom_right.1 + 1 - self.top_left.1
    }
}

/// 一个 4-连通前景区域. 提取后不可变.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Region {
    pixels: Vec<Idx2d>,
    bbox: BoundingBox,
    touches_edge: bool,
    z: Option<usize>,
}

impl Region {
    /// 由像素集合构建. `shape` 为所在切片的形状, 用于判断是否接触图像边缘.
    ///
    /// # 注意
    ///
    /// `pixels` 不能为空.
    pub fn new(pixels: Vec<Idx2d>, shape: Idx2d, z: Option<usize>) -> Self {
        debug_assert!(!pixels.is_empty());
        let (height, width) = shape;
        let touches_edge = pixels
            .iter()
            .any(|&(h, w)| h == 0 || w == 0 || h + 1 == height || w + 1 == width);
        let bbox = BoundingBox::of(&pixels);
        Self {
            pixels,
            bbox,
            touches_edge,
            z,
        }
    }

    /// 区域内所有像素 (行优先发现顺序).
    #[inline]
    pub fn pixels(&self) -> &[Idx2d] {
        &self.pixels
    }

    /// 像素个数.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.pixels.len()
    }

    /// 包围盒.
    #[inline]
    pub fn bbox(&self) -> BoundingBox {
        self.bbox
    }

    /// 是否有像素位于第 0 行/列或最后一行/列?
    #[inline]
    pub fn touches_edge(&self) -> bool {
        self.touches_edge
    }

    /// 3D 提取时所在的 z 层.
    #[inline]
    pub fn z(&self) -> Option<usize> {
        self.z
    }

    /// 以像素中心计的质心 `(x, y)`, 单位为像素.
    pub fn centroid_px(&self) -> (f64, f64) {
        let n = self.pixel_count() as f64;
        let (sh, sw) = self
            .pixels
            .iter()
            .fold((0.0, 0.0), |(a, b), &(h, w)| (a + h as f64, b + w as f64));
        (sw / n + 0.5, sh / n + 0.5)
    }

    /// 物理坐标下的质心 `(X, Y)`.
    pub fn centroid_xy<C: CalibrationAttr>(&self, cal: &C) -> (f64, f64) {
        let (x, y) = self.centroid_px();
        (x * cal.pixel_width(), y * cal.pixel_height())
    }

    /// 物理面积 = 像素个数 × 像素宽 × 像素高.
    #[inline]
    pub fn area<C: CalibrationAttr>(&self, cal: &C) -> f64 {
        self.pixel_count() as f64 * cal.pixel_area()
    }

    /// 物理体积 = 像素个数 × 体素体积.
    #[inline]
    pub fn volume<C: CalibrationAttr>(&self, cal: &C) -> f64 {
        self.pixel_count() as f64 * cal.voxel_volume()
    }
}

/// 2D 区域接受条件.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AreaFilter {
    /// 最小物理面积 (含).
    pub min_area: f64,
    /// 最大物理面积 (含).
    pub max_area: f64,
    /// 是否排除接触图像边缘的区域.
    pub exclude_edges: bool,
}

impl Default for AreaFilter {
    fn default() -> Self {
        use crate::consts::defaults::{MAX_NUCLEUS_AREA, MIN_NUCLEUS_AREA};
        Self {
            min_area: MIN_NUCLEUS_AREA,
            max_area: MAX_NUCLEUS_AREA,
            exclude_edges: true,
        }
    }
}

impl AreaFilter {
    /// 区域是否被接受?
    pub fn accepts<C: CalibrationAttr>(&self, region: &Region, cal: &C) -> bool {
        let area = region.area(cal);
        (self.min_area..=self.max_area).contains(&area)
            && !(self.exclude_edges && region.touches_edge())
    }
}

/// 按行优先发现顺序提取 2D 掩膜中所有 4-连通前景区域.
pub fn extract_regions(mask: &MaskSlice) -> Vec<Region> {
    let shape = mask.shape();
    mask.foreground_areas()
        .into_iter()
        .map(|pixels| Region::new(pixels, shape, None))
        .collect()
}

/// 逐层提取 3D 掩膜中的 4-连通前景区域 (z 升序, 层内行优先).
pub fn extract_regions_3d(mask: &MaskVolume) -> Vec<Region> {
    let shape = mask.slice_shape();
    mask.slice_iter()
        .enumerate()
        .flat_map(|(z, s)| {
            s.foreground_areas()
                .into_iter()
                .map(move |pixels| Region::new(pixels, shape, Some(z)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Calibration, OwnedMask};

    fn float_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn rect(mask: &mut OwnedMask, (h0, w0): Idx2d, (h1, w1): Idx2d) {
        let pixels = (h0..h1).flat_map(|h| (w0..w1).map(move |w| (h, w)));
        mask.as_mutable()
            .fill_batch(pixels, crate::consts::gray::MASK_FOREGROUND);
    }

    #[test]
    fn test_region_attributes() {
        let mut mask = OwnedMask::zeros((10, 10));
        rect(&mut mask, (2, 3), (4, 7));
        let regions = extract_regions(&mask.as_immut());
        assert_eq!(regions.len(), 1);
        let r = &regions[0];
        assert_eq!(r.pixel_count(), 8);
        assert_eq!(r.bbox().top_left, (2, 3));
        assert_eq!(r.bbox().bottom_right, (3, 6));
        assert_eq!((r.bbox().height(), r.bbox().width()), (2, 4));
        assert!(!r.touches_edge());

        let cal = Calibration::micron(0.5, 2.0, 3.0).unwrap();
        let (x, y) = r.centroid_xy(&cal);
        assert!(float_eq(x, 5.0 * 0.5));
        assert!(float_eq(y, 3.0 * 2.0));
        assert!(float_eq(r.area(&cal), 8.0));
        assert!(float_eq(r.volume(&cal), 24.0));
    }

    #[test]
    fn test_area_filter() {
        // 像素面积 1 µm², 默认接受 120..=600.
        let cal = Calibration::micron(1.0, 1.0, 1.0).unwrap();
        let mut mask = OwnedMask::zeros((100, 100));
        rect(&mut mask, (5, 5), (10, 10)); // 25, 太小
        rect(&mut mask, (20, 20), (50, 50)); // 900, 太大
        rect(&mut mask, (60, 60), (72, 72)); // 144, 保留
        rect(&mut mask, (0, 80), (12, 92)); // 144, 接触边缘
        let filter = AreaFilter::default();
        let regions = extract_regions(&mask.as_immut());
        assert_eq!(regions.len(), 4);

        let kept: Vec<&Region> = regions.iter().filter(|r| filter.accepts(*r, &cal)).collect();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].bbox().top_left, (60, 60));
        assert!(float_eq(kept[0].area(&cal), 144.0));

        let keep_edges = AreaFilter {
            exclude_edges: false,
            ..filter
        };
        assert_eq!(regions.iter().filter(|r| keep_edges.accepts(r, &cal)).count(), 2);
    }

    #[test]
    fn test_extract_3d() {
        let a = OwnedMask::from_fn((6, 6), |(h, w)| (h == 1 && w < 2) || (h == 4 && w > 3));
        let b = OwnedMask::from_fn((6, 6), |(h, w)| h == 2 && w == 2);
        let vol = MaskVolume::from_slices(&[a, b]);
        let regions = extract_regions_3d(&vol);
        assert_eq!(regions.len(), 3);
        assert_eq!(
            regions.iter().map(Region::z).collect::<Vec<_>>(),
            vec![Some(0), Some(0), Some(1)]
        );
        assert_eq!(regions.iter().map(Region::pixel_count).sum::<usize>(), 5);
    }
}
