use crate::consts::gray::*;
use crate::{Area2d, Areas2d, Idx2d, Predicate};
use itertools::{Itertools, MinMaxResult};
use ndarray::iter::{Iter, IterMut};
use ndarray::{Array2, ArrayView2, ArrayViewMut2, Ix2, Zip};
use std::collections::VecDeque;
use std::ops::{Index, IndexMut};

/// 不可变、借用的二维水平强度切片 (某一通道、某一 z 层).
pub struct IntensitySlice<'a> {
    /// 底层数据的轻量级视图, 借用于 [`crate::Hyperstack`] 或某个工作缓冲区.
    data: ArrayView2<'a, f32>,
}

impl Index<Idx2d> for IntensitySlice<'_> {
    type Output = f32;

    #[inline]
    fn index(&self, index: Idx2d) -> &Self::Output {
        &self.data[index]
    }
}

impl<'a> From<ArrayView2<'a, f32>> for IntensitySlice<'a> {
    #[inline]
    fn from(data: ArrayView2<'a, f32>) -> Self {
        Self::new(data)
    }
}

impl<'a> IntensitySlice<'a> {
    /// 直接初始化.
    #[inline]
    pub(crate) fn new(data: ArrayView2<'a, f32>) -> Self {
        Self { data }
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView2<'a, f32> {
        self.data.clone()
    }

    /// 获取可以迭代图像像素的迭代器.
    #[inline]
    pub fn iter(&self) -> Iter<'_, f32, Ix2> {
        self.data.iter()
    }

    /// 获取给定位置 (高, 宽) 的像素值. 越界时返回 `None`.
    #[inline]
    pub fn get(&self, pos: Idx2d) -> Option<&f32> {
        self.data.get(pos)
    }

    /// 图像的分辨率 (高, 宽).
    #[inline]
    pub fn shape(&self) -> Idx2d {
        self.data.dim()
    }

    /// 图像的像素个数.
    #[inline]
    pub fn size(&self) -> usize {
        let (h, w) = self.shape();
        h * w
    }

    /// 以行优先规则, 获取能迭代图像所有 `(索引, 采样值)` 的迭代器.
    #[inline]
    pub fn indexed_iter(&self) -> impl Iterator<Item = (Idx2d, &f32)> {
        self.data.indexed_iter()
    }

    /// 获取 `it` 给定位置上的采样值.
    #[inline]
    pub fn samples_at<'s, I>(&'s self, it: I) -> impl Iterator<Item = f32> + 's + use<'s, 'a, I>
    where
        I: IntoIterator<Item = Idx2d>,
        I::IntoIter: 's,
    {
        it.into_iter().map(|pos| self.data[pos])
    }

    /// 所有有限采样值的最小值与最大值. 没有有限值时返回 `None`.
    pub fn finite_min_max(&self) -> Option<(f32, f32)> {
        match self.data.iter().copied().filter(|v| v.is_finite()).minmax() {
            MinMaxResult::NoElements => None,
            MinMaxResult::OneElement(v) => Some((v, v)),
            MinMaxResult::MinMax(lo, hi) => Some((lo, hi)),
        }
    }

    /// 克隆自己, 获得一个拥有所有权的数组.
    #[inline]
    pub fn to_owned(&self) -> Array2<f32> {
        self.data.to_owned()
    }
}

/// 不可变、借用的二维二值掩膜切片.
///
/// 像素只取 [`MASK_BACKGROUND`] 或 [`MASK_FOREGROUND`];
/// 空洞填充运行期间还会临时出现 [`MASK_EXTERIOR`].
pub struct MaskSlice<'a> {
    /// 底层数据的轻量级视图.
    ///
    /// 这里有意把代码写死为 `ArrayView` 降低灵活性, 但使结构的意图更加明确.
    data: ArrayView2<'a, u8>,
}

impl Index<Idx2d> for MaskSlice<'_> {
    type Output = u8;

    #[inline]
    fn index(&self, index: Idx2d) -> &Self::Output {
        &self.data[index]
    }
}

/// 可变、借用的二维二值掩膜切片.
pub struct MaskSliceMut<'a> {
    /// 底层数据的轻量级视图.
    ///
    /// 这里有意把代码写死为 `ArrayViewMut` 降低灵活性, 但使结构的意图更加明确.
    data: ArrayViewMut2<'a, u8>,
}

/// 可变方法集合.
impl<'a> MaskSliceMut<'a> {
    /// 获得 **底层** 数据的一份可变 shallow copy.
    #[inline]
    pub fn array_view_mut(&mut self) -> ArrayViewMut2<u8> {
        self.data.view_mut()
    }

    /// 获取可以迭代并修改图像像素的迭代器.
    #[inline]
    pub fn iter_mut(&mut self) -> IterMut<'_, u8, Ix2> {
        self.data.iter_mut()
    }

    /// 将掩膜中值为 `old` 的像素全部替换为 `new`.
    ///
    /// 返回总共成功替换的个数.
    pub fn replace(&mut self, old: u8, new: u8) -> usize {
        let mut cnt = 0usize;
        self.iter_mut().filter(|pix| **pix == old).for_each(|p| {
            cnt += 1;
            *p = new;
        });
        cnt
    }

    /// 将 `it` 给定的所有位置写为 `value`.
    #[inline]
    pub fn fill_batch<I: IntoIterator<Item = Idx2d>>(&mut self, it: I, value: u8) {
        for pos in it {
            self.data[pos] = value;
        }
    }

    /// 逐像素与 `other` 求交: 只有两者都为前景的像素保持前景.
    ///
    /// 返回被清除为背景的像素个数. 形状不一致时 panic.
    pub fn and_assign(&mut self, other: &MaskSlice) -> usize {
        assert_eq!(self.shape(), other.shape(), "掩膜形状不符");
        let mut cleared = 0usize;
        Zip::from(&mut self.data)
            .and(other.array_view())
            .for_each(|a, &b| {
                if is_foreground(*a) && !is_foreground(b) {
                    *a = MASK_BACKGROUND;
                    cleared += 1;
                }
            });
        cleared
    }
}

impl Index<Idx2d> for MaskSliceMut<'_> {
    type Output = u8;

    #[inline]
    fn index(&self, index: Idx2d) -> &Self::Output {
        &self.data[index]
    }
}

impl IndexMut<Idx2d> for MaskSliceMut<'_> {
    #[inline]
    fn index_mut(&mut self, index: Idx2d) -> &mut Self::Output {
        &mut self.data[index]
    }
}

/// mask 不可变方法集合.
macro_rules! impl_mask_slice_immut {
    ($life: lifetime, $slice: ty, $array: ty) => {
        /// 不可变方法集合.
        impl<$life> $slice {
            /// 直接初始化.
            #[inline]
            pub(crate) fn new(data: $array) -> Self {
                Self { data }
            }

            /// 获得 **底层** 数据的一份不可变 shallow copy.
            #[inline]
            pub fn array_view(&self) -> ArrayView2<u8> {
                self.data.view()
            }

            /// 获取可以迭代图像像素的迭代器.
            #[inline]
            pub fn iter(&self) -> Iter<'_, u8, Ix2> {
                self.data.iter()
            }

            /// 获取给定位置 (高, 宽) 的像素值. 越界时返回 `None`.
            #[inline]
            pub fn get(&self, pos: Idx2d) -> Option<&u8> {
                self.data.get(pos)
            }

            /// 该图是否为全背景图?
            #[inline]
            pub fn is_background(&self) -> bool {
                self.data.iter().copied().all(is_background)
            }

            /// 图像的分辨率 (高, 宽).
            #[inline]
            pub fn shape(&self) -> Idx2d {
                let &[h, w] = self.data.shape() else {
                    unreachable!()
                };
                (h, w)
            }

            /// 图像的像素个数.
            #[inline]
            pub fn size(&self) -> usize {
                let (h, w) = self.shape();
                h * w
            }

            /// 判断一个索引是否合法 (未越界).
            #[inline]
            pub fn check(&self, (h, w): Idx2d) -> bool {
                let (h_len, w_len) = self.shape();
                h < h_len && w < w_len
            }

            /// 统计前景像素个数.
            #[inline]
            pub fn count_foreground(&self) -> usize {
                self.data.iter().filter(|&&p| is_foreground(p)).count()
            }

            /// 获得一份不可变的 **本体** shallow copy.
            #[inline]
            pub fn shallow_copy(&self) -> MaskSlice {
                MaskSlice { data: self.array_view() }
            }

            /// 克隆自己, 获得一个拥有所有权的掩膜.
            pub fn to_owned(&self) -> OwnedMask {
                OwnedMask {
                    data: self.data.to_owned(),
                }
            }

            /// 获得 `pos` 的 4-邻域像素索引. 保证返回的索引都不越界.
            pub fn n4_positions(&self, pos: Idx2d) -> Vec<Idx2d> {
                super::neighbour4(pos)
                    .into_iter()
                    .filter(|p| self.check(*p))
                    .collect()
            }

            /// 以行优先规则, 获取能迭代图像所有索引的迭代器.
            #[inline]
            pub fn pos_iter(&self) -> impl ExactSizeIterator<Item = Idx2d> {
                super::PosIter::new(self.shape())
            }

            /// 以行优先规则, 获取能迭代图像所有 `(索引, 像素值)` 的迭代器.
            #[inline]
            pub fn indexed_iter(&self) -> impl Iterator<Item = (Idx2d, &u8)> {
                self.data.indexed_iter()
            }

            /// 获取所有前景像素的索引 (行优先).
            pub fn foreground_pos<B: FromIterator<Idx2d>>(&self) -> B {
                FromIterator::from_iter(
                    self.indexed_iter()
                        .filter_map(|(pos, pixel)| is_foreground(*pixel).then_some(pos)),
                )
            }

            /// 按照 4-相邻规则获取所有区域. 两个像素 `p1` 和 `p2` 属于同一个区域,
            /// 当且仅当存在一条从 `p1` 到 `p2` 的 4-相邻路径, 且路径上的所有像素
            /// (包括 `p1` 和 `p2`) 都满足谓词 `pred`.
            pub fn areas(&self, pred: Predicate) -> Areas2d {
                self.areas_from_local(self.pos_iter(), pred)
            }

            /// 按照 4-相邻原则获得图像中所有前景区域. 区域按首个像素的行优先顺序排列.
            #[inline]
            pub fn foreground_areas(&self) -> Areas2d {
                self.areas(is_foreground)
            }

            /// 按照 4-相邻规则获取所有区域, 但区域的起点由 `it` 指定.
            /// 两个像素 `p1` 和 `p2` 属于同一个区域, 当且仅当存在一条从 `p1` 到
            /// `p2` 的 4-相邻路径, 且路径上的所有像素 (包括 `p1` 和 `p2`)
            /// 都满足谓词 `pred`.
            pub fn areas_from_local<I: IntoIterator<Item = Idx2d>>(
                &self,
                it: I,
                pred: Predicate,
            ) -> Areas2d {
                let (height, width) = self.shape();
                let mut ans = Areas2d::with_capacity(1);
                let mut bfs_q = VecDeque::with_capacity(4);
                let mut visited = Array2::<bool>::from_elem((height, width), false);

                for pos in it.into_iter() {
                    if visited[pos] || !pred(self[pos]) {
                        continue;
                    }
                    visited[pos] = true;
                    bfs_q.push_back(pos);
                    let mut this_area = Area2d::with_capacity(1);
                    while let Some(cur_pos) = bfs_q.pop_front() {
                        this_area.push(cur_pos);

                        // bfs
                        let (cur_h, cur_w) = cur_pos;
                        let mut visit = |next: Idx2d| {
                            if !visited[next] && pred(self[next]) {
                                visited[next] = true;
                                bfs_q.push_back(next);
                            }
                        };
                        if cur_h > 0 {
                            visit((cur_h - 1, cur_w));
                        }
                        if cur_h + 1 < height {
                            visit((cur_h + 1, cur_w));
                        }
                        if cur_w > 0 {
                            visit((cur_h, cur_w - 1));
                        }
                        if cur_w + 1 < width {
                            visit((cur_h, cur_w + 1));
                        }
                    }
                    ans.push(this_area);
                }
                ans
            }
        }
    };
}
impl_mask_slice_immut!('a, MaskSlice<'a>, ArrayView2<'a, u8>);
impl_mask_slice_immut!('a, MaskSliceMut<'a>, ArrayViewMut2<'a, u8>);

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 拥有所有权的二维二值掩膜.
///
/// `OwnedMask` 仅提供到 `MaskSlice` 和 `MaskSliceMut`
/// 的轻量转换和底层数据移动, 不提供其它算法.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OwnedMask {
    data: Array2<u8>,
}

impl OwnedMask {
    /// 全背景掩膜.
    #[inline]
    pub fn zeros(shape: Idx2d) -> Self {
        Self {
            data: Array2::from_elem(shape, MASK_BACKGROUND),
        }
    }

    /// 由谓词构建: `f(pos)` 为真的位置是前景.
    pub fn from_fn(shape: Idx2d, mut f: impl FnMut(Idx2d) -> bool) -> Self {
        Self {
            data: Array2::from_shape_fn(shape, |pos| {
                if f(pos) {
                    MASK_FOREGROUND
                } else {
                    MASK_BACKGROUND
                }
            }),
        }
    }

    /// 由任意 `u8` 数组构建. 非零值视为前景.
    pub fn from_raw(mut data: Array2<u8>) -> Self {
        data.mapv_inplace(|v| if v == 0 { MASK_BACKGROUND } else { MASK_FOREGROUND });
        Self { data }
    }

    /// 图像的分辨率 (高, 宽).
    #[inline]
    pub fn shape(&self) -> Idx2d {
        self.data.dim()
    }

    /// 获得不可变切片引用.
    #[inline]
    pub fn as_immut(&self) -> MaskSlice<'_> {
        MaskSlice::new(self.data.view())
    }

    /// 获得可变切片引用.
    #[inline]
    pub fn as_mutable(&mut self) -> MaskSliceMut<'_> {
        MaskSliceMut::new(self.data.view_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::{IntensitySlice, OwnedMask};
    use crate::consts::gray::*;
    use ndarray::{array, Array2};

    fn mask_from(rows: &[&str]) -> OwnedMask {
        let h = rows.len();
        let w = rows[0].len();
        OwnedMask::from_fn((h, w), |(y, x)| rows[y].as_bytes()[x] == b'#')
    }

    #[test]
    fn test_areas_are_4_connected() {
        let mask = mask_from(&[
            "##...", //
            "##..#", //
            "...#.", //
            ".....", //
        ]);
        let areas = mask.as_immut().foreground_areas();
        // 对角相邻不连通.
        assert_eq!(areas.len(), 3);
        assert_eq!(areas[0].len(), 4);
        assert_eq!(areas[1], vec![(1, 4)]);
        assert_eq!(areas[2], vec![(2, 3)]);
    }

    #[test]
    fn test_neighbours_in_bounds() {
        let mask = OwnedMask::zeros((3, 4));
        let s = mask.as_immut();
        assert_eq!(s.n4_positions((0, 0)).len(), 2);
        assert_eq!(s.n4_positions((2, 3)).len(), 2);
        assert_eq!(s.n4_positions((1, 1)).len(), 4);
        assert!(s.is_background());
    }

    #[test]
    fn test_from_raw_and_intersection() {
        let mut a = OwnedMask::from_raw(array![[0, 1, 7], [3, 0, 255]]);
        assert_eq!(a.as_immut().count_foreground(), 4);
        assert!(a.as_immut().iter().all(|&v| v == MASK_BACKGROUND || v == MASK_FOREGROUND));

        let b = OwnedMask::from_raw(array![[1, 1, 0], [0, 0, 1]]);
        let cleared = a.as_mutable().and_assign(&b.as_immut());
        assert_eq!(cleared, 2);
        assert_eq!(a.as_immut().foreground_pos::<Vec<_>>(), vec![(0, 1), (1, 2)]);
    }

    #[test]
    fn test_intensity_min_max() {
        let data: Array2<f32> = array![[1.0, f32::NAN], [-2.0, 5.0]];
        let s = IntensitySlice::from(data.view());
        assert_eq!(s.finite_min_max(), Some((-2.0, 5.0)));
        let samples: Vec<f32> = s.samples_at([(0, 0), (1, 1)]).collect();
        assert_eq!(samples, vec![1.0, 5.0]);

        let nan = Array2::from_elem((2, 2), f32::NAN);
        assert_eq!(IntensitySlice::from(nan.view()).finite_min_max(), None);
    }
}
