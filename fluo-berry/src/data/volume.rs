//! 3D 二值掩膜.

use crate::consts::gray::*;
use crate::{Idx2d, Idx3d, MaskSlice, MaskSliceMut, OwnedMask};
use ndarray::{Array3, ArrayView3, ArrayViewMut3, Axis, Zip};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 按 `(z, h, w)` 组织的 3D 二值掩膜. 每个 z 层都可以作为 [`MaskSlice`] 访问.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MaskVolume {
    data: Array3<u8>,
}

impl MaskVolume {
    /// 全背景掩膜.
    #[inline]
    pub fn zeros(shape: Idx3d) -> Self {
        Self {
            data: Array3::from_elem(shape, MASK_BACKGROUND),
        }
    }

    /// 由一组形状相同的 2D 掩膜按 z 顺序堆叠.
    ///
    /// `slices` 为空时得到 `(0, 0, 0)` 的掩膜; 形状不一致时 panic.
    pub fn from_slices(slices: &[OwnedMask]) -> Self {
        let (h, w) = slices.first().map_or((0, 0), OwnedMask::shape);
        let mut vol = Self::zeros((slices.len(), h, w));
        for (mut dst, src) in vol.slice_iter_mut().zip(slices) {
            assert_eq!(src.shape(), (h, w), "切片形状不符");
            dst.array_view_mut().assign(&src.as_immut().array_view());
        }
        vol
    }

    /// 数据形状 `(z, h, w)`.
    #[inline]
    pub fn shape(&self) -> Idx3d {
        self.data.dim()
    }

    /// 水平切片形状 `(h, w)`.
    #[inline]
    pub fn slice_shape(&self) -> Idx2d {
        let (_, h, w) = self.shape();
        (h, w)
    }

    /// z 切片个数.
    #[inline]
    pub fn len_z(&self) -> usize {
        self.shape().0
    }

    /// 获取第 `z_index` 层的不可变切片. 越界时 panic.
    #[inline]
    pub fn slice_at(&self, z_index: usize) -> MaskSlice<'_> {
        MaskSlice::new(self.data.index_axis(Axis(0), z_index))
    }

    /// 获取第 `z_index` 层的可变切片. 越界时 panic.
    #[inline]
    pub fn slice_at_mut(&mut self, z_index: usize) -> MaskSliceMut<'_> {
        MaskSliceMut::new(self.data.index_axis_mut(Axis(0), z_index))
    }

    /// 获取能按升序迭代水平切片的迭代器.
    #[inline]
    pub fn slice_iter(&self) -> impl ExactSizeIterator<Item = MaskSlice> {
        self.data.axis_iter(Axis(0)).map(MaskSlice::new)
    }

    /// 获取能按升序迭代水平可变切片的迭代器.
    #[inline]
    pub fn slice_iter_mut(&mut self) -> impl ExactSizeIterator<Item = MaskSliceMut> {
        self.data.axis_iter_mut(Axis(0)).map(MaskSliceMut::new)
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView3<'_, u8> {
        self.data.view()
    }

    /// 获得数据的一份可变 shallow copy.
    #[inline]
    pub fn data_mut(&mut self) -> ArrayViewMut3<'_, u8> {
        self.data.view_mut()
    }

    /// 前景体素个数.
    #[inline]
    pub fn count_foreground(&self) -> usize {
        self.data.iter().filter(|&&p| is_foreground(p)).count()
    }

    /// 逐体素求交, 得到新的掩膜: 当且仅当两者都为前景时结果为前景.
    ///
    /// 形状不一致时 panic.
    pub fn intersect(&self, other: &MaskVolume) -> MaskVolume {
        assert_eq!(self.shape(), other.shape(), "掩膜形状不符");
        let data = Zip::from(&self.data)
            .and(&other.data)
            .map_collect(|&a, &b| {
                if is_foreground(a) && is_foreground(b) {
                    MASK_FOREGROUND
                } else {
                    MASK_BACKGROUND
                }
            });
        Self { data }
    }
}
