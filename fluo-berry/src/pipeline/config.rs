//! 流水线参数. 物理量均以标定单位 (默认 µm) 表示.

use crate::consts::defaults::*;
use crate::measure::Marker;
use crate::region::AreaFilter;
use crate::threshold::ThresholdMethod;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 2D 细胞核流水线参数.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NucleiConfig {
    /// 用于分割的参考通道 (0 起). 该通道不参与强度统计.
    pub reference_channel: usize,
    /// 处理的 z 层.
    pub z_index: usize,
    /// 高斯差分的平滑尺度.
    pub sigma: f64,
    /// 背景尺度相对于 `sigma` 的倍数.
    pub background_k: f64,
    /// 阈值方法.
    pub method: ThresholdMethod,
    /// 分水岭极大值容差.
    pub tolerance: f32,
    /// 细胞核接受条件.
    pub filter: AreaFilter,
    /// 直方图 bin 个数.
    pub bins: usize,
}

impl Default for NucleiConfig {
    fn default() -> Self {
        Self {
            reference_channel: 0,
            z_index: 0,
            sigma: NUCLEI_SIGMA_UM,
            background_k: BACKGROUND_K,
            method: ThresholdMethod::Otsu,
            tolerance: WATERSHED_TOLERANCE,
            filter: AreaFilter::default(),
            bins: HISTOGRAM_BINS,
        }
    }
}

/// 单个通道在 3D 流水线中的处理方式.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChannelSpec {
    /// 阈值方法.
    pub method: ThresholdMethod,
    /// 模糊之后、建立直方图之前是否做对数变换.
    pub log_transform: bool,
}

impl ChannelSpec {
    /// 不做对数变换的通道.
    #[inline]
    pub const fn plain(method: ThresholdMethod) -> Self {
        Self {
            method,
            log_transform: false,
        }
    }

    /// 做对数变换的通道.
    #[inline]
    pub const fn logarithmic(method: ThresholdMethod) -> Self {
        Self {
            method,
            log_transform: true,
        }
    }
}

/// 3D 体积流水线参数.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VolumeConfig {
    /// 3D 高斯模糊尺度.
    pub sigma: f64,
    /// 依次对应通道 0, 1, ... 的处理方式. 通道个数即为所需的最少通道数.
    pub channels: Vec<ChannelSpec>,
    /// 求交集的两个通道 (0 起). `None` 表示不计算交集.
    pub overlap: Option<(usize, usize)>,
    /// 比例的参考标记物.
    pub reference: Marker,
    /// 估计细胞数所用的单细胞半径.
    pub cell_radius: f64,
    /// 直方图 bin 个数.
    pub bins: usize,
}

impl Default for VolumeConfig {
    fn default() -> Self {
        use ThresholdMethod::*;
        Self {
            sigma: VOLUME_SIGMA_UM,
            channels: vec![
                ChannelSpec::plain(Triangle),
                ChannelSpec::logarithmic(MaxEntropy),
                ChannelSpec::plain(Otsu),
                ChannelSpec::plain(Triangle),
            ],
            overlap: Some((1, 2)),
            reference: Marker::Channel(0),
            cell_radius: CELL_RADIUS_UM,
            bins: HISTOGRAM_BINS,
        }
    }
}

impl VolumeConfig {
    /// 所有输出的标记物: 各通道, 之后是交集 (若有).
    pub fn markers(&self) -> Vec<Marker> {
        (0..self.channels.len())
            .map(Marker::Channel)
            .chain(self.overlap.map(|(a, b)| Marker::Intersection(a, b)))
            .collect()
    }
}
