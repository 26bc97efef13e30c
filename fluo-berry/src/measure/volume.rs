use super::{Cell, MeasurementRow};
use crate::overlay::Colour;
use crate::{CalibrationAttr, MaskVolume, QuantError, QuantResult};
use log::warn;
use std::f64::consts::PI;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 3D 流水线中的标记物.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Marker {
    /// 单个通道 (0 起).
    Channel(usize),

    /// 两个通道掩膜的交集 (0 起).
    Intersection(usize, usize),
}

impl Marker {
    /// 标记物名称: `C<n>` 或 `C<a>∩C<b>`, 编号从 1 开始.
    pub fn name(&self) -> String {
        match *self {
            Self::Channel(c) => format!("C{}", c + 1),
            Self::Intersection(a, b) => format!("C{}∩C{}", a + 1, b + 1),
        }
    }

    /// 叠加层与结果表中使用的颜色.
    pub fn colour(&self) -> Colour {
        match *self {
            Self::Channel(c) => Colour::for_channel(c),
            Self::Intersection(..) => Colour::PURPLE,
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// 一个标记物的阳性体积.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MarkerVolume {
    /// 标记物.
    pub marker: Marker,
    /// 阳性体素个数.
    pub voxel_count: usize,
    /// 阳性体积 = 体素个数 × 体素体积.
    pub volume: f64,
}

impl MarkerVolume {
    /// 统计掩膜中的前景体素.
    pub fn from_mask<C: CalibrationAttr>(marker: Marker, mask: &MaskVolume, cal: &C) -> Self {
        Self::from_count(marker, mask.count_foreground(), cal)
    }

    /// 由体素个数构建.
    pub fn from_count<C: CalibrationAttr>(marker: Marker, voxel_count: usize, cal: &C) -> Self {
        Self {
            marker,
            voxel_count,
            volume: voxel_count as f64 * cal.voxel_volume(),
        }
    }
}

/// 单个细胞的假定体积: 半径为 `radius` 的球体, `(4/3)·π·r³`.
#[inline]
pub fn assumed_cell_volume(radius: f64) -> f64 {
    4.0 / 3.0 * PI * radius.powi(3)
}

/// `marker` 相对 `reference` 的体积比例.
///
/// 参考体积为零时返回 [`QuantError::ZeroReferenceVolume`], 而不是 NaN 或无穷.
pub fn proportion(marker: &MarkerVolume, reference: &MarkerVolume) -> QuantResult<f64> {
    if reference.volume > 0.0 {
        Ok(marker.volume / reference.volume)
    } else {
        Err(QuantError::ZeroReferenceVolume {
            marker: marker.marker.name(),
            reference: reference.marker.name(),
        })
    }
}

/// 一个标记物的最终测量结果.
#[derive(Debug)]
pub struct MarkerMeasurement {
    /// 标记物.
    pub marker: Marker,
    /// 阳性体积.
    pub volume: f64,
    /// 相对参考标记物的体积比例.
    pub proportion: QuantResult<f64>,
    /// 估计细胞数 = 体积 / 单细胞假定体积. 与参考标记物无关.
    pub cell_count: f64,
}

impl MarkerMeasurement {
    /// 转化为结果表中的一行. 体积列名带有单位, 如 `+ve Volume (µm³)`.
    pub fn to_row(&self, image: &str, unit: &str) -> MeasurementRow {
        let proportion = match &self.proportion {
            Ok(p) => Cell::Number(*p),
            Err(_) => Cell::Undefined,
        };
        MeasurementRow::new()
            .with("Image", image)
            .with("Marker", self.marker.name())
            .with("Colour", self.marker.colour().name())
            .with(format!("+ve Volume ({unit}³)"), self.volume)
            .with("+ve Proportion", proportion)
            .with("Estimated Cell Count", self.cell_count)
    }
}

/// 汇总所有标记物: 比例相对于 `reference`, 细胞数以 `cell_radius` 估计.
///
/// 参考标记物不在 `volumes` 中时视为体积为零. 比例无定义时记录一条警告.
pub fn summarize(
    volumes: &[MarkerVolume],
    reference: Marker,
    cell_radius: f64,
) -> Vec<MarkerMeasurement> {
    let reference = volumes
        .iter()
        .find(|v| v.marker == reference)
        .cloned()
        .unwrap_or(MarkerVolume {
            marker: reference,
            voxel_count: 0,
            volume: 0.0,
        });
    let cell_volume = assumed_cell_volume(cell_radius);

    volumes
        .iter()
        .map(|v| {
            let proportion = proportion(v, &reference);
            if let Err(e) = &proportion {
                warn!("{e}");
            }
            MarkerMeasurement {
                marker: v.marker,
                volume: v.volume,
                proportion,
                cell_count: v.volume / cell_volume,
            }
        })
        .collect()
}
