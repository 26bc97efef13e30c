use std::path::Path;

use ndarray::{s, Array4, ArrayD, ArrayView3, ArrayView4, Axis, Ix4};
use ndarray_npy::read_npy;
use num::ToPrimitive;

use crate::{Idx2d, Idx4d, QuantError, QuantResult};

pub mod slice;
pub mod volume;

pub use slice::{
    ImgWriteVis, IntensitySlice, MaskSlice, MaskSliceMut, OwnedMask,
};

pub use volume::MaskVolume;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 空间标定: 一个像素/体素在 X, Y, Z 方向上的物理尺寸及其单位.
///
/// 该结构是只读的. 所有面积/体积输出都由像素/体素个数乘以相应的标定因子得到.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Calibration {
    pixel_width: f64,
    pixel_height: f64,
    voxel_depth: f64,
    unit: String,
}

impl Calibration {
    /// 构建标定.
    ///
    /// 三个尺寸都必须是有限正数, 否则返回 `Err`.
    pub fn new(
        pixel_width: f64,
        pixel_height: f64,
        voxel_depth: f64,
        unit: impl Into<String>,
    ) -> QuantResult<Self> {
        for (name, v) in [
            ("pixel width", pixel_width),
            ("pixel height", pixel_height),
            ("voxel depth", voxel_depth),
        ] {
            if !(v.is_finite() && v > 0.0) {
                return Err(QuantError::InvalidCalibration(format!(
                    "{name} must be a positive finite number, got {v}"
                )));
            }
        }
        Ok(Self {
            pixel_width,
            pixel_height,
            voxel_depth,
            unit: unit.into(),
        })
    }

    /// 以微米为单位构建标定.
    #[inline]
    pub fn micron(pixel_width: f64, pixel_height: f64, voxel_depth: f64) -> QuantResult<Self> {
        Self::new(pixel_width, pixel_height, voxel_depth, "µm")
    }

    /// 未标定图像: 每个像素 1×1×1 "pixel".
    #[inline]
    pub fn uncalibrated() -> Self {
        Self {
            pixel_width: 1.0,
            pixel_height: 1.0,
            voxel_depth: 1.0,
            unit: "pixel".to_string(),
        }
    }
}

/// 标定的共用属性和部分通用换算.
pub trait CalibrationAttr {
    /// 获取标定本身.
    fn calibration(&self) -> &Calibration;

    /// 像素宽度 (X 方向).
    #[inline]
    fn pixel_width(&self) -> f64 {
        self.calibration().pixel_width
    }

    /// 像素高度 (Y 方向).
    #[inline]
    fn pixel_height(&self) -> f64 {
        self.calibration().pixel_height
    }

    /// 体素深度 (相邻 z 切片的间距).
    #[inline]
    fn voxel_depth(&self) -> f64 {
        self.calibration().voxel_depth
    }

    /// 长度单位.
    #[inline]
    fn unit(&self) -> &str {
        &self.calibration().unit
    }

    /// 单个像素的物理面积.
    #[inline]
    fn pixel_area(&self) -> f64 {
        self.pixel_width() * self.pixel_height()
    }

    /// 单个体素的物理体积.
    #[inline]
    fn voxel_volume(&self) -> f64 {
        self.pixel_area() * self.voxel_depth()
    }

    /// 把物理长度换算为 X 方向像素数.
    #[inline]
    fn to_pixels_x(&self, length: f64) -> f64 {
        length / self.pixel_width()
    }

    /// 把物理长度换算为 z 方向切片数.
    #[inline]
    fn to_pixels_z(&self, length: f64) -> f64 {
        length / self.voxel_depth()
    }
}

impl CalibrationAttr for Calibration {
    #[inline]
    fn calibration(&self) -> &Calibration {
        self
    }
}

/// 多通道、多切片荧光图像, 按 `(c, z, h, w)` 组织, 采样值以 `f32` 保存.
///
/// 该结构模拟宿主图像库提供的 "当前图像 + 标定". 流水线只读取它,
/// 所有处理都在复制出的工作缓冲区上进行.
#[derive(Debug, Clone)]
pub struct Hyperstack {
    title: String,
    calibration: Calibration,
    data: Array4<f32>,
}

impl CalibrationAttr for Hyperstack {
    #[inline]
    fn calibration(&self) -> &Calibration {
        &self.calibration
    }
}

impl Hyperstack {
    /// 由 `(c, z, h, w)` 数组直接构建. 如果数组没有任何像素则返回 `Err`.
    pub fn new(
        title: impl Into<String>,
        calibration: Calibration,
        data: Array4<f32>,
    ) -> QuantResult<Self> {
        if data.is_empty() {
            return Err(QuantError::EmptyImage);
        }
        Ok(Self {
            title: title.into(),
            calibration,
            data,
        })
    }

    /// 由任意数值类型的 `(c, z, h, w)` 数组构建. 无法表示为 `f32` 的值记为 NaN.
    pub fn from_samples<T: ToPrimitive>(
        title: impl Into<String>,
        calibration: Calibration,
        data: ArrayView4<T>,
    ) -> QuantResult<Self> {
        let data = data.map(|v| v.to_f32().unwrap_or(f32::NAN));
        Self::new(title, calibration, data)
    }

    /// 打开 npy 文件格式的图像栈. 数组可以是 `(c, z, h, w)` 或 `(c, h, w)`
    /// (后者视为单切片), 元素类型可以是 `f32`, `u16` 或 `u8`.
    pub fn open_npy<P: AsRef<Path>>(
        path: P,
        calibration: Calibration,
        title: impl Into<String>,
    ) -> QuantResult<Self> {
        let data = read_dyn(path.as_ref())?;
        let data = match data.ndim() {
            4 => data,
            3 => data.insert_axis(Axis(1)),
            _ => {
                return Err(QuantError::ShapeMismatch {
                    found: data.shape().to_vec(),
                })
            }
        };
        let found = data.shape().to_vec();
        let data = data
            .into_dimensionality::<Ix4>()
            .map_err(|_| QuantError::ShapeMismatch { found })?;
        Self::new(title, calibration, data)
    }

    /// 图像标题.
    #[inline]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// 数据形状 `(c, z, h, w)`.
    #[inline]
    pub fn shape(&self) -> Idx4d {
        self.data.dim()
    }

    /// 水平切片形状 `(h, w)`.
    #[inline]
    pub fn slice_shape(&self) -> Idx2d {
        let (_, _, h, w) = self.shape();
        (h, w)
    }

    /// 通道个数.
    #[inline]
    pub fn n_channels(&self) -> usize {
        self.shape().0
    }

    /// z 切片个数.
    #[inline]
    pub fn n_slices(&self) -> usize {
        self.shape().1
    }

    /// 检查图像是否至少有 `expected` 个通道.
    pub fn require_channels(&self, expected: usize) -> QuantResult<()> {
        let found = self.n_channels();
        if found < expected {
            return Err(QuantError::MissingChannelData { expected, found });
        }
        Ok(())
    }

    /// 检查 z 索引是否合法.
    pub fn require_slice(&self, z_index: usize) -> QuantResult<()> {
        let len = self.n_slices();
        if z_index >= len {
            return Err(QuantError::SliceOutOfRange {
                index: z_index,
                len,
            });
        }
        Ok(())
    }

    /// 获取第 `channel` 个通道 (0 起) 在第 `z_index` 层的切片视图.
    ///
    /// 当索引越界时 panic.
    #[inline]
    pub fn channel_slice(&self, channel: usize, z_index: usize) -> IntensitySlice<'_> {
        IntensitySlice::new(self.data.slice(s![channel, z_index, .., ..]))
    }

    /// 获取第 `channel` 个通道 (0 起) 的全部 z 切片, 形状 `(z, h, w)`.
    ///
    /// 当索引越界时 panic.
    #[inline]
    pub fn channel_volume(&self, channel: usize) -> ArrayView3<'_, f32> {
        self.data.index_axis(Axis(0), channel)
    }

    /// 由标题推导出的样本标签.
    ///
    /// 标题中形如 `_<数字>_DAPI` 的片段给出样本编号, 标签为 `hG-<数字>`;
    /// 找不到时为 `hG-?`.
    pub fn sample_label(&self) -> String {
        format!("hG-{}", sample_number(&self.title).unwrap_or("?"))
    }
}

/// 依次尝试以 `f32`, `u16`, `u8` 读取 npy 文件.
fn read_dyn(path: &Path) -> QuantResult<ArrayD<f32>> {
    let err = match read_npy::<_, ArrayD<f32>>(path) {
        Ok(data) => return Ok(data),
        Err(e) => e,
    };
    if let Ok(data) = read_npy::<_, ArrayD<u16>>(path) {
        return Ok(data.mapv(f32::from));
    }
    if let Ok(data) = read_npy::<_, ArrayD<u8>>(path) {
        return Ok(data.mapv(f32::from));
    }
    Err(QuantError::ReadNpy {
        path: path.to_owned(),
        source: err,
    })
}

/// 从标题中提取 `_<数字>_DAPI` 的数字部分.
fn sample_number(title: &str) -> Option<&str> {
    title.match_indices("_DAPI").find_map(|(end, _)| {
        let head = &title[..end];
        let start = head.trim_end_matches(|c: char| c.is_ascii_digit()).len();
        (start < end && head[..start].ends_with('_')).then(|| &head[start..])
    })
}
