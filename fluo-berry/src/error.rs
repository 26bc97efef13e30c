//! 运行时错误.

use std::path::PathBuf;

use thiserror::Error;

/// 定量流水线的运行时错误.
///
/// 可在局部消化的情况 (退化直方图、空掩膜、没有次级极大值的单个区域)
/// 不会出现在这里.
#[derive(Debug, Error)]
pub enum QuantError {
    /// 图像通道数不足. 在流水线入口检查, 此时尚未产生任何输出.
    #[error("pipeline needs {expected} channel(s) but the image provides {found}")]
    MissingChannelData {
        /// 流水线需要的通道数.
        expected: usize,
        /// 图像实际提供的通道数.
        found: usize,
    },

    /// 参考标记物的阳性体积为零, 比例无定义.
    #[error("reference marker `{reference}` has zero positive volume, proportion of `{marker}` is undefined")]
    ZeroReferenceVolume {
        /// 需要计算比例的标记物.
        marker: String,
        /// 参考标记物.
        reference: String,
    },

    /// 图像没有任何像素.
    #[error("image has no pixels")]
    EmptyImage,

    /// 标定参数不合法 (非正数或非有限值).
    #[error("invalid calibration: {0}")]
    InvalidCalibration(String),

    /// 求交集的通道不在已配置的通道范围内.
    #[error("overlap channels {overlap:?} are not among the {configured} configured channel(s)")]
    InvalidOverlap {
        /// 请求求交集的两个通道 (0 起).
        overlap: (usize, usize),
        /// 已配置的通道数.
        configured: usize,
    },

    /// z 切片索引越界.
    #[error("slice {index} out of range (image has {len} slices)")]
    SliceOutOfRange {
        /// 请求的切片索引.
        index: usize,
        /// 切片总数.
        len: usize,
    },

    /// 数组形状不是 `(c, z, h, w)` 或 `(c, h, w)`.
    #[error("array of shape {found:?} is not a (c, z, h, w) or (c, h, w) stack")]
    ShapeMismatch {
        /// 实际形状.
        found: Vec<usize>,
    },

    /// 读取 npy 文件失败.
    #[error("failed to read npy file '{path}': {source}")]
    ReadNpy {
        /// 文件路径.
        path: PathBuf,
        /// 底层错误.
        source: ndarray_npy::ReadNpyError,
    },

    /// 写入图像失败.
    #[error("failed to write image '{path}': {source}")]
    Image {
        /// 文件路径.
        path: PathBuf,
        /// 底层错误.
        source: image::ImageError,
    },
}

/// 定量流水线运行时结果.
pub type QuantResult<T> = Result<T, QuantError>;
