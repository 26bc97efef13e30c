//! 通用常量.

/// 单通道掩膜取值.
pub mod gray {
    /// 二值掩膜中, 背景的像素值.
    pub const MASK_BACKGROUND: u8 = 0;

    /// 二值掩膜中, 前景的像素值. 前景总是两者中较大的那个.
    pub const MASK_FOREGROUND: u8 = 255;

    /// 空洞填充过程中, 从图像边缘可达的背景被临时标记为该值.
    pub const MASK_EXTERIOR: u8 = 127;

    /// 单通道黑色.
    pub const BLACK: u8 = 0b_0000_0000;

    /// 单通道白色.
    pub const WHITE: u8 = 0b_1111_1111;

    /// 像素是否是前景?
    #[inline]
    pub const fn is_foreground(p: u8) -> bool {
        matches!(p, MASK_FOREGROUND)
    }

    /// 像素是否是背景?
    #[inline]
    pub const fn is_background(p: u8) -> bool {
        matches!(p, MASK_BACKGROUND)
    }
}

/// 流水线默认参数. 物理量均以微米 (µm) 为单位.
pub mod defaults {
    /// 2D 细胞核流水线的平滑尺度.
    pub const NUCLEI_SIGMA_UM: f64 = 1.0;

    /// 3D 体积流水线的平滑尺度.
    pub const VOLUME_SIGMA_UM: f64 = 3.0;

    /// 高斯差分中背景估计尺度相对于平滑尺度的倍数.
    pub const BACKGROUND_K: f64 = 5.0;

    /// 分水岭局部极大值容差 (距离图单位: 像素).
    pub const WATERSHED_TOLERANCE: f32 = 0.9;

    /// 细胞核最小面积, 单位 µm².
    pub const MIN_NUCLEUS_AREA: f64 = 120.0;

    /// 细胞核最大面积, 单位 µm².
    pub const MAX_NUCLEUS_AREA: f64 = 600.0;

    /// 估计细胞数时使用的单细胞等效半径 (相邻核心距的一半, 包含胞质体积).
    pub const CELL_RADIUS_UM: f64 = 5.0;

    /// 直方图 bin 个数.
    pub const HISTOGRAM_BINS: usize = 256;

    /// 对数变换下限相对于观测值域的比例.
    pub const LOG_EPSILON_RATIO: f32 = 1e-6;

    /// 高斯核半径 = `ceil(GAUSSIAN_TRUNCATE * sigma)`.
    pub const GAUSSIAN_TRUNCATE: f32 = 4.0;

    /// 叠加层中细胞核编号标签的高度 (像素).
    pub const LABEL_HEIGHT_PX: usize = 12;
}

/// 像素类型.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ElemType {
    /// `MASK_BACKGROUND`, 代表背景.
    Background,

    /// `MASK_FOREGROUND`, 代表前景.
    Foreground,
}

impl ElemType {
    /// 给定阈值 `threshold`, 判断采样值 `sample` 的像素类型.
    /// 不小于阈值的采样值为前景, NaN 为背景.
    #[inline]
    pub fn classify(sample: f32, threshold: f32) -> Self {
        if sample >= threshold {
            Self::Foreground
        } else {
            Self::Background
        }
    }

    /// 对应的掩膜像素值.
    #[inline]
    pub const fn mask_value(self) -> u8 {
        match self {
            Self::Background => gray::MASK_BACKGROUND,
            Self::Foreground => gray::MASK_FOREGROUND,
        }
    }
}
