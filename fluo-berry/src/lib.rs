#![warn(missing_docs)] // <= 合适时移除它.
// #![warn(clippy::missing_docs_in_private_items)]  // <= too strict.

//! 核心库. 提供多通道荧光显微图像 (细胞核 / 类器官) 的分割与定量算法.
//!
//! 该 crate 目前仅提供 `safe` 接口. 所有中间缓冲区 (增强图像、掩膜、距离图)
//! 都由一次运行独占, 运行结束后即被丢弃; 原始采集数据永远不会被修改.
//!
//! # 注意
//!
//! 1. 图像的读取 (标定元信息、像素存储) 与结果展示不属于本 crate 的职责.
//!   调用者负责构建 [`Hyperstack`], 本 crate 只读取它.
//! 2. 在非期望情况下 (如索引越界), 程序会直接 panic, 而不会导致内存错误.
//!   对调用者可见的结构性错误 (通道缺失等) 以 [`QuantError`] 返回.
//!
//! # 开发计划
//!
//! ### 滤波核 ✅
//!
//! 可分离高斯模糊 (2D, 3D 各向异性), 高斯差分背景抑制, 对数变换.
//!
//! 实现位于 `fluo-berry/src/filter`.
//!
//! ### 直方图自动阈值 ✅
//!
//! Otsu, Triangle, MaxEntropy 三种方法, 阈值按观测值域线性还原.
//!
//! 实现位于 `fluo-berry/src/threshold`.
//!
//! ### 掩膜清理 ✅
//!
//! 二值化与基于边界泛洪的空洞填充 (迭代实现, 不会爆栈).
//!
//! 实现位于 `fluo-berry/src/morph`.
//!
//! ### 分水岭分割 ✅
//!
//! 欧氏距离图 + 容差局部极大值 + 标记控制的盆地生长, 用于拆分相互接触的细胞核.
//!
//! 实现位于 `fluo-berry/src/watershed`.
//!
//! ### 区域提取与过滤 ✅
//!
//! 4-邻接连通区域, 按物理面积与是否接触图像边缘过滤.
//!
//! 实现位于 `fluo-berry/src/region`.
//!
//! ### 定量汇总 ✅
//!
//! 2D: 每个细胞核的质心、面积、各通道均值/标准差;
//! 3D: 每个标记物的阳性体积、比例与估计细胞数.
//!
//! 实现位于 `fluo-berry/src/measure`.
//!
//! ### 叠加层 ✅
//!
//! 纯数据的轮廓 + 标签, 可选地栅格化为 PNG.
//!
//! 实现位于 `fluo-berry/src/overlay`.
//!
//! ### 流水线 ✅
//!
//! 2D 细胞核流水线与 3D 体积流水线.
//!
//! 实现位于 `fluo-berry/src/pipeline`.

/// 二维索引 (高, 宽), 同时也可一定程度上用作非负整数向量.
pub type Idx2d = (usize, usize);

/// 三维索引 (z, 高, 宽).
pub type Idx3d = (usize, usize, usize);

/// 四维索引 (通道, z, 高, 宽).
pub type Idx4d = (usize, usize, usize, usize);

type Area2d = Vec<Idx2d>;
type Areas2d = Vec<Area2d>;
type Predicate = fn(u8) -> bool;

/// 多通道图像、标定与掩膜等基础数据结构.
mod data;

mod error;

pub use data::{
    Calibration, CalibrationAttr, Hyperstack, ImgWriteVis, IntensitySlice,
    MaskSlice, MaskSliceMut, MaskVolume, OwnedMask,
};

pub use error::{QuantError, QuantResult};

pub mod consts;

pub mod filter;

pub mod threshold;

pub mod morph;

pub mod watershed;

pub mod region;

pub mod measure;

pub mod overlay;

pub mod pipeline;

pub mod prelude;
