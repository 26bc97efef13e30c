//! 强度图像滤波: 可分离高斯模糊, 高斯差分, 对数变换.
//!
//! 所有函数都返回新数组或只修改调用者独占的工作缓冲区,
//! 原始采集数据永远不会被修改.

mod gaussian;
mod transform;

pub use gaussian::{
    difference_of_gaussians, gaussian_blur_2d, gaussian_blur_3d, gaussian_kernel_1d,
};

pub use transform::log_transform;
