//! 流水线编排: 2D 细胞核流水线与 3D 体积流水线.
//!
//! 两条流水线都只读取 [`Hyperstack`](crate::Hyperstack), 所有中间缓冲区在一次运行内创建并丢弃.
//! 结构性前提 (通道数、z 层) 在入口处一次性检查.

mod config;
mod nuclei;
mod volume;

pub use config::{ChannelSpec, NucleiConfig, VolumeConfig};
pub use nuclei::{run_nuclei, NucleiOutput};
pub use volume::{channel_mask, run_volume, VolumeOutput};
