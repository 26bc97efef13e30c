//! 定量汇总: 2D 细胞核测量, 3D 标记物体积, 以及只追加的结果表.

mod nuclei;
mod table;
mod volume;

pub use nuclei::{ChannelStats, NucleusMeasurement};
pub use table::{Cell, MeasurementRow, ResultsTable};
pub use volume::{
    assumed_cell_volume, proportion, summarize, Marker, MarkerMeasurement, MarkerVolume,
};
