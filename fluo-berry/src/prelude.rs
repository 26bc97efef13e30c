//! 🔬欢迎光临🧫
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::{Idx2d, Idx3d, Idx4d};

pub use crate::{
    Calibration, CalibrationAttr, Hyperstack, ImgWriteVis, IntensitySlice,
    MaskSlice, MaskSliceMut, MaskVolume, OwnedMask, QuantError, QuantResult,
};

pub use crate::consts::gray::{MASK_BACKGROUND, MASK_FOREGROUND};
pub use crate::consts::ElemType;

pub use crate::measure::{Cell, Marker, MarkerMeasurement, NucleusMeasurement, ResultsTable};
pub use crate::overlay::{Colour, Overlay};
pub use crate::pipeline::{
    run_nuclei, run_volume, ChannelSpec, NucleiConfig, NucleiOutput, VolumeConfig, VolumeOutput,
};
pub use crate::region::{AreaFilter, Region};
pub use crate::threshold::{Histogram, ThresholdMethod};
