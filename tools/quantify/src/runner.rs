//! 程序运行函数.

use crate::result::Report;
use clap::{Parser, ValueEnum};
use fluo_berry::prelude::*;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

/// 流水线类型.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum Pipeline {
    /// 2D 细胞核分割与强度统计.
    Nuclei,
    /// 3D 多通道阳性体积.
    Volume,
}

#[derive(Parser, Debug)]
#[command(name = "quantify")]
#[command(about = "Fluorescence nucleus / organoid volume quantification")]
#[command(version)]
pub struct Args {
    /// Input stack (.npy, (c, z, h, w) or (c, h, w))
    #[arg(short, long, env = "FLUO_BERRY_STACK")]
    pub input: PathBuf,

    /// Pipeline to run
    #[arg(short, long, value_enum, default_value_t = Pipeline::Nuclei)]
    pub pipeline: Pipeline,

    /// Pixel width
    #[arg(long, value_name = "LENGTH")]
    pub pixel_width: f64,

    /// Pixel height (default: pixel width)
    #[arg(long, value_name = "LENGTH")]
    pub pixel_height: Option<f64>,

    /// Distance between adjacent z slices
    #[arg(long, value_name = "LENGTH", default_value_t = 1.0)]
    pub voxel_depth: f64,

    /// Length unit of the calibration
    #[arg(long, default_value = "µm")]
    pub unit: String,

    /// Image title (default: file stem of the input)
    #[arg(long)]
    pub title: Option<String>,

    /// Reference (nucleus) channel, 1-based
    #[arg(long, default_value_t = 1)]
    pub reference: usize,

    /// Z slice processed by the nucleus pipeline, 0-based
    #[arg(short, long, default_value_t = 0)]
    pub z: usize,

    /// Threshold method of the nucleus pipeline (otsu, triangle, maxentropy)
    #[arg(long, default_value = "otsu")]
    pub method: ThresholdMethod,

    /// Watershed maxima tolerance
    #[arg(long, default_value_t = 0.9)]
    pub tolerance: f32,

    /// Minimum nucleus area
    #[arg(long, default_value_t = 120.0)]
    pub min_area: f64,

    /// Maximum nucleus area
    #[arg(long, default_value_t = 600.0)]
    pub max_area: f64,

    /// Assumed cell radius for the cell count estimate
    #[arg(long, default_value_t = 5.0)]
    pub cell_radius: f64,

    /// Directory for overlay PNGs
    #[arg(long, value_name = "DIR")]
    pub overlay: Option<PathBuf>,

    /// Directory for the binary masks of every processed slice
    #[arg(long, value_name = "DIR")]
    pub debug_masks: Option<PathBuf>,

    /// Output TSV file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print debug logs
    #[arg(short, long)]
    pub verbose: bool,
}

/// 实际运行.
pub fn run(args: &Args) -> Result<Report, Box<dyn Error>> {
    let calibration = Calibration::new(
        args.pixel_width,
        args.pixel_height.unwrap_or(args.pixel_width),
        args.voxel_depth,
        args.unit.as_str(),
    )?;
    let title = match &args.title {
        Some(t) => t.clone(),
        None => file_stem(&args.input),
    };
    let stack = Hyperstack::open_npy(&args.input, calibration, title)?;
    log::info!(
        "loaded `{}`: {} channel(s), {} slice(s), {}×{}",
        stack.title(),
        stack.n_channels(),
        stack.n_slices(),
        stack.slice_shape().1,
        stack.slice_shape().0,
    );

    let table = match args.pipeline {
        Pipeline::Nuclei => {
            let config = NucleiConfig {
                reference_channel: args.reference.saturating_sub(1),
                z_index: args.z,
                method: args.method,
                tolerance: args.tolerance,
                filter: AreaFilter {
                    min_area: args.min_area,
                    max_area: args.max_area,
                    exclude_edges: true,
                },
                ..Default::default()
            };
            let out = run_nuclei(&stack, &config)?;
            if let Some(dir) = args.overlay.as_deref() {
                let base = stack.channel_slice(config.reference_channel, config.z_index);
                save_overlay(&out.overlay, &base, config.z_index, dir, stack.title())?;
            }
            if let Some(dir) = args.debug_masks.as_deref() {
                fs::create_dir_all(dir)?;
                let z = config.z_index;
                let base = stack.channel_slice(config.reference_channel, z);
                base.save(dir.join(format!("{}_z{z}_input.png", stack.title())))?;
                out.mask
                    .as_immut()
                    .save(dir.join(format!("{}_z{z}_mask.png", stack.title())))?;
                log::debug!("nucleus mask written to {}", dir.display());
            }
            out.table
        }
        Pipeline::Volume => {
            let config = VolumeConfig {
                cell_radius: args.cell_radius,
                ..Default::default()
            };
            let out = run_volume(&stack, &config)?;
            if let Some(dir) = args.overlay.as_deref() {
                for z in 0..stack.n_slices() {
                    let base = stack.channel_slice(0, z);
                    save_overlay(&out.overlay, &base, z, dir, stack.title())?;
                }
            }
            if let Some(dir) = args.debug_masks.as_deref() {
                fs::create_dir_all(dir)?;
                for (marker, mask) in &out.masks {
                    for (z, slice) in mask.slice_iter().enumerate() {
                        let name = format!("{}_{}_z{z}.png", stack.title(), mask_file_tag(marker));
                        slice.save(dir.join(name))?;
                    }
                }
                log::debug!("{} marker mask(s) written to {}", out.masks.len(), dir.display());
            }
            out.table
        }
    };

    Ok(Report::new(stack.title(), table))
}

/// 把第 `z` 层的叠加层写入 `dir/<title>_z<z>.png`.
fn save_overlay(
    overlay: &Overlay,
    base: &IntensitySlice,
    z: usize,
    dir: &Path,
    title: &str,
) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{title}_z{z}.png"));
    overlay.save(base, z, &path)?;
    log::debug!("overlay written to {}", path.display());
    Ok(())
}

/// 掩膜文件名中的标记物部分: `C1`, `C2_C3`.
fn mask_file_tag(marker: &Marker) -> String {
    match *marker {
        Marker::Channel(c) => format!("C{}", c + 1),
        Marker::Intersection(a, b) => format!("C{}_C{}", a + 1, b + 1),
    }
}

#[inline]
fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::{file_stem, mask_file_tag};
    use fluo_berry::prelude::Marker;
    use std::path::Path;

    #[test]
    fn test_mask_file_tag() {
        assert_eq!(mask_file_tag(&Marker::Channel(0)), "C1");
        assert_eq!(mask_file_tag(&Marker::Intersection(1, 2)), "C2_C3");
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem(Path::new("/data/org_5_DAPI.npy")), "org_5_DAPI");
        assert_eq!(file_stem(Path::new("/")), "");
    }
}
