//! 2D 细胞核流水线.

use super::NucleiConfig;
use crate::filter::difference_of_gaussians;
use crate::measure::{NucleusMeasurement, ResultsTable};
use crate::morph::binarize;
use crate::overlay::{Annotation, Colour, Overlay};
use crate::region::extract_regions;
use crate::threshold::auto_threshold;
use crate::{CalibrationAttr, Hyperstack, OwnedMask, QuantResult};
use log::{debug, info};

/// 2D 细胞核流水线的输出.
#[derive(Debug)]
pub struct NucleiOutput {
    /// 每个保留的细胞核一行, 按提取顺序.
    pub table: ResultsTable,
    /// 保留细胞核的轮廓与编号.
    pub overlay: Overlay,
    /// 与 `table` 一一对应的类型化测量结果.
    pub measurements: Vec<NucleusMeasurement>,
    /// 空洞填充和分水岭之后的掩膜 (过滤之前).
    pub mask: OwnedMask,
    /// 在增强图像上求得的阈值.
    pub threshold: f32,
}

/// 在 `stack` 的参考通道上分割细胞核, 并统计其余通道的强度.
///
/// 处理流程: 高斯差分, 自动阈值, 空洞填充, 分水岭拆分, 4-连通区域提取,
/// 按面积与边缘过滤, 最后在原始切片上测量.
///
/// 参考通道或 z 层不存在时返回 `Err`, 此时不会产生任何输出.
pub fn run_nuclei(stack: &Hyperstack, config: &NucleiConfig) -> QuantResult<NucleiOutput> {
    stack.require_channels(config.reference_channel + 1)?;
    stack.require_slice(config.z_index)?;

    let raw = stack.channel_slice(config.reference_channel, config.z_index);
    let sigma = stack.to_pixels_x(config.sigma) as f32;
    let enhanced = difference_of_gaussians(raw.data(), sigma, config.background_k as f32);

    let threshold = auto_threshold(enhanced.iter().copied(), config.bins, config.method);
    info!("nuclei: {} threshold {threshold:.4}", config.method);

    let mut mask = binarize(enhanced.view(), threshold);
    drop(enhanced);
    let filled = mask.as_mutable().fill_holes();
    let basins = mask.as_mutable().watershed(config.tolerance);
    debug!("nuclei: {filled} hole pixels filled, {basins} watershed basins");

    let regions = extract_regions(&mask.as_immut());
    let found = regions.len();

    let title = stack.title();
    let mut table = ResultsTable::new();
    let mut overlay = Overlay::new();
    let measurements: Vec<_> = regions
        .iter()
        .filter(|r| config.filter.accepts(r, stack))
        .enumerate()
        .map(|(index, region)| {
            overlay.push(Annotation::nucleus(
                region,
                index,
                Colour::MAGENTA,
                Colour::CYAN,
            ));
            let m = NucleusMeasurement::measure(
                index,
                region,
                stack,
                config.z_index,
                config.reference_channel,
            );
            table.push_row(m.to_row(title));
            m
        })
        .collect();
    info!("nuclei: kept {} of {found} regions", measurements.len());

    Ok(NucleiOutput {
        table,
        overlay,
        measurements,
        mask,
        threshold,
    })
}
