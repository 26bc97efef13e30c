//! 3D 体积流水线.

use super::{ChannelSpec, VolumeConfig};
use crate::filter::{gaussian_blur_3d, log_transform};
use crate::measure::{summarize, Marker, MarkerMeasurement, MarkerVolume, ResultsTable};
use crate::morph::binarize_volume;
use crate::overlay::{Annotation, Overlay};
use crate::region::extract_regions_3d;
use crate::threshold::auto_threshold;
use crate::{CalibrationAttr, Hyperstack, MaskVolume, QuantError, QuantResult};
use log::{debug, info};
use ndarray::ArrayView3;

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::iter::{IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator};
    }
}

/// 3D 体积流水线的输出.
#[derive(Debug)]
pub struct VolumeOutput {
    /// 每个标记物一行: 各通道, 之后是交集.
    pub table: ResultsTable,
    /// 每个标记物在每一层上的连通分量轮廓.
    pub overlay: Overlay,
    /// 各标记物的阳性掩膜, 与 `table` 同序.
    pub masks: Vec<(Marker, MaskVolume)>,
    /// 与 `table` 一一对应的类型化测量结果.
    pub measurements: Vec<MarkerMeasurement>,
    /// 各通道的阈值 (在模糊/变换之后的采样值空间中).
    pub thresholds: Vec<f32>,
}

/// 单个通道的 3D 阈值掩膜: 模糊, 可选的对数变换, 整个栈一张直方图, 逐层二值化.
///
/// `data` 按 `(z, h, w)` 组织, 不会被修改. 返回 `(阈值, 掩膜)`.
pub fn channel_mask(
    data: ArrayView3<f32>,
    spec: &ChannelSpec,
    sigma_xy: f32,
    sigma_z: f32,
    bins: usize,
) -> (f32, MaskVolume) {
    let mut work = gaussian_blur_3d(data, sigma_xy, sigma_z);
    if spec.log_transform {
        log_transform(&mut work);
    }
    let threshold = auto_threshold(work.iter().copied(), bins, spec.method);
    (threshold, binarize_volume(work.view(), threshold))
}

/// 借助 `rayon` 并行计算各通道掩膜. 每个通道只读取自己的数据.
#[cfg(feature = "rayon")]
fn all_channel_masks(
    stack: &Hyperstack,
    config: &VolumeConfig,
    sigma_xy: f32,
    sigma_z: f32,
) -> Vec<(f32, MaskVolume)> {
    config
        .channels
        .par_iter()
        .enumerate()
        .map(|(c, spec)| channel_mask(stack.channel_volume(c), spec, sigma_xy, sigma_z, config.bins))
        .collect()
}

#[cfg(not(feature = "rayon"))]
fn all_channel_masks(
    stack: &Hyperstack,
    config: &VolumeConfig,
    sigma_xy: f32,
    sigma_z: f32,
) -> Vec<(f32, MaskVolume)> {
    config
        .channels
        .iter()
        .enumerate()
        .map(|(c, spec)| channel_mask(stack.channel_volume(c), spec, sigma_xy, sigma_z, config.bins))
        .collect()
}

/// 在 `stack` 的全部 z 层上为每个通道求阳性掩膜, 再求两个通道的交集,
/// 最后汇总体积、比例与估计细胞数.
///
/// 结果表的 `Image` 列为由标题推导出的样本标签 (见 [`Hyperstack::sample_label`]).
/// 通道数少于 `config.channels`, 或 `config.overlap` 引用了未配置的通道时返回 `Err`,
/// 此时不会产生任何输出.
pub fn run_volume(stack: &Hyperstack, config: &VolumeConfig) -> QuantResult<VolumeOutput> {
    stack.require_channels(config.channels.len())?;
    if let Some((a, b)) = config.overlap {
        let configured = config.channels.len();
        if a >= configured || b >= configured {
            return Err(QuantError::InvalidOverlap {
                overlap: (a, b),
                configured,
            });
        }
    }

    let sigma_xy = stack.to_pixels_x(config.sigma) as f32;
    let sigma_z = stack.to_pixels_z(config.sigma) as f32;
    debug!("volume: sigma {sigma_xy:.3} px (xy), {sigma_z:.3} slices (z)");

    let (thresholds, mut masks): (Vec<_>, Vec<_>) = all_channel_masks(stack, config, sigma_xy, sigma_z)
        .into_iter()
        .enumerate()
        .map(|(c, (thr, mask))| {
            info!(
                "volume: C{} {} threshold {thr:.4}",
                c + 1,
                config.channels[c].method
            );
            (thr, (Marker::Channel(c), mask))
        })
        .unzip();

    if let Some((a, b)) = config.overlap {
        let both = masks[a].1.intersect(&masks[b].1);
        masks.push((Marker::Intersection(a, b), both));
    }

    let mut overlay = Overlay::new();
    let volumes: Vec<_> = masks
        .iter()
        .map(|(marker, mask)| {
            let regions = extract_regions_3d(mask);
            let colour = marker.colour();
            regions
                .iter()
                .for_each(|r| overlay.push(Annotation::outline_of(r, colour)));
            let v = MarkerVolume::from_mask(*marker, mask, stack);
            info!(
                "volume: {marker} {} voxels in {} components, {:.3} {}³",
                v.voxel_count,
                regions.len(),
                v.volume,
                stack.unit()
            );
            v
        })
        .collect();

    let measurements = summarize(&volumes, config.reference, config.cell_radius);
    let label = stack.sample_label();
    let mut table = ResultsTable::new();
    for m in measurements.iter() {
        table.push_row(m.to_row(&label, stack.unit()));
    }

    Ok(VolumeOutput {
        table,
        overlay,
        masks,
        measurements,
        thresholds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::{assumed_cell_volume, Cell};
    use crate::overlay::Colour;
    use crate::threshold::ThresholdMethod;
    use crate::Calibration;
    use ndarray::{s, Array4, Axis};

    type Cube = ((usize, usize), (usize, usize), (usize, usize));

    /// 每个通道一个实心长方体, 内部 100, 外部 0.
    fn cube_stack(title: &str, cubes: &[Cube]) -> Hyperstack {
        let mut data = Array4::<f32>::zeros((cubes.len(), 6, 32, 32));
        for (c, &((z0, z1), (h0, h1), (w0, w1))) in cubes.iter().enumerate() {
            data.slice_mut(s![c, z0..z1, h0..h1, w0..w1]).fill(100.0);
        }
        let cal = Calibration::micron(0.5, 0.5, 2.0).unwrap();
        Hyperstack::new(title, cal, data).unwrap()
    }

    const C1: Cube = ((1, 5), (4, 28), (4, 28));
    const C2: Cube = ((2, 4), (8, 16), (8, 16));
    const C4: Cube = ((1, 3), (20, 24), (20, 24));

    fn unblurred(method: ThresholdMethod) -> VolumeConfig {
        VolumeConfig {
            sigma: 0.0,
            channels: vec![ChannelSpec::plain(method); 4],
            ..Default::default()
        }
    }

    fn volume_of(out: &VolumeOutput, marker: Marker) -> f64 {
        out.measurements
            .iter()
            .find(|m| m.marker == marker)
            .map(|m| m.volume)
            .unwrap()
    }

    #[test]
    fn test_identical_channels() {
        let stack = cube_stack("org_7_DAPI", &[C1, C2, C2, C4]);
        let out = run_volume(&stack, &unblurred(ThresholdMethod::Otsu)).unwrap();
        assert_eq!(out.table.len(), 5);

        assert_eq!(volume_of(&out, Marker::Channel(0)), 2304.0 * 0.5);
        let c2 = volume_of(&out, Marker::Channel(1));
        assert_eq!(c2, 64.0);
        assert_eq!(volume_of(&out, Marker::Channel(2)), c2);
        assert_eq!(volume_of(&out, Marker::Intersection(1, 2)), c2);

        let both = &out.measurements[4];
        assert_eq!(*both.proportion.as_ref().unwrap(), 64.0 / 1152.0);
        assert!((both.cell_count - 64.0 / assumed_cell_volume(5.0)).abs() < 1e-9);
        assert_eq!(*out.measurements[0].proportion.as_ref().unwrap(), 1.0);

        let row = &out.table.rows()[4];
        assert_eq!(row.get("Image").and_then(Cell::as_text), Some("hG-7"));
        assert_eq!(row.get("Marker").and_then(Cell::as_text), Some("C2∩C3"));
        assert_eq!(row.get("Colour").and_then(Cell::as_text), Some("Purple"));
        assert_eq!(row.get("+ve Volume (µm³)"), Some(&Cell::Number(64.0)));

        // 每层一个连通分量.
        let purple: Vec<_> = out
            .overlay
            .annotations()
            .iter()
            .filter(|a| a.colour == Colour::PURPLE)
            .map(|a| a.z)
            .collect();
        assert_eq!(purple, [Some(2), Some(3)]);
        assert_eq!(out.overlay.len(), 4 + 2 + 2 + 2 + 2);
    }

    #[test]
    fn test_slice_order_independent() {
        let stack = cube_stack("org_DAPI", &[C1, C2, C2, C4]);
        let mut flipped = Array4::<f32>::zeros(stack.shape());
        for (c, mut dst) in flipped.axis_iter_mut(Axis(0)).enumerate() {
            dst.assign(&stack.channel_volume(c).slice(s![..;-1, .., ..]));
        }
        let reversed = Hyperstack::new("org_DAPI", stack.calibration().clone(), flipped).unwrap();

        let config = VolumeConfig {
            sigma: 0.0,
            ..Default::default()
        };
        let a = run_volume(&stack, &config).unwrap();
        let b = run_volume(&reversed, &config).unwrap();
        for (x, y) in a.measurements.iter().zip(b.measurements.iter()) {
            assert_eq!(x.marker, y.marker);
            assert_eq!(x.volume, y.volume);
        }
        assert_eq!(a.table.rows()[0].get("Image").and_then(Cell::as_text), Some("hG-?"));
    }

    #[test]
    fn test_zero_reference() {
        // C2 与 C3 不相交, 以交集为参考.
        let c3: Cube = ((2, 4), (20, 28), (20, 28));
        let stack = cube_stack("org", &[C1, C2, c3, C4]);
        let config = VolumeConfig {
            reference: Marker::Intersection(1, 2),
            ..unblurred(ThresholdMethod::Otsu)
        };
        let out = run_volume(&stack, &config).unwrap();
        assert_eq!(volume_of(&out, Marker::Intersection(1, 2)), 0.0);
        for (m, row) in out.measurements.iter().zip(out.table.rows()) {
            assert!(matches!(
                m.proportion,
                Err(QuantError::ZeroReferenceVolume { .. })
            ));
            assert!(m.cell_count.is_finite());
            assert_eq!(row.get("+ve Proportion"), Some(&Cell::Undefined));
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        use rayon::prelude::*;

        let stack = cube_stack("org", &[C1, C2, C2, C4]);
        let spec = ChannelSpec::logarithmic(ThresholdMethod::MaxEntropy);
        let run = |c: usize| channel_mask(stack.channel_volume(c), &spec, 1.5, 0.5, 256);
        let seq: Vec<_> = (0..4).map(run).collect();
        let par: Vec<_> = (0..4usize).into_par_iter().map(run).collect();
        assert_eq!(seq, par);
    }

    #[test]
    fn test_default_methods_on_two_level_stack() {
        // 不模糊, 其余为默认配置: C1 Triangle, C2 取对数后 MaxEntropy, C3 Otsu, C4 Triangle.
        let stack = cube_stack("org_5_DAPI", &[C1, C2, C2, C4]);
        let config = VolumeConfig {
            sigma: 0.0,
            ..Default::default()
        };
        let out = run_volume(&stack, &config).unwrap();
        assert_eq!(volume_of(&out, Marker::Channel(0)), 1152.0);
        assert_eq!(volume_of(&out, Marker::Channel(1)), 64.0);
        assert_eq!(volume_of(&out, Marker::Channel(2)), 64.0);
        assert_eq!(volume_of(&out, Marker::Channel(3)), 16.0);
        assert_eq!(volume_of(&out, Marker::Intersection(1, 2)), 64.0);
        for (marker, mask) in out.masks.iter() {
            assert_eq!(
                mask.count_foreground() as f64 * 0.5,
                volume_of(&out, *marker),
                "{marker}"
            );
        }
    }

    #[test]
    fn test_invalid_overlap() {
        let stack = cube_stack("org", &[C1, C2, C2, C4]);
        let config = VolumeConfig {
            overlap: Some((1, 4)),
            ..Default::default()
        };
        assert!(matches!(
            run_volume(&stack, &config),
            Err(QuantError::InvalidOverlap {
                overlap: (1, 4),
                configured: 4
            })
        ));
    }

    #[test]
    fn test_missing_channels() {
        let stack = cube_stack("org", &[C1, C2]);
        assert!(matches!(
            run_volume(&stack, &VolumeConfig::default()),
            Err(QuantError::MissingChannelData {
                expected: 4,
                found: 2
            })
        ));
    }

    #[test]
    fn test_default_config_smoke() {
        let stack = cube_stack("org_3_DAPI", &[C1, C2, C2, C4]);
        let out = run_volume(&stack, &VolumeConfig::default()).unwrap();
        assert_eq!(out.table.len(), 5);
        assert_eq!(out.thresholds.len(), 4);
        for m in out.measurements.iter().take(4) {
            assert!(m.volume > 0.0);
            assert!(m.cell_count.is_finite());
        }
        assert_eq!(*out.measurements[0].proportion.as_ref().unwrap(), 1.0);
    }
}
