use super::MeasurementRow;
use crate::region::Region;
use crate::{CalibrationAttr, Hyperstack};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 一个通道在某个区域内的强度统计.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChannelStats {
    /// 均值.
    pub mean: f64,
    /// 样本标准差 (n - 1). 只有一个样本时为 0.
    pub std_dev: f64,
}

impl ChannelStats {
    /// 统计所有有限样本. 没有样本时均值与标准差都为 0.
    pub fn from_samples<I: IntoIterator<Item = f32>>(samples: I) -> Self {
        let values: Vec<f64> = samples
            .into_iter()
            .filter(|v| v.is_finite())
            .map(f64::from)
            .collect();
        let n = values.len();
        if n == 0 {
            return Self {
                mean: 0.0,
                std_dev: 0.0,
            };
        }
        let mean = values.iter().sum::<f64>() / n as f64;
        let std_dev = if n > 1 {
            let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
            (ss / (n - 1) as f64).sqrt()
        } else {
            0.0
        };
        Self { mean, std_dev }
    }
}

/// 一个保留下来的细胞核的测量结果.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NucleusMeasurement {
    /// 编号, 从 0 开始, 按区域提取顺序.
    pub index: usize,
    /// 物理坐标下的质心 `(X, Y)`.
    pub centroid: (f64, f64),
    /// 物理面积.
    pub area: f64,
    /// 每个非参考通道 (0 起的通道索引, 统计), 按通道索引升序.
    pub channels: Vec<(usize, ChannelStats)>,
}

impl NucleusMeasurement {
    /// 在原始 (未处理的) 第 `z_index` 层上测量 `region`.
    /// 除 `reference_channel` 外的每个通道都会统计均值和标准差.
    pub fn measure(
        index: usize,
        region: &Region,
        stack: &Hyperstack,
        z_index: usize,
        reference_channel: usize,
    ) -> Self {
        let channels = (0..stack.n_channels())
            .filter(|&c| c != reference_channel)
            .map(|c| {
                let slice = stack.channel_slice(c, z_index);
                let stats = ChannelStats::from_samples(slice.samples_at(region.pixels().iter().copied()));
                (c, stats)
            })
            .collect();
        Self {
            index,
            centroid: region.centroid_xy(stack),
            area: region.area(stack),
            channels,
        }
    }

    /// 转化为结果表中的一行. 通道列名为 `C<n> Mean`, `C<n> StdDev`, `n` 从 1 开始.
    pub fn to_row(&self, image: &str) -> MeasurementRow {
        let mut row = MeasurementRow::new()
            .with("Image", image)
            .with("Nucleus", self.index)
            .with("X", self.centroid.0)
            .with("Y", self.centroid.1)
            .with("Area", self.area);
        for (c, stats) in self.channels.iter() {
            row.push(format!("C{} Mean", c + 1), stats.mean);
            row.push(format!("C{} StdDev", c + 1), stats.std_dev);
        }
        row
    }
}

#[cfg(test)]
mod tests {
    use super::{ChannelStats, NucleusMeasurement};
    use crate::measure::Cell;
    use crate::region::Region;
    use crate::{Calibration, Hyperstack};
    use ndarray::Array4;

    fn float_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_channel_stats() {
        let s = ChannelStats::from_samples([2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!(float_eq(s.mean, 5.0));
        assert!(float_eq(s.std_dev, (32.0f64 / 7.0).sqrt()));

        let one = ChannelStats::from_samples([3.0]);
        assert_eq!((one.mean, one.std_dev), (3.0, 0.0));

        let none = ChannelStats::from_samples([f32::NAN]);
        assert_eq!((none.mean, none.std_dev), (0.0, 0.0));
    }

    #[test]
    fn test_measure_row() {
        // 3 通道, 第 1 通道 (索引 0) 为参考通道.
        let data = Array4::from_shape_fn((3, 1, 4, 4), |(c, _, h, w)| (c * 100 + h * 4 + w) as f32);
        let cal = Calibration::micron(0.5, 0.5, 1.0).unwrap();
        let stack = Hyperstack::new("img", cal, data).unwrap();
        let region = Region::new(vec![(1, 1), (1, 2)], (4, 4), None);

        let m = NucleusMeasurement::measure(7, &region, &stack, 0, 0);
        assert_eq!(m.channels.len(), 2);
        assert_eq!(m.channels[0].0, 1);
        assert!(float_eq(m.channels[0].1.mean, 105.5));
        assert!(float_eq(m.channels[1].1.std_dev, 0.5f64.sqrt()));
        assert!(float_eq(m.area, 0.5));

        let row = m.to_row("img");
        let columns: Vec<&str> = row.iter().map(|(c, _)| c).collect();
        assert_eq!(
            columns,
            ["Image", "Nucleus", "X", "Y", "Area", "C2 Mean", "C2 StdDev", "C3 Mean", "C3 StdDev"]
        );
        assert_eq!(row.get("Nucleus"), Some(&Cell::Integer(7)));
        assert!(float_eq(row.get("X").and_then(Cell::as_f64).unwrap(), 2.0 * 0.5));
        assert!(float_eq(row.get("Y").and_then(Cell::as_f64).unwrap(), 1.5 * 0.5));
    }
}
