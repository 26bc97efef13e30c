//! 分水岭分割: 拆分相互接触的细胞核.
//!
//! 1. 精确欧氏距离图;
//! 2. 带容差的局部极大值作为标记;
//! 3. 以距离为优先级的标记控制盆地生长, 不同盆地之间留下单像素分隔线;
//! 4. 分隔线与原掩膜求交.

mod basin;
mod edm;
mod maxima;

pub use edm::euclidean_distance_map;
pub use maxima::find_maxima;

use crate::MaskSliceMut;
use log::debug;

impl MaskSliceMut<'_> {
    /// 就地分水岭分割.
    ///
    /// 返回找到的盆地 (极大值) 个数. 空掩膜原样返回 0;
    /// 只有一个极大值时掩膜不变, 返回 1.
    pub fn watershed(&mut self, tolerance: f32) -> usize {
        if self.count_foreground() == 0 {
            return 0;
        }
        let edm = euclidean_distance_map(&self.shallow_copy());
        let maxima = find_maxima(edm.view(), tolerance);
        debug!("watershed: {} maxima (tolerance {tolerance})", maxima.len());
        if maxima.len() <= 1 {
            return maxima.len();
        }

        let labels = basin::grow_basins(edm.view(), &self.shallow_copy(), &maxima);
        let lines = basin::separator_lines(labels.view());
        let removed = self.and_assign(&lines.as_immut());
        debug!("watershed: {removed} separator pixels");
        maxima.len()
    }
}

#[cfg(test)]
mod tests {
    use crate::OwnedMask;

    const R: f64 = 20.0;

    fn discs(shape: (usize, usize), centres: &[(f64, f64)], r: f64) -> OwnedMask {
        OwnedMask::from_fn(shape, |(h, w)| {
            centres
                .iter()
                .any(|&(ch, cw)| (h as f64 - ch).powi(2) + (w as f64 - cw).powi(2) <= r * r)
        })
    }

    fn split_areas(mask: &mut OwnedMask, tolerance: f32) -> Vec<usize> {
        mask.as_mutable().watershed(tolerance);
        mask.as_immut()
            .foreground_areas()
            .iter()
            .map(Vec::len)
            .collect()
    }

    #[test]
    fn test_two_touching_discs_1_5r() {
        let mut mask = discs((80, 120), &[(40.0, 37.0), (40.0, 67.0)], R);
        let union = mask.as_immut().count_foreground() as f64;
        let areas = split_areas(&mut mask, 0.9);
        assert_eq!(areas.len(), 2, "{areas:?}");
        for a in areas {
            let rel = (a as f64 - union / 2.0).abs() / (union / 2.0);
            assert!(rel < 0.05, "area {a} vs half union {}", union / 2.0);
        }
    }

    #[test]
    fn test_two_touching_discs_1_8r() {
        let mut mask = discs((80, 130), &[(40.0, 37.0), (40.0, 73.0)], R);
        let areas = split_areas(&mut mask, 0.9);
        assert_eq!(areas.len(), 2, "{areas:?}");
        let disc = std::f64::consts::PI * R * R;
        for a in areas {
            assert!((a as f64 - disc).abs() / disc < 0.05, "area {a} vs {disc}");
        }
    }

    #[test]
    fn test_single_disc_not_split() {
        for tolerance in [0.5, 0.9, 2.0] {
            let mut mask = discs((64, 64), &[(32.0, 32.0)], R);
            let before = mask.clone();
            assert_eq!(mask.as_mutable().watershed(tolerance), 1);
            assert_eq!(mask, before);
        }
    }

    #[test]
    fn test_empty_mask_unchanged() {
        let mut mask = OwnedMask::zeros((16, 16));
        assert_eq!(mask.as_mutable().watershed(0.9), 0);
        assert!(mask.as_immut().is_background());
    }
}
