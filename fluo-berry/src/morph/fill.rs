use crate::consts::gray::*;
use crate::{Idx2d, MaskSliceMut};
use std::collections::VecDeque;

impl MaskSliceMut<'_> {
    /// 空洞填充.
    ///
    /// 从图像边缘的每个背景像素出发, 以 4-邻接规则泛洪并临时标记为
    /// [`MASK_EXTERIOR`]; 此后仍为背景的像素即为空洞, 被填充为前景;
    /// 最后外部标记恢复为背景. 泛洪使用显式队列, 图像再大也不会爆栈.
    ///
    /// 返回被填充的像素个数.
    pub fn fill_holes(&mut self) -> usize {
        let (height, width) = self.shape();
        if height == 0 || width == 0 {
            return 0;
        }

        let mut q: VecDeque<Idx2d> = VecDeque::new();
        let border = (0..width)
            .flat_map(|w| [(0, w), (height - 1, w)])
            .chain((0..height).flat_map(|h| [(h, 0), (h, width - 1)]));
        for pos in border {
            if is_background(self[pos]) {
                self[pos] = MASK_EXTERIOR;
                q.push_back(pos);
            }
        }

        while let Some(cur) = q.pop_front() {
            for next in self.n4_positions(cur) {
                if is_background(self[next]) {
                    self[next] = MASK_EXTERIOR;
                    q.push_back(next);
                }
            }
        }

        let filled = self.replace(MASK_BACKGROUND, MASK_FOREGROUND);
        self.replace(MASK_EXTERIOR, MASK_BACKGROUND);
        filled
    }
}

#[cfg(test)]
mod tests {
    use crate::consts::gray::*;
    use crate::OwnedMask;

    fn ring(shape: (usize, usize), c: (f64, f64), r_in: f64, r_out: f64) -> OwnedMask {
        OwnedMask::from_fn(shape, |(h, w)| {
            let d = ((h as f64 - c.0).powi(2) + (w as f64 - c.1).powi(2)).sqrt();
            d >= r_in && d <= r_out
        })
    }

    #[test]
    fn test_fill_disc_hole() {
        let mut mask = ring((64, 64), (32.0, 32.0), 6.0, 20.0);
        let before = mask.as_immut().count_foreground();
        let expected = OwnedMask::from_fn((64, 64), |(h, w)| {
            ((h as f64 - 32.0).powi(2) + (w as f64 - 32.0).powi(2)).sqrt() <= 20.0
        });

        let filled = mask.as_mutable().fill_holes();
        assert!(filled > 0);
        assert_eq!(before + filled, mask.as_immut().count_foreground());
        assert_eq!(mask, expected);
        // 外部保持背景, 且不残留临时标记.
        assert_eq!(mask.as_immut()[(0, 0)], MASK_BACKGROUND);
        assert!(mask.as_immut().iter().all(|&p| p != MASK_EXTERIOR));
    }

    #[test]
    fn test_open_ring_not_filled() {
        // 与边缘相连的凹陷不是空洞.
        let mut mask = OwnedMask::from_fn((8, 8), |(h, w)| (h == 2 || h == 6 || w == 2) && w < 7);
        let before = mask.clone();
        assert_eq!(mask.as_mutable().fill_holes(), 0);
        assert_eq!(mask, before);
    }

    #[test]
    fn test_large_image_no_recursion() {
        let mut mask = ring((1024, 1024), (512.0, 512.0), 100.0, 400.0);
        let filled = mask.as_mutable().fill_holes();
        assert!(filled > 30_000);
    }
}
