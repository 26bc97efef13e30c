use crate::data::slice::neighbour8;
use crate::Idx2d;
use ndarray::{Array2, ArrayView2};
use ordered_float::OrderedFloat;
use std::cmp::Reverse;

/// 已被某个 (更高的) 极大值的泛洪区域占据.
const PROCESSED: u8 = 0b01;

/// 已加入当前泛洪列表.
const LISTED: u8 = 0b10;

/// 带容差的局部极大值.
///
/// 候选点是不低于任何 8-邻居的正值像素, 按值降序处理. 每个候选点向
/// 8-邻接方向泛洪所有 `v >= v0 - tolerance` 的正值像素; 若泛洪途中遇到
/// 更高的像素, 或遇到已被先前极大值占据的像素, 则它不是真正的极大值.
/// 无论结果如何, 泛洪到的像素都会被标记为已占据.
///
/// 对于等值平台, 标记点取平台中距其质心最近的像素.
/// 返回的极大值按发现顺序 (值降序) 排列.
pub fn find_maxima(edm: ArrayView2<f32>, tolerance: f32) -> Vec<Idx2d> {
    let (height, width) = edm.dim();
    let in_image = |(h, w): Idx2d| h < height && w < width;

    let mut candidates: Vec<(f32, Idx2d)> = edm
        .indexed_iter()
        .filter(|&(pos, &v)| {
            v > 0.0
                && neighbour8(pos)
                    .into_iter()
                    .filter(|&p| in_image(p))
                    .all(|p| edm[p] <= v)
        })
        .map(|(pos, &v)| (v, pos))
        .collect();
    candidates.sort_unstable_by_key(|&(v, pos)| (Reverse(OrderedFloat(v)), pos));

    let mut flags = Array2::<u8>::zeros((height, width));
    let mut maxima = Vec::new();
    let mut list: Vec<Idx2d> = Vec::new();

    for (v0, p0) in candidates {
        if flags[p0] & PROCESSED != 0 {
            continue;
        }
        list.clear();
        list.push(p0);
        flags[p0] |= LISTED;
        let mut is_max = true;

        let mut i = 0;
        'flood: while i < list.len() {
            for next in neighbour8(list[i]) {
                if !in_image(next) || flags[next] & LISTED != 0 {
                    continue;
                }
                if flags[next] & PROCESSED != 0 {
                    is_max = false;
                    break 'flood;
                }
                let v = edm[next];
                if v > v0 {
                    is_max = false;
                    break 'flood;
                }
                if v > 0.0 && v >= v0 - tolerance {
                    flags[next] |= LISTED;
                    list.push(next);
                }
            }
            i += 1;
        }

        for &p in list.iter() {
            flags[p] = (flags[p] & !LISTED) | PROCESSED;
        }
        if is_max {
            maxima.push(plateau_marker(edm, &list, v0));
        }
    }
    maxima
}

/// 等值平台中距平台质心最近的像素.
fn plateau_marker(edm: ArrayView2<f32>, list: &[Idx2d], v0: f32) -> Idx2d {
    let plateau: Vec<Idx2d> = list.iter().copied().filter(|&p| edm[p] == v0).collect();
    let n = plateau.len() as f64;
    let (sh, sw) = plateau
        .iter()
        .fold((0.0, 0.0), |(a, b), &(h, w)| (a + h as f64, b + w as f64));
    let (ch, cw) = (sh / n, sw / n);
    plateau
        .iter()
        .copied()
        .min_by_key(|&(h, w)| OrderedFloat((h as f64 - ch).powi(2) + (w as f64 - cw).powi(2)))
        .unwrap_or(list[0])
}
