use crate::consts::gray::is_foreground;
use crate::{Idx2d, MaskSlice, OwnedMask};
use binary_heap_plus::BinaryHeap;
use ndarray::{Array2, ArrayView2};

/// 盆地编号. 0 表示未被任何盆地占据.
pub(crate) type BasinLabel = u32;

/// 标记控制的盆地生长.
///
/// 以距离值为优先级 (高者先出, 相等时先入先出) 从每个标记点出发,
/// 沿 4-邻接方向在前景内扩张. 像素在入队时即获得盆地编号,
/// 因此每个像素只属于最先到达它的盆地.
pub(crate) fn grow_basins(
    edm: ArrayView2<f32>,
    mask: &MaskSlice,
    markers: &[Idx2d],
) -> Array2<BasinLabel> {
    let mut labels = Array2::<BasinLabel>::zeros(mask.shape());
    let mut heap: BinaryHeap<(f32, u64, Idx2d), _> =
        BinaryHeap::new_by(|a: &(f32, u64, Idx2d), b: &(f32, u64, Idx2d)| a.0.total_cmp(&b.0).then_with(|| b.1.cmp(&a.1)));
    let mut seq = 0u64;

    for (i, &m) in markers.iter().enumerate() {
        if labels[m] != 0 || !is_foreground(mask[m]) {
            continue;
        }
        labels[m] = i as BasinLabel + 1;
        heap.push((edm[m], seq, m));
        seq += 1;
    }

    while let Some((_, _, cur)) = heap.pop() {
        let label = labels[cur];
        for next in mask.n4_positions(cur) {
            if labels[next] == 0 && is_foreground(mask[next]) {
                labels[next] = label;
                heap.push((edm[next], seq, next));
                seq += 1;
            }
        }
    }
    labels
}

/// 分水岭线: 除分隔像素外全为前景.
///
/// 一个已标记像素若其右侧或下方的 4-邻居属于另一个盆地, 则它成为分隔像素.
pub(crate) fn separator_lines(labels: ArrayView2<BasinLabel>) -> OwnedMask {
    let (height, width) = labels.dim();
    OwnedMask::from_fn((height, width), |(h, w)| {
        let own = labels[(h, w)];
        if own == 0 {
            return true;
        }
        let differs = |pos: Idx2d| matches!(labels.get(pos), Some(&l) if l != 0 && l != own);
        !(differs((h, w + 1)) || differs((h + 1, w)))
    })
}
