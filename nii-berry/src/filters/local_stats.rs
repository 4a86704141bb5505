//! 局部方差与局部标准差.
//!
//! 使用计算公式 `Var(X) = E(X^2) - E(X)^2`, 期望由边长为 `window` 的均值滤波给出.

use super::reflect;
use ndarray::{Array2, ArrayView2, Axis, Zip};

/// 沿 `axis` 做一维均值滤波. 累加在 `f64` 上进行.
fn uniform_1d(data: ArrayView2<f32>, window: usize, axis: Axis) -> Array2<f32> {
    let n = data.len_of(axis);
    let mut out = Array2::<f32>::zeros(data.raw_dim());
    if n == 0 {
        return out;
    }
    // 偶数窗口时, 窗口中心偏左.
    let lo = -((window / 2) as isize);
    let hi = ((window - 1) / 2) as isize;

    for (src, mut dst) in data.lanes(axis).into_iter().zip(out.lanes_mut(axis)) {
        for (i, o) in dst.iter_mut().enumerate() {
            let sum: f64 = (lo..=hi)
                .map(|d| src[reflect(i as isize + d, n)] as f64)
                .sum();
            *o = (sum / window as f64) as f32;
        }
    }
    out
}

/// 边长为 `window` 的二维均值滤波. `window == 0` 按 1 处理.
pub fn uniform_filter(data: ArrayView2<f32>, window: usize) -> Array2<f32> {
    let window = window.max(1);
    let rows = uniform_1d(data, window, Axis(0));
    uniform_1d(rows.view(), window, Axis(1))
}

/// 计算局部方差和局部标准差, 返回 `(方差, 标准差)`.
///
/// 浮点误差可能导致方差略小于 0, 这里会截断为 0.
pub fn local_stats(data: ArrayView2<f32>, window: usize) -> (Array2<f32>, Array2<f32>) {
    let squared = data.mapv(|v| v * v);
    let mean_sq = uniform_filter(squared.view(), window);
    let mut variance = uniform_filter(data, window);
    Zip::from(&mut variance)
        .and(&mean_sq)
        .for_each(|m, &sq| *m = (sq - *m * *m).max(0.0));
    let std_dev = variance.mapv(f32::sqrt);
    (variance, std_dev)
}
