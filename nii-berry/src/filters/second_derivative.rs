use super::{reflect, Axis2d};
use ndarray::{Array2, ArrayView2, Axis};

/// 沿 `axis` 的方向二阶导数, 使用中心差分 `[1, -2, 1]`.
pub fn second_derivative(data: ArrayView2<f32>, axis: Axis2d) -> Array2<f32> {
    let axis = Axis(axis.index());
    let n = data.len_of(axis);
    let mut out = Array2::<f32>::zeros(data.raw_dim());
    if n == 0 {
        return out;
    }
    for (src, mut dst) in data.lanes(axis).into_iter().zip(out.lanes_mut(axis)) {
        for (i, o) in dst.iter_mut().enumerate() {
            let i = i as isize;
            *o = src[reflect(i - 1, n)] - 2.0 * src[i as usize] + src[reflect(i + 1, n)];
        }
    }
    out
}
