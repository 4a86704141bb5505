//! Sobel 梯度与梯度幅值 (边缘图).
//!
//! 对某一方向求导时, 沿该方向使用差分核 `[-1, 0, 1]`,
//! 沿正交方向使用平滑核 `[1, 2, 1]`.

use super::{reflect, Axis2d};
use ndarray::{Array2, ArrayView2, Zip};

type Kernel3 = [[f32; 3]; 3];

/// 沿行方向 (第 0 维) 求导.
const SOBEL_KERNEL_ROWS: Kernel3 = [[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]];

/// 沿列方向 (第 1 维) 求导.
const SOBEL_KERNEL_COLS: Kernel3 = [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]];

/// 3×3 相关运算 (不翻转核).
fn correlate3(data: ArrayView2<f32>, kernel: &Kernel3) -> Array2<f32> {
    let (h, w) = data.dim();
    let mut out = Array2::<f32>::zeros((h, w));
    if h == 0 || w == 0 {
        return out;
    }

    for ((r, c), o) in out.indexed_iter_mut() {
        let rows = [-1isize, 0, 1].map(|d| reflect(r as isize + d, h));
        let cols = [-1isize, 0, 1].map(|d| reflect(c as isize + d, w));
        let mut sum = 0.0;
        for (kr, &rr) in kernel.iter().zip(rows.iter()) {
            sum += data[(rr, cols[0])] * kr[0]
                + data[(rr, cols[1])] * kr[1]
                + data[(rr, cols[2])] * kr[2];
        }
        *o = sum;
    }
    out
}

/// 沿 `axis` 的 Sobel 导数.
pub fn sobel(data: ArrayView2<f32>, axis: Axis2d) -> Array2<f32> {
    match axis {
        Axis2d::Rows => correlate3(data, &SOBEL_KERNEL_ROWS),
        Axis2d::Cols => correlate3(data, &SOBEL_KERNEL_COLS),
    }
}

/// 梯度幅值 `sqrt(gx^2 + gy^2)`, 其中 `gx`, `gy` 分别为两个平面方向上的 Sobel 导数.
pub fn gradient_magnitude(data: ArrayView2<f32>) -> Array2<f32> {
    let mut gx = sobel(data, Axis2d::Rows);
    let gy = sobel(data, Axis2d::Cols);
    Zip::from(&mut gx).and(&gy).for_each(|x, &y| *x = x.hypot(y));
    gx
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_constant_has_no_edges() {
        let data = Array2::<f32>::from_elem((5, 6), 42.0);
        assert!(gradient_magnitude(data.view()).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_empty_input() {
        let data = Array2::<f32>::zeros((0, 3));
        assert_eq!(gradient_magnitude(data.view()).dim(), (0, 3));
    }

    #[test]
    fn test_vertical_step() {
        // 左半为 0, 右半为 1: 只有列方向导数非零.
        let data = Array2::from_shape_fn((4, 4), |(_, c)| if c < 2 { 0.0f32 } else { 1.0 });
        let gr = sobel(data.view(), Axis2d::Rows);
        let gc = sobel(data.view(), Axis2d::Cols);
        assert!(gr.iter().all(|&v| v == 0.0));
        // 每一行都是 [0, 4, 4, 0].
        for row in gc.rows() {
            assert_eq!(row.to_vec(), vec![0.0, 4.0, 4.0, 0.0]);
        }
        assert_eq!(gradient_magnitude(data.view()), gc);
    }

    #[test]
    fn test_magnitude_combines_both_axes() {
        let data = array![[0.0f32, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0, 8.0]];
        let gr = sobel(data.view(), Axis2d::Rows);
        let gc = sobel(data.view(), Axis2d::Cols);
        // 中心像素: 两个方向都只看到右下角.
        assert_eq!(gr[(1, 1)], 8.0);
        assert_eq!(gc[(1, 1)], 8.0);
        let mag = gradient_magnitude(data.view());
        assert!((mag[(1, 1)] - 8.0 * 2f32.sqrt()).abs() < 1e-5);
    }
}
