//! 二维切片滤波.
//!
//! 所有滤波器都按 `(行, 列)` 组织输入, 输出与输入同形状.
//! 越界邻域按半采样对称 (`d c b a | a b c d`) 方式延拓;
//! 对 3×3 核而言这与边缘像素复制等价.

mod local_stats;
mod second_derivative;
mod sobel;

pub use local_stats::{local_stats, uniform_filter};
pub use second_derivative::second_derivative;
pub use sobel::{gradient_magnitude, sobel};

/// 切片平面内的方向.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Axis2d {
    /// 沿行增长的方向 (数组第 0 维).
    Rows,

    /// 沿列增长的方向 (数组第 1 维).
    Cols,
}

impl Axis2d {
    /// 对应的 `ndarray` 维度编号.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Self::Rows => 0,
            Self::Cols => 1,
        }
    }
}

/// 半采样对称延拓: 将任意整数下标映射回 `0..n`.
///
/// `n` 必须非零.
#[inline]
pub(crate) fn reflect(i: isize, n: usize) -> usize {
    debug_assert_ne!(n, 0);
    let period = 2 * n as isize;
    let m = i.rem_euclid(period) as usize;
    if m < n {
        m
    } else {
        2 * n - 1 - m
    }
}

#[cfg(test)]
mod tests {
    use super::reflect;

    #[test]
    fn test_reflect() {
        // d c b a | a b c d | d c b a
        let got: Vec<usize> = (-4..8).map(|i| reflect(i, 4)).collect();
        assert_eq!(got, [3, 2, 1, 0, 0, 1, 2, 3, 3, 2, 1, 0]);
        assert!((-3..3).all(|i| reflect(i, 1) == 0));
    }
}
