//! 线性归一化: 将任意浮点强度映射到 8-bit 灰度.

use itertools::{Itertools, MinMaxResult};
use ndarray::{Array2, ArrayView2};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::consts::gray::is_black;

/// 归一化边界, 包含最小值 (min) 和值域宽度 (range).
///
/// 该边界是只读的. 若要修改参数, 你应该创建新的实例.
/// `range == 0` 是合法但退化的情况, 归一化结果为全零图像.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NormBounds {
    min: f32,
    range: f32,
}

impl NormBounds {
    /// 退化边界, 在没有任何有限值可用时使用.
    pub const DEGENERATE: NormBounds = NormBounds {
        min: 0.0,
        range: 0.0,
    };

    /// 构建归一化边界.
    ///
    /// `min` 和 `range` 必须有限, 且 `range >= 0`, 否则返回 `None`.
    pub fn new(min: f32, range: f32) -> Option<NormBounds> {
        if min.is_finite() && range.is_finite() && range >= 0.0 {
            Some(Self { min, range })
        } else {
            None
        }
    }

    /// 构建一个恒等映射 8-bit 值域的边界. 其最小值为 0, 宽度为 255.
    #[inline]
    pub const fn identity_u8() -> NormBounds {
        Self {
            min: 0.0,
            range: 255.0,
        }
    }

    /// 由一组值的最小值与最大值求边界. NaN 和无穷值会被忽略.
    ///
    /// 没有任何有限值时返回 [`NormBounds::DEGENERATE`].
    pub fn of_values<'a, I: IntoIterator<Item = &'a f32>>(it: I) -> NormBounds {
        match it.into_iter().copied().filter(|v| v.is_finite()).minmax() {
            MinMaxResult::NoElements => Self::DEGENERATE,
            MinMaxResult::OneElement(v) => Self { min: v, range: 0.0 },
            MinMaxResult::MinMax(lo, hi) => Self {
                min: lo,
                // f32 两端极值相减可能溢出.
                range: (hi - lo).min(f32::MAX),
            },
        }
    }

    /// 最小值.
    #[inline]
    pub fn min(&self) -> f32 {
        self.min
    }

    /// 值域宽度.
    #[inline]
    pub fn range(&self) -> f32 {
        self.range
    }

    /// 最大值.
    #[inline]
    pub fn max(&self) -> f32 {
        self.min + self.range
    }

    /// 是否退化 (`range == 0`)?
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.range == 0.0
    }

    /// 求在当前边界下, `value` 对应的灰度图像素整数值.
    ///
    /// 按照 `(value - min) / range * 255` 计算后直接截断为 `u8`:
    /// 小于 0 的结果为 0, 大于 255 的结果为 255, NaN 为 0.
    /// 退化边界下恒返回 0.
    #[inline]
    pub fn eval(&self, value: f32) -> u8 {
        if self.is_degenerate() {
            return 0;
        }
        // 255, not 256.
        ((value - self.min) / self.range * 255.0) as u8
    }
}

/// 归一化结果.
///
/// 两种情况都携带与输入同形状的 8-bit 图像; 区分二者是为了让调用方
/// (以及测试) 能直接判断退化情况, 而不必解析日志.
#[derive(Clone, Debug, PartialEq)]
pub enum Normalized {
    /// 正常缩放的图像.
    Scaled(Array2<u8>),

    /// 边界退化 (`range == 0`), 图像为全零.
    Degenerate(Array2<u8>),
}

impl Normalized {
    /// 边界是否退化?
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        matches!(self, Self::Degenerate(_))
    }

    /// 结果图像是否全为 0?
    ///
    /// 退化结果必然全零; 正常缩放的结果也可能全零
    /// (例如所有有效值都聚集在最小值附近并被截断).
    pub fn is_blank(&self) -> bool {
        self.image().iter().copied().all(is_black)
    }

    /// 获取结果图像.
    #[inline]
    pub fn image(&self) -> &Array2<u8> {
        match self {
            Self::Scaled(img) | Self::Degenerate(img) => img,
        }
    }

    /// 消费自我, 获得结果图像.
    #[inline]
    pub fn into_image(self) -> Array2<u8> {
        match self {
            Self::Scaled(img) | Self::Degenerate(img) => img,
        }
    }
}

/// 用给定边界将二维数组线性映射到 8-bit 图像.
///
/// `index` 仅用于诊断信息 (切片编号, 若已知).
/// 边界退化时记录一条警告并返回全零图像.
pub fn normalize(data: ArrayView2<f32>, bounds: NormBounds, index: Option<usize>) -> Normalized {
    if bounds.is_degenerate() {
        match index {
            Some(i) => log::warn!("slice {i:03}: zero intensity range, normalized to all zeros"),
            None => log::warn!("zero intensity range, normalized to all zeros"),
        }
        return Normalized::Degenerate(Array2::zeros(data.raw_dim()));
    }
    Normalized::Scaled(data.map(|&v| bounds.eval(v)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_bounds_invalid_input() {
        assert!(NormBounds::new(0.0, -1.0).is_none());
        assert!(NormBounds::new(f32::NAN, 1.0).is_none());
        assert!(NormBounds::new(0.0, f32::INFINITY).is_none());
        assert!(NormBounds::new(3.0, 0.0).is_some_and(|b| b.is_degenerate()));
    }

    #[test]
    fn test_bounds_of_values_skip_non_finite() {
        let v = [f32::NAN, 2.0, -1.0, f32::INFINITY, 5.0];
        let b = NormBounds::of_values(&v);
        assert_eq!(b.min(), -1.0);
        assert_eq!(b.range(), 6.0);
        assert_eq!(b.max(), 5.0);

        assert_eq!(NormBounds::of_values(&[f32::NAN]), NormBounds::DEGENERATE);
        assert_eq!(NormBounds::of_values(&[]), NormBounds::DEGENERATE);
        assert!(NormBounds::of_values(&[4.0]).is_degenerate());
    }

    #[test]
    fn test_eval_truncates_and_clamps() {
        // [60, 100]
        let b = NormBounds::new(60.0, 40.0).unwrap();
        assert_eq!(b.eval(f32::NAN), 0);
        assert_eq!(b.eval(f32::MIN), 0);
        assert_eq!(b.eval(f32::MAX), 255);
        assert_eq!(b.eval(50.0), 0);
        assert_eq!(b.eval(60.1), 0);
        assert_eq!(b.eval(70.0), (255.0 * 0.25) as u8);
        assert_eq!(b.eval(80.0), (255.0 * 0.5) as u8);
        assert_eq!(b.eval(99.999), 254);
        assert_eq!(b.eval(100.0), 255);
    }

    #[test]
    fn test_constant_slice_is_degenerate() {
        let data = Array2::<f32>::from_elem((4, 4), 7.0);
        let b = NormBounds::of_values(data.iter());
        assert!(b.is_degenerate());

        let out = normalize(data.view(), b, Some(3));
        assert!(out.is_degenerate());
        assert!(out.is_blank());
        assert_eq!(out.image().dim(), (4, 4));
    }

    #[test]
    fn test_identity_bounds_keep_u8_values() {
        let data = array![[0.0f32, 0.0], [0.0, 255.0]];
        let out = normalize(data.view(), NormBounds::identity_u8(), None);
        assert!(!out.is_degenerate());
        assert_eq!(out.into_image(), array![[0u8, 0], [0, 255]]);
    }

    #[test]
    fn test_monotonic_within_range() {
        let values: Vec<f32> = (0..500).map(|i| -13.7 + i as f32 * 0.731).collect();
        let b = NormBounds::of_values(&values);
        let mapped: Vec<u8> = values.iter().map(|&v| b.eval(v)).collect();
        assert_eq!(mapped.first(), Some(&0));
        assert_eq!(mapped.last(), Some(&255));
        assert!(mapped.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_scaled_can_still_be_blank() {
        // 所有值都远小于 range, 截断后全零.
        let data = array![[0.0f32, 0.0], [0.0, 0.5]];
        let b = NormBounds::new(0.0, 1000.0).unwrap();
        let out = normalize(data.view(), b, None);
        assert!(!out.is_degenerate());
        assert!(out.is_blank());
    }
}
