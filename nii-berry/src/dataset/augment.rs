//! 成对的随机翻转增强.

use ndarray::{Array3, Axis};
use rand::Rng;

/// 一次翻转决定. 同一个决定总是同时作用于样本对的两侧, 保证像素一一对应.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Flip {
    /// 左右翻转 (沿宽方向).
    pub left_right: bool,

    /// 上下翻转 (沿高方向).
    pub up_down: bool,
}

impl Flip {
    /// 不做任何翻转.
    pub const NONE: Flip = Flip {
        left_right: false,
        up_down: false,
    };

    /// 两个方向各自独立地以 0.5 的概率翻转.
    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            left_right: rng.gen_bool(0.5),
            up_down: rng.gen_bool(0.5),
        }
    }

    /// 翻转 `(高, 宽, 通道)` 组织的张量.
    pub fn apply(self, img: &mut Array3<f32>) {
        if self.left_right {
            img.invert_axis(Axis(1));
        }
        if self.up_down {
            img.invert_axis(Axis(0));
        }
    }

    /// 以相同的方式翻转样本对的两侧.
    #[inline]
    pub fn apply_pair(self, original: &mut Array3<f32>, edge: &mut Array3<f32>) {
        self.apply(original);
        self.apply(edge);
    }
}
