use crate::consts::DEFAULT_STATS_WINDOW;
use crate::data::bounds::{normalize, NormBounds, Normalized};
use crate::filters::{self, Axis2d};
use crate::Idx2d;
use ndarray::iter::Iter;
use ndarray::{Array2, ArrayView2, Ix2};
use std::ops::Index;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 不可变、借用的二维体数据切片.
pub struct ScanSlice<'a> {
    /// 底层数据的轻量级视图, 借用于 [`crate::Volume`] 或 [`OwnedScanSlice`].
    ///
    /// 这里有意把代码写死为 `ArrayView` 降低灵活性, 但使结构的意图更加明确.
    data: ArrayView2<'a, f32>,

    /// 切片在体数据中的编号. 独立构造的切片没有编号.
    index: Option<usize>,
}

impl Index<Idx2d> for ScanSlice<'_> {
    type Output = f32;

    #[inline]
    fn index(&self, index: Idx2d) -> &Self::Output {
        &self.data[index]
    }
}

/// 不可变方法集合.
impl<'a> ScanSlice<'a> {
    /// 直接初始化.
    #[inline]
    pub(crate) fn new(data: ArrayView2<'a, f32>, index: Option<usize>) -> Self {
        Self { data, index }
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView2<f32> {
        self.data.view()
    }

    /// 切片在体数据中的编号.
    #[inline]
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// 获取可以迭代图像像素的迭代器.
    #[inline]
    pub fn iter(&self) -> Iter<'_, f32, Ix2> {
        self.data.iter()
    }

    /// 获取给定位置 (行, 列) 的像素值. 越界时返回 `None`.
    #[inline]
    pub fn get(&self, pos: Idx2d) -> Option<&f32> {
        self.data.get(pos)
    }

    /// 图像的分辨率 (行, 列).
    #[inline]
    pub fn shape(&self) -> Idx2d {
        self.data.dim()
    }

    /// 行数.
    #[inline]
    pub fn height(&self) -> usize {
        self.shape().0
    }

    /// 列数.
    #[inline]
    pub fn width(&self) -> usize {
        self.shape().1
    }

    /// 图像的像素个数.
    #[inline]
    pub fn size(&self) -> usize {
        let (h, w) = self.shape();
        h * w
    }

    /// 以行优先规则, 获取能迭代图像所有 `(索引, 值)` 的迭代器.
    #[inline]
    pub fn indexed_iter(&self) -> impl Iterator<Item = (Idx2d, &f32)> {
        self.data.indexed_iter()
    }

    /// 克隆自己, 获得一个拥有所有权的切片对象. 切片编号保持不变.
    pub fn to_owned(&self) -> OwnedScanSlice {
        OwnedScanSlice {
            data: self.data.to_owned(),
            index: self.index,
        }
    }

    /// 该切片自身 (局部) 的归一化边界.
    #[inline]
    pub fn bounds(&self) -> NormBounds {
        NormBounds::of_values(self.data.iter())
    }

    /// 用给定边界归一化到 8-bit 图像.
    #[inline]
    pub fn normalize(&self, bounds: NormBounds) -> Normalized {
        normalize(self.data.view(), bounds, self.index)
    }

    /// 用切片自身的最小值和值域归一化到 8-bit 图像.
    #[inline]
    pub fn normalize_local(&self) -> Normalized {
        self.normalize(self.bounds())
    }

    /// Sobel 梯度幅值图 (边缘图).
    pub fn edge_map(&self) -> OwnedScanSlice {
        self.derived(filters::gradient_magnitude(self.data.view()))
    }

    /// 局部方差与局部标准差, 窗口边长为 `window`.
    pub fn local_stats(&self, window: usize) -> (OwnedScanSlice, OwnedScanSlice) {
        let (var, std) = filters::local_stats(self.data.view(), window);
        (self.derived(var), self.derived(std))
    }

    /// 默认窗口 ([`DEFAULT_STATS_WINDOW`]) 下的局部标准差.
    #[inline]
    pub fn local_std(&self) -> OwnedScanSlice {
        self.local_stats(DEFAULT_STATS_WINDOW).1
    }

    /// 沿 `axis` 的方向二阶导数.
    pub fn second_derivative(&self, axis: Axis2d) -> OwnedScanSlice {
        self.derived(filters::second_derivative(self.data.view(), axis))
    }

    /// 由滤波结果构造同编号的新切片.
    #[inline]
    fn derived(&self, data: Array2<f32>) -> OwnedScanSlice {
        OwnedScanSlice {
            data,
            index: self.index,
        }
    }
}

/// 拥有所有权的二维切片.
///
/// `OwnedScanSlice` 仅提供到 `ScanSlice` 的轻量转换和底层数据移动,
/// 不提供任何其它方法.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OwnedScanSlice {
    data: Array2<f32>,
    index: Option<usize>,
}

impl From<Array2<f32>> for OwnedScanSlice {
    #[inline]
    fn from(data: Array2<f32>) -> Self {
        Self { data, index: None }
    }
}

impl OwnedScanSlice {
    /// 为切片附上体数据中的编号.
    #[inline]
    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    /// 获得不可变切片引用.
    #[inline]
    pub fn as_immutable(&self) -> ScanSlice<'_> {
        ScanSlice::new(self.data.view(), self.index)
    }

    /// 直接获得底层数据.
    #[inline]
    pub fn into_raw(self) -> Array2<f32> {
        self.data
    }
}
