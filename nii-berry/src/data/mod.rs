use std::ops::Index;
use std::path::Path;

use ndarray::{Array3, ArrayView3, Axis, Ix3};
use nifti::{IntoNdArray, NiftiHeader, NiftiObject, ReaderOptions};

use crate::error::VolumeError;
use crate::{Idx2d, Idx3d};

pub mod bounds;
pub mod slice;

pub use bounds::{normalize, NormBounds, Normalized};

pub use slice::{ImgWriteRaw, ImgWriteVis, OwnedScanSlice, ScanSlice};

/// `NiftiHeader` 是栈上大对象, 移动该对象的开销很可观.
/// 因此我们将其分配到堆上.
type BoxedHeader = Box<NiftiHeader>;

/// nii 格式 3D 体数据, 包括 (可选的) header 和体素值. 体素值以 `f32` 保存.
///
/// 数据按照 nifti 的原始维度顺序 `(行, 列, 切片)` 访问, 即第 `i` 个切片是
/// `data[.., .., i]`. 打开后不可变.
#[derive(Debug, Clone)]
pub struct Volume {
    header: Option<BoxedHeader>,
    data: Array3<f32>,
}

impl Index<Idx3d> for Volume {
    type Output = f32;

    #[inline]
    fn index(&self, index: Idx3d) -> &Self::Output {
        &self.data[index]
    }
}

impl Volume {
    /// 打开 nii (或 nii.gz) 文件格式的 3D 体数据. `path` 为文件的本地路径.
    /// 体素值按 header 中的 `scl_slope`, `scl_inter` 缩放后转换为 `f32`.
    ///
    /// 尾部的单例维度会被去掉; 二维数据视作只有一个切片的体数据.
    /// 其它维度数的数据返回 [`VolumeError::NotThreeDimensional`].
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, VolumeError> {
        let obj = ReaderOptions::new().read_file(path.as_ref())?;
        let header = Box::new(obj.header().clone());

        let mut data = obj.into_volume().into_ndarray::<f32>()?;
        while data.ndim() > 3 && data.shape().last() == Some(&1) {
            let last = data.ndim() - 1;
            data = data.index_axis_move(Axis(last), 0);
        }
        if data.ndim() == 2 {
            data = data.insert_axis(Axis(2));
        }

        let shape = data.shape().to_vec();
        let data = data
            .into_dimensionality::<Ix3>()
            .map_err(|_| VolumeError::NotThreeDimensional(shape))?;

        let volume = Self {
            header: Some(header),
            data,
        };
        let (rows, cols, slices) = volume.shape();
        log::debug!(
            "opened volume `{}`: {rows} x {cols} x {slices}",
            path.as_ref().display()
        );
        Ok(volume)
    }

    /// 直接由 `(行, 列, 切片)` 组织的数组创建体数据. 该体数据没有 header.
    #[inline]
    pub fn from_array(data: Array3<f32>) -> Self {
        Self { header: None, data }
    }

    /// 获取 header 部分. 由 [`Volume::from_array`] 创建的体数据没有 header.
    #[inline]
    pub fn header(&self) -> Option<&NiftiHeader> {
        self.header.as_deref()
    }

    /// 获取数据形状 `(行, 列, 切片)`.
    #[inline]
    pub fn shape(&self) -> Idx3d {
        self.data.dim()
    }

    /// 获取切片形状 `(行, 列)`. 所有切片形状相同.
    #[inline]
    pub fn slice_shape(&self) -> Idx2d {
        let (r, c, _) = self.shape();
        (r, c)
    }

    /// 获取切片个数.
    #[inline]
    pub fn len_slices(&self) -> usize {
        self.shape().2
    }

    /// 获取数据体素个数.
    #[inline]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// 检查索引是否合法.
    #[inline]
    pub fn check(&self, (r0, c0, s0): &Idx3d) -> bool {
        let (r, c, s) = self.shape();
        *r0 < r && *c0 < c && *s0 < s
    }

    /// 获取单个体素分辨率 `[行, 列, 切片]` (通常以毫米为单位).
    /// 没有 header 时返回 `None`.
    #[inline]
    pub fn pix_dim(&self) -> Option<[f64; 3]> {
        let [_, r, c, s, ..] = self.header()?.pixdim;
        Some([r as f64, c as f64, s as f64])
    }

    /// 获取第 `index` 个切片视图.
    ///
    /// 当 `index` 越界时 panic.
    #[inline]
    pub fn slice_at(&self, index: usize) -> ScanSlice<'_> {
        ScanSlice::new(self.data.index_axis(Axis(2), index), Some(index))
    }

    /// 获取能按升序迭代所有切片的迭代器.
    #[inline]
    pub fn slice_iter(&self) -> impl ExactSizeIterator<Item = ScanSlice> {
        self.data
            .axis_iter(Axis(2))
            .enumerate()
            .map(|(i, v)| ScanSlice::new(v, Some(i)))
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView3<'_, f32> {
        self.data.view()
    }

    /// 整个体数据 (全局) 的归一化边界.
    #[inline]
    pub fn bounds(&self) -> NormBounds {
        NormBounds::of_values(self.data.iter())
    }
}

/// 在 `0..len` 中等距抽取 `n` 个下标, 即 `floor(linspace(0, len - 1, n))`.
///
/// `len == 0` 或 `n == 0` 时返回空数组; `n == 1` 时只返回 0.
/// 当 `n > len` 时结果中会有重复下标.
pub fn evenly_spaced_indices(len: usize, n: usize) -> Vec<usize> {
    if len == 0 || n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![0];
    }
    let last = (len - 1) as f64;
    let step = last / (n - 1) as f64;
    (0..n)
        .map(|i| {
            if i + 1 == n {
                len - 1
            } else {
                (i as f64 * step).floor() as usize
            }
        })
        .collect()
}
