//! 运行时错误.
//!
//! 可恢复的情况 (退化切片, 目录文件数不一致) 不在这里, 它们以带类型的结果
//! ([`crate::Normalized`], [`crate::dataset::PairingReport`]) 返回.

use std::path::PathBuf;

use thiserror::Error;

/// 打开 3D 体数据的错误.
#[derive(Debug, Error)]
pub enum VolumeError {
    /// 读取或解析 nifti 文件失败.
    #[error("failed to read nifti volume: {0}")]
    Nifti(#[from] nifti::NiftiError),

    /// 数据 (去掉尾部单例维度后) 不是三维的. 参数为原始形状.
    #[error("expected a 3D volume, found shape {0:?}")]
    NotThreeDimensional(Vec<usize>),
}

/// 切片导出 (边缘图, 训练原图, 预览图) 的错误. 对整个运行而言都是致命的.
#[derive(Debug, Error)]
pub enum PrepError {
    /// 底层 I/O 错误, 例如无法创建输出目录.
    #[error("i/o error at `{path}`: {source}")]
    Io {
        /// 出错路径.
        path: PathBuf,
        /// 原始错误.
        source: std::io::Error,
    },

    /// 图像编码或写入失败.
    #[error("failed to write image `{path}`: {source}")]
    Image {
        /// 出错路径.
        path: PathBuf,
        /// 原始错误.
        source: image::ImageError,
    },
}

/// 数据集组装错误.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// 无法读取目录或文件.
    #[error("i/o error at `{path}`: {source}")]
    Io {
        /// 出错路径.
        path: PathBuf,
        /// 原始错误.
        source: std::io::Error,
    },

    /// 图像解码失败.
    #[error("failed to decode image `{path}`: {source}")]
    Image {
        /// 出错路径.
        path: PathBuf,
        /// 原始错误.
        source: image::ImageError,
    },

    /// 样本对两侧的张量形状不一致.
    #[error("shape mismatch in pair {key:?}: {original:?} vs {edge:?}")]
    Shape {
        /// 样本对的切片编号 (若有).
        key: Option<usize>,
        /// 原图张量形状.
        original: Vec<usize>,
        /// 边缘图张量形状.
        edge: Vec<usize>,
    },

    /// 参数不合法 (例如批大小为 0).
    #[error("invalid dataset option: {0}")]
    InvalidOption(&'static str),

    /// 写出 npz 归档失败.
    #[error("failed to write npz archive: {0}")]
    Npz(#[from] ndarray_npy::WriteNpzError),

    /// 读取 npz 归档失败.
    #[error("failed to read npz archive: {0}")]
    NpzRead(#[from] ndarray_npy::ReadNpzError),

    /// npz 归档中缺少某个数组.
    #[error("npz archive has no array named `{0}`")]
    MissingArray(String),
}

/// 导出运行结果.
pub type PrepResult<T> = Result<T, PrepError>;

/// 数据集运行结果.
pub type DatasetResult<T> = Result<T, DatasetError>;
