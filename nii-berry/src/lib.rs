#![warn(missing_docs)] // <= 合适时移除它.
// #![warn(clippy::missing_docs_in_private_items)]  // <= too strict.

//! 核心库. 将 nii 格式的 3D 体数据逐切片转换为 8-bit 灰度图像,
//! 并组装成 (原图, 边缘图) 训练样本对数据集.
//!
//! 该 crate 目前仅提供 `safe` 接口.
//!
//! # 注意
//!
//! 1. 体数据按 nifti 的原始维度顺序 `(行, 列, 切片)` 访问, 第 `i` 个切片即 `data[.., .., i]`.
//! 2. 所有文件系统错误都会返回给调用方, 由调用方决定是否终止运行.
//!   退化切片和目录文件数不一致只是警告, 以带类型的结果返回.
//!
//! # 开发计划
//!
//! ### 切片归一化 ✅
//!
//! 按给定的 `(min, range)` 将浮点切片线性映射到 `[0, 255]`, 截断为 `u8`.
//! `range == 0` 时输出全零并给出警告.
//!
//! 实现位于 `nii-berry/src/data/bounds.rs`.
//!
//! ### Sobel 边缘图 ✅
//!
//! 对每个切片求 Sobel 梯度幅值, 逐切片归一化后写出 `slice_{index:03}_edges.png`.
//!
//! 实现位于 `nii-berry/src/filters/sobel.rs` 和 `nii-berry/src/export/edges.rs`.
//!
//! ### 训练原图导出 ✅
//!
//! 逐切片归一化后写出 `slice_{index:03}_original.png`, 全零切片跳过.
//!
//! 实现位于 `nii-berry/src/export/originals.rs`.
//!
//! ### 数据集组装 ✅
//!
//! 1. 按切片编号配对原图与边缘图 (按位置配对仅作对照保留). ✅
//! 2. 读取, 缩放, 归一化到 `[0, 1]`. ✅
//! 3. 成对随机翻转增强. ✅
//! 4. 分批, 并行读取, 后台预取. ✅
//! 5. npz 归档导出. ✅
//!
//! 实现位于 `nii-berry/src/dataset/*`.
//!
//! ### 小功能 ✅
//!
//! 1. 局部方差/标准差, 方向二阶导数. ✅
//! 2. 体数据统计量与直方图. ✅
//! 3. 等距切片预览图. ✅

/// 二维索引, 同时也可一定程度上用作非负整数向量.
pub type Idx2d = (usize, usize);

/// 三维索引, 同时也可一定程度上用作非负整数向量.
pub type Idx3d = (usize, usize, usize);

/// 3D nii 体数据与切片基础数据结构.
mod data;

pub use data::{
    evenly_spaced_indices, normalize, ImgWriteRaw, ImgWriteVis, NormBounds, Normalized,
    OwnedScanSlice, ScanSlice, Volume,
};

pub use data::slice::{from_gray_image, read_gray, to_gray_image};

pub mod consts;

pub mod error;

pub use error::{DatasetError, PrepError, VolumeError};

pub mod filters;

pub mod stats;

pub mod export;

pub mod dataset;

pub mod prelude;
