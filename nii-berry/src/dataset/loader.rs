//! 将图像文件读取为固定尺寸的单通道浮点张量.

use std::path::Path;

use image::imageops::{self, FilterType};
use ndarray::Array3;

use super::pairing::ImagePair;
use crate::error::{DatasetError, DatasetResult};

/// 读取 `path` 处的图像, 转换为单通道, 双线性插值缩放到 `(height, width)`,
/// 再缩放到 `[0, 1]`. 返回形状为 `(height, width, 1)` 的张量.
///
/// 原图尺寸已经等于目标尺寸时不做插值.
pub fn load_tensor<P: AsRef<Path>>(path: P, (height, width): (u32, u32)) -> DatasetResult<Array3<f32>> {
    let path = path.as_ref();
    let img = image::open(path)
        .map_err(|source| DatasetError::Image {
            path: path.to_owned(),
            source,
        })?
        .to_luma8();

    let img = if img.dimensions() == (width, height) {
        img
    } else {
        imageops::resize(&img, width, height, FilterType::Triangle)
    };

    Ok(Array3::from_shape_fn(
        (height as usize, width as usize, 1),
        |(h, w, _)| img.get_pixel(w as u32, h as u32).0[0] as f32 / 255.0,
    ))
}

/// 读取一个样本对. 两侧张量形状不一致时返回 [`DatasetError::Shape`].
pub fn load_pair(pair: &ImagePair, size: (u32, u32)) -> DatasetResult<(Array3<f32>, Array3<f32>)> {
    let original = load_tensor(&pair.original, size)?;
    let edge = load_tensor(&pair.edge, size)?;
    if original.shape() != edge.shape() {
        return Err(DatasetError::Shape {
            key: pair.key,
            original: original.shape().to_vec(),
            edge: edge.shape().to_vec(),
        });
    }
    Ok((original, edge))
}
