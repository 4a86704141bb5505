//! 图像的持久化存储.

use crate::data::bounds::Normalized;
use crate::ScanSlice;
use image::{GrayImage, ImageResult, Luma};
use ndarray::{Array2, ArrayView2};
use std::path::Path;

/// 表明一个可以通过 **可视化友好** 模式持久化存储的图像对象.
///
/// `ImgWriteVis` trait 的意图是, 图像将以 "可视化友好" 的方式保存,
/// 而不是 "as is" 的方式. 对 `ScanSlice` 这类以浮点强度存储的切片,
/// 保存前会用切片自身的最小值和值域归一化.
pub trait ImgWriteVis {
    /// 按照一定的可视化规则将图片保存到 `path` 路径.
    fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()>;
}

/// 表明一个可以通过 **按原样** 模式持久化存储的 8-bit 图像对象.
///
/// 保存格式由 `path` 的扩展名决定; 对 png 而言读回的像素与写入的逐位一致.
pub trait ImgWriteRaw {
    /// 按原样将图片保存到 `path` 路径.
    fn save_raw<P: AsRef<Path>>(&self, path: P) -> ImageResult<()>;
}

/// 将 `(行, 列)` 组织的 8-bit 数组转换为灰度图.
pub fn to_gray_image(data: ArrayView2<u8>) -> GrayImage {
    let (height, width) = data.dim();
    let mut buf = GrayImage::new(width as u32, height as u32);
    for ((h, w), &pix) in data.indexed_iter() {
        buf.put_pixel(w as u32, h as u32, Luma([pix]));
    }
    buf
}

/// 将灰度图转换为 `(行, 列)` 组织的 8-bit 数组.
pub fn from_gray_image(img: &GrayImage) -> Array2<u8> {
    let (width, height) = img.dimensions();
    Array2::from_shape_fn((height as usize, width as usize), |(h, w)| {
        img.get_pixel(w as u32, h as u32).0[0]
    })
}

/// 读取图像文件并转换为单通道 8-bit 数组.
pub fn read_gray<P: AsRef<Path>>(path: P) -> ImageResult<Array2<u8>> {
    let img = image::open(path)?.to_luma8();
    Ok(from_gray_image(&img))
}

macro_rules! impl_u8_raw {
    ($($img: ty),+) => {
        $(
            /// 按原样存储.
            impl ImgWriteRaw for $img {
                fn save_raw<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
                    to_gray_image(self.view()).save(path)
                }
            }
        )+
    };
}

impl_u8_raw!(Array2<u8>, ArrayView2<'_, u8>);

/// 存储归一化结果; 退化结果存为全黑图像.
impl ImgWriteRaw for Normalized {
    #[inline]
    fn save_raw<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        self.image().save_raw(path)
    }
}

/// 以切片自身的最小值和值域归一化后存储.
impl ImgWriteVis for ScanSlice<'_> {
    fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        self.normalize_local().save_raw(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_gray_image_layout() {
        let data = array![[1u8, 2, 3], [4, 5, 6]];
        let img = to_gray_image(data.view());
        assert_eq!(img.dimensions(), (3, 2));
        assert_eq!(img.get_pixel(2, 0).0[0], 3);
        assert_eq!(img.get_pixel(0, 1).0[0], 4);
        assert_eq!(from_gray_image(&img), data);
    }

    #[test]
    fn test_png_round_trip_is_lossless() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slice_000_original.png");
        let data = Array2::from_shape_fn((17, 23), |(h, w)| ((h * 31 + w * 7) % 256) as u8);
        data.save_raw(&path).unwrap();
        assert_eq!(read_gray(&path).unwrap(), data);
    }
}
