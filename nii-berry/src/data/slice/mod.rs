//! 体数据切片对象的操作.

mod core;
mod save;

pub use core::{OwnedScanSlice, ScanSlice};

pub use save::{from_gray_image, read_gray, to_gray_image, ImgWriteRaw, ImgWriteVis};
