//! 数据集操作: 原图/边缘图配对, 读取, 增强, 分批.

use std::path::{Path, PathBuf};

pub mod augment;
mod batch;
pub mod loader;
mod npz;
pub mod pairing;

pub use augment::Flip;
pub use batch::{Batch, Batches, Dataset, DatasetOptions, Prefetch};
pub use npz::{write_batches, BatchArchive};
pub use pairing::{pair_images, ImagePair, PairingReport, PairingStrategy};

/// 获取 `{用户主目录}/dataset` 目录.
pub fn home_dataset_dir() -> Option<PathBuf> {
    let mut ans = dirs::home_dir()?;
    ans.push("dataset");
    Some(ans)
}

/// 获取 `{用户主目录}/dataset` 目录下给定继续项组成的全路径.
pub fn home_dataset_dir_with<P: AsRef<Path>, I: IntoIterator<Item = P>>(it: I) -> Option<PathBuf> {
    let mut ans = home_dataset_dir()?;
    ans.extend(it);
    Some(ans)
}
