use std::path::{Path, PathBuf};

use super::{ensure_dir, write_normalized};
use crate::consts::naming::{IMG_EXT, PREVIEW_PREFIX};
use crate::data::evenly_spaced_indices;
use crate::error::PrepResult;
use crate::Volume;

/// 从 `volume` 中等距抽取 `n` 个切片, 归一化后以 `preview_{index:03}.png` 写到 `out_dir`.
///
/// 重复的下标只写一次. 返回写出的文件路径, 按切片编号升序排列.
pub fn export_preview<P: AsRef<Path>>(
    volume: &Volume,
    out_dir: P,
    n: usize,
) -> PrepResult<Vec<PathBuf>> {
    let out_dir = out_dir.as_ref();
    ensure_dir(out_dir)?;

    let mut indices = evenly_spaced_indices(volume.len_slices(), n);
    indices.dedup();

    let mut written = Vec::with_capacity(indices.len());
    for index in indices {
        let img = volume.slice_at(index).normalize_local();
        let name = format!("{PREVIEW_PREFIX}{index:03}.{IMG_EXT}");
        written.push(write_normalized(&img, out_dir, &name)?);
    }
    log::debug!("wrote {} preview slices", written.len());
    Ok(written)
}
