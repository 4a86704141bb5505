//! 逐切片导出 8-bit 灰度图像.
//!
//! 边缘图与训练原图共用同一套命名规则 `slice_{index:03}_{tag}.png`,
//! 组装数据集时即以文件名中的切片编号作为配对键.

use std::fs;
use std::path::{Path, PathBuf};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::consts::naming::*;
use crate::data::slice::ImgWriteRaw;
use crate::error::{PrepError, PrepResult};
use crate::Normalized;

mod edges;
mod originals;
mod preview;

pub use edges::generate_edge_maps;
pub use originals::export_training_originals;
pub use preview::export_preview;

/// 切片图像类别.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SliceKind {
    /// 原始切片 (训练输入).
    Original,

    /// Sobel 边缘图 (训练目标).
    Edges,
}

impl SliceKind {
    /// 文件名中的类别标记.
    #[inline]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Original => ORIGINAL_TAG,
            Self::Edges => EDGES_TAG,
        }
    }

    /// 第 `index` 个切片的文件名, 如 `slice_007_edges.png`.
    #[inline]
    pub fn filename(self, index: usize) -> String {
        format!("{SLICE_PREFIX}{index:03}_{}.{IMG_EXT}", self.tag())
    }
}

/// 从文件名中解析 `(切片编号, 类别)`.
///
/// 只接受 `slice_{数字}_{original|edges}.{扩展名}` 形式; 编号位数不限.
pub fn parse_slice_filename(name: &str) -> Option<(usize, SliceKind)> {
    let stem = Path::new(name).file_stem()?.to_str()?;
    let rest = stem.strip_prefix(SLICE_PREFIX)?;
    let (digits, tag) = rest.split_once('_')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let kind = match tag {
        ORIGINAL_TAG => SliceKind::Original,
        EDGES_TAG => SliceKind::Edges,
        _ => return None,
    };
    Some((digits.parse().ok()?, kind))
}

/// 边缘图导出结果.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EdgeReport {
    /// 已写出的切片编号, 按升序排列. 总是包含所有切片.
    pub written: Vec<usize>,

    /// 其中值域退化 (写出全黑图像) 的切片编号.
    pub degenerate: Vec<usize>,
}

/// 训练原图导出结果.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExportReport {
    /// 已写出的切片编号, 按升序排列.
    pub written: Vec<usize>,

    /// 归一化结果全零而被跳过的切片编号.
    pub skipped: Vec<usize>,
}

/// 创建输出目录 (若不存在).
pub(crate) fn ensure_dir(dir: &Path) -> PrepResult<()> {
    fs::create_dir_all(dir).map_err(|source| PrepError::Io {
        path: dir.to_owned(),
        source,
    })
}

/// 将归一化结果写到 `dir/name`, 返回完整路径.
pub(crate) fn write_normalized(img: &Normalized, dir: &Path, name: &str) -> PrepResult<PathBuf> {
    let path = dir.join(name);
    img.save_raw(&path).map_err(|source| PrepError::Image {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}
