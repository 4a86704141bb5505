//! 原图目录与边缘图目录之间的文件配对.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::consts::naming::IMG_EXTS;
use crate::error::{DatasetError, DatasetResult};
use crate::export::{parse_slice_filename, SliceKind};

/// 配对策略.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PairingStrategy {
    /// 两个目录各自按文件名排序后, 第 `i` 个与第 `i` 个配对, 截断到较短的一侧.
    ///
    /// 只要任意一侧缺少某个切片, 其后的所有样本对都会错位.
    ByPosition,

    /// 按文件名中的切片编号 (`slice_{index}_{tag}.png`) 配对.
    /// 无法解析编号或找不到对应编号的文件不参与配对.
    #[default]
    BySliceIndex,
}

/// 一个训练样本对: 原图文件与边缘图文件.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ImagePair {
    /// 切片编号. 按位置配对时取原图文件名中的编号 (若能解析).
    pub key: Option<usize>,

    /// 原图路径.
    pub original: PathBuf,

    /// 边缘图路径.
    pub edge: PathBuf,
}

impl ImagePair {
    /// 两个文件名中的切片编号是否一致, 且类别分别为原图和边缘图?
    ///
    /// 任意一侧无法解析编号或类别不符时返回 `false`.
    pub fn is_consistent(&self) -> bool {
        match (
            slice_key(&self.original, SliceKind::Original),
            slice_key(&self.edge, SliceKind::Edges),
        ) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

/// 配对结果概要.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PairingReport {
    /// 原图目录中的图像文件数.
    pub originals: usize,

    /// 边缘图目录中的图像文件数.
    pub edges: usize,

    /// 成功配对数.
    pub pairs: usize,

    /// 未参与配对的原图.
    pub orphan_originals: Vec<PathBuf>,

    /// 未参与配对的边缘图.
    pub orphan_edges: Vec<PathBuf>,
}

impl PairingReport {
    /// 是否有未参与配对的文件?
    #[inline]
    pub fn has_orphans(&self) -> bool {
        !self.orphan_originals.is_empty() || !self.orphan_edges.is_empty()
    }

    /// 两个目录的图像文件数不一致, 或者有文件未参与配对?
    ///
    /// 文件数相同但切片编号互不对应时同样返回 `true`.
    #[inline]
    pub fn mismatch(&self) -> bool {
        self.originals != self.edges || self.has_orphans()
    }
}

/// 文件名中的切片编号. 类别不是 `kind` 的文件没有编号.
#[inline]
fn slice_key(path: &Path, kind: SliceKind) -> Option<usize> {
    parse_slice_filename(path.file_name()?.to_str()?)
        .filter(|&(_, k)| k == kind)
        .map(|(index, _)| index)
}

/// 文件扩展名是否是可识别的图像格式?
fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| IMG_EXTS.iter().any(|x| x.eq_ignore_ascii_case(e)))
}

/// 列出 `dir` 下所有图像文件, 按文件名升序排列. 不递归.
pub fn list_images<P: AsRef<Path>>(dir: P) -> DatasetResult<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let io_err = |source| DatasetError::Io {
        path: dir.to_owned(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_file() && is_image(&path) {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// 将两个已排序的文件列表配对.
pub fn pair_files(
    originals: Vec<PathBuf>,
    edges: Vec<PathBuf>,
    strategy: PairingStrategy,
) -> (Vec<ImagePair>, PairingReport) {
    let mut report = PairingReport {
        originals: originals.len(),
        edges: edges.len(),
        ..PairingReport::default()
    };

    let pairs: Vec<ImagePair> = match strategy {
        PairingStrategy::ByPosition => {
            let n = originals.len().min(edges.len());
            let mut originals = originals.into_iter();
            let mut edges = edges.into_iter();
            let pairs = originals
                .by_ref()
                .zip(edges.by_ref())
                .take(n)
                .map(|(original, edge)| ImagePair {
                    key: slice_key(&original, SliceKind::Original),
                    original,
                    edge,
                })
                .collect();
            report.orphan_originals.extend(originals);
            report.orphan_edges.extend(edges);
            pairs
        }
        PairingStrategy::BySliceIndex => {
            let mut by_key = BTreeMap::new();
            for original in originals {
                match slice_key(&original, SliceKind::Original) {
                    Some(k) if !by_key.contains_key(&k) => {
                        by_key.insert(k, original);
                    }
                    _ => report.orphan_originals.push(original),
                }
            }

            let mut pairs = Vec::with_capacity(by_key.len());
            let mut seen = BTreeMap::new();
            for edge in edges {
                let Some(k) = slice_key(&edge, SliceKind::Edges).filter(|k| !seen.contains_key(k)) else {
                    report.orphan_edges.push(edge);
                    continue;
                };
                match by_key.remove(&k) {
                    Some(original) => {
                        seen.insert(k, ());
                        pairs.push(ImagePair {
                            key: Some(k),
                            original,
                            edge,
                        });
                    }
                    None => report.orphan_edges.push(edge),
                }
            }
            report.orphan_originals.extend(by_key.into_values());
            pairs.sort_by_key(|p| p.key);
            pairs
        }
    };

    report.pairs = pairs.len();
    (pairs, report)
}

/// 列出两个目录中的图像并配对.
///
/// 当两个目录的图像文件数不一致, 或有文件未能配对时记录一条警告 (不会返回错误),
/// 调用方可通过 [`PairingReport::mismatch`] 判断.
pub fn pair_images<P: AsRef<Path>, Q: AsRef<Path>>(
    originals_dir: P,
    edges_dir: Q,
    strategy: PairingStrategy,
) -> DatasetResult<(Vec<ImagePair>, PairingReport)> {
    let originals = list_images(originals_dir)?;
    let edges = list_images(edges_dir)?;
    let (pairs, report) = pair_files(originals, edges, strategy);
    if report.mismatch() {
        log::warn!(
            "found {} originals and {} edges, mismatch! {} pairs kept, {} + {} unpaired ({:?})",
            report.originals,
            report.edges,
            report.pairs,
            report.orphan_originals.len(),
            report.orphan_edges.len(),
            strategy
        );
    }
    Ok((pairs, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::SliceKind;

    fn names(kind: SliceKind, indices: impl IntoIterator<Item = usize>) -> Vec<PathBuf> {
        indices
            .into_iter()
            .map(|i| PathBuf::from(kind.filename(i)))
            .collect()
    }

    /// 10 张边缘图, 8 张原图 (第 3, 6 个切片退化被跳过).
    fn skipped_two() -> (Vec<PathBuf>, Vec<PathBuf>) {
        let originals = names(SliceKind::Original, (0..10).filter(|i| *i != 3 && *i != 6));
        let edges = names(SliceKind::Edges, 0..10);
        (originals, edges)
    }

    #[test]
    fn test_positional_pairing_misaligns() {
        let (originals, edges) = skipped_two();
        let (pairs, report) = pair_files(originals, edges, PairingStrategy::ByPosition);

        assert!(report.mismatch());
        assert_eq!((report.originals, report.edges, report.pairs), (8, 10, 8));
        assert_eq!(report.orphan_edges.len(), 2);
        assert!(report.orphan_originals.is_empty());

        let wrong = pairs.iter().filter(|p| !p.is_consistent()).count();
        assert!(wrong >= 2, "expected misaligned pairs, got {wrong}");
        // 第一个缺口之前仍然对齐.
        assert!(pairs[..3].iter().all(ImagePair::is_consistent));
        assert!(!pairs[3].is_consistent());
    }

    #[test]
    fn test_slice_index_pairing_stays_aligned() {
        let (originals, edges) = skipped_two();
        let (pairs, report) = pair_files(originals, edges, PairingStrategy::BySliceIndex);

        assert!(report.mismatch());
        assert_eq!(report.pairs, 8);
        assert!(pairs.iter().all(ImagePair::is_consistent));
        let keys: Vec<_> = pairs.iter().filter_map(|p| p.key).collect();
        assert_eq!(keys, [0, 1, 2, 4, 5, 7, 8, 9]);
        assert_eq!(report.orphan_edges, names(SliceKind::Edges, [3, 6]));
    }

    #[test]
    fn test_slice_index_pairing_unparsable_and_duplicates() {
        let originals = vec![
            PathBuf::from("slice_001_original.png"),
            PathBuf::from("slice_1_original.png"),
            PathBuf::from("scan.png"),
        ];
        let edges = vec![
            PathBuf::from("slice_001_edges.png"),
            PathBuf::from("slice_01_edges.png"),
        ];
        let (pairs, report) = pair_files(originals, edges, PairingStrategy::BySliceIndex);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].key, Some(1));
        assert_eq!(report.orphan_originals.len(), 2);
        assert_eq!(report.orphan_edges, vec![PathBuf::from("slice_01_edges.png")]);
        assert!(report.mismatch());
    }

    #[test]
    fn test_list_images_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.png", "a.PNG", "notes.txt", "c.jpeg", "d"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        fs::create_dir(dir.path().join("sub.png")).unwrap();

        let files = list_images(dir.path()).unwrap();
        let got: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(got, ["a.PNG", "b.png", "c.jpeg"]);

        assert!(matches!(
            list_images(dir.path().join("missing")),
            Err(DatasetError::Io { .. })
        ));
    }

    #[test]
    fn test_disjoint_keys_are_reported() {
        let originals = names(SliceKind::Original, [0, 1]);
        let edges = names(SliceKind::Edges, [2, 3]);
        let (pairs, report) = pair_files(originals, edges, PairingStrategy::BySliceIndex);

        assert!(pairs.is_empty());
        assert_eq!((report.originals, report.edges), (2, 2));
        assert!(report.has_orphans());
        assert!(report.mismatch());
        assert_eq!(report.orphan_originals.len(), 2);
        assert_eq!(report.orphan_edges.len(), 2);
    }

    #[test]
    fn test_wrong_kind_is_not_paired() {
        let originals = names(SliceKind::Original, [3, 4]);
        // 误放入边缘图目录的原图.
        let mut edges = names(SliceKind::Edges, [3]);
        edges.extend(names(SliceKind::Original, [4]));
        let (pairs, report) = pair_files(originals, edges, PairingStrategy::BySliceIndex);

        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].key, Some(3));
        assert_eq!(report.orphan_edges, names(SliceKind::Original, [4]));
        assert_eq!(report.orphan_originals, names(SliceKind::Original, [4]));
        assert!(report.mismatch());

        let swapped = ImagePair {
            key: Some(4),
            original: PathBuf::from(SliceKind::Edges.filename(4)),
            edge: PathBuf::from(SliceKind::Original.filename(4)),
        };
        assert!(!swapped.is_consistent());
    }
}
