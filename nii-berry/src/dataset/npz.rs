//! 将组装好的批写入 npz 归档, 以及从归档中读回.
//!
//! 第 `i` 批存为三个数组: `originals_{i:04}`, `edges_{i:04}` (形状 `(n, h, w, 1)`, `f32`)
//! 和 `keys_{i:04}` (形状 `(n,)`, `i64`, 没有切片编号的样本记为 `-1`).

use std::fs::File;
use std::path::Path;

use ndarray::{Array1, Ix1, Ix4, OwnedRepr};
use ndarray_npy::{NpzReader, NpzWriter};

use super::batch::Batch;
use crate::error::{DatasetError, DatasetResult};

const ORIGINALS: &str = "originals";
const EDGES: &str = "edges";
const KEYS: &str = "keys";

#[inline]
fn entry_name(prefix: &str, i: usize) -> String {
    format!("{prefix}_{i:04}")
}

/// 将 `batches` 依次写入 `path`. 返回写出的批数.
///
/// 任一批出错时立即返回该错误, 已写出的部分不保证是合法的 npz 文件.
pub fn write_batches<P, I>(path: P, batches: I) -> DatasetResult<usize>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = DatasetResult<Batch>>,
{
    let path = path.as_ref();
    let file = File::create(path).map_err(|source| DatasetError::Io {
        path: path.to_owned(),
        source,
    })?;
    let mut npz = NpzWriter::new(file);

    let mut n = 0;
    for batch in batches {
        let batch = batch?;
        let keys: Array1<i64> = batch
            .keys
            .iter()
            .map(|k| k.map_or(-1, |k| k as i64))
            .collect();
        npz.add_array(entry_name(ORIGINALS, n), &batch.originals)?;
        npz.add_array(entry_name(EDGES, n), &batch.edges)?;
        npz.add_array(entry_name(KEYS, n), &keys)?;
        n += 1;
    }
    npz.finish()?;
    log::info!("wrote {n} batches to `{}`", path.display());
    Ok(n)
}

/// 已写出的批归档, 与 [`write_batches`] 的输出对应.
pub struct BatchArchive {
    reader: NpzReader<File>,
    names: Vec<String>,
}

impl BatchArchive {
    /// 打开归档.
    pub fn open<P: AsRef<Path>>(path: P) -> DatasetResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| DatasetError::Io {
            path: path.to_owned(),
            source,
        })?;
        let mut reader = NpzReader::new(file)?;
        let names = reader.names()?;
        Ok(Self { reader, names })
    }

    /// 归档中的批数.
    pub fn len(&self) -> usize {
        (0..)
            .take_while(|&i| self.resolve(&entry_name(KEYS, i)).is_some())
            .count()
    }

    /// 归档是否不含任何批?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 读取第 `i` 批.
    pub fn batch(&mut self, i: usize) -> DatasetResult<Batch> {
        let originals = self.require(ORIGINALS, i)?;
        let edges = self.require(EDGES, i)?;
        let keys = self.require(KEYS, i)?;

        let originals = self.reader.by_name::<OwnedRepr<f32>, Ix4>(&originals)?;
        let edges = self.reader.by_name::<OwnedRepr<f32>, Ix4>(&edges)?;
        let keys = self.reader.by_name::<OwnedRepr<i64>, Ix1>(&keys)?;
        Ok(Batch {
            keys: keys.iter().map(|&k| usize::try_from(k).ok()).collect(),
            originals,
            edges,
        })
    }

    /// 归档内的实际条目名 (可能带 `.npy` 后缀).
    fn resolve(&self, name: &str) -> Option<&str> {
        self.names
            .iter()
            .find(|n| n.strip_suffix(".npy").unwrap_or(n.as_str()) == name)
            .map(String::as_str)
    }

    fn require(&self, prefix: &str, i: usize) -> DatasetResult<String> {
        let name = entry_name(prefix, i);
        match self.resolve(&name) {
            Some(entry) => Ok(entry.to_owned()),
            None => Err(DatasetError::MissingArray(name)),
        }
    }
}
