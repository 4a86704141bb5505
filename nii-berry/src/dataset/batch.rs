//! 数据集组装: 配对, 读取, 增强, 分批与预取.

use std::path::Path;
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};

use ndarray::{stack, Array3, Array4, Axis};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::augment::Flip;
use super::loader::load_pair;
use super::pairing::{pair_images, ImagePair, PairingReport, PairingStrategy};
use crate::consts::{DEFAULT_BATCH_SIZE, DEFAULT_IMG_HEIGHT, DEFAULT_IMG_WIDTH, DEFAULT_PREFETCH};
use crate::error::{DatasetError, DatasetResult};

/// 数据集参数.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DatasetOptions {
    /// 张量高度.
    pub height: u32,

    /// 张量宽度.
    pub width: u32,

    /// 批大小. 最后一批可能不足.
    pub batch_size: usize,

    /// 预取批数. 仅在 [`Dataset::prefetched`] 中使用.
    pub prefetch: usize,

    /// 是否做随机翻转增强 (只应用于训练数据).
    pub augment: bool,

    /// 随机数种子. `None` 时使用系统熵.
    pub seed: Option<u64>,

    /// 配对策略.
    pub strategy: PairingStrategy,
}

impl Default for DatasetOptions {
    fn default() -> Self {
        Self {
            height: DEFAULT_IMG_HEIGHT,
            width: DEFAULT_IMG_WIDTH,
            batch_size: DEFAULT_BATCH_SIZE,
            prefetch: DEFAULT_PREFETCH,
            augment: true,
            seed: None,
            strategy: PairingStrategy::default(),
        }
    }
}

impl DatasetOptions {
    fn validate(&self) -> DatasetResult<()> {
        if self.batch_size == 0 {
            return Err(DatasetError::InvalidOption("batch size must be positive"));
        }
        if self.height == 0 || self.width == 0 {
            return Err(DatasetError::InvalidOption("image size must be positive"));
        }
        Ok(())
    }

    #[inline]
    fn size(&self) -> (u32, u32) {
        (self.height, self.width)
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// 一批样本. 张量形状均为 `(n, height, width, 1)`.
#[derive(Clone, Debug)]
pub struct Batch {
    /// 每个样本的切片编号.
    pub keys: Vec<Option<usize>>,

    /// 原图张量.
    pub originals: Array4<f32>,

    /// 边缘图张量.
    pub edges: Array4<f32>,
}

impl Batch {
    /// 批中样本数.
    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// 是否为空批.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

        /// 借助 `rayon` 并行读取一批样本对. 输出顺序与输入一致.
        fn load_jobs(jobs: &[(&ImagePair, Flip)], size: (u32, u32)) -> DatasetResult<Vec<(Array3<f32>, Array3<f32>)>> {
            jobs.par_iter().map(|&(pair, flip)| load_augmented(pair, flip, size)).collect()
        }
    } else {
        /// 依次读取一批样本对.
        fn load_jobs(jobs: &[(&ImagePair, Flip)], size: (u32, u32)) -> DatasetResult<Vec<(Array3<f32>, Array3<f32>)>> {
            jobs.iter().map(|&(pair, flip)| load_augmented(pair, flip, size)).collect()
        }
    }
}

#[inline]
fn load_augmented(
    pair: &ImagePair,
    flip: Flip,
    size: (u32, u32),
) -> DatasetResult<(Array3<f32>, Array3<f32>)> {
    let (mut original, mut edge) = load_pair(pair, size)?;
    flip.apply_pair(&mut original, &mut edge);
    Ok((original, edge))
}

/// 读取, 增强并堆叠一批样本.
fn assemble(chunk: &[ImagePair], flips: &[Flip], size: (u32, u32)) -> DatasetResult<Batch> {
    let jobs: Vec<_> = chunk.iter().zip(flips.iter().copied()).collect();
    let loaded = load_jobs(&jobs, size)?;

    let originals: Vec<_> = loaded.iter().map(|(o, _)| o.view()).collect();
    let edges: Vec<_> = loaded.iter().map(|(_, e)| e.view()).collect();
    // 所有张量都已缩放到相同尺寸, 堆叠不会失败.
    let stack_err = |_| DatasetError::InvalidOption("cannot stack tensors of different shapes");
    Ok(Batch {
        keys: chunk.iter().map(|p| p.key).collect(),
        originals: stack(Axis(0), &originals).map_err(stack_err)?,
        edges: stack(Axis(0), &edges).map_err(stack_err)?,
    })
}

/// 训练样本对数据集.
///
/// 构造时只列出并配对文件; 图像在迭代时才读取.
#[derive(Clone, Debug)]
pub struct Dataset {
    pairs: Vec<ImagePair>,
    report: PairingReport,
    options: DatasetOptions,
}

impl Dataset {
    /// 从原图目录和边缘图目录构建数据集.
    ///
    /// 两个目录的图像文件数不一致或有文件未能配对时只记录警告, 见 [`PairingReport::mismatch`].
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(
        originals_dir: P,
        edges_dir: Q,
        options: DatasetOptions,
    ) -> DatasetResult<Self> {
        options.validate()?;
        let (pairs, report) = pair_images(originals_dir, edges_dir, options.strategy)?;
        log::info!("dataset created with {} image pairs", pairs.len());
        Ok(Self {
            pairs,
            report,
            options,
        })
    }

    /// 直接由样本对构建数据集.
    pub fn from_pairs(pairs: Vec<ImagePair>, options: DatasetOptions) -> DatasetResult<Self> {
        options.validate()?;
        let report = PairingReport {
            originals: pairs.len(),
            edges: pairs.len(),
            pairs: pairs.len(),
            ..PairingReport::default()
        };
        Ok(Self {
            pairs,
            report,
            options,
        })
    }

    /// 所有样本对.
    #[inline]
    pub fn pairs(&self) -> &[ImagePair] {
        &self.pairs
    }

    /// 配对结果概要.
    #[inline]
    pub fn report(&self) -> &PairingReport {
        &self.report
    }

    /// 参数.
    #[inline]
    pub fn options(&self) -> &DatasetOptions {
        &self.options
    }

    /// 样本对个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// 是否没有任何样本对.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// 批数.
    #[inline]
    pub fn num_batches(&self) -> usize {
        self.pairs.len().div_ceil(self.options.batch_size)
    }

    /// 在当前线程上按顺序迭代所有批.
    pub fn batches(&self) -> Batches<'_> {
        Batches {
            pairs: &self.pairs,
            options: self.options,
            rng: self.options.rng(),
            cursor: 0,
        }
    }

    /// 在后台线程上预先读取最多 `options.prefetch` 批 (至少 1 批), 顺序不变.
    pub fn prefetched(self) -> Prefetch {
        let depth = self.options.prefetch.max(1);
        let (tx, rx) = mpsc::sync_channel(depth);
        let handle = thread::spawn(move || {
            for batch in self.batches() {
                // 接收端已被丢弃.
                if tx.send(batch).is_err() {
                    break;
                }
            }
        });
        Prefetch {
            rx,
            handle: Some(handle),
        }
    }
}

/// 顺序批迭代器. 遇到错误时产出该错误, 随后结束.
pub struct Batches<'a> {
    pairs: &'a [ImagePair],
    options: DatasetOptions,
    rng: StdRng,
    cursor: usize,
}

impl Iterator for Batches<'_> {
    type Item = DatasetResult<Batch>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.pairs.len() {
            return None;
        }
        let end = (self.cursor + self.options.batch_size).min(self.pairs.len());
        let chunk = &self.pairs[self.cursor..end];

        // 翻转在当前线程上按样本顺序抽取, 与是否并行读取无关.
        let flips: Vec<Flip> = chunk
            .iter()
            .map(|_| {
                if self.options.augment {
                    Flip::sample(&mut self.rng)
                } else {
                    Flip::NONE
                }
            })
            .collect();

        let batch = assemble(chunk, &flips, self.options.size());
        self.cursor = if batch.is_ok() { end } else { self.pairs.len() };
        Some(batch)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = (self.pairs.len() - self.cursor.min(self.pairs.len())).div_ceil(self.options.batch_size);
        (0, Some(n))
    }
}

/// 预取批迭代器.
pub struct Prefetch {
    rx: Receiver<DatasetResult<Batch>>,
    handle: Option<JoinHandle<()>>,
}

impl Iterator for Prefetch {
    type Item = DatasetResult<Batch>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.rx.recv() {
            Ok(batch) => Some(batch),
            Err(_) => {
                // 生产者已结束; 若其 panic 则在此处传播.
                if let Some(handle) = self.handle.take() {
                    if let Err(panic) = handle.join() {
                        std::panic::resume_unwind(panic);
                    }
                }
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::slice::ImgWriteRaw;
    use crate::export::SliceKind;
    use ndarray::{s, Array2};
    use std::path::PathBuf;

    /// 写出 `n` 对 4×4 图像: 原图第 `i` 对的左上角像素为 `i`, 边缘图为 `2 * i`.
    fn write_pairs(n: usize) -> (tempfile::TempDir, PathBuf, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let originals = dir.path().join("originals");
        let edges = dir.path().join("edges");
        std::fs::create_dir_all(&originals).unwrap();
        std::fs::create_dir_all(&edges).unwrap();
        for i in 0..n {
            let mut o = Array2::<u8>::zeros((4, 4));
            o[(0, 0)] = i as u8;
            o[(3, 3)] = 255;
            let mut e = Array2::<u8>::zeros((4, 4));
            e[(0, 0)] = 2 * i as u8;
            o.save_raw(originals.join(SliceKind::Original.filename(i))).unwrap();
            e.save_raw(edges.join(SliceKind::Edges.filename(i))).unwrap();
        }
        (dir, originals, edges)
    }

    fn options(batch_size: usize, augment: bool) -> DatasetOptions {
        DatasetOptions {
            height: 4,
            width: 4,
            batch_size,
            prefetch: 1,
            augment,
            seed: Some(1),
            strategy: PairingStrategy::BySliceIndex,
        }
    }

    #[test]
    fn test_batches_shapes_and_order() {
        let (_dir, originals, edges) = write_pairs(5);
        let ds = Dataset::new(&originals, &edges, options(2, false)).unwrap();
        assert_eq!(ds.len(), 5);
        assert_eq!(ds.num_batches(), 3);
        assert!(!ds.report().mismatch());

        let batches: Vec<Batch> = ds.batches().map(Result::unwrap).collect();
        let sizes: Vec<_> = batches.iter().map(Batch::len).collect();
        assert_eq!(sizes, [2, 2, 1]);
        assert_eq!(batches[0].originals.shape(), &[2, 4, 4, 1]);
        assert_eq!(batches[2].edges.shape(), &[1, 4, 4, 1]);

        let keys: Vec<_> = batches.iter().flat_map(|b| b.keys.clone()).collect();
        assert_eq!(keys, (0..5).map(Some).collect::<Vec<_>>());
        assert_eq!(batches[1].originals[(1, 0, 0, 0)], 3.0 / 255.0);
        assert_eq!(batches[1].edges[(1, 0, 0, 0)], 6.0 / 255.0);
    }

    #[test]
    fn test_augmented_pairs_stay_aligned() {
        let (_dir, originals, edges) = write_pairs(6);
        let ds = Dataset::new(&originals, &edges, options(4, true)).unwrap();
        for batch in ds.batches() {
            let batch = batch.unwrap();
            for (i, key) in batch.keys.iter().enumerate() {
                let k = key.unwrap() as f32;
                let o = batch.originals.slice(s![i, .., .., 0]);
                let e = batch.edges.slice(s![i, .., .., 0]);
                // 原图中值为 255 的角与值为 k 的角总是对角; 边缘图中值为 2k 的像素与原图中 k 同位置.
                let pos: (usize, usize) = o
                    .indexed_iter()
                    .find(|(_, &v)| v == 1.0)
                    .map(|(p, _)| p)
                    .unwrap();
                let opposite = (3 - pos.0, 3 - pos.1);
                assert_eq!(o[opposite], k / 255.0);
                assert_eq!(e[opposite], 2.0 * k / 255.0);
            }
        }
    }

    #[test]
    fn test_same_seed_same_flips() {
        let (_dir, originals, edges) = write_pairs(6);
        let ds = Dataset::new(&originals, &edges, options(3, true)).unwrap();
        let a: Vec<_> = ds.batches().map(|b| b.unwrap().originals).collect();
        let b: Vec<_> = ds.batches().map(|b| b.unwrap().originals).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_prefetch_matches_sequential() {
        let (_dir, originals, edges) = write_pairs(7);
        let ds = Dataset::new(&originals, &edges, options(3, true)).unwrap();
        let sequential: Vec<_> = ds.batches().map(|b| b.unwrap().edges).collect();
        let prefetched: Vec<_> = ds.prefetched().map(|b| b.unwrap().edges).collect();
        assert_eq!(sequential, prefetched);
    }

    #[test]
    fn test_broken_image_stops_iteration() {
        let (_dir, originals, edges) = write_pairs(4);
        std::fs::write(originals.join(SliceKind::Original.filename(2)), b"broken").unwrap();
        let ds = Dataset::new(&originals, &edges, options(2, false)).unwrap();
        let results: Vec<_> = ds.batches().collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(DatasetError::Image { .. })));
    }

    #[test]
    fn test_invalid_options() {
        let (_dir, originals, edges) = write_pairs(1);
        let bad = DatasetOptions {
            batch_size: 0,
            ..DatasetOptions::default()
        };
        assert!(matches!(
            Dataset::new(&originals, &edges, bad),
            Err(DatasetError::InvalidOption(_))
        ));
    }
}
