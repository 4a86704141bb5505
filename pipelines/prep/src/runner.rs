//! 程序运行函数.

use nii_berry::dataset::{self, BatchArchive, Dataset};
use nii_berry::error::{DatasetError, PrepError, VolumeError};
use nii_berry::export;
use nii_berry::stats::{Histogram, VolumeSummary};
use nii_berry::Volume;
use thiserror::Error;
use utils::PrepConfig;

use crate::report::{BatchShape, RunReport};

/// 直方图区间数.
const HIST_BINS: usize = 256;

/// 运行错误. 任何一步失败都会终止整个运行.
#[derive(Debug, Error)]
pub enum RunError {
    /// 打开体数据失败.
    #[error(transparent)]
    Volume(#[from] VolumeError),

    /// 导出切片图像失败.
    #[error(transparent)]
    Prep(#[from] PrepError),

    /// 组装数据集失败.
    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

/// 实际运行: 读取体数据 → 统计 → 边缘图 → 训练原图 → 预览图 → 组装数据集 (→ npz).
pub fn run(cfg: &PrepConfig) -> Result<RunReport, RunError> {
    log::info!("Loading volume `{}`...", cfg.volume.display());
    let volume = Volume::open(&cfg.volume)?;

    let summary = VolumeSummary::of(&volume);
    let background = Histogram::new(volume.data().iter().copied(), HIST_BINS, volume.bounds())
        .cdf()
        .first()
        .copied()
        .unwrap_or(0.0);

    log::info!("Generating edge maps...");
    let edges = export::generate_edge_maps(&volume, cfg.edges_dir())?;

    log::info!("Exporting training originals...");
    let originals = export::export_training_originals(&volume, cfg.originals_dir())?;

    let previews = export::export_preview(&volume, cfg.preview_dir(), cfg.preview_len)?.len();

    log::info!("Assembling dataset...");
    let ds = Dataset::new(cfg.originals_dir(), cfg.edges_dir(), cfg.dataset)?;
    let pairing = ds.report().clone();

    let npz_batches = if cfg.write_npz {
        let written = dataset::write_batches(cfg.npz_path(), ds.clone().prefetched())?;
        let archived = BatchArchive::open(cfg.npz_path())?.len();
        if archived != written {
            log::warn!("wrote {written} batches but the archive holds {archived}");
        }
        Some(archived)
    } else {
        None
    };

    let mut batches = Vec::with_capacity(ds.num_batches());
    for batch in ds.prefetched() {
        let batch = batch?;
        batches.push(BatchShape::of(&batch));
    }

    Ok(RunReport {
        shape: volume.shape(),
        summary,
        background,
        edges,
        originals,
        previews,
        pairing,
        batches,
        npz_batches,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;
    use nifti::writer::WriterOptions;
    use nii_berry::dataset::DatasetOptions;

    /// 4 个切片的体数据, 第 1 个切片为常数.
    fn write_volume(path: &std::path::Path) {
        let data = Array3::from_shape_fn((10, 8, 4), |(r, c, s)| match s {
            1 => 3.0f32,
            _ => (r * 8 + c + s) as f32,
        });
        WriterOptions::new(path).write_nifti(&data).unwrap();
    }

    fn config(dir: &std::path::Path, write_npz: bool) -> PrepConfig {
        PrepConfig {
            volume: dir.join("volume.nii"),
            out_dir: dir.join("prep"),
            preview_len: 3,
            write_npz,
            dataset: DatasetOptions {
                height: 8,
                width: 8,
                batch_size: 2,
                seed: Some(3),
                ..DatasetOptions::default()
            },
        }
    }

    #[test]
    fn test_run() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path(), true);
        write_volume(&cfg.volume);

        let report = run(&cfg).unwrap();
        assert_eq!(report.shape, (10, 8, 4));
        assert_eq!(report.edges.written, [0, 1, 2, 3]);
        assert_eq!(report.originals.written, [0, 2, 3]);
        assert_eq!(report.originals.skipped, [1]);
        assert_eq!(report.previews, 3);
        assert_eq!(report.pairing.pairs, 3);
        assert!(report.pairing.mismatch());
        assert_eq!(
            report.batches,
            [
                BatchShape { len: 2, height: 8, width: 8 },
                BatchShape { len: 1, height: 8, width: 8 },
            ]
        );
        assert_eq!(report.npz_batches, Some(2));
        assert!(cfg.npz_path().is_file());
        assert!(report.describe().contains("2 batches archived"));
    }

    #[test]
    fn test_run_without_npz() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path(), false);
        write_volume(&cfg.volume);

        let report = run(&cfg).unwrap();
        assert_eq!(report.npz_batches, None);
        assert!(!cfg.npz_path().exists());
    }

    #[test]
    fn test_missing_volume_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path(), false);
        assert!(matches!(run(&cfg), Err(RunError::Volume(_))));
        assert!(!cfg.edges_dir().exists());
    }
}
