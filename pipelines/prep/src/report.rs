//! 运行结果.

use std::io::{self, Write};

use nii_berry::dataset::{Batch, PairingReport};
use nii_berry::export::{EdgeReport, ExportReport};
use nii_berry::stats::VolumeSummary;
use nii_berry::Idx3d;

/// 一批张量的形状.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BatchShape {
    /// 样本数.
    pub len: usize,
    /// 张量高度.
    pub height: usize,
    /// 张量宽度.
    pub width: usize,
}

impl BatchShape {
    /// 读取 `batch` 的形状.
    pub fn of(batch: &Batch) -> Self {
        let (len, height, width, _) = batch.originals.dim();
        Self { len, height, width }
    }
}

/// 预处理流水线最终结果.
#[derive(Clone, Debug)]
pub struct RunReport {
    /// 体数据形状.
    pub shape: Idx3d,
    /// 体数据统计量. 没有有限体素时为 `None`.
    pub summary: Option<VolumeSummary>,
    /// 落在直方图第一个区间 (背景) 的体素比例.
    pub background: f64,
    /// 边缘图导出结果.
    pub edges: EdgeReport,
    /// 训练原图导出结果.
    pub originals: ExportReport,
    /// 预览图个数.
    pub previews: usize,
    /// 配对结果.
    pub pairing: PairingReport,
    /// 各批形状.
    pub batches: Vec<BatchShape>,
    /// 写入 npz 归档的批数.
    pub npz_batches: Option<usize>,
}

/// 将 `r` 的结果写进 `w` 中.
fn describe_into<W: Write>(r: &RunReport, w: &mut W) -> io::Result<()> {
    const S4: &str = "    ";

    let (rows, cols, slices) = r.shape;
    writeln!(w, "Volume {rows} x {cols} x {slices}:")?;
    match &r.summary {
        Some(s) => {
            writeln!(w, "{S4}Range: [{:.3}, {:.3}]", s.min, s.max)?;
            writeln!(w, "{S4}Mean / median: {:.3} / {:.3}", s.mean, s.median)?;
            writeln!(w, "{S4}Finite voxels: {} of {}", s.finite, s.total)?;
        }
        None => writeln!(w, "{S4}No finite voxels")?,
    }
    writeln!(w, "{S4}Background share: {:.2}%", r.background * 100.0)?;

    writeln!(
        w,
        "Edge maps: {} written, {} degenerate",
        r.edges.written.len(),
        r.edges.degenerate.len()
    )?;
    writeln!(
        w,
        "Training originals: {} written, {} skipped {:?}",
        r.originals.written.len(),
        r.originals.skipped.len(),
        r.originals.skipped
    )?;
    writeln!(w, "Preview slices: {}", r.previews)?;

    let p = &r.pairing;
    writeln!(
        w,
        "Pairs: {} ({} originals, {} edges)",
        p.pairs, p.originals, p.edges
    )?;
    if p.mismatch() {
        writeln!(
            w,
            "{S4}Unpaired: {} originals, {} edges",
            p.orphan_originals.len(),
            p.orphan_edges.len()
        )?;
    }

    write!(w, "Batches: {}", r.batches.len())?;
    if let Some(b) = r.batches.first() {
        write!(w, " of ({}, {}, {}, 1)", b.len, b.height, b.width)?;
    }
    if let Some(b) = r.batches.last().filter(|_| r.batches.len() > 1) {
        write!(w, ", last ({}, {}, {}, 1)", b.len, b.height, b.width)?;
    }
    if let Some(n) = r.npz_batches {
        write!(w, "\n{S4}{n} batches archived")?;
    }
    Ok(())
}

impl RunReport {
    /// 以文本形式描述运行结果.
    pub fn describe(&self) -> String {
        let mut buf = Vec::with_capacity(512);
        describe_into(self, &mut buf).expect("writing into a Vec<u8> never fails");
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// 记录运行结果.
    pub fn analyze(&self) {
        utils::sep();
        for line in self.describe().lines() {
            log::info!("{line}");
        }
        utils::sep();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe() {
        let report = RunReport {
            shape: (4, 4, 3),
            summary: None,
            background: 0.5,
            edges: EdgeReport {
                written: vec![0, 1, 2],
                degenerate: vec![1],
            },
            originals: ExportReport {
                written: vec![0, 2],
                skipped: vec![1],
            },
            previews: 3,
            pairing: PairingReport {
                originals: 2,
                edges: 3,
                pairs: 2,
                ..PairingReport::default()
            },
            batches: vec![BatchShape {
                len: 2,
                height: 8,
                width: 8,
            }],
            npz_batches: None,
        };
        let text = report.describe();
        assert!(text.contains("Volume 4 x 4 x 3"));
        assert!(text.contains("No finite voxels"));
        assert!(text.contains("1 skipped [1]"));
        assert!(text.contains("Unpaired: 0 originals, 0 edges"));
        assert!(text.contains("Batches: 1 of (2, 8, 8, 1)"));
        assert!(!text.contains("archived"));
    }
}
