use std::path::Path;

use super::{ensure_dir, write_normalized, ExportReport, SliceKind};
use crate::error::PrepResult;
use crate::Volume;

/// 将 `volume` 的每个切片归一化后写到 `out_dir`, 作为训练输入.
///
/// 每个切片用其自身的最小值和值域归一化, 以 `slice_{index:03}_original.png` 命名.
/// 归一化结果全零的切片 (常数切片, 或所有有效值都被截断为 0) 不会写出,
/// 也不会留下占位文件; 它们被记录在 [`ExportReport::skipped`] 中.
///
/// `out_dir` 不存在时会被创建; 创建或写入失败时立即返回错误, 不重试.
pub fn export_training_originals<P: AsRef<Path>>(
    volume: &Volume,
    out_dir: P,
) -> PrepResult<ExportReport> {
    let out_dir = out_dir.as_ref();
    ensure_dir(out_dir)?;

    let mut report = ExportReport::default();
    for sli in volume.slice_iter() {
        let index = sli.index().unwrap_or(report.written.len() + report.skipped.len());
        let img = sli.normalize_local();
        if img.is_blank() {
            log::warn!("slice {index:03}: normalized slice is all zeros, skipped");
            report.skipped.push(index);
            continue;
        }
        write_normalized(&img, out_dir, &SliceKind::Original.filename(index))?;
        report.written.push(index);
    }

    log::info!(
        "wrote {} training originals to `{}` ({} skipped)",
        report.written.len(),
        out_dir.display(),
        report.skipped.len()
    );
    Ok(report)
}
