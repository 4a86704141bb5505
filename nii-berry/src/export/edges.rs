use std::path::Path;

use super::{ensure_dir, write_normalized, EdgeReport, SliceKind};
use crate::error::PrepResult;
use crate::Volume;

/// 为 `volume` 的每个切片生成 Sobel 边缘图, 写到 `out_dir`.
///
/// 每个切片的边缘图用其自身的最小值和值域归一化 (不跨切片共享边界),
/// 以 `slice_{index:03}_edges.png` 命名. 所有切片都会写出, 包括值域退化的切片
/// (写出全黑图像并记录在 [`EdgeReport::degenerate`] 中).
///
/// `out_dir` 不存在时会被创建; 创建或写入失败时立即返回错误, 不重试.
pub fn generate_edge_maps<P: AsRef<Path>>(volume: &Volume, out_dir: P) -> PrepResult<EdgeReport> {
    let out_dir = out_dir.as_ref();
    ensure_dir(out_dir)?;

    let mut report = EdgeReport::default();
    for sli in volume.slice_iter() {
        let index = sli.index().unwrap_or(report.written.len());
        let edges = sli.edge_map();
        let img = edges.as_immutable().normalize_local();
        if img.is_degenerate() {
            report.degenerate.push(index);
        }
        write_normalized(&img, out_dir, &SliceKind::Edges.filename(index))?;
        report.written.push(index);
    }

    log::info!(
        "wrote {} edge maps to `{}` ({} degenerate)",
        report.written.len(),
        out_dir.display(),
        report.degenerate.len()
    );
    Ok(report)
}
