//! 强度统计: 体数据概要, 直方图与累积分布.
//!
//! 这里只负责计算, 不负责任何展示.

use num::ToPrimitive;
use ordered_float::OrderedFloat;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{NormBounds, Volume};

/// 体数据强度概要.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VolumeSummary {
    /// 最小有限值.
    pub min: f32,

    /// 最大有限值.
    pub max: f32,

    /// 有限值的平均值.
    pub mean: f64,

    /// 中位数 (偶数个时取下中位数).
    pub median: f32,

    /// 有限值个数.
    pub finite: usize,

    /// 体素总数.
    pub total: usize,
}

impl VolumeSummary {
    /// 统计 `volume` 中所有有限体素. 若不存在有限体素则返回 `None`.
    pub fn of(volume: &Volume) -> Option<Self> {
        Self::of_values(volume.data().iter().copied())
    }

    /// 统计任意浮点序列中的有限值. 若不存在有限值则返回 `None`.
    pub fn of_values<I: IntoIterator<Item = f32>>(it: I) -> Option<Self> {
        let mut total = 0usize;
        let mut finite: Vec<OrderedFloat<f32>> = Vec::new();
        for v in it {
            total += 1;
            if v.is_finite() {
                finite.push(OrderedFloat(v));
            }
        }
        if finite.is_empty() {
            return None;
        }
        let mid = (finite.len() - 1) / 2;
        let (_, median, _) = finite.select_nth_unstable(mid);
        let median = median.0;
        let sum: f64 = finite.iter().map(|v| v.0 as f64).sum();
        let (min, max) = finite
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v.0), hi.max(v.0))
            });
        Some(Self {
            min,
            max,
            mean: sum / finite.len() as f64,
            median,
            finite: finite.len(),
            total,
        })
    }
}

/// 等宽直方图.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Histogram {
    lower: f64,
    upper: f64,
    counts: Vec<u64>,
}

impl Histogram {
    /// 以 `bounds` 给出的值域构建 `bins` 个等宽区间的直方图.
    ///
    /// 区间左闭右开, 最后一个区间右闭; 值域外的值和非有限值不计数.
    /// `bins == 0` 时按 1 处理. 退化值域下所有等于最小值的值都落在第一个区间.
    pub fn new<T, I>(values: I, bins: usize, bounds: NormBounds) -> Self
    where
        T: ToPrimitive,
        I: IntoIterator<Item = T>,
    {
        let bins = bins.max(1);
        let lower = bounds.min() as f64;
        let upper = bounds.max() as f64;
        let width = upper - lower;
        let mut counts = vec![0u64; bins];
        for v in values.into_iter().filter_map(|v| v.to_f64()) {
            if !v.is_finite() || v < lower || v > upper {
                continue;
            }
            let bin = if width == 0.0 {
                0
            } else {
                (((v - lower) / width * bins as f64) as usize).min(bins - 1)
            };
            counts[bin] += 1;
        }
        Self {
            lower,
            upper,
            counts,
        }
    }

    /// 各区间计数.
    #[inline]
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// 计数总和.
    #[inline]
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// 区间边界, 共 `bins + 1` 个.
    pub fn edges(&self) -> Vec<f64> {
        let bins = self.counts.len();
        let width = (self.upper - self.lower) / bins as f64;
        (0..=bins).map(|i| self.lower + width * i as f64).collect()
    }

    /// 归一化的累积分布函数. 非空时最后一个元素为 1; 空直方图返回全 0.
    pub fn cdf(&self) -> Vec<f64> {
        let total = self.total();
        let mut acc = 0u64;
        self.counts
            .iter()
            .map(|&c| {
                acc += c;
                if total == 0 {
                    0.0
                } else {
                    acc as f64 / total as f64
                }
            })
            .collect()
    }
}
