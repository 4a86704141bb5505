//! 🍇欢迎光临🍓
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::{Idx2d, Idx3d};

pub use crate::data::slice::{ImgWriteRaw, ImgWriteVis, OwnedScanSlice, ScanSlice};
pub use crate::data::{normalize, NormBounds, Normalized, Volume};

pub use crate::consts::gray::{BLACK, WHITE};
pub use crate::consts::{DEFAULT_BATCH_SIZE, DEFAULT_IMG_HEIGHT, DEFAULT_IMG_WIDTH};

pub use crate::error::{DatasetError, PrepError, VolumeError};

pub use crate::export::{export_preview, export_training_originals, generate_edge_maps, SliceKind};

pub use crate::dataset::home_dataset_dir_with;
pub use crate::dataset::{self, Dataset, DatasetOptions, PairingStrategy};

pub use crate::stats::{Histogram, VolumeSummary};
