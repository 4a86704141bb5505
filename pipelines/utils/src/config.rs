//! 预处理流水线的运行参数. 没有配置文件和命令行参数,
//! 每一项都有默认值, 并可由环境变量覆盖.

use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;

use nii_berry::consts::{DEFAULT_BATCH_SIZE, DEFAULT_IMG_HEIGHT, DEFAULT_PREVIEW_LEN};
use nii_berry::dataset::DatasetOptions;

/// 输入体数据路径.
pub const ENV_VOLUME: &str = "NII_BERRY_VOLUME";

/// 输出根目录.
pub const ENV_OUT_DIR: &str = "NII_BERRY_OUT_DIR";

/// 张量边长.
pub const ENV_IMG_SIZE: &str = "NII_BERRY_IMG_SIZE";

/// 批大小.
pub const ENV_BATCH: &str = "NII_BERRY_BATCH";

/// 增强随机数种子.
pub const ENV_SEED: &str = "NII_BERRY_SEED";

/// 是否写出 npz 归档 (`1`/`true` 或 `0`/`false`).
pub const ENV_NPZ: &str = "NII_BERRY_NPZ";

/// 配置错误.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// 无法确定用户主目录, 且没有设置对应环境变量.
    #[error("no home directory, set `${0}` instead")]
    NoHomeDir(&'static str),

    /// 环境变量的值无法解析.
    #[error("invalid value `{value}` for `${var}`")]
    Invalid {
        /// 变量名.
        var: &'static str,
        /// 原始值.
        value: String,
    },
}

/// 预处理流水线的运行参数.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PrepConfig {
    /// 输入 nii 体数据.
    pub volume: PathBuf,

    /// 输出根目录. 边缘图, 训练原图, 预览图分别写入其下的
    /// `edges`, `originals`, `preview` 子目录.
    pub out_dir: PathBuf,

    /// 预览切片个数.
    pub preview_len: usize,

    /// 是否将所有批写入 `{out_dir}/batches.npz`.
    pub write_npz: bool,

    /// 数据集参数.
    pub dataset: DatasetOptions,
}

impl PrepConfig {
    /// 获取默认参数, 再用环境变量覆盖:
    ///
    /// 1. `$NII_BERRY_VOLUME`, 否则为 `$HOME/dataset/volume.nii`;
    /// 2. `$NII_BERRY_OUT_DIR`, 否则为 `$HOME/dataset/prep`;
    /// 3. `$NII_BERRY_IMG_SIZE`, 否则为 256;
    /// 4. `$NII_BERRY_BATCH`, 否则为 8;
    /// 5. `$NII_BERRY_SEED`, 否则不固定种子;
    /// 6. `$NII_BERRY_NPZ`, 否则不写出 npz 归档.
    pub fn from_env_or_home() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// 同 [`PrepConfig::from_env_or_home`], 但通过 `lookup` 读取变量.
    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Result<Self, ConfigError> {
        let volume = path_or_home(&lookup, ENV_VOLUME, ["volume.nii"])?;
        let out_dir = path_or_home(&lookup, ENV_OUT_DIR, ["prep"])?;
        let size: u32 = parse_or(&lookup, ENV_IMG_SIZE, DEFAULT_IMG_HEIGHT)?;
        let batch_size = parse_or(&lookup, ENV_BATCH, DEFAULT_BATCH_SIZE)?;
        let seed = match lookup(ENV_SEED) {
            Some(s) => Some(parse(ENV_SEED, &s)?),
            None => None,
        };
        let write_npz = match lookup(ENV_NPZ).as_deref().map(str::trim) {
            None | Some("0") => false,
            Some("1") => true,
            Some(s) => parse(ENV_NPZ, s)?,
        };

        if size == 0 {
            return Err(invalid(ENV_IMG_SIZE, "0"));
        }
        if batch_size == 0 {
            return Err(invalid(ENV_BATCH, "0"));
        }

        Ok(Self {
            volume,
            out_dir,
            preview_len: DEFAULT_PREVIEW_LEN,
            write_npz,
            dataset: DatasetOptions {
                height: size,
                width: size,
                batch_size,
                seed,
                ..DatasetOptions::default()
            },
        })
    }

    /// 边缘图目录.
    #[inline]
    pub fn edges_dir(&self) -> PathBuf {
        self.out_dir.join("edges")
    }

    /// 训练原图目录.
    #[inline]
    pub fn originals_dir(&self) -> PathBuf {
        self.out_dir.join("originals")
    }

    /// 预览图目录.
    #[inline]
    pub fn preview_dir(&self) -> PathBuf {
        self.out_dir.join("preview")
    }

    /// npz 归档路径.
    #[inline]
    pub fn npz_path(&self) -> PathBuf {
        self.out_dir.join("batches.npz")
    }
}

fn invalid(var: &'static str, value: &str) -> ConfigError {
    ConfigError::Invalid {
        var,
        value: value.to_string(),
    }
}

fn parse<T: FromStr>(var: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| invalid(var, value))
}

fn parse_or<T, F>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        Some(s) => parse(var, &s),
        None => Ok(default),
    }
}

/// 若变量 `var` 非空, 则返回其值; 否则返回 `$HOME/dataset/{rest}`.
fn path_or_home<F, P, I>(lookup: &F, var: &'static str, rest: I) -> Result<PathBuf, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    P: AsRef<Path>,
    I: IntoIterator<Item = P>,
{
    match lookup(var).filter(|s| !s.is_empty()) {
        Some(d) => Ok(PathBuf::from(d)),
        None => nii_berry::dataset::home_dataset_dir_with(rest).ok_or(ConfigError::NoHomeDir(var)),
    }
}
