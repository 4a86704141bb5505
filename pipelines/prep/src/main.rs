//! 将单个 nii 体数据转换为 (原图, 边缘图) 训练样本对数据集.
//!
//! 输入输出路径与参数见 [`utils::PrepConfig::from_env_or_home`].

mod report;
mod runner;

use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .env()
        .init()?;

    let cfg = utils::PrepConfig::from_env_or_home()?;
    log::info!("Running on {} cores...", utils::cpus());

    let report = runner::run(&cfg)?;
    report.analyze();
    Ok(())
}
