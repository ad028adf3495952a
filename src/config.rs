// 该文件是 Shanan （山南西风） 项目的一部分。
// src/config.rs - 评测目录与批处理配置
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

/// 比赛板卡上的默认评测根目录
pub const DEFAULT_CONTEST_ROOT: &str = "/home/xilinx/jupyter_notebooks/dac_sdc_2022";
pub const DEFAULT_BATCH_SIZE: usize = 1000;
pub const DEFAULT_IMAGE_EXTENSION: &str = "jpg";
pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Error, Debug)]
pub enum ConfigError {
  #[error("批大小必须大于 0")]
  ZeroBatchSize,
  #[error("功耗采样间隔必须大于 0")]
  ZeroSampleInterval,
}

/// 评测配置
///
/// 队伍工作目录为 `<contest_root>/<team>`，结果目录为 `<result_root>/<team>`。
#[derive(Debug, Clone)]
pub struct ContestConfig {
  /// 评测根目录，队伍工作目录位于其下
  pub contest_root: PathBuf,
  /// 输入图片目录
  pub image_dir: PathBuf,
  /// 结果根目录
  pub result_root: PathBuf,
  /// 每批图片数量
  pub batch_size: usize,
  /// 参与评测的图片扩展名（不含点，区分大小写）
  pub image_extension: String,
  /// 功耗采样间隔
  pub sample_interval: Duration,
}

impl ContestConfig {
  /// 以评测根目录为基准构造默认布局：`images/` 与 `result/`
  pub fn new(contest_root: impl AsRef<Path>) -> Self {
    let contest_root = contest_root.as_ref().to_path_buf();
    Self {
      image_dir: contest_root.join("images"),
      result_root: contest_root.join("result"),
      contest_root,
      batch_size: DEFAULT_BATCH_SIZE,
      image_extension: DEFAULT_IMAGE_EXTENSION.to_string(),
      sample_interval: DEFAULT_SAMPLE_INTERVAL,
    }
  }

  pub fn with_image_dir(mut self, image_dir: impl Into<PathBuf>) -> Self {
    self.image_dir = image_dir.into();
    self
  }

  pub fn with_result_root(mut self, result_root: impl Into<PathBuf>) -> Self {
    self.result_root = result_root.into();
    self
  }

  pub fn with_batch_size(mut self, batch_size: usize) -> Self {
    self.batch_size = batch_size;
    self
  }

  pub fn with_image_extension(mut self, extension: impl Into<String>) -> Self {
    self.image_extension = extension.into();
    self
  }

  pub fn with_sample_interval(mut self, interval: Duration) -> Self {
    self.sample_interval = interval;
    self
  }

  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.batch_size == 0 {
      return Err(ConfigError::ZeroBatchSize);
    }
    if self.sample_interval.is_zero() {
      return Err(ConfigError::ZeroSampleInterval);
    }
    Ok(())
  }
}

impl Default for ContestConfig {
  fn default() -> Self {
    Self::new(DEFAULT_CONTEST_ROOT)
  }
}
