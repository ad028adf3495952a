// 该文件是 Shanan （山南西风） 项目的一部分。
// src/args.rs - 评测程序参数配置
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use url::Url;

use dac_sdc::config::{DEFAULT_BATCH_SIZE, DEFAULT_CONTEST_ROOT, DEFAULT_IMAGE_EXTENSION};
use dac_sdc::ContestConfig;

/// DAC-SDC 评测程序参数配置
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 队伍名称，用于工作目录与结果目录
  #[arg(long, value_name = "NAME")]
  pub team: String,

  /// 评测根目录
  #[arg(long, default_value = DEFAULT_CONTEST_ROOT, value_name = "DIR")]
  pub root: PathBuf,

  /// 图片目录（默认为 <root>/images）
  #[arg(long, value_name = "DIR")]
  pub images: Option<PathBuf>,

  /// 结果根目录（默认为 <root>/result）
  #[arg(long, value_name = "DIR")]
  pub results: Option<PathBuf>,

  /// 每批图片数量
  #[arg(long, default_value_t = DEFAULT_BATCH_SIZE, value_name = "COUNT")]
  pub batch_size: usize,

  /// 图片扩展名
  #[arg(long, default_value = DEFAULT_IMAGE_EXTENSION, value_name = "EXT")]
  pub extension: String,

  /// 功耗传感器
  /// 支持格式:
  /// - hwmon: 或 hwmon:///sys/class/hwmon?rail=1V2&rail=PSDDR
  /// - fixed:?watts=2.5
  #[arg(long, default_value = "hwmon:", value_name = "SENSOR")]
  pub power: Url,

  /// 功耗采样间隔（毫秒）
  #[arg(long, default_value = "50", value_name = "MS")]
  pub sample_interval_ms: u64,

  /// 评测次数，每次之间重置批次游标
  #[arg(long, default_value = "1", value_name = "COUNT")]
  pub runs: usize,
}

impl Args {
  pub fn contest_config(&self) -> ContestConfig {
    let mut config = ContestConfig::new(&self.root)
      .with_batch_size(self.batch_size)
      .with_image_extension(self.extension.clone())
      .with_sample_interval(Duration::from_millis(self.sample_interval_ms));
    if let Some(images) = &self.images {
      config = config.with_image_dir(images.clone());
    }
    if let Some(results) = &self.results {
      config = config.with_result_root(results.clone());
    }
    config
  }
}
