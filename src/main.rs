// 该文件是 Shanan （山南西风） 项目的一部分。
// src/main.rs - DAC-SDC 评测主程序
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

mod args;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

use dac_sdc::{FromUrl, Team, model::FullFrameModel, power::PowerSensorWrapper};

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = args::Args::parse();

  info!("队伍: {}", args.team);
  info!("评测根目录: {}", args.root.display());
  info!("功耗传感器: {}", args.power);
  info!("每批图片数: {}", args.batch_size);

  let sensor = PowerSensorWrapper::from_url(&args.power)?;
  let mut team = Team::new(&args.team, args.contest_config(), Arc::new(sensor))?;
  info!("监测电源轨: {}", team.rails().join(", "));

  let bitstream = team.bitstream_path();
  if bitstream.is_file() {
    info!("比特流文件: {}", bitstream.display());
  } else {
    warn!("比特流文件不存在: {}", bitstream.display());
  }

  for run in 1..=args.runs {
    if run > 1 {
      team.reset_batch_count();
    }
    info!("开始第 {} 次评测...", run);
    let summary = team.run(FullFrameModel)?;
    info!(
      "第 {} 次评测完成: {} 张图片, {} 批, 总耗时 {:.4} 秒, 总能耗 {:.4} 焦耳",
      run,
      summary.images,
      summary.batches.len(),
      summary.totals.runtime,
      summary.totals.energy
    );
    if let Some(report) = summary.report {
      info!("结果文件: {}", report.display());
    }
  }

  Ok(())
}
