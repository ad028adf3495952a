// 该文件是 Shanan （山南西风） 项目的一部分。
// src/team.rs - 队伍评测流程
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
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{error, info, warn};

use crate::{
  config::{ConfigError, ContestConfig},
  frame::BatchImage,
  input::{self, InputError},
  model::{DetectRect, Model},
  output::{OutputError, ResultsReport},
  power::{DataRecorder, PowerError, PowerSensor},
};

pub const BITSTREAM_FILE_NAME: &str = "dac_sdc.bit";

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum TeamError {
  #[error("配置错误: {0}")]
  Config(#[from] ConfigError),
  #[error("无法创建目录 {path}: {source}")]
  CreateDir {
    path: PathBuf,
    source: std::io::Error,
  },
  #[error("输入错误: {0}")]
  Input(#[from] InputError),
  #[error("功耗采样错误: {0}")]
  Power(#[from] PowerError),
  #[error("输出错误: {0}")]
  Output(#[from] OutputError),
  #[error("第 {batch} 批提供了 {images} 张图片, 但只返回了 {detections} 个检测框")]
  DetectionCountMismatch {
    batch: usize,
    images: usize,
    detections: usize,
  },
  #[error("第 {batch} 批推理失败: {source}")]
  Model { batch: usize, source: BoxError },
}

/// 累计耗时（秒）与能耗（焦耳）
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunTotals {
  pub runtime: f64,
  pub energy: f64,
}

/// 单批次的测量结果
#[derive(Debug, Clone, PartialEq)]
pub struct BatchStats {
  /// 从 1 开始的批次编号
  pub batch: usize,
  pub images: usize,
  pub runtime: f64,
  pub energy: f64,
  /// 各电源轨平均功率之和（瓦）
  pub mean_power: f64,
  pub samples: usize,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
  pub totals: RunTotals,
  pub images: usize,
  pub batches: Vec<BatchStats>,
  /// 未写出结果文件时为 `None`
  pub report: Option<PathBuf>,
}

/// 一支队伍的评测上下文
///
/// 持有按编号排序的图片列表与批次游标。游标只由 [`Team::get_next_batch`]
/// 前移，由 [`Team::reset_batch_count`] 归零。
pub struct Team {
  name: String,
  team_dir: PathBuf,
  result_dir: PathBuf,
  image_list: Vec<PathBuf>,
  current_batch_idx: usize,
  batch_size: usize,
  sample_interval: Duration,
  recorder: DataRecorder,
  totals: RunTotals,
  result_rects: Vec<DetectRect>,
}

impl Team {
  pub fn new(
    name: impl Into<String>,
    config: ContestConfig,
    sensor: Arc<dyn PowerSensor>,
  ) -> Result<Self, TeamError> {
    config.validate()?;
    if sensor.rails().is_empty() {
      error!("功耗传感器没有可监测的电源轨");
      return Err(PowerError::NoRails.into());
    }
    let name = name.into();

    let team_dir = config.contest_root.join(&name);
    let result_dir = config.result_root.join(&name);
    for dir in [&team_dir, &result_dir] {
      std::fs::create_dir_all(dir).map_err(|source| {
        error!("无法创建目录: {}", dir.display());
        TeamError::CreateDir {
          path: dir.clone(),
          source,
        }
      })?;
    }

    let image_list = input::scan_image_dir(&config.image_dir, &config.image_extension)?;
    info!(
      "队伍 {}: {} 张图片, 每批 {} 张",
      name,
      image_list.len(),
      config.batch_size
    );

    Ok(Self {
      name,
      team_dir,
      result_dir,
      image_list,
      current_batch_idx: 0,
      batch_size: config.batch_size,
      sample_interval: config.sample_interval,
      recorder: DataRecorder::new(sensor),
      totals: RunTotals::default(),
      result_rects: Vec::new(),
    })
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn team_dir(&self) -> &Path {
    &self.team_dir
  }

  pub fn result_dir(&self) -> &Path {
    &self.result_dir
  }

  pub fn image_list(&self) -> &[PathBuf] {
    &self.image_list
  }

  pub fn current_batch_idx(&self) -> usize {
    self.current_batch_idx
  }

  pub fn rails(&self) -> &[String] {
    self.recorder.rails()
  }

  /// 上一次 [`Team::run`] 的累计值
  pub fn totals(&self) -> RunTotals {
    self.totals
  }

  /// 上一次 [`Team::run`] 累计的检测框，顺序与图片列表一致
  pub fn results(&self) -> &[DetectRect] {
    &self.result_rects
  }

  pub fn bitstream_path(&self) -> PathBuf {
    self.team_dir.join(BITSTREAM_FILE_NAME)
  }

  /// 返回下一批图片路径并前移游标，图片用尽后返回空切片
  pub fn get_next_batch(&mut self) -> &[PathBuf] {
    let len = self.image_list.len();
    let start = self.current_batch_idx.saturating_mul(self.batch_size).min(len);
    let end = start.saturating_add(self.batch_size).min(len);
    self.current_batch_idx = self.current_batch_idx.saturating_add(1);
    &self.image_list[start..end]
  }

  pub fn reset_batch_count(&mut self) {
    self.current_batch_idx = 0;
  }

  /// 读取下一批图片到内存，不计入耗时与能耗
  pub fn load_images_to_memory(&mut self) -> Result<Vec<BatchImage>, TeamError> {
    let paths = self.get_next_batch().to_vec();
    Ok(input::load_batch(&paths)?)
  }

  /// 逐批调用模型，测量耗时与能耗并写出 `results.xml`
  ///
  /// 任何一批出错都会中止整次评测，不写出结果文件。
  pub fn run<M>(&mut self, mut model: M) -> Result<RunSummary, TeamError>
  where
    M: Model,
    M::Error: Into<BoxError>,
  {
    self.totals = RunTotals::default();
    self.result_rects.clear();
    let mut batches = Vec::new();

    loop {
      let batch = self.load_images_to_memory()?;
      if batch.is_empty() {
        break;
      }
      let batch_idx = self.current_batch_idx;
      info!("第 {} 批开始, {} 张图片", batch_idx, batch.len());

      let ((result, elapsed), power) = self.recorder.record(self.sample_interval, || {
        let start = Instant::now();
        let result = model.infer(&batch);
        (result, start.elapsed())
      })?;

      let rects = result.map_err(|err| TeamError::Model {
        batch: batch_idx,
        source: err.into(),
      })?;
      if rects.len() != batch.len() {
        error!(
          "第 {} 批提供了 {} 张图片, 但只返回了 {} 个检测框",
          batch_idx,
          batch.len(),
          rects.len()
        );
        return Err(TeamError::DetectionCountMismatch {
          batch: batch_idx,
          images: batch.len(),
          detections: rects.len(),
        });
      }

      let runtime = elapsed.as_secs_f64();
      let mean_power = power.total_mean_power();
      let energy = mean_power * runtime;
      info!(
        "第 {} 批完成, 耗时 {:.4} 秒, 能耗 {:.4} 焦耳",
        batch_idx, runtime, energy
      );

      self.totals.runtime += runtime;
      self.totals.energy += energy;
      self.result_rects.extend(rects);
      batches.push(BatchStats {
        batch: batch_idx,
        images: batch.len(),
        runtime,
        energy,
        mean_power,
        samples: power.sample_count(),
      });

      // 加载下一批之前释放本批图像
      drop(batch);
    }

    let images = self.result_rects.len();
    info!(
      "全部批次完成, 总耗时 {} 秒, 总能耗 {} 焦耳",
      self.totals.runtime, self.totals.energy
    );

    if batches.is_empty() && !self.image_list.is_empty() {
      warn!("批次游标已用尽, 本次评测没有处理任何图片; 调用 reset_batch_count 以重新评测");
      return Ok(RunSummary {
        totals: self.totals,
        images,
        batches,
        report: None,
      });
    }

    let report = ResultsReport::new(
      self.totals.runtime,
      self.totals.energy,
      &self.image_list,
      &self.result_rects,
    )?
    .save(&self.result_dir)?;

    Ok(RunSummary {
      totals: self.totals,
      images,
      batches,
      report: Some(report),
    })
  }
}
