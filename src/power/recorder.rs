// 该文件是 Shanan （山南西风） 项目的一部分。
// src/power/recorder.rs - 功耗记录会话
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

use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, warn};

use super::{PowerError, PowerSensor};

type Samples = Vec<Vec<f64>>;

/// 功耗记录器
///
/// 每次 [`DataRecorder::start`] 启动一个采样线程，返回的 [`Recording`]
/// 在结束或被丢弃时停止采样。
#[derive(Clone)]
pub struct DataRecorder {
  sensor: Arc<dyn PowerSensor>,
}

impl DataRecorder {
  pub fn new(sensor: Arc<dyn PowerSensor>) -> Self {
    Self { sensor }
  }

  pub fn rails(&self) -> &[String] {
    self.sensor.rails()
  }

  /// 启动采样会话
  ///
  /// 第一个采样点在当前线程上读取，返回时采样已经开始。
  pub fn start(&self, interval: Duration) -> Result<Recording, PowerError> {
    let rails = self.sensor.rails().len();
    if rails == 0 {
      return Err(PowerError::NoRails);
    }

    let mut series = vec![Vec::new(); rails];
    sample(self.sensor.as_ref(), &mut series)?;

    let (stop_tx, stop_rx) = mpsc::channel::<()>();
    let sensor = Arc::clone(&self.sensor);
    let handle = thread::spawn(move || -> Result<Samples, PowerError> {
      loop {
        match stop_rx.recv_timeout(interval) {
          Err(RecvTimeoutError::Timeout) => sample(sensor.as_ref(), &mut series)?,
          // 收到停止信号或会话已被丢弃
          _ => break,
        }
      }
      sample(sensor.as_ref(), &mut series)?;
      Ok(series)
    });

    Ok(Recording {
      rails: self.sensor.rails().to_vec(),
      stop_tx: Some(stop_tx),
      handle: Some(handle),
    })
  }

  /// 仅在 `f` 执行期间采样
  pub fn record<T>(
    &self,
    interval: Duration,
    f: impl FnOnce() -> T,
  ) -> Result<(T, PowerFrame), PowerError> {
    let recording = self.start(interval)?;
    let value = f();
    let frame = recording.finish()?;
    Ok((value, frame))
  }
}

// 读数必须与电源轨一一对应，缺失的电源轨会使能耗偏低
fn sample(sensor: &dyn PowerSensor, series: &mut Samples) -> Result<(), PowerError> {
  let readings = sensor.read_power()?;
  if readings.len() != series.len() {
    return Err(PowerError::ReadingCountMismatch {
      expected: series.len(),
      actual: readings.len(),
    });
  }
  for (rail, watts) in series.iter_mut().zip(readings) {
    rail.push(watts);
  }
  Ok(())
}

/// 进行中的采样会话
pub struct Recording {
  rails: Vec<String>,
  stop_tx: Option<Sender<()>>,
  handle: Option<JoinHandle<Result<Samples, PowerError>>>,
}

impl Recording {
  /// 停止采样并取回各电源轨的功率序列
  pub fn finish(mut self) -> Result<PowerFrame, PowerError> {
    let samples = self.stop().unwrap_or(Err(PowerError::SamplerPanicked))?;
    Ok(PowerFrame {
      rails: std::mem::take(&mut self.rails),
      samples,
    })
  }

  fn stop(&mut self) -> Option<Result<Samples, PowerError>> {
    if let Some(stop_tx) = self.stop_tx.take() {
      let _ = stop_tx.send(());
    }
    self
      .handle
      .take()
      .map(|handle| handle.join().unwrap_or(Err(PowerError::SamplerPanicked)))
  }
}

impl Drop for Recording {
  fn drop(&mut self) {
    if let Some(Err(err)) = self.stop() {
      warn!("功耗采样会话异常结束: {}", err);
    } else {
      debug!("功耗采样会话已关闭");
    }
  }
}

/// 一次会话内各电源轨的功率序列（瓦）
#[derive(Debug, Clone)]
pub struct PowerFrame {
  rails: Vec<String>,
  samples: Samples,
}

impl PowerFrame {
  pub fn rails(&self) -> &[String] {
    &self.rails
  }

  pub fn series(&self, rail: &str) -> Option<&[f64]> {
    self
      .rails
      .iter()
      .position(|name| name == rail)
      .map(|index| self.samples[index].as_slice())
  }

  pub fn mean(&self, rail: &str) -> Option<f64> {
    self.series(rail).map(mean)
  }

  /// 各电源轨平均功率之和
  pub fn total_mean_power(&self) -> f64 {
    self.samples.iter().map(|series| mean(series)).sum()
  }

  /// 单个电源轨的采样点数
  pub fn sample_count(&self) -> usize {
    self.samples.first().map(Vec::len).unwrap_or(0)
  }
}

fn mean(series: &[f64]) -> f64 {
  if series.is_empty() {
    0.0
  } else {
    series.iter().sum::<f64>() / series.len() as f64
  }
}
