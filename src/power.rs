// 该文件是 Shanan （山南西风） 项目的一部分。
// src/power.rs - 功耗采样
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

use std::path::PathBuf;

use thiserror::Error;
use url::Url;

use crate::FromUrl;

/// 比赛板卡上参与能耗统计的电源轨
pub const CONTEST_RAILS: [&str; 6] = ["1V2", "PSDDR", "INT", "PSINT_LP", "PSINT_FP", "PSPLL"];

/// 功耗传感器，按固定顺序给出各电源轨的瞬时功率（瓦）
pub trait PowerSensor: Send + Sync {
  fn rails(&self) -> &[String];
  fn read_power(&self) -> Result<Vec<f64>, PowerError>;
}

mod fixed;
mod recorder;
pub use self::fixed::FixedPowerSensor;
pub use self::recorder::{DataRecorder, PowerFrame, Recording};

#[cfg(feature = "hwmon_power")]
mod hwmon;
#[cfg(feature = "hwmon_power")]
pub use self::hwmon::{DEFAULT_HWMON_ROOT, HwmonRail, HwmonSensor, discover_rails};

#[derive(Error, Debug)]
pub enum PowerError {
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
  #[error("无效的传感器参数: {0}")]
  InvalidQuery(String),
  #[error("找不到电源轨: {0}")]
  RailNotFound(String),
  #[error("读取 {path} 失败: {source}")]
  Io {
    path: PathBuf,
    source: std::io::Error,
  },
  #[error("无法解析 {path} 中的功率读数: {value:?}")]
  Parse { path: PathBuf, value: String },
  #[error("功耗采样线程异常退出")]
  SamplerPanicked,
  #[error("没有可监测的电源轨")]
  NoRails,
  #[error("功率读数数量 {actual} 与电源轨数量 {expected} 不一致")]
  ReadingCountMismatch { expected: usize, actual: usize },
}

pub enum PowerSensorWrapper {
  #[cfg(feature = "hwmon_power")]
  Hwmon(HwmonSensor),
  Fixed(FixedPowerSensor),
}

impl FromUrl for PowerSensorWrapper {
  type Error = PowerError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    use crate::FromUrlWithScheme;

    #[cfg(feature = "hwmon_power")]
    {
      if url.scheme() == HwmonSensor::SCHEME {
        return Ok(PowerSensorWrapper::Hwmon(HwmonSensor::from_url(url)?));
      }
    }
    if url.scheme() == FixedPowerSensor::SCHEME {
      return Ok(PowerSensorWrapper::Fixed(FixedPowerSensor::from_url(url)?));
    }
    Err(PowerError::SchemeMismatch(url.scheme().to_string()))
  }
}

impl PowerSensor for PowerSensorWrapper {
  fn rails(&self) -> &[String] {
    match self {
      #[cfg(feature = "hwmon_power")]
      PowerSensorWrapper::Hwmon(sensor) => sensor.rails(),
      PowerSensorWrapper::Fixed(sensor) => sensor.rails(),
    }
  }

  fn read_power(&self) -> Result<Vec<f64>, PowerError> {
    match self {
      #[cfg(feature = "hwmon_power")]
      PowerSensorWrapper::Hwmon(sensor) => sensor.read_power(),
      PowerSensorWrapper::Fixed(sensor) => sensor.read_power(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn dispatches_on_scheme() {
    let url = Url::parse("fixed:?watts=2.5").unwrap();
    let sensor = PowerSensorWrapper::from_url(&url).unwrap();
    assert_eq!(sensor.rails(), ["FIXED"]);
    assert_eq!(sensor.read_power().unwrap(), vec![2.5]);

    let url = Url::parse("ina3221:///dev/null").unwrap();
    assert!(matches!(
      PowerSensorWrapper::from_url(&url),
      Err(PowerError::SchemeMismatch(scheme)) if scheme == "ina3221"
    ));
  }
}
