// 该文件是 Shanan （山南西风） 项目的一部分。
// src/power/fixed.rs - 固定功率传感器
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

use tracing::error;
use url::Url;

use super::{PowerError, PowerSensor};
use crate::{FromUrl, FromUrlWithScheme};

const FIXED_RAIL_NAME: &str = "FIXED";

/// 每个电源轨恒定功率，用于没有功耗传感器的主机
///
/// URL 形式：`fixed:?watts=2.5` 或 `fixed:?rail=1V2:1.5&rail=PSDDR:0.8`
#[derive(Debug, Clone)]
pub struct FixedPowerSensor {
  rails: Vec<String>,
  watts: Vec<f64>,
}

impl FixedPowerSensor {
  pub fn new<S: Into<String>>(rails: impl IntoIterator<Item = (S, f64)>) -> Self {
    let (rails, watts) = rails
      .into_iter()
      .map(|(name, watts)| (name.into(), watts))
      .unzip();
    Self { rails, watts }
  }

  pub fn single(watts: f64) -> Self {
    Self::new([(FIXED_RAIL_NAME, watts)])
  }
}

impl PowerSensor for FixedPowerSensor {
  fn rails(&self) -> &[String] {
    &self.rails
  }

  fn read_power(&self) -> Result<Vec<f64>, PowerError> {
    Ok(self.watts.clone())
  }
}

impl FromUrlWithScheme for FixedPowerSensor {
  const SCHEME: &'static str = "fixed";
}

impl FromUrl for FixedPowerSensor {
  type Error = PowerError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI scheme mismatch: expected '{}', found '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(PowerError::SchemeMismatch(url.scheme().to_string()));
    }

    let parse_watts = |value: &str| {
      value
        .parse::<f64>()
        .ok()
        .filter(|w| w.is_finite() && *w >= 0.0)
        .ok_or_else(|| PowerError::InvalidQuery(format!("非法功率值: {}", value)))
    };

    let mut rails = Vec::new();
    for (key, value) in url.query_pairs() {
      match key.as_ref() {
        "watts" => rails.push((FIXED_RAIL_NAME.to_string(), parse_watts(&value)?)),
        "rail" => {
          let (name, watts) = value
            .split_once(':')
            .ok_or_else(|| PowerError::InvalidQuery(format!("期望 NAME:WATTS, 实际 {}", value)))?;
          rails.push((name.to_string(), parse_watts(watts)?));
        }
        other => return Err(PowerError::InvalidQuery(format!("未知参数: {}", other))),
      }
    }

    if rails.is_empty() {
      return Err(PowerError::InvalidQuery("至少需要一个电源轨".to_string()));
    }

    Ok(Self::new(rails))
  }
}
