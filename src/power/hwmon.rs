// 该文件是 Shanan （山南西风） 项目的一部分。
// src/power/hwmon.rs - Linux hwmon 功耗传感器
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

use tracing::{debug, error};
use url::Url;

use super::{CONTEST_RAILS, PowerError, PowerSensor};
use crate::{FromUrl, FromUrlWithScheme};

pub const DEFAULT_HWMON_ROOT: &str = "/sys/class/hwmon";

/// hwmon 下的一个功率通道，`power<N>_input` 以微瓦为单位
#[derive(Debug, Clone)]
pub struct HwmonRail {
  pub name: String,
  pub path: PathBuf,
}

impl HwmonRail {
  pub fn read_watts(&self) -> Result<f64, PowerError> {
    let raw = std::fs::read_to_string(&self.path).map_err(|source| PowerError::Io {
      path: self.path.clone(),
      source,
    })?;
    let microwatts = raw.trim().parse::<f64>().map_err(|_| PowerError::Parse {
      path: self.path.clone(),
      value: raw.trim().to_string(),
    })?;
    Ok(microwatts / 1_000_000.0)
  }
}

fn read_trimmed(path: &Path) -> Option<String> {
  std::fs::read_to_string(path)
    .ok()
    .map(|s| s.trim().to_string())
    .filter(|s| !s.is_empty())
}

/// 扫描 hwmon 根目录下所有设备的功率通道
///
/// 通道名优先取 `power<N>_label`，否则取设备的 `name`，`N > 1` 时追加 `_power<N>`。
pub fn discover_rails(root: &Path) -> Result<Vec<HwmonRail>, PowerError> {
  let io_error = |source| PowerError::Io {
    path: root.to_path_buf(),
    source,
  };

  let mut devices = std::fs::read_dir(root)
    .map_err(io_error)?
    .map(|entry| entry.map(|e| e.path()))
    .collect::<Result<Vec<_>, _>>()
    .map_err(io_error)?;
  devices.sort();

  let mut rails = Vec::new();
  for device in devices {
    let Ok(entries) = std::fs::read_dir(&device) else {
      continue;
    };
    let device_name = read_trimmed(&device.join("name")).unwrap_or_else(|| {
      device
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
    });

    let mut channels = entries
      .filter_map(|entry| entry.ok())
      .filter_map(|entry| {
        let file_name = entry.file_name();
        let index = file_name
          .to_str()?
          .strip_prefix("power")?
          .strip_suffix("_input")?
          .parse::<u32>()
          .ok()?;
        Some((index, entry.path()))
      })
      .collect::<Vec<_>>();
    channels.sort_by_key(|(index, _)| *index);

    for (index, path) in channels {
      let name = read_trimmed(&device.join(format!("power{}_label", index))).unwrap_or_else(|| {
        if index > 1 {
          format!("{}_power{}", device_name, index)
        } else {
          device_name.clone()
        }
      });
      debug!("发现电源轨 {} -> {}", name, path.display());
      rails.push(HwmonRail { name, path });
    }
  }

  Ok(rails)
}

/// 基于 sysfs hwmon 的功耗传感器
pub struct HwmonSensor {
  names: Vec<String>,
  rails: Vec<HwmonRail>,
}

impl HwmonSensor {
  /// 使用根目录下发现的全部电源轨
  pub fn discover(root: &Path) -> Result<Self, PowerError> {
    Self::from_rails(discover_rails(root)?)
  }

  /// 按给定顺序选择电源轨，任何一个不存在即报错
  pub fn with_rails<S: AsRef<str>>(root: &Path, names: &[S]) -> Result<Self, PowerError> {
    let available = discover_rails(root)?;
    let rails = names
      .iter()
      .map(|name| {
        let name = name.as_ref();
        available
          .iter()
          .find(|rail| rail.name == name)
          .cloned()
          .ok_or_else(|| {
            error!("在 {} 下找不到电源轨 {}", root.display(), name);
            PowerError::RailNotFound(name.to_string())
          })
      })
      .collect::<Result<Vec<_>, _>>()?;
    Self::from_rails(rails)
  }

  fn from_rails(rails: Vec<HwmonRail>) -> Result<Self, PowerError> {
    if rails.is_empty() {
      return Err(PowerError::NoRails);
    }
    Ok(Self {
      names: rails.iter().map(|rail| rail.name.clone()).collect(),
      rails,
    })
  }
}

impl PowerSensor for HwmonSensor {
  fn rails(&self) -> &[String] {
    &self.names
  }

  fn read_power(&self) -> Result<Vec<f64>, PowerError> {
    self.rails.iter().map(HwmonRail::read_watts).collect()
  }
}

impl FromUrlWithScheme for HwmonSensor {
  const SCHEME: &'static str = "hwmon";
}

/// `hwmon:` 使用默认根目录与比赛电源轨；
/// `hwmon:///sys/class/hwmon?rail=1V2&rail=INT` 指定根目录与电源轨；
/// `rail=all` 选择全部电源轨。
impl FromUrl for HwmonSensor {
  type Error = PowerError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(PowerError::SchemeMismatch(url.scheme().to_string()));
    }

    let root = match url.path() {
      "" | "/" => PathBuf::from(DEFAULT_HWMON_ROOT),
      path => PathBuf::from(path),
    };

    let mut names = Vec::new();
    for (key, value) in url.query_pairs() {
      if key != "rail" {
        return Err(PowerError::InvalidQuery(format!("未知参数: {}", key)));
      }
      names.push(value.into_owned());
    }

    if names.iter().any(|name| name == "all") {
      return Self::discover(&root);
    }
    if names.is_empty() {
      return Self::with_rails(&root, &CONTEST_RAILS);
    }
    Self::with_rails(&root, &names)
  }
}
