// 该文件是 Shanan （山南西风） 项目的一部分。
// src/input/read_image_file.rs - 图像文件读取
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

use image::ImageReader;
use tracing::error;

use super::InputError;
use crate::frame::{BatchImage, RgbFrame};

/// 读取并解码一张图片，统一转换为 RGB 三通道
pub fn load_image(path: &Path) -> Result<RgbFrame, InputError> {
  let reader = ImageReader::open(path)
    .and_then(|reader| reader.with_guessed_format())
    .map_err(|source| InputError::Open {
      path: path.to_path_buf(),
      source,
    })?;

  let image = reader.decode().map_err(|source| {
    error!("图片解码失败: {}", path.display());
    InputError::Decode {
      path: path.to_path_buf(),
      source,
    }
  })?;

  Ok(RgbFrame::from(image.to_rgb8()))
}

/// 按顺序读取一批图片，任何一张失败即返回错误
pub fn load_batch(paths: &[PathBuf]) -> Result<Vec<BatchImage>, InputError> {
  paths
    .iter()
    .map(|path| {
      Ok(BatchImage {
        frame: load_image(path)?,
        path: path.clone(),
      })
    })
    .collect()
}
