// 该文件是 Shanan （山南西风） 项目的一部分。
// src/frame.rs - RGB 帧与批次图片定义
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

use image::RgbImage;

const RGB_CHANNELS: usize = 3;

/// 已解码的 RGB 图像，按 NHWC（交错）排列
#[derive(Debug, Clone)]
pub struct RgbFrame {
  width: u32,
  height: u32,
  data: Box<[u8]>,
}

impl RgbFrame {
  pub fn width(&self) -> u32 {
    self.width
  }

  pub fn height(&self) -> u32 {
    self.height
  }

  pub fn channels(&self) -> usize {
    RGB_CHANNELS
  }

  /// 交错排列的像素数据：`[h][w][c]`
  pub fn as_nhwc(&self) -> &[u8] {
    &self.data
  }

  /// 转换为平面排列：`[c][h][w]`
  pub fn to_nchw(&self) -> Box<[u8]> {
    let height = self.height as usize;
    let width = self.width as usize;
    let plane = height * width;
    let mut planar = vec![0u8; self.data.len()].into_boxed_slice();

    for (index, pixel) in self.data.chunks_exact(RGB_CHANNELS).enumerate() {
      for (c, value) in pixel.iter().enumerate() {
        planar[c * plane + index] = *value;
      }
    }
    planar
  }
}

impl From<RgbImage> for RgbFrame {
  fn from(image: RgbImage) -> Self {
    let (width, height) = image.dimensions();
    Self {
      width,
      height,
      data: image.into_raw().into_boxed_slice(),
    }
  }
}

/// 一个批次中的图片：源文件路径与解码后的像素
///
/// 只在所属批次内有效，回调返回后即被释放。
#[derive(Debug, Clone)]
pub struct BatchImage {
  pub path: PathBuf,
  pub frame: RgbFrame,
}

impl BatchImage {
  pub fn path(&self) -> &Path {
    &self.path
  }

  pub fn frame(&self) -> &RgbFrame {
    &self.frame
  }
}
