// 该文件是 Shanan （山南西风） 项目的一部分。
// src/model.rs - 被评测模型接口
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

use std::convert::Infallible;

use crate::frame::BatchImage;

/// 被评测的推理过程
///
/// 每次调用接收一整批图片，必须按输入顺序为每张图片返回一个检测框。
/// 批次以借用方式传入，调用结束后不能继续持有像素数据。
pub trait Model {
  type Error;

  fn infer(&mut self, batch: &[BatchImage]) -> Result<Vec<DetectRect>, Self::Error>;
}

impl<F, E> Model for F
where
  F: FnMut(&[BatchImage]) -> Result<Vec<DetectRect>, E>,
{
  type Error = E;

  fn infer(&mut self, batch: &[BatchImage]) -> Result<Vec<DetectRect>, Self::Error> {
    self(batch)
  }
}

/// 单张图片的检测框，像素坐标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DetectRect {
  pub xmin: i32,
  pub xmax: i32,
  pub ymin: i32,
  pub ymax: i32,
}

impl DetectRect {
  pub fn new(xmin: i32, xmax: i32, ymin: i32, ymax: i32) -> Self {
    Self {
      xmin,
      xmax,
      ymin,
      ymax,
    }
  }
}

// (xmin, xmax, ymin, ymax)
impl From<(i32, i32, i32, i32)> for DetectRect {
  fn from((xmin, xmax, ymin, ymax): (i32, i32, i32, i32)) -> Self {
    Self::new(xmin, xmax, ymin, ymax)
  }
}

/// 基线模型：每张图片返回整幅画面
///
/// 用于在没有加速器的情况下空跑评测流程。
#[derive(Debug, Default, Clone, Copy)]
pub struct FullFrameModel;

impl Model for FullFrameModel {
  type Error = Infallible;

  fn infer(&mut self, batch: &[BatchImage]) -> Result<Vec<DetectRect>, Self::Error> {
    Ok(
      batch
        .iter()
        .map(|image| {
          let frame = image.frame();
          DetectRect::new(0, frame.width() as i32, 0, frame.height() as i32)
        })
        .collect(),
    )
  }
}
