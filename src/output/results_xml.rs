// 该文件是 Shanan （山南西风） 项目的一部分。
// src/output/results_xml.rs - results.xml 结果文件
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

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use tracing::{error, info};

use super::OutputError;
use crate::model::DetectRect;

pub const REPORT_FILE_NAME: &str = "results.xml";
// 声明的图片尺寸，不从图片中读取
pub const REPORT_WIDTH: u32 = 640;
pub const REPORT_LENGTH: u32 = 360;

/// 整次评测的结果：总耗时、总能耗，以及每张图片一个检测框
pub struct ResultsReport<'a> {
  runtime: f64,
  energy: f64,
  images: &'a [PathBuf],
  rects: &'a [DetectRect],
}

impl<'a> ResultsReport<'a> {
  pub fn new(
    runtime: f64,
    energy: f64,
    images: &'a [PathBuf],
    rects: &'a [DetectRect],
  ) -> Result<Self, OutputError> {
    if images.len() != rects.len() {
      error!("结果数量与图片数量不一致: {} != {}", rects.len(), images.len());
      return Err(OutputError::ResultCountMismatch {
        expected: images.len(),
        actual: rects.len(),
      });
    }
    Ok(Self {
      runtime,
      energy,
      images,
      rects,
    })
  }

  /// 生成完整的 XML 文档，制表符缩进，每行一个标签
  pub fn render(&self) -> String {
    let mut xml = XmlLines::default();
    xml.raw("<?xml version=\"1.0\" encoding=\"utf-8\"?>");

    xml.open("results");
    xml.leaf("runtime", &format_float(self.runtime));
    xml.leaf("energy", &format_float(self.energy));

    for (path, rect) in self.images.iter().zip(self.rects) {
      let filename = path
        .file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or_default();

      xml.open("image");
      xml.leaf("filename", &filename);

      xml.open("size");
      xml.leaf("width", &REPORT_WIDTH.to_string());
      xml.leaf("length", &REPORT_LENGTH.to_string());
      xml.close("size");

      xml.open("object");
      xml.open("bndbox");
      xml.leaf("xmin", &rect.xmin.to_string());
      xml.leaf("xmax", &rect.xmax.to_string());
      xml.leaf("ymin", &rect.ymin.to_string());
      xml.leaf("ymax", &rect.ymax.to_string());
      xml.close("bndbox");
      xml.close("object");

      xml.close("image");
    }

    xml.close("results");
    xml.finish()
  }

  /// 写入 `<dir>/results.xml`，返回文件路径
  pub fn save(&self, dir: &Path) -> Result<PathBuf, OutputError> {
    let path = dir.join(REPORT_FILE_NAME);
    std::fs::write(&path, self.render()).map_err(|source| OutputError::Io {
      path: path.clone(),
      source,
    })?;
    info!("结果已写入: {}", path.display());
    Ok(path)
  }
}

#[derive(Default)]
struct XmlLines {
  out: String,
  depth: usize,
}

impl XmlLines {
  fn raw(&mut self, line: &str) {
    self.out.push_str(line);
    self.out.push('\n');
  }

  // 根元素本身也缩进一级
  fn indent(&mut self) {
    for _ in 0..=self.depth {
      self.out.push('\t');
    }
  }

  fn open(&mut self, tag: &str) {
    self.indent();
    let _ = writeln!(self.out, "<{}>", tag);
    self.depth += 1;
  }

  fn close(&mut self, tag: &str) {
    self.depth -= 1;
    self.indent();
    let _ = writeln!(self.out, "</{}>", tag);
  }

  fn leaf(&mut self, tag: &str, text: &str) {
    self.indent();
    let _ = writeln!(self.out, "<{0}>{1}</{0}>", tag, escape(text));
  }

  fn finish(self) -> String {
    self.out
  }
}

fn escape(text: &str) -> String {
  text
    .replace('&', "&amp;")
    .replace('<', "&lt;")
    .replace('"', "&quot;")
    .replace('>', "&gt;")
}

/// 最短往返表示，整数值保留 `.0`；指数部分带符号且至少两位，如 `5e-05`、`1.5e+16`
fn format_float(value: f64) -> String {
  if value.is_nan() {
    return "nan".to_string();
  }
  let repr = format!("{:?}", value);
  match repr.split_once('e') {
    Some((mantissa, exponent)) => {
      let (sign, digits) = match exponent.strip_prefix('-') {
        Some(digits) => ('-', digits),
        None => ('+', exponent),
      };
      format!("{}e{}{:0>2}", mantissa, sign, digits)
    }
    None => repr,
  }
}
