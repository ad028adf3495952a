// 该文件是 Shanan （山南西风） 项目的一部分。
// tests/run.rs - 完整评测流程测试
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
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use image::{Rgb, RgbImage};

use dac_sdc::{
  BatchImage, ContestConfig, DetectRect, Team, TeamError,
  input::InputError,
  power::{FixedPowerSensor, PowerError, PowerSensor},
};

fn write_jpegs(dir: &Path, ids: &[u32]) {
  std::fs::create_dir_all(dir).unwrap();
  for id in ids {
    let image = RgbImage::from_pixel(16, 9, Rgb([255, 0, 0]));
    image.save(dir.join(format!("{}.jpg", id))).unwrap();
  }
}

fn contest(ids: &[u32], batch_size: usize) -> (tempfile::TempDir, ContestConfig) {
  let root = tempfile::tempdir().unwrap();
  write_jpegs(&root.path().join("images"), ids);
  let config = ContestConfig::new(root.path())
    .with_batch_size(batch_size)
    .with_sample_interval(Duration::from_millis(5));
  (root, config)
}

fn sensor(watts: f64) -> Arc<dyn PowerSensor> {
  Arc::new(FixedPowerSensor::new([("1V2", watts / 2.0), ("PSDDR", watts / 2.0)]))
}

fn fixed_box(batch: &[BatchImage]) -> Result<Vec<DetectRect>, Infallible> {
  Ok(vec![DetectRect::new(0, 10, 0, 10); batch.len()])
}

#[test]
fn full_run_writes_ordered_report() {
  let (root, config) = contest(&[3, 1, 2], 1000);
  let mut team = Team::new("alpha", config, sensor(2.0)).unwrap();

  let summary = team.run(fixed_box).unwrap();
  assert_eq!(summary.images, 3);
  assert_eq!(summary.batches.len(), 1);

  let report = summary.report.unwrap();
  assert_eq!(report, root.path().join("result/alpha/results.xml"));
  let xml = std::fs::read_to_string(report).unwrap();

  assert_eq!(xml.matches("<image>").count(), 3);
  let positions = ["1.jpg", "2.jpg", "3.jpg"]
    .map(|name| xml.find(&format!("<filename>{}</filename>", name)).unwrap());
  assert!(positions[0] < positions[1] && positions[1] < positions[2]);
  assert_eq!(xml.matches("<xmin>0</xmin>").count(), 3);
  assert_eq!(xml.matches("<xmax>10</xmax>").count(), 3);
  assert_eq!(xml.matches("<ymin>0</ymin>").count(), 3);
  assert_eq!(xml.matches("<ymax>10</ymax>").count(), 3);

  let value = |tag: &str| -> f64 {
    let open = format!("<{}>", tag);
    let start = xml.find(&open).unwrap() + open.len();
    let end = start + xml[start..].find('<').unwrap();
    xml[start..end].parse().unwrap()
  };
  assert!(value("runtime") >= 0.0);
  assert!(value("energy") >= 0.0);
  assert_eq!(value("runtime"), summary.totals.runtime);
  assert_eq!(value("energy"), summary.totals.energy);
}

#[test]
fn totals_are_sums_of_batch_measurements() {
  let (_root, config) = contest(&[1, 2, 3, 4, 5], 2);
  let mut team = Team::new("alpha", config, sensor(3.0)).unwrap();

  let summary = team
    .run(|batch: &[BatchImage]| -> Result<Vec<DetectRect>, Infallible> {
      std::thread::sleep(Duration::from_millis(2));
      Ok(vec![DetectRect::default(); batch.len()])
    })
    .unwrap();

  let sizes = summary.batches.iter().map(|b| b.images).collect::<Vec<_>>();
  assert_eq!(sizes, [2, 2, 1]);

  let runtime: f64 = summary.batches.iter().map(|b| b.runtime).sum();
  let energy: f64 = summary.batches.iter().map(|b| b.energy).sum();
  assert!((summary.totals.runtime - runtime).abs() < 1e-9);
  assert!((summary.totals.energy - energy).abs() < 1e-9);

  for batch in &summary.batches {
    assert!(batch.samples >= 2);
    assert!((batch.mean_power - 3.0).abs() < 1e-9);
    assert!((batch.energy - 3.0 * batch.runtime).abs() < 1e-9);
  }
  assert_eq!(team.totals(), summary.totals);
  assert_eq!(team.results().len(), 5);
}

#[test]
fn callback_receives_rgb_pixels_in_order() {
  let (_root, config) = contest(&[10, 2, 1], 2);
  let mut team = Team::new("alpha", config, sensor(1.0)).unwrap();

  let mut seen = Vec::new();
  team
    .run(|batch: &[BatchImage]| -> Result<Vec<DetectRect>, Infallible> {
      for image in batch {
        let frame = image.frame();
        assert_eq!((frame.width(), frame.height()), (16, 9));
        let red = &frame.as_nhwc()[..3];
        assert!(red[0] > 200 && red[1] < 50 && red[2] < 50);
        seen.push(image.path().file_name().unwrap().to_string_lossy().into_owned());
      }
      Ok(vec![DetectRect::default(); batch.len()])
    })
    .unwrap();

  assert_eq!(seen, ["1.jpg", "2.jpg", "10.jpg"]);
}

#[test]
fn short_detection_list_aborts_before_next_batch() {
  let (root, config) = contest(&[1, 2, 3, 4], 2);
  let mut team = Team::new("alpha", config, sensor(1.0)).unwrap();

  let mut calls = 0;
  let err = team
    .run(|batch: &[BatchImage]| -> Result<Vec<DetectRect>, Infallible> {
      calls += 1;
      Ok(vec![DetectRect::default(); batch.len() - 1])
    })
    .unwrap_err();

  assert!(matches!(
    err,
    TeamError::DetectionCountMismatch {
      batch: 1,
      images: 2,
      detections: 1
    }
  ));
  assert_eq!(calls, 1);
  assert_eq!(team.current_batch_idx(), 1);
  assert!(!root.path().join("result/alpha/results.xml").exists());
}

#[test]
fn model_error_aborts_the_run() {
  let (root, config) = contest(&[1, 2], 1);
  let mut team = Team::new("alpha", config, sensor(1.0)).unwrap();

  let err = team
    .run(|_: &[BatchImage]| -> anyhow::Result<Vec<DetectRect>> {
      anyhow::bail!("accelerator not programmed")
    })
    .unwrap_err();

  assert!(matches!(err, TeamError::Model { batch: 1, .. }));
  assert!(err.to_string().contains("accelerator not programmed"));
  assert!(!root.path().join("result/alpha/results.xml").exists());
}

#[test]
fn corrupt_image_aborts_without_report() {
  let (root, config) = contest(&[1, 2], 1);
  std::fs::write(root.path().join("images/3.jpg"), b"garbage").unwrap();
  let mut team = Team::new("alpha", config, sensor(1.0)).unwrap();

  let err = team.run(fixed_box).unwrap_err();
  assert!(matches!(err, TeamError::Input(InputError::Decode { .. })));
  assert!(!root.path().join("result/alpha/results.xml").exists());
}

#[test]
fn second_run_without_reset_is_a_no_op() {
  let (_root, config) = contest(&[1, 2, 3], 2);
  let mut team = Team::new("alpha", config, sensor(1.0)).unwrap();

  let first = team.run(fixed_box).unwrap();
  let report = first.report.unwrap();
  let written = std::fs::read_to_string(&report).unwrap();

  let second = team.run(fixed_box).unwrap();
  assert_eq!(second.images, 0);
  assert!(second.batches.is_empty());
  assert_eq!(second.totals.runtime, 0.0);
  assert_eq!(second.totals.energy, 0.0);
  assert!(second.report.is_none());
  assert_eq!(std::fs::read_to_string(&report).unwrap(), written);

  team.reset_batch_count();
  let third = team.run(fixed_box).unwrap();
  assert_eq!(third.images, 3);
  assert!(third.report.is_some());
}

#[test]
fn partially_consumed_cursor_fails_result_count_check() {
  let (root, config) = contest(&[1, 2, 3], 2);
  let mut team = Team::new("alpha", config, sensor(1.0)).unwrap();
  team.get_next_batch();

  let err = team.run(fixed_box).unwrap_err();
  assert!(matches!(
    err,
    TeamError::Output(dac_sdc::output::OutputError::ResultCountMismatch {
      expected: 3,
      actual: 1
    })
  ));
  assert!(!root.path().join("result/alpha/results.xml").exists());
}

#[test]
fn empty_image_dir_writes_empty_report() {
  let (root, config) = contest(&[], 4);
  let mut team = Team::new("alpha", config, sensor(1.0)).unwrap();

  let summary = team.run(fixed_box).unwrap();
  assert_eq!(summary.images, 0);
  let xml = std::fs::read_to_string(summary.report.unwrap()).unwrap();
  assert!(xml.contains("<runtime>0.0</runtime>"));
  assert!(xml.contains("<energy>0.0</energy>"));
  assert!(!xml.contains("<image>"));
  assert!(root.path().join("result/alpha/results.xml").exists());
}

struct ShortSensor(Vec<String>);

impl PowerSensor for ShortSensor {
  fn rails(&self) -> &[String] {
    &self.0
  }

  fn read_power(&self) -> Result<Vec<f64>, PowerError> {
    Ok(vec![5.0])
  }
}

#[test]
fn sensor_dropping_rails_aborts_without_report() {
  let (root, config) = contest(&[1, 2], 2);
  let rails = ["1V2", "PSDDR", "INT"].map(String::from).to_vec();
  let mut team = Team::new("alpha", config, Arc::new(ShortSensor(rails))).unwrap();

  let mut calls = 0;
  let err = team
    .run(|batch: &[BatchImage]| -> Result<Vec<DetectRect>, Infallible> {
      calls += 1;
      Ok(vec![DetectRect::default(); batch.len()])
    })
    .unwrap_err();

  assert!(matches!(
    err,
    TeamError::Power(PowerError::ReadingCountMismatch {
      expected: 3,
      actual: 1
    })
  ));
  assert_eq!(calls, 0);
  assert!(!root.path().join("result/alpha/results.xml").exists());
}
