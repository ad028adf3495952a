// 该文件是 Shanan （山南西风） 项目的一部分。
// src/input/work_list.rs - 待评测图片列表
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

use tracing::debug;

use super::InputError;

/// 列出目录下指定扩展名的图片，并按文件名中的整数编号升序排列
///
/// `10.jpg` 排在 `2.jpg` 之后。编号相同（如 `01.jpg` 与 `1.jpg`）时按文件名排序。
pub fn scan_image_dir(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, InputError> {
  let read_dir_error = |source| InputError::ReadDir {
    path: dir.to_path_buf(),
    source,
  };

  let mut images = Vec::new();
  for entry in std::fs::read_dir(dir).map_err(read_dir_error)? {
    let path = entry.map_err(read_dir_error)?.path();
    if !path.is_file() || path.extension().is_none_or(|ext| ext != extension) {
      continue;
    }
    let index = image_index(&path)?;
    images.push((index, path));
  }

  images.sort_by(|(a, pa), (b, pb)| a.cmp(b).then_with(|| pa.file_name().cmp(&pb.file_name())));
  debug!("在 {} 中找到 {} 张图片", dir.display(), images.len());

  Ok(images.into_iter().map(|(_, path)| path).collect())
}

fn image_index(path: &Path) -> Result<i64, InputError> {
  path
    .file_stem()
    .and_then(|stem| stem.to_str())
    .and_then(|stem| stem.trim().parse::<i64>().ok())
    .ok_or_else(|| InputError::InvalidImageName(path.to_path_buf()))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn touch(dir: &Path, name: &str) {
    std::fs::write(dir.join(name), b"").unwrap();
  }

  fn names(paths: &[PathBuf]) -> Vec<String> {
    paths
      .iter()
      .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
      .collect()
  }

  #[test]
  fn sorts_numerically_not_lexically() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["10.jpg", "2.jpg", "1.jpg"] {
      touch(dir.path(), name);
    }

    let images = scan_image_dir(dir.path(), "jpg").unwrap();
    assert_eq!(names(&images), ["1.jpg", "2.jpg", "10.jpg"]);
  }

  #[test]
  fn keeps_only_matching_extension() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["3.jpg", "1.png", "2.JPG", "notes.txt"] {
      touch(dir.path(), name);
    }
    std::fs::create_dir(dir.path().join("4.jpg")).unwrap();

    let images = scan_image_dir(dir.path(), "jpg").unwrap();
    assert_eq!(names(&images), ["3.jpg"]);
  }

  #[test]
  fn non_numeric_name_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "1.jpg");
    touch(dir.path(), "cat.jpg");

    let err = scan_image_dir(dir.path(), "jpg").unwrap_err();
    assert!(matches!(err, InputError::InvalidImageName(path) if path.ends_with("cat.jpg")));
  }

  #[test]
  fn missing_directory_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = scan_image_dir(&dir.path().join("missing"), "jpg").unwrap_err();
    assert!(matches!(err, InputError::ReadDir { .. }));
  }
}
