//! 对齐文件模块
//!
//! 把音频路径、单词列表与区间列表保存为一个 JSON 文件，并从中加载。

use crate::structure::{is_non_overlapping, Timing};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncMapFile {
    pub version: String,
    pub audio_path: Option<PathBuf>,
    pub words: Vec<String>,
    pub timings: Vec<Timing>,
}

impl SyncMapFile {
    pub fn new(audio_path: Option<PathBuf>, words: Vec<String>, timings: Vec<Timing>) -> Self {
        Self {
            version: "1.0".to_string(),
            audio_path,
            words,
            timings,
        }
    }

    /// 保存到指定路径；没有扩展名时使用 `.syncmap.json`
    pub fn save_to_path(&self, path: &Path) -> Result<PathBuf, io::Error> {
        let json_path = if path.extension().is_some() {
            path.to_path_buf()
        } else {
            path.with_extension("syncmap.json")
        };
        if let Some(parent) = json_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json_content = serde_json::to_string_pretty(self)?;
        fs::write(&json_path, json_content)?;
        Ok(json_path)
    }

    pub fn load_from_path(path: &Path) -> Result<Self, io::Error> {
        let json_content = fs::read_to_string(path)?;
        let mut file: SyncMapFile = serde_json::from_str(&json_content).map_err(|e| {
            io::Error::new(io::ErrorKind::InvalidData, format!("JSON解析错误: {}", e))
        })?;

        file.sort_by_start();
        if !is_non_overlapping(&file.timings) {
            log::warn!("{} contains overlapping timings", path.display());
        }
        if file.words.len() != file.timings.len() {
            log::warn!(
                "{}: {} words but {} timings",
                path.display(),
                file.words.len(),
                file.timings.len()
            );
        }
        Ok(file)
    }

    /// 编辑器假定区间按 start 排序；单词跟随各自的区间移动。
    /// 多出的单词（没有对应区间）保持原顺序留在末尾。
    fn sort_by_start(&mut self) {
        let mut words = std::mem::take(&mut self.words).into_iter();
        let mut pairs: Vec<(Timing, Option<String>)> = self
            .timings
            .iter()
            .map(|timing| (*timing, words.next()))
            .collect();
        pairs.sort_by(|a, b| a.0.start.total_cmp(&b.0.start));

        self.timings = pairs.iter().map(|(timing, _)| *timing).collect();
        self.words = pairs.into_iter().filter_map(|(_, word)| word).collect();
        self.words.extend(words);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_then_load_sorts_timings() {
        let dir = std::env::temp_dir().join(format!("egui_timing_project_{}", std::process::id()));
        let file = SyncMapFile::new(
            Some(PathBuf::from("song.mp3")),
            vec!["b".into(), "a".into()],
            vec![Timing::new(3.0, 4.0), Timing::new(1.0, 2.0)],
        );
        let saved = file.save_to_path(&dir.join("take1")).unwrap();
        assert!(saved.to_string_lossy().ends_with("take1.syncmap.json"));

        let loaded = SyncMapFile::load_from_path(&saved).unwrap();
        assert_eq!(loaded.timings, vec![Timing::new(1.0, 2.0), Timing::new(3.0, 4.0)]);
        assert_eq!(loaded.words, vec!["a", "b"]);
        assert_eq!(loaded.audio_path, file.audio_path);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn words_follow_their_timings_when_sorted() {
        let mut file = SyncMapFile::new(
            None,
            vec!["second".into(), "first".into(), "third".into()],
            vec![Timing::new(3.0, 4.0), Timing::new(1.0, 2.0), Timing::new(5.0, 6.0)],
        );
        file.sort_by_start();
        let pairs: Vec<(&str, Timing)> = file
            .words
            .iter()
            .map(String::as_str)
            .zip(file.timings.iter().copied())
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("first", Timing::new(1.0, 2.0)),
                ("second", Timing::new(3.0, 4.0)),
                ("third", Timing::new(5.0, 6.0)),
            ]
        );
    }

    #[test]
    fn extra_words_stay_at_the_end() {
        let mut file = SyncMapFile::new(
            None,
            vec!["b".into(), "a".into(), "tail".into()],
            vec![Timing::new(3.0, 4.0), Timing::new(1.0, 2.0)],
        );
        file.sort_by_start();
        assert_eq!(file.timings, vec![Timing::new(1.0, 2.0), Timing::new(3.0, 4.0)]);
        assert_eq!(file.words, vec!["a", "b", "tail"]);
    }

    #[test]
    fn invalid_json_is_invalid_data() {
        let dir = std::env::temp_dir().join(format!("egui_timing_bad_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("broken.json");
        fs::write(&path, "{ not json").unwrap();
        let err = SyncMapFile::load_from_path(&path).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        let _ = fs::remove_dir_all(&dir);
    }
}
