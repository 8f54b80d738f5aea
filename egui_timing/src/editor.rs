//! 编辑命令和事件模块
//!
//! 定义了对齐编辑器的配置、命令系统和事件系统，用于与宿主应用交互。

use crate::structure::Timing;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

/// 初始化与运行时的编辑器配置
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingEditorOptions {
    pub min_pixels_per_second: f64,
    pub max_pixels_per_second: f64,
    pub initial_pixels_per_second: f64,
    /// 小于该差值的缩放请求被忽略（连续滚轮事件防抖）
    pub zoom_dead_zone: f64,
    pub wheel_zoom_in_factor: f64,
    pub wheel_zoom_out_factor: f64,
    /// 区间左右两侧调整大小热区宽度（像素）
    pub edge_hotzone_px: f64,
    /// 点击与拖拽的分界（像素）
    pub min_drag_px: f64,
    pub min_timing_length: f64,
    pub waveform_height: f32,
    pub ruler_height: f32,
    pub enable_space_playback: bool,
}

impl Default for TimingEditorOptions {
    fn default() -> Self {
        Self {
            min_pixels_per_second: 20.0,
            max_pixels_per_second: 500.0,
            initial_pixels_per_second: 50.0,
            zoom_dead_zone: 0.5,
            wheel_zoom_in_factor: 1.1,
            wheel_zoom_out_factor: 0.9,
            edge_hotzone_px: 8.0,
            min_drag_px: 5.0,
            min_timing_length: crate::structure::MIN_TIMING_LENGTH,
            waveform_height: 100.0,
            ruler_height: 25.0,
            enable_space_playback: true,
        }
    }
}

impl TimingEditorOptions {
    /// 从 JSON 文件读取配置，缺失的字段使用默认值
    pub fn load_from_path(path: &Path) -> Result<Self, io::Error> {
        let content = fs::read_to_string(path)?;
        let options: Self = serde_json::from_str(&content)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(options.sanitized())
    }

    /// 修正互相矛盾的取值（例如 min > max）
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !(self.min_pixels_per_second > 0.0) {
            self.min_pixels_per_second = defaults.min_pixels_per_second;
        }
        if self.max_pixels_per_second < self.min_pixels_per_second {
            self.max_pixels_per_second = self.min_pixels_per_second;
        }
        self.initial_pixels_per_second = self
            .initial_pixels_per_second
            .clamp(self.min_pixels_per_second, self.max_pixels_per_second);
        if !(self.min_timing_length > 0.0) {
            self.min_timing_length = defaults.min_timing_length;
        }
        self.edge_hotzone_px = self.edge_hotzone_px.max(0.0);
        self.min_drag_px = self.min_drag_px.max(0.0);
        self
    }
}

/// 宿主可推送到编辑器的命令
#[derive(Clone, Debug)]
pub enum TimingEditorCommand {
    /// 加载新的音频（None 表示卸载）
    LoadAudio(Option<String>),
    /// 整体替换区间列表（例如一次新的对齐结果），会清除选择
    ReplaceTimings(Vec<Timing>),
    SetWords(Vec<String>),
    SeekTo {
        seconds: f64,
    },
    SelectIndex {
        index: usize,
    },
    ClearSelection,
    TogglePlayback,
    /// 以可视区域中心为锚点缩放
    SetZoom {
        pixels_per_second: f64,
    },
}

/// 外部宿主可监听的编辑事件
#[derive(Clone, Debug, PartialEq)]
pub enum TimingEditorEvent {
    /// 仅在手势完成（移动/调整/创建提交）时发出，携带新的完整列表
    TimingsChanged(Vec<Timing>),
    SelectionChanged(Option<usize>),
    Seeked {
        seconds: f64,
    },
    PlaybackStateChanged {
        is_playing: bool,
    },
    ZoomChanged {
        pixels_per_second: f64,
    },
    AudioReady {
        duration: f64,
    },
}
