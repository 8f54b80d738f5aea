//! # egui_timing
//!
//! 一个基于波形的单词时间对齐编辑器组件库。
//!
//! ## 功能特性
//!
//! - **区间编辑**：选择、移动、调整左右边界，拖拽时不会与相邻区间重叠
//! - **区间绘制**：在空白处拖动创建新区间，过短的区间自动丢弃
//! - **视口**：以指针为锚点的缩放（ctrl/cmd + 滚轮、双指捏合），时间尺与波形滚动同步
//! - **播放联动**：点击空白处或时间尺跳转，空格键播放/暂停，Esc 取消选择
//!
//! ## 基本使用
//!
//! ```no_run
//! use egui_timing::{NullSurface, TimingEditor, TimingEditorOptions};
//!
//! let mut editor = TimingEditor::new(
//!     TimingEditorOptions::default(),
//!     Box::new(NullSurface::with_duration(30.0)),
//! );
//!
//! // 在 egui UI 中使用
//! # fn show(ui: &mut egui::Ui, editor: &mut TimingEditor) {
//! editor.ui(ui);
//! # }
//! ```
//!
//! ## 集成到宿主应用
//!
//! ```no_run
//! use egui_timing::{
//!     NullSurface, Timing, TimingEditor, TimingEditorCommand, TimingEditorEvent,
//!     TimingEditorOptions,
//! };
//!
//! let mut editor = TimingEditor::new(
//!     TimingEditorOptions::default(),
//!     Box::new(NullSurface::with_duration(30.0)),
//! );
//!
//! // 设置事件监听器：只有手势完成时才会收到新的区间列表
//! editor.set_event_listener(Box::new(|event| {
//!     if let TimingEditorEvent::TimingsChanged(timings) = event {
//!         println!("{} timings", timings.len());
//!     }
//! }));
//!
//! // 推送数据
//! editor.execute_command(TimingEditorCommand::LoadAudio(Some("song.wav".into())));
//! editor.execute_command(TimingEditorCommand::ReplaceTimings(vec![Timing::new(1.0, 1.5)]));
//! editor.execute_command(TimingEditorCommand::SetWords(vec!["hello".into()]));
//!
//! // 宿主导航
//! editor.select_index(0);
//! ```

pub mod controller;
pub mod draw;
pub mod editor;
pub mod geometry;
pub mod interaction;
pub mod project;
pub mod selection;
pub mod structure;
pub mod surface;
pub mod ui;
pub mod utils;
pub mod viewport;

pub use controller::{CursorHint, TimingController};
pub use editor::{TimingEditorCommand, TimingEditorEvent, TimingEditorOptions};
pub use geometry::{pixel_to_time, time_to_pixel};
pub use project::SyncMapFile;
pub use selection::{EditorKey, KeyContext};
pub use structure::{PointerId, Timing, MIN_TIMING_LENGTH};
pub use surface::{NullSurface, SurfaceError, SurfaceEvent, WaveformPeaks, WaveformSurface};
pub use ui::TimingEditor;
pub use viewport::ScrollSurface;
