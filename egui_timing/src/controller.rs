//! 编辑器控制器模块
//!
//! 把视口、区间交互、区间绘制、选择与波形表面组合在一起。
//! 控制器不依赖 egui：输入是屏幕 x 坐标与指针标识，输出是命令执行结果与事件。
//! 已提交的区间列表是与宿主共享的唯一状态；每次提交都构造新的列表。

use crate::draw::{DrawOutcome, RegionDraw};
use crate::editor::{TimingEditorCommand, TimingEditorEvent, TimingEditorOptions};
use crate::geometry::time_to_pixel;
use crate::interaction::{
    hit_test, DragMode, PointerDownOutcome, PointerUpOutcome, RegionGesture, RegionHit,
    RegionInteraction,
};
use crate::selection::{key_action, EditorKey, KeyAction, KeyContext, Selection};
use crate::structure::{with_inserted, with_replaced, PointerId, Timing};
use crate::surface::{SurfaceEvent, WaveformPeaks, WaveformSurface};
use crate::viewport::{wheel_zoom_target, PinchTracker, ScrollSurface, ScrollSync, Viewport};

/// 指针悬停或拖拽时应显示的光标
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CursorHint {
    Default,
    /// 未选中的区间：点击即选择
    Pointer,
    Grab,
    Grabbing,
    ResizeHorizontal,
    Crosshair,
}

pub struct TimingController {
    options: TimingEditorOptions,
    surface: Box<dyn WaveformSurface>,
    audio_url: Option<String>,
    timings: Vec<Timing>,
    words: Vec<String>,
    selection: Selection,
    viewport: Viewport,
    scroll_sync: ScrollSync,
    pinch: PinchTracker,
    interaction: RegionInteraction,
    draw: RegionDraw,

    is_ready: bool,
    is_playing: bool,

    // Events
    pending_events: Vec<TimingEditorEvent>,
    event_listener: Option<Box<dyn FnMut(&TimingEditorEvent)>>,
}

impl TimingController {
    pub fn new(options: TimingEditorOptions, surface: Box<dyn WaveformSurface>) -> Self {
        let options = options.sanitized();
        Self {
            viewport: Viewport::new(&options),
            interaction: RegionInteraction::new(&options),
            draw: RegionDraw::new(&options),
            options,
            surface,
            audio_url: None,
            timings: Vec::new(),
            words: Vec::new(),
            selection: Selection::default(),
            scroll_sync: ScrollSync::default(),
            pinch: PinchTracker::default(),
            is_ready: false,
            is_playing: false,
            pending_events: Vec::new(),
            event_listener: None,
        }
    }

    pub fn set_event_listener(&mut self, listener: Box<dyn FnMut(&TimingEditorEvent)>) {
        self.event_listener = Some(listener);
    }

    pub fn take_events(&mut self) -> Vec<TimingEditorEvent> {
        std::mem::take(&mut self.pending_events)
    }

    pub fn execute_command(&mut self, command: TimingEditorCommand) {
        match command {
            TimingEditorCommand::LoadAudio(url) => self.load_audio(url),
            TimingEditorCommand::ReplaceTimings(timings) => self.replace_timings(timings),
            TimingEditorCommand::SetWords(words) => {
                if words.len() != self.timings.len() && !self.timings.is_empty() {
                    log::debug!(
                        "word count {} differs from timing count {}",
                        words.len(),
                        self.timings.len()
                    );
                }
                self.words = words;
            }
            TimingEditorCommand::SeekTo { seconds } => self.seek_to(seconds),
            TimingEditorCommand::SelectIndex { index } => self.select_index(index),
            TimingEditorCommand::ClearSelection => self.clear_selection(),
            TimingEditorCommand::TogglePlayback => self.toggle_playback(),
            TimingEditorCommand::SetZoom { pixels_per_second } => {
                let pivot = self.viewport.origin_x() + self.viewport.view_width() / 2.0;
                self.set_zoom(pixels_per_second, pivot);
            }
        }
    }

    /// 每帧调用一次：处理表面事件并刷新波形宽度
    pub fn update(&mut self) {
        for event in self.surface.poll_events() {
            match event {
                SurfaceEvent::Ready => {
                    self.is_ready = true;
                    let pps = self.viewport.pixels_per_second();
                    self.surface.set_zoom_density(pps);
                    let duration = self.surface.duration();
                    log::info!("audio ready: {:.3}s", duration);
                    self.emit_event(TimingEditorEvent::AudioReady { duration });
                }
                SurfaceEvent::Play => self.set_playing(true),
                SurfaceEvent::Pause | SurfaceEvent::Finish => self.set_playing(false),
            }
        }
        if self.is_ready {
            let duration = self.surface.duration();
            self.viewport
                .update_waveform_width(self.surface.pixel_width(), duration);
        }
    }

    /// 下一帧开始：释放滚动同步锁
    pub fn end_frame(&mut self) {
        self.scroll_sync.next_frame();
    }

    pub fn set_layout(&mut self, origin_x: f64, view_width: f64) {
        self.viewport.set_layout(origin_x, view_width);
    }

    // ---- accessors ----

    pub fn options(&self) -> &TimingEditorOptions {
        &self.options
    }

    pub fn audio_url(&self) -> Option<&str> {
        self.audio_url.as_deref()
    }

    pub fn timings(&self) -> &[Timing] {
        &self.timings
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// 区间对应的单词；数量不一致时缺失的显示为空
    pub fn word(&self, index: usize) -> &str {
        self.words.get(index).map(String::as_str).unwrap_or("")
    }

    pub fn selected(&self) -> Option<usize> {
        self.selection.selected()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn is_ready(&self) -> bool {
        self.is_ready
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn duration(&self) -> f64 {
        if self.is_ready {
            self.surface.duration()
        } else {
            0.0
        }
    }

    pub fn current_time(&self) -> f64 {
        self.surface.current_time()
    }

    pub fn peaks(&self) -> Option<&WaveformPeaks> {
        self.surface.peaks()
    }

    /// 用于绘制的区间边界：拖拽中的区间使用实时边界
    pub fn display_timing(&self, index: usize) -> Option<Timing> {
        self.interaction
            .live_timing(index)
            .or_else(|| self.timings.get(index).copied())
    }

    pub fn ghost(&self) -> Option<Timing> {
        self.draw.ghost()
    }

    pub fn is_gesture_active(&self) -> bool {
        self.interaction.is_active() || self.draw.is_active()
    }

    pub fn hit_test(&self, client_x: f64) -> Option<RegionHit> {
        hit_test(
            &self.timings,
            self.selection.selected(),
            self.viewport.content_x(client_x),
            self.duration(),
            self.viewport.waveform_width(),
            self.options.edge_hotzone_px,
        )
    }

    pub fn cursor_hint(&self, hover_client_x: Option<f64>) -> CursorHint {
        if let RegionGesture::Dragging(state) = self.interaction.gesture() {
            return match state.mode {
                DragMode::Move => CursorHint::Grabbing,
                DragMode::ResizeLeft | DragMode::ResizeRight => CursorHint::ResizeHorizontal,
            };
        }
        if self.draw.is_drawing() {
            return CursorHint::Crosshair;
        }
        let Some(client_x) = hover_client_x else {
            return CursorHint::Default;
        };
        match self.hit_test(client_x) {
            Some(hit) if self.selection.is_selected(hit.index) => match hit.mode {
                DragMode::Move => CursorHint::Grab,
                DragMode::ResizeLeft | DragMode::ResizeRight => CursorHint::ResizeHorizontal,
            },
            Some(_) => CursorHint::Pointer,
            None => CursorHint::Default,
        }
    }

    // ---- overlay pointer input ----

    pub fn pointer_down(&mut self, pointer_id: PointerId, client_x: f64) {
        if !self.is_ready || self.is_gesture_active() || self.pinch.is_active() {
            return;
        }
        match self.hit_test(client_x) {
            Some(hit) => {
                let outcome = self.interaction.pointer_down(
                    hit,
                    pointer_id,
                    client_x,
                    &self.timings,
                    self.selection.selected(),
                );
                if let PointerDownOutcome::Selected(index) = outcome {
                    self.select(index);
                }
            }
            None => {
                let time = self.time_at(client_x);
                self.draw.pointer_down(pointer_id, client_x, time);
            }
        }
    }

    pub fn pointer_move(&mut self, pointer_id: PointerId, client_x: f64) {
        let duration = self.duration();
        if self.interaction.is_active() {
            self.interaction.pointer_move(
                pointer_id,
                client_x,
                &self.timings,
                duration,
                self.viewport.waveform_width(),
            );
        } else if self.draw.is_active() {
            let time = self.time_at(client_x);
            self.draw
                .pointer_move(pointer_id, client_x, time, &self.timings, duration);
        }
    }

    pub fn pointer_up(&mut self, pointer_id: PointerId, client_x: f64) {
        if self.interaction.is_active() {
            match self.interaction.pointer_up(pointer_id) {
                PointerUpOutcome::Commit(commit) => {
                    let next = with_replaced(&self.timings, commit.index, commit.timing);
                    log::info!(
                        "timing {} -> [{:.3}, {:.3}]",
                        commit.index,
                        commit.timing.start,
                        commit.timing.end
                    );
                    self.commit(next);
                }
                PointerUpOutcome::Click { .. } | PointerUpOutcome::Ignored => {}
            }
        } else if self.draw.is_active() {
            let time = self.time_at(client_x);
            let duration = self.duration();
            match self
                .draw
                .pointer_up(pointer_id, time, &self.timings, duration)
            {
                DrawOutcome::Created(timing) => {
                    let (next, index) = with_inserted(&self.timings, timing);
                    log::info!(
                        "timing created at {} [{:.3}, {:.3}]",
                        index,
                        timing.start,
                        timing.end
                    );
                    if self.selection.remap(&self.timings, &next) {
                        let selected = self.selection.selected();
                        self.commit(next);
                        self.emit_event(TimingEditorEvent::SelectionChanged(selected));
                    } else {
                        self.commit(next);
                    }
                }
                DrawOutcome::BackgroundClick { time } => {
                    self.clear_selection();
                    self.seek_to(time);
                }
                DrawOutcome::Discarded | DrawOutcome::Ignored => {}
            }
        }
    }

    pub fn pointer_cancel(&mut self, pointer_id: PointerId) {
        self.interaction.pointer_cancel(pointer_id);
        self.draw.pointer_cancel(pointer_id);
    }

    /// 时间尺上的点击：直接跳转
    pub fn ruler_click(&mut self, client_x: f64) {
        if !self.is_ready {
            return;
        }
        let time = self.time_at(client_x);
        self.seek_to(time);
    }

    pub fn key(&mut self, key: EditorKey, context: KeyContext) {
        match key_action(key, context, self.options.enable_space_playback) {
            KeyAction::TogglePlayback => self.toggle_playback(),
            KeyAction::ClearSelection => self.clear_selection(),
            KeyAction::None => {}
        }
    }

    // ---- viewport ----

    /// ctrl/cmd + 滚轮
    pub fn wheel_zoom(&mut self, zoom_in: bool, pivot_client_x: f64) {
        let target = wheel_zoom_target(self.viewport.pixels_per_second(), zoom_in, &self.options);
        self.set_zoom(target, pivot_client_x);
    }

    /// 当前触点位置（屏幕坐标）。两个及以上触点时识别为捏合
    pub fn touches_changed(&mut self, touches: &[(f64, f64)]) {
        match touches {
            [a, b, ..] => {
                if !self.pinch.is_active() {
                    self.pinch.begin(*a, *b, self.viewport.pixels_per_second());
                    if self.is_gesture_active() {
                        log::debug!("pinch started, cancelling active gesture");
                        self.abort_gestures();
                    }
                } else if let Some(zoom) = self.pinch.update(*a, *b) {
                    self.set_zoom(zoom.pixels_per_second, zoom.pivot_client_x);
                }
            }
            _ => self.pinch.end(),
        }
    }

    pub fn set_zoom(&mut self, pixels_per_second: f64, pivot_client_x: f64) {
        if !self.is_ready {
            return;
        }
        let duration = self.surface.duration();
        let surface = &mut self.surface;
        let change = self
            .viewport
            .set_zoom(pixels_per_second, pivot_client_x, duration, |density| {
                surface.set_zoom_density(density);
                surface.pixel_width()
            });
        if let Some(change) = change {
            self.scroll_sync.begin_programmatic();
            self.emit_event(TimingEditorEvent::ZoomChanged {
                pixels_per_second: change.pixels_per_second,
            });
        }
    }

    /// 某个表面报告了用户滚动。被同步锁忽略时返回 false
    pub fn scroll(&mut self, source: ScrollSurface, offset: f64) -> bool {
        if !self.scroll_sync.on_scroll(source) {
            return false;
        }
        self.viewport.set_scroll_offset(offset);
        true
    }

    // ---- host navigation ----

    pub fn seek_to(&mut self, seconds: f64) {
        if !self.is_ready || !seconds.is_finite() {
            return;
        }
        let seconds = seconds.clamp(0.0, self.surface.duration());
        self.surface.set_time(seconds);
        self.emit_event(TimingEditorEvent::Seeked { seconds });
    }

    pub fn select_index(&mut self, index: usize) {
        let Some(timing) = self.timings.get(index).copied() else {
            log::warn!(
                "select_index({}) ignored: only {} timings",
                index,
                self.timings.len()
            );
            return;
        };
        self.select(index);
        self.seek_to(timing.start);

        let duration = self.duration();
        let width = self.viewport.waveform_width();
        let start_px = time_to_pixel(timing.start, duration, width);
        let end_px = time_to_pixel(timing.end, duration, width);
        if let Some(offset) = self.viewport.reveal_offset(start_px, end_px) {
            self.scroll_sync.begin_programmatic();
            self.viewport.set_scroll_offset(offset);
        }
    }

    pub fn clear_selection(&mut self) {
        if self.selection.clear() {
            self.emit_event(TimingEditorEvent::SelectionChanged(None));
        }
    }

    pub fn toggle_playback(&mut self) {
        if !self.is_ready {
            return;
        }
        if self.is_playing {
            self.surface.pause();
        } else {
            self.surface.play();
        }
    }

    // ---- internals ----

    fn load_audio(&mut self, url: Option<String>) {
        self.abort_gestures();
        self.is_ready = false;
        self.set_playing(false);
        self.audio_url = url;
        match self.audio_url.as_deref() {
            Some(url) => {
                log::info!("loading audio {}", url);
                if let Err(err) = self.surface.load(url) {
                    log::warn!("failed to load audio {}: {}", url, err);
                }
            }
            None => self.surface.unload(),
        }
    }

    fn replace_timings(&mut self, timings: Vec<Timing>) {
        self.abort_gestures();
        self.timings = timings;
        if self.selection.on_replaced() {
            self.emit_event(TimingEditorEvent::SelectionChanged(None));
        }
    }

    fn select(&mut self, index: usize) {
        if self.selection.select(index) {
            log::debug!("selected timing {}", index);
            self.emit_event(TimingEditorEvent::SelectionChanged(Some(index)));
        }
    }

    fn set_playing(&mut self, is_playing: bool) {
        if self.is_playing != is_playing {
            self.is_playing = is_playing;
            self.emit_event(TimingEditorEvent::PlaybackStateChanged { is_playing });
        }
    }

    fn commit(&mut self, next: Vec<Timing>) {
        self.timings = next;
        self.emit_event(TimingEditorEvent::TimingsChanged(self.timings.clone()));
    }

    fn abort_gestures(&mut self) {
        self.interaction.abort();
        self.draw.abort();
    }

    fn time_at(&self, client_x: f64) -> f64 {
        self.viewport.time_at_client_x(client_x, self.duration())
    }

    fn emit_event(&mut self, event: TimingEditorEvent) {
        if let Some(ref mut listener) = self.event_listener {
            listener(&event);
        }
        self.pending_events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::NullSurface;

    /// 100 秒音频，10 px/s，可视区域 [0, 400)
    fn ready_controller(timings: Vec<Timing>) -> TimingController {
        let options = TimingEditorOptions {
            initial_pixels_per_second: 10.0,
            min_pixels_per_second: 5.0,
            ..Default::default()
        };
        let mut controller =
            TimingController::new(options, Box::new(NullSurface::with_duration(100.0)));
        controller.set_layout(0.0, 400.0);
        controller.execute_command(TimingEditorCommand::LoadAudio(Some("song.wav".into())));
        controller.execute_command(TimingEditorCommand::ReplaceTimings(timings));
        controller.update();
        controller.take_events();
        controller
    }

    #[test]
    fn not_ready_ignores_input() {
        let mut controller =
            TimingController::new(TimingEditorOptions::default(), Box::new(NullSurface::default()));
        controller.execute_command(TimingEditorCommand::ReplaceTimings(vec![Timing::new(1.0, 2.0)]));
        controller.pointer_down(PointerId::MOUSE, 15.0);
        controller.seek_to(3.0);
        controller.set_zoom(200.0, 0.0);
        assert!(controller.take_events().is_empty());
        assert_eq!(controller.duration(), 0.0);
    }

    #[test]
    fn first_click_selects_second_drags() {
        let mut controller = ready_controller(vec![Timing::new(10.0, 12.0)]);
        controller.pointer_down(PointerId::MOUSE, 110.0);
        controller.pointer_move(PointerId::MOUSE, 140.0);
        controller.pointer_up(PointerId::MOUSE, 140.0);
        assert_eq!(controller.selected(), Some(0));
        assert_eq!(controller.timings()[0], Timing::new(10.0, 12.0));
        assert_eq!(
            controller.take_events(),
            vec![TimingEditorEvent::SelectionChanged(Some(0))]
        );

        controller.pointer_down(PointerId::MOUSE, 110.0);
        controller.pointer_move(PointerId::MOUSE, 140.0);
        assert_eq!(controller.display_timing(0), Some(Timing::new(13.0, 15.0)));
        // 提交前列表不变
        assert_eq!(controller.timings()[0], Timing::new(10.0, 12.0));
        controller.pointer_up(PointerId::MOUSE, 140.0);
        assert_eq!(
            controller.take_events(),
            vec![TimingEditorEvent::TimingsChanged(vec![Timing::new(13.0, 15.0)])]
        );
    }

    #[test]
    fn background_click_deselects_and_seeks() {
        let mut controller = ready_controller(vec![Timing::new(10.0, 12.0)]);
        controller.select_index(0);
        controller.take_events();
        controller.pointer_down(PointerId::MOUSE, 300.0);
        controller.pointer_up(PointerId::MOUSE, 302.0);
        assert_eq!(controller.selected(), None);
        assert_eq!(controller.current_time(), 30.0);
        assert_eq!(
            controller.take_events(),
            vec![
                TimingEditorEvent::SelectionChanged(None),
                TimingEditorEvent::Seeked { seconds: 30.0 },
            ]
        );
    }

    #[test]
    fn create_keeps_selection_on_same_timing() {
        let mut controller =
            ready_controller(vec![Timing::new(1.0, 2.0), Timing::new(20.0, 21.0)]);
        controller.select_index(1);
        controller.take_events();
        controller.pointer_down(PointerId::MOUSE, 50.0);
        controller.pointer_move(PointerId::MOUSE, 80.0);
        assert_eq!(controller.ghost(), Some(Timing::new(5.0, 8.0)));
        controller.pointer_up(PointerId::MOUSE, 80.0);
        assert_eq!(controller.timings().len(), 3);
        assert_eq!(controller.timings()[1], Timing::new(5.0, 8.0));
        assert_eq!(controller.selected(), Some(2));
        assert!(controller.ghost().is_none());
    }

    #[test]
    fn replacing_timings_clears_selection() {
        let mut controller = ready_controller(vec![Timing::new(1.0, 2.0)]);
        controller.select_index(0);
        controller.take_events();
        controller.execute_command(TimingEditorCommand::ReplaceTimings(vec![Timing::new(3.0, 4.0)]));
        assert_eq!(controller.selected(), None);
        assert_eq!(
            controller.take_events(),
            vec![TimingEditorEvent::SelectionChanged(None)]
        );
    }

    #[test]
    fn select_index_reveals_region() {
        let mut controller = ready_controller(vec![Timing::new(50.0, 52.0)]);
        controller.select_index(0);
        // 510px 居中于 400px 的可视区域
        assert_eq!(controller.viewport().scroll_offset(), 310.0);
        assert_eq!(controller.current_time(), 50.0);
        controller.select_index(5);
        assert_eq!(controller.selected(), Some(0));
    }

    #[test]
    fn playback_state_follows_surface() {
        let mut controller = ready_controller(Vec::new());
        let focused = KeyContext {
            editor_focused: true,
            text_input_focused: false,
        };
        controller.key(EditorKey::Space, focused);
        controller.update();
        assert!(controller.is_playing());
        controller.key(EditorKey::Space, focused);
        controller.update();
        assert!(!controller.is_playing());
        assert_eq!(
            controller.take_events(),
            vec![
                TimingEditorEvent::PlaybackStateChanged { is_playing: true },
                TimingEditorEvent::PlaybackStateChanged { is_playing: false },
            ]
        );
    }

    #[test]
    fn pinch_cancels_active_drag() {
        let mut controller = ready_controller(vec![Timing::new(10.0, 12.0)]);
        controller.select_index(0);
        controller.pointer_down(PointerId(1), 110.0);
        controller.pointer_move(PointerId(1), 150.0);
        controller.touches_changed(&[(110.0, 10.0), (210.0, 10.0)]);
        assert!(!controller.is_gesture_active());
        assert_eq!(controller.display_timing(0), Some(Timing::new(10.0, 12.0)));
        controller.touches_changed(&[(60.0, 10.0), (260.0, 10.0)]);
        assert_eq!(controller.viewport().pixels_per_second(), 20.0);
    }

    #[test]
    fn scroll_echo_is_ignored_until_next_frame() {
        let mut controller = ready_controller(Vec::new());
        assert!(controller.scroll(ScrollSurface::Overlay, 120.0));
        assert!(!controller.scroll(ScrollSurface::Waveform, 40.0));
        assert_eq!(controller.viewport().scroll_offset(), 120.0);
        controller.end_frame();
        assert!(controller.scroll(ScrollSurface::Waveform, 40.0));
        assert_eq!(controller.viewport().scroll_offset(), 40.0);
    }
}
