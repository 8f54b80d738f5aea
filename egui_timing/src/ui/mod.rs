//! UI 模块
//!
//! 对齐编辑器的 egui 组件：左侧控制栏，右侧时间尺、波形与区间覆盖层，底部滚动条与状态栏。
//! 组件只负责把 egui 输入翻译给 `TimingController` 并绘制其状态。

mod region;
mod renderer;
mod ruler;
mod statusbar;
mod toolbar;

pub use region::snake_height_ratio;
pub use ruler::{tick_intervals, TickIntervals};

use crate::controller::{CursorHint, TimingController};
use crate::editor::{TimingEditorCommand, TimingEditorEvent, TimingEditorOptions};
use crate::selection::{EditorKey, KeyContext};
use crate::structure::{PointerId, Timing};
use crate::surface::WaveformSurface;
use crate::viewport::ScrollSurface;
use egui::*;
use std::collections::BTreeMap;

const SCROLLBAR_HEIGHT: f32 = 10.0;
const TOOLBAR_WIDTH: f32 = 96.0;

pub struct TimingEditor {
    controller: TimingController,
    has_focus: bool,
    // 当前触点（屏幕坐标），用于识别捏合
    touches: BTreeMap<u64, (f64, f64)>,
}

impl TimingEditor {
    pub fn new(options: TimingEditorOptions, surface: Box<dyn WaveformSurface>) -> Self {
        Self {
            controller: TimingController::new(options, surface),
            has_focus: false,
            touches: BTreeMap::new(),
        }
    }

    pub fn controller(&self) -> &TimingController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut TimingController {
        &mut self.controller
    }

    pub fn set_event_listener(&mut self, listener: Box<dyn FnMut(&TimingEditorEvent)>) {
        self.controller.set_event_listener(listener);
    }

    pub fn take_events(&mut self) -> Vec<TimingEditorEvent> {
        self.controller.take_events()
    }

    pub fn execute_command(&mut self, command: TimingEditorCommand) {
        self.controller.execute_command(command);
    }

    pub fn seek_to(&mut self, seconds: f64) {
        self.controller.seek_to(seconds);
    }

    pub fn select_index(&mut self, index: usize) {
        self.controller.select_index(index);
    }

    pub fn timings(&self) -> &[Timing] {
        self.controller.timings()
    }

    pub fn selected(&self) -> Option<usize> {
        self.controller.selected()
    }

    pub fn ui(&mut self, ui: &mut Ui) {
        // 上一帧的滚动同步锁在这里释放
        self.controller.end_frame();
        self.controller.update();
        if self.controller.is_playing() {
            ui.ctx().request_repaint();
        }

        let options = self.controller.options().clone();
        ui.horizontal_top(|ui| {
            let mut toolbar = toolbar::Toolbar::new(&options);
            toolbar.set_ready(self.controller.is_ready());
            toolbar.set_playing(self.controller.is_playing());
            toolbar.set_current_time(self.controller.current_time());
            toolbar.set_pixels_per_second(self.controller.viewport().pixels_per_second());
            ui.allocate_ui(vec2(TOOLBAR_WIDTH, options.ruler_height + options.waveform_height), |ui| {
                toolbar.ui(ui, &mut |cmd: TimingEditorCommand| {
                    self.controller.execute_command(cmd);
                });
            });

            ui.vertical(|ui| {
                self.ui_editor_area(ui, &options);
                self.ui_status(ui);
            });
        });
    }

    fn ui_editor_area(&mut self, ui: &mut Ui, options: &TimingEditorOptions) {
        let width = ui.available_width().max(1.0);
        let (area_rect, _response) = ui.allocate_exact_size(
            vec2(width, options.ruler_height + options.waveform_height + SCROLLBAR_HEIGHT),
            Sense::click_and_drag(),
        );
        let ruler_rect = Rect::from_min_size(area_rect.min, vec2(width, options.ruler_height));
        let overlay_rect = Rect::from_min_size(
            Pos2::new(area_rect.min.x, ruler_rect.max.y),
            vec2(width, options.waveform_height),
        );
        let scrollbar_rect = Rect::from_min_max(
            Pos2::new(area_rect.min.x, overlay_rect.max.y),
            area_rect.max,
        );

        self.controller
            .set_layout(overlay_rect.min.x as f64, overlay_rect.width() as f64);

        self.handle_input(ui, ruler_rect, overlay_rect);
        self.handle_scrollbar(ui, scrollbar_rect);

        let painter = ui.painter_at(area_rect);
        let viewport = self.controller.viewport();
        let duration = self.controller.duration();
        let current_time = self.controller.current_time();

        ruler::RulerRenderer::new(viewport, duration).paint(&painter, ruler_rect, current_time);

        let overlay_painter = ui.painter_at(overlay_rect);
        renderer::draw_waveform(
            &overlay_painter,
            overlay_rect,
            viewport,
            duration,
            self.controller.peaks(),
        );
        self.paint_regions(ui, &overlay_painter, overlay_rect);

        if let Some(ghost) = self.controller.ghost() {
            let rect = renderer::timing_rect(self.controller.viewport(), ghost, duration, overlay_rect);
            renderer::draw_ghost(&overlay_painter, rect);
        }

        let playhead_x = self.controller.viewport().client_x_of_time(current_time, duration) as f32;
        if self.controller.is_ready() {
            renderer::draw_playhead(&overlay_painter, overlay_rect, playhead_x);
        }

        self.paint_scrollbar(&painter, scrollbar_rect);

        if self.has_focus {
            painter.rect_stroke(
                area_rect.shrink(0.5),
                0.0,
                Stroke::new(1.0, ui.visuals().selection.stroke.color),
            );
        }

        let hover_x = ui
            .input(|i| i.pointer.hover_pos())
            .filter(|pos| overlay_rect.contains(*pos) && ui.rect_contains_pointer(overlay_rect))
            .map(|pos| pos.x as f64);
        let cursor = self.controller.cursor_hint(hover_x);
        if cursor != CursorHint::Default {
            ui.ctx().set_cursor_icon(match cursor {
                CursorHint::Pointer => CursorIcon::PointingHand,
                CursorHint::Grab => CursorIcon::Grab,
                CursorHint::Grabbing => CursorIcon::Grabbing,
                CursorHint::ResizeHorizontal => CursorIcon::ResizeHorizontal,
                CursorHint::Crosshair => CursorIcon::Crosshair,
                CursorHint::Default => CursorIcon::Default,
            });
        }
    }

    fn paint_regions(&self, ui: &Ui, painter: &Painter, rect: Rect) {
        let controller = &self.controller;
        let duration = controller.duration();
        if duration <= 0.0 {
            return;
        }

        let hovered = if controller.is_gesture_active() {
            None
        } else {
            ui.input(|i| i.pointer.hover_pos())
                .filter(|pos| rect.contains(*pos))
                .and_then(|pos| controller.hit_test(pos.x as f64))
                .map(|hit| hit.index)
        };
        let selected = controller.selected();

        let paint = |index: usize| {
            let Some(timing) = controller.display_timing(index) else {
                return;
            };
            let region_rect = renderer::timing_rect(controller.viewport(), timing, duration, rect);
            if region_rect.max.x < rect.min.x || region_rect.min.x > rect.max.x {
                return;
            }
            let mut region = region::RegionRenderer::new(index, controller.word(index));
            region.set_selected(selected == Some(index));
            region.set_hovered(hovered == Some(index));
            region.render(painter, region_rect);
        };

        // 选中的区间最后绘制，位于最上层
        (0..controller.timings().len())
            .filter(|index| Some(*index) != selected)
            .for_each(&paint);
        if let Some(index) = selected {
            paint(index);
        }
    }

    fn handle_input(&mut self, ui: &mut Ui, ruler_rect: Rect, overlay_rect: Rect) {
        let events = ui.input(|i| i.events.clone());
        let over_ruler = ui.rect_contains_pointer(ruler_rect);
        let over_overlay = ui.rect_contains_pointer(overlay_rect);
        let mut touches_changed = false;

        for event in &events {
            match event {
                Event::PointerButton {
                    pos,
                    button: PointerButton::Primary,
                    pressed: true,
                    ..
                } => {
                    if overlay_rect.contains(*pos) && over_overlay {
                        self.has_focus = true;
                        self.controller.pointer_down(PointerId::MOUSE, pos.x as f64);
                    } else if ruler_rect.contains(*pos) && over_ruler {
                        self.has_focus = true;
                        self.controller.ruler_click(pos.x as f64);
                    } else {
                        self.has_focus = false;
                    }
                }
                Event::PointerButton {
                    pos,
                    button: PointerButton::Primary,
                    pressed: false,
                    ..
                } => {
                    self.controller.pointer_up(PointerId::MOUSE, pos.x as f64);
                }
                Event::PointerMoved(pos) => {
                    self.controller.pointer_move(PointerId::MOUSE, pos.x as f64);
                }
                Event::PointerGone => {
                    self.controller.pointer_cancel(PointerId::MOUSE);
                }
                Event::Touch { id, phase, pos, .. } => {
                    match phase {
                        TouchPhase::Start | TouchPhase::Move => {
                            if *phase == TouchPhase::Start && !overlay_rect.contains(*pos) {
                                continue;
                            }
                            if *phase == TouchPhase::Move && !self.touches.contains_key(&id.0) {
                                continue;
                            }
                            self.touches.insert(id.0, (pos.x as f64, pos.y as f64));
                        }
                        TouchPhase::End | TouchPhase::Cancel => {
                            self.touches.remove(&id.0);
                        }
                    }
                    touches_changed = true;
                }
                Event::Key {
                    key,
                    pressed: true,
                    repeat: false,
                    ..
                } => {
                    let editor_key = match key {
                        Key::Space => EditorKey::Space,
                        Key::Escape => EditorKey::Escape,
                        _ => continue,
                    };
                    let context = KeyContext {
                        editor_focused: self.has_focus,
                        text_input_focused: ui.ctx().memory(|m| m.focused().is_some()),
                    };
                    self.controller.key(editor_key, context);
                }
                _ => {}
            }
        }

        if touches_changed {
            let points: Vec<(f64, f64)> = self.touches.values().copied().collect();
            self.controller.touches_changed(&points);
        }

        // ctrl/cmd + 滚轮缩放，普通横向滚轮滚动
        let (scroll_delta, modifiers) = ui.input(|i| (i.raw_scroll_delta, i.modifiers));
        if scroll_delta == Vec2::ZERO || !(over_overlay || over_ruler) {
            return;
        }
        if modifiers.ctrl || modifiers.command {
            if scroll_delta.y != 0.0 {
                if let Some(pos) = ui.input(|i| i.pointer.hover_pos()) {
                    self.controller.wheel_zoom(scroll_delta.y > 0.0, pos.x as f64);
                }
            }
        } else if scroll_delta.x != 0.0 {
            let source = if over_ruler {
                ScrollSurface::Ruler
            } else {
                ScrollSurface::Overlay
            };
            let offset = self.controller.viewport().scroll_offset() - scroll_delta.x as f64;
            self.controller.scroll(source, offset);
        }
    }

    fn handle_scrollbar(&mut self, ui: &mut Ui, rect: Rect) {
        let response = ui.interact(rect, ui.id().with("timing_scrollbar"), Sense::drag());
        if !response.dragged() {
            return;
        }
        let viewport = self.controller.viewport();
        if viewport.waveform_width() <= 0.0 || rect.width() <= 0.0 {
            return;
        }
        let ratio = viewport.waveform_width() / rect.width() as f64;
        let offset = viewport.scroll_offset() + response.drag_delta().x as f64 * ratio;
        self.controller.scroll(ScrollSurface::Waveform, offset);
    }

    fn paint_scrollbar(&self, painter: &Painter, rect: Rect) {
        painter.rect_filled(rect, 0.0, Color32::from_gray(35));
        let viewport = self.controller.viewport();
        let total = viewport.waveform_width();
        if total <= viewport.view_width() || total <= 0.0 {
            return;
        }
        let scale = rect.width() as f64 / total;
        let left = rect.min.x + (viewport.scroll_offset() * scale) as f32;
        let thumb_width = ((viewport.view_width() * scale) as f32).max(12.0);
        let thumb = Rect::from_min_size(
            Pos2::new(left, rect.min.y + 2.0),
            vec2(thumb_width, rect.height() - 4.0),
        );
        painter.rect_filled(thumb, 3.0, Color32::from_gray(110));
    }

    fn ui_status(&self, ui: &mut Ui) {
        let controller = &self.controller;
        let mut status = statusbar::StatusBar::new(controller.timings().len(), controller.words().len());
        if let Some(index) = controller.selected() {
            if let Some(timing) = controller.display_timing(index) {
                status.set_selected(index, controller.word(index), timing);
            }
        }
        status.ui(ui);
    }
}
