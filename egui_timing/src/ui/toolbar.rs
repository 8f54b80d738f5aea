//! Toolbar module
//!
//! 波形左侧的控制栏：播放/暂停、当前时间与缩放。

use crate::editor::{TimingEditorCommand, TimingEditorOptions};
use crate::utils::format_time;
use egui::*;

pub struct Toolbar {
    is_ready: bool,
    is_playing: bool,
    current_time: f64,
    pixels_per_second: f64,
    min_pixels_per_second: f64,
    max_pixels_per_second: f64,
    zoom_in_factor: f64,
    zoom_out_factor: f64,
}

impl Toolbar {
    pub fn new(options: &TimingEditorOptions) -> Self {
        Self {
            is_ready: false,
            is_playing: false,
            current_time: 0.0,
            pixels_per_second: options.initial_pixels_per_second,
            min_pixels_per_second: options.min_pixels_per_second,
            max_pixels_per_second: options.max_pixels_per_second,
            zoom_in_factor: options.wheel_zoom_in_factor,
            zoom_out_factor: options.wheel_zoom_out_factor,
        }
    }

    pub fn set_ready(&mut self, ready: bool) {
        self.is_ready = ready;
    }

    pub fn set_playing(&mut self, playing: bool) {
        self.is_playing = playing;
    }

    pub fn set_current_time(&mut self, time: f64) {
        self.current_time = time;
    }

    pub fn set_pixels_per_second(&mut self, pixels_per_second: f64) {
        self.pixels_per_second = pixels_per_second;
    }

    pub fn ui(&mut self, ui: &mut Ui, command_callback: &mut dyn FnMut(TimingEditorCommand)) {
        ui.vertical(|ui| {
            ui.add_enabled_ui(self.is_ready, |ui| {
                let label = if self.is_playing { "⏸ Pause" } else { "▶ Play" };
                if ui.add(Button::new(label).min_size(vec2(72.0, 0.0))).clicked() {
                    command_callback(TimingEditorCommand::TogglePlayback);
                }

                ui.label(RichText::new(format_time(self.current_time)).monospace());

                ui.horizontal(|ui| {
                    if ui.small_button("−").clicked() {
                        command_callback(TimingEditorCommand::SetZoom {
                            pixels_per_second: self.pixels_per_second * self.zoom_out_factor,
                        });
                    }
                    if ui.small_button("+").clicked() {
                        command_callback(TimingEditorCommand::SetZoom {
                            pixels_per_second: self.pixels_per_second * self.zoom_in_factor,
                        });
                    }
                });

                let mut pps = self.pixels_per_second;
                if ui
                    .add(
                        DragValue::new(&mut pps)
                            .speed(1.0)
                            .range(self.min_pixels_per_second..=self.max_pixels_per_second)
                            .suffix(" px/s"),
                    )
                    .changed()
                {
                    command_callback(TimingEditorCommand::SetZoom {
                        pixels_per_second: pps,
                    });
                }
            });
        });
    }
}
