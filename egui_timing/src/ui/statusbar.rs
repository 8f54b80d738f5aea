//! Status bar module
//!
//! 编辑器底部的信息栏：区间数量、当前选中的单词及其时间范围。

use crate::structure::Timing;
use egui::*;

pub struct StatusBar<'a> {
    timing_count: usize,
    word_count: usize,
    selected: Option<(usize, &'a str, Timing)>,
}

impl<'a> StatusBar<'a> {
    pub fn new(timing_count: usize, word_count: usize) -> Self {
        Self {
            timing_count,
            word_count,
            selected: None,
        }
    }

    pub fn set_selected(&mut self, index: usize, word: &'a str, timing: Timing) {
        self.selected = Some((index, word, timing));
    }

    pub fn ui(&self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            ui.label(format!("Timings: {}", self.timing_count));
            if self.word_count != self.timing_count {
                ui.colored_label(
                    Color32::from_rgb(230, 170, 60),
                    format!("Words: {}", self.word_count),
                );
            }

            ui.separator();

            match self.selected {
                Some((index, word, timing)) => {
                    ui.label(format!(
                        "#{} \"{}\"  {:.3}s – {:.3}s  ({:.3}s)",
                        index + 1,
                        word,
                        timing.start,
                        timing.end,
                        timing.length()
                    ));
                }
                None => {
                    ui.weak("No selection");
                }
            }
        });
    }
}
