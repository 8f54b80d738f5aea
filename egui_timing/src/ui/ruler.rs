use crate::utils::format_tick_label;
use crate::viewport::Viewport;
use egui::*;

/// 一组刻度间隔（秒）：主刻度带标签
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickIntervals {
    pub primary: f64,
    pub secondary: f64,
    pub minor: f64,
}

const NICE_INTERVALS: [f64; 12] = [
    0.1, 0.2, 0.5, 1.0, 2.0, 5.0, 10.0, 15.0, 30.0, 60.0, 120.0, 300.0,
];

// 主刻度标签之间至少留出的像素
const MIN_LABEL_SPACING: f64 = 50.0;

/// 根据缩放选择刻度间隔；默认缩放（50 px/s）下为 1s / 0.5s / 0.1s
pub fn tick_intervals(pixels_per_second: f64) -> TickIntervals {
    let primary = NICE_INTERVALS
        .iter()
        .copied()
        .find(|interval| interval * pixels_per_second >= MIN_LABEL_SPACING)
        .unwrap_or(NICE_INTERVALS[NICE_INTERVALS.len() - 1]);
    TickIntervals {
        primary,
        secondary: primary / 2.0,
        minor: primary / 10.0,
    }
}

pub struct RulerRenderer<'a> {
    viewport: &'a Viewport,
    duration: f64,
}

impl<'a> RulerRenderer<'a> {
    pub fn new(viewport: &'a Viewport, duration: f64) -> Self {
        Self { viewport, duration }
    }

    pub fn paint(&self, painter: &Painter, rect: Rect, current_time: f64) {
        painter.rect_filled(rect, 0.0, Color32::from_gray(40));
        if self.duration <= 0.0 {
            return;
        }

        let start_time = self.viewport.time_at_client_x(rect.min.x as f64, self.duration).max(0.0);
        let end_time = self
            .viewport
            .time_at_client_x(rect.max.x as f64, self.duration)
            .min(self.duration);
        let intervals = tick_intervals(self.viewport.pixels_per_second());

        // 以最小刻度为步长计数，避免浮点累加误差
        let first = (start_time / intervals.minor).floor() as i64;
        let last = (end_time / intervals.minor).ceil() as i64;
        let per_secondary = (intervals.secondary / intervals.minor).round() as i64;
        let per_primary = (intervals.primary / intervals.minor).round() as i64;

        for step in first.max(0)..=last {
            let time = step as f64 * intervals.minor;
            let x = self.viewport.client_x_of_time(time, self.duration) as f32;
            if x < rect.min.x || x > rect.max.x {
                continue;
            }
            let (tick_height, color) = if step % per_primary == 0 {
                (rect.height() * 0.6, Color32::from_gray(200))
            } else if step % per_secondary == 0 {
                (rect.height() * 0.4, Color32::from_gray(130))
            } else {
                (rect.height() * 0.2, Color32::from_gray(90))
            };
            painter.line_segment(
                [Pos2::new(x, rect.max.y - tick_height), Pos2::new(x, rect.max.y)],
                Stroke::new(1.0, color),
            );

            if step % per_primary == 0 {
                painter.text(
                    Pos2::new(x + 3.0, rect.min.y + 2.0),
                    Align2::LEFT_TOP,
                    format_tick_label(time, intervals.primary),
                    FontId::proportional(10.0),
                    Color32::from_gray(220),
                );
            }
        }

        self.paint_playhead(painter, rect, current_time);
    }

    fn paint_playhead(&self, painter: &Painter, rect: Rect, current_time: f64) {
        let x = self.viewport.client_x_of_time(current_time, self.duration) as f32;
        if x >= rect.min.x && x <= rect.max.x {
            painter.line_segment(
                [Pos2::new(x, rect.min.y), Pos2::new(x, rect.max.y)],
                Stroke::new(2.0, Color32::from_rgb(255, 100, 100)),
            );
        }
    }
}
