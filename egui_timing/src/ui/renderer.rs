use crate::geometry::pixel_to_time;
use crate::structure::Timing;
use crate::surface::WaveformPeaks;
use crate::viewport::Viewport;
use egui::*;

const DASH_LEN: f32 = 4.0;
const GAP_LEN: f32 = 3.0;

/// 绘制虚线垂直线
pub fn draw_dashed_vertical_line(painter: &Painter, x: f32, top: f32, bottom: f32, stroke: Stroke) {
    let mut y = top;
    while y < bottom {
        let next = (y + DASH_LEN).min(bottom);
        painter.line_segment([Pos2::new(x, y), Pos2::new(x, next)], stroke);
        y += DASH_LEN + GAP_LEN;
    }
}

/// 绘制虚线水平线
pub fn draw_dashed_horizontal_line(
    painter: &Painter,
    y: f32,
    left: f32,
    right: f32,
    stroke: Stroke,
) {
    let mut x = left;
    while x < right {
        let next = (x + DASH_LEN).min(right);
        painter.line_segment([Pos2::new(x, y), Pos2::new(next, y)], stroke);
        x += DASH_LEN + GAP_LEN;
    }
}

/// 绘制新建区间时的幽灵预览：半透明蓝色填充 + 虚线边框
pub fn draw_ghost(painter: &Painter, rect: Rect) {
    painter.rect_filled(rect, 0.0, Color32::from_rgba_unmultiplied(99, 179, 237, 77));
    let stroke = Stroke::new(2.0, Color32::from_rgba_unmultiplied(49, 130, 206, 217));
    let inner = rect.shrink(1.0);
    draw_dashed_horizontal_line(painter, inner.min.y, inner.min.x, inner.max.x, stroke);
    draw_dashed_horizontal_line(painter, inner.max.y, inner.min.x, inner.max.x, stroke);
    draw_dashed_vertical_line(painter, inner.min.x, inner.min.y, inner.max.y, stroke);
    draw_dashed_vertical_line(painter, inner.max.x, inner.min.y, inner.max.y, stroke);
}

/// 区间在屏幕上的横向范围
pub fn timing_rect(viewport: &Viewport, timing: Timing, duration: f64, rect: Rect) -> Rect {
    let left = viewport.client_x_of_time(timing.start, duration) as f32;
    let right = viewport.client_x_of_time(timing.end, duration) as f32;
    Rect::from_min_max(Pos2::new(left, rect.min.y), Pos2::new(right, rect.max.y))
}

/// 逐列绘制可见范围内的波形峰值
pub fn draw_waveform(
    painter: &Painter,
    rect: Rect,
    viewport: &Viewport,
    duration: f64,
    peaks: Option<&WaveformPeaks>,
) {
    painter.rect_filled(rect, 0.0, Color32::from_gray(24));
    let center_y = rect.center().y;
    let half_height = rect.height() * 0.45;
    let wave_color = Color32::from_rgb(120, 150, 200);

    let content_end = viewport.client_x(viewport.waveform_width()) as f32;
    let right = rect.max.x.min(content_end);

    let Some(peaks) = peaks.filter(|p| !p.is_empty()) else {
        if right > rect.min.x {
            painter.line_segment(
                [Pos2::new(rect.min.x, center_y), Pos2::new(right, center_y)],
                Stroke::new(1.0, wave_color),
            );
        }
        return;
    };

    let width = viewport.waveform_width();
    let mut x = rect.min.x;
    while x < right {
        let content_x = viewport.content_x(x as f64);
        let from = pixel_to_time(content_x, duration, width);
        let to = pixel_to_time(content_x + 1.0, duration, width);
        if let Some((lo, hi)) = peaks.range(from, to) {
            let top = center_y - hi.clamp(-1.0, 1.0) * half_height;
            let bottom = center_y - lo.clamp(-1.0, 1.0) * half_height;
            painter.line_segment(
                [Pos2::new(x, top), Pos2::new(x, bottom.max(top + 1.0))],
                Stroke::new(1.0, wave_color),
            );
        }
        x += 1.0;
    }
}

/// 播放头
pub fn draw_playhead(painter: &Painter, rect: Rect, x: f32) {
    if x >= rect.min.x && x <= rect.max.x {
        painter.line_segment(
            [Pos2::new(x, rect.min.y), Pos2::new(x, rect.max.y)],
            Stroke::new(2.0, Color32::from_rgba_premultiplied(100, 200, 255, 128)),
        );
    }
}
