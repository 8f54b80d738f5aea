use egui::*;

/// 标签的纵向位置（占覆盖层高度的百分比），按下标往返循环，使相邻标签错开
const SNAKE_HEIGHTS: [f32; 6] = [5.0, 20.0, 35.0, 50.0, 65.0, 80.0];

pub fn snake_height_ratio(index: usize) -> f32 {
    let cycle = (SNAKE_HEIGHTS.len() - 1) * 2;
    let pos = index % cycle;
    let slot = if pos < SNAKE_HEIGHTS.len() {
        pos
    } else {
        cycle - pos
    };
    SNAKE_HEIGHTS[slot] / 100.0
}

pub struct RegionRenderer<'a> {
    index: usize,
    word: &'a str,
    is_selected: bool,
    is_hovered: bool,
}

impl<'a> RegionRenderer<'a> {
    pub fn new(index: usize, word: &'a str) -> Self {
        Self {
            index,
            word,
            is_selected: false,
            is_hovered: false,
        }
    }

    pub fn set_selected(&mut self, selected: bool) {
        self.is_selected = selected;
    }

    pub fn set_hovered(&mut self, hovered: bool) {
        self.is_hovered = hovered;
    }

    /// `rect` 为区间在屏幕上的范围（整个覆盖层高度）
    pub fn render(&self, painter: &Painter, rect: Rect) {
        if self.is_selected {
            painter.rect_filled(rect, 2.0, Color32::from_rgba_unmultiplied(253, 224, 71, 115));
            painter.rect_stroke(
                rect,
                2.0,
                Stroke::new(2.0, Color32::from_rgba_unmultiplied(202, 138, 4, 204)),
            );
        } else if self.is_hovered {
            painter.rect_filled(rect, 2.0, Color32::from_rgba_unmultiplied(250, 250, 250, 64));
        } else {
            painter.rect_filled(rect, 2.0, Color32::from_rgba_unmultiplied(150, 150, 150, 64));
            draw_gradient_hint(painter, rect);
            painter.rect_stroke(
                rect,
                2.0,
                Stroke::new(1.0, Color32::from_rgba_unmultiplied(200, 200, 200, 90)),
            );
        }

        self.render_label(painter, rect);
    }

    fn render_label(&self, painter: &Painter, rect: Rect) {
        if self.word.is_empty() {
            return;
        }
        let pos = Pos2::new(
            rect.min.x + 3.0,
            rect.min.y + rect.height() * snake_height_ratio(self.index),
        );
        let (color, font) = if self.is_selected {
            (Color32::from_rgb(0x71, 0x3f, 0x12), FontId::proportional(12.0))
        } else {
            (Color32::from_gray(230), FontId::proportional(11.0))
        };
        painter.text(pos, Align2::LEFT_TOP, self.word, font.clone(), color);
        if self.is_selected {
            // 加粗
            painter.text(pos + vec2(0.6, 0.0), Align2::LEFT_TOP, self.word, font, color);
        }
    }
}

/// 未选中区间底部的蓝→青渐变
fn draw_gradient_hint(painter: &Painter, rect: Rect) {
    let band = Rect::from_min_max(
        Pos2::new(rect.min.x, rect.max.y - rect.height().min(6.0)),
        rect.max,
    );
    let left = Color32::from_rgba_unmultiplied(59, 130, 246, 110);
    let right = Color32::from_rgba_unmultiplied(34, 211, 238, 110);
    let mut mesh = epaint::Mesh::default();
    mesh.colored_vertex(band.left_top(), left);
    mesh.colored_vertex(band.right_top(), right);
    mesh.colored_vertex(band.right_bottom(), right);
    mesh.colored_vertex(band.left_bottom(), left);
    mesh.add_triangle(0, 1, 2);
    mesh.add_triangle(0, 2, 3);
    painter.add(Shape::mesh(mesh));
}
