//! 区间绘制模块
//!
//! 在空白处按下并拖动以创建新的区间。拖动中显示一个"幽灵"预览，
//! 预览范围会被裁剪到空闲区域；松开时若范围有效则提交新区间。
//! 没有越过拖拽阈值就松开的，视为一次背景点击。

use crate::editor::TimingEditorOptions;
use crate::structure::{PointerId, Timing};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum DrawGesture {
    #[default]
    Idle,
    /// 已按下，尚未越过拖拽阈值
    Armed {
        pointer_id: PointerId,
        anchor_client_x: f64,
        anchor_time: f64,
    },
    Drawing {
        pointer_id: PointerId,
        anchor_time: f64,
        current_time: f64,
        /// 裁剪后的预览；过短时为 None（不显示，也不能提交）
        ghost: Option<Timing>,
    },
}

impl DrawGesture {
    fn pointer_id(&self) -> Option<PointerId> {
        match *self {
            DrawGesture::Idle => None,
            DrawGesture::Armed { pointer_id, .. } | DrawGesture::Drawing { pointer_id, .. } => {
                Some(pointer_id)
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DrawOutcome {
    Ignored,
    /// 提交一个新区间
    Created(Timing),
    /// 未拖动：取消选择并跳转到按下时的时间
    BackgroundClick { time: f64 },
    /// 拖动了，但裁剪后的范围太短
    Discarded,
}

/// 把原始范围 `[raw_start, raw_end]`（可以反向）裁剪到空闲区域。
///
/// 向右拖时把结束裁到第一个重叠区间的开始；向左拖时把开始裁到重叠区间的结束。
/// 结果短于 `min_length` 时返回 `None`。
pub fn clamp_to_free_space(
    timings: &[Timing],
    raw_start: f64,
    raw_end: f64,
    duration: f64,
    min_length: f64,
) -> Option<Timing> {
    let mut sorted = timings.to_vec();
    sorted.sort_by(|a, b| a.start.total_cmp(&b.start));

    let mut start = raw_start.min(raw_end).max(0.0);
    let mut end = raw_start.max(raw_end).min(duration);
    let rightward = raw_end >= raw_start;

    for timing in &sorted {
        if timing.end > start && timing.start < end {
            if rightward {
                end = end.min(timing.start);
            } else {
                start = start.max(timing.end);
            }
        }
    }

    if end - start < min_length {
        return None;
    }
    Some(Timing::new(start, end))
}

pub struct RegionDraw {
    gesture: DrawGesture,
    min_drag_px: f64,
    min_length: f64,
}

impl RegionDraw {
    pub fn new(options: &TimingEditorOptions) -> Self {
        Self {
            gesture: DrawGesture::Idle,
            min_drag_px: options.min_drag_px,
            min_length: options.min_timing_length,
        }
    }

    pub fn gesture(&self) -> &DrawGesture {
        &self.gesture
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.gesture, DrawGesture::Idle)
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.gesture, DrawGesture::Drawing { .. })
    }

    pub fn ghost(&self) -> Option<Timing> {
        match self.gesture {
            DrawGesture::Drawing { ghost, .. } => ghost,
            _ => None,
        }
    }

    /// 在空白处按下。已有手势进行中时返回 false
    pub fn pointer_down(&mut self, pointer_id: PointerId, client_x: f64, time: f64) -> bool {
        if self.is_active() {
            return false;
        }
        self.gesture = DrawGesture::Armed {
            pointer_id,
            anchor_client_x: client_x,
            anchor_time: time,
        };
        true
    }

    /// 返回更新后的预览（Drawing 状态下），否则 `None`
    pub fn pointer_move(
        &mut self,
        pointer_id: PointerId,
        client_x: f64,
        time: f64,
        timings: &[Timing],
        duration: f64,
    ) -> Option<Timing> {
        if self.gesture.pointer_id() != Some(pointer_id) {
            return None;
        }
        let anchor_time = match self.gesture {
            DrawGesture::Armed {
                anchor_client_x,
                anchor_time,
                ..
            } => {
                if (client_x - anchor_client_x).abs() < self.min_drag_px {
                    return None;
                }
                log::debug!("draw started at {:.3}s", anchor_time);
                anchor_time
            }
            DrawGesture::Drawing { anchor_time, .. } => anchor_time,
            DrawGesture::Idle => return None,
        };

        let ghost = clamp_to_free_space(timings, anchor_time, time, duration, self.min_length);
        self.gesture = DrawGesture::Drawing {
            pointer_id,
            anchor_time,
            current_time: time,
            ghost,
        };
        ghost
    }

    /// 松开指针；`time` 是松开位置对应的时间
    pub fn pointer_up(
        &mut self,
        pointer_id: PointerId,
        time: f64,
        timings: &[Timing],
        duration: f64,
    ) -> DrawOutcome {
        if self.gesture.pointer_id() != Some(pointer_id) {
            return DrawOutcome::Ignored;
        }
        let gesture = std::mem::take(&mut self.gesture);
        match gesture {
            DrawGesture::Armed { anchor_time, .. } => {
                DrawOutcome::BackgroundClick { time: anchor_time }
            }
            DrawGesture::Drawing { anchor_time, .. } => {
                match clamp_to_free_space(timings, anchor_time, time, duration, self.min_length) {
                    Some(timing) => DrawOutcome::Created(timing),
                    None => DrawOutcome::Discarded,
                }
            }
            DrawGesture::Idle => DrawOutcome::Ignored,
        }
    }

    pub fn pointer_cancel(&mut self, pointer_id: PointerId) -> bool {
        if self.gesture.pointer_id() != Some(pointer_id) {
            return false;
        }
        self.gesture = DrawGesture::Idle;
        true
    }

    pub fn abort(&mut self) {
        self.gesture = DrawGesture::Idle;
    }
}
