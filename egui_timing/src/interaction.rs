//! 区间交互模块
//!
//! 单个区间上的指针手势状态机：选择、移动、左侧调整、右侧调整。
//! 拖拽过程中只更新手势内部的实时边界（live），松开指针时才生成一次提交；
//! 与相邻区间的重叠在拖拽时通过夹紧直接避免。

use crate::editor::TimingEditorOptions;
use crate::geometry::{pixel_to_time, time_to_pixel};
use crate::structure::{neighbor_bounds, PointerId, Timing};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DragMode {
    Move,
    ResizeLeft,
    ResizeRight,
}

/// 指针命中的区间及其区域
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegionHit {
    pub index: usize,
    pub mode: DragMode,
}

/// 在内容坐标 `content_x` 处查找区间。
///
/// 选中的区间绘制在最上层，因此优先命中；其余区间后绘制者优先。
pub fn hit_test(
    timings: &[Timing],
    selected: Option<usize>,
    content_x: f64,
    duration: f64,
    pixel_width: f64,
    edge_hotzone_px: f64,
) -> Option<RegionHit> {
    let probe = |index: usize| -> Option<RegionHit> {
        let timing = timings.get(index)?;
        let left = time_to_pixel(timing.start, duration, pixel_width);
        let right = time_to_pixel(timing.end, duration, pixel_width);
        if content_x < left || content_x > right {
            return None;
        }
        let width = right - left;
        let from_left = content_x - left;
        let from_right = right - content_x;
        let mode = if from_left < edge_hotzone_px && from_left <= width / 2.0 {
            DragMode::ResizeLeft
        } else if from_right < edge_hotzone_px {
            DragMode::ResizeRight
        } else {
            DragMode::Move
        };
        Some(RegionHit { index, mode })
    };

    if let Some(hit) = selected.and_then(probe) {
        return Some(hit);
    }
    (0..timings.len())
        .rev()
        .filter(|index| Some(*index) != selected)
        .find_map(probe)
}

/// 一个进行中的拖拽
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragState {
    pub index: usize,
    pub mode: DragMode,
    pub pointer_id: PointerId,
    pub anchor_client_x: f64,
    pub original: Timing,
    pub live: Timing,
    // 指针位移超过阈值后才开始改变 live
    pub engaged: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum RegionGesture {
    #[default]
    Idle,
    Dragging(DragState),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerDownOutcome {
    /// 按下的是未选中的区间：只执行选择，不开始拖拽
    Selected(usize),
    DragStarted(DragMode),
    /// 已有手势在进行，或下标失效
    Ignored,
}

/// 松开指针后需要写回的结果
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimingCommit {
    pub index: usize,
    pub timing: Timing,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerUpOutcome {
    Ignored,
    /// 边界没有变化，视为一次点击
    Click { index: usize },
    Commit(TimingCommit),
}

pub struct RegionInteraction {
    gesture: RegionGesture,
    min_drag_px: f64,
    min_length: f64,
}

impl RegionInteraction {
    pub fn new(options: &TimingEditorOptions) -> Self {
        Self {
            gesture: RegionGesture::Idle,
            min_drag_px: options.min_drag_px,
            min_length: options.min_timing_length,
        }
    }

    pub fn gesture(&self) -> &RegionGesture {
        &self.gesture
    }

    pub fn is_active(&self) -> bool {
        matches!(self.gesture, RegionGesture::Dragging(_))
    }

    /// 拖拽中区间的实时边界，用于绘制时覆盖已提交的值
    pub fn live_timing(&self, index: usize) -> Option<Timing> {
        match self.gesture {
            RegionGesture::Dragging(state) if state.index == index => Some(state.live),
            _ => None,
        }
    }

    pub fn pointer_down(
        &mut self,
        hit: RegionHit,
        pointer_id: PointerId,
        client_x: f64,
        timings: &[Timing],
        selected: Option<usize>,
    ) -> PointerDownOutcome {
        if self.is_active() {
            return PointerDownOutcome::Ignored;
        }
        let Some(original) = timings.get(hit.index).copied() else {
            return PointerDownOutcome::Ignored;
        };
        if selected != Some(hit.index) {
            return PointerDownOutcome::Selected(hit.index);
        }

        log::debug!("region {} drag start ({:?})", hit.index, hit.mode);
        self.gesture = RegionGesture::Dragging(DragState {
            index: hit.index,
            mode: hit.mode,
            pointer_id,
            anchor_client_x: client_x,
            original,
            live: original,
            engaged: false,
        });
        PointerDownOutcome::DragStarted(hit.mode)
    }

    /// 返回新的实时边界；指针不匹配或尚未越过拖拽阈值时返回 `None`
    pub fn pointer_move(
        &mut self,
        pointer_id: PointerId,
        client_x: f64,
        timings: &[Timing],
        duration: f64,
        pixel_width: f64,
    ) -> Option<Timing> {
        let RegionGesture::Dragging(state) = &mut self.gesture else {
            return None;
        };
        if state.pointer_id != pointer_id {
            return None;
        }

        let delta_px = client_x - state.anchor_client_x;
        if !state.engaged {
            if delta_px.abs() < self.min_drag_px {
                return None;
            }
            state.engaged = true;
        }

        let delta = pixel_to_time(delta_px, duration, pixel_width);
        let (prev_end, next_start) = neighbor_bounds(timings, state.index, duration);
        state.live = match state.mode {
            DragMode::Move => clamp_move(state.original, delta, prev_end, next_start, duration),
            DragMode::ResizeLeft => {
                clamp_resize_left(state.original, delta, prev_end, self.min_length)
            }
            DragMode::ResizeRight => {
                clamp_resize_right(state.original, delta, next_start, self.min_length)
            }
        };
        Some(state.live)
    }

    pub fn pointer_up(&mut self, pointer_id: PointerId) -> PointerUpOutcome {
        let RegionGesture::Dragging(state) = self.gesture else {
            return PointerUpOutcome::Ignored;
        };
        if state.pointer_id != pointer_id {
            return PointerUpOutcome::Ignored;
        }
        self.gesture = RegionGesture::Idle;

        if state.live != state.original {
            PointerUpOutcome::Commit(TimingCommit {
                index: state.index,
                timing: state.live,
            })
        } else {
            PointerUpOutcome::Click { index: state.index }
        }
    }

    /// 放弃手势，返回需要恢复显示的区间下标与原始边界
    pub fn pointer_cancel(&mut self, pointer_id: PointerId) -> Option<(usize, Timing)> {
        match self.gesture {
            RegionGesture::Dragging(state) if state.pointer_id == pointer_id => {
                self.gesture = RegionGesture::Idle;
                log::debug!("region {} drag cancelled", state.index);
                Some((state.index, state.original))
            }
            _ => None,
        }
    }

    /// 无条件放弃（例如列表被整体替换或开始捏合）
    pub fn abort(&mut self) {
        if let RegionGesture::Dragging(state) = self.gesture {
            self.pointer_cancel(state.pointer_id);
        }
    }
}

/// 整体平移；不越过前一个区间的结束和后一个区间的开始，并限制在 `[0, duration]`
pub fn clamp_move(
    original: Timing,
    delta: f64,
    prev_end: f64,
    next_start: f64,
    duration: f64,
) -> Timing {
    let length = original.length();
    let mut start = original.start + delta;
    let mut end = original.end + delta;
    if start < prev_end {
        start = prev_end;
        end = start + length;
    }
    if end > next_start {
        end = next_start;
        start = end - length;
    }
    Timing::new(start.max(0.0), end.min(duration.max(0.0)))
}

pub fn clamp_resize_left(original: Timing, delta: f64, prev_end: f64, min_length: f64) -> Timing {
    let start = (original.start + delta)
        .min(original.end - min_length)
        .max(prev_end);
    Timing::new(start, original.end)
}

pub fn clamp_resize_right(
    original: Timing,
    delta: f64,
    next_start: f64,
    min_length: f64,
) -> Timing {
    let end = (original.end + delta)
        .max(original.start + min_length)
        .min(next_start);
    Timing::new(original.start, end)
}
