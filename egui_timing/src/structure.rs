//! 数据结构模块
//!
//! 定义了对齐编辑器使用的核心数据结构：单词时间区间（Timing）、指针标识，
//! 以及对有序区间列表的纯函数操作。

use serde::{Deserialize, Serialize};

/// 最短区间长度（秒），拖拽与创建都不会产生比它更短的区间
pub const MIN_TIMING_LENGTH: f64 = 0.01;

/// 指针标识（鼠标或某个触点）
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PointerId(pub u64);

impl PointerId {
    /// 鼠标只有一个指针
    pub const MOUSE: PointerId = PointerId(0);
}

/// 一个单词被认为"正在被唱出"的时间段（秒）
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Timing {
    pub start: f64,
    pub end: f64,
}

impl Timing {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f64 {
        self.end - self.start
    }

    pub fn contains(&self, time: f64) -> bool {
        time >= self.start && time <= self.end
    }

    /// 两个区间是否有正长度的重叠（首尾相接不算重叠）
    pub fn overlaps(&self, other: &Timing) -> bool {
        self.end > other.start && self.start < other.end
    }
}

/// 返回第 `index` 个区间可以占用的范围 `(prev_end, next_start)`。
///
/// 邻居按数组顺序取，而不是按时间查找；首个区间的左界是 0，
/// 末个区间的右界是 `duration`。
pub fn neighbor_bounds(timings: &[Timing], index: usize, duration: f64) -> (f64, f64) {
    let prev_end = index
        .checked_sub(1)
        .and_then(|i| timings.get(i))
        .map(|t| t.end)
        .unwrap_or(0.0);
    let next_start = timings
        .get(index + 1)
        .map(|t| t.start)
        .unwrap_or(duration);
    (prev_end, next_start)
}

/// 检查列表是否按 start 升序且相邻区间不重叠
pub fn is_non_overlapping(timings: &[Timing]) -> bool {
    timings
        .windows(2)
        .all(|pair| pair[0].start <= pair[1].start && pair[0].end <= pair[1].start)
}

/// 构造一个新列表，其中第 `index` 个区间被替换。原列表不会被修改。
pub fn with_replaced(timings: &[Timing], index: usize, timing: Timing) -> Vec<Timing> {
    let mut next = timings.to_vec();
    if let Some(slot) = next.get_mut(index) {
        *slot = timing;
    }
    next
}

/// 构造一个追加了 `timing` 并按 start 重新排序的新列表，
/// 同时返回新区间在排序后列表中的下标。
pub fn with_inserted(timings: &[Timing], timing: Timing) -> (Vec<Timing>, usize) {
    let mut next = Vec::with_capacity(timings.len() + 1);
    next.extend_from_slice(timings);
    next.push(timing);
    // 稳定排序：start 相同的旧区间保持在前
    next.sort_by(|a, b| a.start.total_cmp(&b.start));
    let index = next
        .iter()
        .rposition(|t| *t == timing)
        .unwrap_or(next.len() - 1);
    (next, index)
}
