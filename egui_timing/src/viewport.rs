//! 视口模块
//!
//! 维护缩放（像素/秒）、波形像素宽度与水平滚动位置，
//! 负责以指针为锚点的缩放、三个滚动表面之间的同步，以及双指捏合手势的识别。

use crate::editor::TimingEditorOptions;
use crate::geometry::{pixel_to_time, time_to_pixel};

/// 一次生效的缩放结果
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoomChange {
    pub pixels_per_second: f64,
    pub waveform_width: f64,
    pub scroll_offset: f64,
}

#[derive(Clone, Debug)]
pub struct Viewport {
    pixels_per_second: f64,
    waveform_width: f64,
    scroll_offset: f64,
    // 滚动表面左边缘的屏幕 x 坐标
    origin_x: f64,
    view_width: f64,
    min_pixels_per_second: f64,
    max_pixels_per_second: f64,
    dead_zone: f64,
}

impl Viewport {
    pub fn new(options: &TimingEditorOptions) -> Self {
        Self {
            pixels_per_second: options.initial_pixels_per_second,
            waveform_width: 0.0,
            scroll_offset: 0.0,
            origin_x: 0.0,
            view_width: 0.0,
            min_pixels_per_second: options.min_pixels_per_second,
            max_pixels_per_second: options.max_pixels_per_second,
            dead_zone: options.zoom_dead_zone,
        }
    }

    pub fn pixels_per_second(&self) -> f64 {
        self.pixels_per_second
    }

    pub fn waveform_width(&self) -> f64 {
        self.waveform_width
    }

    pub fn scroll_offset(&self) -> f64 {
        self.scroll_offset
    }

    pub fn origin_x(&self) -> f64 {
        self.origin_x
    }

    pub fn view_width(&self) -> f64 {
        self.view_width
    }

    /// 宿主布局变化时更新滚动表面的位置与可视宽度
    pub fn set_layout(&mut self, origin_x: f64, view_width: f64) {
        self.origin_x = origin_x;
        self.view_width = view_width.max(0.0);
        self.scroll_offset = self.clamp_scroll(self.scroll_offset);
    }

    /// 波形引擎报告的宽度优先于计算值；引擎尚未给出宽度（0）时使用 `duration * pps`
    pub fn update_waveform_width(&mut self, reported_width: f64, duration: f64) {
        self.waveform_width = if reported_width.is_finite() && reported_width > 0.0 {
            reported_width
        } else {
            (duration * self.pixels_per_second).max(0.0)
        };
        self.scroll_offset = self.clamp_scroll(self.scroll_offset);
    }

    pub fn set_scroll_offset(&mut self, offset: f64) -> f64 {
        self.scroll_offset = self.clamp_scroll(offset);
        self.scroll_offset
    }

    fn clamp_scroll(&self, offset: f64) -> f64 {
        if !offset.is_finite() {
            return 0.0;
        }
        let offset = offset.max(0.0);
        if self.view_width > 0.0 {
            offset.min((self.waveform_width - self.view_width).max(0.0))
        } else {
            offset
        }
    }

    pub fn clamp_pixels_per_second(&self, pixels_per_second: f64) -> f64 {
        pixels_per_second.clamp(self.min_pixels_per_second, self.max_pixels_per_second)
    }

    /// 屏幕 x → 波形内容 x
    pub fn content_x(&self, client_x: f64) -> f64 {
        client_x - self.origin_x + self.scroll_offset
    }

    /// 波形内容 x → 屏幕 x
    pub fn client_x(&self, content_x: f64) -> f64 {
        content_x - self.scroll_offset + self.origin_x
    }

    pub fn time_at_client_x(&self, client_x: f64, duration: f64) -> f64 {
        pixel_to_time(self.content_x(client_x), duration, self.waveform_width)
    }

    pub fn client_x_of_time(&self, time: f64, duration: f64) -> f64 {
        self.client_x(time_to_pixel(time, duration, self.waveform_width))
    }

    /// 以 `pivot_client_x` 为锚点缩放。
    ///
    /// `measure_width` 在新的像素密度生效后返回引擎实际宽度（未知时返回 0）。
    /// 新密度与当前值相差不到死区时不做任何事并返回 `None`。
    pub fn set_zoom<F>(
        &mut self,
        pixels_per_second: f64,
        pivot_client_x: f64,
        duration: f64,
        measure_width: F,
    ) -> Option<ZoomChange>
    where
        F: FnOnce(f64) -> f64,
    {
        if !pixels_per_second.is_finite() {
            return None;
        }
        let target = self.clamp_pixels_per_second(pixels_per_second);
        if (target - self.pixels_per_second).abs() < self.dead_zone {
            return None;
        }

        // 锚点在内容中的相对位置（0..1），缩放前后保持不变
        let pivot_offset = pivot_client_x - self.origin_x;
        let ratio = if self.waveform_width > 0.0 {
            (pivot_offset + self.scroll_offset) / self.waveform_width
        } else {
            0.0
        };

        self.pixels_per_second = target;
        let reported = measure_width(target);
        self.update_waveform_width(reported, duration);
        self.scroll_offset = self.clamp_scroll(ratio * self.waveform_width - pivot_offset);

        log::debug!(
            "zoom -> {:.1} px/s, width {:.0}px, scroll {:.1}px",
            self.pixels_per_second,
            self.waveform_width,
            self.scroll_offset
        );

        Some(ZoomChange {
            pixels_per_second: self.pixels_per_second,
            waveform_width: self.waveform_width,
            scroll_offset: self.scroll_offset,
        })
    }

    /// 如果 `[start_px, end_px]` 不完全可见，返回使其居中的滚动位置
    pub fn reveal_offset(&self, start_px: f64, end_px: f64) -> Option<f64> {
        if self.view_width <= 0.0 {
            return None;
        }
        let visible_start = self.scroll_offset;
        let visible_end = self.scroll_offset + self.view_width;
        if start_px >= visible_start && end_px <= visible_end {
            return None;
        }
        let center = (start_px + end_px) / 2.0;
        Some(self.clamp_scroll(center - self.view_width / 2.0))
    }
}

/// 滚轮缩放：向上（放大）乘 1.1，向下乘 0.9
pub fn wheel_zoom_target(current: f64, zoom_in: bool, options: &TimingEditorOptions) -> f64 {
    let factor = if zoom_in {
        options.wheel_zoom_in_factor
    } else {
        options.wheel_zoom_out_factor
    };
    (current * factor).clamp(options.min_pixels_per_second, options.max_pixels_per_second)
}

/// 三个需要保持相同 scrollLeft 的表面
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScrollSurface {
    Waveform,
    Ruler,
    Overlay,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ScrollLock {
    Surface(ScrollSurface),
    Programmatic,
}

/// 单向重入锁：某个表面引发同步后，本帧内其他表面的回声滚动事件被忽略。
/// 三个表面都从同一个 `Viewport::scroll_offset` 绘制，锁只决定是否接受写入。
#[derive(Clone, Debug, Default)]
pub struct ScrollSync {
    lock: Option<ScrollLock>,
}

impl ScrollSync {
    /// 表面 `source` 报告了用户滚动。被锁住（回声）时返回 false
    pub fn on_scroll(&mut self, source: ScrollSurface) -> bool {
        match self.lock {
            Some(ScrollLock::Surface(owner)) => owner == source,
            Some(ScrollLock::Programmatic) => false,
            None => {
                self.lock = Some(ScrollLock::Surface(source));
                true
            }
        }
    }

    /// 程序化写入（缩放、定位到区间）之前调用：本帧回声全部忽略
    pub fn begin_programmatic(&mut self) {
        self.lock = Some(ScrollLock::Programmatic);
    }

    /// 下一帧开始时释放锁
    pub fn next_frame(&mut self) {
        self.lock = None;
    }

    pub fn is_locked(&self) -> bool {
        self.lock.is_some()
    }
}

/// 捏合缩放结果
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PinchZoom {
    pub pixels_per_second: f64,
    pub pivot_client_x: f64,
}

/// 双指捏合：新密度 = 起始密度 × 当前距离 / 起始距离，锚点为两指中点
#[derive(Clone, Debug, Default)]
pub struct PinchTracker {
    initial_distance: Option<f64>,
    initial_pixels_per_second: f64,
}

impl PinchTracker {
    pub fn is_active(&self) -> bool {
        self.initial_distance.is_some()
    }

    pub fn begin(&mut self, a: (f64, f64), b: (f64, f64), current_pixels_per_second: f64) {
        let distance = pinch_distance(a, b);
        if distance > 0.0 {
            self.initial_distance = Some(distance);
            self.initial_pixels_per_second = current_pixels_per_second;
        }
    }

    pub fn update(&self, a: (f64, f64), b: (f64, f64)) -> Option<PinchZoom> {
        let initial = self.initial_distance?;
        let scale = pinch_distance(a, b) / initial;
        Some(PinchZoom {
            pixels_per_second: self.initial_pixels_per_second * scale,
            pivot_client_x: (a.0 + b.0) / 2.0,
        })
    }

    pub fn end(&mut self) {
        self.initial_distance = None;
    }
}

fn pinch_distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    (a.0 - b.0).hypot(a.1 - b.1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport(duration: f64, pps: f64) -> Viewport {
        let options = TimingEditorOptions {
            initial_pixels_per_second: pps,
            ..Default::default()
        };
        let mut viewport = Viewport::new(&options);
        viewport.update_waveform_width(0.0, duration);
        viewport
    }

    #[test]
    fn zoom_keeps_time_under_pivot() {
        let mut vp = viewport(100.0, 10.0);
        vp.set_layout(40.0, 800.0);
        let pivot = vp.client_x_of_time(50.0, 100.0);
        let change = vp.set_zoom(20.0, pivot, 100.0, |_| 0.0).unwrap();
        assert_eq!(change.waveform_width, 2000.0);
        assert!((vp.time_at_client_x(pivot, 100.0) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn reported_width_is_authoritative() {
        let mut vp = viewport(100.0, 10.0);
        vp.set_zoom(20.0, 0.0, 100.0, |_| 2013.0);
        assert_eq!(vp.waveform_width(), 2013.0);
    }

    #[test]
    fn dead_zone_and_clamp() {
        let mut vp = viewport(100.0, 50.0);
        assert!(vp.set_zoom(50.3, 0.0, 100.0, |_| 0.0).is_none());
        let change = vp.set_zoom(10_000.0, 0.0, 100.0, |_| 0.0).unwrap();
        assert_eq!(change.pixels_per_second, 500.0);
        // 已在上限，再放大不产生变化
        assert!(vp.set_zoom(600.0, 0.0, 100.0, |_| 0.0).is_none());
    }

    #[test]
    fn scroll_never_negative() {
        let mut vp = viewport(100.0, 10.0);
        vp.set_layout(0.0, 500.0);
        assert_eq!(vp.set_scroll_offset(-30.0), 0.0);
        assert_eq!(vp.set_scroll_offset(5000.0), 500.0);
    }

    #[test]
    fn scroll_lock_ignores_echo_until_next_frame() {
        let mut sync = ScrollSync::default();
        assert!(sync.on_scroll(ScrollSurface::Overlay));
        assert!(!sync.on_scroll(ScrollSurface::Waveform));
        assert!(!sync.on_scroll(ScrollSurface::Ruler));
        // 同一表面的连续滚动仍然同步
        assert!(sync.on_scroll(ScrollSurface::Overlay));
        sync.next_frame();
        assert!(sync.on_scroll(ScrollSurface::Waveform));
    }

    #[test]
    fn programmatic_write_locks_every_surface() {
        let mut sync = ScrollSync::default();
        sync.begin_programmatic();
        assert!(sync.is_locked());
        assert!(!sync.on_scroll(ScrollSurface::Overlay));
        assert!(!sync.on_scroll(ScrollSurface::Ruler));
        sync.next_frame();
        assert!(!sync.is_locked());
        assert!(sync.on_scroll(ScrollSurface::Ruler));
    }

    #[test]
    fn pinch_scales_from_initial_density() {
        let mut pinch = PinchTracker::default();
        pinch.begin((100.0, 0.0), (200.0, 0.0), 40.0);
        let zoom = pinch.update((50.0, 0.0), (250.0, 0.0)).unwrap();
        assert_eq!(zoom.pixels_per_second, 80.0);
        assert_eq!(zoom.pivot_client_x, 150.0);
        pinch.end();
        assert!(pinch.update((0.0, 0.0), (1.0, 0.0)).is_none());
    }

    #[test]
    fn wheel_steps() {
        let options = TimingEditorOptions::default();
        assert!((wheel_zoom_target(50.0, true, &options) - 55.0).abs() < 1e-9);
        assert!((wheel_zoom_target(50.0, false, &options) - 45.0).abs() < 1e-9);
        assert_eq!(wheel_zoom_target(21.0, false, &options), 20.0);
    }
}
