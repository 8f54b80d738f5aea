use egui_timing::structure::is_non_overlapping;
use egui_timing::{
    pixel_to_time, time_to_pixel, PointerId, ScrollSurface, SurfaceError, SurfaceEvent, Timing,
    TimingController, TimingEditorCommand, TimingEditorEvent, TimingEditorOptions,
    WaveformSurface,
};
use std::cell::RefCell;
use std::rc::Rc;

/// 记录所有调用的表面，宽度可附加一个固定偏差以模拟引擎取整
#[derive(Default)]
struct Recorded {
    seeks: Vec<f64>,
    densities: Vec<f64>,
}

struct RecordingSurface {
    duration: f64,
    width_bias: f64,
    pixels_per_second: f64,
    time: f64,
    loaded: bool,
    events: Vec<SurfaceEvent>,
    log: Rc<RefCell<Recorded>>,
}

impl RecordingSurface {
    fn new(duration: f64, log: Rc<RefCell<Recorded>>) -> Self {
        Self {
            duration,
            width_bias: 0.0,
            pixels_per_second: 0.0,
            time: 0.0,
            loaded: false,
            events: Vec::new(),
            log,
        }
    }
}

impl WaveformSurface for RecordingSurface {
    fn load(&mut self, url: &str) -> Result<(), SurfaceError> {
        if url.is_empty() {
            return Err(SurfaceError::Decode("empty url".into()));
        }
        self.loaded = true;
        self.events.push(SurfaceEvent::Ready);
        Ok(())
    }

    fn unload(&mut self) {
        self.loaded = false;
    }

    fn play(&mut self) {
        self.events.push(SurfaceEvent::Play);
    }

    fn pause(&mut self) {
        self.events.push(SurfaceEvent::Pause);
    }

    fn set_time(&mut self, seconds: f64) {
        self.time = seconds;
        self.log.borrow_mut().seeks.push(seconds);
    }

    fn current_time(&self) -> f64 {
        self.time
    }

    fn duration(&self) -> f64 {
        if self.loaded {
            self.duration
        } else {
            0.0
        }
    }

    fn pixel_width(&self) -> f64 {
        if self.pixels_per_second > 0.0 {
            self.duration() * self.pixels_per_second + self.width_bias
        } else {
            0.0
        }
    }

    fn set_zoom_density(&mut self, pixels_per_second: f64) {
        self.pixels_per_second = pixels_per_second;
        self.log.borrow_mut().densities.push(pixels_per_second);
    }

    fn poll_events(&mut self) -> Vec<SurfaceEvent> {
        std::mem::take(&mut self.events)
    }
}

struct Harness {
    controller: TimingController,
    log: Rc<RefCell<Recorded>>,
    events: Rc<RefCell<Vec<TimingEditorEvent>>>,
}

impl Harness {
    /// 100 秒音频，10 px/s（宽 1000px），覆盖层从屏幕 x=0 开始、宽 400px
    fn new(timings: Vec<Timing>) -> Self {
        Self::with_surface(timings, |surface| surface)
    }

    fn with_surface(
        timings: Vec<Timing>,
        configure: impl FnOnce(RecordingSurface) -> RecordingSurface,
    ) -> Self {
        let log = Rc::new(RefCell::new(Recorded::default()));
        let surface = configure(RecordingSurface::new(100.0, log.clone()));
        let options = TimingEditorOptions {
            initial_pixels_per_second: 10.0,
            min_pixels_per_second: 5.0,
            ..Default::default()
        };
        let mut controller = TimingController::new(options, Box::new(surface));
        controller.set_layout(0.0, 400.0);
        controller.execute_command(TimingEditorCommand::LoadAudio(Some("vocals.wav".into())));
        controller.execute_command(TimingEditorCommand::ReplaceTimings(timings));
        controller.update();

        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        controller.set_event_listener(Box::new(move |event| sink.borrow_mut().push(event.clone())));
        Self {
            controller,
            log,
            events,
        }
    }

    fn drag(&mut self, pointer: PointerId, from_x: f64, to_x: f64) {
        self.controller.pointer_down(pointer, from_x);
        self.controller.pointer_move(pointer, to_x);
        self.controller.pointer_up(pointer, to_x);
    }

    fn commits(&self) -> Vec<Vec<Timing>> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                TimingEditorEvent::TimingsChanged(timings) => Some(timings.clone()),
                _ => None,
            })
            .collect()
    }
}

#[test]
fn committed_lists_never_overlap() {
    let mut harness = Harness::new(vec![
        Timing::new(2.0, 4.0),
        Timing::new(6.0, 7.5),
        Timing::new(10.0, 12.0),
        Timing::new(20.0, 22.0),
    ]);

    // 各种方向和距离的移动、调整、创建
    let drags: [(f64, f64); 10] = [
        (30.0, 200.0),
        (70.0, 10.0),
        (100.0, 500.0),
        (61.0, 0.0),
        (119.0, 400.0),
        (300.0, 150.0),
        (150.0, 350.0),
        (210.0, 90.0),
        (2.0, 390.0),
        (380.0, 5.0),
    ];
    for (from, to) in drags {
        // 第一次按下只会选中，第二次才拖动
        harness.drag(PointerId::MOUSE, from, from);
        harness.drag(PointerId::MOUSE, from, to);
        assert!(
            is_non_overlapping(harness.controller.timings()),
            "{:?}",
            harness.controller.timings()
        );
    }
    for list in harness.commits() {
        assert!(is_non_overlapping(&list));
        assert!(list.iter().all(|t| t.start >= 0.0 && t.end <= 100.0 && t.start < t.end));
    }
    assert!(!harness.commits().is_empty());
}

#[test]
fn zoom_keeps_time_under_pivot() {
    let mut harness = Harness::new(Vec::new());
    assert_eq!(harness.controller.viewport().waveform_width(), 1000.0);
    harness.controller.scroll(ScrollSurface::Overlay, 300.0);
    harness.controller.end_frame();

    let duration = harness.controller.duration();
    let pivot = harness.controller.viewport().client_x_of_time(50.0, duration);
    assert_eq!(pivot, 200.0);

    harness.controller.set_zoom(20.0, pivot);
    let viewport = harness.controller.viewport();
    assert_eq!(viewport.pixels_per_second(), 20.0);
    assert_eq!(viewport.waveform_width(), 2000.0);
    assert!((viewport.time_at_client_x(pivot, duration) - 50.0).abs() < 1e-9);
    assert_eq!(harness.log.borrow().densities.last(), Some(&20.0));
    assert_eq!(
        harness.events.borrow().last(),
        Some(&TimingEditorEvent::ZoomChanged {
            pixels_per_second: 20.0
        })
    );
}

#[test]
fn reported_width_wins_over_computed_width() {
    let mut harness = Harness::with_surface(Vec::new(), |mut surface| {
        surface.width_bias = 7.0;
        surface
    });
    assert_eq!(harness.controller.viewport().waveform_width(), 1007.0);
    harness.controller.wheel_zoom(true, 100.0);
    assert!((harness.controller.viewport().waveform_width() - 1107.0).abs() < 1e-9);
}

#[test]
fn move_is_clamped_to_previous_end() {
    let mut harness = Harness::new(vec![
        Timing::new(7.0, 9.0),
        Timing::new(10.0, 12.0),
        Timing::new(15.0, 16.0),
    ]);
    harness.controller.select_index(1);
    // -30px = -3s
    harness.drag(PointerId::MOUSE, 110.0, 80.0);
    assert_eq!(harness.controller.timings()[1], Timing::new(9.0, 11.0));
    assert_eq!(harness.commits().len(), 1);
}

#[test]
fn create_is_clamped_to_next_start() {
    let mut harness = Harness::new(vec![Timing::new(5.0, 6.0)]);
    harness.drag(PointerId::MOUSE, 40.0, 80.0);
    assert_eq!(
        harness.controller.timings(),
        &[Timing::new(4.0, 5.0), Timing::new(5.0, 6.0)]
    );
    assert_eq!(
        harness.commits(),
        vec![vec![Timing::new(4.0, 5.0), Timing::new(5.0, 6.0)]]
    );
}

#[test]
fn too_short_create_changes_nothing() {
    let mut harness = Harness::new(vec![Timing::new(5.0, 6.0)]);
    harness.controller.pointer_down(PointerId::MOUSE, 49.95);
    harness.controller.pointer_move(PointerId::MOUSE, 80.0);
    assert_eq!(harness.controller.ghost(), None);
    harness.controller.pointer_up(PointerId::MOUSE, 80.0);
    assert_eq!(harness.controller.timings(), &[Timing::new(5.0, 6.0)]);
    assert!(harness.commits().is_empty());
    // 拖动过，不算背景点击
    assert!(harness.log.borrow().seeks.is_empty());
}

#[test]
fn cancel_restores_original_bounds() {
    let mut harness = Harness::new(vec![Timing::new(20.0, 22.0)]);
    harness.controller.select_index(0);
    harness.controller.pointer_down(PointerId(9), 210.0);
    harness.controller.pointer_move(PointerId(9), 260.0);
    assert_eq!(
        harness.controller.display_timing(0),
        Some(Timing::new(25.0, 27.0))
    );
    harness.controller.pointer_cancel(PointerId(9));
    assert_eq!(harness.controller.timings(), &[Timing::new(20.0, 22.0)]);
    assert_eq!(
        harness.controller.display_timing(0),
        Some(Timing::new(20.0, 22.0))
    );
    // 取消后的松开不再提交
    harness.controller.pointer_up(PointerId(9), 260.0);
    assert!(harness.commits().is_empty());
}

#[test]
fn small_motion_is_a_click_and_large_motion_commits_once() {
    let mut harness = Harness::new(vec![Timing::new(20.0, 22.0)]);
    harness.controller.select_index(0);

    harness.drag(PointerId::MOUSE, 210.0, 213.0);
    assert!(harness.commits().is_empty());
    assert_eq!(harness.controller.selected(), Some(0));

    harness.controller.pointer_down(PointerId::MOUSE, 210.0);
    harness.controller.pointer_move(PointerId::MOUSE, 230.0);
    harness.controller.pointer_move(PointerId::MOUSE, 260.0);
    harness.controller.pointer_up(PointerId::MOUSE, 260.0);
    assert_eq!(harness.commits(), vec![vec![Timing::new(25.0, 27.0)]]);
    assert_eq!(harness.controller.selected(), Some(0));
}

#[test]
fn foreign_pointers_do_not_disturb_a_gesture() {
    let mut harness = Harness::new(vec![Timing::new(20.0, 22.0)]);
    harness.controller.select_index(0);
    harness.controller.pointer_down(PointerId(1), 210.0);
    harness.controller.pointer_down(PointerId(2), 300.0);
    harness.controller.pointer_move(PointerId(2), 390.0);
    harness.controller.pointer_up(PointerId(2), 390.0);
    assert!(harness.controller.ghost().is_none());
    harness.controller.pointer_move(PointerId(1), 260.0);
    harness.controller.pointer_up(PointerId(1), 260.0);
    assert_eq!(harness.commits(), vec![vec![Timing::new(25.0, 27.0)]]);
}

#[test]
fn ruler_and_background_clicks_seek() {
    let mut harness = Harness::new(vec![Timing::new(20.0, 22.0)]);
    harness.controller.ruler_click(125.0);
    harness.drag(PointerId::MOUSE, 300.0, 300.0);
    assert_eq!(harness.log.borrow().seeks, vec![12.5, 30.0]);
}

#[test]
fn loading_new_audio_resets_readiness() {
    let mut harness = Harness::new(vec![Timing::new(20.0, 22.0)]);
    harness
        .controller
        .execute_command(TimingEditorCommand::LoadAudio(Some(String::new())));
    assert!(!harness.controller.is_ready());
    harness.controller.update();
    assert!(!harness.controller.is_ready());
    harness.drag(PointerId::MOUSE, 300.0, 380.0);
    assert_eq!(harness.controller.timings().len(), 1);

    harness
        .controller
        .execute_command(TimingEditorCommand::LoadAudio(Some("other.wav".into())));
    harness.controller.update();
    assert!(harness.controller.is_ready());
    assert!(harness
        .events
        .borrow()
        .contains(&TimingEditorEvent::AudioReady { duration: 100.0 }));
}

#[test]
fn geometry_round_trips() {
    for (duration, width) in [(1.0, 1.0), (3.7, 185.0), (100.0, 1000.0), (612.25, 30612.5)] {
        for step in 0..=50 {
            let t = duration * step as f64 / 50.0;
            let back = pixel_to_time(time_to_pixel(t, duration, width), duration, width);
            assert!((back - t).abs() < 1e-9 * duration.max(1.0));
        }
    }
}
