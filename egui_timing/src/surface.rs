//! 波形表面模块
//!
//! 编辑器通过 `WaveformSurface` 使用外部的音频解码、播放与波形数据，
//! 自身不关心音频如何解码。`NullSurface` 是不发声的实现，
//! 可用于演示或在没有音频设备时使用。

use std::io;

/// 表面异步产生的事件，由编辑器每帧轮询
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SurfaceEvent {
    /// 音频已解码，`duration()` 可用
    Ready,
    Play,
    Pause,
    /// 播放到结尾
    Finish,
}

#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    #[error("无法读取音频 {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("音频解码失败: {0}")]
    Decode(String),
    #[error("音频输出设备不可用: {0}")]
    Output(String),
}

pub trait WaveformSurface {
    /// 开始加载音频。成功时稍后会产生 `SurfaceEvent::Ready`
    fn load(&mut self, url: &str) -> Result<(), SurfaceError>;
    fn unload(&mut self);
    fn play(&mut self);
    fn pause(&mut self);
    fn set_time(&mut self, seconds: f64);
    fn current_time(&self) -> f64;
    /// 未加载时为 0
    fn duration(&self) -> f64;
    /// 当前缩放下的波形像素宽度；未知时为 0
    fn pixel_width(&self) -> f64;
    fn set_zoom_density(&mut self, pixels_per_second: f64);
    fn poll_events(&mut self) -> Vec<SurfaceEvent>;
    /// 供绘制使用的峰值数据
    fn peaks(&self) -> Option<&WaveformPeaks> {
        None
    }
}

/// 按固定分辨率下采样的 (min, max) 峰值
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WaveformPeaks {
    buckets_per_second: f64,
    buckets: Vec<(f32, f32)>,
}

impl WaveformPeaks {
    /// 从单声道样本生成峰值，每秒 `buckets_per_second` 个桶
    pub fn from_samples(samples: &[f32], sample_rate: u32, buckets_per_second: u32) -> Self {
        if samples.is_empty() || sample_rate == 0 || buckets_per_second == 0 {
            return Self::default();
        }
        let samples_per_bucket = (sample_rate / buckets_per_second).max(1) as usize;
        let buckets = samples
            .chunks(samples_per_bucket)
            .map(|chunk| {
                chunk.iter().fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), s| {
                    (lo.min(*s), hi.max(*s))
                })
            })
            .collect();
        Self {
            buckets_per_second: sample_rate as f64 / samples_per_bucket as f64,
            buckets,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// `[from, to)` 秒内的最小/最大值；范围内没有数据时返回 `None`
    pub fn range(&self, from: f64, to: f64) -> Option<(f32, f32)> {
        if self.buckets.is_empty() || !(to > from) {
            return None;
        }
        let first = (from * self.buckets_per_second).floor().max(0.0) as usize;
        let last = ((to * self.buckets_per_second).ceil() as usize).min(self.buckets.len());
        if first >= last {
            return None;
        }
        self.buckets[first..last]
            .iter()
            .copied()
            .reduce(|(lo, hi), (l, h)| (lo.min(l), hi.max(h)))
    }
}

/// 不发声的表面：加载立即就绪，时间只在 `set_time` 时改变
#[derive(Debug, Default)]
pub struct NullSurface {
    duration: f64,
    loaded: bool,
    playing: bool,
    time: f64,
    pixels_per_second: f64,
    events: Vec<SurfaceEvent>,
}

impl NullSurface {
    pub fn with_duration(duration: f64) -> Self {
        Self {
            duration: duration.max(0.0),
            ..Default::default()
        }
    }
}

impl WaveformSurface for NullSurface {
    fn load(&mut self, _url: &str) -> Result<(), SurfaceError> {
        self.loaded = true;
        self.time = 0.0;
        self.events.push(SurfaceEvent::Ready);
        Ok(())
    }

    fn unload(&mut self) {
        self.loaded = false;
        self.playing = false;
        self.time = 0.0;
    }

    fn play(&mut self) {
        if self.loaded && !self.playing {
            self.playing = true;
            self.events.push(SurfaceEvent::Play);
        }
    }

    fn pause(&mut self) {
        if self.playing {
            self.playing = false;
            self.events.push(SurfaceEvent::Pause);
        }
    }

    fn set_time(&mut self, seconds: f64) {
        self.time = seconds.clamp(0.0, self.duration());
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
        self.duration() * self.pixels_per_second
    }

    fn set_zoom_density(&mut self, pixels_per_second: f64) {
        self.pixels_per_second = pixels_per_second;
    }

    fn poll_events(&mut self) -> Vec<SurfaceEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peaks_cover_requested_range() {
        // 1 秒 100 Hz 的样本：前半为 0.5，后半为 -0.25
        let samples: Vec<f32> = (0..100).map(|i| if i < 50 { 0.5 } else { -0.25 }).collect();
        let peaks = WaveformPeaks::from_samples(&samples, 100, 10);
        assert_eq!(peaks.range(0.0, 0.5), Some((0.5, 0.5)));
        assert_eq!(peaks.range(0.0, 1.0), Some((-0.25, 0.5)));
        assert_eq!(peaks.range(2.0, 3.0), None);
        assert_eq!(peaks.range(0.5, 0.5), None);
    }

    #[test]
    fn null_surface_reports_ready_and_play_state() {
        let mut surface = NullSurface::with_duration(30.0);
        assert_eq!(surface.duration(), 0.0);
        surface.load("memory://song").unwrap();
        surface.play();
        surface.play();
        surface.pause();
        assert_eq!(
            surface.poll_events(),
            vec![SurfaceEvent::Ready, SurfaceEvent::Play, SurfaceEvent::Pause]
        );
        surface.set_zoom_density(50.0);
        assert_eq!(surface.pixel_width(), 1500.0);
        surface.set_time(45.0);
        assert_eq!(surface.current_time(), 30.0);
    }
}
