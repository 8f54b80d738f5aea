//! 基于 rodio 的波形表面
//!
//! 在后台线程解码整个音频文件，生成峰值，然后用一个 Sink 播放解码后的样本。

use crossbeam_channel::{unbounded, Receiver, TryRecvError};
use egui_timing::{SurfaceError, SurfaceEvent, WaveformPeaks, WaveformSurface};
use rodio::buffer::SamplesBuffer;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

// 峰值分辨率：500 px/s 的最大缩放下每像素约一个桶
const PEAKS_PER_SECOND: u32 = 500;

struct DecodedAudio {
    channels: u16,
    sample_rate: u32,
    samples: Vec<i16>,
    duration: f64,
    peaks: WaveformPeaks,
}

fn decode_file(path: &Path) -> Result<DecodedAudio, SurfaceError> {
    let file = File::open(path).map_err(|source| SurfaceError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let decoder =
        Decoder::new(BufReader::new(file)).map_err(|e| SurfaceError::Decode(e.to_string()))?;
    let channels = decoder.channels().max(1);
    let sample_rate = decoder.sample_rate();
    if sample_rate == 0 {
        return Err(SurfaceError::Decode("sample rate is zero".into()));
    }
    let samples: Vec<i16> = decoder.collect();

    // 多声道取平均，得到单声道峰值
    let mono: Vec<f32> = samples
        .chunks(channels as usize)
        .map(|frame| {
            frame.iter().map(|s| *s as f32 / i16::MAX as f32).sum::<f32>() / frame.len() as f32
        })
        .collect();
    let duration = mono.len() as f64 / sample_rate as f64;
    let peaks = WaveformPeaks::from_samples(&mono, sample_rate, PEAKS_PER_SECOND);

    Ok(DecodedAudio {
        channels,
        sample_rate,
        samples,
        duration,
        peaks,
    })
}

pub struct RodioSurface {
    _stream: OutputStream,
    handle: OutputStreamHandle,
    sink: Option<Sink>,
    audio: Option<DecodedAudio>,
    pending: Option<Receiver<Result<DecodedAudio, SurfaceError>>>,
    pixels_per_second: f64,
    is_playing: bool,
    events: Vec<SurfaceEvent>,
}

impl RodioSurface {
    pub fn new() -> Result<Self, SurfaceError> {
        let (_stream, handle) =
            OutputStream::try_default().map_err(|e| SurfaceError::Output(e.to_string()))?;
        Ok(Self {
            _stream,
            handle,
            sink: None,
            audio: None,
            pending: None,
            pixels_per_second: 0.0,
            is_playing: false,
            events: Vec::new(),
        })
    }

    /// 用解码后的样本重新建立一个暂停的 Sink，并定位到 `position`
    fn rebuild_sink(&mut self, position: f64) {
        let Some(audio) = &self.audio else {
            return;
        };
        let sink = match Sink::try_new(&self.handle) {
            Ok(sink) => sink,
            Err(e) => {
                log::warn!("无法创建播放 Sink: {}", e);
                return;
            }
        };
        sink.pause();
        sink.append(SamplesBuffer::new(
            audio.channels,
            audio.sample_rate,
            audio.samples.clone(),
        ));
        if position > 0.0 {
            if let Err(e) = sink.try_seek(Duration::from_secs_f64(position)) {
                log::warn!("seek to {:.3}s failed: {}", position, e);
            }
        }
        if let Some(old) = self.sink.replace(sink) {
            old.stop();
        }
    }

    fn poll_decoder(&mut self) {
        let Some(receiver) = &self.pending else {
            return;
        };
        match receiver.try_recv() {
            Ok(Ok(audio)) => {
                log::info!(
                    "decoded {:.2}s, {} ch @ {} Hz",
                    audio.duration,
                    audio.channels,
                    audio.sample_rate
                );
                self.audio = Some(audio);
                self.pending = None;
                self.rebuild_sink(0.0);
                self.events.push(SurfaceEvent::Ready);
            }
            Ok(Err(e)) => {
                log::warn!("{}", e);
                self.pending = None;
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => self.pending = None,
        }
    }
}

impl WaveformSurface for RodioSurface {
    fn load(&mut self, url: &str) -> Result<(), SurfaceError> {
        self.unload();
        let path = PathBuf::from(url);
        std::fs::metadata(&path).map_err(|source| SurfaceError::Io {
            path: url.to_string(),
            source,
        })?;

        let (sender, receiver) = unbounded();
        thread::spawn(move || {
            let _ = sender.send(decode_file(&path));
        });
        self.pending = Some(receiver);
        Ok(())
    }

    fn unload(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.audio = None;
        self.pending = None;
        self.is_playing = false;
    }

    fn play(&mut self) {
        if self.audio.is_none() || self.is_playing {
            return;
        }
        if self.sink.as_ref().map_or(true, |sink| sink.empty()) {
            self.rebuild_sink(0.0);
        }
        if let Some(sink) = &self.sink {
            sink.play();
            self.is_playing = true;
            self.events.push(SurfaceEvent::Play);
        }
    }

    fn pause(&mut self) {
        if !self.is_playing {
            return;
        }
        if let Some(sink) = &self.sink {
            sink.pause();
        }
        self.is_playing = false;
        self.events.push(SurfaceEvent::Pause);
    }

    fn set_time(&mut self, seconds: f64) {
        let seconds = seconds.clamp(0.0, self.duration());
        let seekable = self.sink.as_ref().map_or(false, |sink| !sink.empty());
        if seekable {
            if let Some(sink) = &self.sink {
                if let Err(e) = sink.try_seek(Duration::from_secs_f64(seconds)) {
                    log::warn!("seek to {:.3}s failed: {}", seconds, e);
                }
            }
            return;
        }

        // 播放结束后 Sink 已空，需要重新装入样本
        self.rebuild_sink(seconds);
        if self.is_playing {
            if let Some(sink) = &self.sink {
                sink.play();
            }
        }
    }

    fn current_time(&self) -> f64 {
        match (&self.sink, &self.audio) {
            (Some(sink), Some(audio)) => sink.get_pos().as_secs_f64().min(audio.duration),
            _ => 0.0,
        }
    }

    fn duration(&self) -> f64 {
        self.audio.as_ref().map_or(0.0, |audio| audio.duration)
    }

    /// 与画布一样取整到整像素
    fn pixel_width(&self) -> f64 {
        (self.duration() * self.pixels_per_second).ceil()
    }

    fn set_zoom_density(&mut self, pixels_per_second: f64) {
        self.pixels_per_second = pixels_per_second;
    }

    fn poll_events(&mut self) -> Vec<SurfaceEvent> {
        self.poll_decoder();
        let finished = self.sink.as_ref().map_or(false, |sink| sink.empty());
        if self.is_playing && finished {
            self.is_playing = false;
            self.events.push(SurfaceEvent::Finish);
        }
        std::mem::take(&mut self.events)
    }

    fn peaks(&self) -> Option<&WaveformPeaks> {
        self.audio.as_ref().map(|audio| &audio.peaks)
    }
}
