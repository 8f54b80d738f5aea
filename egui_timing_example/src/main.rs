mod audio;

use audio::RodioSurface;
use eframe::egui;
use egui_timing::{
    NullSurface, SyncMapFile, Timing, TimingEditor, TimingEditorCommand, TimingEditorEvent,
    TimingEditorOptions, WaveformSurface,
};
use rfd::FileDialog;
use std::path::{Path, PathBuf};

const OPTIONS_FILE: &str = "timing_editor.json";

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let native_options = eframe::NativeOptions::default();
    eframe::run_native(
        "egui_timing Example",
        native_options,
        Box::new(|_cc| Ok(Box::new(TimingEditorApp::new()))),
    )
}

fn load_options() -> TimingEditorOptions {
    let path = Path::new(OPTIONS_FILE);
    if !path.exists() {
        return TimingEditorOptions::default();
    }
    match TimingEditorOptions::load_from_path(path) {
        Ok(options) => {
            log::info!("Loaded options from {}", OPTIONS_FILE);
            options
        }
        Err(e) => {
            log::warn!("Ignoring {}: {}", OPTIONS_FILE, e);
            TimingEditorOptions::default()
        }
    }
}

fn create_surface() -> Box<dyn WaveformSurface> {
    match RodioSurface::new() {
        Ok(surface) => Box::new(surface),
        Err(e) => {
            log::warn!("Audio output unavailable, running silent: {}", e);
            Box::new(NullSurface::default())
        }
    }
}

/// 按空白切分歌词
fn tokenize(lyrics: &str) -> Vec<String> {
    lyrics.split_whitespace().map(str::to_string).collect()
}

/// 把整段音频平均分给每个单词，单词之间留出 10% 的间隙
fn spread_timings(word_count: usize, duration: f64) -> Vec<Timing> {
    if word_count == 0 || duration <= 0.0 {
        return Vec::new();
    }
    let slot = duration / word_count as f64;
    let gap = slot * 0.05;
    (0..word_count)
        .map(|i| {
            let start = i as f64 * slot;
            Timing::new(start + gap, start + slot - gap)
        })
        .collect()
}

struct TimingEditorApp {
    editor: TimingEditor,
    audio_path: Option<PathBuf>,
    lyrics: String,
    words: Vec<String>,
    // 最近一次提交的区间列表
    timings: Vec<Timing>,
    status: String,
}

impl TimingEditorApp {
    fn new() -> Self {
        let editor = TimingEditor::new(load_options(), create_surface());
        Self {
            editor,
            audio_path: None,
            lyrics: String::new(),
            words: Vec::new(),
            timings: Vec::new(),
            status: "Open an audio file to start".to_string(),
        }
    }

    fn open_audio(&mut self) {
        if let Some(path) = FileDialog::new()
            .set_title("Open Audio")
            .add_filter("Audio", &["wav", "mp3", "flac", "ogg"])
            .pick_file()
        {
            self.load_audio(path);
        }
    }

    fn load_audio(&mut self, path: PathBuf) {
        log::info!("Opening audio: {:?}", path);
        self.editor
            .execute_command(TimingEditorCommand::LoadAudio(Some(
                path.to_string_lossy().into_owned(),
            )));
        self.status = format!("Loading {}", path.display());
        self.audio_path = Some(path);
    }

    fn set_lyrics_words(&mut self) {
        self.words = tokenize(&self.lyrics);
        self.editor
            .execute_command(TimingEditorCommand::SetWords(self.words.clone()));
    }

    fn replace_timings(&mut self, timings: Vec<Timing>) {
        self.timings = timings.clone();
        self.editor
            .execute_command(TimingEditorCommand::ReplaceTimings(timings));
    }

    fn spread_words(&mut self) {
        let duration = self.editor.controller().duration();
        if duration <= 0.0 {
            self.status = "Audio is not ready yet".to_string();
            return;
        }
        let timings = spread_timings(self.words.len(), duration);
        self.status = format!("Spread {} words over {:.1}s", timings.len(), duration);
        self.replace_timings(timings);
    }

    fn save_sync_map(&mut self) {
        let Some(path) = FileDialog::new()
            .set_title("Save Sync Map")
            .add_filter("Sync map", &["json"])
            .save_file()
        else {
            return;
        };
        let file = SyncMapFile::new(
            self.audio_path.clone(),
            self.words.clone(),
            self.timings.clone(),
        );
        match file.save_to_path(&path) {
            Ok(saved) => self.status = format!("Saved {}", saved.display()),
            Err(e) => {
                log::error!("Failed to save sync map: {}", e);
                self.status = format!("Save failed: {}", e);
            }
        }
    }

    fn open_sync_map(&mut self) {
        let Some(path) = FileDialog::new()
            .set_title("Open Sync Map")
            .add_filter("Sync map", &["json"])
            .pick_file()
        else {
            return;
        };
        match SyncMapFile::load_from_path(&path) {
            Ok(file) => {
                self.lyrics = file.words.join(" ");
                self.set_lyrics_words();
                self.replace_timings(file.timings);
                if let Some(audio_path) = file.audio_path {
                    self.load_audio(audio_path);
                }
                self.status = format!("Opened {}", path.display());
            }
            Err(e) => {
                log::error!("Failed to open sync map: {}", e);
                self.status = format!("Open failed: {}", e);
            }
        }
    }

    fn handle_event(&mut self, event: TimingEditorEvent) {
        log::info!("[TimingEditorEvent] {:?}", event);
        match event {
            TimingEditorEvent::TimingsChanged(timings) => self.timings = timings,
            TimingEditorEvent::AudioReady { duration } => {
                self.status = format!("Ready ({:.1}s)", duration);
            }
            _ => {}
        }
    }

    fn ui_word_bricks(&mut self, ui: &mut egui::Ui) {
        let selected = self.editor.selected();
        let mut clicked = None;
        ui.horizontal_wrapped(|ui| {
            for (index, word) in self.words.iter().enumerate() {
                let has_timing = index < self.editor.timings().len();
                let text = if has_timing {
                    egui::RichText::new(word)
                } else {
                    egui::RichText::new(word).weak()
                };
                if ui.selectable_label(selected == Some(index), text).clicked() {
                    clicked = Some(index);
                }
            }
        });
        if let Some(index) = clicked {
            self.editor.select_index(index);
        }
    }
}

impl eframe::App for TimingEditorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("menu").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("Open audio…").clicked() {
                    self.open_audio();
                }
                ui.separator();
                if ui.button("Open sync map…").clicked() {
                    self.open_sync_map();
                }
                if ui.button("Save sync map…").clicked() {
                    self.save_sync_map();
                }
                ui.separator();
                if ui
                    .add_enabled(!self.words.is_empty(), egui::Button::new("Spread words"))
                    .clicked()
                {
                    self.spread_words();
                }
            });
        });

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.label(&self.status);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.label("Lyrics");
            let response = ui.add(
                egui::TextEdit::multiline(&mut self.lyrics)
                    .desired_rows(3)
                    .desired_width(f32::INFINITY),
            );
            if response.changed() {
                self.set_lyrics_words();
            }

            ui.add_space(6.0);
            self.ui_word_bricks(ui);
            ui.add_space(6.0);
            ui.separator();

            self.editor.ui(ui);
        });

        // Handle events
        for event in self.editor.take_events() {
            self.handle_event(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui_timing::structure::is_non_overlapping;

    #[test]
    fn tokenizer_splits_on_whitespace() {
        assert_eq!(tokenize("  hello\tworld \n again "), vec!["hello", "world", "again"]);
        assert!(tokenize("   ").is_empty());
    }

    #[test]
    fn spread_fills_duration_without_overlap() {
        let timings = spread_timings(4, 10.0);
        assert_eq!(timings.len(), 4);
        assert!(is_non_overlapping(&timings));
        assert!(timings[0].start > 0.0);
        assert!(timings[3].end < 10.0);
        assert!(spread_timings(0, 10.0).is_empty());
        assert!(spread_timings(3, 0.0).is_empty());
    }
}
