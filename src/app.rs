use crate::audio::controller::{PlayerController, PlayerState};
use crate::audio::player::RodioEngine;
use crate::audio::progress::{ProgressEvent, ProgressPoller};
use crate::config::Settings;
use crate::error::AppError;
use crate::track::Track;
use crate::utils::exporter;
use crate::utils::file_scanner::AudioFileScanner;
use crate::utils::metadata::format_time;
use eframe::egui::{
    self, Align, Button, CentralPanel, Context, Layout, RichText, ScrollArea, Slider, TextEdit,
    TopBottomPanel,
};
use eframe::Frame;
use rfd::{FileDialog, MessageButtons, MessageDialog, MessageLevel};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Receiver;
use tracing::error;

const ACCENT_COLOR: egui::Color32 = egui::Color32::from_rgb(0x03, 0x45, 0xfc);

/// Everything the view can ask for. Collected while drawing and applied
/// afterwards, so rendering never holds a borrow on the controller.
enum Action {
    Select(Track),
    Toggle(Track),
    Export(Track),
    Seek(f32),
    SetVolume(f32),
    Stop,
    Browse,
    LoadDirectory,
}

enum Notice {
    Error(AppError),
    Info(String),
}

pub struct AudioBrowserApp {
    directory: String,
    download_dir: PathBuf,
    tracks: Vec<Track>,
    player: PlayerController<RodioEngine>,
    progress_rx: Receiver<ProgressEvent>,
    seek_value: f32,
    seek_grabbed: bool,
    volume_value: f32,
    pending_notice: Option<Notice>,
}

impl eframe::App for AudioBrowserApp {
    fn update(&mut self, ctx: &Context, _frame: &mut Frame) {
        for event in self.progress_rx.try_iter() {
            self.player.handle_progress(event);
        }
        if !self.seek_grabbed {
            self.seek_value = self.player.progress();
        }

        if let Some(notice) = self.pending_notice.take() {
            show_notice(notice);
        }

        let mut actions = Vec::new();
        self.render_directory_bar(ctx, &mut actions);
        self.render_controls(ctx, &mut actions);
        self.render_track_list(ctx, &mut actions);

        for action in actions {
            if let Err(err) = self.dispatch(action) {
                error!(%err, "action failed");
                self.pending_notice = Some(Notice::Error(err));
            }
        }

        if self.pending_notice.is_some() {
            ctx.request_repaint();
        }
    }
}

impl AudioBrowserApp {
    pub fn new(cc: &eframe::CreationContext<'_>, engine: RodioEngine, settings: Settings) -> Self {
        let player = PlayerController::new(engine, settings.volume);

        let volume_value = player.volume() * 100.0;
        let repaint = cc.egui_ctx.clone();
        let (_poller, progress_rx) = ProgressPoller::spawn(
            player.transport(),
            player.probe(),
            settings.poll_interval(),
            move || repaint.request_repaint(),
        );

        let mut app = Self {
            directory: settings.audio_dir.display().to_string(),
            download_dir: settings.download_dir,
            tracks: Vec::new(),
            player,
            progress_rx,
            seek_value: 0.0,
            seek_grabbed: false,
            volume_value,
            pending_notice: None,
        };

        if let Err(err) = app.load_directory() {
            app.pending_notice = Some(Notice::Error(err));
        }
        app
    }

    fn render_directory_bar(&mut self, ctx: &Context, actions: &mut Vec<Action>) {
        TopBottomPanel::top("directory_bar").show(ctx, |ui| {
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                ui.label("Directory:");
                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    if ui.button("Browse").clicked() {
                        actions.push(Action::Browse);
                    }

                    let response = ui.add(
                        TextEdit::singleline(&mut self.directory).desired_width(f32::INFINITY),
                    );
                    if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                        actions.push(Action::LoadDirectory);
                    }
                });
            });
            ui.add_space(6.0);
        });
    }

    fn render_track_list(&self, ctx: &Context, actions: &mut Vec<Action>) {
        CentralPanel::default().show(ctx, |ui| {
            if self.tracks.is_empty() {
                ui.centered_and_justified(|ui| {
                    ui.label("No audio files");
                });
                return;
            }

            ScrollArea::vertical().auto_shrink(false).show(ui, |ui| {
                for track in &self.tracks {
                    let is_current = self.player.is_current(track);
                    let icon = if is_current && self.player.is_playing() {
                        "⏸"
                    } else {
                        "▶"
                    };

                    ui.horizontal(|ui| {
                        if ui.button(icon).clicked() {
                            actions.push(Action::Toggle(track.clone()));
                        }

                        let label = if is_current {
                            RichText::new(&track.name).color(ACCENT_COLOR).strong()
                        } else {
                            RichText::new(&track.name)
                        };
                        if ui.selectable_label(is_current, label).clicked() {
                            actions.push(Action::Select(track.clone()));
                        }

                        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                            if ui.button("⭳").on_hover_text("Download").clicked() {
                                actions.push(Action::Export(track.clone()));
                            }
                        });
                    });
                }
            });
        });
    }

    fn render_controls(&mut self, ctx: &Context, actions: &mut Vec<Action>) {
        TopBottomPanel::bottom("controls").show(ctx, |ui| {
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                let loaded = self.player.state() != PlayerState::Idle;
                if ui.add_enabled(loaded, Button::new("⏹ Stop")).clicked() {
                    actions.push(Action::Stop);
                }
                ui.label(self.player.status_line());
            });

            ui.spacing_mut().slider_width = ui.available_width();
            let response = ui.add(Slider::new(&mut self.seek_value, 0.0..=100.0).show_value(false));
            if response.drag_stopped() || response.clicked() {
                actions.push(Action::Seek(self.seek_value));
            }
            self.seek_grabbed = response.is_pointer_button_down_on() || response.dragged();

            ui.horizontal(|ui| {
                ui.label(format_time(self.player.position().as_secs()));
                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    ui.label(format_time(self.player.duration().as_secs()));
                });
            });

            ui.horizontal(|ui| {
                ui.label("🔈");
                ui.spacing_mut().slider_width = ui.available_width() - 30.0;
                let volume =
                    ui.add(Slider::new(&mut self.volume_value, 0.0..=100.0).show_value(false));
                if volume.changed() {
                    actions.push(Action::SetVolume(self.volume_value));
                }
                ui.label("🔊");
            });
            ui.add_space(6.0);
        });
    }

    fn dispatch(&mut self, action: Action) -> Result<(), AppError> {
        match action {
            Action::Select(track) => self.player.select(&track)?,
            Action::Toggle(track) => self.player.toggle(&track)?,
            Action::Seek(percent) => {
                self.player.seek(percent)?;
                self.seek_value = self.player.progress();
            }
            Action::SetVolume(level) => self.player.set_volume(level),
            Action::Stop => self.player.stop(),
            Action::Export(track) => {
                exporter::export_file(track.path(), &self.download_dir)?;
                self.pending_notice = Some(Notice::Info(format!(
                    "File downloaded to: {}",
                    self.download_dir.display()
                )));
            }
            Action::Browse => {
                let picked = FileDialog::new()
                    .set_directory(&self.directory)
                    .pick_folder();
                if let Some(dir) = picked {
                    self.directory = dir.display().to_string();
                    self.load_directory()?;
                }
            }
            Action::LoadDirectory => self.load_directory()?,
        }

        Ok(())
    }

    fn load_directory(&mut self) -> Result<(), AppError> {
        self.tracks.clear();
        self.tracks = AudioFileScanner::scan_directory(Path::new(&self.directory))?;
        Ok(())
    }
}

fn show_notice(notice: Notice) {
    let (level, title, text) = match notice {
        Notice::Error(err) => (MessageLevel::Error, "Error", err.to_string()),
        Notice::Info(text) => (MessageLevel::Info, "Success", text),
    };

    let _ = MessageDialog::new()
        .set_level(level)
        .set_title(title)
        .set_description(text)
        .set_buttons(MessageButtons::Ok)
        .show();
}
