use crate::app::ConvertextApp;
use crate::constants::{APP_NAME, APP_VERSION, PROGRESS_POLL_INTERVAL_MS};
use crate::files::display_name;
use eframe::egui;
use std::path::PathBuf;
use std::time::Duration;

const GOLD: egui::Color32 = egui::Color32::from_rgb(255, 215, 0);

impl eframe::App for ConvertextApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_progress();
        self.handle_shortcuts(ctx);
        self.handle_dropped_files(ctx);

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            self.show_menu(ui, ctx);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                if let Some(error) = self.startup_error.clone() {
                    self.show_startup_error(ui, &error);
                }

                ui.add_space(8.0);
                self.show_drop_zone(ui);
                ui.add_space(8.0);
                self.show_file_list(ui);
                ui.add_space(8.0);
                self.show_format_section(ui);
                ui.add_space(8.0);
                self.show_output_section(ui);
                ui.add_space(12.0);
                self.show_convert_button(ui);
                ui.add_space(12.0);
                self.show_progress_section(ui);
            });
        });

        self.show_error_dialog(ctx);
        self.show_completion_dialog(ctx);
        self.show_about_window(ctx);
        self.show_debug_console(ctx);

        // Keep draining the progress channel while a run is in flight.
        if self.is_converting {
            ctx.request_repaint_after(Duration::from_millis(PROGRESS_POLL_INTERVAL_MS));
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.config.save();
        tracing::info!("application shutting down");
    }
}

impl ConvertextApp {
    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        use egui::{Key, Modifiers};

        if ctx.input_mut(|i| i.consume_key(Modifiers::COMMAND, Key::O)) {
            self.select_files();
        }
        if ctx.input_mut(|i| i.consume_key(Modifiers::COMMAND, Key::Enter)) {
            self.start_conversion();
        }
        if ctx.input_mut(|i| i.consume_key(Modifiers::COMMAND, Key::D)) {
            self.debug_mode = !self.debug_mode;
            self.apply_debug_mode();
        }
        if ctx.input_mut(|i| i.consume_key(Modifiers::COMMAND, Key::Q))
            || ctx.input_mut(|i| i.consume_key(Modifiers::NONE, Key::Escape))
        {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        self.hovering_files = ctx.input(|i| !i.raw.hovered_files.is_empty());

        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        if !dropped.is_empty() {
            let paths: Vec<PathBuf> = dropped.into_iter().filter_map(|f| f.path).collect();
            if !paths.is_empty() {
                tracing::debug!("{} file(s) dropped", paths.len());
                self.add_files(paths);
            }
        }
    }

    fn show_menu(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        egui::menu::bar(ui, |ui| {
            ui.menu_button("File", |ui| {
                if ui.button("Open Files...").clicked() {
                    ui.close_menu();
                    self.select_files();
                }
                ui.separator();
                if ui.button("Quit").clicked() {
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });

            ui.menu_button("View", |ui| {
                if ui.checkbox(&mut self.debug_mode, "Debug Console").changed() {
                    ui.close_menu();
                    self.apply_debug_mode();
                }
            });

            ui.menu_button("Help", |ui| {
                if ui.button("About").clicked() {
                    ui.close_menu();
                    self.show_about = true;
                }
                if ui.button("View Logs").clicked() {
                    ui.close_menu();
                    self.open_log_dir();
                }
            });
        });
    }

    fn show_startup_error(&mut self, ui: &mut egui::Ui, error: &str) {
        egui::Frame::none()
            .fill(egui::Color32::from_rgba_premultiplied(120, 30, 30, 60))
            .rounding(6.0)
            .inner_margin(10.0)
            .show(ui, |ui| {
                ui.label(
                    egui::RichText::new(format!("Startup error: {}", error))
                        .color(egui::Color32::LIGHT_RED),
                );
            });
    }

    fn show_drop_zone(&mut self, ui: &mut egui::Ui) {
        let desired = egui::vec2(ui.available_width(), 120.0);
        let (rect, response) = ui.allocate_exact_size(desired, egui::Sense::click());

        let (fill, text) = if self.hovering_files {
            (
                egui::Color32::from_rgba_premultiplied(60, 55, 10, 80),
                "Release to add files",
            )
        } else {
            (
                egui::Color32::from_gray(30),
                "📁 Drag & Drop Files Here\n\nor click to browse...",
            )
        };

        ui.painter()
            .rect(rect, egui::Rounding::same(8.0), fill, egui::Stroke::new(1.0, GOLD));
        ui.painter().text(
            rect.center(),
            egui::Align2::CENTER_CENTER,
            text,
            egui::FontId::proportional(15.0),
            GOLD,
        );

        if response.clicked() {
            self.select_files();
        }
    }

    fn show_file_list(&mut self, ui: &mut egui::Ui) {
        let mut clear_clicked = false;
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new("Selected Files:").strong());
            if !self.files.is_empty() {
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.small_button("Clear All").clicked() {
                        clear_clicked = true;
                    }
                });
            }
        });

        let mut to_remove: Option<PathBuf> = None;
        egui::ScrollArea::vertical()
            .id_source("file_list")
            .max_height(150.0)
            .auto_shrink([false, true])
            .show(ui, |ui| {
                for path in self.files.iter() {
                    ui.horizontal(|ui| {
                        ui.label(format!("📄 {}", display_name(path)));
                        ui.with_layout(
                            egui::Layout::right_to_left(egui::Align::Center),
                            |ui| {
                                if ui.small_button("✕").clicked() {
                                    to_remove = Some(path.clone());
                                }
                            },
                        );
                    });
                }
            });

        if clear_clicked {
            self.clear_files();
        }
        if let Some(path) = to_remove {
            self.remove_file(&path);
        }
    }

    fn show_format_section(&mut self, ui: &mut egui::Ui) {
        ui.group(|ui| {
            ui.label(egui::RichText::new("Output Formats").strong());
            ui.add_space(4.0);

            if self.formats.is_empty() {
                ui.label(egui::RichText::new("No output formats available").weak());
                return;
            }

            egui::Grid::new("format_checkboxes")
                .num_columns(3)
                .spacing([24.0, 6.0])
                .show(ui, |ui| {
                    for (i, (name, checked)) in self.formats.iter_mut().enumerate() {
                        ui.checkbox(checked, name.to_uppercase());
                        if i % 3 == 2 {
                            ui.end_row();
                        }
                    }
                });
        });
    }

    fn show_output_section(&mut self, ui: &mut egui::Ui) {
        ui.label(egui::RichText::new("Output Directory:").strong());

        let mut browse_clicked = false;
        ui.horizontal(|ui| {
            let width = (ui.available_width() - 110.0).max(120.0);
            ui.add_sized(
                [width, 24.0],
                egui::TextEdit::singleline(&mut self.output_dir_text)
                    .hint_text("Same directory as each source file"),
            );
            if ui.button("Browse...").clicked() {
                browse_clicked = true;
            }
        });

        let mut flags_changed = false;
        if ui
            .checkbox(&mut self.overwrite, "Overwrite existing files")
            .changed()
        {
            flags_changed = true;
        }

        let mut debug_toggled = false;
        ui.horizontal(|ui| {
            if ui
                .checkbox(&mut self.debug_mode, "Debug mode (verbose output)")
                .changed()
            {
                debug_toggled = true;
            }
            if ui
                .checkbox(&mut self.keep_intermediate, "Keep intermediate files")
                .changed()
            {
                flags_changed = true;
            }
        });

        if browse_clicked {
            self.browse_output();
        }
        if debug_toggled {
            self.apply_debug_mode();
        }
        if flags_changed {
            self.persist_flags();
        }
    }

    fn show_convert_button(&mut self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            let label = if self.is_converting {
                "Converting..."
            } else {
                "Convert"
            };
            let button = egui::Button::new(egui::RichText::new(label).size(21.0).strong())
                .min_size(egui::vec2(220.0, 48.0));

            let enabled = !self.is_converting && self.startup_error.is_none();
            if ui.add_enabled(enabled, button).clicked() {
                self.start_conversion();
            }
        });
    }

    fn show_progress_section(&mut self, ui: &mut egui::Ui) {
        if let Some(line) = &self.result_line {
            let color = if line.success {
                GOLD
            } else {
                egui::Color32::WHITE
            };
            ui.label(egui::RichText::new(&line.text).color(color));
        }

        ui.add(
            egui::ProgressBar::new(self.progress / 100.0)
                .text(format!("{:.0}%", self.progress)),
        );

        if !self.status.is_empty() {
            ui.label(egui::RichText::new(&self.status).size(11.0));
        }
    }

    fn show_error_dialog(&mut self, ctx: &egui::Context) {
        let Some(dialog) = &self.error_dialog else {
            return;
        };

        let mut close = false;
        egui::Window::new(dialog.title.as_str())
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(dialog.message.as_str());
                ui.add_space(8.0);
                ui.vertical_centered(|ui| {
                    if ui.button("OK").clicked() {
                        close = true;
                    }
                });
            });

        if close {
            self.error_dialog = None;
        }
    }

    fn show_completion_dialog(&mut self, ctx: &egui::Context) {
        let Some(completion) = &self.completion else {
            return;
        };

        let message = if completion.successes == completion.total {
            format!(
                "Successfully converted {} file(s)!\n\nOpen output folder?",
                completion.files_converted
            )
        } else {
            format!(
                "Finished with {} of {} conversions successful.\n\nOpen output folder?",
                completion.successes, completion.total
            )
        };

        let mut open_clicked = false;
        let mut close = false;
        egui::Window::new("Conversion Complete")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(message);
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui.button("Yes").clicked() {
                        open_clicked = true;
                        close = true;
                    }
                    if ui.button("No").clicked() {
                        close = true;
                    }
                });
            });

        if open_clicked {
            self.open_completion_folder();
        }
        if close {
            self.completion = None;
        }
    }

    fn show_about_window(&mut self, ctx: &egui::Context) {
        if !self.show_about {
            return;
        }

        let mut open = self.show_about;
        egui::Window::new(format!("About {}", APP_NAME))
            .collapsible(false)
            .resizable(false)
            .open(&mut open)
            .show(ctx, |ui| {
                ui.label(format!("{} v{}", APP_NAME, APP_VERSION));
                ui.add_space(4.0);
                ui.label("Universal document converter");
                ui.add_space(8.0);
                ui.label(format!("Debug mode: {}", self.debug_mode));
                ui.label(format!("Logs: {}", self.log_dir.display()));
                ui.add_space(4.0);
                ui.label("License: MIT");
            });
        self.show_about = open;
    }

    fn show_debug_console(&mut self, ctx: &egui::Context) {
        if !self.show_debug_console {
            return;
        }

        let mut open = self.show_debug_console;
        egui::Window::new("Debug Console")
            .default_size([700.0, 350.0])
            .open(&mut open)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    if ui.button("Clear").clicked() {
                        self.log_buffer.clear();
                    }
                });
                ui.separator();
                egui::ScrollArea::vertical()
                    .stick_to_bottom(true)
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        for line in self.log_buffer.lines() {
                            ui.monospace(line);
                        }
                    });
            });

        if !open {
            self.show_debug_console = false;
            self.debug_mode = false;
        }
    }
}
