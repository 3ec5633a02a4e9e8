use std::path::PathBuf;

use egui::Color32;

use crate::app::{CreativeEditorApp, export_status};
use crate::command::Command;
use crate::components::SwatchButton;
use crate::export::ExportMode;
use crate::layer::{LayerId, TextId};
use crate::session::{EditorSession, ImageSource, SuggestionState};

pub fn controls_panel(app: &mut CreativeEditorApp, ctx: &egui::Context) {
    egui::SidePanel::right("controls_panel")
        .resizable(true)
        .default_width(280.0)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.heading("Creative");
                app.show_status(ui);

                let Some(session) = app.session.as_mut() else {
                    ui.label("No open session.");
                    return;
                };

                selection_controls(ui, session);
                ui.separator();

                ui.strong("Product image");
                ui.horizontal(|ui| {
                    ui.text_edit_singleline(&mut app.image_path_input);
                    if ui.button("Load").clicked() {
                        let path = app.image_path_input.trim();
                        let source = (!path.is_empty()).then(|| ImageSource::Path(PathBuf::from(path)));
                        session.set_image_source(source);
                    }
                });
                if session.image_pending() {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label("Loading image...");
                    });
                } else if session.image_source().is_some() && session.bitmap().is_none() {
                    ui.colored_label(Color32::YELLOW, "Image unavailable, layer left empty");
                }
                ui.separator();

                text_controls(ui, session, TextId::Tagline);
                ui.separator();
                text_controls(ui, session, TextId::Offer);
                ui.separator();

                background_controls(ui, session);
                ui.separator();

                let mut status = None;
                ui.horizontal(|ui| {
                    let idle = !session.export_pending();
                    if ui.add_enabled(idle, egui::Button::new("Download PNG")).clicked() {
                        status = start_export(session, ExportMode::Download);
                    }
                    if ui.add_enabled(idle, egui::Button::new("Copy data URL")).clicked() {
                        status = start_export(session, ExportMode::Embed);
                    }
                    if !idle {
                        ui.spinner();
                    }
                });
                ui.horizontal(|ui| {
                    if ui.button("Reset").clicked() {
                        session.apply(Command::Reset);
                    }
                    if ui.button("Close").clicked() {
                        session.close();
                    }
                });
                ui.separator();

                suggestion_view(ui, session.suggestions());

                if session.is_closed() {
                    app.session = None;
                    app.textures.invalidate();
                }
                if let Some((text, is_error)) = status {
                    app.set_status(text, is_error);
                }
            });
        });
}

fn selection_controls(ui: &mut egui::Ui, session: &mut EditorSession) {
    ui.horizontal(|ui| {
        ui.label("Selected:");
        for id in LayerId::Z_ORDER {
            if ui
                .selectable_label(session.selection().is_selected(id), id.label())
                .clicked()
            {
                session.apply(Command::Select(id));
            }
        }
        if ui
            .selectable_label(session.selection().active().is_none(), "None")
            .clicked()
        {
            session.apply(Command::Deselect);
        }
    });
}

fn text_controls(ui: &mut egui::Ui, session: &mut EditorSession, target: TextId) {
    let layer = session.model().text(target).clone();
    let mut commands = Vec::new();

    ui.strong(LayerId::from(target).label());

    let mut content = layer.content.clone();
    if ui.text_edit_multiline(&mut content).changed() {
        commands.push(Command::SetText { target, content });
    }

    let mut size = layer.font_size;
    if ui
        .add(egui::Slider::new(&mut size, target.font_size_range()).text("Font size"))
        .changed()
    {
        commands.push(Command::SetFontSize { target, size });
    }

    ui.horizontal(|ui| {
        ui.label("Fill");
        let mut fill = opaque(layer.fill);
        if ui.color_edit_button_srgb(&mut fill).changed() {
            commands.push(Command::SetFill {
                target,
                color: Color32::from_rgb(fill[0], fill[1], fill[2]),
            });
        }

        let mut has_badge = layer.badge.is_some();
        if ui.checkbox(&mut has_badge, "Badge").changed() {
            let color = has_badge.then_some(layer.badge.unwrap_or(Color32::from_rgb(0xff, 0x3b, 0x30)));
            commands.push(Command::SetBadge { target, color });
        }
        if let Some(badge) = layer.badge {
            let mut badge = opaque(badge);
            if ui.color_edit_button_srgb(&mut badge).changed() {
                commands.push(Command::SetBadge {
                    target,
                    color: Some(Color32::from_rgb(badge[0], badge[1], badge[2])),
                });
            }
        }
    });

    for command in commands {
        session.apply(command);
    }
}

fn background_controls(ui: &mut egui::Ui, session: &mut EditorSession) {
    ui.strong("Background");
    let background = session.model().background();
    let mut chosen = None;
    ui.horizontal_wrapped(|ui| {
        for &swatch in session.palette().swatches() {
            if SwatchButton::new(swatch, swatch == background).show(ui).clicked() {
                chosen = Some(swatch);
            }
        }
        let mut custom = opaque(background);
        if ui.color_edit_button_srgb(&mut custom).changed() {
            chosen = Some(Color32::from_rgb(custom[0], custom[1], custom[2]));
        }
    });
    if let Some(color) = chosen {
        session.apply(Command::SetBackground(color));
    }
}

fn suggestion_view(ui: &mut egui::Ui, state: &SuggestionState) {
    ui.strong("Layout suggestions");
    if *state == SuggestionState::Pending {
        ui.horizontal(|ui| {
            ui.spinner();
            ui.label("Waiting for the suggestion service...");
        });
    } else if let Some(text) = state.panel_json() {
        ui.add(
            egui::TextEdit::multiline(&mut text.as_str())
                .code_editor()
                .desired_width(f32::INFINITY),
        );
    } else {
        ui.weak("Drop an image onto the window to request suggestions.");
    }
}
/// Only refusals produce a status here; finished exports are reported by the app.
fn start_export(session: &mut EditorSession, mode: ExportMode) -> Option<(String, bool)> {
    match session.export(mode) {
        Ok(_) => None,
        Err(err) => Some(export_status(Err(err))),
    }
}

fn opaque(color: Color32) -> [u8; 3] {
    let [r, g, b, _] = color.to_srgba_unmultiplied();
    [r, g, b]
}
