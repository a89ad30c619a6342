use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::schema::CATEGORIES;
use crate::state::{AppState, StatusMessage};

// ---------------------------------------------------------------------------
// Left side panel – search form
// ---------------------------------------------------------------------------

/// Render the category, coordinate and attribute controls plus the actions.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Search");
    ui.separator();

    ui.horizontal(|ui: &mut Ui| {
        for category in CATEGORIES {
            let selected = state.category == category;
            if ui.radio(selected, category.name).clicked() {
                state.set_category(category);
            }
        }
    });
    ui.add_space(6.0);

    egui::Grid::new("coordinates")
        .num_columns(2)
        .spacing([8.0, 4.0])
        .show(ui, |ui: &mut Ui| {
            ui.label("Latitude");
            ui.add(egui::TextEdit::singleline(&mut state.latitude).hint_text("required"));
            ui.end_row();

            ui.label("Longitude");
            ui.add(egui::TextEdit::singleline(&mut state.longitude).hint_text("required"));
            ui.end_row();
        });
    ui.separator();

    ScrollArea::vertical()
        .max_height(ui.available_height() - 60.0)
        .auto_shrink([false, true])
        .show(ui, |ui: &mut Ui| {
            egui::Grid::new(("attributes", state.category.name))
                .num_columns(2)
                .spacing([8.0, 4.0])
                .show(ui, |ui: &mut Ui| {
                    for attr in state.category.attributes {
                        attribute_combo(ui, state, attr);
                        ui.end_row();
                    }
                });
        });
    ui.separator();

    ui.horizontal(|ui: &mut Ui| {
        if ui.button("Search").clicked() {
            state.run_search();
        }
        let can_export = state.results.as_ref().is_some_and(|t| !t.is_empty());
        if ui
            .add_enabled(can_export, egui::Button::new("Export to CSV"))
            .clicked()
        {
            state.run_export();
        }
    });
}

fn attribute_combo(ui: &mut Ui, state: &mut AppState, attr: &str) {
    ui.label(attr);

    let current = state.selection.get(attr).label().to_string();
    let mut chosen = current.clone();
    egui::ComboBox::from_id_salt(("attr", state.category.name, attr))
        .selected_text(&current)
        .width(160.0)
        .show_ui(ui, |ui: &mut Ui| {
            for option in state.options(attr) {
                ui.selectable_value(&mut chosen, option.clone(), option);
            }
        });

    if chosen != current {
        state.choose(attr, &chosen);
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open data folder…").clicked() {
                open_folder_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();
        ui.label(format!("Data: {}", state.paths.base_dir.display()));

        if let Some(table) = &state.results {
            ui.separator();
            ui.label(format!("{} rows", table.len()));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            let text = match msg {
                StatusMessage::Info(s) => RichText::new(s),
                StatusMessage::Warning(s) => RichText::new(s).color(Color32::YELLOW),
                StatusMessage::Error(s) => RichText::new(s).color(Color32::RED),
            };
            ui.label(text);
        }
    });
}

// ---------------------------------------------------------------------------
// Folder dialog
// ---------------------------------------------------------------------------

pub fn open_folder_dialog(state: &mut AppState) {
    let folder = rfd::FileDialog::new()
        .set_title("Open folder containing Coastal/ and Riverine/")
        .set_directory(&state.paths.base_dir)
        .pick_folder();

    if let Some(dir) = folder {
        match state.open_base_dir(dir) {
            Ok(()) => {
                log::info!("Switched data folder to {}", state.paths.base_dir.display());
                state.status_message = None;
            }
            Err(e) => {
                log::error!("Failed to open data folder: {e:#}");
                state.status_message = Some(StatusMessage::Error(format!("Error: {e}")));
            }
        }
    }
}
