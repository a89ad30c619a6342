use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Result table (central panel)
// ---------------------------------------------------------------------------

const ROW_HEIGHT: f32 = 18.0;

/// Render the last search result as a scrollable table.
pub fn result_table(ui: &mut Ui, state: &AppState) {
    let table = match &state.results {
        Some(t) if !t.is_empty() => t,
        _ => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Enter coordinates and press Search");
            });
            return;
        }
    };

    egui::ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .columns(Column::initial(100.0).at_least(40.0).clip(true), table.columns.len())
            .header(20.0, |mut header| {
                for name in &table.columns {
                    header.col(|ui: &mut Ui| {
                        ui.strong(name);
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, table.len(), |mut row| {
                    let cells = &table.rows[row.index()];
                    for cell in cells {
                        row.col(|ui: &mut Ui| {
                            ui.label(cell.to_string());
                        });
                    }
                });
            });
    });
}
