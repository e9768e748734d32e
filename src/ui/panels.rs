use std::collections::BTreeSet;

use eframe::egui::{self, Color32, DragValue, RichText, ScrollArea, TextEdit, Ui};
use egui_extras::DatePickerButton;

use crate::data::loader::Encoding;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(state.source_path.is_some(), egui::Button::new("Reload"))
                .clicked()
            {
                state.reload();
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label("Encoding");
        let previous = state.encoding;
        egui::ComboBox::from_id_salt("encoding")
            .selected_text(state.encoding.to_string())
            .show_ui(ui, |ui: &mut Ui| {
                for enc in Encoding::ALL {
                    ui.selectable_value(&mut state.encoding, enc, enc.to_string());
                }
            });
        if state.encoding != previous {
            // Encoding is part of the cache key, so this re-reads the file.
            state.reload();
        }

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} invoices loaded, {} in view",
                ds.len(),
                state.visible_indices.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the filter panel over the five predicate dimensions.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let Some(dataset) = state.dataset.clone() else {
        ui.label("No dataset loaded.");
        return;
    };

    let mut range_changed = false;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            if let Some(pred) = &mut state.predicate {
                // ---- Date range ----
                ui.strong("Date range");
                ui.horizontal(|ui: &mut Ui| {
                    ui.label("From");
                    if ui
                        .add(DatePickerButton::new(&mut pred.date_from).id_salt("date_from"))
                        .changed()
                    {
                        range_changed = true;
                    }
                });
                ui.horizontal(|ui: &mut Ui| {
                    ui.label("To");
                    if ui
                        .add(DatePickerButton::new(&mut pred.date_to).id_salt("date_to"))
                        .changed()
                    {
                        range_changed = true;
                    }
                });
                ui.separator();

                // ---- Amount range ----
                ui.strong("Amount range (€)");
                ui.horizontal(|ui: &mut Ui| {
                    ui.label("Min");
                    if ui
                        .add(DragValue::new(&mut pred.amount_min).speed(10.0).suffix(" €"))
                        .changed()
                    {
                        range_changed = true;
                    }
                });
                ui.horizontal(|ui: &mut Ui| {
                    ui.label("Max");
                    if ui
                        .add(DragValue::new(&mut pred.amount_max).speed(10.0).suffix(" €"))
                        .changed()
                    {
                        range_changed = true;
                    }
                });
                ui.separator();
            }

            // ---- Account / supplier selections ----
            let selected_accounts = state
                .predicate
                .as_ref()
                .map(|p| p.accounts.clone())
                .unwrap_or_default();
            let selected_suppliers = state
                .predicate
                .as_ref()
                .map(|p| p.suppliers.clone())
                .unwrap_or_default();

            let mut account_search = std::mem::take(&mut state.account_search);
            value_filter(
                ui,
                state,
                "Accounts",
                &dataset.accounts,
                &selected_accounts,
                &mut account_search,
                |state, value| state.toggle_account(value),
                |state| {
                    if let Some(pred) = &mut state.predicate {
                        pred.accounts.clear();
                    }
                    state.refilter();
                },
            );
            state.account_search = account_search;

            let mut supplier_search = std::mem::take(&mut state.supplier_search);
            value_filter(
                ui,
                state,
                "Suppliers",
                &dataset.suppliers,
                &selected_suppliers,
                &mut supplier_search,
                |state, value| state.toggle_supplier(value),
                |state| {
                    if let Some(pred) = &mut state.predicate {
                        pred.suppliers.clear();
                    }
                    state.refilter();
                },
            );
            state.supplier_search = supplier_search;

            ui.separator();
            if ui.button("Reset filters").clicked() {
                state.reset_filters();
            }
        });

    if range_changed {
        state.refilter();
    }
}

/// A collapsible checkbox list over one selection dimension. An empty
/// selection means "no restriction", so the header says "all" rather than
/// offering a select-all button.
#[allow(clippy::too_many_arguments)]
fn value_filter(
    ui: &mut Ui,
    state: &mut AppState,
    title: &str,
    all_values: &BTreeSet<String>,
    selected: &BTreeSet<String>,
    search: &mut String,
    toggle: impl Fn(&mut AppState, &str),
    clear: impl Fn(&mut AppState),
) {
    let header = if selected.is_empty() {
        format!("{title}  (all)")
    } else {
        format!("{title}  ({}/{})", selected.len(), all_values.len())
    };

    egui::CollapsingHeader::new(RichText::new(header).strong())
        .id_salt(title)
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                ui.add(
                    TextEdit::singleline(search)
                        .hint_text("narrow down…")
                        .desired_width(120.0),
                );
                if ui.small_button("Clear").clicked() {
                    clear(state);
                }
            });

            let needle = search.to_lowercase();
            ScrollArea::vertical()
                .id_salt(format!("{title}_values"))
                .max_height(220.0)
                .show(ui, |ui: &mut Ui| {
                    for value in all_values {
                        if !needle.is_empty() && !value.to_lowercase().contains(&needle) {
                            continue;
                        }
                        let mut checked = selected.contains(value);
                        if ui.checkbox(&mut checked, value).changed() {
                            toggle(state, value);
                        }
                    }
                });
        });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open procurement invoice data")
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        state.open_file(path);
    }
}
