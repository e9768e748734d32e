use eframe::egui::{self, Color32, RichText, TextEdit, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::aggregate::{AggregateError, SummaryMetrics};
use crate::query::EXAMPLE_QUERIES;
use crate::state::{AppState, ROWS_PER_PAGE_OPTIONS};

// ---------------------------------------------------------------------------
// Summary metrics
// ---------------------------------------------------------------------------

/// Six key figures over the filtered view.
pub fn metrics_grid(ui: &mut Ui, metrics: &Result<SummaryMetrics, AggregateError>) {
    ui.heading("Key figures");
    let m = match metrics {
        Ok(m) => m,
        Err(e) => {
            ui.label(RichText::new(e.to_string()).color(Color32::YELLOW));
            return;
        }
    };

    egui::Grid::new("metrics_grid")
        .num_columns(3)
        .spacing([32.0, 8.0])
        .show(ui, |ui: &mut Ui| {
            metric(ui, "Invoices", format!("{}", m.count));
            metric(ui, "Total spend", format!("{:.2} €", m.sum));
            metric(ui, "Distinct suppliers", format!("{}", m.distinct_suppliers));
            ui.end_row();

            metric(ui, "Average invoice", format!("{:.2} €", m.mean));
            metric(ui, "Largest invoice", format!("{:.2} €", m.max));
            metric(ui, "Smallest invoice", format!("{:.2} €", m.min));
            ui.end_row();
        });
}

fn metric(ui: &mut Ui, label: &str, value: String) {
    ui.vertical(|ui: &mut Ui| {
        ui.label(RichText::new(label).small());
        ui.label(RichText::new(value).strong().size(18.0));
    });
}

// ---------------------------------------------------------------------------
// SQL console
// ---------------------------------------------------------------------------

/// Free-form SQL over the `invoices` and `filtered` tables.
pub fn sql_console(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Run SQL queries");
    ui.label("Tables: `filtered` (current view) and `invoices` (full dataset).");

    ui.horizontal_wrapped(|ui: &mut Ui| {
        for (description, sql) in EXAMPLE_QUERIES {
            if ui.small_button(*description).clicked() {
                state.sql_input = (*sql).to_string();
                state.run_sql();
            }
        }
    });

    ui.add(
        TextEdit::multiline(&mut state.sql_input)
            .hint_text("SELECT * FROM filtered LIMIT 10")
            .desired_rows(3)
            .desired_width(f32::INFINITY),
    );
    if ui.button("Run").clicked() {
        state.run_sql();
    }

    match &state.sql_result {
        None => {}
        Some(Err(msg)) => {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
        Some(Ok(result)) => {
            if result.truncated {
                ui.label(RichText::new("Result truncated for display.").color(Color32::YELLOW));
            }
            if result.rows.is_empty() {
                ui.label("Query returned no rows.");
                return;
            }
            ui.push_id("sql_result", |ui: &mut Ui| {
                let mut table = TableBuilder::new(ui).striped(true);
                for _ in &result.columns {
                    table = table.column(Column::auto().resizable(true));
                }
                table
                    .header(20.0, |mut header| {
                        for col in &result.columns {
                            header.col(|ui| {
                                ui.strong(col);
                            });
                        }
                    })
                    .body(|mut body| {
                        for row in &result.rows {
                            body.row(18.0, |mut out| {
                                for cell in row {
                                    out.col(|ui| {
                                        ui.label(cell);
                                    });
                                }
                            });
                        }
                    });
            });
        }
    }
}

// ---------------------------------------------------------------------------
// Raw-data viewer
// ---------------------------------------------------------------------------

/// Paginated view of the filtered rows.
pub fn raw_viewer(ui: &mut Ui, state: &mut AppState) {
    ui.checkbox(&mut state.show_raw, "Show raw data");
    if !state.show_raw {
        return;
    }
    let Some(dataset) = state.dataset.clone() else {
        return;
    };

    ui.horizontal(|ui: &mut Ui| {
        ui.label("Rows per page");
        egui::ComboBox::from_id_salt("rows_per_page")
            .selected_text(state.rows_per_page.to_string())
            .show_ui(ui, |ui: &mut Ui| {
                for n in ROWS_PER_PAGE_OPTIONS {
                    if ui
                        .selectable_value(&mut state.rows_per_page, n, n.to_string())
                        .changed()
                    {
                        state.page = 1;
                    }
                }
            });

        let total_pages = state.total_pages();
        if ui.button("◀").clicked() && state.page > 1 {
            state.page -= 1;
        }
        ui.label(format!("Page {} / {}", state.page, total_pages));
        if ui.button("▶").clicked() && state.page < total_pages {
            state.page += 1;
        }
    });

    let total_rows = state.visible_indices.len();
    let start = (state.page - 1) * state.rows_per_page;
    let end = (start + state.rows_per_page).min(total_rows);
    if start >= total_rows {
        ui.label("No rows to show.");
        return;
    }
    ui.label(format!("Showing rows {}-{end} of {total_rows}", start + 1));

    ui.push_id("raw_table", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .column(Column::auto())
            .column(Column::auto())
            .column(Column::remainder())
            .column(Column::remainder())
            .column(Column::auto())
            .header(20.0, |mut header| {
                for title in ["Date", "Amount (€)", "Account", "Supplier", "Country"] {
                    header.col(|ui| {
                        ui.strong(title);
                    });
                }
            })
            .body(|mut body| {
                for &idx in &state.visible_indices[start..end] {
                    let inv = &dataset.invoices[idx];
                    body.row(18.0, |mut row| {
                        row.col(|ui| {
                            ui.label(inv.date.format("%d.%m.%Y").to_string());
                        });
                        row.col(|ui| {
                            ui.label(format!("{:.2}", inv.amount));
                        });
                        row.col(|ui| {
                            ui.label(&inv.account);
                        });
                        row.col(|ui| {
                            ui.label(&inv.supplier);
                        });
                        row.col(|ui| {
                            ui.label(inv.country.as_deref().unwrap_or(""));
                        });
                    });
                }
            });
    });
}
