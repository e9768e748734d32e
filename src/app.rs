use eframe::egui::{self, ScrollArea};

use crate::state::AppState;
use crate::ui::{charts, panels, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct LaskuLensApp {
    pub state: AppState,
}

impl eframe::App for LaskuLensApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: metrics, charts, console, raw data ----
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.state.dataset.is_none() {
                ui.centered_and_justified(|ui| {
                    ui.heading("Open an invoice CSV to explore it  (File → Open…)");
                });
                return;
            }

            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    if let Some(derived) = &self.state.derived {
                        table::metrics_grid(ui, &derived.metrics);
                        ui.separator();

                        charts::top_suppliers_chart(ui, &derived.top_suppliers);
                        ui.separator();
                        charts::monthly_totals_chart(ui, &derived.monthly);
                        ui.separator();
                        charts::account_shares_chart(ui, &derived.shares);
                        ui.separator();
                        charts::amount_histogram_chart(ui, &derived.histogram);
                        ui.separator();
                    }

                    table::sql_console(ui, &mut self.state);
                    ui.separator();
                    table::raw_viewer(ui, &mut self.state);
                });
        });
    }
}
