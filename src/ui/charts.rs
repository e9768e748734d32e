use eframe::egui::{Color32, RichText, Ui};
use egui_plot::{Bar, BarChart, GridMark, Legend, Line, Plot, PlotPoints, Points};

use crate::color;
use crate::data::aggregate::{
    AccountShares, AggregateError, Histogram, MonthlyTotal, SupplierTotal,
};

const CHART_HEIGHT: f32 = 260.0;

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Render the notice shown in place of a chart.
fn aggregate_notice(ui: &mut Ui, err: AggregateError) {
    ui.label(RichText::new(err.to_string()).color(Color32::YELLOW));
}

fn warn(ui: &mut Ui, text: String) {
    ui.label(RichText::new(text).color(Color32::YELLOW));
}

// ---------------------------------------------------------------------------
// Top suppliers – horizontal bars
// ---------------------------------------------------------------------------

pub fn top_suppliers_chart(ui: &mut Ui, data: &Result<Vec<SupplierTotal>, AggregateError>) {
    ui.strong("Top suppliers by total spend");
    let rows = match data {
        Ok(rows) => rows,
        Err(e) => return aggregate_notice(ui, *e),
    };

    let palette = color::sequential_palette(rows.len());

    Plot::new("top_suppliers")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .x_axis_label("Total (€)")
        .show_y(false)
        .allow_boxed_zoom(false)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .show(ui, |plot_ui| {
            // Largest supplier on top; one chart per supplier so the legend
            // doubles as the axis labels.
            for (i, row) in rows.iter().enumerate() {
                let y = (rows.len() - 1 - i) as f64;
                let bar = Bar::new(y, row.total).width(0.7).fill(palette[i]);
                plot_ui.bar_chart(
                    BarChart::new(vec![bar])
                        .horizontal()
                        .name(&row.supplier)
                        .color(palette[i]),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Monthly totals – line with markers
// ---------------------------------------------------------------------------

pub fn monthly_totals_chart(ui: &mut Ui, data: &Result<Vec<MonthlyTotal>, AggregateError>) {
    ui.strong("Monthly spend");
    let months = match data {
        Ok(months) => months,
        Err(e) => return aggregate_notice(ui, *e),
    };

    let labels: Vec<String> = months.iter().map(MonthlyTotal::label).collect();
    let points: Vec<[f64; 2]> = months
        .iter()
        .enumerate()
        .map(|(i, m)| [i as f64, m.total])
        .collect();

    Plot::new("monthly_totals")
        .height(CHART_HEIGHT)
        .x_axis_label("Month")
        .y_axis_label("Total (€)")
        .x_axis_formatter(move |mark: GridMark, _range| {
            let i = mark.value.round();
            if (mark.value - i).abs() > 1e-6 || i < 0.0 {
                return String::new();
            }
            labels.get(i as usize).cloned().unwrap_or_default()
        })
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(PlotPoints::from(points.clone()))
                    .name("Monthly total")
                    .color(Color32::from_rgb(65, 105, 225))
                    .width(2.0),
            );
            plot_ui.points(
                Points::new(PlotPoints::from(points))
                    .radius(3.5)
                    .color(Color32::from_rgb(65, 105, 225)),
            );
        });
}

// ---------------------------------------------------------------------------
// Account shares – horizontal percentage bars
// ---------------------------------------------------------------------------

pub fn account_shares_chart(ui: &mut Ui, data: &Result<AccountShares, AggregateError>) {
    ui.strong("Top accounts by share of spend");
    let shares = match data {
        Ok(shares) => shares,
        Err(e) => return aggregate_notice(ui, *e),
    };

    if shares.dropped_non_positive > 0 {
        warn(
            ui,
            format!(
                "{} account(s) with non-positive totals were left out of the share view",
                shares.dropped_non_positive
            ),
        );
    }

    let palette = color::generate_palette(shares.shares.len());

    Plot::new("account_shares")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .x_axis_label("Share of spend (%)")
        .show_y(false)
        .allow_boxed_zoom(false)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .show(ui, |plot_ui| {
            for (i, share) in shares.shares.iter().enumerate() {
                let y = (shares.shares.len() - 1 - i) as f64;
                let label = format!("{} ({:.1} %)", share.account, share.share * 100.0);
                let bar = Bar::new(y, share.share * 100.0).width(0.7).fill(palette[i]);
                plot_ui.bar_chart(
                    BarChart::new(vec![bar])
                        .horizontal()
                        .name(label)
                        .color(palette[i]),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Amount histogram
// ---------------------------------------------------------------------------

pub fn amount_histogram_chart(ui: &mut Ui, data: &Result<Histogram, AggregateError>) {
    ui.strong("Distribution of invoice amounts");
    let hist = match data {
        Ok(hist) => hist,
        Err(e) => return aggregate_notice(ui, *e),
    };

    if hist.trimmed > 0 {
        ui.label(format!(
            "Top {} invoice(s) above {:.2} € excluded for readability",
            hist.trimmed, hist.cutoff
        ));
    }

    let bars: Vec<Bar> = hist
        .buckets
        .iter()
        .map(|b| {
            let center = (b.lower + b.upper) / 2.0;
            let width = (b.upper - b.lower).max(f64::EPSILON);
            Bar::new(center, b.count as f64).width(width)
        })
        .collect();

    Plot::new("amount_histogram")
        .height(CHART_HEIGHT)
        .x_axis_label("Invoice amount (€)")
        .y_axis_label("Invoices")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(
                BarChart::new(bars)
                    .name("Invoices")
                    .color(Color32::from_rgb(65, 105, 225)),
            );
        });
}
