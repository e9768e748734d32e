//! LaskuLens: interactive explorer for a municipal procurement-invoice
//! dataset. The data layer (load → filter → aggregate) is UI-independent;
//! the `ui` and `app` modules wire it into an egui desktop application.

pub mod app;
pub mod color;
pub mod data;
pub mod query;
pub mod state;
pub mod ui;
