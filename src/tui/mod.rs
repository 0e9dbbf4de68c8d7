pub mod data_view;
pub mod metrics_tab;
pub mod products_tab;
mod stream;
pub mod theme;
pub mod ui_loop;
