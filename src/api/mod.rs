//! HTTP surface for the alert browser

pub mod pages;
pub mod routes;

pub use pages::PageRenderer;
pub use routes::{create_router, AppState, PanelDescriptor};
