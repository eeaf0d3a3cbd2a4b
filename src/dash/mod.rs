//! Reactive binding layer
//!
//! Turns UI events (broker selection, filter changes, button clicks) into
//! adapter calls and publishes the results back to the panels.

pub mod controller;
pub mod panel;
pub mod session;
pub mod wiring;

pub use controller::{BindingController, BrokerSelection, PanelVisibility};
pub use panel::{BrokerPanel, PanelUpdate, QueryRequest};
pub use session::{SessionStore, SharedController};
pub use wiring::PanelWiring;
