//! # feeder-panel
//!
//! Leptos + WASM building blocks for the pet-feeder control panel.
//!
//! The pages (dashboard, schedules, settings, admin) lean on two utilities
//! kept here: [`util::timezone`], which moves schedule times between the
//! API's UTC instants and the user's wall clock, and [`util::focus_trap`],
//! which keeps keyboard focus inside open modals. [`components`] shows how a
//! page wires both in.

pub mod components;
pub mod util;

/// Install the panic hook and route `log` output to the browser console.
#[cfg(feature = "hydrate")]
pub fn init_logging() {
    console_error_panic_hook::set_once();
    // A second call finds the logger already set; keep the first.
    let _ = console_log::init_with_level(log::Level::Debug);
}
