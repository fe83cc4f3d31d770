//! Browser-facing utilities shared by the control panel pages.
//!
//! SYSTEM CONTEXT
//! ==============
//! Utility modules isolate browser/environment concerns (storage, clock,
//! document focus) behind small traits so page logic can be tested without
//! a browser.

pub mod clock;
pub mod focus_trap;
pub mod focusable;
pub mod storage;
pub mod theme;
pub mod timezone;
pub mod validation;
#[cfg(feature = "hydrate")]
pub mod web_host;

#[cfg(test)]
pub(crate) mod fake_host;
