//! Reusable UI component modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Components here are shared by every control panel page: the timezone
//! label shown next to schedule times and the confirmation dialog used for
//! deletes and manual feeds.

pub mod confirm_dialog;
pub mod timezone_badge;
