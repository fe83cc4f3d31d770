//! Timezone label and localized timestamp rendering.
//!
//! SYSTEM CONTEXT
//! ==============
//! Schedule and history tables show API instants in the user's zone; the
//! badge tells the user which zone that is.

#[cfg(test)]
#[path = "timezone_badge_test.rs"]
mod timezone_badge_test;

use leptos::prelude::*;

use crate::util::timezone::{DisplayMode, TimezoneService};

fn badge_title(display: &str) -> String {
    format!("Times are shown in {display}")
}

/// `America/New_York (EST)` style label for the user's zone.
#[component]
pub fn TimezoneBadge() -> impl IntoView {
    let display = TimezoneService::browser().timezone_display();
    let title = badge_title(&display);

    view! {
        <span class="timezone-badge" title=title>{display}</span>
    }
}

/// An API instant rendered in the user's zone; `N/A` when absent.
#[component]
pub fn LocalTime(#[prop(into)] instant: Signal<Option<String>>, #[prop(optional)] mode: DisplayMode) -> impl IntoView {
    let text = move || {
        TimezoneService::browser().format_in_user_timezone(instant.get().as_deref(), mode)
    };
    let datetime = move || instant.get().unwrap_or_default();

    view! {
        <time class="local-time" datetime=datetime>{text}</time>
    }
}
