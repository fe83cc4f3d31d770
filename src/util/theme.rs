//! Light/dark theme preference.
//!
//! The preference lives under the `"theme"` storage key as `"light"` or
//! `"dark"`; anything else reads as light. In the browser build the
//! `dark` class on `<html>` follows it.
//!
//! TRADE-OFFS
//! ==========
//! Applying the class is best-effort browser-only behavior; SSR paths
//! no-op to keep server rendering deterministic.

#[cfg(test)]
#[path = "theme_test.rs"]
mod theme_test;

use super::storage::KeyValueStore;

pub const THEME_STORAGE_KEY: &str = "theme";

#[cfg(feature = "hydrate")]
const DARK_CLASS: &str = "dark";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    fn parse(value: &str) -> Self {
        if value == "dark" { Self::Dark } else { Self::Light }
    }

    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

/// Stored theme, light when unset.
pub fn current(store: &impl KeyValueStore) -> Theme {
    store
        .get_item(THEME_STORAGE_KEY)
        .map_or(Theme::Light, |v| Theme::parse(&v))
}

pub fn is_dark(store: &impl KeyValueStore) -> bool {
    current(store) == Theme::Dark
}

/// Set or clear the `dark` class on `<html>`.
pub fn apply(theme: Theme) {
    #[cfg(feature = "hydrate")]
    {
        let Some(root) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.document_element())
        else {
            return;
        };
        let classes = root.class_list();
        let _ = match theme {
            Theme::Dark => classes.add_1(DARK_CLASS),
            Theme::Light => classes.remove_1(DARK_CLASS),
        };
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = theme;
    }
}

/// Apply the stored theme, for page startup.
pub fn initialize(store: &impl KeyValueStore) -> Theme {
    let theme = current(store);
    apply(theme);
    theme
}

/// Flip the theme, apply it and persist it. Returns the new theme.
pub fn toggle(store: &impl KeyValueStore) -> Theme {
    let next = current(store).toggled();
    apply(next);
    store.set_item(THEME_STORAGE_KEY, next.as_str());
    log::debug!("theme switched to {}", next.as_str());
    next
}
