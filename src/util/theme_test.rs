use super::*;

use crate::util::storage::MemoryStore;

#[test]
fn unset_preference_is_light() {
    let store = MemoryStore::new();
    assert_eq!(current(&store), Theme::Light);
    assert!(!is_dark(&store));
}

#[test]
fn unknown_value_reads_as_light() {
    let store = MemoryStore::new();
    store.set_item(THEME_STORAGE_KEY, "solarized");
    assert_eq!(current(&store), Theme::Light);
}

#[test]
fn toggle_flips_and_persists() {
    let store = MemoryStore::new();
    assert_eq!(toggle(&store), Theme::Dark);
    assert_eq!(store.get_item(THEME_STORAGE_KEY).as_deref(), Some("dark"));
    assert!(is_dark(&store));

    assert_eq!(toggle(&store), Theme::Light);
    assert_eq!(store.get_item(THEME_STORAGE_KEY).as_deref(), Some("light"));
}

#[test]
fn initialize_returns_stored_theme() {
    let store = MemoryStore::new();
    store.set_item(THEME_STORAGE_KEY, "dark");
    assert_eq!(initialize(&store), Theme::Dark);
}

#[test]
fn apply_is_noop_but_callable() {
    apply(Theme::Dark);
    apply(Theme::Light);
}
