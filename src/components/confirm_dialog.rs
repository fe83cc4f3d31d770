//! Confirmation modal with keyboard focus trapping.
//!
//! The dialog stays mounted and toggles the `hidden` class; under hydrate an
//! effect feeds each open/close transition to the page-wide focus trap, so
//! Tab cycles inside the dialog and Escape hits the Cancel button (marked
//! `data-close-modal`).

#[cfg(test)]
#[path = "confirm_dialog_test.rs"]
mod confirm_dialog_test;

use leptos::prelude::*;

fn dialog_class(open: bool) -> &'static str {
    if open { "modal" } else { "modal hidden" }
}

fn title_id(id: &str) -> String {
    format!("{id}Title")
}

/// Yes/no modal. `open` shows and hides it; both buttons close it.
#[component]
pub fn ConfirmDialog(
    #[prop(into)] id: String,
    #[prop(into)] title: String,
    #[prop(into)] message: Signal<String>,
    #[prop(into, default = "Confirm".to_owned())] confirm_label: String,
    open: RwSignal<bool>,
    on_confirm: Callback<()>,
) -> impl IntoView {
    let dialog_ref = NodeRef::<leptos::html::Div>::new();
    let heading_id = title_id(&id);
    let labelled_by = heading_id.clone();

    #[cfg(feature = "hydrate")]
    {
        Effect::new(move || {
            let visible = open.get();
            let Some(el) = dialog_ref.get() else {
                return;
            };
            if let Some(trap) = crate::util::web_host::page_trap() {
                let el: web_sys::Element = el.into();
                trap.on_visibility_change(&el, visible);
            }
        });
    }

    let on_cancel = move |_| open.set(false);
    let on_confirm_click = move |_| {
        on_confirm.run(());
        open.set(false);
    };

    view! {
        <div
            id=id
            node_ref=dialog_ref
            class=move || dialog_class(open.get())
            role="dialog"
            aria-modal="true"
            aria-labelledby=labelled_by
        >
            <div class="modal__panel">
                <h2 id=heading_id class="modal__title">{title}</h2>
                <p class="modal__message">{move || message.get()}</p>
                <div class="modal__actions">
                    <button class="btn" data-close-modal="true" on:click=on_cancel>"Cancel"</button>
                    <button class="btn btn--primary" on:click=on_confirm_click>{confirm_label}</button>
                </div>
            </div>
        </div>
    }
}
