//! Browser DOM backing for the focus trap.
//!
//! Hydrate-only. Keydown listeners and class observers are `wasm-bindgen`
//! closures owned by the host so they stay alive until explicitly removed.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::time::Duration;

use gloo_timers::callback::Timeout;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{Document, Element, HtmlElement, KeyboardEvent, MutationObserver, MutationObserverInit};

use super::focus_trap::{FocusHost, FocusTrap, KeyHandler, KeyPress, ListenerId};
use super::focusable::{ElementInfo, ElementKind};

type KeyClosure = Closure<dyn FnMut(KeyboardEvent)>;

/// [`FocusHost`] over the page's `document`.
pub struct WebHost {
    document: Document,
    next_listener: Cell<u64>,
    listeners: RefCell<HashMap<ListenerId, KeyClosure>>,
    observers: RefCell<Vec<(MutationObserver, Closure<dyn FnMut()>)>>,
}

impl WebHost {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            next_listener: Cell::new(1),
            listeners: RefCell::new(HashMap::new()),
            observers: RefCell::new(Vec::new()),
        }
    }

    /// Host for `window.document`, if there is one.
    pub fn current() -> Option<Self> {
        web_sys::window().and_then(|w| w.document()).map(Self::new)
    }
}

impl Drop for WebHost {
    fn drop(&mut self) {
        for (observer, _) in self.observers.borrow().iter() {
            observer.disconnect();
        }
        for (_, closure) in self.listeners.borrow().iter() {
            let _ = self
                .document
                .remove_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        }
    }
}

impl FocusHost for WebHost {
    type Element = Element;

    fn active_element(&self) -> Option<Element> {
        self.document.active_element()
    }

    fn focus(&self, element: &Element) {
        if let Some(el) = element.dyn_ref::<HtmlElement>() {
            if el.focus().is_err() {
                log::warn!("focus trap: focus() rejected on <{}>", element.tag_name());
            }
        }
    }

    fn can_receive_focus(&self, element: &Element) -> bool {
        element.is_connected() && element.dyn_ref::<HtmlElement>().is_some()
    }

    fn descendants(&self, container: &Element) -> Vec<Element> {
        let Ok(list) = container.query_selector_all("*") else {
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    fn describe(&self, element: &Element) -> ElementInfo {
        let rendered = element.is_connected()
            && element
                .dyn_ref::<HtmlElement>()
                .is_some_and(|el| el.offset_parent().is_some());
        ElementInfo {
            kind: ElementKind::from_tag(&element.tag_name()),
            disabled: element.has_attribute("disabled"),
            has_href: element.has_attribute("href"),
            tab_index: element
                .get_attribute("tabindex")
                .and_then(|v| v.trim().parse().ok()),
            rendered,
        }
    }

    fn query_selector(&self, container: &Element, selector: &str) -> Option<Element> {
        container.query_selector(selector).ok().flatten()
    }

    fn click(&self, element: &Element) {
        if let Some(el) = element.dyn_ref::<HtmlElement>() {
            el.click();
        }
    }

    fn element_by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn has_class(&self, element: &Element, class: &str) -> bool {
        element.class_list().contains(class)
    }

    fn add_keydown_listener(&self, handler: KeyHandler) -> ListenerId {
        let id = ListenerId(self.next_listener.get());
        self.next_listener.set(id.0 + 1);

        let closure = KeyClosure::new(move |ev: KeyboardEvent| {
            let mut press = KeyPress::new(ev.key(), ev.shift_key());
            handler(&mut press);
            if press.is_default_prevented() {
                ev.prevent_default();
            }
        });
        if self
            .document
            .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())
            .is_err()
        {
            log::warn!("focus trap: could not register keydown listener");
        }
        self.listeners.borrow_mut().insert(id, closure);
        id
    }

    fn remove_keydown_listener(&self, id: ListenerId) {
        let Some(closure) = self.listeners.borrow_mut().remove(&id) else {
            return;
        };
        let _ = self
            .document
            .remove_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
    }

    fn set_timeout(&self, delay: Duration, task: Box<dyn FnOnce()>) {
        let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
        Timeout::new(millis, task).forget();
    }

    fn observe_class(&self, element: &Element, on_change: Box<dyn Fn()>) {
        let closure = Closure::<dyn FnMut()>::new(move || on_change());
        let Ok(observer) = MutationObserver::new(closure.as_ref().unchecked_ref()) else {
            log::warn!("focus trap: MutationObserver unavailable");
            return;
        };

        let init = MutationObserverInit::new();
        init.set_attributes(true);
        let filter = js_sys::Array::of1(&"class".into());
        init.set_attribute_filter(&filter);
        if observer.observe_with_options(element, &init).is_err() {
            log::warn!("focus trap: could not observe #{}", element.id());
            return;
        }
        self.observers.borrow_mut().push((observer, closure));
    }
}

thread_local! {
    static PAGE_TRAP: Option<FocusTrap<WebHost>> = WebHost::current().map(FocusTrap::new);
}

/// The page-wide trap shared by every modal. `None` outside a document.
pub fn page_trap() -> Option<FocusTrap<WebHost>> {
    PAGE_TRAP.with(Clone::clone)
}
