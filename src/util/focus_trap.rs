//! Keyboard focus containment for modal dialogs.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every modal on the control panel (schedule editor, confirmations, message
//! boxes) shares one [`FocusTrap`]. While a modal is trapped, Tab and
//! Shift+Tab wrap inside it, Escape clicks its close control, and closing it
//! returns focus to whatever held focus before it opened.
//!
//! DESIGN
//! ======
//! The trap talks to the page through [`FocusHost`], so the state machine
//! runs unchanged against the browser DOM (`web_host`) and against the
//! in-memory host the tests use. At most one session exists at a time:
//! activating a second container tears the first one down.
//!
//! The handle is `Rc`-based and therefore neither `Send` nor `Sync`; it must
//! only be used from the UI thread.
//!
//! CLOSE CONTROL CONTRACT
//! ======================
//! Escape clicks the first match, in priority order, of
//! [`FocusTrapConfig::close_selectors`]: an element marked `data-close-modal`,
//! then `#closeModalButton`, `#cancelButton`, `#cancelConfirmButton`. The
//! trap does not deactivate itself on Escape; the modal's own hide logic
//! (usually re-adding the `hidden` class) ends the session.

#[cfg(test)]
#[path = "focus_trap_test.rs"]
mod focus_trap_test;

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use super::focusable::{ElementInfo, is_focusable};

/// Close controls Escape looks for, highest priority first.
pub const DEFAULT_CLOSE_SELECTORS: &[&str] =
    &["[data-close-modal]", "#closeModalButton", "#cancelButton", "#cancelConfirmButton"];

/// Class whose presence marks a modal as hidden.
pub const DEFAULT_HIDDEN_CLASS: &str = "hidden";

/// Delay before the first element of a newly trapped modal gets focus.
pub const DEFAULT_INITIAL_FOCUS_DELAY: Duration = Duration::from_millis(10);

/// Tuning for [`FocusTrap`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FocusTrapConfig {
    /// Lets the modal finish its show transition before focus moves in.
    pub initial_focus_delay: Duration,
    pub hidden_class: String,
    pub close_selectors: Vec<String>,
}

impl Default for FocusTrapConfig {
    fn default() -> Self {
        Self {
            initial_focus_delay: DEFAULT_INITIAL_FOCUS_DELAY,
            hidden_class: DEFAULT_HIDDEN_CLASS.to_owned(),
            close_selectors: DEFAULT_CLOSE_SELECTORS.iter().map(|s| (*s).to_owned()).collect(),
        }
    }
}

/// Handle for a registered document keydown listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Host-neutral view of a keydown event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyPress {
    key: String,
    shift: bool,
    default_prevented: bool,
}

impl KeyPress {
    pub fn new(key: impl Into<String>, shift: bool) -> Self {
        Self { key: key.into(), shift, default_prevented: false }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn shift(&self) -> bool {
        self.shift
    }

    /// Ask the host to suppress the browser's own handling.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}

pub type KeyHandler = Rc<dyn Fn(&mut KeyPress)>;

/// The slice of a document the trap needs.
///
/// Implementations must tolerate detached or foreign elements: every method
/// degrades to a no-op or `None` rather than failing.
pub trait FocusHost {
    type Element: Clone + PartialEq + 'static;

    fn active_element(&self) -> Option<Self::Element>;

    fn focus(&self, element: &Self::Element);

    /// Whether `element` can still take focus (attached, focusable node type).
    fn can_receive_focus(&self, element: &Self::Element) -> bool;

    /// Descendants of `container` in document order, excluding `container`.
    fn descendants(&self, container: &Self::Element) -> Vec<Self::Element>;

    fn describe(&self, element: &Self::Element) -> ElementInfo;

    /// First descendant of `container` matching a CSS selector.
    fn query_selector(&self, container: &Self::Element, selector: &str) -> Option<Self::Element>;

    fn click(&self, element: &Self::Element);

    fn element_by_id(&self, id: &str) -> Option<Self::Element>;

    fn has_class(&self, element: &Self::Element, class: &str) -> bool;

    fn add_keydown_listener(&self, handler: KeyHandler) -> ListenerId;

    fn remove_keydown_listener(&self, id: ListenerId);

    /// Run `task` once after `delay`. Not cancelable.
    fn set_timeout(&self, delay: Duration, task: Box<dyn FnOnce()>);

    /// Call `on_change` whenever the class attribute of `element` changes.
    fn observe_class(&self, element: &Self::Element, on_change: Box<dyn Fn()>);
}

struct Session<E> {
    container: E,
    previously_focused: Option<E>,
}

struct TrapState<E> {
    session: Option<Session<E>>,
    listener: Option<ListenerId>,
    // Bumped on every activate/deactivate; stale initial-focus timers compare against it.
    generation: u64,
}

impl<E> Default for TrapState<E> {
    fn default() -> Self {
        Self { session: None, listener: None, generation: 0 }
    }
}

struct TrapInner<H: FocusHost> {
    host: H,
    config: FocusTrapConfig,
    state: RefCell<TrapState<H::Element>>,
}

/// Shared focus-trap session. Clones refer to the same session.
pub struct FocusTrap<H: FocusHost> {
    inner: Rc<TrapInner<H>>,
}

impl<H: FocusHost> Clone for FocusTrap<H> {
    fn clone(&self) -> Self {
        Self { inner: Rc::clone(&self.inner) }
    }
}

impl<H: FocusHost + 'static> FocusTrap<H> {
    pub fn new(host: H) -> Self {
        Self::with_config(host, FocusTrapConfig::default())
    }

    pub fn with_config(host: H, config: FocusTrapConfig) -> Self {
        Self {
            inner: Rc::new(TrapInner { host, config, state: RefCell::new(TrapState::default()) }),
        }
    }

    fn from_weak(weak: &Weak<TrapInner<H>>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    pub fn host(&self) -> &H {
        &self.inner.host
    }

    pub fn config(&self) -> &FocusTrapConfig {
        &self.inner.config
    }

    pub fn is_active(&self) -> bool {
        self.inner.state.borrow().session.is_some()
    }

    /// The container currently trapping focus.
    pub fn active_modal(&self) -> Option<H::Element> {
        self.inner.state.borrow().session.as_ref().map(|s| s.container.clone())
    }

    /// What held focus when the current session started.
    pub fn previously_focused(&self) -> Option<H::Element> {
        self.inner
            .state
            .borrow()
            .session
            .as_ref()
            .and_then(|s| s.previously_focused.clone())
    }

    fn is_active_for(&self, container: &H::Element) -> bool {
        self.inner
            .state
            .borrow()
            .session
            .as_ref()
            .is_some_and(|s| &s.container == container)
    }

    /// Focusable descendants of `container`, in document order.
    pub fn focusable_elements(&self, container: &H::Element) -> Vec<H::Element> {
        let host = &self.inner.host;
        host.descendants(container)
            .into_iter()
            .filter(|el| is_focusable(&host.describe(el)))
            .collect()
    }

    /// The control Escape should click inside `container`, if any.
    pub fn close_control(&self, container: &H::Element) -> Option<H::Element> {
        self.inner
            .config
            .close_selectors
            .iter()
            .find_map(|selector| self.inner.host.query_selector(container, selector))
    }

    /// Trap focus inside `container`, ending any current session first.
    pub fn activate(&self, container: H::Element) {
        if self.is_active() {
            self.deactivate();
        }

        let host = &self.inner.host;
        let previously_focused = host.active_element();

        let weak = Rc::downgrade(&self.inner);
        let handler: KeyHandler = Rc::new(move |ev: &mut KeyPress| {
            if let Some(trap) = Self::from_weak(&weak) {
                trap.handle_key_down(ev);
            }
        });
        let listener = host.add_keydown_listener(handler);

        let generation = {
            let mut state = self.inner.state.borrow_mut();
            state.generation += 1;
            state.session = Some(Session { container: container.clone(), previously_focused });
            state.listener = Some(listener);
            state.generation
        };
        log::debug!("focus trap: activated (session {generation})");

        let weak = Rc::downgrade(&self.inner);
        host.set_timeout(
            self.inner.config.initial_focus_delay,
            Box::new(move || {
                if let Some(trap) = Self::from_weak(&weak) {
                    trap.focus_first_if_current(&container, generation);
                }
            }),
        );
    }

    fn focus_first_if_current(&self, container: &H::Element, generation: u64) {
        let current = {
            let state = self.inner.state.borrow();
            state.generation == generation && state.session.as_ref().is_some_and(|s| &s.container == container)
        };
        if !current {
            return;
        }
        if let Some(first) = self.focusable_elements(container).first() {
            self.inner.host.focus(first);
        }
    }

    /// End the session and hand focus back to where it was.
    pub fn deactivate(&self) {
        let (session, listener) = {
            let mut state = self.inner.state.borrow_mut();
            state.generation += 1;
            (state.session.take(), state.listener.take())
        };

        let host = &self.inner.host;
        if let Some(id) = listener {
            host.remove_keydown_listener(id);
        }
        if let Some(previous) = session.and_then(|s| s.previously_focused) {
            if host.can_receive_focus(&previous) {
                host.focus(&previous);
            }
        }
        log::debug!("focus trap: deactivated");
    }

    /// Document keydown handler for the active session.
    pub fn handle_key_down(&self, ev: &mut KeyPress) {
        let Some(container) = self.active_modal() else {
            return;
        };

        match ev.key() {
            "Escape" => {
                if let Some(close) = self.close_control(&container) {
                    self.inner.host.click(&close);
                }
            }
            "Tab" => self.wrap_tab(&container, ev),
            _ => {}
        }
    }

    fn wrap_tab(&self, container: &H::Element, ev: &mut KeyPress) {
        let elements = self.focusable_elements(container);
        let (Some(first), Some(last)) = (elements.first(), elements.last()) else {
            return;
        };

        let host = &self.inner.host;
        let active = host.active_element();
        if ev.shift() {
            if active.as_ref() == Some(first) {
                ev.prevent_default();
                host.focus(last);
            }
        } else if active.as_ref() == Some(last) {
            ev.prevent_default();
            host.focus(first);
        }
    }

    /// Visibility transition for `container`: becoming visible starts a
    /// session on it, becoming hidden ends the session if it is the trapped one.
    pub fn on_visibility_change(&self, container: &H::Element, visible: bool) {
        if visible {
            if !self.is_active_for(container) {
                self.activate(container.clone());
            }
        } else if self.is_active_for(container) {
            self.deactivate();
        }
    }

    /// Drive the trap from the hidden class of the element with id `modal_id`.
    ///
    /// Returns `false` when no such element exists.
    pub fn setup_auto_trap(&self, modal_id: &str) -> bool {
        let host = &self.inner.host;
        let Some(modal) = host.element_by_id(modal_id) else {
            log::debug!("focus trap: no element #{modal_id}, auto trap skipped");
            return false;
        };

        let weak = Rc::downgrade(&self.inner);
        let observed = modal.clone();
        host.observe_class(
            &modal,
            Box::new(move || {
                let Some(trap) = Self::from_weak(&weak) else {
                    return;
                };
                let hidden = trap.host().has_class(&observed, &trap.config().hidden_class);
                trap.on_visibility_change(&observed, !hidden);
            }),
        );
        true
    }
}
