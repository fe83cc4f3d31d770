//! In-memory [`FocusHost`] for tests.
//!
//! Models a tiny document tree with ids, classes, focus, clicks, a keydown
//! listener registry, a manual timer queue and class observers.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use super::focus_trap::{FocusHost, KeyHandler, KeyPress, ListenerId};
use super::focusable::{ElementInfo, ElementKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

struct FakeNode {
    html_id: Option<String>,
    info: ElementInfo,
    children: Vec<NodeId>,
    classes: Vec<String>,
    close_marker: bool,
    connected: bool,
    clicks: usize,
    on_click: Option<Rc<dyn Fn()>>,
}

pub struct FakeHost {
    nodes: RefCell<Vec<FakeNode>>,
    active: Cell<Option<NodeId>>,
    listeners: RefCell<Vec<(ListenerId, KeyHandler)>>,
    next_listener: Cell<u64>,
    timers: RefCell<Vec<Box<dyn FnOnce()>>>,
    observers: RefCell<Vec<(NodeId, Rc<dyn Fn()>)>>,
}

impl Default for FakeHost {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeHost {
    /// Empty document with a `<body>` root.
    pub fn new() -> Self {
        let body = FakeNode {
            html_id: None,
            info: ElementInfo::new(ElementKind::Other),
            children: Vec::new(),
            classes: Vec::new(),
            close_marker: false,
            connected: true,
            clicks: 0,
            on_click: None,
        };
        Self {
            nodes: RefCell::new(vec![body]),
            active: Cell::new(None),
            listeners: RefCell::new(Vec::new()),
            next_listener: Cell::new(1),
            timers: RefCell::new(Vec::new()),
            observers: RefCell::new(Vec::new()),
        }
    }

    pub fn body(&self) -> NodeId {
        NodeId(0)
    }

    pub fn add(&self, parent: NodeId, id: Option<&str>, info: ElementInfo) -> NodeId {
        let mut nodes = self.nodes.borrow_mut();
        let node = NodeId(nodes.len());
        nodes.push(FakeNode {
            html_id: id.map(str::to_owned),
            info,
            children: Vec::new(),
            classes: Vec::new(),
            close_marker: false,
            connected: true,
            clicks: 0,
            on_click: None,
        });
        nodes[parent.0].children.push(node);
        node
    }

    pub fn div(&self, parent: NodeId, id: &str) -> NodeId {
        self.add(parent, Some(id), ElementInfo::new(ElementKind::Other))
    }

    pub fn button(&self, parent: NodeId, id: &str) -> NodeId {
        self.add(parent, Some(id), ElementInfo::new(ElementKind::Button))
    }

    pub fn mark_close(&self, node: NodeId) {
        self.nodes.borrow_mut()[node.0].close_marker = true;
    }

    pub fn on_click(&self, node: NodeId, f: impl Fn() + 'static) {
        self.nodes.borrow_mut()[node.0].on_click = Some(Rc::new(f));
    }

    pub fn clicks(&self, node: NodeId) -> usize {
        self.nodes.borrow()[node.0].clicks
    }

    pub fn detach(&self, node: NodeId) {
        self.nodes.borrow_mut()[node.0].connected = false;
    }

    pub fn set_active(&self, node: Option<NodeId>) {
        self.active.set(node);
    }

    pub fn add_class(&self, node: NodeId, class: &str) {
        {
            let mut nodes = self.nodes.borrow_mut();
            let classes = &mut nodes[node.0].classes;
            if classes.iter().any(|c| c == class) {
                return;
            }
            classes.push(class.to_owned());
        }
        self.notify(node);
    }

    pub fn remove_class(&self, node: NodeId, class: &str) {
        {
            let mut nodes = self.nodes.borrow_mut();
            let classes = &mut nodes[node.0].classes;
            let before = classes.len();
            classes.retain(|c| c != class);
            if classes.len() == before {
                return;
            }
        }
        self.notify(node);
    }

    fn notify(&self, node: NodeId) {
        let callbacks: Vec<Rc<dyn Fn()>> = self
            .observers
            .borrow()
            .iter()
            .filter(|(n, _)| *n == node)
            .map(|(_, f)| Rc::clone(f))
            .collect();
        for f in callbacks {
            f();
        }
    }

    /// Dispatch a keydown to every registered listener.
    pub fn press(&self, key: &str, shift: bool) -> KeyPress {
        let mut ev = KeyPress::new(key, shift);
        let handlers: Vec<KeyHandler> = self.listeners.borrow().iter().map(|(_, h)| Rc::clone(h)).collect();
        for handler in handlers {
            handler(&mut ev);
        }
        ev
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.borrow().len()
    }

    /// Fire every queued timer, including ones queued while firing.
    pub fn run_timers(&self) {
        loop {
            let due: Vec<Box<dyn FnOnce()>> = self.timers.borrow_mut().drain(..).collect();
            if due.is_empty() {
                break;
            }
            for task in due {
                task();
            }
        }
    }

    fn collect_descendants(&self, node: NodeId, out: &mut Vec<NodeId>) {
        let children = self.nodes.borrow()[node.0].children.clone();
        for child in children {
            out.push(child);
            self.collect_descendants(child, out);
        }
    }
}

impl FocusHost for FakeHost {
    type Element = NodeId;

    fn active_element(&self) -> Option<NodeId> {
        self.active.get()
    }

    fn focus(&self, element: &NodeId) {
        if self.can_receive_focus(element) {
            self.active.set(Some(*element));
        }
    }

    fn can_receive_focus(&self, element: &NodeId) -> bool {
        self.nodes.borrow().get(element.0).is_some_and(|n| n.connected)
    }

    fn descendants(&self, container: &NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_descendants(*container, &mut out);
        out
    }

    fn describe(&self, element: &NodeId) -> ElementInfo {
        let nodes = self.nodes.borrow();
        let node = &nodes[element.0];
        let mut info = node.info.clone();
        info.rendered = info.rendered && node.connected;
        info
    }

    fn query_selector(&self, container: &NodeId, selector: &str) -> Option<NodeId> {
        let candidates = self.descendants(container);
        let nodes = self.nodes.borrow();
        if selector == "[data-close-modal]" {
            return candidates.into_iter().find(|n| nodes[n.0].close_marker);
        }
        let id = selector.strip_prefix('#')?;
        candidates.into_iter().find(|n| nodes[n.0].html_id.as_deref() == Some(id))
    }

    fn click(&self, element: &NodeId) {
        let on_click = {
            let mut nodes = self.nodes.borrow_mut();
            let node = &mut nodes[element.0];
            node.clicks += 1;
            node.on_click.clone()
        };
        if let Some(f) = on_click {
            f();
        }
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.nodes
            .borrow()
            .iter()
            .position(|n| n.connected && n.html_id.as_deref() == Some(id))
            .map(NodeId)
    }

    fn has_class(&self, element: &NodeId, class: &str) -> bool {
        self.nodes.borrow()[element.0].classes.iter().any(|c| c == class)
    }

    fn add_keydown_listener(&self, handler: KeyHandler) -> ListenerId {
        let id = ListenerId(self.next_listener.get());
        self.next_listener.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, handler));
        id
    }

    fn remove_keydown_listener(&self, id: ListenerId) {
        self.listeners.borrow_mut().retain(|(l, _)| *l != id);
    }

    fn set_timeout(&self, _delay: Duration, task: Box<dyn FnOnce()>) {
        self.timers.borrow_mut().push(task);
    }

    fn observe_class(&self, element: &NodeId, on_change: Box<dyn Fn()>) {
        self.observers.borrow_mut().push((*element, Rc::from(on_change)));
    }
}
