//! Which elements take part in a modal's tab order.

#[cfg(test)]
#[path = "focusable_test.rs"]
mod focusable_test;

/// Element categories relevant to keyboard focus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementKind {
    Button,
    Input,
    Select,
    TextArea,
    Anchor,
    Other,
}

impl ElementKind {
    /// Map a (case-insensitive) tag name.
    pub fn from_tag(tag: &str) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "button" => Self::Button,
            "input" => Self::Input,
            "select" => Self::Select,
            "textarea" => Self::TextArea,
            "a" => Self::Anchor,
            _ => Self::Other,
        }
    }

    fn is_form_control(self) -> bool {
        matches!(self, Self::Button | Self::Input | Self::Select | Self::TextArea)
    }
}

/// Snapshot of the attributes that decide focusability.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementInfo {
    pub kind: ElementKind,
    /// `disabled` attribute present.
    pub disabled: bool,
    /// `href` attribute present (anchors only matter).
    pub has_href: bool,
    /// Parsed `tabindex`, `None` when absent or not an integer.
    pub tab_index: Option<i32>,
    /// Element has a layout box: attached and not `display: none`.
    pub rendered: bool,
}

impl ElementInfo {
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            disabled: false,
            has_href: false,
            tab_index: None,
            rendered: true,
        }
    }

    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    #[must_use]
    pub fn with_href(mut self) -> Self {
        self.has_href = true;
        self
    }

    #[must_use]
    pub fn with_tab_index(mut self, index: i32) -> Self {
        self.tab_index = Some(index);
        self
    }

    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.rendered = false;
        self
    }
}

/// Whether an element belongs in the trap's focus cycle.
///
/// Enabled form controls, anchors with an `href`, and anything with a
/// non-negative `tabindex` qualify. A negative `tabindex` always excludes,
/// as do `disabled` and having no layout box.
pub fn is_focusable(info: &ElementInfo) -> bool {
    if !info.rendered || info.disabled {
        return false;
    }
    match info.tab_index {
        Some(index) if index < 0 => false,
        Some(_) => true,
        None => info.kind.is_form_control() || (info.kind == ElementKind::Anchor && info.has_href),
    }
}
