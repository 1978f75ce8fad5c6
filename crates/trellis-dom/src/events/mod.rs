//! DOM Events
//!
//! Listener registration per node and bubbling dispatch. Listeners get the
//! whole document, so they can mutate the tree while an event is in flight.

mod router;

pub use router::{PointerState, key_code_name};

use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::{Document, DomError, DomResult, Node, NodeId};

/// Listener callback
pub type Listener = Rc<dyn Fn(&mut Document, &mut Event)>;

/// Handle returned by `add_event_listener`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Event-specific payload
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EventDetail {
    #[default]
    None,
    /// `mouseover`/`mouseout`: the node the pointer came from or went to
    Mouse { related_target: Option<NodeId> },
    /// `keydown`/`keyup`: physical scancode and its code name, if known
    Keyboard { scancode: u16, code: Option<&'static str> },
    /// `keypress`: character code and the character it stands for
    Character { char_code: u16, key: Option<char> },
}

/// A dispatched event
#[derive(Debug, Clone)]
pub struct Event {
    event_type: String,
    pub target: NodeId,
    pub current_target: NodeId,
    pub bubbles: bool,
    pub cancelable: bool,
    pub detail: EventDetail,
    default_prevented: bool,
    propagation_stopped: bool,
    immediate_propagation_stopped: bool,
}

impl Event {
    /// Bubbling, cancelable event; the type is matched case-insensitively
    pub fn new(event_type: &str) -> Self {
        Self {
            event_type: event_type.to_ascii_lowercase(),
            target: NodeId::DOCUMENT,
            current_target: NodeId::DOCUMENT,
            bubbles: true,
            cancelable: true,
            detail: EventDetail::None,
            default_prevented: false,
            propagation_stopped: false,
            immediate_propagation_stopped: false,
        }
    }

    pub fn with_detail(mut self, detail: EventDetail) -> Self {
        self.detail = detail;
        self
    }

    pub fn non_bubbling(mut self) -> Self {
        self.bubbles = false;
        self
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn prevent_default(&mut self) {
        if self.cancelable {
            self.default_prevented = true;
        }
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    /// Stop bubbling after the current node's listeners
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    /// Stop bubbling and skip the current node's remaining listeners
    pub fn stop_immediate_propagation(&mut self) {
        self.propagation_stopped = true;
        self.immediate_propagation_stopped = true;
    }
}

/// Per-node listener list, in registration order
#[derive(Default, Clone)]
pub(crate) struct Listeners {
    entries: Vec<(ListenerId, String, Listener)>,
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|(id, ty, _)| (id, ty)))
            .finish()
    }
}

/// Something listeners can be attached to
pub trait EventTarget {
    fn add_event_listener<F>(&mut self, event_type: &str, listener: F) -> ListenerId
    where
        F: Fn(&mut Document, &mut Event) + 'static;

    /// Returns whether a listener was removed
    fn remove_event_listener(&mut self, event_type: &str, id: ListenerId) -> bool;

    /// Snapshot of the listeners for `event_type`, in registration order
    fn listeners_for(&self, event_type: &str) -> Vec<Listener>;
}

impl EventTarget for Node {
    fn add_event_listener<F>(&mut self, event_type: &str, listener: F) -> ListenerId
    where
        F: Fn(&mut Document, &mut Event) + 'static,
    {
        let id = ListenerId::next();
        self.listeners
            .entries
            .push((id, event_type.to_ascii_lowercase(), Rc::new(listener)));
        id
    }

    fn remove_event_listener(&mut self, event_type: &str, id: ListenerId) -> bool {
        let before = self.listeners.entries.len();
        self.listeners
            .entries
            .retain(|(lid, ty, _)| !(*lid == id && ty.eq_ignore_ascii_case(event_type)));
        self.listeners.entries.len() != before
    }

    fn listeners_for(&self, event_type: &str) -> Vec<Listener> {
        self.listeners
            .entries
            .iter()
            .filter(|(_, ty, _)| ty.eq_ignore_ascii_case(event_type))
            .map(|(_, _, l)| Rc::clone(l))
            .collect()
    }
}

impl Document {
    pub fn add_event_listener<F>(
        &mut self,
        node: NodeId,
        event_type: &str,
        listener: F,
    ) -> DomResult<ListenerId>
    where
        F: Fn(&mut Document, &mut Event) + 'static,
    {
        let node = self.node_mut(node).ok_or(DomError::NotFound)?;
        Ok(node.add_event_listener(event_type, listener))
    }

    pub fn remove_event_listener(
        &mut self,
        node: NodeId,
        event_type: &str,
        id: ListenerId,
    ) -> DomResult<bool> {
        let node = self.node_mut(node).ok_or(DomError::NotFound)?;
        Ok(node.remove_event_listener(event_type, id))
    }

    /// Dispatch `event` at `target`, bubbling through its ancestors
    ///
    /// The propagation path is fixed before the first listener runs.
    /// Returns `false` if a listener called `prevent_default`.
    pub fn dispatch_event(&mut self, target: NodeId, event: &mut Event) -> DomResult<bool> {
        let mut path = vec![target];
        let mut current = self.node(target).ok_or(DomError::NotFound)?.parent;
        while let Some(id) = current {
            path.push(id);
            current = self.node(id).and_then(|n| n.parent);
        }

        event.target = target;
        event.propagation_stopped = false;
        event.immediate_propagation_stopped = false;

        tracing::trace!("Dispatching {} at {}", event.event_type, target);

        for node in path {
            event.current_target = node;

            let listeners = self
                .node(node)
                .map(|n| n.listeners_for(&event.event_type))
                .unwrap_or_default();

            for listener in listeners {
                listener(self, event);
                if event.immediate_propagation_stopped {
                    break;
                }
            }

            if event.propagation_stopped || !event.bubbles {
                break;
            }
        }

        Ok(!event.default_prevented)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn recorder() -> (Rc<RefCell<Vec<String>>>, impl Fn(&str) -> Box<dyn Fn(&mut Document, &mut Event)>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let log2 = Rc::clone(&log);
        let make = move |label: &str| -> Box<dyn Fn(&mut Document, &mut Event)> {
            let log = Rc::clone(&log2);
            let label = label.to_string();
            Box::new(move |_: &mut Document, e: &mut Event| {
                log.borrow_mut().push(format!("{}:{}", label, e.event_type()));
            })
        };
        (log, make)
    }

    #[test]
    fn test_event_type_lowercased() {
        let event = Event::new("MouseMove");
        assert_eq!(event.event_type(), "mousemove");
        assert!(event.bubbles);
    }

    #[test]
    fn test_prevent_default_needs_cancelable() {
        let mut event = Event::new("x");
        event.cancelable = false;
        event.prevent_default();
        assert!(!event.is_default_prevented());
    }

    #[test]
    fn test_listener_registration_order_and_removal() {
        let mut node = Node::new(crate::NodeData::Document);
        let (_, make) = recorder();

        let a = node.add_event_listener("Click", make("a"));
        let _b = node.add_event_listener("click", make("b"));
        node.add_event_listener("keydown", make("c"));

        assert_eq!(node.listeners_for("CLICK").len(), 2);
        assert!(!node.remove_event_listener("keydown", a));
        assert!(node.remove_event_listener("click", a));
        assert_eq!(node.listeners_for("click").len(), 1);
    }

    #[test]
    fn test_listener_ids_unique() {
        assert_ne!(ListenerId::next(), ListenerId::next());
    }
}
