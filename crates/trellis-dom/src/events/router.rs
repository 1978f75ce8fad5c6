//! Window event routing
//!
//! Turns native [`WindowEvent`]s into DOM dispatches, tracking hover,
//! press and focus targets across ticks.

use std::ops::ControlFlow;

use trellis_wire::{SurfaceId, WindowEvent};

use super::{Event, EventDetail};
use crate::{Document, NodeId};

/// Pointer and focus bookkeeping; every target starts at the Document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerState {
    pub move_target: NodeId,
    pub down_target: NodeId,
    pub focus_target: NodeId,
}

impl Default for PointerState {
    fn default() -> Self {
        Self {
            move_target: NodeId::DOCUMENT,
            down_target: NodeId::DOCUMENT,
            focus_target: NodeId::DOCUMENT,
        }
    }
}

/// Code name of a physical scancode
pub fn key_code_name(scancode: u16) -> Option<&'static str> {
    let name = match scancode {
        36 => "Enter",
        48 => "Tab",
        49 => "Space",
        51 => "Backspace",
        53 => "Escape",
        123 => "ArrowLeft",
        124 => "ArrowRight",
        125 => "ArrowDown",
        126 => "ArrowUp",
        _ => return None,
    };
    Some(name)
}

impl Document {
    pub fn pointer_state(&self) -> PointerState {
        self.pointer
    }

    /// Focused node (the Document when nothing is focused)
    pub fn active_element(&self) -> NodeId {
        self.pointer.focus_target
    }

    /// Route one native event; `Break` means the window was closed
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> ControlFlow<()> {
        match *event {
            WindowEvent::MouseMove { target } => {
                let target = self.resolve_target(target);
                self.fire(target, Event::new("mousemove"));

                let previous = self.pointer.move_target;
                if target != previous {
                    self.fire(
                        previous,
                        Event::new("mouseout").with_detail(EventDetail::Mouse {
                            related_target: Some(target),
                        }),
                    );
                    self.fire(
                        target,
                        Event::new("mouseover").with_detail(EventDetail::Mouse {
                            related_target: Some(previous),
                        }),
                    );
                    self.pointer.move_target = target;
                }
            }
            WindowEvent::MouseDown { target } => {
                let target = self.resolve_target(target);
                self.fire(target, Event::new("mousedown"));
                self.pointer.down_target = target;
            }
            WindowEvent::MouseUp { target } => {
                let target = self.resolve_target(target);
                self.fire(target, Event::new("mouseup"));

                if target == self.pointer.down_target {
                    self.focus(target);
                    self.fire(target, Event::new("click"));
                }
            }
            WindowEvent::Scroll { target } => {
                let target = self.resolve_target(target);
                self.fire(target, Event::new("scroll"));
            }
            WindowEvent::KeyDown(scancode) => self.fire_key("keydown", scancode),
            WindowEvent::KeyUp(scancode) => self.fire_key("keyup", scancode),
            WindowEvent::KeyPress(char_code) => {
                let detail = EventDetail::Character {
                    char_code,
                    key: char::from_u32(u32::from(char_code)),
                };
                let target = self.pointer.focus_target;
                self.fire(target, Event::new("keypress").with_detail(detail));
            }
            WindowEvent::Focus => self.fire(NodeId::DOCUMENT, Event::new("focus").non_bubbling()),
            WindowEvent::Blur => self.fire(NodeId::DOCUMENT, Event::new("blur").non_bubbling()),
            WindowEvent::Resize => self.fire(NodeId::DOCUMENT, Event::new("resize")),
            WindowEvent::Close => {
                tracing::debug!("Window close requested");
                return ControlFlow::Break(());
            }
            WindowEvent::Unknown => tracing::trace!("Ignoring unknown window event"),
        }

        ControlFlow::Continue(())
    }

    /// Move focus to `target`, firing blur on the old focus first
    fn focus(&mut self, target: NodeId) {
        let previous = self.pointer.focus_target;
        if target == previous {
            return;
        }
        self.fire(previous, Event::new("blur"));
        self.pointer.focus_target = target;
        self.fire(target, Event::new("focus"));
    }

    fn fire_key(&mut self, event_type: &str, scancode: u16) {
        let detail = EventDetail::Keyboard {
            scancode,
            code: key_code_name(scancode),
        };
        let target = self.pointer.focus_target;
        self.fire(target, Event::new(event_type).with_detail(detail));
    }

    /// Dispatch, falling back to the Document if `target` has gone away
    fn fire(&mut self, target: NodeId, mut event: Event) {
        let target = if self.node(target).is_some() {
            target
        } else {
            NodeId::DOCUMENT
        };
        if let Err(e) = self.dispatch_event(target, &mut event) {
            tracing::warn!("Dropping {} at {}: {}", event.event_type(), target, e);
        }
    }

    fn resolve_target(&self, surface: SurfaceId) -> NodeId {
        match self.node_for_surface(surface) {
            Some(node) => node,
            None => {
                tracing::warn!("Event target {} has no node, routing to document", surface);
                NodeId::DOCUMENT
            }
        }
    }
}
