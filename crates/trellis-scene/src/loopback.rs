//! In-process native stand-in
//!
//! Decodes requests exactly like a real native host would, applies batches
//! to a [`SceneMirror`] per window and answers bounds, selector queries and
//! queued events. Tests and the demo drive it through a [`LoopbackHandle`].

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::rc::Rc;

use trellis_wire::{
    ApiMsg, ApiResponse, Bounds, Encoding, SceneChange, SurfaceId, WindowEvent, WindowId,
};

use crate::selector::{ElementContext, SelectorList};
use crate::{SceneMirror, Transport, TransportError};

#[derive(Debug, Default)]
struct LoopbackState {
    windows: BTreeMap<WindowId, SceneMirror>,
    next_window: u32,
    events: VecDeque<WindowEvent>,
    bounds: HashMap<SurfaceId, Bounds>,
    batches: Vec<Vec<SceneChange>>,
    fail_next_batch: bool,
    disconnected: bool,
    requests: usize,
}

/// Loopback transport
#[derive(Debug)]
pub struct LoopbackTransport {
    encoding: Encoding,
    state: Rc<RefCell<LoopbackState>>,
}

/// Inspection and control side of a [`LoopbackTransport`]
#[derive(Debug, Clone)]
pub struct LoopbackHandle {
    state: Rc<RefCell<LoopbackState>>,
}

impl LoopbackTransport {
    pub fn new(encoding: Encoding) -> Self {
        Self {
            encoding,
            state: Rc::default(),
        }
    }

    pub fn handle(&self) -> LoopbackHandle {
        LoopbackHandle {
            state: Rc::clone(&self.state),
        }
    }
}

impl Transport for LoopbackTransport {
    fn send(&mut self, request: &[u8]) -> Result<Vec<u8>, TransportError> {
        let mut state = self.state.borrow_mut();
        if state.disconnected {
            return Err(TransportError::Closed);
        }
        state.requests += 1;

        let response = match self.encoding.decode_message::<ApiMsg>(request) {
            Ok(msg) => state.handle(msg),
            Err(e) => {
                tracing::warn!("Loopback could not decode request: {}", e);
                ApiResponse::Error { message: e.to_string() }
            }
        };

        self.encoding
            .encode_message(&response)
            .map_err(|e| TransportError::Frame(e.to_string()))
    }
}

impl LoopbackState {
    fn handle(&mut self, msg: ApiMsg) -> ApiResponse {
        match msg {
            ApiMsg::GetEvents { poll } => {
                if !poll && self.events.is_empty() {
                    tracing::trace!("Blocking event wait on loopback, returning empty");
                }
                ApiResponse::Events {
                    events: self.events.drain(..).collect(),
                }
            }
            ApiMsg::UpdateScene { window, changes } => {
                if std::mem::take(&mut self.fail_next_batch) {
                    return ApiResponse::Error {
                        message: "batch rejected".into(),
                    };
                }

                let Some(mirror) = self.windows.get_mut(&window) else {
                    return unknown_window(window);
                };
                let result = mirror.apply_all(&changes);
                self.batches.push(changes);

                match result {
                    Ok(()) => ApiResponse::Nothing,
                    Err(e) => ApiResponse::Error { message: e.to_string() },
                }
            }
            ApiMsg::GetBounds { window, surface } => {
                let Some(mirror) = self.windows.get(&window) else {
                    return unknown_window(window);
                };
                if surface.index() >= mirror.element_count() {
                    return ApiResponse::Error {
                        message: format!("unknown element surface {}", surface),
                    };
                }
                ApiResponse::Bounds {
                    bounds: self.bounds.get(&surface).copied().unwrap_or_default(),
                }
            }
            ApiMsg::CreateWindow { title, width, height } => {
                let window = WindowId(self.next_window);
                self.next_window += 1;
                self.windows.insert(window, SceneMirror::new());
                tracing::debug!("Loopback window {:?} {:?} ({}x{})", window, title, width, height);
                ApiResponse::WindowId { window }
            }
            ApiMsg::ResizeWindow { window, .. } => {
                if !self.windows.contains_key(&window) {
                    return unknown_window(window);
                }
                self.events.push_back(WindowEvent::Resize);
                ApiResponse::Nothing
            }
            ApiMsg::DestroyWindow { window } => match self.windows.remove(&window) {
                Some(_) => ApiResponse::Nothing,
                None => unknown_window(window),
            },
            ApiMsg::Query { window, root, selector, all } => {
                let Some(mirror) = self.windows.get(&window) else {
                    return unknown_window(window);
                };
                match SelectorList::parse(&selector) {
                    Ok(list) => ApiResponse::Surfaces {
                        surfaces: query(mirror, root, &list, all),
                    },
                    Err(e) => ApiResponse::Error { message: e.to_string() },
                }
            }
        }
    }
}

fn unknown_window(window: WindowId) -> ApiResponse {
    ApiResponse::Error {
        message: format!("unknown window {:?}", window),
    }
}

fn query(mirror: &SceneMirror, root: SurfaceId, list: &SelectorList, all: bool) -> Vec<SurfaceId> {
    let matching = mirror.descendants(root).into_iter().filter(|id| {
        list.matches(&ElementContext {
            tag_name: mirror.tag_name(*id).unwrap_or_default(),
            id: mirror.attribute(*id, "id"),
            class: mirror.attribute(*id, "class"),
        })
    });

    if all {
        matching.collect()
    } else {
        matching.take(1).collect()
    }
}

impl LoopbackHandle {
    /// Queue an event for the next `GetEvents`
    pub fn push_event(&self, event: WindowEvent) {
        self.state.borrow_mut().events.push_back(event);
    }

    /// Layout result reported for `surface`
    pub fn set_bounds(&self, surface: SurfaceId, bounds: Bounds) {
        self.state.borrow_mut().bounds.insert(surface, bounds);
    }

    /// Reject the next `UpdateScene` with an error response
    pub fn fail_next_batch(&self) {
        self.state.borrow_mut().fail_next_batch = true;
    }

    /// Every later `send` fails with `TransportError::Closed`
    pub fn disconnect(&self) {
        self.state.borrow_mut().disconnected = true;
    }

    /// Clone of the scene as the native side sees it
    pub fn mirror(&self, window: WindowId) -> Option<SceneMirror> {
        self.state.borrow().windows.get(&window).cloned()
    }

    /// All batches received so far, including rejected ones
    pub fn batches(&self) -> Vec<Vec<SceneChange>> {
        self.state.borrow().batches.clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.borrow().requests
    }

    pub fn window_count(&self) -> usize {
        self.state.borrow().windows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_wire::ElementChild;

    fn round_trip(transport: &mut LoopbackTransport, msg: &ApiMsg) -> ApiResponse {
        let bytes = transport.encoding.encode_message(msg).unwrap();
        let reply = transport.send(&bytes).unwrap();
        transport.encoding.decode_message(&reply).unwrap()
    }

    fn open(transport: &mut LoopbackTransport) -> WindowId {
        let msg = ApiMsg::CreateWindow { title: "t".into(), width: 10, height: 10 };
        match round_trip(transport, &msg) {
            ApiResponse::WindowId { window } => window,
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_query_by_selector() {
        let mut transport = LoopbackTransport::new(Encoding::Binary);
        let window = open(&mut transport);

        let el = |id| ElementChild::Element(SurfaceId(id));
        let changes = vec![
            SceneChange::Realloc { element_count: 3, text_count: 0 },
            SceneChange::SetTagName { surface: SurfaceId(1), tag: "div".into() },
            SceneChange::SetTagName { surface: SurfaceId(2), tag: "span".into() },
            SceneChange::SetAttribute {
                surface: SurfaceId(2),
                name: "class".into(),
                value: Some("hot cold".into()),
            },
            SceneChange::InsertAt { parent: SurfaceId::ROOT, child: el(1), index: 0 },
            SceneChange::InsertAt { parent: SurfaceId(1), child: el(2), index: 0 },
        ];
        let update = ApiMsg::UpdateScene { window, changes };
        assert_eq!(round_trip(&mut transport, &update), ApiResponse::Nothing);

        let query = |selector: &str, all| ApiMsg::Query {
            window,
            root: SurfaceId::ROOT,
            selector: selector.into(),
            all,
        };
        assert_eq!(
            round_trip(&mut transport, &query("*", true)),
            ApiResponse::Surfaces { surfaces: vec![SurfaceId(1), SurfaceId(2)] }
        );
        assert_eq!(
            round_trip(&mut transport, &query(".cold", false)),
            ApiResponse::Surfaces { surfaces: vec![SurfaceId(2)] }
        );
        assert!(matches!(
            round_trip(&mut transport, &query("div > span", true)),
            ApiResponse::Error { .. }
        ));
    }

    #[test]
    fn test_fail_next_batch_only_once() {
        let mut transport = LoopbackTransport::new(Encoding::Json);
        let handle = transport.handle();
        let window = open(&mut transport);

        handle.fail_next_batch();
        let update = ApiMsg::UpdateScene { window, changes: vec![] };
        assert!(matches!(round_trip(&mut transport, &update), ApiResponse::Error { .. }));
        assert_eq!(round_trip(&mut transport, &update), ApiResponse::Nothing);
    }

    #[test]
    fn test_events_drain() {
        let mut transport = LoopbackTransport::new(Encoding::Binary);
        let handle = transport.handle();
        handle.push_event(WindowEvent::KeyDown(36));

        let poll = ApiMsg::GetEvents { poll: true };
        assert_eq!(
            round_trip(&mut transport, &poll),
            ApiResponse::Events { events: vec![WindowEvent::KeyDown(36)] }
        );
        assert_eq!(round_trip(&mut transport, &poll), ApiResponse::Events { events: vec![] });
    }

    #[test]
    fn test_garbage_request_answered_with_error() {
        let mut transport = LoopbackTransport::new(Encoding::Binary);
        let reply = transport.send(&[0xFF, 0, 0, 0]).unwrap();
        let response: ApiResponse = Encoding::Binary.decode_message(&reply).unwrap();
        assert!(matches!(response, ApiResponse::Error { .. }));
    }

    #[test]
    fn test_disconnect() {
        let mut transport = LoopbackTransport::new(Encoding::Binary);
        transport.handle().disconnect();
        assert!(matches!(transport.send(&[]), Err(TransportError::Closed)));
    }
}
