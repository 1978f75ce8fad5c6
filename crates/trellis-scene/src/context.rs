//! Scene Context
//!
//! One per window. Allocates surface ids, queues [`SceneChange`]s in the
//! order the document performs them and ships the queue as a single
//! `UpdateScene` on [`SceneContext::flush`].
//!
//! Any failed round-trip leaves the context *desynchronized*: the native
//! side may have applied part of a batch, so every later round-trip is
//! refused until [`SceneContext::reset`].

use trellis_wire::{
    ApiMsg, ApiResponse, Bounds, ElementChild, Encoding, SceneChange, StyleProp, SurfaceId,
    TextRecord, WindowEvent, WindowId,
};

use crate::{SceneError, Transport};

/// Batching scene context
pub struct SceneContext {
    transport: Box<dyn Transport>,
    encoding: Encoding,
    window: WindowId,
    /// Element surfaces allocated so far, root included
    element_count: u32,
    text_count: u32,
    queue: Vec<SceneChange>,
    /// Position of the pending coalesced `Realloc` in `queue`
    realloc_at: Option<usize>,
    desynchronized: bool,
}

impl std::fmt::Debug for SceneContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneContext")
            .field("encoding", &self.encoding)
            .field("window", &self.window)
            .field("element_count", &self.element_count)
            .field("text_count", &self.text_count)
            .field("pending", &self.queue.len())
            .field("desynchronized", &self.desynchronized)
            .finish()
    }
}

impl SceneContext {
    /// Context for an already open native window
    pub fn new(transport: Box<dyn Transport>, encoding: Encoding, window: WindowId) -> Self {
        Self {
            transport,
            encoding,
            window,
            element_count: 1,
            text_count: 0,
            queue: Vec::new(),
            realloc_at: None,
            desynchronized: false,
        }
    }

    /// Ask the native side for a new window and bind a context to it
    pub fn open(
        mut transport: Box<dyn Transport>,
        encoding: Encoding,
        title: &str,
        width: u32,
        height: u32,
    ) -> Result<Self, SceneError> {
        let msg = ApiMsg::CreateWindow {
            title: title.to_string(),
            width,
            height,
        };
        let request = encoding.encode_message(&msg)?;
        let reply = transport.send(&request)?;

        match encoding.decode_message::<ApiResponse>(&reply)? {
            ApiResponse::WindowId { window } => {
                tracing::debug!("Opened native window {:?}", window);
                Ok(Self::new(transport, encoding, window))
            }
            ApiResponse::Error { message } => Err(SceneError::Rejected(message)),
            other => Err(SceneError::UnexpectedResponse {
                expected: "WindowId",
                tag: other.tag(),
            }),
        }
    }

    pub fn window(&self) -> WindowId {
        self.window
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn element_count(&self) -> u32 {
        self.element_count
    }

    pub fn text_count(&self) -> u32 {
        self.text_count
    }

    /// Changes queued since the last flush
    pub fn pending(&self) -> &[SceneChange] {
        &self.queue
    }

    pub fn is_desynchronized(&self) -> bool {
        self.desynchronized
    }

    // Allocation

    /// Allocate the next element surface
    pub fn create_surface(&mut self) -> SurfaceId {
        let id = SurfaceId(self.element_count);
        self.element_count += 1;
        self.update_realloc();
        tracing::trace!("Allocated element surface {}", id);
        id
    }

    /// Allocate the next text surface
    pub fn create_text(&mut self) -> SurfaceId {
        let id = SurfaceId(self.text_count);
        self.text_count += 1;
        self.update_realloc();
        tracing::trace!("Allocated text surface {}", id);
        id
    }

    fn update_realloc(&mut self) {
        let realloc = SceneChange::Realloc {
            element_count: self.element_count,
            text_count: self.text_count,
        };

        match self.realloc_at {
            Some(pos) => self.queue[pos] = realloc,
            None => {
                self.realloc_at = Some(self.queue.len());
                self.queue.push(realloc);
            }
        }
    }

    // Queued operations

    pub fn insert_at(&mut self, parent: SurfaceId, child: ElementChild, index: u32) {
        self.queue.push(SceneChange::InsertAt { parent, child, index });
    }

    pub fn remove_child(&mut self, parent: SurfaceId, child: ElementChild) {
        self.queue.push(SceneChange::RemoveChild { parent, child });
    }

    pub fn set_style_prop(&mut self, surface: SurfaceId, prop: StyleProp) {
        self.queue.push(SceneChange::SetStyleProp { surface, prop });
    }

    pub fn set_text(&mut self, text: SurfaceId, value: TextRecord) {
        self.queue.push(SceneChange::SetText { text, value });
    }

    pub fn set_tag_name(&mut self, surface: SurfaceId, tag: &str) {
        self.queue.push(SceneChange::SetTagName {
            surface,
            tag: tag.to_string(),
        });
    }

    pub fn set_attribute(&mut self, surface: SurfaceId, name: &str, value: Option<&str>) {
        self.queue.push(SceneChange::SetAttribute {
            surface,
            name: name.to_string(),
            value: value.map(str::to_string),
        });
    }

    // Round-trips

    /// Send everything queued as one batch
    ///
    /// Returns `Ok(false)` without touching the transport when nothing is
    /// queued. The queue is consumed even when the batch fails.
    pub fn flush(&mut self) -> Result<bool, SceneError> {
        self.check_synchronized()?;
        if self.queue.is_empty() {
            return Ok(false);
        }

        let changes = std::mem::take(&mut self.queue);
        self.realloc_at = None;
        let count = changes.len();

        let msg = ApiMsg::UpdateScene {
            window: self.window,
            changes,
        };
        match self.request(&msg)? {
            ApiResponse::Nothing => {
                tracing::debug!("Flushed {} scene changes to {:?}", count, self.window);
                Ok(true)
            }
            other => Err(self.unexpected("Nothing", &other)),
        }
    }

    /// Layout box of `surface`; flushes first so the answer reflects the queue
    pub fn get_offset_bounds(&mut self, surface: SurfaceId) -> Result<Bounds, SceneError> {
        self.flush()?;
        let msg = ApiMsg::GetBounds {
            window: self.window,
            surface,
        };
        match self.request(&msg)? {
            ApiResponse::Bounds { bounds } => Ok(bounds),
            other => Err(self.unexpected("Bounds", &other)),
        }
    }

    /// Element surfaces under `root` matching `selector`, in tree order
    pub fn query(
        &mut self,
        root: SurfaceId,
        selector: &str,
        all: bool,
    ) -> Result<Vec<SurfaceId>, SceneError> {
        self.flush()?;
        let msg = ApiMsg::Query {
            window: self.window,
            root,
            selector: selector.to_string(),
            all,
        };
        match self.request(&msg)? {
            ApiResponse::Surfaces { surfaces } => Ok(surfaces),
            other => Err(self.unexpected("Surfaces", &other)),
        }
    }

    /// Fetch pending window events (`poll = false` waits for at least one)
    pub fn poll_events(&mut self, poll: bool) -> Result<Vec<WindowEvent>, SceneError> {
        match self.request(&ApiMsg::GetEvents { poll })? {
            ApiResponse::Events { events } => Ok(events),
            other => Err(self.unexpected("Events", &other)),
        }
    }

    pub fn resize_window(&mut self, width: u32, height: u32) -> Result<(), SceneError> {
        let msg = ApiMsg::ResizeWindow {
            window: self.window,
            width,
            height,
        };
        match self.request(&msg)? {
            ApiResponse::Nothing => Ok(()),
            other => Err(self.unexpected("Nothing", &other)),
        }
    }

    /// Close the native window; the context is unusable afterwards
    pub fn destroy_window(mut self) -> Result<(), SceneError> {
        let msg = ApiMsg::DestroyWindow { window: self.window };
        match self.request(&msg)? {
            ApiResponse::Nothing => Ok(()),
            other => Err(self.unexpected("Nothing", &other)),
        }
    }

    /// Reclaim the whole id space
    ///
    /// Counters go back to the root alone, queued changes are dropped and a
    /// shrinking `Realloc(1, 0)` is queued so the native side drops its
    /// surfaces too. Clears the desynchronized state.
    pub fn reset(&mut self) {
        tracing::debug!(
            "Resetting scene for {:?} ({} elements, {} texts)",
            self.window,
            self.element_count,
            self.text_count
        );
        self.element_count = 1;
        self.text_count = 0;
        self.queue.clear();
        self.realloc_at = None;
        self.desynchronized = false;
        self.update_realloc();
        // later allocations must not grow the shrinking realloc in place
        self.realloc_at = None;
    }

    fn check_synchronized(&self) -> Result<(), SceneError> {
        if self.desynchronized {
            Err(SceneError::Desynchronized)
        } else {
            Ok(())
        }
    }

    /// One blocking round-trip; any failure desynchronizes
    fn request(&mut self, msg: &ApiMsg) -> Result<ApiResponse, SceneError> {
        self.check_synchronized()?;

        let result = self.round_trip(msg);
        match result {
            Ok(ApiResponse::Error { message }) => Err(self.desync(SceneError::Rejected(message))),
            Ok(response) => Ok(response),
            Err(e) => Err(self.desync(e)),
        }
    }

    fn round_trip(&mut self, msg: &ApiMsg) -> Result<ApiResponse, SceneError> {
        let request = self.encoding.encode_message(msg)?;
        let reply = self.transport.send(&request)?;
        Ok(self.encoding.decode_message(&reply)?)
    }

    fn unexpected(&mut self, expected: &'static str, got: &ApiResponse) -> SceneError {
        self.desync(SceneError::UnexpectedResponse {
            expected,
            tag: got.tag(),
        })
    }

    fn desync(&mut self, error: SceneError) -> SceneError {
        tracing::error!("Scene {:?} desynchronized: {}", self.window, error);
        self.desynchronized = true;
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LoopbackHandle, LoopbackTransport, TransportError};

    fn context() -> (SceneContext, LoopbackHandle) {
        let transport = LoopbackTransport::new(Encoding::Binary);
        let handle = transport.handle();
        let ctx = SceneContext::open(Box::new(transport), Encoding::Binary, "test", 100, 100).unwrap();
        (ctx, handle)
    }

    #[test]
    fn test_realloc_coalesced_in_place() {
        let (mut ctx, _) = context();

        let a = ctx.create_surface();
        ctx.insert_at(SurfaceId::ROOT, ElementChild::Element(a), 0);
        let b = ctx.create_surface();
        let t = ctx.create_text();

        assert_eq!((a, b, t), (SurfaceId(1), SurfaceId(2), SurfaceId(0)));
        assert_eq!(
            ctx.pending(),
            &[
                SceneChange::Realloc { element_count: 3, text_count: 1 },
                SceneChange::InsertAt {
                    parent: SurfaceId::ROOT,
                    child: ElementChild::Element(a),
                    index: 0,
                },
            ]
        );
    }

    #[test]
    fn test_new_realloc_after_flush() {
        let (mut ctx, handle) = context();

        ctx.create_surface();
        assert!(ctx.flush().unwrap());
        ctx.create_surface();

        assert_eq!(ctx.pending(), &[SceneChange::Realloc { element_count: 3, text_count: 0 }]);
        assert!(ctx.flush().unwrap());
        assert_eq!(handle.batches().len(), 2);
    }

    #[test]
    fn test_flush_idempotent() {
        let (mut ctx, handle) = context();
        let before = handle.request_count();

        assert!(!ctx.flush().unwrap());
        assert!(!ctx.flush().unwrap());
        assert_eq!(handle.request_count(), before);
    }

    #[test]
    fn test_failed_batch_desynchronizes() {
        let (mut ctx, handle) = context();
        ctx.create_surface();
        ctx.create_text();

        handle.fail_next_batch();
        assert!(matches!(ctx.flush(), Err(SceneError::Rejected(_))));

        // counters untouched, queue gone, later calls refused
        assert_eq!((ctx.element_count(), ctx.text_count()), (2, 1));
        assert!(ctx.pending().is_empty());
        assert!(ctx.is_desynchronized());
        assert!(matches!(ctx.flush(), Err(SceneError::Desynchronized)));
        assert!(matches!(ctx.poll_events(true), Err(SceneError::Desynchronized)));
    }

    #[test]
    fn test_reset_recovers() {
        let (mut ctx, handle) = context();
        ctx.create_surface();
        handle.fail_next_batch();
        assert!(ctx.flush().is_err());

        ctx.reset();
        assert!(!ctx.is_desynchronized());
        assert_eq!(ctx.pending(), &[SceneChange::Realloc { element_count: 1, text_count: 0 }]);
        assert_eq!(ctx.create_surface(), SurfaceId(1));
        assert_eq!(
            ctx.pending(),
            &[
                SceneChange::Realloc { element_count: 1, text_count: 0 },
                SceneChange::Realloc { element_count: 2, text_count: 0 },
            ]
        );
        assert!(ctx.flush().unwrap());
    }

    #[test]
    fn test_transport_error_desynchronizes() {
        let (mut ctx, handle) = context();
        handle.disconnect();
        assert!(matches!(
            ctx.poll_events(true),
            Err(SceneError::Transport(TransportError::Closed))
        ));
        assert!(ctx.is_desynchronized());
    }

    #[test]
    fn test_bounds_flush_first() {
        let (mut ctx, handle) = context();
        let el = ctx.create_surface();
        ctx.insert_at(SurfaceId::ROOT, ElementChild::Element(el), 0);

        let bounds = Bounds {
            a: trellis_wire::Vector2f::new(0.0, 0.0),
            b: trellis_wire::Vector2f::new(50.0, 20.0),
        };
        handle.set_bounds(el, bounds);

        assert_eq!(ctx.get_offset_bounds(el).unwrap(), bounds);
        assert!(ctx.pending().is_empty());
        assert_eq!(handle.batches().len(), 1);
    }

    #[test]
    fn test_unknown_surface_bounds_rejected() {
        let (mut ctx, _) = context();
        assert!(matches!(ctx.get_offset_bounds(SurfaceId(42)), Err(SceneError::Rejected(_))));
    }
}
