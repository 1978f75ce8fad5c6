//! Window - one document bound to one native window
//!
//! Drives the script side of the loop: flush queued changes, pull window
//! events, route them through the document, flush what the listeners did.

use std::ops::ControlFlow;

use trellis_dom::Document;
use trellis_scene::{SceneContext, Transport};
use url::Url;

use crate::{Config, Error, Result};

/// A native window and its document
#[derive(Debug)]
pub struct Window {
    document: Document,
    url: Option<Url>,
}

impl Window {
    /// Ask the native side for a window and build an empty document in it
    pub fn open(transport: Box<dyn Transport>, config: &Config) -> Result<Self> {
        let scene = SceneContext::open(
            transport,
            config.encoding,
            &config.title,
            config.width,
            config.height,
        )?;
        tracing::info!("Opened {:?} ({}x{})", config.title, config.width, config.height);

        Ok(Self {
            document: Document::new(scene)?,
            url: None,
        })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// URL of the current document, if it was navigated to
    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    /// Replace the document with a fresh one for `url`
    ///
    /// The old tree and its listeners are dropped and the surface id space
    /// is reset before anything of the new document is queued.
    pub fn navigate(&mut self, url: &str) -> Result<&Url> {
        let parsed = Url::parse(url).map_err(|source| Error::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        tracing::debug!("Navigating to {}", parsed);
        self.document.clear()?;
        Ok(&*self.url.insert(parsed))
    }

    /// One turn of the loop
    ///
    /// With `poll = true` the event fetch does not wait. Returns `Break`
    /// when the window was closed; events after the close are dropped, but
    /// changes made by listeners before it are still flushed.
    pub fn tick(&mut self, poll: bool) -> Result<ControlFlow<()>> {
        self.document.flush()?;

        let events = self.document.scene_mut().poll_events(poll)?;
        let count = events.len();
        let mut flow = ControlFlow::Continue(());
        for (i, event) in events.iter().enumerate() {
            if self.document.handle_window_event(event).is_break() {
                if i + 1 < count {
                    tracing::debug!("Dropping {} events after close", count - i - 1);
                }
                flow = ControlFlow::Break(());
                break;
            }
        }

        self.document.flush()?;
        Ok(flow)
    }

    /// Tick until the window closes
    pub fn run(&mut self) -> Result<()> {
        while self.tick(false)?.is_continue() {}
        tracing::info!("Window closed");
        Ok(())
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.document.scene_mut().resize_window(width, height)?;
        Ok(())
    }

    /// Destroy the native window
    pub fn close(self) -> Result<()> {
        self.document.into_scene().destroy_window()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_dom::NodeOperations;
    use trellis_scene::LoopbackTransport;
    use trellis_wire::{Encoding, WindowEvent};

    fn window() -> (Window, trellis_scene::LoopbackHandle) {
        let transport = LoopbackTransport::new(Encoding::Binary);
        let handle = transport.handle();
        (Window::open(Box::new(transport), &Config::default()).unwrap(), handle)
    }

    #[test]
    fn test_navigate_rejects_relative_urls() {
        let (mut window, _) = window();
        assert!(matches!(window.navigate("not a url"), Err(Error::InvalidUrl { .. })));
        assert!(window.url().is_none());

        let url = window.navigate("about:blank").unwrap();
        assert_eq!(url.as_str(), "about:blank");
    }

    #[test]
    fn test_tick_flushes_and_breaks_on_close() {
        let (mut window, handle) = window();
        let doc = window.document_mut();
        let body = doc.body();
        let div = doc.create_element("div");
        doc.append_child(body, div).unwrap();

        assert!(window.tick(true).unwrap().is_continue());
        assert!(window.document().scene().pending().is_empty());

        handle.push_event(WindowEvent::Close);
        handle.push_event(WindowEvent::Resize);
        assert!(window.tick(true).unwrap().is_break());
    }

    #[test]
    fn test_listener_changes_flushed_with_close() {
        let (mut window, handle) = window();
        let doc = window.document_mut();
        let body = doc.body();
        doc.add_event_listener(body, "click", |doc, event| {
            let item = doc.create_element("p");
            doc.append_child(event.current_target, item).unwrap();
        })
        .unwrap();
        window.tick(true).unwrap();

        let body_surface = window.document().node(body).unwrap().surface().unwrap();
        handle.push_event(WindowEvent::MouseDown { target: body_surface });
        handle.push_event(WindowEvent::MouseUp { target: body_surface });
        handle.push_event(WindowEvent::Close);
        assert!(window.tick(true).unwrap().is_break());

        assert!(window.document().scene().pending().is_empty());
        let mirror = handle.mirror(window.document().scene().window()).unwrap();
        assert_eq!(mirror.children(body_surface).unwrap().len(), 1);
    }
}
