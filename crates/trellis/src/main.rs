//! Trellis demo
//!
//! Builds a small page against the in-process loopback host, clicks a
//! button through the event queue and prints what the native side ended
//! up with.

use std::cell::Cell;
use std::rc::Rc;

use anyhow::Context;
use trellis::{Config, LoopbackTransport, NodeOperations, Window, WindowEvent, logging};

fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("reading TRELLIS_* environment")?;
    logging::init(&config);

    let initial_url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "about:blank".to_string());

    let transport = LoopbackTransport::new(config.encoding);
    let host = transport.handle();
    let mut window = Window::open(Box::new(transport), &config)?;
    window.navigate(&initial_url)?;

    let clicks = Rc::new(Cell::new(0u32));
    let doc = window.document_mut();
    let body = doc.body();

    let heading = doc.create_element("h1");
    let title = doc.create_text_node("Hello from Trellis");
    doc.append_child(heading, title)?;
    doc.append_child(body, heading)?;

    let button = doc.create_element("button");
    let label = doc.create_text_node("Click me");
    doc.set_attribute(button, "id", "go")?;
    doc.append_child(button, label)?;
    doc.append_child(body, button)?;
    doc.style(button)?.set_margin_top(8)?;

    let counter = Rc::clone(&clicks);
    doc.add_event_listener(button, "click", move |doc, _| {
        counter.set(counter.get() + 1);
        let text = format!("Clicked {} time(s)", counter.get());
        if let Err(e) = doc.set_text_data(label, &text) {
            tracing::warn!("Could not update label: {}", e);
        }
    })?;

    if window.tick(true)?.is_break() {
        tracing::info!("Window closed before the demo started");
        window.close()?;
        return Ok(());
    }

    let surface = window
        .document()
        .node(button)
        .and_then(|n| n.surface())
        .context("button has no surface")?;
    host.push_event(WindowEvent::MouseDown { target: surface });
    host.push_event(WindowEvent::MouseUp { target: surface });
    host.push_event(WindowEvent::Close);
    window.run()?;

    let doc = window.document();
    println!("url: {}", window.url().map_or("-", |u| u.as_str()));
    println!("clicks: {}", clicks.get());
    println!("label: {}", doc.text_data(label)?);

    if let Some(mirror) = host.mirror(doc.scene().window()) {
        println!(
            "native scene: {} elements, {} texts",
            mirror.element_count(),
            mirror.text_count()
        );
    }

    window.close()?;
    Ok(())
}
