//! Full window loop against a native host running on its own thread

use std::cell::Cell;
use std::rc::Rc;
use std::thread;

use trellis::{
    Config, Encoding, NativeEndpoint, NodeOperations, SurfaceId, Window, WindowEvent, channel_pair,
};
use trellis_scene::SceneMirror;
use trellis_wire::{ApiMsg, ApiResponse, WindowId};

/// Host that keeps a mirror and scripts the event stream
fn host(endpoint: NativeEndpoint, encoding: Encoding, mut script: Vec<Vec<WindowEvent>>) -> SceneMirror {
    let mut mirror = SceneMirror::new();
    script.reverse();

    endpoint.serve(|request| {
        let response = match encoding.decode_message::<ApiMsg>(request) {
            Ok(ApiMsg::CreateWindow { .. }) => ApiResponse::WindowId { window: WindowId(7) },
            Ok(ApiMsg::UpdateScene { changes, .. }) => match mirror.apply_all(&changes) {
                Ok(()) => ApiResponse::Nothing,
                Err(e) => ApiResponse::Error { message: e.to_string() },
            },
            Ok(ApiMsg::GetEvents { .. }) => ApiResponse::Events {
                events: script.pop().unwrap_or_default(),
            },
            Ok(_) => ApiResponse::Nothing,
            Err(e) => ApiResponse::Error { message: e.to_string() },
        };
        encoding.encode_message(&response).unwrap()
    });
    mirror
}

#[test]
fn test_run_loop_over_worker_channel() {
    for encoding in [Encoding::Binary, Encoding::Json] {
        let config = Config::default().with_title("integration").with_encoding(encoding);
        let (transport, endpoint) = channel_pair(config.timeout);

        // body is element surface 3 in a fresh document
        let script = vec![
            vec![WindowEvent::Resize],
            vec![
                WindowEvent::MouseDown { target: SurfaceId(3) },
                WindowEvent::MouseUp { target: SurfaceId(3) },
            ],
            vec![WindowEvent::Close],
        ];
        let native = thread::spawn(move || host(endpoint, encoding, script));

        let mut window = Window::open(Box::new(transport), &config).unwrap();
        window.navigate("https://example.com/app").unwrap();

        let doc = window.document_mut();
        let body = doc.body();
        let list = doc.create_element("ul");
        doc.append_child(body, list).unwrap();

        let clicks = Rc::new(Cell::new(0));
        let counter = Rc::clone(&clicks);
        doc.add_event_listener(body, "click", move |doc, event| {
            counter.set(counter.get() + 1);
            let item = doc.create_element("li");
            let list = doc.first_child(event.current_target).unwrap();
            doc.append_child(list, item).unwrap();
        })
        .unwrap();

        window.run().unwrap();
        assert_eq!(clicks.get(), 1);
        assert_eq!(window.document().child_nodes(list).len(), 1);
        assert_eq!(window.url().unwrap().host_str(), Some("example.com"));

        drop(window);
        let mirror = native.join().unwrap();

        // the listener's insertion was flushed in the same tick as the click
        let list_surface = SurfaceId(4);
        assert_eq!(mirror.tag_name(list_surface), Some("ul"));
        assert_eq!(mirror.children(list_surface).unwrap().len(), 1);
    }
}

#[test]
fn test_config_drives_window() {
    let config = Config::from_lookup(|key| match key {
        "TRELLIS_ENCODING" => Some("json".to_string()),
        "TRELLIS_WINDOW_SIZE" => Some("320x240".to_string()),
        _ => None,
    })
    .unwrap();

    let transport = trellis::LoopbackTransport::new(config.encoding);
    let handle = transport.handle();
    let window = Window::open(Box::new(transport), &config).unwrap();

    assert_eq!(window.document().scene().encoding(), Encoding::Json);
    assert_eq!(handle.window_count(), 1);
    window.close().unwrap();
    assert_eq!(handle.window_count(), 0);
}
