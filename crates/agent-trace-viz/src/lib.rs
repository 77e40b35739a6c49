//! WASM-compatible egui dashboard for live agent traces.
//!
//! This crate provides an egui-based viewer that can run:
//! - Natively (via eframe)
//! - In the browser (via WASM)
//!
//! The viewer opens one WebSocket to the trace server and renders whatever
//! `add_node` / `update_node` / `add_edge` frames arrive.

mod app;
mod render;
mod sample;
mod settings;
mod sidebar;
mod state;
mod stream;
mod ui;

pub use app::{TraceViewerApp, ViewerOptions};
pub use state::ViewerState;
pub use stream::{EventStream, StreamUpdate};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Start the viewer in WASM context.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    // Better panic messages in the browser console
    console_error_panic_hook::set_once();

    let web_options = eframe::WebOptions::default();
    let options = ViewerOptions {
        ws_url: page_events_url(),
        ..ViewerOptions::default()
    };

    wasm_bindgen_futures::spawn_local(async move {
        let Some(canvas) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("agent-trace-canvas"))
            .and_then(|el| el.dyn_into::<web_sys::HtmlCanvasElement>().ok())
        else {
            web_sys::console::error_1(&"agent-trace-canvas element not found".into());
            return;
        };

        if let Err(e) = eframe::WebRunner::new()
            .start(
                canvas,
                web_options,
                Box::new(move |cc| Ok(Box::new(TraceViewerApp::new(cc, options)))),
            )
            .await
        {
            web_sys::console::error_1(&format!("failed to start eframe: {e:?}").into());
        }
    });
}

/// `ws://<page host>/ws` when served over http(s), else the default server.
#[cfg(target_arch = "wasm32")]
fn page_events_url() -> String {
    let location = web_sys::window().map(|w| w.location());
    let host = location.as_ref().and_then(|l| l.host().ok());
    let protocol = location.as_ref().and_then(|l| l.protocol().ok());
    match (protocol.as_deref(), host) {
        (Some("https:"), Some(host)) if !host.is_empty() => format!("wss://{host}/ws"),
        (Some("http:"), Some(host)) if !host.is_empty() => format!("ws://{host}/ws"),
        _ => agent_trace_core::DEFAULT_EVENTS_URL.to_string(),
    }
}
