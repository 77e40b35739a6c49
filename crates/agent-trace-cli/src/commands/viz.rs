//! Native viewer command.
//!
//! Launches a desktop window that follows the trace events server.

use anyhow::Result;
use eframe::{run_native, NativeOptions};
use tracing::info;

use agent_trace_viz::{TraceViewerApp, ViewerOptions};

use crate::config::Config;

/// Open the viewer window and block until it closes.
pub fn execute(config: &Config, demo: bool) -> Result<()> {
    let viewer = ViewerOptions {
        ws_url: config.ws_url.clone(),
        dark_mode: config.dark_mode,
        show_sidebar: config.show_sidebar,
        demo,
    };

    let options = NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([config.window_width, config.window_height])
            .with_title(format!("Agent Trace - {}", config.ws_url)),
        ..Default::default()
    };

    info!(url = %viewer.ws_url, demo, "launching viewer");

    run_native(
        "Agent Trace",
        options,
        Box::new(move |cc| Ok(Box::new(TraceViewerApp::new(cc, viewer)))),
    )
    .map_err(|e| anyhow::anyhow!("Viewer error: {}", e))?;

    Ok(())
}
