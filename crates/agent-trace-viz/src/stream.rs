//! WebSocket client feeding trace frames to the UI.
//!
//! Exactly one socket is opened per [`EventStream`]. There is no reconnect:
//! once the server goes away the viewer shows itself as disconnected and keeps
//! the trace it already has.

/// What the socket reported since the last poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamUpdate {
    /// Socket opened.
    Connected,
    /// A text frame, still undecoded.
    Frame(String),
    /// Socket closed, failed to connect, or errored.
    Disconnected(Option<String>),
}

#[cfg(not(target_arch = "wasm32"))]
pub use native::EventStream;

#[cfg(target_arch = "wasm32")]
pub use web::EventStream;

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::sync::mpsc;

    use futures_util::{SinkExt, StreamExt};
    use tokio::sync::oneshot;
    use tokio_tungstenite::{connect_async, tungstenite::Message};
    use tracing::{debug, error, info, warn};

    use super::StreamUpdate;

    /// Background socket reader.
    ///
    /// Dropping the stream signals the reader task, which sends a close frame.
    pub struct EventStream {
        url: String,
        updates: mpsc::Receiver<StreamUpdate>,
        _shutdown: oneshot::Sender<()>,
    }

    impl EventStream {
        /// Open the socket on a dedicated thread with its own runtime.
        pub fn connect(url: impl Into<String>, ctx: egui::Context) -> Self {
            let url = url.into();
            let (tx, rx) = mpsc::channel();
            let (shutdown_tx, shutdown_rx) = oneshot::channel();

            let task_url = url.clone();
            let task_tx = tx.clone();
            let spawned = std::thread::Builder::new()
                .name("trace-events".to_string())
                .spawn(move || {
                    let runtime = match tokio::runtime::Builder::new_current_thread()
                        .enable_all()
                        .build()
                    {
                        Ok(rt) => rt,
                        Err(e) => {
                            error!("failed to start event runtime: {}", e);
                            let _ = task_tx.send(StreamUpdate::Disconnected(Some(e.to_string())));
                            return;
                        }
                    };
                    runtime.block_on(read_socket(task_url, task_tx, ctx, shutdown_rx));
                });

            if let Err(e) = spawned {
                error!("failed to spawn event thread: {}", e);
                let _ = tx.send(StreamUpdate::Disconnected(Some(e.to_string())));
            }

            Self {
                url,
                updates: rx,
                _shutdown: shutdown_tx,
            }
        }

        /// Drain everything received since the last call, in arrival order.
        pub fn poll(&self) -> Vec<StreamUpdate> {
            self.updates.try_iter().collect()
        }

        pub fn url(&self) -> &str {
            &self.url
        }
    }

    async fn read_socket(
        url: String,
        tx: mpsc::Sender<StreamUpdate>,
        ctx: egui::Context,
        mut shutdown: oneshot::Receiver<()>,
    ) {
        let notify = |update: StreamUpdate| {
            let _ = tx.send(update);
            ctx.request_repaint();
        };

        let mut socket = match connect_async(url.as_str()).await {
            Ok((socket, _)) => socket,
            Err(e) => {
                warn!(%url, error = %e, "failed to connect to events server");
                notify(StreamUpdate::Disconnected(Some(e.to_string())));
                return;
            }
        };
        info!(%url, "connected to events server");
        notify(StreamUpdate::Connected);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    debug!("closing event stream");
                    let _ = socket.close(None).await;
                    return;
                }

                msg = socket.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            notify(StreamUpdate::Frame(text.as_str().to_owned()));
                        }
                        Some(Ok(Message::Ping(data))) => {
                            let _ = socket.send(Message::Pong(data)).await;
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            info!(%url, "disconnected from events server");
                            notify(StreamUpdate::Disconnected(None));
                            return;
                        }
                        Some(Ok(_)) => {
                            // Binary and pong frames carry nothing for us
                        }
                        Some(Err(e)) => {
                            error!(%url, error = %e, "event stream error");
                            notify(StreamUpdate::Disconnected(Some(e.to_string())));
                            return;
                        }
                    }
                }
            }
        }
    }
}

#[cfg(target_arch = "wasm32")]
mod web {
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;
    use std::rc::Rc;

    use futures_util::stream::SplitSink;
    use futures_util::{SinkExt, StreamExt};
    use gloo_net::websocket::{futures::WebSocket, Message};
    use tracing::debug;

    use super::StreamUpdate;

    type SharedQueue = Rc<RefCell<VecDeque<StreamUpdate>>>;

    /// Socket reader running on the browser's event loop.
    pub struct EventStream {
        url: String,
        queue: SharedQueue,
        closed: Rc<Cell<bool>>,
        /// Write half, kept so dropping the stream can close the socket.
        sink: Option<SplitSink<WebSocket, Message>>,
    }

    impl EventStream {
        pub fn connect(url: impl Into<String>, ctx: egui::Context) -> Self {
            let url = url.into();
            let queue: SharedQueue = Rc::new(RefCell::new(VecDeque::new()));
            let closed = Rc::new(Cell::new(false));
            let mut sink = None;

            match WebSocket::open(&url) {
                Ok(socket) => {
                    let (write, mut read) = socket.split();
                    sink = Some(write);
                    let queue = queue.clone();
                    let closed = closed.clone();
                    wasm_bindgen_futures::spawn_local(async move {
                        let push = |update: StreamUpdate| {
                            queue.borrow_mut().push_back(update);
                            ctx.request_repaint();
                        };
                        push(StreamUpdate::Connected);

                        while let Some(msg) = read.next().await {
                            if closed.get() {
                                return;
                            }
                            match msg {
                                Ok(Message::Text(text)) => push(StreamUpdate::Frame(text)),
                                Ok(Message::Bytes(_)) => {}
                                Err(e) => {
                                    push(StreamUpdate::Disconnected(Some(e.to_string())));
                                    return;
                                }
                            }
                        }
                        push(StreamUpdate::Disconnected(None));
                    });
                }
                Err(e) => {
                    queue
                        .borrow_mut()
                        .push_back(StreamUpdate::Disconnected(Some(format!("{e:?}"))));
                }
            }

            Self {
                url,
                queue,
                closed,
                sink,
            }
        }

        pub fn poll(&self) -> Vec<StreamUpdate> {
            self.queue.borrow_mut().drain(..).collect()
        }

        pub fn url(&self) -> &str {
            &self.url
        }
    }

    impl Drop for EventStream {
        fn drop(&mut self) {
            self.closed.set(true);
            if let Some(mut sink) = self.sink.take() {
                wasm_bindgen_futures::spawn_local(async move {
                    if let Err(e) = sink.close().await {
                        debug!(error = %e, "websocket close failed");
                    }
                });
            }
        }
    }
}
