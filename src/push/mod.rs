//! Push channel to the backend kernel.
//!
//! Every live panel model owns at most one duplex WebSocket connection,
//! addressed by `(app id, subscriber id, channel type)`. Inbound frames are
//! `{cmd, data}` envelopes routed back to the owning model through a single
//! process-wide event queue. A dropped connection reconnects after a fixed
//! delay unless the close reason marks an auth failure or a clean
//! user-initiated close; the one hard failure is the main channel never
//! establishing at all, which surfaces a "kernel unreachable" event exactly
//! once per process.

use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

/// Channel type query parameter. Only the main channel participates in the
/// kernel-unreachable failure path.
pub const CHANNEL_TYPE_MAIN: &str = "main";

/// Inbound push envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PushFrame {
    pub cmd: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Events surfaced to the window event loop by push channel tasks.
#[derive(Debug)]
pub enum PushEvent {
    /// A channel finished its open handshake.
    Opened { subscriber: String },
    /// An inbound frame for the model registered under `subscriber`.
    Frame { subscriber: String, frame: PushFrame },
    /// The main channel could not be established at all. Emitted at most
    /// once per process.
    KernelUnreachable,
}

/// What to do after a channel closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseDecision {
    /// Stop silently: forced logout or a deliberate local close.
    Stop,
    /// Schedule a reconnect with the same id/type/handler.
    Reconnect,
}

/// Classify a close reason string.
///
/// An auth failure is a benign forced logout; a reason carrying the local
/// close marker is a clean shutdown. Everything else is a transient drop.
pub fn classify_close(reason: &str) -> CloseDecision {
    if reason.contains("unauthenticated") || reason.contains("close websocket") {
        CloseDecision::Stop
    } else {
        CloseDecision::Reconnect
    }
}

/// Shared handle to the kernel push endpoint for one application instance.
///
/// Cheap to clone; every channel opened through a link reports into the same
/// event queue and shares the kernel-unreachable latch.
#[derive(Clone)]
pub struct KernelLink {
    endpoint: String,
    app_id: String,
    reconnect_delay: Duration,
    handle: tokio::runtime::Handle,
    events: UnboundedSender<PushEvent>,
    kernel_down: Arc<AtomicBool>,
}

impl KernelLink {
    /// Create a link and the receiving end of its event queue.
    pub fn new(
        endpoint: String,
        app_id: String,
        reconnect_delay: Duration,
        handle: tokio::runtime::Handle,
    ) -> (Self, UnboundedReceiver<PushEvent>) {
        let (events, rx) = unbounded_channel();
        (
            Self {
                endpoint,
                app_id,
                reconnect_delay,
                handle,
                events,
                kernel_down: Arc::new(AtomicBool::new(false)),
            },
            rx,
        )
    }

    /// Whether the kernel-unreachable banner has already been raised.
    pub fn kernel_down(&self) -> bool {
        self.kernel_down.load(Ordering::Relaxed)
    }

    /// Open a push channel for `subscriber_id`.
    ///
    /// The returned handle keeps the connection task alive; dropping it
    /// closes the socket and ends any pending reconnect.
    pub fn open_channel(&self, subscriber_id: &str, channel_type: Option<&str>) -> PushChannel {
        let mut url = format!(
            "{}?app={}&id={}",
            self.endpoint, self.app_id, subscriber_id
        );
        if let Some(ty) = channel_type {
            url.push_str("&type=");
            url.push_str(ty);
        }

        let shared = Arc::new(ChannelShared {
            outbound: parking_lot::Mutex::new(None),
            established: AtomicBool::new(false),
        });
        let task = self.handle.spawn(channel_task(
            url,
            subscriber_id.to_string(),
            channel_type == Some(CHANNEL_TYPE_MAIN),
            self.reconnect_delay,
            Arc::clone(&shared),
            self.events.clone(),
            Arc::clone(&self.kernel_down),
        ));

        PushChannel {
            subscriber_id: subscriber_id.to_string(),
            shared,
            task,
        }
    }
}

struct ChannelShared {
    /// Sender into the live socket writer, present only while connected.
    outbound: parking_lot::Mutex<Option<UnboundedSender<String>>>,
    established: AtomicBool,
}

/// Handle to one live (or reconnecting) push channel.
pub struct PushChannel {
    subscriber_id: String,
    shared: Arc<ChannelShared>,
    task: JoinHandle<()>,
}

impl PushChannel {
    /// Whether a socket is currently open.
    pub fn is_open(&self) -> bool {
        self.shared.outbound.lock().is_some()
    }

    pub fn subscriber_id(&self) -> &str {
        &self.subscriber_id
    }

    /// Fire-and-forget command send.
    ///
    /// A no-op while disconnected. `broadcast` sends stamp request id `0`
    /// ("already acknowledged, broadcast regardless"); others carry a
    /// millisecond timestamp used by the kernel for de-duplication.
    pub fn send(&self, cmd: &str, param: serde_json::Value, broadcast: bool) -> bool {
        let guard = self.shared.outbound.lock();
        let Some(tx) = guard.as_ref() else {
            return false;
        };
        let req_id = if broadcast {
            0
        } else {
            chrono::Utc::now().timestamp_millis()
        };
        let envelope = serde_json::json!({
            "cmd": cmd,
            "reqId": req_id,
            "param": param,
        });
        tx.send(envelope.to_string()).is_ok()
    }
}

impl Drop for PushChannel {
    fn drop(&mut self) {
        log::debug!("Dropping push channel for {}", self.subscriber_id);
        self.task.abort();
    }
}

#[allow(clippy::too_many_arguments)]
async fn channel_task(
    url: String,
    subscriber: String,
    is_main: bool,
    reconnect_delay: Duration,
    shared: Arc<ChannelShared>,
    events: UnboundedSender<PushEvent>,
    kernel_down: Arc<AtomicBool>,
) {
    loop {
        let stream = match connect_async(url.as_str()).await {
            Ok((stream, _)) => stream,
            Err(err) => {
                let established = shared.established.load(Ordering::Relaxed);
                if is_main && !established {
                    // The sole hard-fail signal: the main channel never came
                    // up at all. Raised once per process, not retried.
                    if !kernel_down.swap(true, Ordering::Relaxed) {
                        log::error!("Main push channel unreachable: {err}");
                        let _ = events.send(PushEvent::KernelUnreachable);
                    }
                    return;
                }
                log::warn!(
                    "Push channel {subscriber} connect failed ({err}), retrying in {}s",
                    reconnect_delay.as_secs()
                );
                tokio::time::sleep(reconnect_delay).await;
                continue;
            }
        };

        shared.established.store(true, Ordering::Relaxed);
        let _ = events.send(PushEvent::Opened {
            subscriber: subscriber.clone(),
        });

        let (mut sink, mut source) = stream.split();
        let (tx, mut rx) = unbounded_channel::<String>();
        *shared.outbound.lock() = Some(tx);

        let mut close_reason = String::new();
        loop {
            tokio::select! {
                outgoing = rx.recv() => match outgoing {
                    Some(text) => {
                        if sink.send(Message::Text(text.into())).await.is_err() {
                            break;
                        }
                    }
                    // Owner dropped the sender; treat as a local close.
                    None => {
                        close_reason = "close websocket".to_string();
                        break;
                    }
                },
                inbound = source.next() => match inbound {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<PushFrame>(text.as_str()) {
                            Ok(frame) => {
                                let _ = events.send(PushEvent::Frame {
                                    subscriber: subscriber.clone(),
                                    frame,
                                });
                            }
                            Err(err) => {
                                log::warn!("Push channel {subscriber}: bad frame: {err}");
                            }
                        }
                    }
                    Some(Ok(Message::Close(close))) => {
                        if let Some(frame) = close {
                            close_reason = frame.reason.to_string();
                        }
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        log::warn!("Push channel {subscriber} read error: {err}");
                        break;
                    }
                    None => break,
                },
            }
        }

        *shared.outbound.lock() = None;

        match classify_close(&close_reason) {
            CloseDecision::Stop => {
                log::debug!("Push channel {subscriber} closed ({close_reason:?})");
                return;
            }
            CloseDecision::Reconnect => {
                log::warn!(
                    "Push channel {subscriber} dropped, reconnecting in {}s",
                    reconnect_delay.as_secs()
                );
                tokio::time::sleep(reconnect_delay).await;
            }
        }
    }
}
