//! Single-consumer message loop feeding client messages to a worker.

use std::sync::Arc;

use anime_observability::StructuredLogger;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::controller::LifecycleController;
use crate::message::ClientMessage;

/// Sending side of the worker's message channel.
///
/// Posting never waits for the message to be handled and nothing is sent
/// back. The actor stops once every port is dropped.
#[derive(Clone)]
pub struct MessagePort {
    sender: mpsc::UnboundedSender<ClientMessage>,
    logger: StructuredLogger,
}

impl MessagePort {
    /// Queue a message. Returns false if the worker is gone.
    pub fn post(&self, message: ClientMessage) -> bool {
        self.sender.send(message).is_ok()
    }

    /// Decode and queue a JSON message. Malformed input is logged and
    /// dropped.
    pub fn post_json(&self, json: &str) -> bool {
        match ClientMessage::from_json(json) {
            Ok(message) => self.post(message),
            Err(e) => {
                self.logger
                    .warn_builder("dropping malformed message")
                    .field("error", e.to_string())
                    .emit();
                false
            }
        }
    }
}

/// Start the message actor for `worker`.
pub fn spawn_message_actor(worker: Arc<LifecycleController>) -> (MessagePort, JoinHandle<()>) {
    let (sender, mut receiver) = mpsc::unbounded_channel::<ClientMessage>();
    let logger = StructuredLogger::new("messages").with_version(worker.version());

    let actor_logger = logger.clone();
    let handle = tokio::spawn(async move {
        while let Some(message) = receiver.recv().await {
            let kind = message.kind();
            if let Err(e) = worker.handle_message(message).await {
                actor_logger
                    .warn_builder("message failed")
                    .field("type", kind)
                    .field("error", e.to_string())
                    .emit();
            }
        }
        actor_logger.debug("message channel closed");
    });

    (MessagePort { sender, logger }, handle)
}
