//! Post a client message to the worker.

use std::sync::Arc;

use anime_worker::{spawn_message_actor, ClientMessage, LocalHost};
use anyhow::{Context as _, Result};

use super::MessageArgs;
use crate::context::Context;

/// Run the message command.
pub async fn run(args: MessageArgs, ctx: &Context) -> Result<()> {
    // Decode up front so the user sees why a message is rejected; the
    // worker itself only logs and drops malformed input.
    let message = ClientMessage::from_json(&args.json).context("Invalid message")?;
    let kind = message.kind();

    let host = Arc::new(LocalHost::new());
    let worker = ctx.worker(host.clone()).await?;
    let (port, actor) = spawn_message_actor(worker);

    if !port.post(message) {
        anyhow::bail!("Worker is not accepting messages");
    }
    drop(port);
    actor.await.context("Message actor stopped unexpectedly")?;

    ctx.output.success(&format!("Delivered {}", kind));
    if host.take_skip_waiting() {
        ctx.output
            .info("Skip-waiting requested; the next install activates immediately.");
    }
    Ok(())
}
