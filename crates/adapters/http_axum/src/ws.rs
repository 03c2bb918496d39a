//! WebSocket live channel of one Thing.
//!
//! A session attaches to the Thing's notification hub, forwards every
//! notification as a text frame and hands every inbound text frame to
//! [`ThingContext::handle_message`]. Errors in inbound messages come back
//! as `error` messages on the same socket.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;

use webthing_app::context::ThingContext;
use webthing_app::hub::Subscription;

/// Complete the upgrade and run a session for `context`.
pub fn upgrade(upgrade: WebSocketUpgrade, context: ThingContext) -> Response {
    upgrade.on_upgrade(move |socket| session(socket, context))
}

async fn session(mut socket: WebSocket, context: ThingContext) {
    let Subscription { id, mut receiver } = context.attach();
    tracing::debug!(thing = %context.name(), subscriber = %id, "websocket attached");

    loop {
        tokio::select! {
            outbound = receiver.recv() => {
                // Hub closed the channel: Thing closed or subscriber too slow.
                let Some(message) = outbound else { break };
                let text = message.to_json().to_string();
                if let Err(err) = socket.send(Message::Text(text.into())).await {
                    tracing::debug!(%err, subscriber = %id, "websocket send failed");
                    break;
                }
            }
            inbound = socket.recv() => match inbound {
                Some(Ok(Message::Text(text))) => {
                    context.handle_message(id, text.as_str()).await;
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    tracing::debug!(%err, subscriber = %id, "websocket receive failed");
                    break;
                }
            },
        }
    }

    context.detach(id);
    tracing::debug!(thing = %context.name(), subscriber = %id, "websocket detached");
}
