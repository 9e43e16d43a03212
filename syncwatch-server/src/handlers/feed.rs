use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt, stream::SplitSink};
use syncwatch_model::StateFeedMessage;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::infra::app_state::AppState;

/// State feed upgrade. Followers receive the current state right away,
/// then every change, then a re-broadcast every heartbeat interval.
pub async fn feed_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut ws_sender, mut ws_receiver) = socket.split();

    let (mut updates, initial) = {
        let clock = state.clock.lock();
        (clock.subscribe(), clock.snapshot())
    };

    info!("follower connected to state feed");
    if send_state(&mut ws_sender, &initial).await.is_err() {
        return;
    }

    let period = state.heartbeat_interval;
    let mut heartbeat =
        tokio::time::interval_at(Instant::now() + period, period);
    heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        let outbound = tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                updates.borrow_and_update().clone()
            }
            _ = heartbeat.tick() => state.clock.lock().snapshot(),
            inbound = ws_receiver.next() => match inbound {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => continue,
                Some(Err(err)) => {
                    warn!(error = %err, "state feed socket error");
                    break;
                }
            },
        };

        if send_state(&mut ws_sender, &outbound).await.is_err() {
            break;
        }
    }

    info!("follower left state feed");
}

async fn send_state(
    sender: &mut SplitSink<WebSocket, Message>,
    message: &StateFeedMessage,
) -> Result<(), axum::Error> {
    let text = match serde_json::to_string(message) {
        Ok(text) => text,
        Err(err) => {
            warn!(error = %err, "failed to encode state feed message");
            return Ok(());
        }
    };
    sender.send(Message::Text(text.into())).await.inspect_err(|err| {
        debug!(error = %err, "state feed send failed");
    })
}
