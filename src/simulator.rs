//! Synthetic traffic for the default channel
//!
//! A timer task that keeps the "general" channel visibly alive: on each
//! tick, if anyone is subscribed, it picks a pseudo-user and a canned line
//! at random and submits the message through the ordinary broadcast intake.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::config::DEFAULT_CHANNEL;
use crate::hub::HubHandle;
use crate::message::{current_timestamp, Message, MessageKind};

/// A fixed pseudo-identity used for simulated traffic
#[derive(Debug)]
struct SimulatedUser {
    username: &'static str,
    user_id: &'static str,
}

/// Roster of pseudo-users with pinned ids
const SIMULATED_USERS: [SimulatedUser; 3] = [
    SimulatedUser {
        username: "ChatBot",
        user_id: "550e8400-e29b-41d4-a716-446655440001",
    },
    SimulatedUser {
        username: "Developer",
        user_id: "550e8400-e29b-41d4-a716-446655440002",
    },
    SimulatedUser {
        username: "SystemHelper",
        user_id: "550e8400-e29b-41d4-a716-446655440003",
    },
];

/// Canned lines for simulated messages
const SIMULATED_LINES: [&str; 18] = [
    "Welcome to the chat! 👋",
    "How's everyone doing today?",
    "This is a simulated message to keep the chat active",
    "Feel free to join the conversation!",
    "Testing the WebSocket connection...",
    "Anyone else working on Rust projects?",
    "The weather is nice today ☀️",
    "Don't forget to stay hydrated! 💧",
    "What's your favorite programming language?",
    "This chat supports multiple channels",
    "WebSocket connections are pretty cool!",
    "Hope you're having a great day! 😊",
    "Remember to take breaks while coding",
    "Coffee or tea? ☕",
    "The server is running smoothly",
    "Cross-origin requests work perfectly here",
    "Real-time messaging is awesome!",
    "Thanks for testing the chat system",
];

/// Build one simulated message from the given random source
///
/// Pure function of the rng: user and line are chosen uniformly, the
/// timestamp is stamped at call time, and the target is always the
/// default channel.
pub fn synthesize<R: Rng + ?Sized>(rng: &mut R) -> Message {
    let user = &SIMULATED_USERS[rng.gen_range(0..SIMULATED_USERS.len())];
    let line = SIMULATED_LINES[rng.gen_range(0..SIMULATED_LINES.len())];

    Message {
        kind: MessageKind::Chat,
        username: user.username.to_string(),
        user_id: Some(user.user_id.to_string()),
        content: line.to_string(),
        timestamp: current_timestamp(),
        channel: DEFAULT_CHANNEL.to_string(),
    }
}

/// Run the simulator timer task
///
/// Ticks at a fixed interval and broadcasts only when at least one
/// connection is subscribed to the default channel. Never registers or
/// unregisters connections.
pub async fn run(hub: HubHandle, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    // The first tick completes immediately; consume it so simulated
    // traffic starts one full interval after startup.
    ticker.tick().await;

    let mut rng = StdRng::from_entropy();

    loop {
        ticker.tick().await;

        if !hub.has_subscriber(DEFAULT_CHANNEL).await {
            continue;
        }

        let message = synthesize(&mut rng);
        info!(
            channel = %message.channel,
            username = %message.username,
            content = %message.content,
            "simulated message"
        );

        if hub.broadcast(message).await.is_err() {
            break;
        }
    }

    debug!("simulator stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::Connection;
    use crate::hub::Hub;
    use crate::types::ConnectionId;
    use tokio::sync::mpsc;

    #[test]
    fn test_synthesize_is_deterministic_for_a_seed() {
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        let first = synthesize(&mut a);
        let second = synthesize(&mut b);
        assert_eq!(first.username, second.username);
        assert_eq!(first.user_id, second.user_id);
        assert_eq!(first.content, second.content);
    }

    #[test]
    fn test_synthesize_picks_from_roster() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            let msg = synthesize(&mut rng);
            assert_eq!(msg.kind, MessageKind::Chat);
            assert_eq!(msg.channel, DEFAULT_CHANNEL);
            let user_id = msg.user_id.as_deref().unwrap();
            let user = SIMULATED_USERS
                .iter()
                .find(|u| u.user_id == user_id)
                .expect("unknown simulated user id");
            assert_eq!(msg.username, user.username);
            assert!(SIMULATED_LINES.contains(&msg.content.as_str()));
            assert!(chrono::DateTime::parse_from_rfc3339(&msg.timestamp).is_ok());
        }
    }

    #[tokio::test]
    async fn test_simulated_traffic_skips_other_channels() {
        let (hub, handle) = Hub::new(16);
        tokio::spawn(hub.run());

        let (general_tx, mut general_rx) = mpsc::channel(8);
        let (random_tx, mut random_rx) = mpsc::channel(8);
        handle
            .register(Connection::new(
                ConnectionId::new(),
                "GeneralUser".to_string(),
                "general".to_string(),
                general_tx,
            ))
            .await
            .unwrap();
        handle
            .register(Connection::new(
                ConnectionId::new(),
                "RandomUser".to_string(),
                "random".to_string(),
                random_tx,
            ))
            .await
            .unwrap();
        general_rx.recv().await.unwrap();
        random_rx.recv().await.unwrap();

        let mut rng = StdRng::seed_from_u64(1);
        handle.broadcast(synthesize(&mut rng)).await.unwrap();

        let delivered = general_rx.recv().await.unwrap();
        assert_eq!(delivered.channel, "general");
        assert!(random_rx.try_recv().is_err());
    }
}
