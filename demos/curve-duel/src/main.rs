//! Demo lobby server with a stand-in match driver.
//!
//! The real curve simulation is a separate subsystem; this demo wires
//! the lobby to a driver that simply lets each "match" run for a fixed
//! time and then reports completion, so the whole lobby lifecycle —
//! create, join, ready-up, handoff, match end, resync — can be
//! exercised with any WebSocket client:
//!
//! ```text
//! KURVE_ADDR=127.0.0.1:8020 cargo run -p curve-duel
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use kurve::prelude::*;
use kurve_match::{ConnectionSender, MatchError};
use tokio::task::JoinHandle;

/// How long a demo match lasts before the driver reports completion.
const MATCH_DURATION: Duration = Duration::from_secs(30);

/// A driver that plays every match as a fixed-length timer.
struct TimedMatchDriver {
    duration: Duration,
    next_id: AtomicU64,
    running: Mutex<HashMap<u64, JoinHandle<()>>>,
}

impl TimedMatchDriver {
    fn new(duration: Duration) -> Self {
        Self {
            duration,
            next_id: AtomicU64::new(1),
            running: Mutex::new(HashMap::new()),
        }
    }
}

impl MatchDriver for TimedMatchDriver {
    fn start(
        &self,
        seed: MatchSeed,
        on_end: kurve_match::MatchEndSender,
    ) -> Result<MatchHandle, MatchError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let handle = MatchHandle {
            id: MatchId(id),
            room: seed.room.clone(),
        };

        tracing::info!(
            room = %seed.room,
            players = seed.players.len(),
            id = %handle.id,
            "demo match started"
        );

        let duration = self.duration;
        let room = seed.room;
        let task = tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            let _ = on_end.send(MatchEnded { room });
        });

        if let Ok(mut running) = self.running.lock() {
            running.insert(id, task);
        }
        Ok(handle)
    }

    fn stop(&self, handle: &MatchHandle) {
        if let Ok(mut running) = self.running.lock() {
            if let Some(task) = running.remove(&handle.id.0) {
                task.abort();
                tracing::info!(id = %handle.id, "demo match stopped early");
            }
        }
    }

    fn attach(&self, handle: &MatchHandle, connection: ConnectionId, _sender: ConnectionSender) {
        // The timer "simulation" has nothing to send; a real driver
        // keeps the sender to stream match events.
        tracing::debug!(id = %handle.id, %connection, "connection attached to match");
    }

    fn detach(&self, handle: &MatchHandle, connection: ConnectionId) {
        tracing::debug!(id = %handle.id, %connection, "connection detached from match");
    }
}

#[tokio::main]
async fn main() -> Result<(), KurveError> {
    kurve::init_tracing();

    let addr = std::env::var("KURVE_ADDR").unwrap_or_else(|_| "127.0.0.1:8020".to_string());
    let driver = Arc::new(TimedMatchDriver::new(MATCH_DURATION));

    let server = KurveServerBuilder::new().bind(&addr).build(driver).await?;
    server.run().await
}
