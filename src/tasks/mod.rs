//! Background jobs. Call `spawn_all` once during startup.

use crate::services::PayoutService;
use chrono::{Datelike, Utc};

const DAY: std::time::Duration = std::time::Duration::from_secs(24 * 3600);

/// Spawn all background tasks. Detached via `tokio::spawn`; does not block.
pub fn spawn_all(payout_service: PayoutService) {
    // payout digest for the previous month, on the 1st (UTC)
    tokio::spawn(async move {
        loop {
            let now = Utc::now();
            if now.day() == 1 {
                match payout_service.run_monthly(now).await {
                    Ok(n) if n > 0 => log::info!("Payout digests sent: {n}"),
                    Ok(_) => {}
                    Err(e) => log::error!("Failed to send payout digests: {e:?}"),
                }
            }
            tokio::time::sleep(DAY).await;
        }
    });
}
