//! Pacing driver task
//!
//! One task per pipeline sleeps until the pacing queue's next deadline and
//! then ticks the core. Whenever the core may have moved its deadline, the
//! task is woken through [`Shared::timer`] and re-reads it; a deadline cleared
//! by a reset simply never fires.

use std::sync::Arc;

use tokio::time::{Instant, sleep_until};

use super::Shared;

pub(super) async fn pacing_driver(shared: Arc<Shared>) {
    loop {
        let deadline = shared.core.lock().deadline();

        match deadline {
            Some(deadline) => {
                tokio::select! {
                    () = shared.shutdown.cancelled() => break,
                    () = shared.timer.notified() => {}
                    () = sleep_until(deadline) => shared.tick(Instant::now()),
                }
            }
            None => {
                tokio::select! {
                    () = shared.shutdown.cancelled() => break,
                    () = shared.timer.notified() => {}
                }
            }
        }
    }
    log::debug!("Pacing driver stopped");
}
