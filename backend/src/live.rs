//! Interval-driven result updates for live viewers.
//!
//! Each tick takes a fresh snapshot through the service; no store lock
//! outlives a tick. Dropping the stream stops it.

use std::collections::HashMap;
use std::time::Duration;
use futures::stream::{self, Stream};
use shared::{AggregationService, PollError, PollResult};
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::debug;

/// Snapshots of `poll_id` every `period`, skipping ticks where no count
/// changed. The first snapshot is yielded immediately. The stream ends after
/// yielding an error.
pub fn result_updates(
    service: AggregationService,
    poll_id: String,
    period: Duration,
) -> impl Stream<Item = Result<PollResult, PollError>> {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let state: Option<(Interval, Option<HashMap<String, u64>>)> = Some((ticker, None));

    stream::unfold(state, move |state| {
        let service = service.clone();
        let poll_id = poll_id.clone();
        async move {
            let (mut ticker, mut last) = state?;
            loop {
                if last.is_some() {
                    ticker.tick().await;
                }
                match service.results(&poll_id) {
                    Ok(result) if last.as_ref() == Some(&result.results) => continue,
                    Ok(result) => {
                        debug!(poll_id = %poll_id, total = result.total_votes, "Pushing live update");
                        last = Some(result.results.clone());
                        return Some((Ok(result), Some((ticker, last))));
                    }
                    Err(e) => return Some((Err(e), None)),
                }
            }
        }
    })
}
