//! Dispatch worker: walks one batch, one send per group.

use rand::seq::SliceRandom;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use super::batch::Batch;
use super::client::{ChatClient, SendOutcome};
use super::delay::DelayPolicy;
use super::input::{normalize_identifier, preview, MessageCandidate};
use super::report::{Event, Reporter};
use super::stats::CycleStats;

/// Everything a worker borrows from the orchestrator for one cycle.
pub struct Dispatch<'a, C: ChatClient> {
    pub client: &'a C,
    pub messages: &'a [MessageCandidate],
    pub delays: &'a DelayPolicy,
    pub stop: &'a CancellationToken,
    pub reporter: &'a dyn Reporter,
}

impl<C: ChatClient> Dispatch<'_, C> {
    /// Send one random message to every target of `batch`, in order.
    ///
    /// Failures are counted, never retried. A stop request ends the batch
    /// before the next target or during the pause; the send in flight is
    /// always allowed to finish.
    pub async fn run(&self, batch: &Batch<'_>, total_groups: usize) -> CycleStats {
        let mut stats = CycleStats::default();

        for (i, target) in batch.targets.iter().enumerate() {
            if self.stop.is_cancelled() {
                break;
            }
            let Some(message) = self.messages.choose(&mut rand::thread_rng()) else {
                break;
            };

            let shown = preview(message);
            self.reporter.report(&Event::Sending {
                worker: batch.worker_id,
                index: batch.offset + i + 1,
                total: total_groups,
                target,
                preview: &shown,
            });

            let outcome = self
                .client
                .deliver(normalize_identifier(target), message)
                .await;
            match outcome {
                SendOutcome::Delivered => stats.successful += 1,
                SendOutcome::ResolutionFailed(_) | SendOutcome::DeliveryFailed(_) => {
                    stats.failed += 1
                }
            }
            self.reporter.report(&Event::SendResult {
                worker: batch.worker_id,
                target,
                outcome: &outcome,
            });

            if i + 1 < batch.len() {
                let delay = self.delays.between_groups(&mut rand::thread_rng());
                self.reporter.report(&Event::Pause {
                    worker: batch.worker_id,
                    delay,
                });
                tokio::select! {
                    _ = sleep(delay) => {}
                    _ = self.stop.cancelled() => break,
                }
            }
        }

        self.reporter.report(&Event::WorkerFinished {
            worker: batch.worker_id,
            stats,
        });
        stats
    }
}
