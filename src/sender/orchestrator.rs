//! Cycle orchestrator: connect, load, then shuffle/partition/dispatch cycles
//! until the configured count is reached or a stop is requested.

use std::path::PathBuf;
use std::time::Instant;

use chrono::Local;
use futures::future::join_all;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use super::batch::{partition, shuffled};
use super::client::ChatClient;
use super::delay::DelayPolicy;
use super::input::{load_groups, load_messages};
use super::report::{Event, Reporter};
use super::stats::{CycleCount, CycleStats, RunStats};
use super::worker::Dispatch;
use crate::error::{Error, Result};

/// What to send, where from, and how often.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub phone: String,
    pub groups_file: PathBuf,
    pub messages_file: PathBuf,
    pub cycles: CycleCount,
    pub workers: usize,
    pub delays: DelayPolicy,
}

pub struct Orchestrator<'r> {
    config: RunConfig,
    reporter: &'r dyn Reporter,
    stop: CancellationToken,
}

impl<'r> Orchestrator<'r> {
    pub fn new(config: RunConfig, reporter: &'r dyn Reporter, stop: CancellationToken) -> Self {
        Self {
            config,
            reporter,
            stop,
        }
    }

    /// Run to completion. `disconnect` is called exactly once, whatever the
    /// outcome, and a final summary is always reported.
    pub async fn run<C: ChatClient>(&self, client: &mut C) -> Result<RunStats> {
        let result = self.drive(client).await;
        client.disconnect().await;
        result
    }

    async fn drive<C: ChatClient>(&self, client: &mut C) -> Result<RunStats> {
        let mut totals = RunStats::default();

        if let Err(e) = client.connect(&self.config.phone).await {
            return Err(self.abort(e, &totals, 0));
        }
        self.reporter.report(&Event::Connected);

        let groups = load_groups(&self.config.groups_file, self.reporter);
        let messages = load_messages(&self.config.messages_file, self.reporter);
        if groups.is_empty() {
            let err = Error::EmptyInput(format!(
                "group list {} is empty",
                self.config.groups_file.display()
            ));
            return Err(self.abort(err, &totals, 0));
        }
        if messages.is_empty() {
            let err = Error::EmptyInput(format!(
                "message list {} is empty",
                self.config.messages_file.display()
            ));
            return Err(self.abort(err, &totals, groups.len()));
        }

        self.reporter.report(&Event::RunStarted {
            groups: groups.len(),
            messages: messages.len(),
            cycles: self.config.cycles,
            workers: self.config.workers,
        });

        let dispatch = Dispatch {
            client: &*client,
            messages: &messages,
            delays: &self.config.delays,
            stop: &self.stop,
            reporter: self.reporter,
        };

        let mut cycle: u64 = 0;
        loop {
            if self.stop.is_cancelled() {
                self.reporter.report(&Event::StopRequested);
                break;
            }
            cycle += 1;

            let order = shuffled(&groups, &mut rand::thread_rng());
            let batches = partition(&order, self.config.workers);
            self.reporter.report(&Event::CycleStarted {
                cycle,
                cycles: self.config.cycles,
                batches: batches.len(),
            });

            let started = Instant::now();
            let per_worker =
                join_all(batches.iter().map(|batch| dispatch.run(batch, order.len()))).await;
            let stats: CycleStats = per_worker.into_iter().sum();

            if stats.attempts() < order.len() {
                totals.record_interrupted(stats);
                self.reporter.report(&Event::CycleInterrupted { cycle, stats });
                self.reporter.report(&Event::StopRequested);
                break;
            }

            totals.record_cycle(stats);
            self.reporter.report(&Event::CycleFinished {
                cycle,
                cycles: self.config.cycles,
                stats,
                totals: &totals,
                groups: order.len(),
                batches: batches.len(),
                elapsed: started.elapsed(),
            });

            if !self.config.cycles.has_more_after(cycle) {
                break;
            }
            if self.stop.is_cancelled() {
                self.reporter.report(&Event::StopRequested);
                break;
            }

            let delay = self.config.delays.between_cycles(&mut rand::thread_rng());
            let resume_at = chrono::Duration::from_std(delay)
                .map(|d| Local::now() + d)
                .unwrap_or_else(|_| Local::now());
            self.reporter.report(&Event::WaitingForNextCycle {
                next_cycle: cycle + 1,
                cycles: self.config.cycles,
                delay,
                resume_at,
            });

            tokio::select! {
                _ = sleep(delay) => {}
                _ = self.stop.cancelled() => {
                    self.reporter.report(&Event::StopRequested);
                    break;
                }
            }
        }

        self.finish(&totals, groups.len());
        Ok(totals)
    }

    fn abort(&self, err: Error, totals: &RunStats, groups: usize) -> Error {
        let reason = err.to_string();
        self.reporter.report(&Event::Aborted { reason: &reason });
        self.finish(totals, groups);
        err
    }

    fn finish(&self, totals: &RunStats, groups: usize) {
        self.reporter.report(&Event::RunFinished {
            totals,
            groups,
            workers: self.config.workers,
            cycles: self.config.cycles,
        });
    }
}
