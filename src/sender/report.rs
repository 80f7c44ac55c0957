//! Progress events and the sinks that render them.
//!
//! Components never log directly; they hand typed [`Event`]s to a
//! [`Reporter`] passed in by the caller.

use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Local};
use tracing::{error, info, warn};

use super::client::SendOutcome;
use super::stats::{CycleCount, CycleStats, RunStats};
use crate::metrics;

const RULE_WIDTH: usize = 60;
const SUMMARY_RULE_WIDTH: usize = 50;

#[derive(Debug)]
pub enum Event<'a> {
    GroupsLoaded {
        path: &'a Path,
        count: usize,
    },
    MessagesLoaded {
        path: &'a Path,
        count: usize,
    },
    LoadFailed {
        path: &'a Path,
        reason: String,
    },
    Connected,
    RunStarted {
        groups: usize,
        messages: usize,
        cycles: CycleCount,
        workers: usize,
    },
    CycleStarted {
        cycle: u64,
        cycles: CycleCount,
        batches: usize,
    },
    Sending {
        worker: usize,
        index: usize,
        total: usize,
        target: &'a str,
        preview: &'a str,
    },
    SendResult {
        worker: usize,
        target: &'a str,
        outcome: &'a SendOutcome,
    },
    Pause {
        worker: usize,
        delay: Duration,
    },
    WorkerFinished {
        worker: usize,
        stats: CycleStats,
    },
    CycleFinished {
        cycle: u64,
        cycles: CycleCount,
        stats: CycleStats,
        totals: &'a RunStats,
        groups: usize,
        batches: usize,
        elapsed: Duration,
    },
    CycleInterrupted {
        cycle: u64,
        stats: CycleStats,
    },
    WaitingForNextCycle {
        next_cycle: u64,
        cycles: CycleCount,
        delay: Duration,
        resume_at: DateTime<Local>,
    },
    StopRequested,
    Aborted {
        reason: &'a str,
    },
    RunFinished {
        totals: &'a RunStats,
        groups: usize,
        workers: usize,
        cycles: CycleCount,
    },
}

/// Observability sink threaded through the loader, workers and orchestrator.
pub trait Reporter: Send + Sync {
    fn report(&self, event: &Event<'_>);
}

/// Drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn report(&self, _event: &Event<'_>) {}
}

/// Keeps a one-line rendering of each event, for tests and previews.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    lines: Mutex<Vec<String>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    /// Lines whose event name (text before the first space) equals `kind`.
    pub fn count(&self, kind: &str) -> usize {
        self.lines()
            .iter()
            .filter(|line| line.split_whitespace().next() == Some(kind))
            .count()
    }
}

impl Reporter for MemoryReporter {
    fn report(&self, event: &Event<'_>) {
        let line = match event {
            Event::GroupsLoaded { count, .. } => format!("GroupsLoaded {}", count),
            Event::MessagesLoaded { count, .. } => format!("MessagesLoaded {}", count),
            Event::LoadFailed { path, .. } => format!("LoadFailed {}", path.display()),
            Event::Connected => "Connected".to_string(),
            Event::RunStarted { groups, .. } => format!("RunStarted {}", groups),
            Event::CycleStarted { cycle, .. } => format!("CycleStarted {}", cycle),
            Event::Sending { worker, target, .. } => format!("Sending {} {}", worker, target),
            Event::SendResult { target, outcome, .. } => {
                format!("SendResult {} {}", target, outcome.is_delivered())
            }
            Event::Pause { worker, .. } => format!("Pause {}", worker),
            Event::WorkerFinished { worker, stats } => format!(
                "WorkerFinished {} {} {}",
                worker, stats.successful, stats.failed
            ),
            Event::CycleFinished { cycle, stats, .. } => format!(
                "CycleFinished {} {} {}",
                cycle, stats.successful, stats.failed
            ),
            Event::CycleInterrupted { cycle, stats } => format!(
                "CycleInterrupted {} {} {}",
                cycle, stats.successful, stats.failed
            ),
            Event::WaitingForNextCycle { next_cycle, .. } => {
                format!("WaitingForNextCycle {}", next_cycle)
            }
            Event::StopRequested => "StopRequested".to_string(),
            Event::Aborted { reason } => format!("Aborted {}", reason),
            Event::RunFinished { totals, .. } => format!(
                "RunFinished {} {} {}",
                totals.successful, totals.failed, totals.cycles_completed
            ),
        };
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line);
        }
    }
}

/// Renders events as `tracing` log lines and updates Prometheus counters.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, event: &Event<'_>) {
        match event {
            Event::GroupsLoaded { path, count } => {
                info!("Loaded {} groups from {}", count, path.display());
            }
            Event::MessagesLoaded { path, count } => {
                info!("Loaded {} messages from {}", count, path.display());
            }
            Event::LoadFailed { path, reason } => {
                error!("Failed to read {}: {}", path.display(), reason);
            }
            Event::Connected => info!("✅ Connected to Telegram"),
            Event::RunStarted {
                groups,
                messages,
                cycles,
                workers,
            } => {
                if cycles.is_unbounded() {
                    info!("🔄 Starting UNBOUNDED sending to {} groups", groups);
                    info!("⚠️ Press Ctrl+C to stop");
                } else {
                    info!("🔄 Starting sending to {} groups, cycles: {}", groups, cycles);
                }
                info!("🧵 Workers: {}, messages to pick from: {}", workers, messages);
            }
            Event::CycleStarted {
                cycle,
                cycles,
                batches,
            } => {
                info!("{}", "=".repeat(RULE_WIDTH));
                info!("🔄 CYCLE {}", cycle_label(*cycle, *cycles));
                info!("🧵 Starting {} workers, group order shuffled", batches);
                info!("{}", "=".repeat(RULE_WIDTH));
            }
            Event::Sending {
                worker,
                index,
                total,
                target,
                preview,
            } => {
                info!("[Worker {}] [{}/{}] Sending to group: {}", worker, index, total, target);
                info!("[Worker {}] Message: {}", worker, preview);
            }
            Event::SendResult {
                worker,
                target,
                outcome,
            } => {
                metrics::record_send(outcome);
                match outcome {
                    SendOutcome::Delivered => {
                        info!("✅ [Worker {}] Message sent to group: {}", worker, target)
                    }
                    SendOutcome::ResolutionFailed(reason) => error!(
                        "❌ [Worker {}] Could not resolve group {}: {}",
                        worker, target, reason
                    ),
                    SendOutcome::DeliveryFailed(reason) => error!(
                        "❌ [Worker {}] Failed to send to group {}: {}",
                        worker, target, reason
                    ),
                }
            }
            Event::Pause { worker, delay } => {
                info!("⏳ [Worker {}] Waiting {} seconds...", worker, delay.as_secs());
            }
            Event::WorkerFinished { worker, stats } => {
                info!(
                    "🧵 [Worker {}] finished: ✅{} ❌{}",
                    worker, stats.successful, stats.failed
                );
            }
            Event::CycleFinished {
                cycle,
                cycles,
                stats,
                totals,
                groups,
                batches,
                elapsed,
            } => {
                metrics::record_cycle(*elapsed);
                info!("{}", "-".repeat(SUMMARY_RULE_WIDTH));
                info!("📊 CYCLE {} STATISTICS:", cycle_label(*cycle, *cycles));
                info!("✅ Sent: {}", stats.successful);
                info!("❌ Failed: {}", stats.failed);
                info!("📝 Groups in cycle: {}", groups);
                info!("🧵 Workers used: {}", batches);
                info!("⏱️ Took: {}s", elapsed.as_secs());
                info!("📈 Overall: ✅{} ❌{}", totals.successful, totals.failed);
                info!("{}", "-".repeat(SUMMARY_RULE_WIDTH));
            }
            Event::CycleInterrupted { cycle, stats } => {
                warn!(
                    "🛑 Cycle {} interrupted after {} sends (✅{} ❌{})",
                    cycle,
                    stats.attempts(),
                    stats.successful,
                    stats.failed
                );
            }
            Event::WaitingForNextCycle {
                next_cycle,
                cycles,
                delay,
                resume_at,
            } => {
                info!(
                    "🕐 DELAY BETWEEN CYCLES: {} minutes ({} seconds)",
                    delay.as_secs() / 60,
                    delay.as_secs()
                );
                info!(
                    "⏰ Cycle {} starts at {}",
                    cycle_label(*next_cycle, *cycles),
                    resume_at.format("%H:%M:%S %d.%m.%Y")
                );
            }
            Event::StopRequested => {
                info!("{}", "=".repeat(RULE_WIDTH));
                warn!("⚠️ STOP SIGNAL RECEIVED (Ctrl+C)");
                info!("🛑 Stopping...");
                info!("{}", "=".repeat(RULE_WIDTH));
            }
            Event::Aborted { reason } => error!("Run aborted: {}", reason),
            Event::RunFinished {
                totals,
                groups,
                workers,
                cycles,
            } => {
                info!("{}", "=".repeat(RULE_WIDTH));
                info!("🏁 FINAL STATISTICS:");
                info!("✅ Total sent: {}", totals.successful);
                info!("❌ Total failed: {}", totals.failed);
                info!("🔄 Cycles completed: {}", totals.cycles_completed);
                if totals.interrupted.attempts() > 0 {
                    info!(
                        "🛑 Sends in interrupted cycle: {}",
                        totals.interrupted.attempts()
                    );
                }
                info!("📝 Groups per cycle: {}", groups);
                info!("🧵 Workers: {}", workers);
                info!("📊 Total send attempts: {}", totals.attempts());
                if cycles.is_unbounded() {
                    info!("♾️ Mode: UNBOUNDED");
                } else {
                    info!("🎯 Mode: FINITE ({} cycles)", cycles);
                }
                info!("{}", "=".repeat(RULE_WIDTH));
            }
        }
    }
}

fn cycle_label(cycle: u64, cycles: CycleCount) -> String {
    match cycles {
        CycleCount::Finite(total) => format!("{}/{}", cycle, total),
        CycleCount::Unbounded => format!("{} (UNBOUNDED)", cycle),
    }
}
