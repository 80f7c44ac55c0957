//! `run` subcommand: resolve the run parameters, then hand over to the
//! orchestrator until the cycles are done or Ctrl+C is pressed.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::prompt::{ask_cycles, ask_workers};
use crate::chat::TelegramChatClient;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::sender::stats::{valid_workers, CycleCount, RunStats, MAX_WORKERS};
use crate::sender::{DryRunClient, Orchestrator, RunConfig, TracingReporter};

/// Command-line overrides for a run. `None` falls back to config, then to
/// an interactive prompt.
#[derive(Debug, Clone, Default)]
pub struct SendArgs {
    pub cycles: Option<u32>,
    pub workers: Option<usize>,
    pub groups: Option<PathBuf>,
    pub messages: Option<PathBuf>,
    pub dry_run: bool,
}

/// Resolve the cycle count. `Ok(None)` means exit without sending.
pub fn resolve_cycles<R: BufRead, W: Write>(
    preset: Option<u32>,
    input: &mut R,
    out: &mut W,
) -> Result<Option<CycleCount>> {
    match preset {
        Some(0) => Ok(None),
        Some(raw) => CycleCount::from_raw(raw).map(Some).ok_or_else(|| {
            Error::InvalidArgument(format!(
                "cycles must be 1..=998 or 999 for unbounded, got {}",
                raw
            ))
        }),
        None => ask_cycles(input, out),
    }
}

/// Resolve the worker count. `Ok(None)` means exit without sending.
pub fn resolve_workers<R: BufRead, W: Write>(
    preset: Option<usize>,
    input: &mut R,
    out: &mut W,
) -> Result<Option<usize>> {
    match preset {
        Some(workers) if valid_workers(workers) => Ok(Some(workers)),
        Some(workers) => Err(Error::InvalidArgument(format!(
            "workers must be 1..={}, got {}",
            MAX_WORKERS, workers
        ))),
        None => ask_workers(input, out),
    }
}

/// Build the run parameters from config and overrides.
pub fn run_config(
    config: &Config,
    args: &SendArgs,
    cycles: CycleCount,
    workers: usize,
) -> Result<RunConfig> {
    let delays = config.delay_policy()?;
    Ok(RunConfig {
        phone: config.phone.clone(),
        groups_file: args
            .groups
            .clone()
            .unwrap_or_else(|| config.groups_file.clone()),
        messages_file: args
            .messages
            .clone()
            .unwrap_or_else(|| config.messages_file.clone()),
        cycles,
        workers,
        delays,
    })
}

/// Take cycles and workers from flags or config, prompting for the rest.
fn ask_missing(config: &Config, args: &SendArgs) -> Result<Option<(CycleCount, usize)>> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout();

    let Some(cycles) = resolve_cycles(args.cycles.or(config.cycles), &mut input, &mut out)? else {
        return Ok(None);
    };
    let Some(workers) = resolve_workers(args.workers.or(config.workers), &mut input, &mut out)?
    else {
        return Ok(None);
    };
    Ok(Some((cycles, workers)))
}

/// What a Ctrl+C means at this point of the command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Interrupt {
    /// Still prompting: leave without sending.
    Exit,
    /// First signal while sending: let in-flight sends finish.
    Stop,
    /// Signal after a stop was already requested.
    ForceQuit,
}

fn interrupt_action(sending: bool, stop_requested: bool) -> Interrupt {
    match (sending, stop_requested) {
        (false, _) => Interrupt::Exit,
        (true, false) => Interrupt::Stop,
        (true, true) => Interrupt::ForceQuit,
    }
}

/// Exit code for a forced quit (SIGINT convention).
const FORCE_QUIT_CODE: i32 = 130;

/// Ctrl+C handling for the whole command, see [`interrupt_action`].
fn spawn_stop_listener(stop: CancellationToken, sending: Arc<AtomicBool>) {
    tokio::spawn(async move {
        loop {
            if let Err(e) = signal::ctrl_c().await {
                warn!("Failed to listen for Ctrl+C: {}", e);
                return;
            }
            match interrupt_action(sending.load(Ordering::SeqCst), stop.is_cancelled()) {
                Interrupt::Exit => {
                    println!("\n👋 Exiting...");
                    process::exit(0);
                }
                Interrupt::Stop => {
                    warn!("⏹️ Stop requested, finishing current sends (Ctrl+C again to quit now)");
                    stop.cancel();
                }
                Interrupt::ForceQuit => {
                    warn!("⛔ Forced quit");
                    process::exit(FORCE_QUIT_CODE);
                }
            }
        }
    });
}

/// Returns `None` when the user chose not to send anything.
pub async fn run(config: Config, args: SendArgs) -> Result<Option<RunStats>> {
    if !args.dry_run {
        config.validate_credentials()?;
    }

    let stop = CancellationToken::new();
    let sending = Arc::new(AtomicBool::new(false));
    spawn_stop_listener(stop.clone(), sending.clone());

    let Some((cycles, workers)) = ask_missing(&config, &args)? else {
        println!("👋 Nothing sent");
        return Ok(None);
    };

    let run_config = run_config(&config, &args, cycles, workers)?;
    info!(
        groups = %run_config.groups_file.display(),
        messages = %run_config.messages_file.display(),
        %cycles,
        workers,
        dry_run = args.dry_run,
        "Starting sender"
    );

    sending.store(true, Ordering::SeqCst);

    let reporter = TracingReporter;
    let orchestrator = Orchestrator::new(run_config, &reporter, stop);

    let totals = if args.dry_run {
        let mut client = DryRunClient::new();
        orchestrator.run(&mut client).await?
    } else {
        let mut client = TelegramChatClient::new(config);
        orchestrator.run(&mut client).await?
    };

    Ok(Some(totals))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn no_input() -> Cursor<&'static [u8]> {
        Cursor::new(&[][..])
    }

    #[test]
    fn preset_cycles_skip_the_prompt() {
        let mut out = Vec::new();
        let cycles = resolve_cycles(Some(4), &mut no_input(), &mut out).unwrap();
        assert_eq!(cycles, Some(CycleCount::Finite(4)));
        assert!(out.is_empty());

        let cycles = resolve_cycles(Some(999), &mut no_input(), &mut out).unwrap();
        assert_eq!(cycles, Some(CycleCount::Unbounded));
    }

    #[test]
    fn preset_zero_cycles_exits() {
        let mut out = Vec::new();
        assert_eq!(resolve_cycles(Some(0), &mut no_input(), &mut out).unwrap(), None);
    }

    #[test]
    fn preset_cycles_out_of_range_is_rejected() {
        let mut out = Vec::new();
        let err = resolve_cycles(Some(1000), &mut no_input(), &mut out).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn missing_cycles_fall_back_to_prompt() {
        let mut out = Vec::new();
        let mut input = Cursor::new(&b"2\n"[..]);
        let cycles = resolve_cycles(None, &mut input, &mut out).unwrap();
        assert_eq!(cycles, Some(CycleCount::Finite(2)));
        assert!(!out.is_empty());
    }

    #[test]
    fn interrupt_exits_while_prompting() {
        assert_eq!(interrupt_action(false, false), Interrupt::Exit);
        assert_eq!(interrupt_action(false, true), Interrupt::Exit);
    }

    #[test]
    fn second_interrupt_while_sending_forces_quit() {
        assert_eq!(interrupt_action(true, false), Interrupt::Stop);
        assert_eq!(interrupt_action(true, true), Interrupt::ForceQuit);
    }

    #[test]
    fn preset_workers_are_validated() {
        let mut out = Vec::new();
        assert_eq!(resolve_workers(Some(10), &mut no_input(), &mut out).unwrap(), Some(10));
        assert!(matches!(
            resolve_workers(Some(0), &mut no_input(), &mut out),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            resolve_workers(Some(11), &mut no_input(), &mut out),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn run_config_prefers_cli_paths() {
        let config = Config::default();
        let args = SendArgs {
            groups: Some(PathBuf::from("vip_groups.txt")),
            ..Default::default()
        };
        let rc = run_config(&config, &args, CycleCount::Finite(1), 2).unwrap();
        assert_eq!(rc.groups_file, PathBuf::from("vip_groups.txt"));
        assert_eq!(rc.messages_file, config.messages_file);
        assert_eq!(rc.workers, 2);
    }
}
