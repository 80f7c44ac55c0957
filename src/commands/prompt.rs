//! Line-based prompts for the cycle and worker counts.
//!
//! Generic over the reader/writer so the dialogue can be scripted in tests.
//! `Ok(None)` means the user chose to exit (or closed stdin).

use std::io::{BufRead, Write};

use crate::error::Result;
use crate::sender::stats::{valid_workers, CycleCount, MAX_FINITE_CYCLES, MAX_WORKERS, UNBOUNDED_SENTINEL};

const RULE_WIDTH: usize = 50;
/// Worker counts above this ask for confirmation.
const SAFE_WORKERS: usize = 3;
const YES: &[&str] = &["y", "yes", "так", "т"];

/// Print `prompt`, read one line. `None` on end of input.
fn read_answer<R: BufRead, W: Write>(input: &mut R, out: &mut W, prompt: &str) -> Result<Option<String>> {
    write!(out, "{}", prompt)?;
    out.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn confirm<R: BufRead, W: Write>(input: &mut R, out: &mut W, question: &str) -> Result<Option<bool>> {
    Ok(read_answer(input, out, question)?
        .map(|answer| YES.contains(&answer.to_lowercase().as_str())))
}

/// Ask how many cycles to run: `1..=998`, `999` for unbounded, `0` to exit.
pub fn ask_cycles<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> Result<Option<CycleCount>> {
    loop {
        writeln!(out, "\n{}", "=".repeat(RULE_WIDTH))?;
        writeln!(out, "🔄 SENDING CYCLES")?;
        writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
        writeln!(out, "1️⃣  Enter 1 to {} - number of cycles", MAX_FINITE_CYCLES)?;
        writeln!(out, "♾️  Enter {} - send until stopped", UNBOUNDED_SENTINEL)?;
        writeln!(out, "❌ Enter 0 - exit")?;
        writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;

        let Some(answer) = read_answer(input, out, "Number of cycles: ")? else {
            writeln!(out, "\n👋 Exiting...")?;
            return Ok(None);
        };

        if answer.is_empty() {
            writeln!(out, "❌ Empty input! Try again.")?;
            continue;
        }

        let Ok(raw) = answer.parse::<u32>() else {
            writeln!(out, "❌ Not a number! Try again.")?;
            continue;
        };

        if raw == 0 {
            writeln!(out, "👋 Exiting...")?;
            return Ok(None);
        }

        match CycleCount::from_raw(raw) {
            Some(CycleCount::Unbounded) => {
                writeln!(out, "♾️ UNBOUNDED mode selected!")?;
                writeln!(out, "⚠️ Use Ctrl+C to stop")?;
                match confirm(input, out, "Confirm? (y/n): ")? {
                    Some(true) => return Ok(Some(CycleCount::Unbounded)),
                    Some(false) => continue,
                    None => return Ok(None),
                }
            }
            Some(finite) => {
                writeln!(out, "✅ {} cycles selected", finite)?;
                return Ok(Some(finite));
            }
            None => {
                writeln!(
                    out,
                    "❌ Out of range! Enter 1 to {}, or {} for unbounded sending.",
                    MAX_FINITE_CYCLES, UNBOUNDED_SENTINEL
                )?;
            }
        }
    }
}

/// Ask how many workers to use: `1..=10`, empty for 1.
pub fn ask_workers<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> Result<Option<usize>> {
    loop {
        writeln!(out, "\n{}", "=".repeat(RULE_WIDTH))?;
        writeln!(out, "🧵 CONCURRENT WORKERS")?;
        writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
        writeln!(out, "1️⃣  Enter 1 to {} - number of workers", MAX_WORKERS)?;
        writeln!(out, "⚠️  Recommended: 1-{} to avoid account limits", SAFE_WORKERS)?;
        writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;

        let Some(answer) = read_answer(input, out, "Number of workers (default 1): ")? else {
            writeln!(out, "\n👋 Exiting...")?;
            return Ok(None);
        };

        if answer.is_empty() {
            writeln!(out, "✅ Using 1 worker")?;
            return Ok(Some(1));
        }

        let Ok(workers) = answer.parse::<usize>() else {
            writeln!(out, "❌ Not a number! Try again.")?;
            continue;
        };

        if !valid_workers(workers) {
            writeln!(out, "❌ Out of range! Enter 1 to {}.", MAX_WORKERS)?;
            continue;
        }

        if workers > SAFE_WORKERS {
            writeln!(
                out,
                "⚠️ WARNING: more than {} workers may get the account limited!",
                SAFE_WORKERS
            )?;
            match confirm(input, out, "Continue? (y/n): ")? {
                Some(true) => {}
                Some(false) => continue,
                None => return Ok(None),
            }
        }

        writeln!(out, "✅ {} workers selected", workers)?;
        return Ok(Some(workers));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn cycles(script: &str) -> Option<CycleCount> {
        let mut out = Vec::new();
        ask_cycles(&mut Cursor::new(script.as_bytes()), &mut out).unwrap()
    }

    fn workers(script: &str) -> Option<usize> {
        let mut out = Vec::new();
        ask_workers(&mut Cursor::new(script.as_bytes()), &mut out).unwrap()
    }

    #[test]
    fn cycles_accepts_finite_values() {
        assert_eq!(cycles("3\n"), Some(CycleCount::Finite(3)));
        assert_eq!(cycles("  998 \n"), Some(CycleCount::Finite(998)));
    }

    #[test]
    fn cycles_zero_exits() {
        assert_eq!(cycles("0\n"), None);
    }

    #[test]
    fn cycles_reprompts_on_bad_input() {
        assert_eq!(cycles("\nabc\n-1\n1000\n2\n"), Some(CycleCount::Finite(2)));
    }

    #[test]
    fn cycles_unbounded_needs_confirmation() {
        assert_eq!(cycles("999\ny\n"), Some(CycleCount::Unbounded));
        assert_eq!(cycles("999\nТак\n"), Some(CycleCount::Unbounded));
        assert_eq!(cycles("999\nn\n5\n"), Some(CycleCount::Finite(5)));
    }

    #[test]
    fn cycles_end_of_input_exits() {
        assert_eq!(cycles(""), None);
        assert_eq!(cycles("\n\n"), None);
        assert_eq!(cycles("999\n"), None);
    }

    #[test]
    fn cycles_prompt_mentions_options() {
        let mut out = Vec::new();
        ask_cycles(&mut Cursor::new("1\n".as_bytes()), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("999"));
        assert!(text.contains("Enter 0"));
    }

    #[test]
    fn workers_default_is_one() {
        assert_eq!(workers("\n"), Some(1));
    }

    #[test]
    fn workers_in_safe_range_need_no_confirmation() {
        assert_eq!(workers("3\n"), Some(3));
    }

    #[test]
    fn workers_above_three_need_confirmation() {
        assert_eq!(workers("5\nyes\n"), Some(5));
        assert_eq!(workers("5\nno\n2\n"), Some(2));
    }

    #[test]
    fn workers_reprompt_on_bad_input() {
        assert_eq!(workers("0\n11\nfour\n4\nт\n"), Some(4));
    }

    #[test]
    fn workers_end_of_input_exits() {
        assert_eq!(workers(""), None);
        assert_eq!(workers("7\n"), None);
    }
}
