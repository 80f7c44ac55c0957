//! Tests for the interactive run prompts

use std::io::Cursor;

use telegram_sender::commands::prompt::{ask_cycles, ask_workers};
use telegram_sender::commands::send::{resolve_cycles, resolve_workers};
use telegram_sender::CycleCount;

fn answer_cycles(script: &str) -> (Option<CycleCount>, String) {
    let mut out = Vec::new();
    let result = ask_cycles(&mut Cursor::new(script.as_bytes()), &mut out).expect("prompt");
    (result, String::from_utf8(out).expect("utf-8 output"))
}

#[test]
fn test_cycles_full_dialogue() {
    let (cycles, output) = answer_cycles("\nten\n1200\n999\nn\n7\n");
    assert_eq!(cycles, Some(CycleCount::Finite(7)));
    assert!(output.contains("Empty input"));
    assert!(output.contains("Not a number"));
    assert!(output.contains("Out of range"));
    assert!(output.contains("UNBOUNDED"));
}

#[test]
fn test_cycles_exit_choice() {
    let (cycles, output) = answer_cycles("0\n");
    assert_eq!(cycles, None);
    assert!(output.contains("Exiting"));
}

#[test]
fn test_workers_dialogue_with_confirmation() {
    let mut out = Vec::new();
    let workers = ask_workers(&mut Cursor::new(&b"12\n6\ny\n"[..]), &mut out).expect("prompt");
    assert_eq!(workers, Some(6));
    assert!(String::from_utf8(out).unwrap().contains("WARNING"));
}

#[test]
fn test_flags_bypass_prompts() {
    let mut out = Vec::new();
    let mut empty = Cursor::new(&[][..]);
    assert_eq!(
        resolve_cycles(Some(999), &mut empty, &mut out).unwrap(),
        Some(CycleCount::Unbounded)
    );
    assert_eq!(resolve_workers(Some(4), &mut empty, &mut out).unwrap(), Some(4));
    assert!(out.is_empty());
}
