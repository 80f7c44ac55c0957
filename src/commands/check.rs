//! `check` subcommand: load the input files and show what a run would use,
//! without connecting to Telegram.

use std::path::Path;

use crate::error::{Error, Result};
use crate::sender::input::preview;
use crate::sender::{load_groups, load_messages, normalize_identifier, Reporter};

/// What the loaders made of the input files.
#[derive(Debug, Default)]
pub struct CheckReport {
    /// `(as written, as looked up)` pairs.
    pub groups: Vec<(String, String)>,
    pub messages: Vec<String>,
}

impl CheckReport {
    pub fn is_ready(&self) -> bool {
        !self.groups.is_empty() && !self.messages.is_empty()
    }
}

pub fn inspect(groups_file: &Path, messages_file: &Path, reporter: &dyn Reporter) -> CheckReport {
    let groups = load_groups(groups_file, reporter)
        .into_iter()
        .map(|raw| {
            let lookup = normalize_identifier(&raw).to_string();
            (raw, lookup)
        })
        .collect();

    CheckReport {
        groups,
        messages: load_messages(messages_file, reporter),
    }
}

/// Print the report. Fails when there is nothing to send.
pub fn run(groups_file: &Path, messages_file: &Path, reporter: &dyn Reporter) -> Result<CheckReport> {
    let report = inspect(groups_file, messages_file, reporter);

    println!("\n📋 Groups ({}) from {}", report.groups.len(), groups_file.display());
    for (i, (raw, lookup)) in report.groups.iter().enumerate() {
        if raw == lookup {
            println!("  {:>3}. {}", i + 1, raw);
        } else {
            println!("  {:>3}. {} → {}", i + 1, raw, lookup);
        }
    }

    println!("\n💬 Messages ({}) from {}", report.messages.len(), messages_file.display());
    for (i, message) in report.messages.iter().enumerate() {
        println!("  {:>3}. {}", i + 1, preview(message).replace('\n', " "));
    }

    if report.groups.is_empty() {
        return Err(Error::EmptyInput(format!(
            "group list {} is empty",
            groups_file.display()
        )));
    }
    if report.messages.is_empty() {
        return Err(Error::EmptyInput(format!(
            "message list {} is empty",
            messages_file.display()
        )));
    }

    println!("\n✅ Ready to send");
    Ok(report)
}
