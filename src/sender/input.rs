//! Group and message list loading.
//!
//! Both loaders never fail: a missing or unreadable file is reported and
//! yields an empty list, which the orchestrator treats as fatal.

use std::fs;
use std::path::Path;

use super::report::{Event, Reporter};

/// Destination as written in `groups.txt` (URL, `@handle` or bare name).
pub type GroupTarget = String;

/// One message body from `messages.txt`.
pub type MessageCandidate = String;

/// Prefixes stripped from invite-style links. The first one is canonical.
const LINK_PREFIXES: &[&str] = &["https://t.me/", "http://t.me/", "t.me/"];

/// Number of characters shown in progress lines.
const PREVIEW_CHARS: usize = 50;

/// Read one target per non-blank line, trimmed, in file order.
pub fn load_groups(path: &Path, reporter: &dyn Reporter) -> Vec<GroupTarget> {
    match fs::read_to_string(path) {
        Ok(content) => {
            let groups = parse_groups(&content);
            reporter.report(&Event::GroupsLoaded {
                path,
                count: groups.len(),
            });
            groups
        }
        Err(e) => {
            reporter.report(&Event::LoadFailed {
                path,
                reason: e.to_string(),
            });
            Vec::new()
        }
    }
}

/// Read message bodies separated by a blank line.
pub fn load_messages(path: &Path, reporter: &dyn Reporter) -> Vec<MessageCandidate> {
    match fs::read_to_string(path) {
        Ok(content) => {
            let messages = parse_messages(&content);
            reporter.report(&Event::MessagesLoaded {
                path,
                count: messages.len(),
            });
            messages
        }
        Err(e) => {
            reporter.report(&Event::LoadFailed {
                path,
                reason: e.to_string(),
            });
            Vec::new()
        }
    }
}

pub fn parse_groups(content: &str) -> Vec<GroupTarget> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn parse_messages(content: &str) -> Vec<MessageCandidate> {
    content
        .replace("\r\n", "\n")
        .split("\n\n")
        .map(str::trim)
        .filter(|msg| !msg.is_empty())
        .map(str::to_string)
        .collect()
}

/// Turn a group line into something the client can resolve.
///
/// `https://t.me/name?x=1` becomes `name`; `@handle` and anything else pass
/// through unchanged.
pub fn normalize_identifier(raw: &str) -> &str {
    for prefix in LINK_PREFIXES {
        if let Some(rest) = raw.strip_prefix(prefix) {
            let rest = rest.split('?').next().unwrap_or(rest);
            return rest.trim_end_matches('/');
        }
    }
    raw
}

/// First characters of a message for progress output.
pub fn preview(message: &str) -> String {
    let mut chars = message.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}
