use chrono::{DateTime, Utc};
use colored::Colorize;
use quicknote::api::{CmdMessage, MessageLevel};
use quicknote::commands::snapshots::SnapshotEntry;
use quicknote::model::{ContentKind, Document, DocumentId};
use timeago::Formatter;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const LINE_WIDTH: usize = 80;
const TIME_WIDTH: usize = 16;
const CURRENT_MARKER: &str = "▸";

pub fn print_message(level: MessageLevel, content: &str) {
    match level {
        MessageLevel::Info => println!("{}", content.dimmed()),
        MessageLevel::Success => println!("{}", content.green()),
        MessageLevel::Warning => println!("{}", content.yellow()),
        MessageLevel::Error => println!("{}", content.red()),
    }
}

pub fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        print_message(message.level, &message.content);
    }
}

pub fn print_tabs<'a>(documents: impl Iterator<Item = &'a Document>, current: Option<DocumentId>) {
    for (i, doc) in documents.enumerate() {
        let marker = if Some(doc.id) == current {
            CURRENT_MARKER
        } else {
            " "
        };
        let number = format!("{}. ", i + 1);
        let kind = match doc.kind {
            ContentKind::PlainText => "".normal(),
            ContentKind::RichText => " [html]".cyan(),
        };
        let label = doc.tab_label();
        let label = if doc.dirty {
            label.yellow()
        } else {
            label.normal()
        };
        println!("{} {}{}{}", marker, number, label, kind);
    }
}

pub fn print_snapshots(entries: &[SnapshotEntry]) {
    if entries.is_empty() {
        println!("No snapshots found.");
        return;
    }

    for entry in entries {
        let kind = match entry.kind {
            ContentKind::PlainText => "text",
            ContentKind::RichText => "html",
        };
        let size = format!("{:>8} B  {:<4}  ", entry.bytes, kind);
        let available = LINE_WIDTH.saturating_sub(size.width() + TIME_WIDTH);
        let name = truncate_to_width(&entry.name, available);
        let padding = available.saturating_sub(name.width());
        let age = entry
            .modified
            .map(format_time_ago)
            .unwrap_or_else(|| format!("{:>width$}", "?", width = TIME_WIDTH));

        println!(
            "{}{}{}{}",
            name,
            " ".repeat(padding),
            size.dimmed(),
            age.dimmed()
        );
    }
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    let mut result = String::new();
    let mut current_width = 0;

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }

    result
}

fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);
    let time_str = Formatter::new().convert(duration.to_std().unwrap_or_default());
    format!("{:>width$}", time_str, width = TIME_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_keeps_short_names() {
        assert_eq!(truncate_to_width("a.tmp", 20), "a.tmp");
    }

    #[test]
    fn test_truncate_long_names() {
        let out = truncate_to_width("0123456789abcdef.tmp", 8);
        assert_eq!(out, "0123456…");
        assert!(out.width() <= 8);
    }
}
