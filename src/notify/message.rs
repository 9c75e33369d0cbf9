// src/notify/message.rs
// =============================================================================
// Formats a change notification.
//
// Example body:
//
//   🏠 Apartment changes detected!
//
//   ➕ Added:
//   •2BR|$2,000|900 sq.ft.|Available Now
//   ➖ Removed:
//   •2BR|$2,500|1,000 sq.ft.|Available Dec 1
//
// Pushover caps message bodies at 1024 characters, so the body is cut to fit
// before it is handed to any notifier.
// =============================================================================

use crate::units::{diff, Snapshot, SnapshotDiff};

/// Longest body we ever send, in characters (not bytes)
pub const MAX_BODY_CHARS: usize = 1024;

const HEADER: &str = "🏠 Apartment changes detected!";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeMessage {
    pub title: String,
    pub body: String,
}

impl ChangeMessage {
    // Builds the message for a change from `previous` to `current`
    pub fn new(current: &Snapshot, previous: &Snapshot, instance_name: &str) -> Self {
        Self::from_diff(&diff(previous, current), instance_name)
    }

    fn from_diff(changes: &SnapshotDiff, instance_name: &str) -> Self {
        let mut body = format!("{}\n\n", HEADER);

        if !changes.added.is_empty() {
            body.push_str("➕ Added:\n");
            for unit in &changes.added {
                body.push_str(&format!("•{}\n", unit));
            }
        }

        if !changes.removed.is_empty() {
            body.push_str("➖ Removed:\n");
            for unit in &changes.removed {
                body.push_str(&format!("•{}\n", unit));
            }
        }

        ChangeMessage {
            title: format!("{} - Changes Detected", instance_name),
            body: truncate_chars(&body, MAX_BODY_CHARS),
        }
    }
}

// Keeps at most `max` characters, never splitting a multi-byte character
fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte_index, _)) => text[..byte_index].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::UnitRecord;

    fn unit(price: &str) -> UnitRecord {
        UnitRecord::new("2BR", price, "900 sq.ft.", "Available Now")
    }

    #[test]
    fn test_title_format() {
        let msg = ChangeMessage::new(&Snapshot::new(), &Snapshot::new(), "The Pier");
        assert_eq!(msg.title, "The Pier - Changes Detected");
    }

    #[test]
    fn test_added_only() {
        let current: Snapshot = vec![unit("$2,000")].into_iter().collect();
        let msg = ChangeMessage::new(&current, &Snapshot::new(), "x");

        assert_eq!(
            msg.body,
            "🏠 Apartment changes detected!\n\n➕ Added:\n•2BR|$2,000|900 sq.ft.|Available Now\n"
        );
    }

    #[test]
    fn test_added_and_removed_sections_in_order() {
        let previous: Snapshot = vec![unit("$1"), unit("$2")].into_iter().collect();
        let current: Snapshot = vec![unit("$2"), unit("$3")].into_iter().collect();
        let msg = ChangeMessage::new(&current, &previous, "x");

        let added_at = msg.body.find("➕ Added:").unwrap();
        let removed_at = msg.body.find("➖ Removed:").unwrap();
        assert!(added_at < removed_at);
        assert!(msg.body.contains("•2BR|$3|900 sq.ft.|Available Now\n"));
        assert!(msg.body.contains("•2BR|$1|900 sq.ft.|Available Now\n"));
        assert!(!msg.body.contains("|$2|"));
    }

    #[test]
    fn test_removed_only_has_no_added_section() {
        let previous: Snapshot = vec![unit("$1")].into_iter().collect();
        let msg = ChangeMessage::new(&Snapshot::new(), &previous, "x");
        assert!(!msg.body.contains("Added"));
        assert!(msg.body.contains("➖ Removed:"));
    }

    #[test]
    fn test_long_body_is_truncated_to_limit() {
        let current: Snapshot = (0..200).map(|i| unit(&format!("${:05}", i))).collect();
        let msg = ChangeMessage::new(&current, &Snapshot::new(), "x");
        assert_eq!(msg.body.chars().count(), MAX_BODY_CHARS);
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("abc", 5), "abc");
        assert_eq!(truncate_chars("abcdef", 3), "abc");
        // Multi-byte characters count as one each
        assert_eq!(truncate_chars("ééé", 2), "éé");

        let long = "x".repeat(2000);
        assert_eq!(truncate_chars(&long, MAX_BODY_CHARS).chars().count(), 1024);
    }
}
