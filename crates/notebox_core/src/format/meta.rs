//! Display metadata derived from item content and timestamps.

use super::region::{strip_tags, Node, Region};
use chrono::{Local, TimeZone, Utc};

/// Plain-text character count of a region's content with every marker
/// stripped (bullet glyphs, ordinals, checkbox controls).
///
/// Display metadata only; never drives control flow.
pub fn char_count(content: &str) -> usize {
    let region = Region::parse(content);
    let mut text = String::new();
    for node in &region.nodes {
        match node {
            Node::Item(item) => text.push_str(&item.label_text()),
            Node::Text(run) => text.push_str(&strip_tags(run)),
            Node::Break => {}
        }
    }
    text.trim().chars().count()
}

/// Relative display form of a modification timestamp.
///
/// Under a minute: "now"; under an hour: "N min"; under a day:
/// "N hours"; otherwise `dd.mm.yyyy HH:MM` in local time.
pub fn format_timestamp(now_ms: i64, then_ms: i64) -> String {
    let diff_mins = (now_ms - then_ms) / 60_000;
    if diff_mins < 1 {
        return "now".to_string();
    }
    if diff_mins < 60 {
        return format!("{diff_mins} min");
    }
    if diff_mins < 1440 {
        return format!("{} hours", diff_mins / 60);
    }

    let formatted = Local
        .timestamp_millis_opt(then_ms)
        .single()
        .map(|ts| ts.format("%d.%m.%Y %H:%M").to_string());
    match formatted {
        Some(value) => value,
        None => Utc
            .timestamp_millis_opt(then_ms)
            .single()
            .map(|ts| ts.format("%d.%m.%Y %H:%M").to_string())
            .unwrap_or_default(),
    }
}

/// Metadata line shown under an expanded container.
pub fn metadata_line(now_ms: i64, last_modified: Option<i64>, content: &str) -> String {
    let date = last_modified
        .map(|then| format_timestamp(now_ms, then))
        .unwrap_or_default();
    format!("{date} | {} characters", char_count(content))
}

#[cfg(test)]
mod tests {
    use super::super::list::apply_kind;
    use super::super::region::ListKind;
    use super::{char_count, format_timestamp, metadata_line};

    #[test]
    fn char_count_ignores_markers() {
        let plain = "one<br>two<br>three";
        let before = char_count(plain);
        let numbered = apply_kind(plain, None, ListKind::Number).unwrap();
        assert_eq!(char_count(&numbered.content), before);
        let boxed = apply_kind(plain, None, ListKind::Checkbox).unwrap();
        assert_eq!(char_count(&boxed.content), before);
    }

    #[test]
    fn char_count_strips_inline_tags() {
        assert_eq!(char_count("<b>ab</b> cd"), 5);
        assert_eq!(char_count("  <i> </i> "), 0);
    }

    #[test]
    fn relative_timestamps_follow_display_rules() {
        let now = 1_700_000_000_000;
        assert_eq!(format_timestamp(now, now - 30_000), "now");
        assert_eq!(format_timestamp(now, now - 5 * 60_000), "5 min");
        assert_eq!(format_timestamp(now, now - 3 * 3_600_000), "3 hours");
        let old = format_timestamp(now, now - 3 * 86_400_000);
        assert!(old.contains('.'), "calendar form expected, got {old}");
    }

    #[test]
    fn metadata_line_includes_count_and_date() {
        let now = 1_700_000_000_000;
        let line = metadata_line(now, Some(now - 10_000), "abc");
        assert_eq!(line, "now | 3 characters");
        assert_eq!(metadata_line(now, None, "abc"), " | 3 characters");
    }
}
