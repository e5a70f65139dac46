use anyhow::Result;
use chrono::{DateTime, FixedOffset, Utc};

pub const LAST_UPDATED_MARKER: &str = "LAST_UPDATED";

fn start_tag(marker: &str) -> String {
    format!("<!--{}-->", marker)
}

fn end_tag(marker: &str) -> String {
    format!("<!--/{}-->", marker)
}

/// Byte range strictly between a marker pair.
fn region(document: &str, marker: &str) -> Result<(usize, usize)> {
    let start = start_tag(marker);
    let end = end_tag(marker);

    let start_count = document.matches(start.as_str()).count();
    let end_count = document.matches(end.as_str()).count();
    if start_count == 0 || end_count == 0 {
        anyhow::bail!("marker pair {} / {} not found in document", start, end);
    }
    if start_count > 1 || end_count > 1 {
        anyhow::bail!("marker {} appears more than once in document", marker);
    }

    // Both unique, so `find` is the only occurrence.
    let start_at = document.find(start.as_str()).unwrap_or_default();
    let end_at = document.find(end.as_str()).unwrap_or_default();
    let inner_start = start_at + start.len();
    if end_at < inner_start {
        anyhow::bail!("end marker {} precedes start marker {}", end, start);
    }
    Ok((inner_start, end_at))
}

/// Replace the content between `<!--{marker}-->` and `<!--/{marker}-->`,
/// keeping the markers and everything outside them.
pub fn splice(document: &str, marker: &str, rows: &str) -> Result<String> {
    let (inner_start, inner_end) = region(document, marker)?;
    let mut out = String::with_capacity(document.len() + rows.len());
    out.push_str(&document[..inner_start]);
    out.push('\n');
    out.push_str(rows);
    out.push('\n');
    out.push_str(&document[inner_end..]);
    Ok(out)
}

/// Put `stamp` inside the `LAST_UPDATED` pair. Documents without a usable
/// pair are returned unchanged.
pub fn stamp_last_updated(document: &str, stamp: &str) -> String {
    match region(document, LAST_UPDATED_MARKER) {
        Ok((inner_start, inner_end)) => {
            let mut out = String::with_capacity(document.len() + stamp.len());
            out.push_str(&document[..inner_start]);
            out.push_str(stamp);
            out.push_str(&document[inner_end..]);
            out
        }
        Err(_) => document.to_string(),
    }
}

/// e.g. `19 October 2026, 14:05 UTC`
pub fn format_timestamp(now: DateTime<Utc>, offset: FixedOffset, label: &str) -> String {
    let local = now.with_timezone(&offset);
    let stamp = local.format("%d %B %Y, %H:%M").to_string();
    if label.is_empty() {
        stamp
    } else {
        format!("{} {}", stamp, label)
    }
}
