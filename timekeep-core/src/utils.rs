use ratatui::layout::Rect;
use ratatui::style::Style;

use crate::project::{clamp_whole, MILLIS_PER_HOUR};
use crate::style;
use crate::types::Mode;

// ── Time and progress ────────────────────────────────────────────────────

/// Percentage of `goal` covered by `elapsed`, clamped to `[0, 100]`.
/// A zero goal means "no goal" and yields 0.
pub fn compute_progress(elapsed: u64, goal: u64) -> f64 {
    if goal == 0 {
        return 0.0;
    }
    (elapsed as f64 / goal as f64 * 100.0).min(100.0)
}

/// `HH:MM:SS` with unbounded hours. Sub-second remainders are dropped.
pub fn format_duration(ms: u64) -> String {
    let total_secs = ms / 1000;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

pub fn format_percent(percent: f64) -> String {
    format!("{percent:.1}%")
}

/// Negative and non-finite hours count as "no goal".
pub fn hours_to_millis(hours: f64) -> u64 {
    clamp_whole(hours * MILLIS_PER_HOUR as f64)
}

pub fn millis_to_hours(ms: u64) -> f64 {
    ms as f64 / MILLIS_PER_HOUR as f64
}

/// Reads the leading decimal number of `input` as hours, exponent included
/// (`2e-1` is 0.2). Anything that does not start with a number yields 0, and
/// so do negative values.
pub fn parse_goal_hours(input: &str) -> f64 {
    let trimmed = input.trim();
    let bytes = trimmed.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let digits_start = end;
    let mut seen_dot = false;
    while let Some(&b) = bytes.get(end) {
        match b {
            b'0'..=b'9' => {}
            b'.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end += 1;
    }
    if !bytes[digits_start..end].iter().any(u8::is_ascii_digit) {
        return 0.0;
    }
    if let Some(b'e' | b'E') = bytes.get(end) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = bytes[exp_end..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        // a bare `e` is not part of the number
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }
    match trimmed[..end].parse::<f64>() {
        Ok(hours) if hours.is_finite() && hours > 0.0 => hours,
        _ => 0.0,
    }
}

/// Goal prefill for the edit form: empty when there is no goal.
pub fn format_goal_hours(goal_ms: u64) -> String {
    if goal_ms == 0 {
        String::new()
    } else {
        format!("{}", millis_to_hours(goal_ms))
    }
}

pub fn progress_bar(percent: f64, width: usize) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    let filled = filled.min(width);
    let mut bar = "█".repeat(filled);
    bar.push_str(&"░".repeat(width - filled));
    bar
}

// ── Text ─────────────────────────────────────────────────────────────────

/// Greedy word wrap. Words wider than `width` are cut into chunks.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut line = String::new();
        let mut line_len = 0;
        for word in paragraph.split_whitespace() {
            let chars: Vec<char> = word.chars().collect();
            for piece in chars.chunks(width) {
                let piece_len = piece.len();
                if line_len > 0 && line_len + 1 + piece_len > width {
                    lines.push(std::mem::take(&mut line));
                    line_len = 0;
                }
                if line_len > 0 {
                    line.push(' ');
                    line_len += 1;
                }
                line.extend(piece);
                line_len += piece_len;
            }
        }
        lines.push(line);
    }
    lines
}

// ── Layout ───────────────────────────────────────────────────────────────

pub fn is_dialog_open(mode: &Mode) -> bool {
    !matches!(mode, Mode::View)
}

pub fn dimmed_style(mode: &Mode) -> Style {
    if is_dialog_open(mode) {
        Style::default().fg(style::GRAY_DIM)
    } else {
        Style::default()
    }
}

/// A `width` x `height` rectangle centered in `area`, shrunk to fit.
pub fn centered_box(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
