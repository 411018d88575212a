//! Pure transcript-to-lines rendering for the chat widget.

use brightminds_core::{Role, SessionSnapshot};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Paragraph, Wrap};

use crate::theme::Theme;

const SPINNER: &[&str] = &["|", "/", "-", "\\"];

pub const EMPTY_TITLE: &str = "How can I help today?";
pub const EMPTY_HINT: &str = "Ask about admission, programs, tours, fees...";

/// Render the session as chat lines. Reads the snapshot only, so calling it
/// repeatedly without a new submission yields the same lines.
pub fn build_chat_lines<'a>(
    snapshot: &'a SessionSnapshot,
    spinner_frame: usize,
    theme: &Theme,
) -> Vec<Line<'a>> {
    let mut lines: Vec<Line> = Vec::new();

    if snapshot.transcript.is_empty() && !snapshot.pending {
        lines.push(Line::raw(""));
        lines.push(
            Line::from(Span::styled(
                EMPTY_TITLE,
                Style::default().fg(theme.fg).add_modifier(Modifier::BOLD),
            ))
            .centered(),
        );
        lines.push(Line::from(Span::styled(EMPTY_HINT, Style::default().fg(theme.muted))).centered());
        return lines;
    }

    for msg in snapshot.transcript.iter() {
        let (prefix, color) = match msg.role {
            Role::User => ("You > ", theme.user_color),
            _ => ("Assistant > ", theme.assistant_color),
        };
        let indent = " ".repeat(prefix.len());

        for (i, raw_line) in msg.content.lines().enumerate() {
            let lead = if i == 0 {
                Span::styled(prefix, Style::default().fg(color).add_modifier(Modifier::BOLD))
            } else {
                Span::raw(indent.clone())
            };
            lines.push(Line::from(vec![
                lead,
                Span::styled(raw_line, Style::default().fg(color)),
            ]));
        }
        lines.push(Line::raw(""));
    }

    if snapshot.pending {
        let frame = SPINNER[spinner_frame % SPINNER.len()];
        lines.push(Line::from(Span::styled(
            format!("  {frame} Thinking..."),
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::DIM),
        )));
    }

    lines
}

/// Rows `lines` occupy once word-wrapped to `width` columns.
pub fn wrapped_height(lines: &[Line<'_>], width: u16) -> usize {
    Paragraph::new(Text::from(lines.to_vec()))
        .wrap(Wrap { trim: false })
        .line_count(width)
}
