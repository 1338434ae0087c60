use super::{Console, Mode};
use crate::indexing::lexer::lex;
use crate::search::query::query_terms;
use crate::ui::launcher::Launcher;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use std::ops::Range;
use unicode_width::UnicodeWidthChar;

// Gutter in front of the query line and every result row.
const GUTTER: u16 = 2;

/// Results visible in the viewport: `first..last`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub first: usize,
    pub last: usize,
}

/// Choose the results to show when each takes `heights[i]` rows.
///
/// The selected result is always inside the window. When results are cut
/// off, one row per cut-off side is kept free for an indicator.
pub fn viewport(heights: &[usize], selected: Option<usize>, height: usize) -> Window {
    let count = heights.len();
    if heights.iter().sum::<usize>() <= height {
        return Window { first: 0, last: count };
    }

    let budget = |first: usize, last: usize| {
        height.saturating_sub(usize::from(first > 0) + usize::from(last < count))
    };

    let mut first = 0;
    if let Some(selected) = selected.filter(|&s| s < count) {
        while first < selected && heights[first..=selected].iter().sum::<usize>() > budget(first, selected + 1) {
            first += 1;
        }
    }

    let mut last = first;
    let mut used = 0;
    while last < count {
        let next = used + heights[last];
        if next > budget(first, last + 1) && last > first {
            break;
        }
        used = next;
        last += 1;
    }

    Window { first, last }
}

/// Split `text` into runs, flagging the runs that are words of `terms`
pub fn highlight_segments(text: &str, terms: &[String]) -> Vec<(Range<usize>, bool)> {
    let mut segments = Vec::new();
    let mut pos = 0;
    for token in lex(text).filter(|t| terms.contains(&t.word)) {
        if token.offset > pos {
            segments.push((pos..token.offset, false));
        }
        segments.push((token.offset..token.end(), true));
        pos = token.end();
    }
    if pos < text.len() {
        segments.push((pos..text.len(), false));
    }
    segments
}

pub(super) fn render<L: Launcher>(f: &mut Frame, console: &Console<L>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0), Constraint::Length(1)])
        .split(f.size());

    render_query(f, console, chunks[0]);
    render_results(f, console, chunks[1]);
    render_help(f, console, chunks[2]);
}

fn render_query<L: Launcher>(f: &mut Frame, console: &Console<L>, area: ratatui::layout::Rect) {
    let query = console.query();
    let cursor = console.cursor();
    let bold = Style::default().add_modifier(Modifier::BOLD);

    let marker = if console.selection() == 0 {
        Span::styled(">", Style::default().add_modifier(Modifier::REVERSED))
    } else {
        Span::raw(" ")
    };
    let mut spans = vec![marker, Span::raw(" ")];

    match console.completion().and_then(|c| c.preview()) {
        Some(preview) => {
            spans.push(Span::styled(&query[..cursor], bold));
            spans.push(Span::styled(preview, Style::default().fg(Color::DarkGray)));
            spans.push(Span::styled(&query[cursor..], bold));
        }
        None => spans.push(Span::styled(query, bold)),
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);

    let before = Span::raw(&query[..cursor]).width() as u16;
    let x = (area.x + GUTTER + before).min(area.right().saturating_sub(1));
    f.set_cursor(x, area.y);
}

fn render_results<L: Launcher>(f: &mut Frame, console: &Console<L>, area: ratatui::layout::Rect) {
    let width = usize::from(area.width.saturating_sub(GUTTER)).max(1);
    let terms = query_terms(console.query());
    let selected = console.selection().checked_sub(1);

    let rendered: Vec<Vec<Line>> = console
        .results()
        .iter()
        .enumerate()
        .map(|(i, entry)| result_lines(&entry.text, &terms, width, selected == Some(i)))
        .collect();

    let heights: Vec<usize> = rendered.iter().map(Vec::len).collect();
    let window = viewport(&heights, selected, usize::from(area.height));
    let muted = Style::default().fg(Color::DarkGray);

    let mut lines = Vec::new();
    if window.first > 0 {
        lines.push(Line::from(Span::styled(format!("  ↑ {} more", window.first), muted)));
    }
    for entry_lines in rendered.into_iter().take(window.last).skip(window.first) {
        lines.extend(entry_lines);
    }
    if window.last < heights.len() {
        lines.push(Line::from(Span::styled(
            format!("  ↓ {} more", heights.len() - window.last),
            muted,
        )));
    }

    f.render_widget(Paragraph::new(lines), area);
}

/// Rows for one result. The selected result wraps over as many rows as it
/// needs; others get one row scrolled to the first highlighted word.
fn result_lines(text: &str, terms: &[String], width: usize, selected: bool) -> Vec<Line<'static>> {
    let segments = highlight_segments(text, terms);
    let gutter = if selected {
        Span::styled(" ", Style::default().add_modifier(Modifier::REVERSED))
    } else {
        Span::raw(" ")
    };

    let start = if selected {
        0
    } else {
        scroll_start(text, &segments, width)
    };

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let mut rows: Vec<Vec<Span<'static>>> = vec![Vec::new()];
    let mut column = 0;
    let mut clipped = false;
    let mut run = String::new();

    for (range, highlighted) in segments {
        let style = if highlighted { bold } else { Style::default() };
        let range = range.start.max(start)..range.end;
        if range.is_empty() {
            continue;
        }
        for c in text[range].chars() {
            let c = if c.is_control() { ' ' } else { c };
            let cells = c.width().unwrap_or(0);
            if column > 0 && column + cells > width {
                if !selected {
                    clipped = true;
                    break;
                }
                flush(&mut rows, &mut run, style);
                rows.push(Vec::new());
                column = 0;
            }
            run.push(c);
            column += cells;
        }
        flush(&mut rows, &mut run, style);
        if clipped {
            break;
        }
    }

    rows.into_iter()
        .map(|spans| {
            let mut line = vec![gutter.clone(), Span::raw(" ")];
            line.extend(spans);
            Line::from(line)
        })
        .collect()
}

fn flush(rows: &mut [Vec<Span<'static>>], run: &mut String, style: Style) {
    if run.is_empty() {
        return;
    }
    if let Some(row) = rows.last_mut() {
        row.push(Span::styled(std::mem::take(run), style));
    }
}

// Byte offset to start an unwrapped row at so the first highlight shows.
fn scroll_start(text: &str, segments: &[(Range<usize>, bool)], width: usize) -> usize {
    let total = display_width(text);
    let Some(first_hit) = segments.iter().find(|(_, hit)| *hit).map(|(r, _)| r.start) else {
        return 0;
    };
    if total <= width {
        return 0;
    }

    let hit_column = display_width(&text[..first_hit]);
    let start_column = hit_column.saturating_sub(width / 4).min(total - width);

    let mut column = 0;
    for (idx, c) in text.char_indices() {
        if column >= start_column {
            return idx;
        }
        column += cell_width(c);
    }
    text.len()
}

fn cell_width(c: char) -> usize {
    if c.is_control() {
        1
    } else {
        c.width().unwrap_or(0)
    }
}

fn display_width(text: &str) -> usize {
    text.chars().map(cell_width).sum()
}

fn render_help<L: Launcher>(f: &mut Frame, console: &Console<L>, area: ratatui::layout::Rect) {
    let reversed = Style::default().add_modifier(Modifier::REVERSED);
    let line = match console.status() {
        Some(status) => Line::from(Span::styled(
            status.to_string(),
            reversed.fg(Color::Red),
        )),
        None => Line::from(Span::styled(help_text(console), reversed)),
    };
    f.render_widget(Paragraph::new(line), area);
}

fn help_text<L: Launcher>(console: &Console<L>) -> &'static str {
    if console.mode() == Mode::EditSubmenu {
        "Press e or enter to edit, v to view, d to delete, and any other key to continue."
    } else if console.selection() > 0 {
        "Use arrow keys to select entries. Press enter to edit or esc to exit."
    } else if console.query().is_empty() {
        "Type to search or make new note. Press esc to exit."
    } else {
        "Press enter to make new note or up/down arrow keys to select entries."
    }
}
