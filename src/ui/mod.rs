mod theme;

use crate::app::{AppModel, DocumentSession, Focus};
use crate::domain::Mode;
use humansize::{DECIMAL, format_size};
use ratatui::layout::Position;
use ratatui::prelude::*;
use ratatui::widgets::*;
use unicode_width::UnicodeWidthStr;

const TREE_PANEL_WIDTH: u16 = 34;

pub fn render(frame: &mut Frame, model: &AppModel) {
    let full_area = frame.area();
    if full_area.width == 0 || full_area.height == 0 {
        return;
    }

    frame.render_widget(
        Block::default().style(Style::default().bg(theme::BG)),
        full_area,
    );

    let [bar_area, body_area, status_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(full_area);

    render_mode_bar(frame, bar_area, model);

    let [tree_area, content_area] = Layout::horizontal([
        Constraint::Length(TREE_PANEL_WIDTH.min(body_area.width / 2)),
        Constraint::Min(1),
    ])
    .areas(body_area);

    render_tree(frame, tree_area, model);
    render_content(frame, content_area, model);
    render_status_line(frame, status_area, model);

    if model.help_open {
        render_help_overlay(frame, body_area);
    }
}

fn render_mode_bar(frame: &mut Frame, area: Rect, model: &AppModel) {
    let base_style = Style::default().fg(theme::MUTED).bg(theme::BAR_BG);
    let active_style = Style::default()
        .fg(theme::ACCENT)
        .bg(theme::ACCENT_BG)
        .add_modifier(Modifier::BOLD);

    let mut spans = Vec::new();
    for mode in [Mode::Markdown, Mode::Log] {
        let label = format!(" {} ", mode.label());
        let style = if mode == model.mode {
            active_style
        } else {
            base_style
        };
        spans.push(Span::styled(label, style));
        spans.push(Span::styled(" ".to_string(), base_style));
    }

    let left_width: usize = spans.iter().map(|span| span.content.width()).sum();
    let server = format!("{} ", model.server);
    let padding = (area.width as usize)
        .saturating_sub(left_width)
        .saturating_sub(server.width());
    spans.push(Span::styled(" ".repeat(padding), base_style));
    spans.push(Span::styled(server, Style::default().fg(theme::DIM).bg(theme::BAR_BG)));

    frame.render_widget(Paragraph::new(Line::from(spans)).style(base_style), area);
}

fn render_tree(frame: &mut Frame, area: Rect, model: &AppModel) {
    let focused = model.focus == Focus::Tree;
    let border_style = if focused {
        Style::default().fg(theme::ACCENT)
    } else {
        Style::default().fg(theme::BORDER)
    };
    let block = Block::bordered()
        .title(" Files ")
        .border_style(border_style)
        .style(Style::default().bg(theme::SURFACE));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    if model.rows.is_empty() {
        frame.render_widget(
            Paragraph::new("no files").style(Style::default().fg(theme::DIM)),
            inner,
        );
        return;
    }

    let height = inner.height as usize;
    let start = (model.tree_selected + 1).saturating_sub(height);
    let mut lines = Vec::with_capacity(height);
    for (index, row) in model.rows.iter().enumerate().skip(start).take(height) {
        let indent = "  ".repeat(row.depth);
        let text = match &row.file_path {
            Some(_) => format!("{indent}{}", row.name),
            None => format!("{indent}{}/", row.name),
        };
        let mut style = match row.file_path {
            Some(_) => Style::default().fg(theme::FG),
            None => Style::default().fg(theme::MUTED).add_modifier(Modifier::BOLD),
        };
        if index == model.tree_selected {
            style = if focused {
                style.bg(theme::ACCENT_BG).add_modifier(Modifier::BOLD)
            } else {
                style.bg(theme::BAR_BG)
            };
        }
        lines.push(Line::from(Span::styled(text, style)));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_content(frame: &mut Frame, area: Rect, model: &AppModel) {
    let focused = model.focus == Focus::Content;
    let border_style = if focused {
        Style::default().fg(theme::ACCENT)
    } else {
        Style::default().fg(theme::BORDER)
    };

    let title = match &model.session {
        Some(DocumentSession::Markdown { path, dirty, .. }) => {
            if *dirty {
                format!(" {path} * ")
            } else {
                format!(" {path} ")
            }
        }
        Some(DocumentSession::Log { path, size, .. }) => {
            format!(" {path} ({}) ", format_size(*size, DECIMAL))
        }
        None => format!(" {} ", model.mode.label()),
    };

    let block = Block::bordered()
        .title(title)
        .border_style(border_style)
        .style(Style::default().bg(theme::SURFACE));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    match &model.session {
        Some(DocumentSession::Markdown { editor, .. }) => {
            let height = inner.height as usize;
            let lines = editor
                .lines
                .iter()
                .skip(editor.scroll_row)
                .take(height)
                .map(|line| Line::from(Span::styled(line.clone(), Style::default().fg(theme::FG))))
                .collect::<Vec<_>>();
            frame.render_widget(Paragraph::new(lines), inner);

            if focused && editor.cursor_row >= editor.scroll_row {
                let row_on_screen = editor.cursor_row - editor.scroll_row;
                let prefix = editor
                    .lines
                    .get(editor.cursor_row)
                    .map(|line| prefix_width(line, editor.cursor_col))
                    .unwrap_or(0);
                if row_on_screen < height && prefix < inner.width as usize {
                    frame.set_cursor_position(Position::new(
                        inner.x + prefix as u16,
                        inner.y + row_on_screen as u16,
                    ));
                }
            }
        }
        Some(DocumentSession::Log { content, .. }) => {
            let height = inner.height as usize;
            let all_lines = content.split('\n').collect::<Vec<_>>();
            let max_back = all_lines.len().saturating_sub(height);
            let back = model.log_scroll_back.min(max_back);
            let end = all_lines.len() - back;
            let start = end.saturating_sub(height);
            let lines = all_lines[start..end]
                .iter()
                .map(|line| {
                    Line::from(Span::styled(
                        (*line).to_string(),
                        Style::default().fg(theme::FG),
                    ))
                })
                .collect::<Vec<_>>();
            frame.render_widget(Paragraph::new(lines), inner);
        }
        None => {
            let placeholder = match model.mode {
                Mode::Markdown => "Select a markdown file",
                Mode::Log => "Select a log file",
            };
            frame.render_widget(
                Paragraph::new(placeholder)
                    .style(Style::default().fg(theme::DIM))
                    .alignment(Alignment::Center),
                inner,
            );
        }
    }
}

fn render_status_line(frame: &mut Frame, area: Rect, model: &AppModel) {
    let base_style = Style::default().fg(theme::MUTED).bg(theme::BAR_BG);
    let status = format!(" {}", model.status);

    let save_hint = matches!(
        &model.session,
        Some(DocumentSession::Markdown { .. })
    );
    let mut hints = vec!["Tab mode", "r reload", "Enter open"];
    if save_hint {
        hints.push("^S save");
    }
    hints.push("F1 help");
    hints.push("q quit");
    let hint_text = format!("{} ", hints.join("  "));

    let padding = (area.width as usize)
        .saturating_sub(status.width())
        .saturating_sub(hint_text.width());
    let spans = vec![
        Span::styled(status, Style::default().fg(theme::FG).bg(theme::BAR_BG)),
        Span::styled(" ".repeat(padding), base_style),
        Span::styled(hint_text, Style::default().fg(theme::DIM).bg(theme::BAR_BG)),
    ];
    frame.render_widget(Paragraph::new(Line::from(spans)).style(base_style), area);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let width = 44.min(area.width);
    let height = 12.min(area.height);
    let overlay = Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    };
    frame.render_widget(Clear, overlay);

    let block = Block::bordered()
        .title(" Help ")
        .border_style(Style::default().fg(theme::ACCENT))
        .style(Style::default().bg(theme::SURFACE));
    let inner = block.inner(overlay);
    frame.render_widget(block, overlay);

    let entries = [
        ("Tab", "switch Markdown/Logs mode"),
        ("Up/Down", "move in the file tree"),
        ("Enter", "open the selected file"),
        ("r", "reload the file tree"),
        ("Ctrl+S", "save the open markdown file"),
        ("Esc", "back to the file tree"),
        ("End", "jump to the log tail"),
        ("q / Ctrl+C", "quit"),
    ];
    let lines = entries
        .iter()
        .map(|(keys, action)| {
            Line::from(vec![
                Span::styled(
                    format!(" {keys:<11}"),
                    Style::default().fg(theme::ACCENT),
                ),
                Span::styled((*action).to_string(), Style::default().fg(theme::FG)),
            ])
        })
        .collect::<Vec<_>>();
    frame.render_widget(Paragraph::new(lines), inner);
}

/// Keeps scroll offsets consistent with the terminal size before a draw: the
/// editor viewport follows the cursor and the log view cannot scroll past its
/// first line.
pub fn clamp_scroll_state(model: &mut AppModel) {
    let height = usize::from(model.terminal_size.1.saturating_sub(4)).max(1);
    match &mut model.session {
        Some(DocumentSession::Markdown { editor, .. }) => {
            if editor.cursor_row < editor.scroll_row {
                editor.scroll_row = editor.cursor_row;
            }
            if editor.cursor_row >= editor.scroll_row + height {
                editor.scroll_row = editor.cursor_row + 1 - height;
            }
        }
        Some(DocumentSession::Log { content, .. }) => {
            let total = content.split('\n').count();
            model.log_scroll_back = model.log_scroll_back.min(total.saturating_sub(1));
        }
        None => model.log_scroll_back = 0,
    }
}

fn prefix_width(line: &str, cursor_col: usize) -> usize {
    let byte_index = line
        .char_indices()
        .nth(cursor_col)
        .map(|(index, _)| index)
        .unwrap_or(line.len());
    line[..byte_index].width()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{AppModel, apply_markdown_open};

    #[test]
    fn editor_viewport_follows_the_cursor() {
        let base = AppModel::new("s".to_string()).with_terminal_size(80, 10);
        let text = (0..40).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");
        let mut model = apply_markdown_open(&base, "big.md".to_string(), Ok(text));

        if let Some(DocumentSession::Markdown { editor, .. }) = &mut model.session {
            editor.cursor_row = 30;
        }
        clamp_scroll_state(&mut model);
        let Some(DocumentSession::Markdown { editor, .. }) = &model.session else {
            panic!("expected markdown session");
        };
        // 10-row terminal leaves 6 content rows; row 30 must be the last one.
        assert_eq!(editor.scroll_row, 25);

        if let Some(DocumentSession::Markdown { editor, .. }) = &mut model.session {
            editor.cursor_row = 3;
        }
        clamp_scroll_state(&mut model);
        let Some(DocumentSession::Markdown { editor, .. }) = &model.session else {
            panic!("expected markdown session");
        };
        assert_eq!(editor.scroll_row, 3);
    }

    #[test]
    fn prefix_width_counts_display_columns() {
        assert_eq!(prefix_width("héllo", 3), 3);
        assert_eq!(prefix_width("ab", 10), 2);
    }
}
