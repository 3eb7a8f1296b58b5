use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph, Wrap};
use tui_textarea::TextArea;

use crate::app::AppState;
use crate::project::{Project, ProjectId};
use crate::style;
use crate::tracker::TimeTracker;
use crate::types::*;
use crate::utils::*;

// ── View model ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct GoalView {
    pub goal: String,
    /// Live progress in `[0, 100]`, usable as a bar width percentage.
    pub percent: f64,
    pub label: String,
}

/// Display data for one project, computed from its live elapsed time.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectView {
    pub id: ProjectId,
    pub name: String,
    pub notes: Option<String>,
    pub elapsed: String,
    pub count: u64,
    pub is_running: bool,
    pub goal: Option<GoalView>,
}

pub fn project_view(project: &Project, now: i64) -> ProjectView {
    let elapsed = project.live_elapsed(now);
    let goal = project.has_goal().then(|| {
        let percent = compute_progress(elapsed, project.goal_time);
        GoalView {
            goal: format_duration(project.goal_time),
            percent,
            label: format_percent(percent),
        }
    });
    ProjectView {
        id: project.id,
        name: project.name.clone(),
        notes: (!project.notes.is_empty()).then(|| project.notes.clone()),
        elapsed: format_duration(elapsed),
        count: project.count,
        is_running: project.is_running,
        goal,
    }
}

pub fn project_views(tracker: &TimeTracker) -> Vec<ProjectView> {
    let now = tracker.now_ms();
    tracker.projects().map(|p| project_view(p, now)).collect()
}

fn project_list_item(view: &ProjectView, width: usize, highlighted: bool) -> ListItem<'static> {
    let name_style = if highlighted {
        Style::default()
            .fg(style::BLUE)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };
    let marker = if view.is_running {
        Span::styled("▶ ", Style::default().fg(style::GREEN))
    } else {
        Span::raw("  ")
    };

    let mut lines = vec![
        Line::from(vec![marker, Span::styled(view.name.clone(), name_style)]),
        Line::from(format!("  {}  ×{}", view.elapsed, view.count)),
    ];
    if let Some(goal) = &view.goal {
        let bar_width = (width / 3).clamp(5, 24);
        lines.push(Line::from(vec![
            Span::raw(format!("  {} ", goal.goal)),
            Span::styled(
                progress_bar(goal.percent, bar_width),
                Style::default().fg(style::BLUE),
            ),
            Span::raw(format!(" {}", goal.label)),
        ]));
    }
    ListItem::new(lines)
}

// ── Main UI ──────────────────────────────────────────────────────────────

/// Render the entire UI. `header_text` usually names where data is stored.
pub fn ui(f: &mut ratatui::Frame, state: &AppState, header_text: &str) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(5),    // Body
            Constraint::Length(1), // Footer
        ])
        .split(f.area());

    let body_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[1]);

    let dimmed = dimmed_style(&state.mode);
    let views = project_views(&state.tracker);
    let selected = views.iter().find(|v| Some(v.id) == state.selected);

    let mut header_spans = vec![Span::raw(header_text.to_string())];
    if let Some(err) = state.tracker.last_persist_error() {
        header_spans.push(Span::styled(
            format!("  (not saved: {err})"),
            Style::default().fg(style::RED),
        ));
    }
    let header = Paragraph::new(Line::from(header_spans))
        .block(Block::default().borders(Borders::ALL).title("timekeep"))
        .style(dimmed);
    f.render_widget(header, chunks[0]);

    let gauge_goal = selected.and_then(|v| v.goal.as_ref());
    let (list_area, gauge_area) = match gauge_goal {
        Some(_) if body_chunks[0].height > 6 => {
            let areas = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(3), Constraint::Length(3)])
                .split(body_chunks[0]);
            (areas[0], Some(areas[1]))
        }
        _ => (body_chunks[0], None),
    };

    let running = views.iter().filter(|v| v.is_running).count();
    let list_block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Projects ({} running)", running))
        .border_style(if is_dialog_open(&state.mode) {
            Style::default()
        } else {
            Style::default().fg(style::BLUE)
        });

    if views.is_empty() {
        let empty = Paragraph::new("No projects yet. Press n to create one.")
            .block(list_block)
            .style(dimmed);
        f.render_widget(empty, list_area);
    } else {
        let list_width = list_area.width.saturating_sub(4) as usize;
        let items: Vec<ListItem> = views
            .iter()
            .map(|v| project_list_item(v, list_width, Some(v.id) == state.selected))
            .collect();
        let mut list_state = ListState::default();
        list_state.select(state.selected_index());
        let list = List::new(items)
            .block(list_block)
            .style(dimmed)
            .highlight_symbol("│");
        f.render_stateful_widget(list, list_area, &mut list_state);
    }

    if let (Some(goal), Some(gauge_area)) = (gauge_goal, gauge_area) {
        let gauge = Gauge::default()
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("Goal {}", goal.goal)),
            )
            .gauge_style(Style::default().fg(style::BLUE))
            .ratio((goal.percent / 100.0).clamp(0.0, 1.0))
            .label(goal.label.clone())
            .use_unicode(true)
            .style(dimmed);
        f.render_widget(gauge, gauge_area);
    }

    render_details(f, body_chunks[1], selected, dimmed);

    let footer = match &state.status {
        Some(status) => Paragraph::new(status.clone()).style(Style::default().fg(style::YELLOW)),
        None => Paragraph::new(
            "space start/stop • + count • n new • e edit • d delete • ↑↓ move • q quit",
        )
        .style(Style::default().fg(style::GRAY_DIM)),
    };
    f.render_widget(footer, chunks[2]);

    render_form_dialog(f, state);
    render_confirm_dialog(f, state);
}

fn render_details(f: &mut ratatui::Frame, area: Rect, view: Option<&ProjectView>, dimmed: Style) {
    let block = Block::default().borders(Borders::ALL).title("Details");
    let Some(view) = view else {
        let para = Paragraph::new("Select a project to see its details")
            .block(block)
            .style(dimmed);
        f.render_widget(para, area);
        return;
    };

    let label = Style::default().fg(style::GRAY_DIM);
    let inner_width = area.width.saturating_sub(2) as usize;
    let mut lines = vec![
        Line::from(Span::styled(
            view.name.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    if let Some(notes) = &view.notes {
        lines.extend(wrap_text(notes, inner_width).into_iter().map(Line::from));
        lines.push(Line::from(""));
    }
    let state_label = if view.is_running { "running" } else { "stopped" };
    lines.push(Line::from(vec![
        Span::styled("Time     ", label),
        Span::raw(format!("{} ({state_label})", view.elapsed)),
    ]));
    lines.push(Line::from(vec![
        Span::styled("Count    ", label),
        Span::raw(view.count.to_string()),
    ]));
    if let Some(goal) = &view.goal {
        lines.push(Line::from(vec![
            Span::styled("Goal     ", label),
            Span::raw(goal.goal.clone()),
        ]));
        lines.push(Line::from(vec![
            Span::styled("Progress ", label),
            Span::raw(goal.label.clone()),
        ]));
    }

    f.render_widget(Paragraph::new(lines).block(block).style(dimmed), area);
}

// ── Dialogs ──────────────────────────────────────────────────────────────

fn render_form_field(
    f: &mut ratatui::Frame,
    area: Rect,
    label: &str,
    textarea: &TextArea<'_>,
    is_active: bool,
) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(label.len() as u16), Constraint::Min(1)])
        .split(area);
    let style = if is_active {
        Style::default().fg(style::BLUE)
    } else {
        Style::default()
    };
    f.render_widget(Paragraph::new(label.to_string()).style(style), chunks[0]);
    if is_active {
        f.render_widget(textarea, chunks[1]);
    } else {
        f.render_widget(Paragraph::new(text_field_value(textarea)), chunks[1]);
    }
}

fn render_form_dialog(f: &mut ratatui::Frame, state: &AppState) {
    let Some(form) = &state.form else {
        return;
    };

    let area = centered_box(64, 8, f.area());
    f.render_widget(Clear, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(form.title())
        .border_style(Style::default().fg(style::BLUE));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Name
            Constraint::Length(1), // Notes
            Constraint::Length(1), // Goal
            Constraint::Min(0),    // Spacer
            Constraint::Length(1), // Help
        ])
        .split(inner);

    let fields = [
        (FormField::Name, "Name:  "),
        (FormField::Notes, "Notes: "),
        (FormField::Goal, "Goal (hours, optional): "),
    ];
    for (row, (field, label)) in fields.into_iter().enumerate() {
        render_form_field(
            f,
            rows[row],
            label,
            form.field(field),
            form.current_field == field,
        );
    }

    f.render_widget(
        Paragraph::new("↑↓/Tab: navigate • Enter: save • Esc: cancel")
            .style(Style::default().fg(style::GRAY_DIM)),
        rows[4],
    );
}

fn render_confirm_dialog(f: &mut ratatui::Frame, state: &AppState) {
    let Mode::ConfirmDelete { prompt, .. } = &state.mode else {
        return;
    };

    let area = centered_box(56, 6, f.area());
    f.render_widget(Clear, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Delete")
        .border_style(Style::default().fg(style::RED));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);
    f.render_widget(
        Paragraph::new(prompt.clone()).wrap(Wrap { trim: true }),
        rows[0],
    );
    f.render_widget(
        Paragraph::new("y/Enter: delete • n/Esc: keep").style(Style::default().fg(style::GRAY_DIM)),
        rows[1],
    );
}
