use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, List, ListItem, ListState, Paragraph},
    Frame, Terminal,
};
use std::io;
use taskflow::{
    app::{App, AuthMode, Notice, Screen},
    storage::Storage,
    task::{Priority, Task, TaskDraft, TaskStatus, TaskUpdate},
};

pub fn run_app<B: Backend, S: Storage>(terminal: &mut Terminal<B>, app: &mut App<S>) -> io::Result<()> {
    loop {
        terminal.draw(|f| draw(f, app))?;

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        if key.code == KeyCode::Char('q') {
            return Ok(()); // Quit
        }

        match app.screen {
            Screen::Auth => handle_auth_key(app, key.code),
            _ => handle_protected_key(app, key.code),
        }
    }
}

fn handle_auth_key<S: Storage>(app: &mut App<S>, code: KeyCode) {
    match code {
        KeyCode::Char('t') | KeyCode::Tab => {
            app.auth_mode = match app.auth_mode {
                AuthMode::Signup => AuthMode::Login,
                AuthMode::Login => AuthMode::Signup,
            };
        }
        KeyCode::Enter => match app.auth_mode {
            AuthMode::Signup => {
                let Some(name) = prompt("Full name") else { return };
                let Some(email) = prompt("Email address") else { return };
                let Some(password) = prompt("Password") else { return };
                // Outcome is shown through the notice line.
                let _ = app.signup(&name, &email, &password);
            }
            AuthMode::Login => {
                let Some(email) = prompt("Email address") else { return };
                let Some(password) = prompt("Password") else { return };
                let _ = app.login(&email, &password);
            }
        },
        _ => {}
    }
}

fn handle_protected_key<S: Storage>(app: &mut App<S>, code: KeyCode) {
    match code {
        KeyCode::Char('1') => {
            app.navigate(Screen::Dashboard);
        }
        KeyCode::Char('2') => {
            app.navigate(Screen::Tasks);
        }
        KeyCode::Char('3') => {
            app.navigate(Screen::Profile);
        }
        KeyCode::Char('o') => {
            let _ = app.logout();
        }
        _ if app.screen == Screen::Tasks => handle_tasks_key(app, code),
        _ => {}
    }
}

fn handle_tasks_key<S: Storage>(app: &mut App<S>, code: KeyCode) {
    match code {
        KeyCode::Char('a') => {
            if let Some(draft) = prompt_draft() {
                let _ = app.add_task(draft);
            }
        }
        KeyCode::Char('e') => {
            if let Some(task) = app.selected().cloned() {
                let update = prompt_update(&task);
                if !update.is_empty() {
                    let _ = app.update_task(task.id, update);
                }
            }
        }
        KeyCode::Char('d') => {
            if let Some(id) = app.selected().map(|t| t.id) {
                let _ = app.delete_task(id);
            }
        }
        KeyCode::Enter => {
            // Move to the next status
            if let Some(id) = app.selected().map(|t| t.id) {
                let _ = app.advance_task(id);
            }
        }
        KeyCode::Left => app.select_left(),
        KeyCode::Right => app.select_right(),
        KeyCode::Up => app.select_up(),
        KeyCode::Down => app.select_down(),
        _ => {}
    }
}

fn draw<S: Storage>(f: &mut Frame, app: &App<S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(3),
        ])
        .split(f.area());

    draw_header(f, app, chunks[0]);
    match app.screen {
        Screen::Auth => draw_auth(f, app, chunks[1]),
        Screen::Dashboard => draw_dashboard(f, app, chunks[1]),
        Screen::Tasks => draw_tasks(f, app, chunks[1]),
        Screen::Profile => draw_profile(f, app, chunks[1]),
    }
    draw_notice(f, app, chunks[2]);
}

fn draw_header<S: Storage>(f: &mut Frame, app: &App<S>, area: Rect) {
    let tabs = [
        (Screen::Dashboard, "[1] Dashboard"),
        (Screen::Tasks, "[2] Tasks"),
        (Screen::Profile, "[3] Profile"),
    ];
    let mut spans = vec![Span::styled(
        "TaskFlow  ",
        Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
    )];
    if app.screen != Screen::Auth {
        for (screen, label) in tabs {
            let style = if app.screen == screen {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            spans.push(Span::styled(label, style));
            spans.push(Span::raw("  "));
        }
        spans.push(Span::raw("[o] Log out  "));
    }
    spans.push(Span::raw("[q] Quit"));

    let header = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    f.render_widget(header, area);
}

fn draw_notice<S: Storage>(f: &mut Frame, app: &App<S>, area: Rect) {
    let line = match &app.notice {
        Some(Notice::Success(text)) => Line::from(Span::styled(text.as_str(), Style::default().fg(Color::Green))),
        Some(Notice::Error(text)) => Line::from(Span::styled(text.as_str(), Style::default().fg(Color::Red))),
        None => Line::from(""),
    };
    f.render_widget(Paragraph::new(line).block(Block::default().borders(Borders::ALL)), area);
}

fn draw_auth<S: Storage>(f: &mut Frame, app: &App<S>, area: Rect) {
    let (title, action) = match app.auth_mode {
        AuthMode::Signup => ("Sign Up", "[Enter] create an account   [t] switch to login"),
        AuthMode::Login => ("Log In", "[Enter] log in   [t] switch to sign up"),
    };
    let text = vec![
        Line::from("Manage your productivity with ease"),
        Line::from(""),
        Line::from(Span::styled(title, Style::default().add_modifier(Modifier::BOLD))),
        Line::from(action),
    ];
    let body = Paragraph::new(text).block(Block::default().title("Welcome").borders(Borders::ALL));
    f.render_widget(body, area);
}

fn draw_dashboard<S: Storage>(f: &mut Frame, app: &App<S>, area: Rect) {
    let Some(stats) = app.dashboard() else {
        return;
    };
    let name = app.account().map(|a| a.name.as_str()).unwrap_or("User");

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(8), Constraint::Min(5)])
        .split(area);

    let summary = vec![
        Line::from(format!("Welcome back, {}!", name)),
        Line::from(""),
        Line::from(format!("Total Tasks:   {}", stats.total)),
        Line::from(format!("Completed:     {} ({}%)", stats.completed, stats.completion_percent())),
        Line::from(format!("In Progress:   {}", stats.in_progress)),
        Line::from(format!("High Priority: {}", stats.high_priority)),
    ];
    f.render_widget(
        Paragraph::new(summary).block(Block::default().title("Overview").borders(Borders::ALL)),
        chunks[0],
    );

    let charts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);

    let priority_bars: Vec<Bar> = Priority::ALL
        .iter()
        .zip(stats.priority_histogram)
        .map(|(priority, count)| {
            Bar::default()
                .label(Line::from(priority.label()))
                .value(count as u64)
        })
        .collect();
    let priority_chart = BarChart::default()
        .block(Block::default().title("Priority").borders(Borders::ALL))
        .data(BarGroup::default().bars(&priority_bars))
        .bar_width(8)
        .bar_gap(2)
        .bar_style(Style::default().fg(Color::Blue));
    f.render_widget(priority_chart, charts[0]);

    let status_bars: Vec<Bar> = stats
        .status_breakdown
        .iter()
        .map(|slice| {
            Bar::default()
                .label(Line::from(slice.label))
                .value(slice.value as u64)
        })
        .collect();
    let status_chart = BarChart::default()
        .block(Block::default().title("Status").borders(Borders::ALL))
        .data(BarGroup::default().bars(&status_bars))
        .bar_width(8)
        .bar_gap(2)
        .bar_style(Style::default().fg(Color::Yellow));
    f.render_widget(status_chart, charts[1]);
}

fn draw_tasks<S: Storage>(f: &mut Frame, app: &App<S>, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![
            Constraint::Percentage(33),
            Constraint::Percentage(33),
            Constraint::Percentage(34),
        ])
        .split(area);

    for (i, status) in TaskStatus::ALL.iter().enumerate() {
        let tasks = app.column(*status);
        let items: Vec<ListItem> = tasks.iter().map(|t| task_item(t)).collect();

        let selected = app.selected_status == i;
        let list = List::new(items)
            .block(
                Block::default()
                    .title(format!("{} ({})", status.label(), tasks.len()))
                    .borders(Borders::ALL)
                    .border_style(if selected {
                        Style::default().fg(Color::Cyan)
                    } else {
                        Style::default()
                    }),
            )
            .highlight_style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED));

        let mut state = ListState::default();
        if selected && !tasks.is_empty() {
            state.select(Some(app.selected_task));
        }
        f.render_stateful_widget(list, chunks[i], &mut state);
    }
}

fn task_item(task: &Task) -> ListItem<'_> {
    let priority_color = match task.priority {
        Priority::Low => Color::Green,
        Priority::Medium => Color::Yellow,
        Priority::High => Color::Red,
    };
    let mut lines = vec![Line::from(vec![
        Span::styled(format!("[{}] ", task.priority.label()), Style::default().fg(priority_color)),
        Span::styled(task.title.as_str(), Style::default().fg(Color::White)),
    ])];
    if !task.duedate.is_empty() {
        lines.push(Line::from(format!("  (Due: {})", task.duedate)));
    }
    ListItem::new(lines)
}

fn draw_profile<S: Storage>(f: &mut Frame, app: &App<S>, area: Rect) {
    let Some(profile) = app.profile() else {
        return;
    };
    let text = vec![
        Line::from(Span::styled(
            format!("({}) {}", profile.initial, profile.name),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(format!("Email:        {}", profile.email)),
        Line::from(format!("Member since: {}", profile.member_since)),
    ];
    f.render_widget(
        Paragraph::new(text).block(Block::default().title("User Profile").borders(Borders::ALL)),
        area,
    );
}

fn prompt_draft() -> Option<TaskDraft> {
    let title = prompt("Task title")?;
    if title.is_empty() {
        return None;
    }
    let description = prompt("Description")?;
    let status = prompt("Status (todo/onprogress/completed) [todo]")?;
    let priority = prompt("Priority (low/medium/high) [low]")?;
    let duedate = prompt("Due date (YYYY-MM-DD)")?;
    Some(TaskDraft {
        title,
        description,
        status: TaskStatus::parse(&status).unwrap_or_default(),
        priority: Priority::parse(&priority).unwrap_or_default(),
        duedate,
    })
}

const CLEAR_FIELD: &str = "-";

/// Empty keeps the current value, `-` clears it.
fn edit_answer(answer: Option<String>) -> Option<String> {
    match answer {
        Some(s) if s == CLEAR_FIELD => Some(String::new()),
        Some(s) if !s.is_empty() => Some(s),
        _ => None,
    }
}

fn prompt_update(task: &Task) -> TaskUpdate {
    // Title, status and priority can't be blank, so they only take non-empty answers.
    let keep_empty = |answer: Option<String>| edit_answer(answer).filter(|s| !s.is_empty());
    TaskUpdate {
        title: keep_empty(prompt(&format!("Title [{}]", task.title))),
        description: edit_answer(prompt(&format!(
            "Description [{}] ('{}' clears)",
            task.description, CLEAR_FIELD
        ))),
        status: keep_empty(prompt(&format!("Status [{}]", task.status.label())))
            .and_then(|s| TaskStatus::parse(&s)),
        priority: keep_empty(prompt(&format!("Priority [{}]", task.priority.label())))
            .and_then(|s| Priority::parse(&s)),
        duedate: edit_answer(prompt(&format!(
            "Due date [{}] ('{}' clears)",
            task.duedate, CLEAR_FIELD
        ))),
    }
}

fn prompt(message: &str) -> Option<String> {
    disable_raw_mode().ok();
    println!("{}", message);
    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_ok() {
        enable_raw_mode().ok();
        Some(input.trim().to_string())
    } else {
        enable_raw_mode().ok();
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edit_answers_keep_replace_or_clear() {
        assert_eq!(edit_answer(None), None);
        assert_eq!(edit_answer(Some(String::new())), None);
        assert_eq!(edit_answer(Some("-".to_string())), Some(String::new()));
        assert_eq!(edit_answer(Some("2026-12-01".to_string())), Some("2026-12-01".to_string()));
    }

    #[test]
    fn cleared_answer_empties_task_field() {
        let mut task = TaskDraft {
            description: "old notes".to_string(),
            duedate: "2026-12-01".to_string(),
            ..TaskDraft::new("ship")
        }
        .into_task(Some(1));

        task.apply(TaskUpdate {
            description: edit_answer(Some("-".to_string())),
            duedate: edit_answer(Some(String::new())),
            ..TaskUpdate::default()
        });
        assert_eq!(task.description, "");
        assert_eq!(task.duedate, "2026-12-01");
        assert_eq!(task.title, "ship");
    }
}
