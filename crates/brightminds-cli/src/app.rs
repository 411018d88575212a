use anyhow::{Context, Result};
use brightminds_core::{
    AssistantError, ChatSession, CompletionGateway, Message, ProviderId, RejectReason,
    SessionEvent, Settings, SubmitOutcome,
};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Terminal,
};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::commands::{self, CommandResult};
use crate::render;
use crate::theme::Theme;

// ── Single-prompt mode ──────────────────────────────────────────────────

pub async fn run_single_prompt(settings: &Settings, prompt: &str) -> Result<()> {
    let gateway = settings
        .build_gateway()
        .context("assistant is not configured")?;
    let session = ChatSession::new(gateway);

    match session.submit(prompt).await {
        SubmitOutcome::Rejected(RejectReason::Empty) => {
            anyhow::bail!("nothing to ask: the prompt is empty")
        }
        SubmitOutcome::Rejected(RejectReason::Pending) => {
            anyhow::bail!("a request is already in flight")
        }
        SubmitOutcome::Replied(message) => println!("{}", message.content),
        SubmitOutcome::Failed { kind, message } => {
            println!("{}", message.content);
            if let Some(error) = session.last_error() {
                eprintln!("[{kind}] {error}");
            }
        }
    }

    Ok(())
}

// ── Stand-in gateway ────────────────────────────────────────────────────

/// Used when the configured gateway cannot be built, so visitors still get a
/// fallback reply instead of a dead widget.
struct UnavailableGateway {
    missing_key: Option<String>,
    reason: String,
}

#[async_trait::async_trait]
impl CompletionGateway for UnavailableGateway {
    async fn complete(
        &self,
        _history: &[Message],
        _user_text: &str,
    ) -> std::result::Result<String, AssistantError> {
        match &self.missing_key {
            Some(var) => Err(AssistantError::MissingCredential(var.clone())),
            None => Err(AssistantError::Config(self.reason.clone())),
        }
    }

    fn name(&self) -> &str {
        "unconfigured"
    }
}

fn gateway_for(settings: &Settings) -> (Arc<dyn CompletionGateway>, Option<String>) {
    match settings.build_gateway() {
        Ok(gateway) => (gateway, None),
        Err(e) => {
            tracing::warn!("assistant unavailable: {e}");
            let notice = format!(
                "Assistant not available: {e}\n\
                 Set the API key variable or switch with /provider (ollama and proxy need no key)."
            );
            let missing_key = match &e {
                AssistantError::MissingCredential(var) => Some(var.clone()),
                _ => None,
            };
            let gateway = Arc::new(UnavailableGateway {
                missing_key,
                reason: e.to_string(),
            });
            (gateway, Some(notice))
        }
    }
}

// ── Interactive widget ──────────────────────────────────────────────────

struct AppState {
    settings: Settings,
    theme: Theme,
    session: ChatSession,
    event_tx: mpsc::UnboundedSender<SessionEvent>,
    widget_open: bool,
    input: String,
    /// Cursor position in chars, not bytes.
    cursor_pos: usize,
    notice: Option<String>,
    status_text: String,
    ticks: usize,
    /// `usize::MAX` pins the view to the newest line.
    scroll_offset: usize,
    total_content_lines: usize,
    visible_height: usize,
    should_quit: bool,
}

impl AppState {
    fn new(settings: Settings, theme: Theme, event_tx: mpsc::UnboundedSender<SessionEvent>) -> Self {
        let (gateway, notice) = gateway_for(&settings);
        let session = ChatSession::new(gateway).with_events(event_tx.clone());
        Self {
            settings,
            theme,
            session,
            event_tx,
            widget_open: true,
            input: String::new(),
            cursor_pos: 0,
            notice,
            status_text: "Ready".into(),
            ticks: 0,
            scroll_offset: usize::MAX,
            total_content_lines: 0,
            visible_height: 0,
            should_quit: false,
        }
    }

    /// Replace the session. A reply still in flight for the old one is discarded.
    fn new_session(&mut self) {
        let (gateway, notice) = gateway_for(&self.settings);
        self.session = ChatSession::new(gateway).with_events(self.event_tx.clone());
        self.notice = notice;
        self.scroll_offset = usize::MAX;
    }

    fn scroll_to_bottom(&mut self) {
        self.scroll_offset = usize::MAX;
    }

    fn scroll_up(&mut self, lines: usize) {
        let max_scroll = self.total_content_lines.saturating_sub(self.visible_height);
        let current = self.scroll_offset.min(max_scroll);
        self.scroll_offset = current.saturating_sub(lines);
    }

    fn scroll_down(&mut self, lines: usize) {
        let max_scroll = self.total_content_lines.saturating_sub(self.visible_height);
        let next = self.scroll_offset.min(max_scroll).saturating_add(lines);
        self.scroll_offset = if next >= max_scroll { usize::MAX } else { next };
    }

    fn byte_index(&self) -> usize {
        self.input
            .char_indices()
            .nth(self.cursor_pos)
            .map(|(i, _)| i)
            .unwrap_or(self.input.len())
    }

    fn insert_char(&mut self, c: char) {
        let idx = self.byte_index();
        self.input.insert(idx, c);
        self.cursor_pos += 1;
    }

    fn delete_before_cursor(&mut self) {
        if self.cursor_pos == 0 {
            return;
        }
        self.cursor_pos -= 1;
        let idx = self.byte_index();
        self.input.remove(idx);
    }

    fn delete_at_cursor(&mut self) {
        if self.cursor_pos < self.input.chars().count() {
            let idx = self.byte_index();
            self.input.remove(idx);
        }
    }

    fn clear_input(&mut self) {
        self.input.clear();
        self.cursor_pos = 0;
    }

    fn submit_input(&mut self) {
        let text = self.input.trim().to_string();
        if text.is_empty() {
            return;
        }

        match commands::handle_command(&text) {
            CommandResult::NotACommand => match self.session.spawn_submit(&text) {
                Ok(_) => {
                    self.clear_input();
                    self.scroll_to_bottom();
                }
                Err(RejectReason::Pending) => {
                    self.status_text = "Still waiting for the last reply...".into();
                }
                Err(RejectReason::Empty) => {}
            },
            result => {
                self.clear_input();
                self.handle_command_result(result);
            }
        }
    }

    fn handle_command_result(&mut self, result: CommandResult) {
        match result {
            CommandResult::Message(msg) => self.notice = Some(msg),
            CommandResult::Quit => self.should_quit = true,
            CommandResult::NewConversation => {
                self.new_session();
                self.status_text = "New conversation".into();
            }
            CommandResult::ShowStatus => self.notice = Some(self.status_report()),
            CommandResult::ThemeChanged(name) => {
                if name.is_empty() {
                    self.theme = self.theme.toggled();
                } else if Theme::all_names().contains(&name.as_str()) {
                    self.theme = Theme::by_name(&name);
                } else {
                    let themes = Theme::all_names().join(", ");
                    self.notice = Some(format!("Unknown theme '{name}'. Available: {themes}"));
                    return;
                }
                self.status_text = format!("Theme: {}", self.theme.name);
            }
            CommandResult::ProviderChanged(name) => match name.parse::<ProviderId>() {
                Ok(id) => {
                    self.settings.set_provider(id);
                    self.new_session();
                    self.status_text = format!("Provider: {}", id.name());
                }
                Err(e) => self.notice = Some(e),
            },
            CommandResult::ModelChanged(model) => {
                self.settings.assistant.model = model.clone();
                self.new_session();
                self.status_text = format!("Model: {model}");
            }
            CommandResult::NotACommand => {}
        }
    }

    fn status_report(&self) -> String {
        let snapshot = self.session.snapshot();
        let assistant = &self.settings.assistant;
        let mut report = format!(
            "Provider:   {}\n\
             Model:      {}\n\
             Endpoint:   {}\n\
             Gateway:    {}\n\
             Messages:   {}\n\
             Pending:    {}\n\
             Config:     {}",
            assistant.provider.name(),
            if assistant.model.is_empty() { "-" } else { assistant.model.as_str() },
            self.settings.base_url(),
            self.session.gateway_name(),
            snapshot.transcript.len(),
            if snapshot.pending { "yes" } else { "no" },
            Settings::config_path().display(),
        );
        if let Some(error) = snapshot.last_error {
            report.push_str(&format!("\nLast error: {error}"));
        }
        report
    }
}

pub async fn run_tui(settings: Settings, theme_name: &str) -> Result<()> {
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<SessionEvent>();
    let mut state = AppState::new(settings, Theme::by_name(theme_name), event_tx);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &mut state, &mut event_rx);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn event_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    state: &mut AppState,
    event_rx: &mut mpsc::UnboundedReceiver<SessionEvent>,
) -> Result<()> {
    loop {
        terminal.draw(|f| draw_ui(f, state))?;

        while let Ok(session_event) = event_rx.try_recv() {
            handle_session_event(state, session_event);
        }

        if event::poll(Duration::from_millis(33))? {
            if let Event::Key(key) = event::read()? {
                handle_key(state, key);
            }
        }

        state.ticks = state.ticks.wrapping_add(1);
        if state.should_quit {
            return Ok(());
        }
    }
}

fn handle_session_event(state: &mut AppState, event: SessionEvent) {
    match event {
        SessionEvent::Pending => state.status_text = "Sending...".into(),
        SessionEvent::Settled { failure: None, .. } => {
            state.status_text = "Ready".into();
            state.scroll_to_bottom();
        }
        SessionEvent::Settled {
            failure: Some(kind),
            ..
        } => {
            state.status_text = format!("Last request failed ({kind})");
            state.scroll_to_bottom();
        }
    }
}

fn handle_key(state: &mut AppState, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => {
                state.should_quit = true;
                return;
            }
            KeyCode::Char('o') => {
                state.widget_open = !state.widget_open;
                return;
            }
            _ => {}
        }
    }

    // Any key dismisses an open notice.
    if state.notice.is_some() {
        state.notice = None;
        return;
    }

    if !state.widget_open {
        match key.code {
            KeyCode::Enter | KeyCode::Char('o') => state.widget_open = true,
            KeyCode::Char('t') => state.theme = state.theme.toggled(),
            KeyCode::Char('q') => state.should_quit = true,
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Esc => state.widget_open = false,
        KeyCode::Enter => state.submit_input(),
        KeyCode::Char(c) => state.insert_char(c),
        KeyCode::Backspace => state.delete_before_cursor(),
        KeyCode::Delete => state.delete_at_cursor(),
        KeyCode::Left => state.cursor_pos = state.cursor_pos.saturating_sub(1),
        KeyCode::Right => {
            state.cursor_pos = (state.cursor_pos + 1).min(state.input.chars().count());
        }
        KeyCode::Home => state.cursor_pos = 0,
        KeyCode::End => state.cursor_pos = state.input.chars().count(),
        KeyCode::PageUp | KeyCode::Up => state.scroll_up(if key.code == KeyCode::Up { 1 } else { 10 }),
        KeyCode::PageDown | KeyCode::Down => {
            state.scroll_down(if key.code == KeyCode::Down { 1 } else { 10 })
        }
        _ => {}
    }
}

// ── Drawing ─────────────────────────────────────────────────────────────

fn draw_ui(f: &mut ratatui::Frame, state: &mut AppState) {
    let area = f.area();
    draw_page(f, area, state);

    if state.widget_open {
        draw_widget(f, widget_rect(area), state);
    } else {
        draw_bubble(f, area, &state.theme);
    }

    if let Some(ref notice) = state.notice {
        draw_notice(f, area, notice, &state.theme);
    }
}

/// The page behind the widget.
fn draw_page(f: &mut ratatui::Frame, area: Rect, state: &AppState) {
    let theme = &state.theme;
    let text = vec![
        Line::raw(""),
        Line::from(Span::styled(
            state.settings.assistant.school_name.as_str(),
            Style::default().fg(theme.fg).add_modifier(Modifier::BOLD),
        ))
        .centered(),
        Line::raw(""),
        Line::from(Span::styled(
            "Ctrl+O chat with our assistant | t theme | q quit",
            Style::default().fg(theme.muted),
        ))
        .centered(),
    ];
    let page = Paragraph::new(text).style(Style::default().bg(theme.bg));
    f.render_widget(page, area);
}

fn draw_bubble(f: &mut ratatui::Frame, area: Rect, theme: &Theme) {
    let width = 12.min(area.width);
    let height = 3.min(area.height);
    let rect = Rect {
        x: area.x + area.width.saturating_sub(width + 1),
        y: area.y + area.height.saturating_sub(height + 1),
        width,
        height,
    };
    let bubble = Paragraph::new(Line::from(" Chat ").centered())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.accent)),
        )
        .style(Style::default().fg(theme.fg).bg(theme.widget_bg));
    f.render_widget(Clear, rect);
    f.render_widget(bubble, rect);
}

/// Anchor the widget to the bottom-right corner, like a floating chat window.
fn widget_rect(area: Rect) -> Rect {
    let width = area.width.saturating_sub(2).min(64);
    let height = (area.height.saturating_mul(3) / 4).max(12).min(area.height.saturating_sub(1));
    Rect {
        x: area.x + area.width.saturating_sub(width + 1),
        y: area.y + area.height.saturating_sub(height + 1),
        width,
        height,
    }
}

fn draw_widget(f: &mut ratatui::Frame, rect: Rect, state: &mut AppState) {
    let theme = state.theme.clone();
    f.render_widget(Clear, rect);

    let outer = Block::default()
        .borders(Borders::ALL)
        .title(" AI Assistant ")
        .border_style(Style::default().fg(theme.border))
        .style(Style::default().bg(theme.widget_bg));
    let inner = outer.inner(rect);
    f.render_widget(outer, rect);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // subtitle
            Constraint::Min(3),    // chat
            Constraint::Length(3), // input
            Constraint::Length(1), // status
        ])
        .split(inner);

    let subtitle = Paragraph::new(Line::from(Span::styled(
        format!(
            "Powered by {} | Ask anything about admissions",
            state.session.gateway_name()
        ),
        Style::default().fg(theme.muted),
    )));
    f.render_widget(subtitle, chunks[0]);

    let snapshot = state.session.snapshot();
    let chat_lines = render::build_chat_lines(&snapshot, state.ticks / 6, &theme);
    let total_lines = render::wrapped_height(&chat_lines, chunks[1].width);
    let visible_height = chunks[1].height as usize;
    state.total_content_lines = total_lines;
    state.visible_height = visible_height;

    let max_scroll = total_lines.saturating_sub(visible_height);
    let offset = state.scroll_offset.min(max_scroll);

    let chat = Paragraph::new(Text::from(chat_lines))
        .wrap(Wrap { trim: false })
        .scroll((offset as u16, 0));
    f.render_widget(chat, chunks[1]);

    draw_input(f, chunks[2], state, snapshot.pending, &theme);

    let status = Paragraph::new(Line::from(vec![
        Span::styled(
            format!(" {} ", state.settings.assistant.provider.as_str()),
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("| {}", state.status_text),
            Style::default().fg(if snapshot.last_error.is_some() {
                theme.error
            } else {
                theme.muted
            }),
        ),
    ]));
    f.render_widget(status, chunks[3]);
}

fn draw_input(f: &mut ratatui::Frame, area: Rect, state: &AppState, pending: bool, theme: &Theme) {
    let (title, border) = if pending {
        (" Waiting for reply... ", theme.muted)
    } else if state.input.starts_with('/') {
        (" Command ", theme.accent)
    } else {
        (" Ask anything... ", theme.border)
    };

    let input = Paragraph::new(state.input.as_str())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(border)),
        )
        .style(Style::default().fg(if pending { theme.muted } else { theme.fg }));
    f.render_widget(input, area);

    if state.notice.is_none() {
        let cursor_x = area.x + state.cursor_pos as u16 + 1;
        let max_x = area.x + area.width.saturating_sub(2);
        f.set_cursor_position((cursor_x.min(max_x), area.y + 1));
    }
}

fn draw_notice(f: &mut ratatui::Frame, area: Rect, notice: &str, theme: &Theme) {
    let height = (notice.lines().count() as u16 + 4).min(area.height);
    let width = area.width.saturating_sub(4).min(72);
    let rect = Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    };

    let mut lines: Vec<Line> = notice
        .lines()
        .map(|l| Line::from(Span::styled(l, Style::default().fg(theme.fg))))
        .collect();
    lines.push(Line::raw(""));
    lines.push(Line::from(Span::styled(
        "press any key",
        Style::default().fg(theme.muted),
    )));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.accent))
        .style(Style::default().bg(theme.widget_bg));

    f.render_widget(Clear, rect);
    f.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: false }), rect);
}
