use std::{cmp, collections::HashSet, io, thread, time::Duration};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tracing::{info, warn};
use valuesort_core::{
    models::{BinId, Card},
    persist::StateFile,
    store::SortState,
};

const TICK_RATE: Duration = Duration::from_millis(250);

#[derive(Debug, Clone)]
struct Theme {
    primary_fg: Color,
    accent: Color,
    muted: Color,
    selection_bg: Color,
    selection_fg: Color,
    warning: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_fg: Color::White,
            accent: Color::Cyan,
            muted: Color::DarkGray,
            selection_bg: Color::DarkGray,
            selection_fg: Color::White,
            warning: Color::Yellow,
        }
    }
}

/// Which region of the screen key presses act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Pool,
    Bin(BinId),
}

/// A user intention resolved from a key press.
///
/// Intents carry their own card/bin parameters instead of capturing them
/// from surrounding scope, so the store can be exercised without any
/// rendered view.
#[derive(Debug, Clone)]
enum Intent {
    DropCard { card: Card, bin: BinId },
    RemoveCard { bin: BinId, name: String },
    ToggleDescription { name: String },
}

enum AppEvent {
    Input(Event),
    Tick,
}

/// Terminal front end binding user intents to the sort store.
pub struct ValueSortApp {
    state: SortState,
    state_file: StateFile,
    ui: UiState,
    theme: Theme,
}

impl ValueSortApp {
    pub fn new(state: SortState, state_file: StateFile) -> Self {
        Self {
            state,
            state_file,
            ui: UiState::default(),
            theme: Theme::default(),
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let total = self.state.pool().len() + self.state.bins().total();
        let mut status = format!("Loaded {total} value cards");
        if !self.state_file.available() {
            status.push_str(" • persistence unavailable, sorting will not be saved");
        } else if self.state.bins().total() > 0 {
            status.push_str(&format!(
                " • restored {} sorted from a previous session",
                self.state.bins().total()
            ));
        }
        self.ui.set_status(status);

        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(128);
        spawn_input_thread(event_tx);

        loop {
            terminal.draw(|frame| self.draw(frame))?;
            if self.ui.should_quit {
                break;
            }

            let maybe_event = event_rx.recv().await;
            if !self.process_app_event(maybe_event) {
                break;
            }

            if self.ui.should_quit {
                break;
            }
        }

        restore_terminal(&mut terminal)?;
        Ok(())
    }

    fn process_app_event(&mut self, maybe_event: Option<AppEvent>) -> bool {
        match maybe_event {
            Some(AppEvent::Input(event)) => {
                self.handle_input(event);
                true
            }
            Some(AppEvent::Tick) => true,
            None => false,
        }
    }

    fn handle_input(&mut self, event: Event) {
        if let Event::Key(key) = event {
            if self.handle_global_shortcut(&key) {
                return;
            }
            match self.ui.focus {
                Focus::Pool => self.handle_pool_key(key),
                Focus::Bin(bin) => self.handle_bin_key(bin, key),
            }
        }
    }

    fn handle_global_shortcut(&mut self, key: &KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.ui.should_quit = true;
                true
            }
            KeyCode::Char('q') => {
                self.ui.should_quit = true;
                true
            }
            KeyCode::Tab => {
                self.ui.cycle_focus(1);
                self.clamp_cursors();
                true
            }
            KeyCode::BackTab => {
                self.ui.cycle_focus(-1);
                self.clamp_cursors();
                true
            }
            _ => false,
        }
    }

    fn handle_pool_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.ui.move_pool_cursor(-1, self.state.pool().len()),
            KeyCode::Down | KeyCode::Char('j') => self.ui.move_pool_cursor(1, self.state.pool().len()),
            KeyCode::Home => {
                let len = self.state.pool().len();
                self.ui.move_pool_cursor(-(len as isize), len);
            }
            KeyCode::End => {
                let len = self.state.pool().len();
                self.ui.move_pool_cursor(len as isize, len);
            }
            KeyCode::PageUp => {
                let page = self.ui.pool_height.max(1) as isize;
                self.ui.move_pool_cursor(-page, self.state.pool().len());
            }
            KeyCode::PageDown => {
                let page = self.ui.pool_height.max(1) as isize;
                self.ui.move_pool_cursor(page, self.state.pool().len());
            }
            KeyCode::Char(ch @ ('1' | '2' | '3')) => {
                if let Some(intent) = self.drop_intent(ch) {
                    self.apply_intent(intent);
                }
            }
            KeyCode::Enter | KeyCode::Char('i') => {
                if let Some(card) = self.selected_pool_card() {
                    let intent = Intent::ToggleDescription {
                        name: card.name.clone(),
                    };
                    self.apply_intent(intent);
                }
            }
            _ => {}
        }
    }

    fn handle_bin_key(&mut self, bin: BinId, key: KeyEvent) {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.ui.move_bin_cursor(-1, self.state.bin(bin).len())
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.ui.move_bin_cursor(1, self.state.bin(bin).len())
            }
            KeyCode::Left | KeyCode::Char('h') => {
                self.ui.cycle_focus(-1);
                self.clamp_cursors();
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.ui.cycle_focus(1);
                self.clamp_cursors();
            }
            KeyCode::Esc => {
                self.ui.focus = Focus::Pool;
                self.clamp_cursors();
            }
            KeyCode::Char('d') | KeyCode::Delete | KeyCode::Backspace => {
                if let Some(card) = self.state.bin(bin).get(self.ui.bin_cursor) {
                    let intent = Intent::RemoveCard {
                        bin,
                        name: card.name.clone(),
                    };
                    self.apply_intent(intent);
                }
            }
            _ => {}
        }
    }

    fn drop_intent(&self, key: char) -> Option<Intent> {
        let bin = match key {
            '1' => BinId::VeryImportant,
            '2' => BinId::SomewhatImportant,
            '3' => BinId::NotImportant,
            _ => return None,
        };
        let card = self.selected_pool_card()?.clone();
        Some(Intent::DropCard { card, bin })
    }

    fn selected_pool_card(&self) -> Option<&Card> {
        self.state.pool().get(self.ui.pool_cursor)
    }

    fn apply_intent(&mut self, intent: Intent) {
        match intent {
            Intent::DropCard { card, bin } => self.drop_card(card, bin),
            Intent::RemoveCard { bin, name } => self.remove_card(bin, &name),
            Intent::ToggleDescription { name } => {
                // Pure view state: no store call, nothing saved.
                self.ui.toggle_description(&name);
            }
        }
    }

    fn drop_card(&mut self, card: Card, bin: BinId) {
        let name = card.name.clone();
        self.state.move_to_bin(card, bin);
        self.state_file.save(self.state.bins());
        self.ui.expanded.remove(&name);
        self.clamp_cursors();
        info!(card = %name, bin = %bin, "Card sorted");

        if self.state.is_complete() {
            self.ui
                .set_status("All values sorted. Press q when you are done".to_string());
        } else {
            self.ui
                .set_status(format!("{name} → {}", bin.label()));
        }
    }

    fn remove_card(&mut self, bin: BinId, name: &str) {
        match self.state.move_to_pool(bin, name) {
            Ok(card) => {
                self.state_file.save(self.state.bins());
                self.clamp_cursors();
                info!(card = %card.name, bin = %bin, "Card returned to pool");
                self.ui
                    .set_status(format!("{} returned to the pool", card.name));
            }
            Err(err) => {
                // Treated as a no-op beyond the notice; the view stays
                // consistent with the store either way.
                warn!("Removal failed: {err}");
                self.ui.set_status(format!("Nothing to remove: {err}"));
            }
        }
    }

    fn clamp_cursors(&mut self) {
        self.ui.clamp_pool_cursor(self.state.pool().len());
        if let Focus::Bin(bin) = self.ui.focus {
            self.ui.clamp_bin_cursor(self.state.bin(bin).len());
        }
    }

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.size();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage(40),
                Constraint::Min(8),
                Constraint::Length(3),
            ])
            .split(area);

        self.render_bins(frame, chunks[0]);
        self.render_pool(frame, chunks[1]);
        self.render_status(frame, chunks[2]);
    }

    fn render_bins(&mut self, frame: &mut Frame, area: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(33),
                Constraint::Percentage(34),
                Constraint::Percentage(33),
            ])
            .split(area);

        for (idx, bin) in BinId::ALL.into_iter().enumerate() {
            self.render_bin(frame, columns[idx], bin);
        }
    }

    fn render_bin(&mut self, frame: &mut Frame, area: Rect, bin: BinId) {
        let focused = self.ui.focus == Focus::Bin(bin);
        let cards = self.state.bin(bin);
        let title = format!("{} ({})", bin.label(), cards.len());

        let border_style = if focused {
            Style::default().fg(self.theme.accent)
        } else {
            Style::default().fg(self.theme.muted)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(title);

        let items: Vec<ListItem> = if cards.is_empty() {
            vec![ListItem::new(Line::from(Span::styled(
                "  drop cards here",
                Style::default().fg(self.theme.muted),
            )))]
        } else {
            cards
                .iter()
                .enumerate()
                .map(|(idx, card)| {
                    let marker = if focused && idx == self.ui.bin_cursor {
                        Span::styled("▶ ", Style::default().fg(self.theme.accent))
                    } else {
                        Span::raw("  ")
                    };
                    ListItem::new(Line::from(vec![marker, Span::raw(card.name.clone())]))
                })
                .collect()
        };

        let mut list_state = ListState::default();
        if focused && !cards.is_empty() {
            list_state.select(Some(self.ui.bin_cursor.min(cards.len() - 1)));
        }

        let list = List::new(items).block(block).highlight_style(
            Style::default()
                .bg(self.theme.selection_bg)
                .fg(self.theme.selection_fg),
        );
        frame.render_stateful_widget(list, area, &mut list_state);
    }

    fn render_pool(&mut self, frame: &mut Frame, area: Rect) {
        let focused = self.ui.focus == Focus::Pool;
        let pool = self.state.pool();
        self.ui.pool_height = area.height.saturating_sub(2) as usize;
        self.ui.ensure_pool_visible(pool.len());

        let border_style = if focused {
            Style::default().fg(self.theme.accent)
        } else {
            Style::default().fg(self.theme.muted)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(format!("Values ({} remaining)", pool.len()));

        let items: Vec<ListItem> = if pool.is_empty() {
            vec![ListItem::new(Line::from(Span::styled(
                "  All values sorted",
                Style::default().fg(self.theme.accent),
            )))]
        } else {
            let visible = self.ui.pool_height.max(1);
            let end = cmp::min(self.ui.pool_offset + visible, pool.len());
            pool[self.ui.pool_offset..end]
                .iter()
                .enumerate()
                .map(|(idx, card)| {
                    let absolute_idx = self.ui.pool_offset + idx;
                    let selected = focused && absolute_idx == self.ui.pool_cursor;
                    let marker = if selected {
                        Span::styled("▶ ", Style::default().fg(self.theme.accent))
                    } else {
                        Span::raw("  ")
                    };
                    let name_style = if selected {
                        Style::default()
                            .fg(self.theme.primary_fg)
                            .add_modifier(Modifier::BOLD)
                    } else {
                        Style::default().fg(self.theme.primary_fg)
                    };
                    let mut lines = vec![Line::from(vec![
                        marker,
                        Span::styled(card.name.clone(), name_style),
                    ])];
                    if self.ui.is_expanded(&card.name) {
                        lines.push(Line::from(Span::styled(
                            format!("    {}", card.description),
                            Style::default().fg(self.theme.muted),
                        )));
                    }
                    ListItem::new(lines)
                })
                .collect()
        };

        let list = List::new(items).block(block);
        frame.render_widget(list, area);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Status");
        let help = match self.ui.focus {
            Focus::Pool => "↑/↓ select  1/2/3 sort  i description  Tab bins  q quit",
            Focus::Bin(_) => "↑/↓ select  d remove  ←/→ bins  Esc pool  q quit",
        };
        let status_style = if self.state_file.available() {
            Style::default().fg(self.theme.primary_fg)
        } else {
            Style::default().fg(self.theme.warning)
        };
        let paragraph = Paragraph::new(vec![
            Line::from(Span::styled(self.ui.status.clone(), status_style)),
            Line::from(Span::styled(help, Style::default().fg(self.theme.muted))),
        ])
        .block(block)
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}

fn spawn_input_thread(sender: mpsc::Sender<AppEvent>) {
    thread::spawn(move || loop {
        match event::poll(TICK_RATE) {
            Ok(true) => match event::read() {
                Ok(evt) => {
                    if sender.blocking_send(AppEvent::Input(evt)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
            Ok(false) => {
                if sender.blocking_send(AppEvent::Tick).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });
}

struct UiState {
    focus: Focus,
    pool_cursor: usize,
    pool_offset: usize,
    pool_height: usize,
    bin_cursor: usize,
    expanded: HashSet<String>,
    status: String,
    should_quit: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            focus: Focus::Pool,
            pool_cursor: 0,
            pool_offset: 0,
            pool_height: 1,
            bin_cursor: 0,
            expanded: HashSet::new(),
            status: "Ready".to_string(),
            should_quit: false,
        }
    }
}

impl UiState {
    fn set_status(&mut self, message: String) {
        self.status = message;
    }

    fn cycle_focus(&mut self, delta: isize) {
        // Pool, then the three bins in display order.
        let order = [
            Focus::Pool,
            Focus::Bin(BinId::VeryImportant),
            Focus::Bin(BinId::SomewhatImportant),
            Focus::Bin(BinId::NotImportant),
        ];
        let current = order
            .iter()
            .position(|focus| *focus == self.focus)
            .unwrap_or(0);
        let len = order.len() as isize;
        let next = (current as isize + delta).rem_euclid(len) as usize;
        self.focus = order[next];
        self.bin_cursor = 0;
    }

    fn move_pool_cursor(&mut self, delta: isize, len: usize) {
        if len == 0 {
            self.pool_cursor = 0;
            return;
        }
        let max = (len - 1) as isize;
        let next = (self.pool_cursor as isize).saturating_add(delta).clamp(0, max);
        self.pool_cursor = next as usize;
        self.ensure_pool_visible(len);
    }

    fn move_bin_cursor(&mut self, delta: isize, len: usize) {
        if len == 0 {
            self.bin_cursor = 0;
            return;
        }
        let max = (len - 1) as isize;
        let next = (self.bin_cursor as isize).saturating_add(delta).clamp(0, max);
        self.bin_cursor = next as usize;
    }

    fn clamp_pool_cursor(&mut self, len: usize) {
        if len == 0 {
            self.pool_cursor = 0;
            self.pool_offset = 0;
        } else if self.pool_cursor >= len {
            self.pool_cursor = len - 1;
        }
        self.ensure_pool_visible(len);
    }

    fn clamp_bin_cursor(&mut self, len: usize) {
        if len == 0 {
            self.bin_cursor = 0;
        } else if self.bin_cursor >= len {
            self.bin_cursor = len - 1;
        }
    }

    fn ensure_pool_visible(&mut self, len: usize) {
        if len == 0 || self.pool_height == 0 {
            self.pool_offset = 0;
            return;
        }
        let height = self.pool_height;
        if self.pool_cursor < self.pool_offset {
            self.pool_offset = self.pool_cursor;
        } else if self.pool_cursor >= self.pool_offset + height {
            self.pool_offset = self.pool_cursor + 1 - height;
        }
        let max_offset = len.saturating_sub(height);
        self.pool_offset = self.pool_offset.min(max_offset);
    }

    fn is_expanded(&self, name: &str) -> bool {
        self.expanded.contains(name)
    }

    /// Toggle description visibility for a card, returning the new state.
    fn toggle_description(&mut self, name: &str) -> bool {
        if self.expanded.remove(name) {
            false
        } else {
            self.expanded.insert(name.to_string());
            true
        }
    }
}
