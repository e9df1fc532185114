// 🖥️ Account browser
//
// Read-only full-screen view over a registry snapshot: one page of accounts
// with their lockout state, one page of the system-wide ledger. Enter on an
// account narrows the ledger to that account.

use crate::entities::account::SecurityState;
use crate::ledger::{Transaction, TransactionKind};
use crate::registry::AccountRegistry;
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;

const PAGE_JUMP: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Accounts,
    Ledger,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::Accounts => Page::Ledger,
            Page::Ledger => Page::Accounts,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Accounts => "Accounts",
            Page::Ledger => "Ledger",
        }
    }
}

/// One account as the browser shows it
#[derive(Debug, Clone)]
pub struct AccountRow {
    pub id: String,
    pub owner: String,
    pub kind: String,
    pub balance: f64,
    pub failed_attempts: u32,
    pub state: SecurityState,
}

pub struct App {
    pub accounts: Vec<AccountRow>,
    pub transactions: Vec<Transaction>,
    pub visible_transactions: Vec<Transaction>,
    pub account_filter: Option<String>,
    pub current_page: Page,
    pub accounts_state: TableState,
    pub ledger_state: TableState,
}

impl App {
    pub fn from_registry(registry: &AccountRegistry) -> Self {
        let accounts = registry
            .accounts()
            .map(|account| AccountRow {
                id: account.id().to_string(),
                owner: account.owner().to_string(),
                kind: account.kind().name().to_string(),
                balance: account.balance(),
                failed_attempts: account.failed_attempts(),
                state: account.security_state(),
            })
            .collect();

        Self::new(accounts, registry.ledger().all().to_vec())
    }

    pub fn new(accounts: Vec<AccountRow>, transactions: Vec<Transaction>) -> Self {
        let mut accounts_state = TableState::default();
        if !accounts.is_empty() {
            accounts_state.select(Some(0));
        }
        let mut ledger_state = TableState::default();
        if !transactions.is_empty() {
            ledger_state.select(Some(0));
        }

        App {
            visible_transactions: transactions.clone(),
            accounts,
            transactions,
            account_filter: None,
            current_page: Page::Accounts,
            accounts_state,
            ledger_state,
        }
    }

    pub fn selected_account(&self) -> Option<&AccountRow> {
        self.accounts_state
            .selected()
            .and_then(|i| self.accounts.get(i))
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
    }

    /// Show only the selected account's ledger entries
    pub fn focus_selected_account(&mut self) {
        let Some(account_id) = self.selected_account().map(|row| row.id.clone()) else {
            return;
        };
        self.visible_transactions = self
            .transactions
            .iter()
            .filter(|tx| tx.account_id == account_id)
            .cloned()
            .collect();
        self.account_filter = Some(account_id);
        self.current_page = Page::Ledger;
        self.reset_ledger_selection();
    }

    pub fn clear_filter(&mut self) {
        self.visible_transactions = self.transactions.clone();
        self.account_filter = None;
        self.reset_ledger_selection();
    }

    fn reset_ledger_selection(&mut self) {
        let first = if self.visible_transactions.is_empty() {
            None
        } else {
            Some(0)
        };
        self.ledger_state.select(first);
    }

    fn current_len(&self) -> usize {
        match self.current_page {
            Page::Accounts => self.accounts.len(),
            Page::Ledger => self.visible_transactions.len(),
        }
    }

    fn current_state(&mut self) -> &mut TableState {
        match self.current_page {
            Page::Accounts => &mut self.accounts_state,
            Page::Ledger => &mut self.ledger_state,
        }
    }

    pub fn next(&mut self) {
        let len = self.current_len();
        if len == 0 {
            return;
        }
        let state = self.current_state();
        let i = match state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.current_len();
        if len == 0 {
            return;
        }
        let state = self.current_state();
        let i = match state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        state.select(Some(i));
    }

    pub fn page_down(&mut self) {
        let len = self.current_len();
        if len == 0 {
            return;
        }
        let state = self.current_state();
        let i = state
            .selected()
            .map(|i| (i + PAGE_JUMP).min(len - 1))
            .unwrap_or(0);
        state.select(Some(i));
    }

    pub fn page_up(&mut self) {
        if self.current_len() == 0 {
            return;
        }
        let state = self.current_state();
        let i = state
            .selected()
            .map(|i| i.saturating_sub(PAGE_JUMP))
            .unwrap_or(0);
        state.select(Some(i));
    }

    pub fn first(&mut self) {
        if self.current_len() > 0 {
            self.current_state().select(Some(0));
        }
    }

    pub fn last(&mut self) {
        let len = self.current_len();
        if len > 0 {
            self.current_state().select(Some(len - 1));
        }
    }

    pub fn total_balance(&self) -> f64 {
        self.accounts.iter().map(|row| row.balance).sum()
    }

    pub fn locked_count(&self) -> usize {
        self.accounts
            .iter()
            .filter(|row| row.state != SecurityState::Unlocked)
            .count()
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res?;
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    return Ok(())
                }
                KeyCode::Tab | KeyCode::BackTab => app.next_page(),
                KeyCode::Enter if app.current_page == Page::Accounts => {
                    app.focus_selected_account()
                }
                KeyCode::Char('c') => app.clear_filter(),
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                KeyCode::PageDown => app.page_down(),
                KeyCode::PageUp => app.page_up(),
                KeyCode::Home => app.first(),
                KeyCode::End => app.last(),
                _ => {}
            }
        }
    }
}

// ============================================================================
// RENDERING
// ============================================================================

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.size());

    render_header(f, chunks[0], app);
    match app.current_page {
        Page::Accounts => render_accounts(f, chunks[1], app),
        Page::Ledger => render_ledger(f, chunks[1], app),
    }
    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let mut tab_spans = vec![];
    for (i, page) in [Page::Accounts, Page::Ledger].iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }
        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        tab_spans.push(Span::styled(page.title().to_string(), style));
    }

    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Accounts: {}", app.accounts.len()),
        Style::default().fg(Color::White),
    ));
    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Balance: {:.2}", app.total_balance()),
        Style::default().fg(Color::Green),
    ));
    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Locked: {}", app.locked_count()),
        Style::default().fg(Color::Red),
    ));

    let header = Paragraph::new(vec![Line::from(tab_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );
    f.render_widget(header, area);
}

fn header_row(titles: &[&'static str]) -> Row<'static> {
    let cells = titles.iter().map(|h| {
        Cell::from(*h).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    });
    Row::new(cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1)
}

fn state_label(state: SecurityState) -> (&'static str, Color) {
    match state {
        SecurityState::Unlocked => ("ok", Color::Green),
        SecurityState::LockedWarning => ("locked", Color::Yellow),
        SecurityState::LockedFinal => ("final warning", Color::Red),
        SecurityState::MarkedForDeletion => ("deleting", Color::Magenta),
    }
}

fn render_accounts(f: &mut Frame, area: Rect, app: &mut App) {
    let rows = app.accounts.iter().map(|row| {
        let (label, color) = state_label(row.state);
        Row::new(vec![
            Cell::from(row.id.clone()),
            Cell::from(truncate(&row.owner, 24)),
            Cell::from(row.kind.clone()),
            Cell::from(format!("{:.2}", row.balance)),
            Cell::from(row.failed_attempts.to_string()),
            Cell::from(label).style(Style::default().fg(color)),
        ])
        .height(1)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(10),
            Constraint::Length(26),
            Constraint::Length(10),
            Constraint::Length(14),
            Constraint::Length(8),
            Constraint::Length(15),
        ],
    )
    .header(header_row(&["Account", "Owner", "Type", "Balance", "Failed", "Security"]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Accounts "),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.accounts_state);
}

fn render_ledger(f: &mut Frame, area: Rect, app: &mut App) {
    let rows = app.visible_transactions.iter().map(|tx| {
        let color = match tx.kind {
            TransactionKind::Deposit => Color::Green,
            TransactionKind::Withdrawal => Color::Red,
        };
        Row::new(vec![
            Cell::from(tx.id.clone()),
            Cell::from(tx.account_id.clone()),
            Cell::from(tx.kind.as_str()).style(Style::default().fg(color)),
            Cell::from(format!("{:.2}", tx.amount)).style(Style::default().fg(color)),
            Cell::from(tx.date.clone()),
        ])
        .height(1)
    });

    let title = match &app.account_filter {
        Some(account_id) => format!(" Ledger: {} ", account_id),
        None => " Ledger ".to_string(),
    };

    let table = Table::new(
        rows,
        [
            Constraint::Length(13),
            Constraint::Length(10),
            Constraint::Length(12),
            Constraint::Length(14),
            Constraint::Length(26),
        ],
    )
    .header(header_row(&["Transaction", "Account", "Kind", "Amount", "Date"]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(title),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.ledger_state);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let (selected, total) = match app.current_page {
        Page::Accounts => (app.accounts_state.selected(), app.accounts.len()),
        Page::Ledger => (app.ledger_state.selected(), app.visible_transactions.len()),
    };
    let selected = selected.map(|i| i + 1).unwrap_or(0);

    let mut status_spans = vec![Span::styled(
        format!(" Row: {}/{} ", selected, total),
        Style::default().fg(Color::Cyan),
    )];

    if let Some(account_id) = &app.account_filter {
        status_spans.push(Span::raw(" | "));
        status_spans.push(Span::styled(
            format!("Filter: {}", account_id),
            Style::default().fg(Color::Green),
        ));
        status_spans.push(Span::raw(" ("));
        status_spans.push(Span::styled("c", Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(" clear)"));
    }

    status_spans.push(Span::raw(" | "));
    status_spans.push(Span::styled("Enter", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Account ledger | "));
    status_spans.push(Span::styled("Tab", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Page | "));
    status_spans.push(Span::styled("↑/↓", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Nav | "));
    status_spans.push(Span::styled("q", Style::default().fg(Color::Red)));
    status_spans.push(Span::raw(" Quit"));

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );
    f.render_widget(status_bar, area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
