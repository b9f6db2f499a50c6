use anyhow::Result;
use cap_table::{
    format_percent, metrics, CapTable, Entry, EntryField, EntryId, ReportData,
};
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
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    CapTable,
    Breakdown,
    History,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::CapTable => Page::Breakdown,
            Page::Breakdown => Page::History,
            Page::History => Page::CapTable,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::CapTable => Page::History,
            Page::Breakdown => Page::CapTable,
            Page::History => Page::Breakdown,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::CapTable => "Cap Table",
            Page::Breakdown => "Ownership Breakdown",
            Page::History => "Valuation History",
        }
    }
}

/// What keyboard input currently feeds
#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Normal,
    EditCell(EntryId, EntryField),
    FilterRound,
    FilterClass,
    Email,
    ImportPath,
    ExportPath,
}

impl Mode {
    fn prompt(&self) -> &str {
        match self {
            Mode::Normal => "",
            Mode::EditCell(_, field) => match field {
                EntryField::Name => "Name",
                EntryField::Role => "Role",
                EntryField::Shares => "Shares",
                EntryField::Investment => "Investment",
                EntryField::ShareClass => "Class",
                EntryField::Round => "Round",
                EntryField::Vesting => "Vesting",
                EntryField::DilutionProtection => "Dilution protection",
                EntryField::Convertibles => "Convertibles",
                EntryField::Notes => "Notes",
            },
            Mode::FilterRound => "Filter by Round",
            Mode::FilterClass => "Filter by Class",
            Mode::Email => "Report email",
            Mode::ImportPath => "Import JSON file",
            Mode::ExportPath => "Export file (.json or .csv)",
        }
    }
}

/// Visible columns, in the order the original table lays them out.
/// The ownership column is computed and not editable.
const COLUMNS: [(&str, Option<EntryField>); 8] = [
    ("Name", Some(EntryField::Name)),
    ("Role", Some(EntryField::Role)),
    ("Shares", Some(EntryField::Shares)),
    ("% Ownership", None),
    ("Investment", Some(EntryField::Investment)),
    ("Class", Some(EntryField::ShareClass)),
    ("Round", Some(EntryField::Round)),
    ("Notes", Some(EntryField::Notes)),
];

pub struct App {
    pub table: CapTable,
    pub state: TableState,
    pub selected_col: usize,
    pub current_page: Page,
    pub mode: Mode,
    pub input: String,
    pub email: String,
    pub status: Option<String>,
}

impl App {
    pub fn new(table: CapTable) -> Self {
        let mut state = TableState::default();
        if !table.is_empty() {
            state.select(Some(0));
        }

        Self {
            table,
            state,
            selected_col: 0,
            current_page: Page::CapTable,
            mode: Mode::Normal,
            input: String::new(),
            email: String::new(),
            status: None,
        }
    }

    fn visible_len(&self) -> usize {
        self.table.filtered_entries().len()
    }

    fn selected_entry_id(&self) -> Option<EntryId> {
        let view = self.table.filtered_entries();
        self.state.selected().and_then(|i| view.get(i).map(|e| e.id))
    }

    pub fn next_row(&mut self) {
        let len = self.visible_len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => {
                if i >= len - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous_row(&mut self) {
        let len = self.visible_len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => {
                if i == 0 {
                    len - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn next_col(&mut self) {
        self.selected_col = (self.selected_col + 1) % COLUMNS.len();
    }

    pub fn previous_col(&mut self) {
        self.selected_col = (self.selected_col + COLUMNS.len() - 1) % COLUMNS.len();
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.previous();
    }

    /// Reset the row selection after the visible set changed
    fn reselect(&mut self) {
        if self.visible_len() == 0 {
            self.state.select(None);
        } else {
            self.state.select(Some(0));
        }
    }

    pub fn add_entry(&mut self) {
        self.table.add_entry();
        // Jump to the new row if it is visible under the current filter
        let len = self.visible_len();
        if len > 0 {
            self.state.select(Some(len - 1));
        }
        self.status = Some("Entry added".to_string());
    }

    pub fn submit(&mut self) {
        let snapshot = self.table.submit();
        self.status = Some(format!(
            "Snapshot #{} taken, post-money ${:.2}",
            self.table.history().len(),
            snapshot.valuation
        ));
    }

    pub fn begin_edit(&mut self) {
        let Some(id) = self.selected_entry_id() else {
            self.status = Some("No entry selected".to_string());
            return;
        };
        match COLUMNS[self.selected_col].1 {
            Some(field) => {
                self.input = self
                    .table
                    .entry(id)
                    .map(|e| field.get(e))
                    .unwrap_or_default();
                self.mode = Mode::EditCell(id, field);
            }
            None => {
                self.status = Some("% Ownership is computed, not editable".to_string());
            }
        }
    }

    fn begin_input(&mut self, mode: Mode, initial: String) {
        self.input = initial;
        self.mode = mode;
    }

    pub fn clear_filters(&mut self) {
        self.table.filter.clear();
        self.reselect();
        self.status = Some("Filters cleared".to_string());
    }

    /// Apply whatever the input buffer was feeding
    pub fn commit_input(&mut self) {
        let mode = std::mem::replace(&mut self.mode, Mode::Normal);
        let input = std::mem::take(&mut self.input);

        match mode {
            Mode::Normal => {}
            Mode::EditCell(id, field) => {
                match self.table.update_field(id, field, &input) {
                    Ok(()) => self.status = None,
                    Err(err) => self.status = Some(format!("✗ {}", err)),
                }
            }
            Mode::FilterRound => {
                self.table.filter.round = input;
                self.reselect();
            }
            Mode::FilterClass => {
                self.table.filter.share_class = input;
                self.reselect();
            }
            Mode::Email => {
                self.email = input;
            }
            Mode::ImportPath => self.import_from(&input),
            Mode::ExportPath => self.export_to(&input),
        }
    }

    pub fn cancel_input(&mut self) {
        self.mode = Mode::Normal;
        self.input.clear();
    }

    fn import_from(&mut self, path: &str) {
        match cap_table::load_entries(Path::new(path)) {
            Ok(entries) => {
                let count = self.table.replace_all(entries);
                self.reselect();
                self.status = Some(format!("✓ Imported {} entries", count));
            }
            Err(err) => {
                // Store untouched on failure
                self.status = Some(format!("✗ Import failed: {:#}", err));
            }
        }
    }

    fn export_to(&mut self, path: &str) {
        let path = Path::new(path);
        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let result = if is_json {
            cap_table::export::write_json(path, self.table.entries())
        } else {
            cap_table::export::write_csv(path, self.table.entries())
        };

        self.status = match result {
            Ok(()) => Some(format!("✓ Exported {} entries to {}", self.table.len(), path.display())),
            Err(err) => Some(format!("✗ Export failed: {:#}", err)),
        };
    }

    /// Deliverable report bundle, or the reason there is none yet
    pub fn report_status(&self) -> String {
        if !cap_table::can_deliver_report(&self.email) {
            return "enter an email ('m') to deliver the report".to_string();
        }
        let data = ReportData::build(&self.table);
        format!(
            "report ready for {} ({} entries)",
            self.email.trim(),
            data.entries.len()
        )
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if app.mode != Mode::Normal {
                match key.code {
                    KeyCode::Enter => app.commit_input(),
                    KeyCode::Esc => app.cancel_input(),
                    KeyCode::Backspace => {
                        app.input.pop();
                    }
                    KeyCode::Char(c) => app.input.push(c),
                    _ => {}
                }
                continue;
            }

            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Tab => {
                    if key.modifiers.contains(KeyModifiers::SHIFT) {
                        app.previous_page();
                    } else {
                        app.next_page();
                    }
                }
                KeyCode::Down | KeyCode::Char('j') => app.next_row(),
                KeyCode::Up | KeyCode::Char('k') => app.previous_row(),
                KeyCode::Right | KeyCode::Char('l') => app.next_col(),
                KeyCode::Left | KeyCode::Char('h') => app.previous_col(),
                KeyCode::Enter | KeyCode::Char('e') => app.begin_edit(),
                KeyCode::Char('a') => app.add_entry(),
                KeyCode::Char('s') => app.submit(),
                KeyCode::Char('r') => {
                    let current = app.table.filter.round.clone();
                    app.begin_input(Mode::FilterRound, current);
                }
                KeyCode::Char('c') => {
                    let current = app.table.filter.share_class.clone();
                    app.begin_input(Mode::FilterClass, current);
                }
                KeyCode::Char('x') => app.clear_filters(),
                KeyCode::Char('m') => {
                    let current = app.email.clone();
                    app.begin_input(Mode::Email, current);
                }
                KeyCode::Char('i') => app.begin_input(Mode::ImportPath, String::new()),
                KeyCode::Char('o') => app.begin_input(Mode::ExportPath, String::new()),
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation + valuation
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar / input prompt
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    match app.current_page {
        Page::CapTable => render_cap_table(f, chunks[1], app),
        Page::Breakdown => render_breakdown(f, chunks[1], app),
        Page::History => render_history(f, chunks[1], app),
    }

    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let entries = app.table.entries();
    let pages = [Page::CapTable, Page::Breakdown, Page::History];

    let mut tab_spans = vec![];
    for (i, page) in pages.iter().enumerate() {
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

        tab_spans.push(Span::styled(page.title(), style));
    }

    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Shares: {}", metrics::total_shares(entries)),
        Style::default().fg(Color::White),
    ));
    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Invested: ${:.0}", metrics::total_investment(entries)),
        Style::default().fg(Color::Green),
    ));
    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!(
            "Pre ${:.0} / Post ${:.0}",
            metrics::pre_money_valuation(entries),
            metrics::post_money_valuation(entries)
        ),
        Style::default().fg(Color::Cyan),
    ));
    if app.table.is_submitted() {
        tab_spans.push(Span::raw("  |  "));
        tab_spans.push(Span::styled("SUBMITTED", Style::default().fg(Color::Green)));
    }

    let header = Paragraph::new(Line::from(tab_spans))
        .block(Block::default().borders(Borders::ALL).title(" Editable Cap Table "));
    f.render_widget(header, area);
}

fn render_cap_table(f: &mut Frame, area: Rect, app: &mut App) {
    let all = app.table.entries().to_vec();
    let view: Vec<Entry> = app.table.filtered_entries().into_iter().cloned().collect();

    let header_cells = COLUMNS.iter().enumerate().map(|(i, (name, _))| {
        let style = if i == app.selected_col {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
        };
        Cell::from(*name).style(style)
    });
    let header = Row::new(header_cells).height(1);

    let rows = view.iter().map(|entry| {
        // Ownership is relative to the whole table, not the filtered view
        let pct = format_percent(metrics::ownership_percent(entry, &all));
        Row::new(vec![
            Cell::from(entry.name.clone()),
            Cell::from(entry.role.clone()),
            Cell::from(entry.shares.to_string()),
            Cell::from(pct),
            Cell::from(format!("{:.2}", entry.investment)),
            Cell::from(entry.share_class.clone()),
            Cell::from(entry.round.clone()),
            Cell::from(entry.notes.clone()),
        ])
    });

    let filter_note = if app.table.filter.is_active() {
        format!(
            " {} of {} entries (round='{}' class='{}') ",
            view.len(),
            all.len(),
            app.table.filter.round,
            app.table.filter.share_class
        )
    } else {
        format!(" {} entries ", all.len())
    };

    let table = Table::new(
        rows,
        [
            Constraint::Length(18),
            Constraint::Length(12),
            Constraint::Length(10),
            Constraint::Length(11),
            Constraint::Length(12),
            Constraint::Length(10),
            Constraint::Length(12),
            Constraint::Min(10),
        ],
    )
    .header(header)
    .block(Block::default().borders(Borders::ALL).title(filter_note))
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    );

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_breakdown(f: &mut Frame, area: Rect, app: &App) {
    if !app.table.is_submitted() {
        render_submit_hint(f, area, "Share Ownership Breakdown");
        return;
    }

    let all = app.table.entries().to_vec();
    let view: Vec<Entry> = app.table.filtered_entries().into_iter().cloned().collect();
    let slices = metrics::ownership_breakdown(&view);

    let header = Row::new(vec![
        Cell::from("Stakeholder").style(Style::default().add_modifier(Modifier::BOLD)),
        Cell::from("Shares").style(Style::default().add_modifier(Modifier::BOLD)),
        Cell::from("% Ownership").style(Style::default().add_modifier(Modifier::BOLD)),
    ]);

    let rows = slices.iter().zip(view.iter()).map(|(slice, entry)| {
        Row::new(vec![
            Cell::from(slice.name.clone()),
            Cell::from(slice.value.to_string()),
            Cell::from(format_percent(metrics::ownership_percent(entry, &all))),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(24),
            Constraint::Length(14),
            Constraint::Length(14),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Share Ownership Breakdown "),
    );

    f.render_widget(table, area);
}

fn render_history(f: &mut Frame, area: Rect, app: &App) {
    if !app.table.is_submitted() {
        render_submit_hint(f, area, "Valuation Over Time");
        return;
    }

    let points = metrics::valuation_series(app.table.history());

    let header = Row::new(vec![
        Cell::from("Date").style(Style::default().add_modifier(Modifier::BOLD)),
        Cell::from("Post-Money Valuation").style(Style::default().add_modifier(Modifier::BOLD)),
        Cell::from("Entries").style(Style::default().add_modifier(Modifier::BOLD)),
    ]);

    let rows = points
        .iter()
        .zip(app.table.history().iter())
        .map(|(point, snapshot)| {
            Row::new(vec![
                Cell::from(point.date.clone()),
                Cell::from(format!("${:.2}", point.valuation)),
                Cell::from(snapshot.entry_count().to_string()),
            ])
        });

    let table = Table::new(
        rows,
        [
            Constraint::Length(22),
            Constraint::Length(24),
            Constraint::Length(10),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" Valuation Over Time ({} snapshots, max 10) ", points.len())),
    );

    f.render_widget(table, area);
}

fn render_submit_hint(f: &mut Frame, area: Rect, title: &str) {
    let hint = Paragraph::new("Press 's' on the Cap Table page to submit a snapshot first.")
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL).title(format!(" {} ", title)));
    f.render_widget(hint, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let line = if app.mode != Mode::Normal {
        Line::from(vec![
            Span::styled(
                format!(" {}: ", app.mode.prompt()),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::raw(app.input.clone()),
            Span::styled("▏", Style::default().fg(Color::Yellow)),
            Span::styled(
                "  (Enter: apply, Esc: cancel)",
                Style::default().fg(Color::DarkGray),
            ),
        ])
    } else if let Some(status) = &app.status {
        Line::from(vec![
            Span::raw(format!(" {}  |  ", status)),
            Span::styled(app.report_status(), Style::default().fg(Color::DarkGray)),
        ])
    } else {
        Line::from(vec![
            Span::styled(
                " a:add  e:edit  s:submit  r/c:filter  x:clear  m:email  i:import  o:export  q:quit  |  ",
                Style::default().fg(Color::DarkGray),
            ),
            Span::raw(app.report_status()),
        ])
    };

    let bar = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    f.render_widget(bar, area);
}
