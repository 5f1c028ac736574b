use anyhow::Result;
use chrono::Duration;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use shufumate::calorie::{MAX_WEEKS, MAX_WEIGHT_KG, MIN_WEEKS, MIN_WEIGHT_KG};
use shufumate::education::{MAX_CHILDREN, MAX_CHILD_AGE, MIN_CHILD_AGE};
use shufumate::panel::{current_year, CATEGORY_SELECT_LABEL, REGION_SELECT_LABEL};
use shufumate::{render, AppMode, DealsSource, EducationTrack, ExpenseCategory, PanelInputs, PanelLine, PanelView, Theme};
use std::io;
use tracing::info;

const APP_TITLE: &str = "👩‍🍳 ShufuMate｜主婦の味方アプリ";
const APP_CAPTION: &str = "ダイエット・家計・予定・教育・人生設計・お得情報を一元管理";

const WEIGHT_STEP_KG: f64 = 0.5;
const AMOUNT_STEP_YEN: u64 = 100;
const MAX_AMOUNT_YEN: u64 = 999_999_999;

// ============================================================================
// FOCUS / FIELDS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Sidebar,
    Form,
}

/// One input widget on the current panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    CurrentWeight,
    TargetWeight,
    Weeks,
    ExpenseDate,
    ExpenseCategory,
    Amount,
    Memo,
    SubmitExpense,
    ScheduleDate,
    Description,
    SubmitSchedule,
    ChildCount,
    Track,
    ChildAge(usize),
    SheetUrl,
    Region,
    DealsCategory,
    Theme,
}

impl Field {
    pub fn label(&self) -> String {
        match self {
            Field::CurrentWeight => "現在の体重（kg）".to_string(),
            Field::TargetWeight => "目標体重（kg）".to_string(),
            Field::Weeks => "目標達成までの期間（週）".to_string(),
            Field::ExpenseDate => "日付".to_string(),
            Field::ExpenseCategory => "カテゴリ".to_string(),
            Field::Amount => "金額（円）".to_string(),
            Field::Memo => "メモ".to_string(),
            Field::SubmitExpense => "記録する".to_string(),
            Field::ScheduleDate => "予定日".to_string(),
            Field::Description => "予定内容".to_string(),
            Field::SubmitSchedule => "追加する".to_string(),
            Field::ChildCount => "子どもの人数".to_string(),
            Field::Track => "教育方針".to_string(),
            Field::ChildAge(i) => format!("子ども{}の現在の年齢", i + 1),
            Field::SheetUrl => "スプレッドシートCSVリンク".to_string(),
            Field::Region => REGION_SELECT_LABEL.to_string(),
            Field::DealsCategory => CATEGORY_SELECT_LABEL.to_string(),
            Field::Theme => "テーマ選択".to_string(),
        }
    }

    fn is_text(&self) -> bool {
        matches!(self, Field::Memo | Field::Description | Field::SheetUrl)
    }

    fn is_button(&self) -> bool {
        matches!(self, Field::SubmitExpense | Field::SubmitSchedule)
    }

    /// Form widgets (budget/schedule) and the URL box only re-run the panel
    /// on submit / Enter; every other widget re-runs it on change.
    fn reruns_on_change(&self) -> bool {
        !matches!(
            self,
            Field::ExpenseDate
                | Field::ExpenseCategory
                | Field::Amount
                | Field::Memo
                | Field::ScheduleDate
                | Field::Description
                | Field::SheetUrl
        )
    }
}

pub fn fields_for(mode: AppMode, inputs: &PanelInputs) -> Vec<Field> {
    match mode {
        AppMode::Recommendation => vec![],
        AppMode::Diet => vec![Field::CurrentWeight, Field::TargetWeight, Field::Weeks],
        AppMode::Budget => vec![
            Field::ExpenseDate,
            Field::ExpenseCategory,
            Field::Amount,
            Field::Memo,
            Field::SubmitExpense,
        ],
        AppMode::Schedule => vec![Field::ScheduleDate, Field::Description, Field::SubmitSchedule],
        AppMode::Education => {
            let mut fields = vec![Field::ChildCount, Field::Track];
            fields.extend((0..inputs.education.child_ages.len()).map(Field::ChildAge));
            fields
        }
        AppMode::Deals => vec![Field::SheetUrl, Field::Region, Field::DealsCategory],
        AppMode::Settings => vec![Field::Theme],
    }
}

fn cycle<T: Copy + PartialEq>(all: &[T], current: T, delta: i32) -> T {
    let len = all.len() as i32;
    let index = all.iter().position(|v| *v == current).unwrap_or(0) as i32;
    all[(index + delta).rem_euclid(len) as usize]
}

fn cycle_option(options: &[String], current: Option<&str>, delta: i32) -> Option<String> {
    if options.is_empty() {
        return None;
    }
    let len = options.len() as i32;
    let index = current
        .and_then(|c| options.iter().position(|o| o == c))
        .unwrap_or(0) as i32;
    options.get((index + delta).rem_euclid(len) as usize).cloned()
}

/// Options and current value of a data-driven select on the last render
fn select_state<'a>(view: &'a PanelView, label: &str) -> (&'a [String], Option<&'a str>) {
    for line in &view.lines {
        if let PanelLine::Select { label: l, options, selected } = line {
            if l == label {
                return (options.as_slice(), selected.as_deref());
            }
        }
    }
    (&[], None)
}

// ============================================================================
// APP
// ============================================================================

pub struct App {
    pub mode: AppMode,
    pub inputs: PanelInputs,
    pub focus: Focus,
    pub field_index: usize,
    pub view: PanelView,
    pub menu_state: ListState,
    pub should_quit: bool,
    source: Box<dyn DealsSource>,
}

impl App {
    pub fn new(inputs: PanelInputs, source: Box<dyn DealsSource>) -> Self {
        let mode = AppMode::default();
        let view = render(mode, &inputs, source.as_ref(), current_year());

        let mut menu_state = ListState::default();
        menu_state.select(Some(0));

        Self {
            mode,
            inputs,
            focus: Focus::Sidebar,
            field_index: 0,
            view,
            menu_state,
            should_quit: false,
            source,
        }
    }

    pub fn fields(&self) -> Vec<Field> {
        fields_for(self.mode, &self.inputs)
    }

    pub fn focused_field(&self) -> Option<Field> {
        match self.focus {
            Focus::Form => self.fields().get(self.field_index).copied(),
            Focus::Sidebar => None,
        }
    }

    /// Re-run the current panel once
    pub fn refresh(&mut self) {
        self.view = render(self.mode, &self.inputs, self.source.as_ref(), current_year());

        if self.mode == AppMode::Deals {
            let (_, region) = select_state(&self.view, REGION_SELECT_LABEL);
            let region = region.map(str::to_string);
            let (_, category) = select_state(&self.view, CATEGORY_SELECT_LABEL);
            let category = category.map(str::to_string);
            self.inputs.deals.region = region;
            self.inputs.deals.category = category;
        }
    }

    pub fn select_mode(&mut self, mode: AppMode) {
        self.mode = mode;
        self.field_index = 0;
        self.menu_state.select(AppMode::ALL.iter().position(|m| *m == mode));
        self.refresh();
    }

    fn submit(&mut self, field: Field) {
        match field {
            Field::SubmitExpense => {
                info!(category = ?self.inputs.budget.record.category, amount = self.inputs.budget.record.amount_yen, "expense submitted");
                self.inputs.budget.submitted = true;
                self.refresh();
                self.inputs.budget.submitted = false;
            }
            Field::SubmitSchedule => {
                info!(date = %self.inputs.schedule.record.date, "schedule submitted");
                self.inputs.schedule.submitted = true;
                self.refresh();
                self.inputs.schedule.submitted = false;
            }
            _ => {}
        }
    }

    fn adjust(&mut self, field: Field, delta: i32) {
        let inputs = &mut self.inputs;
        match field {
            Field::CurrentWeight => {
                let w = inputs.diet.current_weight_kg + WEIGHT_STEP_KG * delta as f64;
                inputs.diet.current_weight_kg = w.clamp(MIN_WEIGHT_KG, MAX_WEIGHT_KG);
            }
            Field::TargetWeight => {
                let w = inputs.diet.target_weight_kg + WEIGHT_STEP_KG * delta as f64;
                inputs.diet.target_weight_kg = w.clamp(MIN_WEIGHT_KG, MAX_WEIGHT_KG);
            }
            Field::Weeks => {
                let weeks = inputs.diet.weeks as i64 + delta as i64;
                inputs.diet.weeks = weeks.clamp(MIN_WEEKS as i64, MAX_WEEKS as i64) as u32;
            }
            Field::ExpenseDate => {
                let record = &mut inputs.budget.record;
                record.date = record.date + Duration::days(delta as i64);
            }
            Field::ScheduleDate => {
                let record = &mut inputs.schedule.record;
                record.date = record.date + Duration::days(delta as i64);
            }
            Field::ExpenseCategory => {
                let record = &mut inputs.budget.record;
                record.category = cycle(&ExpenseCategory::ALL, record.category, delta);
            }
            Field::Amount => {
                let record = &mut inputs.budget.record;
                record.amount_yen = if delta < 0 {
                    record.amount_yen.saturating_sub(AMOUNT_STEP_YEN)
                } else {
                    (record.amount_yen + AMOUNT_STEP_YEN).min(MAX_AMOUNT_YEN)
                };
            }
            Field::ChildCount => {
                let count = inputs.education.child_ages.len() as i64 + delta as i64;
                inputs.education.set_child_count(count.clamp(0, MAX_CHILDREN as i64) as usize);
            }
            Field::Track => {
                inputs.education.track = cycle(&EducationTrack::ALL, inputs.education.track, delta);
            }
            Field::ChildAge(i) => {
                if let Some(age) = inputs.education.child_ages.get_mut(i) {
                    let next = *age as i32 + delta;
                    *age = next.clamp(MIN_CHILD_AGE as i32, MAX_CHILD_AGE as i32) as u8;
                }
            }
            Field::Region => {
                let (options, selected) = select_state(&self.view, REGION_SELECT_LABEL);
                inputs.deals.region = cycle_option(options, selected, delta);
            }
            Field::DealsCategory => {
                let (options, selected) = select_state(&self.view, CATEGORY_SELECT_LABEL);
                inputs.deals.category = cycle_option(options, selected, delta);
            }
            Field::Theme => {
                inputs.theme = cycle(&Theme::ALL, inputs.theme, delta);
            }
            Field::Memo | Field::Description | Field::SheetUrl | Field::SubmitExpense | Field::SubmitSchedule => {
                return;
            }
        }

        if field.reruns_on_change() {
            self.refresh();
        }
    }

    fn text_mut(&mut self, field: Field) -> Option<&mut String> {
        match field {
            Field::Memo => Some(&mut self.inputs.budget.record.memo),
            Field::Description => Some(&mut self.inputs.schedule.record.description),
            Field::SheetUrl => Some(&mut self.inputs.deals.sheet_url),
            _ => None,
        }
    }

    fn type_char(&mut self, field: Field, c: char) {
        if field == Field::Amount {
            if let Some(digit) = c.to_digit(10) {
                let record = &mut self.inputs.budget.record;
                let next = record.amount_yen.saturating_mul(10).saturating_add(digit as u64);
                record.amount_yen = next.min(MAX_AMOUNT_YEN);
            }
            return;
        }
        if let Some(text) = self.text_mut(field) {
            text.push(c);
        }
    }

    fn backspace(&mut self, field: Field) {
        if field == Field::Amount {
            self.inputs.budget.record.amount_yen /= 10;
            return;
        }
        if let Some(text) = self.text_mut(field) {
            text.pop();
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        match self.focus {
            Focus::Sidebar => self.handle_sidebar_key(key),
            Focus::Form => self.handle_form_key(key),
        }
    }

    fn enter_form(&mut self) {
        if !self.fields().is_empty() {
            self.focus = Focus::Form;
            self.field_index = 0;
        }
    }

    fn handle_sidebar_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Down | KeyCode::Char('j') => self.select_mode(self.mode.next()),
            KeyCode::Up | KeyCode::Char('k') => self.select_mode(self.mode.previous()),
            KeyCode::Enter | KeyCode::Right | KeyCode::Tab => self.enter_form(),
            _ => {}
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        let fields = self.fields();
        if fields.is_empty() {
            self.focus = Focus::Sidebar;
            return;
        }
        self.field_index = self.field_index.min(fields.len() - 1);
        let field = fields[self.field_index];

        match key.code {
            KeyCode::Esc => self.focus = Focus::Sidebar,
            KeyCode::Tab | KeyCode::Down => self.field_index = (self.field_index + 1) % fields.len(),
            KeyCode::BackTab | KeyCode::Up => {
                self.field_index = (self.field_index + fields.len() - 1) % fields.len()
            }
            KeyCode::Left => self.adjust(field, -1),
            KeyCode::Right => self.adjust(field, 1),
            KeyCode::Enter if field.is_button() => self.submit(field),
            KeyCode::Enter if field == Field::SheetUrl => self.refresh(),
            KeyCode::Backspace => self.backspace(field),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => self.type_char(field, c),
            _ => {}
        }

        // The child-age list shrinks with the child count
        let len = self.fields().len();
        if len > 0 && self.field_index >= len {
            self.field_index = len - 1;
        }
    }

    fn field_value(&self, field: Field) -> String {
        let inputs = &self.inputs;
        match field {
            Field::CurrentWeight => format!("{:.1}", inputs.diet.current_weight_kg),
            Field::TargetWeight => format!("{:.1}", inputs.diet.target_weight_kg),
            Field::Weeks => inputs.diet.weeks.to_string(),
            Field::ExpenseDate => inputs.budget.record.date.format("%Y-%m-%d").to_string(),
            Field::ExpenseCategory => inputs.budget.record.category.label().to_string(),
            Field::Amount => inputs.budget.record.amount_yen.to_string(),
            Field::Memo => inputs.budget.record.memo.clone(),
            Field::ScheduleDate => inputs.schedule.record.date.format("%Y-%m-%d").to_string(),
            Field::Description => inputs.schedule.record.description.clone(),
            Field::SubmitExpense | Field::SubmitSchedule => String::new(),
            Field::ChildCount => inputs.education.child_ages.len().to_string(),
            Field::Track => inputs.education.track.label().to_string(),
            Field::ChildAge(i) => inputs
                .education
                .child_ages
                .get(i)
                .map(|a| a.to_string())
                .unwrap_or_default(),
            Field::SheetUrl => inputs.deals.sheet_url.clone(),
            Field::Region => inputs.deals.region.clone().unwrap_or_else(|| "-".to_string()),
            Field::DealsCategory => inputs.deals.category.clone().unwrap_or_else(|| "-".to_string()),
            Field::Theme => inputs.theme.label().to_string(),
        }
    }
}

// ============================================================================
// PALETTE
// ============================================================================

struct Palette {
    text: Color,
    background: Color,
    accent: Color,
    muted: Color,
    border: Color,
    success: Color,
    error: Color,
}

fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Light => Palette {
            text: Color::Black,
            background: Color::White,
            accent: Color::Blue,
            muted: Color::DarkGray,
            border: Color::Blue,
            success: Color::Green,
            error: Color::Red,
        },
        Theme::Dark => Palette {
            text: Color::White,
            background: Color::Black,
            accent: Color::Yellow,
            muted: Color::Gray,
            border: Color::Cyan,
            success: Color::LightGreen,
            error: Color::LightRed,
        },
    }
}

// ============================================================================
// TERMINAL LOOP
// ============================================================================

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

    res.map_err(Into::into)
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            app.handle_key(key);
            if app.should_quit {
                return Ok(());
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let colors = palette(app.inputs.theme);
    f.render_widget(
        Block::default().style(Style::default().bg(colors.background).fg(colors.text)),
        f.size(),
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Title + caption
            Constraint::Min(0),    // Sidebar + panel
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], &colors);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(24), Constraint::Min(0)])
        .split(chunks[1]);

    render_sidebar(f, body[0], app, &colors);
    render_panel(f, body[1], app, &colors);
    render_status_bar(f, chunks[2], app, &colors);
}

fn render_header(f: &mut Frame, area: Rect, colors: &Palette) {
    let header = Paragraph::new(vec![
        Line::from(Span::styled(
            APP_TITLE,
            Style::default().fg(colors.accent).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(APP_CAPTION, Style::default().fg(colors.muted))),
    ])
    .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(colors.border)));

    f.render_widget(header, area);
}

fn render_sidebar(f: &mut Frame, area: Rect, app: &mut App, colors: &Palette) {
    let items: Vec<ListItem> = AppMode::ALL
        .iter()
        .map(|mode| ListItem::new(Line::from(mode.label())))
        .collect();

    let border = if app.focus == Focus::Sidebar { colors.accent } else { colors.border };

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border))
                .title(" 機能を選んでください "),
        )
        .highlight_style(Style::default().fg(colors.accent).add_modifier(Modifier::BOLD))
        .highlight_symbol("● ");

    f.render_stateful_widget(list, area, &mut app.menu_state);
}

fn render_panel(f: &mut Frame, area: Rect, app: &App, colors: &Palette) {
    let fields = app.fields();
    let form_height = if fields.is_empty() { 0 } else { fields.len() as u16 + 2 };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(form_height), Constraint::Min(0)])
        .split(area);

    if !fields.is_empty() {
        render_form(f, chunks[0], app, &fields, colors);
    }
    render_output(f, chunks[1], &app.view, colors);
}

fn render_form(f: &mut Frame, area: Rect, app: &App, fields: &[Field], colors: &Palette) {
    let focused = app.focused_field();

    let lines: Vec<Line> = fields
        .iter()
        .map(|field| {
            let is_focused = focused == Some(*field);
            let marker = if is_focused { "→ " } else { "  " };

            if field.is_button() {
                let style = if is_focused {
                    Style::default().fg(colors.background).bg(colors.accent).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(colors.accent)
                };
                return Line::from(vec![Span::raw(marker), Span::styled(format!("[ {} ]", field.label()), style)]);
            }

            let mut value = app.field_value(*field);
            if is_focused && field.is_text() {
                value.push('▏');
            } else if is_focused {
                value = format!("◀ {} ▶", value);
            }

            Line::from(vec![
                Span::raw(marker),
                Span::styled(
                    format!("{}: ", field.label()),
                    Style::default().fg(if is_focused { colors.accent } else { colors.muted }),
                ),
                Span::styled(value, Style::default().fg(colors.text)),
            ])
        })
        .collect();

    let border = if app.focus == Focus::Form { colors.accent } else { colors.border };
    let form = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(" 入力 "),
    );

    f.render_widget(form, area);
}

fn render_output(f: &mut Frame, area: Rect, view: &PanelView, colors: &Palette) {
    let mut lines = vec![Line::from("")];

    for line in &view.lines {
        let rendered = match line {
            // Selections are drawn as form fields
            PanelLine::Select { .. } => continue,
            PanelLine::Text { text } | PanelLine::Bullet { text } => {
                Line::from(Span::styled(format!("  {}", text), Style::default().fg(colors.text)))
            }
            PanelLine::Caption { text } => Line::from(Span::styled(
                format!("  {}", text),
                Style::default().fg(colors.muted).add_modifier(Modifier::ITALIC),
            )),
            PanelLine::Metric { label, value } => Line::from(vec![
                Span::styled(format!("  {}  ", label), Style::default().fg(colors.muted)),
                Span::styled(value.clone(), Style::default().fg(colors.accent).add_modifier(Modifier::BOLD)),
            ]),
            PanelLine::Success { text } => Line::from(Span::styled(
                format!("  ✔ {}", text),
                Style::default().fg(colors.success).add_modifier(Modifier::BOLD),
            )),
            PanelLine::Error { text } => Line::from(Span::styled(
                format!("  ✖ {}", text),
                Style::default().fg(colors.error).add_modifier(Modifier::BOLD),
            )),
        };
        lines.push(rendered);
    }

    let output = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(colors.border))
            .title(format!(" {} ", view.title)),
    );

    f.render_widget(output, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App, colors: &Palette) {
    let key = Style::default().fg(colors.accent);

    let spans = match app.focus {
        Focus::Sidebar => vec![
            Span::styled(" ↑/↓", key),
            Span::raw(" 機能 | "),
            Span::styled("Enter/Tab", key),
            Span::raw(" 入力へ | "),
            Span::styled("q", Style::default().fg(colors.error)),
            Span::raw(" 終了"),
        ],
        Focus::Form => vec![
            Span::styled(" Tab/↑/↓", key),
            Span::raw(" 項目 | "),
            Span::styled("←/→", key),
            Span::raw(" 変更 | "),
            Span::styled("Enter", key),
            Span::raw(" 送信 | "),
            Span::styled("Esc", key),
            Span::raw(" メニュー"),
        ],
    };

    let status_bar = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(colors.border)));

    f.render_widget(status_bar, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use shufumate::deals::RETRIEVAL_FAILURE_MESSAGE;
    use shufumate::{DealsError, DealsRow, StaticSource};

    struct OfflineSource;

    impl DealsSource for OfflineSource {
        fn fetch(&self, _url: &str) -> Result<Vec<DealsRow>, DealsError> {
            Err(DealsError::Network("offline".to_string()))
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app_with(source: Box<dyn DealsSource>) -> App {
        let inputs = PanelInputs::for_date(NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(), "deals.csv");
        App::new(inputs, source)
    }

    fn sample_app() -> App {
        app_with(Box::new(StaticSource::new(vec![
            DealsRow::new("A", "food", "c1", "n1"),
            DealsRow::new("A", "toys", "c2", "n2"),
            DealsRow::new("B", "food", "c3", "n3"),
        ])))
    }

    fn goto(app: &mut App, mode: AppMode) {
        app.select_mode(mode);
        app.handle_key(key(KeyCode::Enter));
    }

    #[test]
    fn test_starts_on_recommendation() {
        let app = sample_app();

        assert_eq!(app.mode, AppMode::Recommendation);
        assert_eq!(app.view.lines.len(), 3);
    }

    #[test]
    fn test_sidebar_navigation_rerenders() {
        let mut app = sample_app();
        app.handle_key(key(KeyCode::Down));

        assert_eq!(app.mode, AppMode::Diet);
        assert_eq!(app.view.mode, AppMode::Diet);
        assert_eq!(app.menu_state.selected(), Some(1));
    }

    #[test]
    fn test_quit_from_sidebar() {
        let mut app = sample_app();
        app.handle_key(key(KeyCode::Char('q')));

        assert!(app.should_quit);
    }

    #[test]
    fn test_adjust_weeks_is_bounded() {
        let mut app = sample_app();
        goto(&mut app, AppMode::Diet);
        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Down));
        assert_eq!(app.focused_field(), Some(Field::Weeks));

        for _ in 0..10 {
            app.handle_key(key(KeyCode::Left));
        }

        assert_eq!(app.inputs.diet.weeks, MIN_WEEKS);
        assert_eq!(app.view.lines[0], PanelLine::metric("目標摂取カロリー", format!("{:.0} kcal/日", 1980.0 - 36000.0 / 7.0)));
    }

    #[test]
    fn test_budget_submit_shows_confirmation() {
        let mut app = sample_app();
        goto(&mut app, AppMode::Budget);

        app.handle_key(key(KeyCode::Down)); // category
        app.handle_key(key(KeyCode::Right)); // 日用品
        app.handle_key(key(KeyCode::Down)); // amount
        for c in "450".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        app.handle_key(key(KeyCode::Down)); // memo
        for c in "洗剤".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        assert!(app.view.lines.is_empty());

        app.handle_key(key(KeyCode::Down)); // submit
        app.handle_key(key(KeyCode::Enter));

        assert_eq!(
            app.view.lines,
            vec![PanelLine::Success { text: "2025-04-01 に 日用品 : 450円 を記録しました（洗剤）".to_string() }]
        );
        assert!(!app.inputs.budget.submitted);
    }

    #[test]
    fn test_child_count_controls_age_fields() {
        let mut app = sample_app();
        goto(&mut app, AppMode::Education);
        assert_eq!(app.fields().len(), 3);

        app.handle_key(key(KeyCode::Right));
        app.handle_key(key(KeyCode::Right));
        assert_eq!(app.fields().len(), 5);
        assert_eq!(app.view.lines.last(), Some(&PanelLine::metric("想定教育費合計", "1560 万円")));

        for _ in 0..10 {
            app.handle_key(key(KeyCode::Left));
        }
        assert!(app.inputs.education.child_ages.is_empty());
        assert_eq!(app.view.lines, vec![PanelLine::metric("想定教育費合計", "0 万円")]);
    }

    #[test]
    fn test_deals_region_cycles_through_sheet_values() {
        let mut app = sample_app();
        goto(&mut app, AppMode::Deals);
        assert_eq!(app.inputs.deals.region.as_deref(), Some("A"));

        app.handle_key(key(KeyCode::Down)); // region
        app.handle_key(key(KeyCode::Right));

        assert_eq!(app.inputs.deals.region.as_deref(), Some("B"));
        assert_eq!(app.view.bullets().collect::<Vec<_>>(), vec!["- c3（n3）"]);
    }

    #[test]
    fn test_deals_failure_shows_single_message() {
        let mut app = app_with(Box::new(OfflineSource));
        app.select_mode(AppMode::Deals);

        assert_eq!(app.view.errors().collect::<Vec<_>>(), vec![RETRIEVAL_FAILURE_MESSAGE]);
        assert_eq!(app.inputs.deals.region, None);
    }

    #[test]
    fn test_theme_toggle() {
        let mut app = sample_app();
        goto(&mut app, AppMode::Settings);
        app.handle_key(key(KeyCode::Right));

        assert_eq!(app.inputs.theme, Theme::Dark);
        assert_eq!(app.view.lines[0], PanelLine::text("選択中のテーマ：ダーク"));
    }

    #[test]
    fn test_recommendation_has_no_form() {
        let mut app = sample_app();
        app.handle_key(key(KeyCode::Enter));

        assert_eq!(app.focus, Focus::Sidebar);
    }

    #[test]
    fn test_cycle_wraps() {
        assert_eq!(cycle(&ExpenseCategory::ALL, ExpenseCategory::Other, 1), ExpenseCategory::Food);
        assert_eq!(cycle(&ExpenseCategory::ALL, ExpenseCategory::Food, -1), ExpenseCategory::Other);
    }
}
