use std::error::Error;
use std::io;
use std::time::Duration as StdDuration;

use crossterm::event::{self, Event as CEvent, KeyCode, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, ExecutableCommand};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::{Frame, Terminal};
use serde_json::{Map, Value};

use crate::domain::{
	ACHIEVEMENT_KEY, DATE_KEY, Entry, FINAL_NOTE_KEY, MOOD_KEY, NOTE_KEY, TASKS_KEY, WATER_KEY,
};
use crate::journal::JournalManager;
use crate::render::plain_text;
use crate::storage::EntryStore;
use crate::trend::{HAPPY_LEVEL, SAD_LEVEL, mood_level};

const MAX_WATER_CHECKS: usize = 8;
const FOCUSED_PANEL_BORDER_COLOR: Color = Color::Yellow;
const HIGHLIGHT_BACKGROUND_COLOR: Color = Color::Rgb(42, 45, 52);

pub fn run_history<S: EntryStore>(journal: &mut JournalManager<S>) -> Result<(), Box<dyn Error>> {
	enable_raw_mode()?;
	let mut stdout = io::stdout();
	stdout.execute(EnterAlternateScreen)?;
	let backend = CrosstermBackend::new(stdout);
	let mut terminal = Terminal::new(backend)?;

	let result = run_event_loop(&mut terminal, journal);

	disable_raw_mode()?;
	execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
	terminal.show_cursor()?;

	result
}

fn run_event_loop<S: EntryStore>(
	terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
	journal: &mut JournalManager<S>,
) -> Result<(), Box<dyn Error>> {
	let mut app = App::default();

	loop {
		let view = build_view(journal);
		app.clamp_selection(&view);
		terminal.draw(|frame| draw_history(frame, &app, &view))?;

		if event::poll(StdDuration::from_millis(250))? {
			if let CEvent::Key(key) = event::read()? {
				if key.kind != KeyEventKind::Press {
					continue;
				}

				let should_quit = match &app.mode {
					InputMode::Prompt(_) => handle_prompt_key(&mut app, key.code, journal),
					InputMode::Normal => handle_normal_key(&mut app, key.code, journal, &view),
				};

				if should_quit {
					break;
				}
			}
		}
	}

	Ok(())
}

fn draw_history(frame: &mut Frame, app: &App, view: &ViewModel) {
	let layout = Layout::default()
		.direction(Direction::Vertical)
		.constraints([Constraint::Min(12), Constraint::Length(4)])
		.split(frame.area());

	let body = Layout::default()
		.direction(Direction::Horizontal)
		.constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
		.split(layout[0]);

	let right = Layout::default()
		.direction(Direction::Vertical)
		.constraints([Constraint::Min(8), Constraint::Length(12)])
		.split(body[1]);

	render_history_panel(frame, body[0], app, view);
	render_detail_panel(frame, right[0], app, view);
	render_trend_panel(frame, right[1], view);
	render_footer(frame, layout[1], app, view);
}

fn render_history_panel(frame: &mut Frame, area: Rect, app: &App, view: &ViewModel) {
	let items = view
		.entries
		.iter()
		.enumerate()
		.map(|(index, entry)| {
			ListItem::new(Line::from(vec![
				Span::raw(format!("{index:>3} {} ", entry.date)),
				Span::styled(plain_text(&entry.mood), mood_style(&entry.mood)),
				Span::raw(format!(" | water {}", entry.water_count)),
			]))
		})
		.collect::<Vec<_>>();

	let mut state = ListState::default();
	if !view.entries.is_empty() {
		state.select(Some(app.selected.min(view.entries.len() - 1)));
	}

	let list = List::new(if items.is_empty() {
		vec![ListItem::new("(no entries yet: press a to add one)")]
	} else {
		items
	})
	.block(
		Block::default()
			.borders(Borders::ALL)
			.title(format!("History ({})", view.entries.len()))
			.border_style(Style::default().fg(FOCUSED_PANEL_BORDER_COLOR)),
	)
	.highlight_style(Style::default().bg(HIGHLIGHT_BACKGROUND_COLOR).add_modifier(Modifier::BOLD));

	frame.render_stateful_widget(list, area, &mut state);
}

fn render_detail_panel(frame: &mut Frame, area: Rect, app: &App, view: &ViewModel) {
	let block = Block::default().borders(Borders::ALL).title("Entry");
	let Some(entry) = view.entries.get(app.selected) else {
		frame.render_widget(Paragraph::new("(nothing selected)").block(block), area);
		return;
	};

	let note_style = if entry.note.starts_with("<strong>") {
		Style::default().add_modifier(Modifier::BOLD)
	} else {
		Style::default()
	};

	let mut lines = vec![
		Line::from(format!("Date: {}", entry.date)),
		Line::from(vec![
			Span::raw("Mood: "),
			Span::styled(plain_text(&entry.mood), mood_style(&entry.mood)),
		]),
		Line::from(format!(
			"Water: {} {}",
			"#".repeat(entry.water_count.clamp(0, MAX_WATER_CHECKS as i64) as usize),
			entry.water_count
		)),
	];
	push_section(&mut lines, "Note", &entry.note, note_style);
	push_section(&mut lines, "Tasks", &entry.tasks, Style::default());
	push_section(&mut lines, "Achievement", &entry.achievement, Style::default());
	push_section(&mut lines, "Closing note", &entry.final_note, Style::default());

	frame.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: false }), area);
}

fn push_section(lines: &mut Vec<Line<'static>>, title: &str, rendered: &str, style: Style) {
	lines.push(Line::from(""));
	lines.push(Line::from(Span::styled(
		format!("{title}:"),
		Style::default().add_modifier(Modifier::UNDERLINED),
	)));
	let text = plain_text(rendered);
	if text.trim().is_empty() {
		lines.push(Line::from("-"));
		return;
	}
	for row in text.lines() {
		lines.push(Line::from(Span::styled(row.to_string(), style)));
	}
}

fn render_trend_panel(frame: &mut Frame, area: Rect, view: &ViewModel) {
	let block = Block::default().borders(Borders::ALL).title(format!(
		"Mood trend | avg water {:.2}",
		view.average_water
	));
	if view.trend.is_empty() {
		frame.render_widget(Paragraph::new("(no data)").block(block), area);
		return;
	}

	let dataset = Dataset::default()
		.name("mood")
		.marker(Marker::Braille)
		.graph_type(GraphType::Line)
		.style(Style::default().fg(Color::Cyan))
		.data(&view.trend);

	let x_max = view.trend.len().saturating_sub(1).max(1) as f64;
	let first_date = view.entries.first().map(|entry| entry.date.clone()).unwrap_or_default();
	let last_date = view.entries.last().map(|entry| entry.date.clone()).unwrap_or_default();

	let chart = Chart::new(vec![dataset])
		.block(block)
		.x_axis(Axis::default().bounds([0.0, x_max]).labels(vec![first_date, last_date]))
		.y_axis(
			Axis::default()
				.bounds([f64::from(SAD_LEVEL), f64::from(HAPPY_LEVEL)])
				.labels(vec!["sedih", "biasa", "senang"]),
		);
	frame.render_widget(chart, area);
}

fn render_footer(frame: &mut Frame, area: Rect, app: &App, view: &ViewModel) {
	let footer_lines = match &app.mode {
		InputMode::Normal => vec![
			Line::from("j/k or arrows move | a add entry | d delete selected | u undo | q quit"),
			Line::from(format!(
				"{}{}",
				app.status,
				view.undo_hint
					.as_ref()
					.map(|hint| format!(" | undo: {hint}"))
					.unwrap_or_default()
			)),
		],
		InputMode::Prompt(prompt) => vec![
			Line::from(prompt.kind.title()),
			Line::from(format!("> {}", prompt.input)),
			Line::from(format!("Enter next | Esc cancel | {}", app.status)),
		],
	};

	let footer = Paragraph::new(footer_lines).block(Block::default().borders(Borders::ALL).title("Shortcuts"));
	frame.render_widget(footer, area);
}

fn mood_style(mood: &str) -> Style {
	match mood_level(mood) {
		HAPPY_LEVEL => Style::default().fg(Color::Green),
		SAD_LEVEL => Style::default().fg(Color::Blue),
		_ => Style::default(),
	}
}

fn handle_normal_key<S: EntryStore>(
	app: &mut App,
	code: KeyCode,
	journal: &mut JournalManager<S>,
	view: &ViewModel,
) -> bool {
	match code {
		KeyCode::Char('q') | KeyCode::Esc => true,
		KeyCode::Up | KeyCode::Char('k') => {
			app.move_selection(-1, view);
			false
		}
		KeyCode::Down | KeyCode::Char('j') => {
			app.move_selection(1, view);
			false
		}
		KeyCode::Char('a') => {
			app.mode = InputMode::Prompt(PromptState::new(PromptKind::Date, Map::new()));
			app.status = "New entry".to_string();
			false
		}
		KeyCode::Char('d') => {
			if view.entries.is_empty() {
				app.status = "Nothing to delete".to_string();
				return false;
			}
			app.status = match journal.delete(app.selected) {
				Ok(true) => format!("deleted entry {}", app.selected),
				Ok(false) => format!("no entry at {}", app.selected),
				Err(err) => format!("error: {err}"),
			};
			false
		}
		KeyCode::Char('u') => {
			app.status = match journal.undo_last() {
				Ok(true) => "undid last change".to_string(),
				Ok(false) => "nothing to undo".to_string(),
				Err(err) => format!("error: {err}"),
			};
			false
		}
		_ => false,
	}
}

fn handle_prompt_key<S: EntryStore>(app: &mut App, code: KeyCode, journal: &mut JournalManager<S>) -> bool {
	match code {
		KeyCode::Esc => {
			app.mode = InputMode::Normal;
			app.status = "Input cancelled".to_string();
		}
		KeyCode::Backspace => {
			if let InputMode::Prompt(prompt) = &mut app.mode {
				prompt.input.pop();
			}
		}
		KeyCode::Char(value) => {
			if let InputMode::Prompt(prompt) = &mut app.mode {
				prompt.input.push(value);
			}
		}
		KeyCode::Enter => {
			let prompt = match std::mem::replace(&mut app.mode, InputMode::Normal) {
				InputMode::Prompt(prompt) => prompt,
				InputMode::Normal => return false,
			};

			match submit_prompt(prompt.clone(), journal) {
				Ok(PromptOutcome::NextPrompt(next_prompt)) => {
					app.mode = InputMode::Prompt(next_prompt);
					app.status.clear();
				}
				Ok(PromptOutcome::Added(index)) => {
					app.mode = InputMode::Normal;
					app.selected = index;
					app.status = format!("recorded entry {index}");
				}
				Err(err) => {
					app.mode = InputMode::Prompt(prompt);
					app.status = format!("error: {err}");
				}
			}
		}
		_ => {}
	}

	false
}

fn submit_prompt<S: EntryStore>(
	prompt: PromptState,
	journal: &mut JournalManager<S>,
) -> Result<PromptOutcome, String> {
	let PromptState { kind, input, mut draft } = prompt;

	match kind.next() {
		Some(next_kind) => {
			if !input.trim().is_empty() {
				draft.insert(kind.field_key().to_string(), Value::String(input));
			}
			Ok(PromptOutcome::NextPrompt(PromptState::new(next_kind, draft)))
		}
		None => {
			let glasses = water_checks(&input)?;
			if glasses > 0 {
				draft.insert(
					kind.field_key().to_string(),
					Value::Array((1..=glasses).map(|glass| Value::String(glass.to_string())).collect()),
				);
			}
			let index = journal.add(&draft).map_err(|err| err.to_string())?;
			Ok(PromptOutcome::Added(index))
		}
	}
}

fn water_checks(input: &str) -> Result<usize, String> {
	let value = input.trim();
	if value.is_empty() {
		return Ok(0);
	}

	match value.parse::<usize>() {
		Ok(glasses) if glasses <= MAX_WATER_CHECKS => Ok(glasses),
		_ => Err(format!("water must be a number from 0 to {MAX_WATER_CHECKS}")),
	}
}

fn build_view<S: EntryStore>(journal: &mut JournalManager<S>) -> ViewModel {
	let average_water = journal.average_water();
	ViewModel {
		entries: journal.entries().to_vec(),
		trend: journal
			.mood_trend()
			.iter()
			.enumerate()
			.map(|(index, point)| (index as f64, f64::from(point.level)))
			.collect(),
		average_water,
		undo_hint: journal
			.last_undoable()
			.map(|entry| format!("{} {}", entry.date, plain_text(&entry.mood))),
	}
}

#[derive(Debug, Clone)]
enum PromptOutcome {
	NextPrompt(PromptState),
	Added(usize),
}

#[derive(Debug, Clone)]
struct PromptState {
	kind: PromptKind,
	input: String,
	draft: Map<String, Value>,
}

impl PromptState {
	fn new(kind: PromptKind, draft: Map<String, Value>) -> Self {
		Self {
			kind,
			input: String::new(),
			draft,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PromptKind {
	Date,
	Mood,
	Note,
	Tasks,
	Achievement,
	FinalNote,
	Water,
}

impl PromptKind {
	fn next(self) -> Option<Self> {
		match self {
			PromptKind::Date => Some(PromptKind::Mood),
			PromptKind::Mood => Some(PromptKind::Note),
			PromptKind::Note => Some(PromptKind::Tasks),
			PromptKind::Tasks => Some(PromptKind::Achievement),
			PromptKind::Achievement => Some(PromptKind::FinalNote),
			PromptKind::FinalNote => Some(PromptKind::Water),
			PromptKind::Water => None,
		}
	}

	fn field_key(self) -> &'static str {
		match self {
			PromptKind::Date => DATE_KEY,
			PromptKind::Mood => MOOD_KEY,
			PromptKind::Note => NOTE_KEY,
			PromptKind::Tasks => TASKS_KEY,
			PromptKind::Achievement => ACHIEVEMENT_KEY,
			PromptKind::FinalNote => FINAL_NOTE_KEY,
			PromptKind::Water => WATER_KEY,
		}
	}

	fn title(self) -> &'static str {
		match self {
			PromptKind::Date => "Date YYYY-MM-DD (empty for today)",
			PromptKind::Mood => "Mood: Senang / Biasa / Sedih / Puas",
			PromptKind::Note => "Note (optional)",
			PromptKind::Tasks => "Tasks (optional)",
			PromptKind::Achievement => "Achievement (optional)",
			PromptKind::FinalNote => "Closing note (optional)",
			PromptKind::Water => "Glasses of water, 0-8",
		}
	}
}

#[derive(Debug, Clone)]
enum InputMode {
	Normal,
	Prompt(PromptState),
}

#[derive(Debug, Clone)]
struct App {
	selected: usize,
	mode: InputMode,
	status: String,
}

impl Default for App {
	fn default() -> Self {
		Self {
			selected: 0,
			mode: InputMode::Normal,
			status: "Ready".to_string(),
		}
	}
}

impl App {
	fn clamp_selection(&mut self, view: &ViewModel) {
		if view.entries.is_empty() {
			self.selected = 0;
		} else {
			self.selected = self.selected.min(view.entries.len() - 1);
		}
	}

	fn move_selection(&mut self, delta: i32, view: &ViewModel) {
		if view.entries.is_empty() {
			self.selected = 0;
			return;
		}

		if delta > 0 {
			self.selected = (self.selected + delta as usize).min(view.entries.len() - 1);
		} else {
			self.selected = self.selected.saturating_sub(delta.unsigned_abs() as usize);
		}
	}
}

struct ViewModel {
	entries: Vec<Entry>,
	trend: Vec<(f64, f64)>,
	average_water: f64,
	undo_hint: Option<String>,
}
