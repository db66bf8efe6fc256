use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::info;
use serde_json::{Map, Value};

use mood_journal::config::Config;
use mood_journal::domain::{
	ACHIEVEMENT_KEY, DATE_KEY, FINAL_NOTE_KEY, MOOD_KEY, NOTE_KEY, SystemClock, TASKS_KEY, WATER_KEY,
};
use mood_journal::journal::JournalManager;
use mood_journal::paths::{config_path, resolve_journal_path};
use mood_journal::render::plain_text;
use mood_journal::storage::{EntryStore, JsonStore};
use mood_journal::ui::run_history;

#[derive(Debug, Parser)]
#[command(name = "mood-journal", about = "Daily mood and wellness journal")]
struct Cli {
	#[arg(long)]
	journal: Option<PathBuf>,
	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
	Init,
	History,
	Add {
		#[arg(long)]
		date: Option<String>,
		#[arg(long)]
		mood: Option<String>,
		#[arg(long)]
		note: Option<String>,
		#[arg(long)]
		tasks: Option<String>,
		#[arg(long)]
		achievement: Option<String>,
		#[arg(long)]
		final_note: Option<String>,
		/// One value per glass checked off; repeat the flag.
		#[arg(long = "water")]
		water: Vec<String>,
	},
	Delete {
		index: usize,
	},
	List,
	Average,
	Trend,
}

fn main() {
	if let Err(err) = run() {
		eprintln!("error: {err}");
		std::process::exit(1);
	}
}

fn run() -> Result<(), Box<dyn Error>> {
	let cli = Cli::parse();
	let config = Config::load(&config_path())?;
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.log_level())).init();

	let journal_path = resolve_journal_path(cli.journal, &config);
	info!("using journal {}", journal_path.display());
	let store = JsonStore::open(&journal_path)?;
	let mut journal = JournalManager::load(store, Box::new(SystemClock))?;

	match cli.command.unwrap_or(Command::History) {
		Command::Init => {
			println!("journal ready at {}", journal_path.display());
		}
		Command::History => {
			run_history(&mut journal)?;
		}
		Command::Add {
			date,
			mood,
			note,
			tasks,
			achievement,
			final_note,
			water,
		} => {
			let request = add_request(
				[
					(DATE_KEY, date),
					(MOOD_KEY, mood),
					(NOTE_KEY, note),
					(TASKS_KEY, tasks),
					(ACHIEVEMENT_KEY, achievement),
					(FINAL_NOTE_KEY, final_note),
				],
				water,
			);
			let index = journal.add(&request)?;
			let entry = &journal.entries()[index];
			println!("recorded entry {index}: {} {}", entry.date, entry.mood);
		}
		Command::Delete { index } => {
			if journal.delete(index)? {
				println!("deleted entry {index}");
			} else {
				println!("no entry at index {index}");
			}
		}
		Command::List => {
			print_entries(&journal);
		}
		Command::Average => {
			println!("{:.2}", journal.average_water());
		}
		Command::Trend => {
			for point in journal.mood_trend() {
				println!("{} {}", point.date, point.level);
			}
		}
	}

	Ok(())
}

fn add_request<const N: usize>(
	fields: [(&str, Option<String>); N],
	water: Vec<String>,
) -> Map<String, Value> {
	let mut request = Map::new();
	for (key, value) in fields {
		if let Some(value) = value {
			request.insert(key.to_string(), Value::String(value));
		}
	}

	if !water.is_empty() {
		request.insert(
			WATER_KEY.to_string(),
			Value::Array(water.into_iter().map(Value::String).collect()),
		);
	}

	request
}

fn print_entries<S: EntryStore>(journal: &JournalManager<S>) {
	if journal.entries().is_empty() {
		println!("no entries yet");
		return;
	}

	for (index, entry) in journal.entries().iter().enumerate() {
		let note = plain_text(&entry.note);
		println!(
			"{index:>3} | {} | {} | {} | {}",
			entry.date,
			plain_text(&entry.mood),
			entry.water_count,
			note.lines().next().unwrap_or("")
		);
	}
}
