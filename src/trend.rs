use crate::domain::Entry;
use crate::render::strip_markup;

pub const HAPPY_LEVEL: u8 = 3;
pub const NEUTRAL_LEVEL: u8 = 2;
pub const SAD_LEVEL: u8 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendPoint {
    pub date: String,
    pub level: u8,
}

/// Maps a stored mood to the 1..=3 scale plotted by the trend chart.
pub fn mood_level(mood: &str) -> u8 {
    let clean = strip_markup(mood).to_lowercase();
    match clean.trim() {
        "senang" | "😊 senang" | "senang😊" | "puas" => HAPPY_LEVEL,
        "biasa" | "😐 biasa" => NEUTRAL_LEVEL,
        "sedih" | "😢 sedih" => SAD_LEVEL,
        _ => NEUTRAL_LEVEL,
    }
}

pub fn mood_trend(entries: &[Entry]) -> Vec<TrendPoint> {
    entries
        .iter()
        .map(|entry| TrendPoint {
            date: entry.date.clone(),
            level: mood_level(&entry.mood),
        })
        .collect()
}
