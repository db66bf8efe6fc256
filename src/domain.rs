use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

pub const DATE_KEY: &str = "tanggal";
pub const MOOD_KEY: &str = "mood";
pub const NOTE_KEY: &str = "catatan";
pub const WATER_KEY: &str = "airminum";
pub const TASKS_KEY: &str = "tugas";
pub const ACHIEVEMENT_KEY: &str = "pencapaian";
pub const FINAL_NOTE_KEY: &str = "catatanAkhir";

pub const DEFAULT_MOOD: &str = "Biasa";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One journal record. Field names on disk follow the document format the
/// journal has always used, so older files keep loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(rename = "tanggal")]
    pub date: String,
    pub mood: String,
    #[serde(rename = "catatan")]
    pub note: String,
    #[serde(rename = "airminum")]
    pub water_count: i64,
    #[serde(rename = "tugas")]
    pub tasks: String,
    #[serde(rename = "pencapaian")]
    pub achievement: String,
    #[serde(rename = "catatanAkhir")]
    pub final_note: String,
}

impl Entry {
    pub fn with_defaults(today: NaiveDate) -> Self {
        Self {
            date: format_day(today),
            mood: DEFAULT_MOOD.to_string(),
            note: String::new(),
            water_count: 0,
            tasks: String::new(),
            achievement: String::new(),
            final_note: String::new(),
        }
    }

    /// Canonical JSON form, exactly the seven persisted keys.
    pub fn to_json(&self) -> Value {
        json!({
            DATE_KEY: self.date,
            MOOD_KEY: self.mood,
            NOTE_KEY: self.note,
            WATER_KEY: self.water_count,
            TASKS_KEY: self.tasks,
            ACHIEVEMENT_KEY: self.achievement,
            FINAL_NOTE_KEY: self.final_note,
        })
    }

    pub fn same_day_and_mood(&self, other: &Entry) -> bool {
        self.date == other.date && self.mood == other.mood
    }
}

/// Source of "today" for defaulted dates.
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

pub fn format_day(day: NaiveDate) -> String {
    day.format(DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{Clock, Entry, FixedClock, format_day};

    #[test]
    fn defaults_fill_every_field() {
        let day = NaiveDate::from_ymd_opt(2026, 3, 9).expect("valid date");
        let entry = Entry::with_defaults(day);
        assert_eq!(entry.date, "2026-03-09");
        assert_eq!(entry.mood, "Biasa");
        assert_eq!(entry.water_count, 0);
        assert!(entry.note.is_empty());
        assert!(entry.final_note.is_empty());
    }

    #[test]
    fn json_form_uses_persisted_keys_in_order() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date");
        let mut entry = Entry::with_defaults(day);
        entry.tasks = "cuci piring".to_string();

        let value = entry.to_json();
        let object = value.as_object().expect("entry should be an object");
        assert_eq!(object.len(), 7);
        assert_eq!(object["tugas"], "cuci piring");
        assert_eq!(object["airminum"], 0);

        let encoded = serde_json::to_string(&entry).expect("encode entry");
        assert!(encoded.starts_with(r#"{"tanggal":"2024-01-01","mood":"Biasa","catatan""#));
        let decoded: Entry = serde_json::from_str(&encoded).expect("decode entry");
        assert_eq!(decoded, entry);
    }

    #[test]
    fn fixed_clock_reports_its_day() {
        let day = NaiveDate::from_ymd_opt(2025, 12, 31).expect("valid date");
        assert_eq!(format_day(FixedClock(day).today()), "2025-12-31");
    }
}
