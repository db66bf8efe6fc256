use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde_json::{Map, Number, Value};

use crate::domain::{
    ACHIEVEMENT_KEY, DATE_KEY, DEFAULT_MOOD, Entry, FINAL_NOTE_KEY, MOOD_KEY, NOTE_KEY, TASKS_KEY,
    WATER_KEY, format_day,
};

static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("date pattern is valid"));

static NUMERIC_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?([0-9]+(\.[0-9]*)?|\.[0-9]+)([eE][+-]?[0-9]+)?$")
        .expect("numeric pattern is valid")
});

static INTEGER_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?[0-9]+").expect("integer pattern is valid"));

/// Builds a complete entry from submitted form fields. Missing or unusable
/// values fall back to defaults; this never fails.
pub fn normalize_entry(raw: &Map<String, Value>, today: NaiveDate) -> Entry {
    let date = match raw.get(DATE_KEY) {
        Some(Value::String(date)) if DATE_PATTERN.is_match(date) => date.clone(),
        _ => format_day(today),
    };

    let water_count = match raw.get(WATER_KEY) {
        Some(Value::Array(checks)) => checks.iter().filter(|check| is_numeric(check)).count() as i64,
        _ => 0,
    };

    Entry {
        date,
        mood: text_field(raw.get(MOOD_KEY)).unwrap_or_else(|| DEFAULT_MOOD.to_string()),
        note: text_field(raw.get(NOTE_KEY)).unwrap_or_default(),
        water_count,
        tasks: text_field(raw.get(TASKS_KEY)).unwrap_or_default(),
        achievement: text_field(raw.get(ACHIEVEMENT_KEY)).unwrap_or_default(),
        final_note: text_field(raw.get(FINAL_NOTE_KEY)).unwrap_or_default(),
    }
}

/// Turns one persisted element back into an entry. The flag is set when the
/// stored value is not already in canonical form and needs rewriting.
///
/// Unlike `normalize_entry`, a stored date is kept even when it does not
/// look like `YYYY-MM-DD`.
pub fn repair_entry(value: &Value, today: NaiveDate) -> (Entry, bool) {
    let Some(fields) = value.as_object() else {
        return (Entry::with_defaults(today), true);
    };

    let entry = Entry {
        date: text_field(fields.get(DATE_KEY)).unwrap_or_else(|| format_day(today)),
        mood: text_field(fields.get(MOOD_KEY)).unwrap_or_else(|| DEFAULT_MOOD.to_string()),
        note: text_field(fields.get(NOTE_KEY)).unwrap_or_default(),
        water_count: fields.get(WATER_KEY).and_then(integer_field).unwrap_or(0),
        tasks: text_field(fields.get(TASKS_KEY)).unwrap_or_default(),
        achievement: text_field(fields.get(ACHIEVEMENT_KEY)).unwrap_or_default(),
        final_note: text_field(fields.get(FINAL_NOTE_KEY)).unwrap_or_default(),
    };

    let repaired = entry.to_json() != *value;
    (entry, repaired)
}

fn text_field(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number_text(number)),
        Value::Bool(true) => Some("1".to_string()),
        Value::Bool(false) => Some(String::new()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Whole floats print without a fraction, so `1.0` reads as `"1"`.
fn number_text(number: &Number) -> String {
    if number.is_f64() {
        if let Some(float) = number.as_f64() {
            return float.to_string();
        }
    }
    number.to_string()
}

fn integer_field(value: &Value) -> Option<i64> {
    match value {
        Value::Null => None,
        Value::Number(number) => Some(
            number
                .as_i64()
                .unwrap_or_else(|| number.as_f64().map(|float| float.trunc() as i64).unwrap_or(0)),
        ),
        Value::String(text) => Some(integer_from_text(text)),
        Value::Bool(flag) => Some(i64::from(*flag)),
        Value::Array(_) | Value::Object(_) => Some(0),
    }
}

fn integer_from_text(text: &str) -> i64 {
    let trimmed = trim_blank(text);
    if NUMERIC_PATTERN.is_match(trimmed) {
        if let Ok(float) = trimmed.parse::<f64>() {
            return float.trunc() as i64;
        }
    }

    INTEGER_PREFIX
        .find(trimmed)
        .and_then(|prefix| prefix.as_str().parse::<i64>().ok())
        .unwrap_or(0)
}

fn is_numeric(value: &Value) -> bool {
    match value {
        Value::Number(_) => true,
        Value::String(text) => NUMERIC_PATTERN.is_match(trim_blank(text)),
        _ => false,
    }
}

fn trim_blank(text: &str) -> &str {
    text.trim_matches(|c| matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0b' | '\x0c'))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use serde_json::{Map, Value, json};

    use super::{normalize_entry, repair_entry};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).expect("valid date")
    }

    fn fields(value: Value) -> Map<String, Value> {
        value.as_object().cloned().expect("test input should be an object")
    }

    #[test]
    fn empty_input_gets_every_default() {
        let entry = normalize_entry(&Map::new(), today());
        assert_eq!(entry.date, "2026-10-19");
        assert_eq!(entry.mood, "Biasa");
        assert_eq!(entry.water_count, 0);
        assert_eq!(entry.note, "");
        assert_eq!(entry.tasks, "");
        assert_eq!(entry.achievement, "");
        assert_eq!(entry.final_note, "");
        assert_eq!(entry.to_json().as_object().map(|object| object.len()), Some(7));
    }

    #[test]
    fn partial_input_keeps_supplied_fields() {
        let entry = normalize_entry(
            &fields(json!({ "mood": "Sedih", "pencapaian": "lari 5km" })),
            today(),
        );
        assert_eq!(entry.mood, "Sedih");
        assert_eq!(entry.achievement, "lari 5km");
        assert_eq!(entry.note, "");
        assert_eq!(entry.date, "2026-10-19");
    }

    #[test]
    fn date_kept_only_when_shaped_like_a_day() {
        let kept = normalize_entry(&fields(json!({ "tanggal": "2024-01-01" })), today());
        assert_eq!(kept.date, "2024-01-01");

        for bad in [json!("01-01-2024"), json!("2024-1-1"), json!("yesterday"), json!(20240101)] {
            let entry = normalize_entry(&fields(json!({ "tanggal": bad })), today());
            assert_eq!(entry.date, "2026-10-19");
        }
    }

    #[test]
    fn water_counts_only_numeric_checks() {
        let entry = normalize_entry(
            &fields(json!({ "airminum": ["1", 2, "x", " 3 ", "", null, "4.5", "1e2", true] })),
            today(),
        );
        assert_eq!(entry.water_count, 5);

        let scalar = normalize_entry(&fields(json!({ "airminum": "3" })), today());
        assert_eq!(scalar.water_count, 0);
    }

    #[test]
    fn scalar_text_values_are_coerced() {
        let entry = normalize_entry(
            &fields(json!({ "catatan": 42, "tugas": true, "pencapaian": false, "mood": null })),
            today(),
        );
        assert_eq!(entry.note, "42");
        assert_eq!(entry.tasks, "1");
        assert_eq!(entry.achievement, "");
        assert_eq!(entry.mood, "Biasa");

        let floats = normalize_entry(&fields(json!({ "catatan": 1.0, "tugas": 2.5, "mood": -3.0 })), today());
        assert_eq!(floats.note, "1");
        assert_eq!(floats.tasks, "2.5");
        assert_eq!(floats.mood, "-3");
    }

    #[test]
    fn repair_fills_missing_fields_and_flags_change() {
        let stored = json!({
            "tanggal": "2024-02-02",
            "mood": "Senang",
            "catatan": "",
            "airminum": 4,
            "pencapaian": "",
            "catatanAkhir": ""
        });
        let (entry, repaired) = repair_entry(&stored, today());
        assert!(repaired);
        assert_eq!(entry.tasks, "");
        assert_eq!(entry.water_count, 4);
        assert_eq!(entry.date, "2024-02-02");
    }

    #[test]
    fn repair_leaves_canonical_entries_alone() {
        let stored = json!({
            "tanggal": "not-a-date",
            "mood": "Biasa",
            "catatan": "a",
            "airminum": 1,
            "tugas": "b",
            "pencapaian": "c",
            "catatanAkhir": "d"
        });
        let (entry, repaired) = repair_entry(&stored, today());
        assert!(!repaired);
        assert_eq!(entry.date, "not-a-date");
    }

    #[test]
    fn repair_replaces_non_objects_with_defaults() {
        let (entry, repaired) = repair_entry(&json!("garbage"), today());
        assert!(repaired);
        assert_eq!(entry.date, "2026-10-19");
        assert_eq!(entry.mood, "Biasa");
    }

    #[test]
    fn repair_coerces_water_types() {
        let cases = [
            (json!("5"), 5),
            (json!("7 gelas"), 7),
            (json!(2.9), 2),
            (json!(true), 1),
            (json!("banyak"), 0),
        ];
        for (water, expected) in cases {
            let (entry, repaired) = repair_entry(&json!({ "airminum": water }), today());
            assert!(repaired);
            assert_eq!(entry.water_count, expected);
        }
    }
}
