use std::sync::LazyLock;

use regex::Regex;

use crate::domain::Entry;

static MARKUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*(>|$)").expect("markup pattern is valid"));

const LINE_BREAK: &str = "<br />";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoodClass {
    Positive,
    Negative,
    Neutral,
}

/// Classifies the raw submitted mood. Runs before any escaping.
pub fn classify_mood(raw: &str) -> MoodClass {
    match strip_markup(raw).to_lowercase().as_str() {
        "senang" | "puas" => MoodClass::Positive,
        "sedih" => MoodClass::Negative,
        _ => MoodClass::Neutral,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStyle {
    Standard,
    Emphasized,
}

impl RenderStyle {
    pub fn for_mood(class: MoodClass) -> Self {
        match class {
            MoodClass::Positive => RenderStyle::Emphasized,
            MoodClass::Negative | MoodClass::Neutral => RenderStyle::Standard,
        }
    }

    /// Display-ready copy of `entry`: free text escaped with line breaks
    /// marked up, plus emphasis for happy days.
    pub fn render(self, entry: &Entry) -> Entry {
        let note = display_text(&entry.note);
        let (mood, note) = match self {
            RenderStyle::Standard => (entry.mood.clone(), note),
            RenderStyle::Emphasized => (entry.mood.to_uppercase(), format!("<strong>{note}</strong>")),
        };

        Entry {
            date: entry.date.clone(),
            mood,
            note,
            water_count: entry.water_count,
            tasks: display_text(&entry.tasks),
            achievement: display_text(&entry.achievement),
            final_note: display_text(&entry.final_note),
        }
    }
}

pub fn render_entry(entry: &Entry) -> Entry {
    RenderStyle::for_mood(classify_mood(&entry.mood)).render(entry)
}

pub fn strip_markup(raw: &str) -> String {
    MARKUP.replace_all(raw, "").into_owned()
}

pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Inserts `<br />` before every line ending, keeping the ending itself.
/// `\r\n` and `\n\r` count as one break.
pub fn mark_line_breaks(text: &str) -> String {
    let mut marked = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\n' && c != '\r' {
            marked.push(c);
            continue;
        }

        marked.push_str(LINE_BREAK);
        marked.push(c);
        let pair = if c == '\n' { '\r' } else { '\n' };
        if chars.peek() == Some(&pair) {
            marked.push(pair);
            chars.next();
        }
    }
    marked
}

/// Reverses rendering for plain-text surfaces such as the terminal view.
pub fn plain_text(rendered: &str) -> String {
    let without_breaks = rendered.replace(LINE_BREAK, "");
    strip_markup(&without_breaks)
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&amp;", "&")
}

fn display_text(raw: &str) -> String {
    mark_line_breaks(&escape_html(raw))
}
