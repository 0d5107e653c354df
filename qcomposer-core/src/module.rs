//! Typed content modules and their plain-text serialization

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identity of a module within its track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleId(pub u64);

/// Kind of a module, derived from its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ModuleType {
    Time,
    Date,
    Ending,
    Symbol,
    Text,
}

impl ModuleType {
    pub fn all() -> [ModuleType; 5] {
        [
            ModuleType::Time,
            ModuleType::Date,
            ModuleType::Ending,
            ModuleType::Symbol,
            ModuleType::Text,
        ]
    }

    /// Toolbar label
    pub fn label(&self) -> &'static str {
        match self {
            ModuleType::Time => "시간",
            ModuleType::Date => "날짜",
            ModuleType::Ending => "어미",
            ModuleType::Symbol => "기호",
            ModuleType::Text => "텍스트",
        }
    }

    /// Whether the payload is a literal string that can be split at a caret
    pub fn is_text_bearing(&self) -> bool {
        match self {
            ModuleType::Symbol | ModuleType::Text => true,
            ModuleType::Time | ModuleType::Date | ModuleType::Ending => false,
        }
    }
}

/// Ordered set of normalized `HH:MM` / `HH:MM~HH:MM` values
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSet {
    times: Vec<String>,
}

impl TimeSet {
    /// Build from raw inputs, dropping anything that does not normalize
    pub fn new<I, S>(inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::default();
        for input in inputs {
            set.insert(input.as_ref());
        }
        set
    }

    /// Insert a value; returns false if it is invalid or already present
    pub fn insert(&mut self, input: &str) -> bool {
        match normalize_time(input) {
            Some(value) if !self.times.contains(&value) => {
                self.times.push(value);
                true
            }
            _ => false,
        }
    }

    pub fn values(&self) -> &[String] {
        &self.times
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

/// Ordered set of ISO dates or named date presets
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateSet {
    dates: Vec<String>,
}

/// Date tokens understood without any preset configuration
pub const BUILTIN_DATE_TOKENS: &[&str] = &[
    "평일", "주말", "공휴일", "월", "화", "수", "목", "금", "토", "일",
];

impl DateSet {
    /// Build from raw inputs using only the built-in tokens
    pub fn new<I, S>(inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::default();
        for input in inputs {
            set.insert(input.as_ref(), &[]);
        }
        set
    }

    /// Insert a value; `extra_tokens` are preset names accepted besides the built-ins
    pub fn insert(&mut self, input: &str, extra_tokens: &[String]) -> bool {
        match normalize_date(input, extra_tokens) {
            Some(value) if !self.dates.contains(&value) => {
                self.dates.push(value);
                true
            }
            _ => false,
        }
    }

    pub fn values(&self) -> &[String] {
        &self.dates
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Single-choice sentence ending
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ending {
    options: Vec<String>,
    selected: String,
}

impl Ending {
    /// Create with the first option selected
    pub fn new<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let options: Vec<String> = options.into_iter().map(Into::into).collect();
        let selected = options.first().cloned().unwrap_or_default();
        Self { options, selected }
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn selected(&self) -> &str {
        &self.selected
    }

    /// Select one of the options; values outside the list are rejected
    pub fn select(&mut self, value: &str) -> bool {
        if self.options.iter().any(|o| o == value) {
            self.selected = value.to_string();
            true
        } else {
            false
        }
    }

    /// Step the selection forward or backward, wrapping around
    pub fn cycle(&mut self, forward: bool) {
        let len = self.options.len();
        if len == 0 {
            return;
        }
        let current = self
            .options
            .iter()
            .position(|o| *o == self.selected)
            .unwrap_or(0);
        let next = if forward {
            (current + 1) % len
        } else {
            (current + len - 1) % len
        };
        self.selected = self.options[next].clone();
    }

    /// The value that goes into the serialized text: selected, else the first option
    pub fn token(&self) -> &str {
        if self.options.iter().any(|o| *o == self.selected) {
            &self.selected
        } else {
            self.options.first().map(String::as_str).unwrap_or("")
        }
    }
}

/// Type-specific module payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "UPPERCASE")]
pub enum ModuleData {
    Time(TimeSet),
    Date(DateSet),
    Ending(Ending),
    Symbol(String),
    Text(String),
}

impl ModuleData {
    pub fn text(value: impl Into<String>) -> Self {
        ModuleData::Text(value.into())
    }

    pub fn symbol(value: impl Into<String>) -> Self {
        ModuleData::Symbol(value.into())
    }

    /// Empty payload for a freshly added module of the given type
    pub fn empty(module_type: ModuleType) -> Self {
        match module_type {
            ModuleType::Time => ModuleData::Time(TimeSet::default()),
            ModuleType::Date => ModuleData::Date(DateSet::default()),
            ModuleType::Ending => ModuleData::Ending(Ending::default()),
            ModuleType::Symbol => ModuleData::Symbol(String::new()),
            ModuleType::Text => ModuleData::Text(String::new()),
        }
    }

    pub fn module_type(&self) -> ModuleType {
        match self {
            ModuleData::Time(_) => ModuleType::Time,
            ModuleData::Date(_) => ModuleType::Date,
            ModuleData::Ending(_) => ModuleType::Ending,
            ModuleData::Symbol(_) => ModuleType::Symbol,
            ModuleData::Text(_) => ModuleType::Text,
        }
    }

    /// Literal string of text-bearing payloads
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ModuleData::Symbol(s) | ModuleData::Text(s) => Some(s),
            ModuleData::Time(_) | ModuleData::Date(_) | ModuleData::Ending(_) => None,
        }
    }

    /// Mutable literal of text-bearing payloads
    pub fn as_text_mut(&mut self) -> Option<&mut String> {
        match self {
            ModuleData::Symbol(s) | ModuleData::Text(s) => Some(s),
            ModuleData::Time(_) | ModuleData::Date(_) | ModuleData::Ending(_) => None,
        }
    }

    /// Serialized token for this payload; empty when there is nothing to emit
    pub fn token(&self) -> String {
        match self {
            ModuleData::Time(set) => set.values().join(", "),
            ModuleData::Date(set) => set.values().join(", "),
            ModuleData::Ending(ending) => ending.token().to_string(),
            ModuleData::Symbol(s) | ModuleData::Text(s) => collapse_whitespace(s),
        }
    }
}

/// A typed content segment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub id: ModuleId,
    #[serde(flatten)]
    pub data: ModuleData,
}

impl Module {
    pub fn module_type(&self) -> ModuleType {
        self.data.module_type()
    }

    /// Label shown on the module chip
    pub fn label(&self) -> String {
        let token = self.data.token();
        if token.is_empty() {
            format!("[{}]", self.module_type().label())
        } else {
            token
        }
    }
}

/// Join the tokens of all non-empty modules with a single space
pub fn serialize(modules: &[Module]) -> String {
    modules
        .iter()
        .map(|m| m.data.token())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize a time point (`9`, `9시`, `900`, `09:00`) or range (`9-18`, `09:00~18:00`)
pub fn normalize_time(input: &str) -> Option<String> {
    let input = input.trim();
    let range = input.split_once('~').or_else(|| input.split_once('-'));
    match range {
        Some((start, end)) => {
            let start = normalize_time_point(start)?;
            let end = normalize_time_point(end)?;
            Some(format!("{}~{}", start, end))
        }
        None => normalize_time_point(input),
    }
}

fn normalize_time_point(input: &str) -> Option<String> {
    let s = input.trim();
    let s = s.strip_suffix('시').unwrap_or(s).trim();

    let (hour, minute) = if let Some((h, m)) = s.split_once(':') {
        (h, m)
    } else if s.len() > 2 && s.bytes().all(|b| b.is_ascii_digit()) {
        s.split_at(s.len() - 2)
    } else {
        (s, "0")
    };

    let is_number = |part: &str| {
        !part.is_empty() && part.len() <= 2 && part.bytes().all(|b| b.is_ascii_digit())
    };
    if !is_number(hour) || !is_number(minute) {
        return None;
    }

    let hour: u32 = hour.parse().ok()?;
    let minute: u32 = minute.parse().ok()?;
    let valid = (hour < 24 && minute < 60) || (hour == 24 && minute == 0);
    valid.then(|| format!("{:02}:{:02}", hour, minute))
}

/// Normalize an ISO date or accept a named token
pub fn normalize_date(input: &str, extra_tokens: &[String]) -> Option<String> {
    let s = input.trim();
    if s.is_empty() {
        return None;
    }
    if BUILTIN_DATE_TOKENS.contains(&s) || extra_tokens.iter().any(|t| t == s) {
        return Some(s.to_string());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .map(|d| d.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn module(id: u64, data: ModuleData) -> Module {
        Module {
            id: ModuleId(id),
            data,
        }
    }

    #[test]
    fn test_normalize_time_points() {
        assert_eq!(normalize_time("9").as_deref(), Some("09:00"));
        assert_eq!(normalize_time("9시").as_deref(), Some("09:00"));
        assert_eq!(normalize_time("930").as_deref(), Some("09:30"));
        assert_eq!(normalize_time("1830").as_deref(), Some("18:30"));
        assert_eq!(normalize_time(" 7:05 ").as_deref(), Some("07:05"));
        assert_eq!(normalize_time("24:00").as_deref(), Some("24:00"));
    }

    #[test]
    fn test_normalize_time_ranges() {
        assert_eq!(normalize_time("9-18").as_deref(), Some("09:00~18:00"));
        assert_eq!(
            normalize_time("09:00~18:30").as_deref(),
            Some("09:00~18:30")
        );
    }

    #[test]
    fn test_normalize_time_rejects_garbage() {
        assert_eq!(normalize_time(""), None);
        assert_eq!(normalize_time("25:00"), None);
        assert_eq!(normalize_time("24:30"), None);
        assert_eq!(normalize_time("12:60"), None);
        assert_eq!(normalize_time("noon"), None);
        assert_eq!(normalize_time("12345"), None);
        assert_eq!(normalize_time("9~"), None);
    }

    #[test]
    fn test_time_set_dedups_and_keeps_order() {
        let set = TimeSet::new(["10:00", "9", "10", "bogus"]);
        assert_eq!(set.values(), &["10:00".to_string(), "09:00".to_string()]);
    }

    #[test]
    fn test_date_set_accepts_tokens_and_iso_dates() {
        let mut set = DateSet::default();
        assert!(set.insert("2024-03-01", &[]));
        assert!(set.insert("평일", &[]));
        assert!(!set.insert("2024-02-30", &[]));
        assert!(!set.insert("설날", &[]));
        assert!(set.insert("설날", &["설날".to_string()]));
        assert!(!set.insert("평일", &[]));
        assert_eq!(set.values().len(), 3);
    }

    #[test]
    fn test_ending_single_choice() {
        let mut ending = Ending::new(["입니다", "이에요"]);
        assert_eq!(ending.selected(), "입니다");
        assert!(!ending.select("랍니다"));
        assert_eq!(ending.selected(), "입니다");
        assert!(ending.select("이에요"));
        assert_eq!(ending.token(), "이에요");
        ending.cycle(true);
        assert_eq!(ending.selected(), "입니다");
        ending.cycle(false);
        assert_eq!(ending.selected(), "이에요");
    }

    #[test]
    fn test_ending_token_falls_back_to_first_option() {
        let ending: Ending =
            serde_json::from_str(r#"{"options":["요","다"],"selected":""}"#).unwrap();
        assert_eq!(ending.token(), "요");
        assert_eq!(Ending::default().token(), "");
    }

    #[test]
    fn test_serialize_time_and_text() {
        let modules = vec![
            module(1, ModuleData::Time(TimeSet::new(["09:00", "10:00"]))),
            module(2, ModuleData::text("까지")),
        ];
        assert_eq!(serialize(&modules), "09:00, 10:00 까지");
    }

    #[test]
    fn test_serialize_skips_empty_modules() {
        let modules = vec![
            module(1, ModuleData::text("  ")),
            module(2, ModuleData::text("안녕")),
            module(3, ModuleData::Time(TimeSet::default())),
            module(4, ModuleData::Ending(Ending::new(["하세요"]))),
            module(5, ModuleData::symbol("!")),
        ];
        assert_eq!(serialize(&modules), "안녕 하세요 !");
    }

    #[test]
    fn test_serialize_never_double_spaces() {
        let modules = vec![
            module(1, ModuleData::text(" 영업  시간은 ")),
            module(2, ModuleData::Date(DateSet::new(["평일", "토"]))),
            module(3, ModuleData::text("\t입니다\n")),
        ];
        let text = serialize(&modules);
        assert_eq!(text, "영업 시간은 평일, 토 입니다");
        assert!(!text.contains("  "));
        assert_eq!(text.trim(), text);
    }

    #[test]
    fn test_module_label_placeholder() {
        let m = module(1, ModuleData::empty(ModuleType::Date));
        assert_eq!(m.label(), "[날짜]");
    }

    #[test]
    fn test_module_serde_shape() {
        let m = module(7, ModuleData::text("hi"));
        let value = serde_json::to_value(&m).unwrap();
        assert_eq!(value["id"], 7);
        assert_eq!(value["type"], "TEXT");
        assert_eq!(value["data"], "hi");
    }
}
