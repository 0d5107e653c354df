//! Static preset configuration supplied by the host
//!
//! Categories, keyword chips, example Q&A pairs, toolbar presets and the
//! macro library. Fields missing from a presets file fall back to the
//! built-in set.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::macros::{MacroEntry, StaticLibrary};
use crate::module::{DateSet, Ending, ModuleData, TimeSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimePreset {
    pub label: String,
    pub times: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatePreset {
    pub label: String,
    pub dates: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndingPreset {
    pub label: String,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordGroup {
    pub category: String,
    pub words: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamplePair {
    pub category: String,
    pub question: String,
    pub answer: String,
}

/// A toolbar entry: clicking it adds `data` as a new module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preset {
    pub label: String,
    pub data: ModuleData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Presets {
    pub categories: Vec<String>,
    /// Named date tokens accepted besides ISO dates and the built-ins
    pub date_tokens: Vec<String>,
    pub symbols: Vec<String>,
    #[serde(rename = "time")]
    pub times: Vec<TimePreset>,
    #[serde(rename = "date")]
    pub dates: Vec<DatePreset>,
    #[serde(rename = "ending")]
    pub endings: Vec<EndingPreset>,
    #[serde(rename = "keyword")]
    pub keywords: Vec<KeywordGroup>,
    #[serde(rename = "example")]
    pub examples: Vec<ExamplePair>,
    #[serde(rename = "macro")]
    pub macros: Vec<MacroEntry>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for Presets {
    fn default() -> Self {
        Self {
            categories: strings(&["영업시간", "예약", "주차", "위치"]),
            date_tokens: strings(&["명절", "연휴"]),
            symbols: strings(&["~", "/", "!", "?"]),
            times: vec![
                TimePreset {
                    label: "영업시간".to_string(),
                    times: strings(&["09:00~18:00"]),
                },
                TimePreset {
                    label: "점심시간".to_string(),
                    times: strings(&["12:00~13:00"]),
                },
            ],
            dates: vec![
                DatePreset {
                    label: "평일".to_string(),
                    dates: strings(&["평일"]),
                },
                DatePreset {
                    label: "주말·공휴일".to_string(),
                    dates: strings(&["주말", "공휴일"]),
                },
            ],
            endings: vec![
                EndingPreset {
                    label: "서술".to_string(),
                    options: strings(&["입니다", "이에요", "예요"]),
                },
                EndingPreset {
                    label: "안내".to_string(),
                    options: strings(&["가능합니다", "불가능합니다"]),
                },
            ],
            keywords: vec![
                KeywordGroup {
                    category: "영업시간".to_string(),
                    words: strings(&["영업시간", "몇 시", "오픈", "마감"]),
                },
                KeywordGroup {
                    category: "주차".to_string(),
                    words: strings(&["주차", "주차장", "무료 주차"]),
                },
            ],
            examples: vec![
                ExamplePair {
                    category: "영업시간".to_string(),
                    question: "영업시간이 어떻게 되나요?".to_string(),
                    answer: "평일 09:00~18:00 영업합니다.".to_string(),
                },
                ExamplePair {
                    category: "주차".to_string(),
                    question: "주차 가능한가요?".to_string(),
                    answer: "건물 지하 주차장을 이용하실 수 있습니다.".to_string(),
                },
            ],
            macros: vec![
                MacroEntry::new("주소", "서울특별시 중구 세종대로 110"),
                MacroEntry::new("전화", "02-123-4567"),
            ],
        }
    }
}

impl Presets {
    /// Load presets from a TOML file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read presets file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse presets file: {}", path.display()))
    }

    /// Toolbar presets in display order: times, dates, endings, symbols
    pub fn toolbar(&self) -> Vec<Preset> {
        let times = self.times.iter().map(|p| Preset {
            label: p.label.clone(),
            data: ModuleData::Time(TimeSet::new(&p.times)),
        });
        let dates = self.dates.iter().map(|p| {
            let mut set = DateSet::default();
            for d in &p.dates {
                set.insert(d, &self.date_tokens);
            }
            Preset {
                label: p.label.clone(),
                data: ModuleData::Date(set),
            }
        });
        let endings = self.endings.iter().map(|p| Preset {
            label: p.label.clone(),
            data: ModuleData::Ending(Ending::new(p.options.iter().cloned())),
        });
        let symbols = self.symbols.iter().map(|s| Preset {
            label: s.clone(),
            data: ModuleData::symbol(s.clone()),
        });

        times.chain(dates).chain(endings).chain(symbols).collect()
    }

    /// Payload for a bare ending module: the first configured option list
    pub fn default_ending(&self) -> Ending {
        self.endings
            .first()
            .map(|p| Ending::new(p.options.iter().cloned()))
            .unwrap_or_default()
    }

    pub fn keywords_for(&self, category: &str) -> Vec<&str> {
        self.keywords
            .iter()
            .filter(|g| g.category == category)
            .flat_map(|g| g.words.iter().map(String::as_str))
            .collect()
    }

    pub fn examples_for(&self, category: &str) -> Vec<&ExamplePair> {
        self.examples
            .iter()
            .filter(|e| e.category == category)
            .collect()
    }

    pub fn library(&self) -> StaticLibrary {
        StaticLibrary::new(self.macros.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::ModuleType;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_toolbar_order() {
        let presets = Presets::default();
        let toolbar = presets.toolbar();
        let types: Vec<ModuleType> = toolbar.iter().map(|p| p.data.module_type()).collect();
        assert_eq!(types.first(), Some(&ModuleType::Time));
        assert_eq!(types.last(), Some(&ModuleType::Symbol));
        assert_eq!(toolbar.len(), 2 + 2 + 2 + 4);
        assert_eq!(toolbar[0].data.token(), "09:00~18:00");
        assert_eq!(toolbar[3].data.token(), "주말, 공휴일");
    }

    #[test]
    fn test_keywords_and_examples_by_category() {
        let presets = Presets::default();
        assert_eq!(presets.keywords_for("주차"), ["주차", "주차장", "무료 주차"]);
        assert!(presets.keywords_for("없는 분류").is_empty());
        assert_eq!(presets.examples_for("영업시간").len(), 1);
    }

    #[test]
    fn test_load_partial_file() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        file.write_all(
            "categories = [\"배송\"]\n\
date_tokens = [\"택배휴무일\"]\n\
\n\
[[date]]\n\
label = \"휴무\"\n\
dates = [\"택배휴무일\", \"2024-12-25\", \"아무날\"]\n\
\n\
[[macro]]\n\
trigger = \"택배\"\n\
replacement = \"CJ대한통운\"\n"
                .as_bytes(),
        )?;

        let presets = Presets::load_from(file.path())?;
        assert_eq!(presets.categories, ["배송"]);
        assert_eq!(presets.dates.len(), 1);
        assert_eq!(presets.macros.len(), 1);
        // Unspecified sections keep the built-ins
        assert_eq!(presets.times, Presets::default().times);

        let date = presets
            .toolbar()
            .into_iter()
            .find(|p| p.label == "휴무")
            .map(|p| p.data.token());
        assert_eq!(date.as_deref(), Some("택배휴무일, 2024-12-25"));
        Ok(())
    }

    #[test]
    fn test_load_invalid_file_errors() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[[time]\nlabel = ").unwrap();
        assert!(Presets::load_from(file.path()).is_err());
    }
}
