// src/chat/categorizer.rs
// Keyword classifier for analytics labels

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Analytics label for a user message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Hraci,
    Formace,
    Videomapy,
    Brankari,
    Zapasy,
    Tymy,
    Ostatni,
}

/// Keyword table in match order. Earlier entries win on overlaps.
const KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::Hraci,
        &[
            "hrac", "hraci", "hrace", "strelec", "strelci", "strelce", "tabulky", "gamelog",
            "trend", "porovnani",
        ],
    ),
    (Category::Formace, &["formace", "formaci", "dvojice", "kombinace"]),
    (
        Category::Videomapy,
        &["videomapy", "video", "strely", "heatmapa", "prihravky", "vhazovani"],
    ),
    (Category::Brankari, &["brankar", "brankari", "mapa strel", "najezdy"]),
    (Category::Zapasy, &["zapas", "zapasy", "vizualizace", "grafiky", "report"]),
    (Category::Tymy, &["tym", "tymy"]),
];

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Hraci => "hraci",
            Category::Formace => "formace",
            Category::Videomapy => "videomapy",
            Category::Brankari => "brankari",
            Category::Zapasy => "zapasy",
            Category::Tymy => "tymy",
            Category::Ostatni => "ostatni",
        }
    }

    pub fn all() -> [Category; 7] {
        [
            Category::Hraci,
            Category::Formace,
            Category::Videomapy,
            Category::Brankari,
            Category::Zapasy,
            Category::Tymy,
            Category::Ostatni,
        ]
    }

    /// Keywords for this category; `Ostatni` has none
    pub fn keywords(&self) -> &'static [&'static str] {
        KEYWORDS
            .iter()
            .find(|(category, _)| category == self)
            .map(|(_, keywords)| *keywords)
            .unwrap_or(&[])
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::all()
            .into_iter()
            .find(|c| c.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| anyhow::anyhow!("Unknown category: {}", s))
    }
}

fn fold_char(c: char) -> char {
    match c {
        'á' => 'a',
        'č' => 'c',
        'ď' => 'd',
        'é' => 'e',
        'ě' => 'e',
        'í' => 'i',
        'ň' => 'n',
        'ó' => 'o',
        'ř' => 'r',
        'š' => 's',
        'ť' => 't',
        'ú' => 'u',
        'ů' => 'u',
        'ý' => 'y',
        'ž' => 'z',
        other => other,
    }
}

/// Lower-case and strip Czech diacritics; other characters pass through lower-cased
pub fn normalize(text: &str) -> String {
    text.chars().flat_map(char::to_lowercase).map(fold_char).collect()
}

/// First category whose keyword occurs in the normalised message
pub fn classify(message: &str) -> Category {
    let normalized = normalize(message);
    KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| normalized.contains(k)))
        .map(|(category, _)| *category)
        .unwrap_or(Category::Ostatni)
}
