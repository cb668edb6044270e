//! Languages, translation directions and script-based language detection
//!
//! Only two languages are supported: English (Latin script) and Sinhala
//! (Sinhala script, `U+0D80..=U+0DFF`). Detection looks at the script first;
//! Latin-only text is then run through `whatlang` so that French, German and
//! other Latin-script languages are not mistaken for English.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static SINHALA_CHAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\u{0D80}-\u{0DFF}]").expect("valid Sinhala block pattern"));
static LATIN_CHAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z]").expect("valid Latin pattern"));

/// A supported language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "en")]
    English,
    #[serde(rename = "si")]
    Sinhala,
}

impl Language {
    /// ISO 639-1 code ("en" or "si")
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Sinhala => "si",
        }
    }

    /// The other language of the pair
    pub fn counterpart(&self) -> Language {
        match self {
            Language::English => Language::Sinhala,
            Language::Sinhala => Language::English,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" | "eng" | "english" => Ok(Language::English),
            "si" | "sin" | "sinhala" => Ok(Language::Sinhala),
            other => Err(format!("Unsupported language: {}", other)),
        }
    }
}

/// Translation orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "en-si")]
    EnToSi,
    #[serde(rename = "si-en")]
    SiToEn,
}

impl Direction {
    pub fn source(&self) -> Language {
        match self {
            Direction::EnToSi => Language::English,
            Direction::SiToEn => Language::Sinhala,
        }
    }

    pub fn target(&self) -> Language {
        self.source().counterpart()
    }

    /// Direction whose source is `language`
    pub fn from_source(language: Language) -> Self {
        match language {
            Language::English => Direction::EnToSi,
            Language::Sinhala => Direction::SiToEn,
        }
    }

    /// Pick a direction from the script of `text`
    ///
    /// Pure Sinhala text translates to English; everything else (English,
    /// mixed or unknown) is treated as English source.
    pub fn auto(text: &str) -> Self {
        match detect_language(text) {
            DetectedLanguage::Sinhala => Direction::SiToEn,
            _ => Direction::EnToSi,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::EnToSi => "en-si",
            Direction::SiToEn => "si-en",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en-si" | "en_si" | "en2si" => Ok(Direction::EnToSi),
            "si-en" | "si_en" | "si2en" => Ok(Direction::SiToEn),
            other => Err(format!(
                "Invalid direction '{}': expected 'en-si' or 'si-en'",
                other
            )),
        }
    }
}

/// Result of language detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectedLanguage {
    English,
    Sinhala,
    /// Both Sinhala and Latin letters are present
    Mixed,
    /// Latin-script text reliably identified as another language (ISO code)
    Other(&'static str),
    /// Neither script is present (digits, punctuation, other scripts)
    Unknown,
}

impl DetectedLanguage {
    pub fn code(&self) -> &'static str {
        match self {
            DetectedLanguage::English => "en",
            DetectedLanguage::Sinhala => "si",
            DetectedLanguage::Mixed => "mixed",
            DetectedLanguage::Other(code) => *code,
            DetectedLanguage::Unknown => "unknown",
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, DetectedLanguage::Other(_) | DetectedLanguage::Unknown)
    }
}

/// Detect whether `text` is English, Sinhala, a mix of both, another
/// Latin-script language, or none of these
///
/// Latin-only text counts as English unless `whatlang` reliably says
/// otherwise. Short or ambiguous input stays English.
///
/// # Example
/// ```
/// use idiom_bridge::language::{DetectedLanguage, detect_language};
///
/// assert_eq!(detect_language("hello"), DetectedLanguage::English);
/// assert_eq!(detect_language("ආයුබෝවන්"), DetectedLanguage::Sinhala);
/// assert_eq!(detect_language("hello ආයුබෝවන්"), DetectedLanguage::Mixed);
/// assert_eq!(detect_language("1234"), DetectedLanguage::Unknown);
/// ```
pub fn detect_language(text: &str) -> DetectedLanguage {
    let has_sinhala = SINHALA_CHAR_RE.is_match(text);
    let has_latin = LATIN_CHAR_RE.is_match(text);

    match (has_sinhala, has_latin) {
        (true, true) => DetectedLanguage::Mixed,
        (true, false) => DetectedLanguage::Sinhala,
        (false, true) => identify_latin(text),
        (false, false) => DetectedLanguage::Unknown,
    }
}

/// Shorter Latin text is taken as English without consulting `whatlang`
const MIN_IDENTIFY_LETTERS: usize = 20;

fn identify_latin(text: &str) -> DetectedLanguage {
    if text.chars().filter(|c| c.is_alphabetic()).count() < MIN_IDENTIFY_LETTERS {
        return DetectedLanguage::English;
    }
    let Some(info) = whatlang::detect(text) else {
        return DetectedLanguage::English;
    };
    if !info.is_reliable() {
        return DetectedLanguage::English;
    }

    match info.lang() {
        whatlang::Lang::Eng => DetectedLanguage::English,
        lang => DetectedLanguage::Other(lang_to_code(lang)),
    }
}

/// ISO 639-1 where common, otherwise whatlang's ISO 639-3 code
fn lang_to_code(lang: whatlang::Lang) -> &'static str {
    use whatlang::Lang::*;
    match lang {
        Fra => "fr",
        Deu => "de",
        Spa => "es",
        Por => "pt",
        Ita => "it",
        Nld => "nl",
        Pol => "pl",
        Tur => "tr",
        Vie => "vi",
        Swe => "sv",
        Dan => "da",
        Fin => "fi",
        Ces => "cs",
        Hun => "hu",
        Ron => "ro",
        Ind => "id",
        other => other.code(),
    }
}
