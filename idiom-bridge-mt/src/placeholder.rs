//! Placeholder protection for idioms during neural translation
//!
//! Detected idioms are swapped for opaque tokens before the text reaches the
//! model, so the model cannot translate them literally. Afterwards each token
//! is replaced by the curated target-language idiom.
//!
//! Format: `__IDIOM_{index}__` where index is the 0-based detection order.
//!
//! ```ignore
//! Source:      "We need to break the ice before the meeting."
//! Protected:   "We need to __IDIOM_0__ before the meeting."
//! Translated:  "රැස්වීමට පෙර අපි __IDIOM_0__ ඕනේ."
//! Restored:    "රැස්වීමට පෙර අපි නිහඬතාව බිඳිනවා ඕනේ."
//! ```
//!
//! When the model drops or mangles a token, the idiom is put back with
//! [`smart_inject`] instead.

use crate::error::MtResult;
use idiom_bridge::{DetectedIdiom, IdiomIndex, Language, MatchStrategy, Matcher};
use regex::Regex;
use std::sync::LazyLock;

/// Matches any idiom placeholder token
pub static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"__IDIOM_\d+__").expect("valid placeholder pattern"));

/// Outputs up to this many words get the idiom prepended on injection
const SHORT_OUTPUT_WORDS: usize = 3;
/// Latest word position an idiom is injected at in longer outputs
const MAX_INJECT_POSITION: usize = 3;

/// A placeholder token standing in for one detected idiom
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdiomPlaceholder {
    /// Detection order (0-based)
    pub index: usize,
    /// The token string sent to the model
    pub token: String,
    /// The target-language idiom the token stands for
    pub target: String,
}

impl IdiomPlaceholder {
    pub fn new(index: usize, target: impl Into<String>) -> Self {
        Self {
            index,
            token: format!("__IDIOM_{}__", index),
            target: target.into(),
        }
    }
}

/// Source text with idioms replaced by placeholder tokens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedText {
    pub text: String,
    pub placeholders: Vec<IdiomPlaceholder>,
}

/// Replace each detected idiom in `text` with a placeholder token
///
/// Detections are processed in order; for each one only the first remaining
/// occurrence of its source-language idiom is replaced. Each idiom is located
/// with the matcher `index` compiled for detection (whole-word and
/// case-insensitive for English, plain substring for Sinhala). Only idioms
/// missing from `index` get a matcher compiled here.
///
/// A placeholder is recorded for every detection, even if its idiom could not
/// be found again, so that restoration can still inject the target idiom.
///
/// # Arguments
/// * `index` - The dictionary `detected` came from
/// * `text` - The source text
/// * `detected` - Detections for `text`
/// * `source` - Language of `text`
///
/// # Example
/// ```ignore
/// let protected = protect_idioms(&index, "Let's break the ice", &detected, Language::English)?;
/// assert_eq!(protected.text, "Let's __IDIOM_0__");
/// ```
pub fn protect_idioms(
    index: &IdiomIndex,
    text: &str,
    detected: &[DetectedIdiom],
    source: Language,
) -> MtResult<ProtectedText> {
    let target = source.counterpart();
    let mut protected = text.to_string();
    let mut placeholders = Vec::with_capacity(detected.len());

    for (i, idiom) in detected.iter().enumerate() {
        let placeholder = IdiomPlaceholder::new(i, idiom.in_language(target));
        let idiom_text = idiom.in_language(source);

        let span = match index.pattern_for(source, idiom_text) {
            Some(row) => row.matcher.find_first(&protected),
            None => {
                Matcher::new(idiom_text, MatchStrategy::for_language(source))?.find_first(&protected)
            }
        };

        match span {
            Some(span) => protected.replace_range(span.start..span.end, &placeholder.token),
            None => tracing::debug!(
                idiom = idiom.in_language(source),
                "idiom not found for protection, will inject after translation"
            ),
        }
        placeholders.push(placeholder);
    }

    Ok(ProtectedText {
        text: protected,
        placeholders,
    })
}

/// Outcome of putting idioms back into a translation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Restoration {
    pub text: String,
    /// Placeholders found verbatim and replaced
    pub restored: usize,
    /// Placeholders lost by the model, handled by [`smart_inject`]
    pub injected: usize,
    pub warnings: Vec<String>,
}

/// Replace placeholder tokens in `translation` with their target idioms
///
/// A token that survived translation is replaced everywhere it appears. A
/// token that did not survive falls back to [`smart_inject`].
pub fn restore_idioms(translation: &str, placeholders: &[IdiomPlaceholder]) -> Restoration {
    let mut text = translation.to_string();
    let mut restored = 0;
    let mut injected = 0;
    let mut warnings = Vec::new();

    for placeholder in placeholders {
        if text.contains(&placeholder.token) {
            text = text.replace(&placeholder.token, &placeholder.target);
            restored += 1;
        } else {
            text = smart_inject(&text, &placeholder.target);
            injected += 1;
            warnings.push(format!(
                "Placeholder {} was lost in translation; idiom injected",
                placeholder.token
            ));
        }
    }

    if PLACEHOLDER_RE.is_match(&text) {
        warnings.push("Translation contains unexpected placeholder tokens".to_string());
    }

    Restoration {
        text,
        restored,
        injected,
        warnings,
    }
}

/// Insert `idiom` into `translation` when its placeholder was lost
///
/// - If the idiom is already present, the translation is returned unchanged.
/// - Outputs of up to three words get the idiom prepended.
/// - Longer outputs get it inserted at word position `min(3, words / 2)`,
///   and are re-joined with single spaces.
///
/// # Example
/// ```ignore
/// assert_eq!(smart_inject("hello there", "X"), "X hello there");
/// assert_eq!(smart_inject("a b c d e f", "X"), "a b c X d e f");
/// ```
pub fn smart_inject(translation: &str, idiom: &str) -> String {
    if translation.contains(idiom) {
        return translation.to_string();
    }

    let mut words: Vec<&str> = translation.split_whitespace().collect();
    if words.is_empty() {
        return idiom.to_string();
    }
    if words.len() <= SHORT_OUTPUT_WORDS {
        return format!("{} {}", idiom, translation);
    }

    let position = MAX_INJECT_POSITION.min(words.len() / 2);
    words.insert(position, idiom);
    words.join(" ")
}
