//! Idiom dictionary with compiled, length-sorted match tables
//!
//! The index is built once from an English → Sinhala mapping and never
//! mutated afterwards. Besides the two lookup maps it keeps one pattern table
//! per language, sorted longest idiom first, which is what the detector walks.

use crate::detector::Span;
use crate::error::{IdiomError, IdiomResult};
use crate::language::Language;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One dictionary entry
///
/// `english` is always the case-folded key; `sinhala` is kept verbatim
/// (the script has no case).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdiomPair {
    pub english: String,
    pub sinhala: String,
}

impl IdiomPair {
    pub fn new(english: impl Into<String>, sinhala: impl Into<String>) -> Self {
        Self {
            english: english.into(),
            sinhala: sinhala.into(),
        }
    }

    /// The idiom as written in `language`
    pub fn in_language(&self, language: Language) -> &str {
        match language {
            Language::English => &self.english,
            Language::Sinhala => &self.sinhala,
        }
    }
}

/// How an idiom is located in text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    /// Whole words only, case-insensitive (English)
    WordBoundary,
    /// Raw substring, exact (Sinhala, whose orthography has no ASCII word breaks)
    Substring,
}

impl MatchStrategy {
    pub fn for_language(language: Language) -> Self {
        match language {
            Language::English => MatchStrategy::WordBoundary,
            Language::Sinhala => MatchStrategy::Substring,
        }
    }
}

/// A compiled matcher for a single idiom
#[derive(Debug, Clone)]
pub enum Matcher {
    WordBoundary(Regex),
    Substring(String),
}

impl Matcher {
    /// Compile `idiom` with the given strategy
    ///
    /// The idiom is escaped, so regex metacharacters in dictionary entries
    /// ("an arm and a leg?") match literally.
    pub fn new(idiom: &str, strategy: MatchStrategy) -> IdiomResult<Self> {
        match strategy {
            MatchStrategy::WordBoundary => {
                let pattern = format!(r"\b{}\b", regex::escape(idiom));
                let regex = RegexBuilder::new(&pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| {
                        IdiomError::ConfigLoad(format!(
                            "Failed to compile pattern for idiom '{}': {}",
                            idiom, e
                        ))
                    })?;
                Ok(Matcher::WordBoundary(regex))
            }
            MatchStrategy::Substring => Ok(Matcher::Substring(idiom.to_string())),
        }
    }

    pub fn strategy(&self) -> MatchStrategy {
        match self {
            Matcher::WordBoundary(_) => MatchStrategy::WordBoundary,
            Matcher::Substring(_) => MatchStrategy::Substring,
        }
    }

    /// All non-overlapping matches, scanning left to right
    pub fn find_all(&self, text: &str) -> Vec<Span> {
        match self {
            Matcher::WordBoundary(regex) => regex
                .find_iter(text)
                .map(|m| Span::new(m.start(), m.end()))
                .collect(),
            Matcher::Substring(needle) => text
                .match_indices(needle.as_str())
                .map(|(start, matched)| Span::new(start, start + matched.len()))
                .collect(),
        }
    }

    /// The leftmost match, if any
    pub fn find_first(&self, text: &str) -> Option<Span> {
        match self {
            Matcher::WordBoundary(regex) => regex.find(text).map(|m| Span::new(m.start(), m.end())),
            Matcher::Substring(needle) => text
                .find(needle.as_str())
                .map(|start| Span::new(start, start + needle.len())),
        }
    }
}

/// A row of a per-language detection table
#[derive(Debug, Clone)]
pub struct IdiomPattern {
    /// The idiom in the table's language
    pub idiom: String,
    /// Its rendering in the other language
    pub counterpart: String,
    pub matcher: Matcher,
}

impl IdiomPattern {
    /// The English/Sinhala pair this row stands for, given the table's language
    pub fn to_pair(&self, language: Language) -> IdiomPair {
        match language {
            Language::English => IdiomPair::new(&self.idiom, &self.counterpart),
            Language::Sinhala => IdiomPair::new(&self.counterpart, &self.idiom),
        }
    }
}

/// The English ↔ Sinhala idiom dictionary
#[derive(Debug, Clone, Default)]
pub struct IdiomIndex {
    // Case-folded English, dictionary order, duplicates collapsed
    pairs: Vec<IdiomPair>,
    forward: HashMap<String, String>,
    reverse: HashMap<String, String>,
    english_patterns: Vec<IdiomPattern>,
    sinhala_patterns: Vec<IdiomPattern>,
}

impl IdiomIndex {
    /// Build an index from English → Sinhala entries
    ///
    /// Entries are taken in iteration order. English keys are case-folded; a
    /// later entry with the same folded key replaces the earlier value but
    /// keeps its position. The reverse map points each Sinhala idiom at the
    /// English idiom as originally written (last write wins).
    ///
    /// # Errors
    /// `IdiomError::ConfigLoad` if a key or value is empty.
    ///
    /// # Example
    /// ```
    /// use idiom_bridge::IdiomIndex;
    ///
    /// let index = IdiomIndex::new([("Break the ice", "නිහඬතාව බිඳිනවා")]).unwrap();
    /// assert_eq!(index.lookup_sinhala("BREAK THE ICE"), Some("නිහඬතාව බිඳිනවා"));
    /// assert_eq!(index.lookup_english("නිහඬතාව බිඳිනවා"), Some("Break the ice"));
    /// ```
    pub fn new<I, K, V>(entries: I) -> IdiomResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        // (folded key, original english, sinhala)
        let mut collapsed: Vec<(String, String, String)> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for (english, sinhala) in entries {
            let english = english.as_ref();
            let sinhala = sinhala.as_ref();
            if english.trim().is_empty() {
                return Err(IdiomError::ConfigLoad(
                    "Idiom dictionary contains an empty English idiom".to_string(),
                ));
            }
            if sinhala.trim().is_empty() {
                return Err(IdiomError::ConfigLoad(format!(
                    "Idiom '{}' has an empty Sinhala translation",
                    english
                )));
            }

            let key = english.to_lowercase();
            let entry = (key.clone(), english.to_string(), sinhala.to_string());
            match positions.get(&key) {
                Some(&i) => collapsed[i] = entry,
                None => {
                    positions.insert(key, collapsed.len());
                    collapsed.push(entry);
                }
            }
        }

        let mut forward = HashMap::with_capacity(collapsed.len());
        let mut reverse = HashMap::with_capacity(collapsed.len());
        let mut sinhala_order = Vec::new();
        let mut pairs = Vec::with_capacity(collapsed.len());

        for (key, original, sinhala) in collapsed {
            forward.insert(key.clone(), sinhala.clone());
            if reverse.insert(sinhala.clone(), original).is_none() {
                sinhala_order.push(sinhala.clone());
            }
            pairs.push(IdiomPair::new(key, sinhala));
        }

        let mut english_patterns = pairs
            .iter()
            .map(|pair| {
                Ok(IdiomPattern {
                    idiom: pair.english.clone(),
                    counterpart: pair.sinhala.clone(),
                    matcher: Matcher::new(&pair.english, MatchStrategy::WordBoundary)?,
                })
            })
            .collect::<IdiomResult<Vec<_>>>()?;

        let mut sinhala_patterns = sinhala_order
            .into_iter()
            .map(|sinhala| {
                let english = reverse[&sinhala].clone();
                Ok(IdiomPattern {
                    matcher: Matcher::new(&sinhala, MatchStrategy::Substring)?,
                    idiom: sinhala,
                    counterpart: english,
                })
            })
            .collect::<IdiomResult<Vec<_>>>()?;

        // Stable sorts keep dictionary order among equal lengths
        english_patterns.sort_by_key(|p| std::cmp::Reverse(p.idiom.chars().count()));
        sinhala_patterns.sort_by_key(|p| std::cmp::Reverse(p.idiom.chars().count()));

        tracing::debug!(
            idioms = pairs.len(),
            sinhala_idioms = sinhala_patterns.len(),
            "built idiom index"
        );

        Ok(Self {
            pairs,
            forward,
            reverse,
            english_patterns,
            sinhala_patterns,
        })
    }

    /// Sinhala rendering of an English idiom, case-insensitively
    pub fn lookup_sinhala(&self, english_idiom: &str) -> Option<&str> {
        self.forward
            .get(&english_idiom.to_lowercase())
            .map(String::as_str)
    }

    /// English rendering of a Sinhala idiom (exact match)
    pub fn lookup_english(&self, sinhala_idiom: &str) -> Option<&str> {
        self.reverse.get(sinhala_idiom).map(String::as_str)
    }

    /// Every pair in dictionary order
    ///
    /// Each call starts a fresh iteration over the index.
    pub fn all_pairs(&self) -> impl Iterator<Item = &IdiomPair> + '_ {
        self.pairs.iter()
    }

    /// The detection table for `language`, longest idiom first
    pub fn patterns(&self, language: Language) -> &[IdiomPattern] {
        match language {
            Language::English => &self.english_patterns,
            Language::Sinhala => &self.sinhala_patterns,
        }
    }

    /// The detection row for `idiom` as written in `language`
    ///
    /// English is looked up by case-folded key, Sinhala verbatim.
    pub fn pattern_for(&self, language: Language, idiom: &str) -> Option<&IdiomPattern> {
        let wanted = match language {
            Language::English => idiom.to_lowercase(),
            Language::Sinhala => idiom.to_string(),
        };
        self.patterns(language).iter().find(|p| p.idiom == wanted)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_index() -> IdiomIndex {
        IdiomIndex::new([
            ("break the ice", "නිහඬතාව බිඳිනවා"),
            ("once in a blue moon", "කලාතුරකින්"),
            ("the ice", "අයිස්"),
        ])
        .unwrap()
    }

    #[test]
    fn test_lookup_sinhala_is_case_insensitive() {
        let index = sample_index();
        assert_eq!(index.lookup_sinhala("Break The Ice"), Some("නිහඬතාව බිඳිනවා"));
        assert_eq!(index.lookup_sinhala("spill the beans"), None);
    }

    #[test]
    fn test_lookup_english_is_exact() {
        let index = sample_index();
        assert_eq!(index.lookup_english("කලාතුරකින්"), Some("once in a blue moon"));
        assert_eq!(index.lookup_english("කලාතුරකින"), None);
    }

    #[test]
    fn test_english_keys_are_case_folded() {
        let index = IdiomIndex::new([("Spill The Beans", "රහස එළි කරනවා")]).unwrap();
        let pairs: Vec<_> = index.all_pairs().collect();
        assert_eq!(pairs[0].english, "spill the beans");
        // Reverse lookup keeps the original spelling
        assert_eq!(index.lookup_english("රහස එළි කරනවා"), Some("Spill The Beans"));
    }

    #[test]
    fn test_duplicate_keys_last_write_wins() {
        let index = IdiomIndex::new([
            ("break the ice", "පළමු"),
            ("once in a blue moon", "කලාතුරකින්"),
            ("Break the ice", "දෙවැනි"),
        ])
        .unwrap();

        assert_eq!(index.len(), 2);
        assert_eq!(index.lookup_sinhala("break the ice"), Some("දෙවැනි"));
        // The collapsed entry keeps its original position
        let first = index.all_pairs().next().unwrap();
        assert_eq!(first.english, "break the ice");
        assert_eq!(first.sinhala, "දෙවැනි");
        assert_eq!(index.lookup_english("පළමු"), None);
    }

    #[test]
    fn test_patterns_sorted_longest_first() {
        let index = sample_index();
        let english: Vec<_> = index
            .patterns(Language::English)
            .iter()
            .map(|p| p.idiom.as_str())
            .collect();
        assert_eq!(english, vec!["once in a blue moon", "break the ice", "the ice"]);

        let lengths: Vec<_> = index
            .patterns(Language::Sinhala)
            .iter()
            .map(|p| p.idiom.chars().count())
            .collect();
        assert!(lengths.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_pattern_for_returns_compiled_row() {
        let index = sample_index();

        let row = index.pattern_for(Language::English, "Break The Ice").unwrap();
        assert_eq!(row.idiom, "break the ice");
        assert_eq!(row.matcher.strategy(), MatchStrategy::WordBoundary);

        let row = index.pattern_for(Language::Sinhala, "කලාතුරකින්").unwrap();
        assert_eq!(row.counterpart, "once in a blue moon");
        assert!(index.pattern_for(Language::English, "spill the beans").is_none());
    }

    #[test]
    fn test_equal_lengths_keep_dictionary_order() {
        let index = IdiomIndex::new([("abc", "ක"), ("xyz", "ග"), ("def", "ච")]).unwrap();
        let english: Vec<_> = index
            .patterns(Language::English)
            .iter()
            .map(|p| p.idiom.as_str())
            .collect();
        assert_eq!(english, vec!["abc", "xyz", "def"]);
    }

    #[test]
    fn test_all_pairs_is_restartable() {
        let index = sample_index();
        let first: Vec<_> = index.all_pairs().collect();
        let second: Vec<_> = index.all_pairs().collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }

    #[test]
    fn test_empty_index() {
        let index = IdiomIndex::new(Vec::<(String, String)>::new()).unwrap();
        assert!(index.is_empty());
        assert_eq!(index.all_pairs().count(), 0);
        assert!(index.patterns(Language::English).is_empty());
        assert!(index.patterns(Language::Sinhala).is_empty());
    }

    #[test]
    fn test_empty_entries_rejected() {
        assert!(matches!(
            IdiomIndex::new([("", "කලාතුරකින්")]),
            Err(IdiomError::ConfigLoad(_))
        ));
        assert!(matches!(
            IdiomIndex::new([("break the ice", "  ")]),
            Err(IdiomError::ConfigLoad(_))
        ));
    }

    #[test]
    fn test_word_boundary_matcher() {
        let matcher = Matcher::new("the ice", MatchStrategy::WordBoundary).unwrap();
        assert_eq!(matcher.find_all("The ice and the icebox"), vec![Span::new(0, 7)]);
        assert_eq!(matcher.find_first("break THE ICE"), Some(Span::new(6, 13)));
    }

    #[test]
    fn test_matcher_escapes_metacharacters() {
        let matcher = Matcher::new("a.b", MatchStrategy::WordBoundary).unwrap();
        assert!(matcher.find_first("axb").is_none());
        assert!(matcher.find_first("say a.b now").is_some());
    }

    #[test]
    fn test_trailing_punctuation_needs_word_after_it() {
        // `\b` after a non-word character only holds before a word character
        let matcher = Matcher::new("cost (a lot)", MatchStrategy::WordBoundary).unwrap();
        assert!(matcher.find_first("it will cost (a lot) today").is_none());
        assert!(matcher.find_first("it will cost (a lot)today").is_some());
    }

    #[test]
    fn test_substring_matcher_uses_byte_offsets() {
        let matcher = Matcher::new("අයිස්", MatchStrategy::Substring).unwrap();
        let text = "මම අයිස් කෑවා";
        let spans = matcher.find_all(text);
        assert_eq!(spans.len(), 1);
        assert_eq!(&text[spans[0].start..spans[0].end], "අයිස්");
        assert_eq!(matcher.strategy(), MatchStrategy::Substring);
    }
}
