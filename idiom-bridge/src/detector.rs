//! Longest-match, non-overlapping idiom detection
//!
//! Both languages go through the same loop; only the per-idiom matcher
//! differs (see [`crate::index::MatchStrategy`]).

use crate::index::{IdiomIndex, IdiomPair};
use crate::language::Language;
use serde::{Deserialize, Serialize};

/// Byte range `[start, end)` into a source string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// True if the two ranges share at least one index
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && self.end > other.start
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// An idiom found in a piece of source text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedIdiom {
    pub english: String,
    pub sinhala: String,
    pub span: Span,
}

impl DetectedIdiom {
    /// The idiom as written in `language`
    pub fn in_language(&self, language: Language) -> &str {
        match language {
            Language::English => &self.english,
            Language::Sinhala => &self.sinhala,
        }
    }

    pub fn pair(&self) -> IdiomPair {
        IdiomPair::new(&self.english, &self.sinhala)
    }
}

/// Scans text for dictionary idioms
#[derive(Debug, Clone, Default)]
pub struct IdiomDetector {
    index: IdiomIndex,
}

impl IdiomDetector {
    pub fn new(index: IdiomIndex) -> Self {
        Self { index }
    }

    pub fn index(&self) -> &IdiomIndex {
        &self.index
    }

    /// Detect idioms of `language` in `text`
    ///
    /// Idioms are tried longest first. Every match of the current idiom is
    /// accepted unless it intersects a span claimed earlier, so a shorter
    /// idiom contained in a longer one is never reported for the same text.
    ///
    /// The result is ordered by idiom priority, not by position in `text`.
    ///
    /// # Example
    /// ```
    /// use idiom_bridge::{IdiomDetector, IdiomIndex, Language};
    ///
    /// let index = IdiomIndex::new([("break the ice", "X"), ("the ice", "Y")]).unwrap();
    /// let detector = IdiomDetector::new(index);
    /// let found = detector.detect_in("Let's break the ice.", Language::English);
    /// assert_eq!(found.len(), 1);
    /// assert_eq!(found[0].sinhala, "X");
    /// ```
    pub fn detect_in(&self, text: &str, language: Language) -> Vec<DetectedIdiom> {
        let mut detected = Vec::new();
        let mut used: Vec<Span> = Vec::new();

        for pattern in self.index.patterns(language) {
            for span in pattern.matcher.find_all(text) {
                if used.iter().any(|u| span.overlaps(u)) {
                    continue;
                }

                let pair = pattern.to_pair(language);
                detected.push(DetectedIdiom {
                    english: pair.english,
                    sinhala: pair.sinhala,
                    span,
                });
                used.push(span);
            }
        }

        detected
    }
}
