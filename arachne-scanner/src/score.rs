//! Heuristics for the best-first frontier.
//!
//! A scorer turns a freshly discovered link into a number and says which
//! end of the number line is better. The frontier never interprets scores
//! itself.

use crate::categorize::LinkCategory;

/// Which extreme of the score range pops first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreOrder {
    LowestFirst,
    HighestFirst,
}

/// The facts a scorer may look at for one candidate link.
#[derive(Debug, Clone)]
pub struct ScoreInput<'a> {
    pub url: &'a str,
    pub category: LinkCategory,
    pub anchor_text: Option<&'a str>,
    pub depth: usize,
    /// Text content of the page the link was found on.
    pub parent_content: &'a str,
}

pub trait Scorer: Send + Sync {
    fn score(&self, input: &ScoreInput<'_>) -> f64;

    fn order(&self) -> ScoreOrder;
}

/// Shorter URLs first.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkLengthScorer;

impl Scorer for LinkLengthScorer {
    fn score(&self, input: &ScoreInput<'_>) -> f64 {
        input.url.len() as f64
    }

    fn order(&self) -> ScoreOrder {
        ScoreOrder::LowestFirst
    }
}

/// Keyword density of the parent page plus the link's own anchor text.
#[derive(Debug, Clone)]
pub struct KeywordScorer {
    keywords: Vec<String>,
}

impl KeywordScorer {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    fn occurrences(&self, text: &str) -> usize {
        let text = text.to_lowercase();
        self.keywords
            .iter()
            .map(|keyword| text.matches(keyword.as_str()).count())
            .sum()
    }
}

impl Scorer for KeywordScorer {
    fn score(&self, input: &ScoreInput<'_>) -> f64 {
        let page = self.occurrences(input.parent_content);
        let anchor = input.anchor_text.map(|t| self.occurrences(t)).unwrap_or(0);
        (page + anchor) as f64
    }

    fn order(&self) -> ScoreOrder {
        ScoreOrder::HighestFirst
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input<'a>(url: &'a str, anchor: Option<&'a str>, content: &'a str) -> ScoreInput<'a> {
        ScoreInput {
            url,
            category: LinkCategory::InternalPage,
            anchor_text: anchor,
            depth: 1,
            parent_content: content,
        }
    }

    #[test]
    fn test_link_length_prefers_short_urls() {
        let scorer = LinkLengthScorer;
        assert_eq!(scorer.order(), ScoreOrder::LowestFirst);
        assert!(
            scorer.score(&input("http://a.com/x", None, ""))
                < scorer.score(&input("http://a.com/much/longer", None, ""))
        );
    }

    #[test]
    fn test_keyword_scorer_counts_case_insensitively() {
        let scorer = KeywordScorer::new(["Rust", " crawler "]);
        let score = scorer.score(&input(
            "http://a.com/",
            Some("A rust crawler"),
            "RUST is fun. rust, Rust.",
        ));
        // 3 in the page, 2 in the anchor
        assert_eq!(score, 5.0);
        assert_eq!(scorer.order(), ScoreOrder::HighestFirst);
    }

    #[test]
    fn test_keyword_scorer_ignores_blank_keywords() {
        let scorer = KeywordScorer::new(["", "  "]);
        assert_eq!(scorer.score(&input("http://a.com/", Some("text"), "text")), 0.0);
    }
}
