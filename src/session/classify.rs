//! Reply classification by literal marker strings.
//!
//! A reply is scanned against an ordered table of rules; the first rule with
//! a marker contained in the reply decides the category, otherwise the reply
//! is `General`.
//!
//! The emoji markers in the default table are kept byte-for-byte as the
//! deployed client matches them: UTF-8 emoji that were decoded as Windows-1252
//! somewhere upstream (for example `U+00F0 U+0178 U+201D` where U+1F50D was
//! meant). Replies carrying the real emoji only classify through the phrase
//! markers. Override the table through configuration once the intended
//! markers are confirmed.

use serde::{Deserialize, Serialize};

use super::types::MessageType;

/// Search marker as matched by the deployed client (mis-decoded U+1F50D).
pub const SEARCH_EMOJI_MARKER: &str = "\u{f0}\u{178}\u{201d}";
/// Summary marker as matched by the deployed client (mis-decoded U+1F4C4).
pub const SUMMARY_EMOJI_MARKER: &str = "\u{f0}\u{178}\u{201c}\u{201e}";
/// Comparison marker as matched by the deployed client (mis-decoded U+1F4CA).
pub const COMPARISON_EMOJI_MARKER: &str = "\u{f0}\u{178}\u{201c}\u{160}";
/// Citation marker as matched by the deployed client (mis-decoded U+1F4C8).
pub const CITATION_EMOJI_MARKER: &str = "\u{f0}\u{178}\u{201c}\u{2c6}";

/// One row of the classification table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerRule {
    /// Category assigned when a marker matches.
    pub kind: MessageType,
    /// Literal substrings; any one of them matches.
    pub markers: Vec<String>,
}

impl MarkerRule {
    /// Build a rule from literal markers.
    #[must_use]
    pub fn new(kind: MessageType, markers: &[&str]) -> Self {
        Self {
            kind,
            markers: markers.iter().map(|m| (*m).to_string()).collect(),
        }
    }

    fn matches(&self, content: &str) -> bool {
        self.markers
            .iter()
            .any(|marker| !marker.is_empty() && content.contains(marker.as_str()))
    }
}

/// Ordered marker table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageClassifier {
    rules: Vec<MarkerRule>,
}

impl Default for MessageClassifier {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

impl MessageClassifier {
    /// Classifier over the given rules, evaluated in order.
    #[must_use]
    pub const fn new(rules: Vec<MarkerRule>) -> Self {
        Self { rules }
    }

    /// Rules in evaluation order.
    #[must_use]
    pub fn rules(&self) -> &[MarkerRule] {
        &self.rules
    }

    /// Category of a reply.
    #[must_use]
    pub fn classify(&self, content: &str) -> MessageType {
        self.rules
            .iter()
            .find(|rule| rule.matches(content))
            .map_or(MessageType::General, |rule| rule.kind)
    }
}

/// Default table: search, summary, comparison, citation.
#[must_use]
pub fn default_rules() -> Vec<MarkerRule> {
    vec![
        MarkerRule::new(
            MessageType::Search,
            &[SEARCH_EMOJI_MARKER, "Web Search Results"],
        ),
        MarkerRule::new(MessageType::Summary, &[SUMMARY_EMOJI_MARKER, "PDF Summary"]),
        MarkerRule::new(
            MessageType::Comparison,
            &[COMPARISON_EMOJI_MARKER, "Document Comparison"],
        ),
        MarkerRule::new(
            MessageType::Citation,
            &[CITATION_EMOJI_MARKER, "Ranked Citations"],
        ),
    ]
}
