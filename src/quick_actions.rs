//! Canned prompts behind the quick-action buttons.
//!
//! `summarize` and `compare` are gated on the number of uploaded files: below
//! the threshold they place an upload prompt in the input instead.

use std::fmt;
use std::str::FromStr;

/// Input placed by the web search action.
pub const SEARCH_TEXT: &str = "Search the web for information about ";
/// Input placed by the summarize action when files exist.
pub const SUMMARIZE_TEXT: &str = "Please summarize all the uploaded PDF documents";
/// Input placed by the summarize action without files.
pub const SUMMARIZE_NEEDS_FILES_TEXT: &str =
    "Please upload some PDF files first, then I can summarize them for you.";
/// Input placed by the compare action with at least two files.
pub const COMPARE_TEXT: &str =
    "Compare the uploaded documents and show me the similarities and differences";
/// Input placed by the compare action with fewer than two files.
pub const COMPARE_NEEDS_FILES_TEXT: &str =
    "Please upload at least 2 PDF files first, then I can compare them for you.";
/// Input placed by the rank action.
pub const RANK_TEXT: &str = "Help me rank and cite sources for my research on ";

/// A named quick action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum QuickAction {
    /// Web search.
    Search,
    /// Summarize uploaded PDFs.
    Summarize,
    /// Compare uploaded PDFs.
    Compare,
    /// Rank and cite sources.
    Rank,
}

impl QuickAction {
    /// Every action, in display order.
    pub const ALL: [Self; 4] = [Self::Search, Self::Summarize, Self::Compare, Self::Rank];

    /// Action name as typed by the user.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::Summarize => "summarize",
            Self::Compare => "compare",
            Self::Rank => "rank",
        }
    }

    /// Card label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Search => "Web Search",
            Self::Summarize => "Summarize PDFs",
            Self::Compare => "Compare Docs",
            Self::Rank => "Rank Sources",
        }
    }

    /// Card description.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Search => "Search the web for information",
            Self::Summarize => "Summarize uploaded documents",
            Self::Compare => "Compare multiple documents",
            Self::Rank => "Rank and cite sources",
        }
    }

    /// Whether the card is clickable with `file_count` files uploaded.
    #[must_use]
    pub const fn is_enabled(self, file_count: usize) -> bool {
        match self {
            Self::Search | Self::Rank => true,
            Self::Summarize | Self::Compare => file_count > 0,
        }
    }

    /// Input text the action produces with `file_count` files uploaded.
    #[must_use]
    pub const fn text(self, file_count: usize) -> &'static str {
        match self {
            Self::Search => SEARCH_TEXT,
            Self::Summarize if file_count == 0 => SUMMARIZE_NEEDS_FILES_TEXT,
            Self::Summarize => SUMMARIZE_TEXT,
            Self::Compare if file_count < 2 => COMPARE_NEEDS_FILES_TEXT,
            Self::Compare => COMPARE_TEXT,
            Self::Rank => RANK_TEXT,
        }
    }
}

impl fmt::Display for QuickAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unrecognized action name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown quick action: {0}")]
pub struct UnknownAction(pub String);

impl FromStr for QuickAction {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|action| action.name() == s)
            .ok_or_else(|| UnknownAction(s.to_string()))
    }
}

/// Replace `input` with the text of the action `name`.
///
/// Unknown names leave `input` untouched and return `false`.
pub fn apply_quick_action(name: &str, file_count: usize, input: &mut String) -> bool {
    let Ok(action) = name.parse::<QuickAction>() else {
        return false;
    };
    action.text(file_count).clone_into(input);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize_gated_on_any_file() {
        assert_eq!(QuickAction::Summarize.text(0), SUMMARIZE_NEEDS_FILES_TEXT);
        assert_eq!(QuickAction::Summarize.text(1), SUMMARIZE_TEXT);
        assert_eq!(QuickAction::Summarize.text(5), SUMMARIZE_TEXT);
    }

    #[test]
    fn test_compare_needs_two_files() {
        assert_eq!(QuickAction::Compare.text(0), COMPARE_NEEDS_FILES_TEXT);
        assert_eq!(QuickAction::Compare.text(1), COMPARE_NEEDS_FILES_TEXT);
        assert_eq!(QuickAction::Compare.text(2), COMPARE_TEXT);
    }

    #[test]
    fn test_ungated_actions() {
        assert_eq!(QuickAction::Search.text(0), SEARCH_TEXT);
        assert_eq!(QuickAction::Rank.text(3), RANK_TEXT);
    }

    #[test]
    fn test_apply_replaces_input() {
        let mut input = String::from("draft");
        assert!(apply_quick_action("compare", 2, &mut input));
        assert_eq!(input, COMPARE_TEXT);
    }

    #[test]
    fn test_unknown_action_is_noop() {
        let mut input = String::from("draft");
        assert!(!apply_quick_action("translate", 2, &mut input));
        assert_eq!(input, "draft");
        assert_eq!(
            "translate".parse::<QuickAction>(),
            Err(UnknownAction("translate".into()))
        );
    }

    #[test]
    fn test_card_enabled_rule() {
        // compare is enabled with one file; its text still asks for a second
        assert!(QuickAction::Compare.is_enabled(1));
        assert!(!QuickAction::Summarize.is_enabled(0));
        assert!(QuickAction::Search.is_enabled(0));
    }

    #[test]
    fn test_names_round_trip() {
        for action in QuickAction::ALL {
            assert_eq!(action.to_string().parse::<QuickAction>(), Ok(action));
        }
    }
}
