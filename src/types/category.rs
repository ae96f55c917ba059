//! Document categories.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::DocclassError;

/// The closed set of categories a document can be assigned to.
///
/// Variant order is the order in which labels are offered to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Education,
    Work,
    Health,
    Finance,
    Travel,
    Legal,
}

impl Category {
    /// All categories, in candidate-label order.
    pub const ALL: [Category; 6] = [
        Category::Education,
        Category::Work,
        Category::Health,
        Category::Finance,
        Category::Travel,
        Category::Legal,
    ];

    /// The label string sent to the model and printed in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Education => "Education",
            Self::Work => "Work",
            Self::Health => "Health",
            Self::Finance => "Finance",
            Self::Travel => "Travel",
            Self::Legal => "Legal",
        }
    }

    /// Candidate labels, in order.
    pub fn labels() -> [&'static str; 6] {
        Self::ALL.map(|c| c.as_str())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = DocclassError;

    /// Parses a label as returned by a model. Remote models may change case,
    /// so the match is case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| {
                DocclassError::InvalidInput(format!("label outside candidate set: {trimmed}"))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_in_candidate_order() {
        assert_eq!(
            Category::labels(),
            ["Education", "Work", "Health", "Finance", "Travel", "Legal"]
        );
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("health".parse::<Category>().unwrap(), Category::Health);
        assert_eq!(" LEGAL ".parse::<Category>().unwrap(), Category::Legal);
    }

    #[test]
    fn parse_rejects_unknown_label() {
        let err = "Sports".parse::<Category>().unwrap_err();
        assert!(err.to_string().contains("Sports"));
    }

    #[test]
    fn serializes_as_label() {
        let json = serde_json::to_string(&Category::Finance).unwrap();
        assert_eq!(json, "\"Finance\"");
    }
}
