// src/faq.rs

//! FAQ catalog with case-insensitive search and category filtering.

// dependencies
use crate::errors::{Result, WindowLimiterError};
use serde::{Deserialize, Serialize};

/// Category id that disables category filtering.
pub const ALL_CATEGORIES: &str = "all";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
}

impl FaqEntry {
    // `needle` is already lowercase
    fn matches(&self, needle: &str) -> bool {
        self.question.to_lowercase().contains(needle) || self.answer.to_lowercase().contains(needle)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqCategory {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub entries: Vec<FaqEntry>,
}

/// Ordered categories of questions, as shown on the FAQ page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqCatalog {
    pub categories: Vec<FaqCategory>,
}

impl FaqCatalog {
    pub fn from_json(contents: &str) -> Result<Self> {
        serde_json::from_str(contents).map_err(|e| WindowLimiterError::Catalog(e.to_string()))
    }

    pub fn category(&self, id: &str) -> Option<&FaqCategory> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// Ids (`"<category>-<index>"`) of every entry matching `term`, in page
    /// order. These are the items to expand. An empty term matches nothing.
    pub fn search(&self, term: &str) -> Vec<String> {
        if term.is_empty() {
            return Vec::new();
        }
        let needle = term.to_lowercase();
        self.categories
            .iter()
            .flat_map(|category| {
                category
                    .entries
                    .iter()
                    .enumerate()
                    .filter(|(_, entry)| entry.matches(&needle))
                    .map(|(index, _)| format!("{}-{}", category.id, index))
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// Entries of one category matching `term`; all of them when `term` is empty.
    /// Each entry keeps its index in the category, the same index [`search`]
    /// puts in its ids.
    ///
    /// [`search`]: Self::search
    pub fn filter(&self, category: &str, term: &str) -> Vec<(usize, &FaqEntry)> {
        let Some(category) = self.category(category) else {
            return Vec::new();
        };
        let needle = term.to_lowercase();
        category
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| needle.is_empty() || entry.matches(&needle))
            .collect()
    }

    /// Categories to render for the active category button and search term.
    pub fn visible_categories(&self, active: &str, term: &str) -> Vec<&FaqCategory> {
        self.categories
            .iter()
            .filter(|category| active == ALL_CATEGORIES || category.id == active)
            .filter(|category| term.is_empty() || !self.filter(&category.id, term).is_empty())
            .collect()
    }
}
