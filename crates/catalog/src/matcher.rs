//! Keyword matcher
//!
//! Linear scan over the catalog. A product matches when any keyword is a
//! case-insensitive substring of its searchable text. Results keep catalog
//! order and stop at the configured limit; there is no ranking, stemming or
//! de-duplication of overlapping hits.

use dog_assistant_core::ProductRecord;

use crate::Catalog;

/// Matcher configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchConfig {
    /// Search descriptions as well as name and categories
    pub include_description: bool,
    /// Maximum number of products returned
    pub max_results: usize,
}

impl MatchConfig {
    /// Name and categories only, up to 3 products
    pub const fn compact() -> Self {
        Self {
            include_description: false,
            max_results: 3,
        }
    }

    /// Name, categories and description, up to 5 products
    pub const fn detailed() -> Self {
        Self {
            include_description: true,
            max_results: 5,
        }
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self::detailed()
    }
}

/// Substring keyword matcher over a [`Catalog`]
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordMatcher {
    config: MatchConfig,
}

impl KeywordMatcher {
    pub fn new(config: MatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Lowercased text a product is matched against
    pub fn haystack(&self, product: &ProductRecord) -> String {
        let mut text = String::with_capacity(
            product.name.len() + product.description.len() + 16 * product.categories.len(),
        );
        text.push_str(&product.name);
        text.push(' ');
        text.push_str(&product.categories.join(" "));
        if self.config.include_description {
            text.push(' ');
            text.push_str(&product.description);
        }
        text.to_lowercase()
    }

    /// Products matching any keyword, in catalog order
    pub fn find_matches<'c, S: AsRef<str>>(
        &self,
        keywords: &[S],
        catalog: &'c Catalog,
    ) -> Vec<&'c ProductRecord> {
        let needles: Vec<String> = keywords
            .iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();

        if needles.is_empty() || self.config.max_results == 0 {
            return Vec::new();
        }

        let mut matches = Vec::new();
        for product in catalog {
            let haystack = self.haystack(product);
            if needles.iter().any(|needle| haystack.contains(needle.as_str())) {
                tracing::debug!(product = %product.name, "Matched product");
                matches.push(product);
                if matches.len() == self.config.max_results {
                    break;
                }
            }
        }

        tracing::debug!(
            keywords = ?needles,
            matched = matches.len(),
            "Keyword matching complete"
        );

        matches
    }
}
