//! Free-text search term.

use crate::shared::validation::FieldErrors;

pub const MIN_SEARCH_LENGTH: usize = 2;

/// A trimmed, lowercased search term of at least two characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm(String);

impl SearchTerm {
    /// Parse the `search` query parameter. Blank input means "no search".
    pub fn parse(raw: Option<&str>, errors: &mut FieldErrors) -> Option<Self> {
        let trimmed = raw.map(str::trim).filter(|s| !s.is_empty())?;
        if trimmed.chars().count() < MIN_SEARCH_LENGTH {
            errors.add(
                "search",
                format!("search must be at least {} characters", MIN_SEARCH_LENGTH),
                trimmed,
            );
            return None;
        }
        Some(Self(trimmed.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive substring match against any of the given fields.
    pub fn matches_any<'a>(&self, fields: impl IntoIterator<Item = Option<&'a str>>) -> bool {
        fields
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&self.0))
    }

    /// `%term%` with LIKE metacharacters escaped, for `ILIKE ... ESCAPE '\'`.
    pub fn like_pattern(&self) -> String {
        let mut pattern = String::with_capacity(self.0.len() + 2);
        pattern.push('%');
        for c in self.0.chars() {
            if matches!(c, '%' | '_' | '\\') {
                pattern.push('\\');
            }
            pattern.push(c);
        }
        pattern.push('%');
        pattern
    }
}
