//! Core category domain types.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, transaction_type::TransactionType};

/// The longest category name, counted in characters.
pub const MAX_CATEGORY_NAME_LENGTH: usize = 50;

/// A category name between 1 and 50 characters long.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name.
    ///
    /// The name is kept exactly as given. Transactions refer to categories by
    /// name, so trimming here would break those references.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::InvalidCategoryName] if `name` is
    /// empty or longer than [MAX_CATEGORY_NAME_LENGTH] characters.
    pub fn new(name: &str) -> Result<Self, Error> {
        let length = name.chars().count();

        if (1..=MAX_CATEGORY_NAME_LENGTH).contains(&length) {
            Ok(Self(name.to_owned()))
        } else {
            Err(Error::InvalidCategoryName)
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the name is between 1 and 50 characters.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Database identifier for a category, a UUID string.
pub type CategoryId = String;

/// A label for income or expenses, e.g. "Salary" or "Food & Dining".
///
/// Categories are never modified after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: CategoryName,
    #[serde(rename = "type")]
    pub category_type: TransactionType,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Request body for creating a category.
///
/// The type is kept as a string so that a bad value produces a readable
/// error instead of a generic deserialization failure.
#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryFormData {
    pub name: String,
    #[serde(rename = "type")]
    pub category_type: String,
}
