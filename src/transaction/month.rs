//! The `YYYY-MM` month used to filter and summarize transactions.

use std::{fmt::Display, str::FromStr};

use serde::Serialize;

use crate::Error;

/// A calendar month written as `YYYY-MM`, e.g. `2024-02`.
///
/// Transactions are matched against a month by literal string prefix on
/// their stored `YYYY-MM-DD` date.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Month(String);

impl Month {
    /// Parse a month.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidMonthFormat] unless `month` is four digits for
    /// a year from 0001, a dash, and two digits for a month from 01 to 12.
    pub fn new(month: &str) -> Result<Self, Error> {
        let invalid = || Error::InvalidMonthFormat(month.to_owned());

        let (year, month_of_year) = month.split_once('-').ok_or_else(invalid)?;

        let is_digits = |part: &str, length: usize| {
            part.len() == length && part.bytes().all(|byte| byte.is_ascii_digit())
        };
        if !is_digits(year, 4) || !is_digits(month_of_year, 2) {
            return Err(invalid());
        }

        let year: u16 = year.parse().map_err(|_| invalid())?;
        let month_of_year: u8 = month_of_year.parse().map_err(|_| invalid())?;
        if year == 0 || time::Month::try_from(month_of_year).is_err() {
            return Err(invalid());
        }

        Ok(Self(month.to_owned()))
    }

    /// The month of `date`.
    pub fn of(date: time::Date) -> Self {
        Self(format!("{:04}-{:02}", date.year(), u8::from(date.month())))
    }
}

impl AsRef<str> for Month {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Month {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Month::new(s)
    }
}

impl Display for Month {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
