// src/registrations/age.rs
//! Age calculation from a birth date.
//!
//! Input arrives loosely shaped from the boundary, so it is modelled as a
//! tagged union and checked in a fixed order before any date arithmetic runs.

use chrono::{DateTime, Datelike, NaiveDate};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AgeError {
    #[error("missing param p")]
    MissingParameter,

    #[error("param p must be an object")]
    NotAnObject,

    #[error("missing param p.birth")]
    MissingBirth,

    #[error("p.birth must be a Date object")]
    BirthNotADate,

    #[error("p.birth is an invalid Date")]
    InvalidDate,
}

/// A date-typed value that may not hold a real calendar date,
/// e.g. one built from an unparsable string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateValue {
    Valid(NaiveDate),
    Invalid,
}

impl DateValue {
    /// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp.
    ///
    /// A timestamp keeps the calendar date written in it, in its own offset.
    /// It is never shifted to the server's local zone or to UTC, so
    /// `1990-01-01T23:30:00-05:00` is born on January 1st wherever the
    /// service runs.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return DateValue::Valid(date);
        }
        match DateTime::parse_from_rfc3339(raw) {
            Ok(ts) => DateValue::Valid(ts.date_naive()),
            Err(_) => DateValue::Invalid,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            DateValue::Valid(date) => Some(*date),
            DateValue::Invalid => None,
        }
    }
}

impl From<NaiveDate> for DateValue {
    fn from(date: NaiveDate) -> Self {
        DateValue::Valid(date)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BirthField {
    Date(DateValue),
    Raw(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Person {
    pub birth: Option<BirthField>,
}

impl Person {
    pub fn born(birth: impl Into<DateValue>) -> Self {
        Self {
            birth: Some(BirthField::Date(birth.into())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgeParam {
    Record(Person),
    Scalar(String),
}

/// Returns the age in whole years on `today`.
///
/// A birth date after `today` yields a negative age; rejecting those is left
/// to the caller's age policy.
pub fn calculate_age(p: Option<&AgeParam>, today: NaiveDate) -> Result<i32, AgeError> {
    let person = match p {
        None => return Err(AgeError::MissingParameter),
        Some(AgeParam::Scalar(_)) => return Err(AgeError::NotAnObject),
        Some(AgeParam::Record(person)) => person,
    };

    let birth = match &person.birth {
        None => return Err(AgeError::MissingBirth),
        Some(BirthField::Raw(_)) => return Err(AgeError::BirthNotADate),
        Some(BirthField::Date(value)) => value.as_date().ok_or(AgeError::InvalidDate)?,
    };

    Ok(years_between(birth, today))
}

fn years_between(birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age
}
