// src/bridge/params.rs

//! Typed access to a command's query parameters.

use crate::error::ParseError;
use crate::orientation::MraidOrientation;
use std::collections::BTreeMap;
use url::Url;

/// The decoded `key=value` pairs of a command URL. Later duplicates win.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    values: BTreeMap<String, String>,
}

impl Params {
    pub fn from_url(url: &Url) -> Self {
        Params {
            values: url.query_pairs().into_owned().collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    fn required(&self, name: &'static str) -> Result<&str, ParseError> {
        self.get(name).ok_or(ParseError::MissingParameter(name))
    }

    /// A plain decimal integer within `min..=max`. Fractions, exponents and
    /// surrounding whitespace are rejected.
    pub fn int_in_range(&self, name: &'static str, min: i64, max: i64) -> Result<i32, ParseError> {
        let raw = self.required(name)?;
        let value = raw
            .parse::<i64>()
            .map_err(|_| ParseError::InvalidNumber(raw.to_string()))?;

        if value < min || value > max {
            return Err(ParseError::OutOfRange(value));
        }
        i32::try_from(value).map_err(|_| ParseError::OutOfRange(value))
    }

    pub fn boolean(&self, name: &'static str) -> Result<bool, ParseError> {
        parse_boolean(self.required(name)?)
    }

    pub fn boolean_or(&self, name: &'static str, default: bool) -> Result<bool, ParseError> {
        self.get(name).map_or(Ok(default), parse_boolean)
    }

    pub fn orientation(&self, name: &'static str) -> Result<MraidOrientation, ParseError> {
        MraidOrientation::from_protocol(self.required(name)?)
    }

    /// The raw parameter text, once it has been checked to be a valid URL.
    pub fn url(&self, name: &'static str) -> Result<String, ParseError> {
        checked_url(self.required(name)?)
    }

    pub fn optional_url(&self, name: &'static str) -> Result<Option<String>, ParseError> {
        self.get(name).map(checked_url).transpose()
    }
}

fn parse_boolean(text: &str) -> Result<bool, ParseError> {
    match text {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(ParseError::InvalidBoolean(other.to_string())),
    }
}

fn checked_url(text: &str) -> Result<String, ParseError> {
    Url::parse(text)
        .map(|_| text.to_string())
        .map_err(|_| ParseError::InvalidUrlParameter(text.to_string()))
}
