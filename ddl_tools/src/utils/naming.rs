//! Naming utilities for ddl_tools
//!
//! This module provides the identifier case conventions applied when writing TQL.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Case conversion applied to identifiers in generated statements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseMode {
    /// Keep names exactly as modelled
    #[default]
    Unchanged,
    Upper,
    Lower,
    /// `my_table` becomes `MyTable`
    Camel,
}

impl FromStr for CaseMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "unchanged" | "none" => Ok(CaseMode::Unchanged),
            "upper" | "uppercase" => Ok(CaseMode::Upper),
            "lower" | "lowercase" => Ok(CaseMode::Lower),
            "camel" | "camelcase" => Ok(CaseMode::Camel),
            other => Err(Error::InvalidArgument(format!("unknown case mode: {}", other))),
        }
    }
}

impl fmt::Display for CaseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CaseMode::Unchanged => "unchanged",
            CaseMode::Upper => "upper",
            CaseMode::Lower => "lower",
            CaseMode::Camel => "camel",
        };
        f.write_str(name)
    }
}

/// Convert names of the form `xxx_yyy` to `XxxYyy`
///
/// Leading and trailing underscores are stripped, the first character is upper-cased, and every
/// underscore is dropped with the character following it upper-cased.
pub fn to_camel(name: &str) -> String {
    let trimmed = name.trim_matches('_');
    let mut result = String::with_capacity(trimmed.len());
    let mut chars = trimmed.chars();

    match chars.next() {
        Some(first) => result.extend(first.to_uppercase()),
        None => return result,
    }

    while let Some(c) = chars.next() {
        if c == '_' {
            if let Some(next) = chars.next() {
                result.extend(next.to_uppercase());
            }
        } else {
            result.push(c);
        }
    }

    result
}

/// Apply a case mode to an identifier
///
/// The default schema name is a fixed engine identifier and is never converted.
pub fn apply_case(name: &str, mode: CaseMode, default_schema: &str) -> String {
    if name == default_schema {
        return name.to_string();
    }

    match mode {
        CaseMode::Unchanged => name.to_string(),
        CaseMode::Upper => name.to_uppercase(),
        CaseMode::Lower => name.to_lowercase(),
        CaseMode::Camel => to_camel(name),
    }
}

/// Wrap an identifier in double quotes
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name)
}

/// Render a list of identifiers as `"a", "b"`
pub fn quote_list<S: AsRef<str>>(names: &[S]) -> String {
    names
        .iter()
        .map(|name| quote_identifier(name.as_ref()))
        .collect::<Vec<_>>()
        .join(", ")
}
