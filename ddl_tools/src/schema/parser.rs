//! DDL parsing
//!
//! This module reads `CREATE TABLE` statements written for other databases and builds a
//! [`Database`] from them. Parsing is best effort: anything that is not a recognisable column
//! is skipped, and unknown source types become `UNKNOWN`. Run the validator on the result.
//!
//! Statement boundaries are found by counting parentheses, so string literals containing
//! parentheses will confuse the scanner. Several statements may share a line.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::error::Result;
use crate::schema::types::{Column, Database, Table, DEFAULT_SCHEMA};

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").unwrap());
static NON_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^0-9]").unwrap());
static CREATE_TABLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)create\s+(?:or\s+replace\s+)?table").unwrap());

const QUOTE_CHARS: [char; 3] = ['"', '\'', '`'];

/// Parser for foreign `CREATE TABLE` DDL
#[derive(Debug, Clone)]
pub struct DdlParser {
    database_name: String,
    schema_name: String,
}

impl DdlParser {
    /// Create a parser that places every table in `schema_name` of `database_name`
    pub fn new(database_name: impl Into<String>, schema_name: impl Into<String>) -> Self {
        Self {
            database_name: database_name.into(),
            schema_name: schema_name.into(),
        }
    }

    /// Create a parser that places every table in the default schema
    pub fn with_default_schema(database_name: impl Into<String>) -> Self {
        Self::new(database_name, DEFAULT_SCHEMA)
    }

    pub fn database_name(&self) -> &str {
        &self.database_name
    }

    pub fn schema_name(&self) -> &str {
        &self.schema_name
    }

    /// Parse an already materialized sequence of lines
    pub fn parse_lines<I, S>(&self, lines: I) -> Result<Database>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut database = Database::new(self.database_name.clone())?;

        for statement in extract_statements(lines) {
            debug!(statement = %statement, "Parsing statement");
            if let Some(table) = self.parse_create_table(&statement) {
                database.add_table(table);
            }
        }

        Ok(database)
    }

    /// Parse DDL held in memory
    pub fn parse_str(&self, ddl: &str) -> Result<Database> {
        self.parse_lines(ddl.lines())
    }

    /// Parse DDL from a reader, line by line
    pub fn parse_reader<R: BufRead>(&self, reader: R) -> Result<Database> {
        let lines = reader.lines().collect::<std::io::Result<Vec<String>>>()?;
        self.parse_lines(lines)
    }

    /// Parse DDL from a file
    pub fn parse_file<P: AsRef<Path>>(&self, path: P) -> Result<Database> {
        let file = File::open(path.as_ref())?;
        self.parse_reader(BufReader::new(file))
    }

    /// Parse a single `CREATE TABLE` statement
    ///
    /// Returns `None` when no table name can be found. Inline key declarations are skipped, so
    /// the table never carries a primary key or shard key.
    pub fn parse_create_table(&self, statement: &str) -> Option<Table> {
        let statement = statement.replace('[', "\"").replace(']', "\"");
        let open = statement.find('(')?;

        let table_name = table_name(&statement[..open])?;
        let mut table = match Table::in_schema(table_name.clone(), self.schema_name.clone()) {
            Ok(table) => table,
            Err(e) => {
                warn!(table = %table_name, error = %e, "Skipping table");
                return None;
            }
        };

        let body = match statement.rfind(')') {
            Some(close) if close > open => &statement[open + 1..close],
            _ => "",
        };

        for field in split_fields(body) {
            if field.to_lowercase().contains("key ") {
                debug!(table = %table_name, field = %field, "Skipping key declaration");
                continue;
            }

            let (name, raw_type) = split_column(field);
            match Column::new(name, convert_type(raw_type)) {
                Ok(column) => table.add_column(column),
                Err(e) => warn!(table = %table_name, field = %field, error = %e, "Skipping column"),
            }
        }

        Some(table)
    }
}

/// Trim a line and collapse runs of spaces and tabs
fn clean_line(line: &str) -> String {
    WHITESPACE_RUN.replace_all(line.trim(), " ").into_owned()
}

/// Removes `--` and `/* */` comments, tracking block comments across lines
#[derive(Debug, Default)]
struct CommentStripper {
    in_block: bool,
}

impl CommentStripper {
    fn strip(&mut self, line: &str) -> String {
        let mut kept = String::with_capacity(line.len());
        let mut rest = line;

        loop {
            if self.in_block {
                match rest.find("*/") {
                    Some(end) => {
                        self.in_block = false;
                        rest = &rest[end + 2..];
                    }
                    None => return kept,
                }
                continue;
            }

            match (rest.find("--"), rest.find("/*")) {
                (Some(dashes), block) if block.map_or(true, |block| dashes < block) => {
                    kept.push_str(&rest[..dashes]);
                    return kept;
                }
                (_, Some(block)) => {
                    kept.push_str(&rest[..block]);
                    kept.push(' ');
                    self.in_block = true;
                    rest = &rest[block + 2..];
                }
                _ => {
                    kept.push_str(rest);
                    return kept;
                }
            }
        }
    }
}

/// Group lines into `CREATE TABLE` statements
///
/// A statement starts at `create table` or `create or replace table` (any case) and ends at the
/// first character where it has opened at least one parenthesis and closed as many as it
/// opened. Comments, blank lines, `GO` separators and anything outside a statement are ignored.
fn extract_statements<I, S>(lines: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut statements = Vec::new();
    let mut comments = CommentStripper::default();
    let mut buffer = String::new();
    let mut in_statement = false;
    let (mut opened, mut closed) = (0usize, 0usize);

    for line in lines {
        let line = clean_line(&comments.strip(line.as_ref()));
        if line.is_empty() || line.eq_ignore_ascii_case("go") {
            continue;
        }

        let mut rest = line.as_str();
        while !rest.is_empty() {
            if !in_statement {
                match CREATE_TABLE.find(rest) {
                    Some(found) => {
                        rest = &rest[found.start()..];
                        in_statement = true;
                    }
                    None => break,
                }
            } else if !buffer.is_empty() {
                buffer.push(' ');
            }

            let mut end = None;
            for (idx, c) in rest.char_indices() {
                match c {
                    '(' => opened += 1,
                    ')' => closed += 1,
                    _ => continue,
                }
                if opened > 0 && opened == closed {
                    end = Some(idx + 1);
                    break;
                }
            }

            match end {
                Some(end) => {
                    buffer.push_str(&rest[..end]);
                    statements.push(std::mem::take(&mut buffer));
                    in_statement = false;
                    (opened, closed) = (0, 0);
                    rest = &rest[end..];
                }
                None => {
                    buffer.push_str(rest);
                    break;
                }
            }
        }
    }

    if in_statement {
        debug!(statement = %buffer, "Discarding unterminated statement");
    }

    statements
}

/// The last dotted part of the last word before the column list, unquoted
fn table_name(prefix: &str) -> Option<String> {
    let last_word = prefix.trim_end().rsplit(' ').next()?;
    let unqualified = last_word.rsplit('.').next()?;
    let name: String = unqualified
        .chars()
        .filter(|c| !QUOTE_CHARS.contains(c))
        .collect();

    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Split a column list on commas that are not inside parentheses
fn split_fields(body: &str) -> Vec<&str> {
    let mut fields = Vec::new();
    let mut depth: usize = 0;
    let mut start = 0;

    for (idx, c) in body.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                fields.push(body[start..idx].trim());
                start = idx + 1;
            }
            _ => {}
        }
    }
    fields.push(body[start..].trim());

    fields.retain(|field| !field.is_empty());
    fields
}

/// Split a column definition into its name and raw type token
fn split_column(field: &str) -> (&str, &str) {
    let (name, rest) = match field.chars().next() {
        Some(quote) if QUOTE_CHARS.contains(&quote) => {
            let inner = &field[1..];
            match inner.find(quote) {
                Some(end) => (&inner[..end], &inner[end + 1..]),
                None => (inner, ""),
            }
        }
        _ => match field.find(' ') {
            Some(space) => (&field[..space], &field[space + 1..]),
            None => (field, ""),
        },
    };

    let rest = rest.trim_start();
    let type_token = match rest.find(')') {
        Some(close) => &rest[..=close],
        None => {
            let end = [rest.find(' '), rest.find(',')]
                .into_iter()
                .flatten()
                .min()
                .unwrap_or(rest.len());
            &rest[..end]
        }
    };

    (name, type_token)
}

/// Map a source database type onto the target type vocabulary
///
/// Matching is by substring and the first rule that matches wins, so `datetime` is checked
/// before `time` and `date`.
pub fn convert_type(data_type: &str) -> String {
    let truncated = match (data_type.find(')'), data_type.find(' ')) {
        (Some(close), _) => &data_type[..=close],
        (None, Some(space)) => &data_type[..space],
        (None, None) => data_type,
    };
    let t = truncated.to_lowercase();
    let has = |needle: &str| t.contains(needle);

    let converted = if has("int") {
        "BIGINT"
    } else if has("rowversion") {
        "INT"
    } else if has("uniqueidentifier") {
        "VARCHAR(0)"
    } else if has("serial") {
        "INT"
    } else if has("bit") {
        "BOOL"
    } else if has("blob") || has("binary") {
        "UNKNOWN"
    } else if has("number") {
        number_type(&t)
    } else if ["decimal", "numeric", "float", "double", "money", "real"]
        .into_iter()
        .any(|n| has(n))
    {
        "DOUBLE"
    } else if has("datetime") || has("timestamp") {
        "DATETIME"
    } else if has("time") {
        "TIME"
    } else if has("date") {
        "DATE"
    } else if has("bool") {
        "BOOL"
    } else if has("text") {
        "VARCHAR(0)"
    } else if has("char") {
        return format!("VARCHAR({})", varchar_size(&t));
    } else {
        "UNKNOWN"
    };

    converted.to_string()
}

/// `number(p,s)` maps by precision and scale
fn number_type(t: &str) -> &'static str {
    let Some(args) = type_argument(t) else {
        return "BIGINT";
    };

    match args.split_once(',') {
        Some((precision, scale)) if scale.trim() == "0" => {
            match precision.trim().parse::<u32>() {
                Ok(digits) if digits <= 9 => "INT",
                // `*` and anything unparseable count as wide
                _ => "BIGINT",
            }
        }
        Some(_) => "DOUBLE",
        None => "INT",
    }
}

fn varchar_size(t: &str) -> u32 {
    type_argument(t)
        .map(|args| NON_DIGITS.replace_all(args, "").into_owned())
        .and_then(|digits| digits.parse().ok())
        .unwrap_or(0)
}

/// Text between the first `(` and the following `)`
fn type_argument(t: &str) -> Option<&str> {
    let open = t.find('(')?;
    let close = t[open..].find(')')? + open;
    Some(&t[open + 1..close])
}
