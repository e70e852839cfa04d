//! Schema validation
//!
//! This module checks a database for the consistency problems that would stop it loading into
//! the target engine. The validator never fails; it collects issues for the caller to act on.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::schema::types::{Database, ForeignKey, Table};

/// How serious a validation issue is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Info => "Information",
            Severity::Warning => "Warning",
            Severity::Error => "Error",
        };
        f.write_str(label)
    }
}

/// A single issue found during validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub message: String,
    pub severity: Severity,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)
    }
}

/// Outcome of validating a database
///
/// Any recorded issue marks the result invalid, whatever its severity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    is_valid: bool,
    issues: Vec<ValidationIssue>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            is_valid: true,
            issues: Vec::new(),
        }
    }

    pub fn add_issue(&mut self, message: impl Into<String>, severity: Severity) {
        self.is_valid = false;
        self.issues.push(ValidationIssue {
            message: message.into(),
            severity,
        });
    }

    pub fn add_error(&mut self, message: impl Into<String>) {
        self.add_issue(message, Severity::Error);
    }

    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.add_issue(message, Severity::Warning);
    }

    pub fn add_info(&mut self, message: impl Into<String>) {
        self.add_issue(message, Severity::Info);
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    /// Issues of at least the given severity
    pub fn issues_at_least(&self, severity: Severity) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(move |issue| issue.severity >= severity)
    }
}

/// Validates databases for consistency
pub struct DatabaseValidator<'a> {
    database: &'a Database,
    result: ValidationResult,
}

impl<'a> DatabaseValidator<'a> {
    pub fn new(database: &'a Database) -> Self {
        Self {
            database,
            result: ValidationResult::new(),
        }
    }

    /// Run every check against every table
    pub fn validate(mut self) -> ValidationResult {
        for table in self.database.tables() {
            self.check_column_types(table);
            self.check_primary_key(table);
            self.check_shard_key(table);
            self.check_foreign_keys(table);
            self.check_relationships(table);
        }

        self.result
    }

    fn report(&mut self, table: &Table, issue: String, severity: Severity) {
        let message = format!(
            "database {}, table {}:  {}",
            self.database.database_name(),
            table.table_name(),
            issue
        );
        debug!(severity = %severity, "{}", message);
        self.result.add_issue(message, severity);
    }

    fn check_column_types(&mut self, table: &Table) {
        for column in table.columns() {
            if column.column_type() == "UNKNOWN" {
                self.report(
                    table,
                    format!("column {} is of type UNKNOWN.", column.name()),
                    Severity::Warning,
                );
            }
        }
    }

    fn check_primary_key(&mut self, table: &Table) {
        for key in table.primary_key() {
            if !table.has_column(key) {
                self.report(
                    table,
                    format!("column {} in primary key does not exist in the table.", key),
                    Severity::Error,
                );
            }
        }
    }

    fn check_shard_key(&mut self, table: &Table) {
        let Some(shard_key) = table.shard_key() else {
            return;
        };
        let primary_key = table.primary_key();

        for column in shard_key.columns() {
            if !table.has_column(column) {
                self.report(
                    table,
                    format!("column {} in shard key does not exist in the table.", column),
                    Severity::Error,
                );
            }

            if !primary_key.is_empty() && !primary_key.contains(column) {
                self.report(
                    table,
                    format!(
                        "column {} in shard key not in primary key {:?}",
                        column, primary_key
                    ),
                    Severity::Error,
                );
            }
        }
    }

    fn check_foreign_keys(&mut self, table: &Table) {
        for foreign_key in table.foreign_keys() {
            match self.database.get_table(foreign_key.to_table()) {
                Some(to_table) => self.check_foreign_key(table, foreign_key, to_table),
                None => self.report(
                    table,
                    format!(
                        "table {} doesn't exist for foreign key {}",
                        foreign_key.to_table(),
                        foreign_key.name()
                    ),
                    Severity::Error,
                ),
            }
        }
    }

    fn check_foreign_key(&mut self, table: &Table, foreign_key: &ForeignKey, to_table: &Table) {
        let name = foreign_key.name();
        let from_keys = foreign_key.from_keys();
        let to_keys = foreign_key.to_keys();
        let to_primary_key = to_table.primary_key();

        if from_keys.len() != to_keys.len() {
            self.report(
                table,
                format!(
                    "FK {} doesn't have the matching column count from and to keys",
                    name
                ),
                Severity::Error,
            );
        }

        if to_keys.len() != to_primary_key.len() {
            self.report(
                table,
                format!(
                    "FK {} doesn't match number of columns in primary key {:?}",
                    name, to_primary_key
                ),
                Severity::Error,
            );
        }

        for (from_name, to_name) in from_keys.iter().zip(to_keys) {
            if !to_primary_key.contains(to_name) {
                self.report(
                    table,
                    format!(
                        "foreign key {} column {} isn't in primary key for {}",
                        name,
                        to_name,
                        to_table.table_name()
                    ),
                    Severity::Error,
                );
            }

            let from_column = table.get_column(from_name);
            let to_column = to_table.get_column(to_name);

            if from_column.is_none() {
                self.report(
                    table,
                    format!(
                        "foreign key {} missing from_column {} from table {}",
                        name,
                        from_name,
                        table.table_name()
                    ),
                    Severity::Error,
                );
            }
            if to_column.is_none() {
                self.report(
                    table,
                    format!(
                        "foreign key {} missing to_column {} from table {}",
                        name,
                        to_name,
                        to_table.table_name()
                    ),
                    Severity::Error,
                );
            }

            if let (Some(from_column), Some(to_column)) = (from_column, to_column) {
                let compatible = match (from_column.is_varchar(), to_column.is_varchar()) {
                    (true, true) => true,
                    (false, false) => from_column.column_type() == to_column.column_type(),
                    _ => false,
                };

                if !compatible {
                    self.report(
                        table,
                        format!(
                            "foreign key {} column {} type {} doesn't match type {} for {} column {}",
                            name,
                            from_column.name(),
                            from_column.column_type(),
                            to_column.column_type(),
                            to_table.table_name(),
                            to_column.name()
                        ),
                        Severity::Error,
                    );
                }
            }
        }
    }

    fn check_relationships(&mut self, table: &Table) {
        for relationship in table.relationships() {
            if relationship.from_table() != table.table_name() {
                self.report(
                    table,
                    format!(
                        "relationship {} from table {} doesn't match table",
                        relationship.name(),
                        relationship.from_table()
                    ),
                    Severity::Error,
                );
            }

            if self.database.get_table(relationship.to_table()).is_none() {
                self.report(
                    table,
                    format!(
                        "table {} doesn't exist for relationship {}",
                        relationship.to_table(),
                        relationship.name()
                    ),
                    Severity::Error,
                );
            }
        }
    }
}
