//! Schema module for ddl_tools
//!
//! This module holds the schema model and everything that reads, checks, writes and compares it.

pub mod diff;
pub mod generator;
pub mod parser;
pub mod types;
pub mod validator;

// Re-export key types
pub use diff::{compare_databases, Difference, DifferenceKind, SchemaDiff, TableRef};
pub use generator::StatementGenerator;
pub use parser::{convert_type, DdlParser};
pub use types::{
    Column, Database, ForeignKey, GenericRelationship, KeyColumns, ShardKey, Table,
    DEFAULT_SCHEMA,
};
pub use validator::{DatabaseValidator, Severity, ValidationIssue, ValidationResult};
