//! ddl_tools: convert, validate and diff TQL schemas
//!
//! ddl_tools reads `CREATE TABLE` DDL written for other databases, models it as a
//! [`Database`], checks the model for problems that would stop it loading, writes it back out
//! as TQL, and computes the ALTER statements that reconcile two versions of a schema.

pub mod config;
pub mod error;
pub mod schema;
pub mod utils;

use std::path::Path;

// Re-export main types for easier access
pub use config::Config;
pub use error::{Error, Result};
pub use schema::diff::{compare_databases, Difference, DifferenceKind, SchemaDiff};
pub use schema::generator::StatementGenerator;
pub use schema::parser::DdlParser;
pub use schema::types::{Column, Database, ForeignKey, GenericRelationship, ShardKey, Table};
pub use schema::validator::{Severity, ValidationResult};
pub use utils::naming::CaseMode;

/// Initialize ddl_tools with the specified configuration file
pub fn init<P: AsRef<Path>>(config_path: P) -> Result<DdlToolsClient> {
    let config = config::load_from_file(config_path)?;
    Ok(DdlToolsClient::new(config))
}

/// The main client for working with ddl_tools
///
/// Bundles a parser and a statement generator set up from one configuration.
pub struct DdlToolsClient {
    config: Config,
    parser: DdlParser,
    generator: StatementGenerator,
}

impl DdlToolsClient {
    /// Create a new client from configuration
    pub fn new(config: Config) -> Self {
        let parser = DdlParser::new(config.database.name.clone(), config.database.schema.clone());
        let generator = StatementGenerator::new(config.output.case)
            .with_default_schema(config.database.default_schema.clone());

        Self {
            config,
            parser,
            generator,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn parser(&self) -> &DdlParser {
        &self.parser
    }

    pub fn generator(&self) -> &StatementGenerator {
        &self.generator
    }

    /// Parse a DDL file into a database
    pub fn parse_file<P: AsRef<Path>>(&self, path: P) -> Result<Database> {
        let path = path.as_ref();
        tracing::info!(path = %path.display(), "Parsing DDL file");
        self.parser.parse_file(path)
    }

    /// Parse DDL text into a database
    pub fn parse_str(&self, ddl: &str) -> Result<Database> {
        self.parser.parse_str(ddl)
    }

    /// Render a database as a TQL script
    pub fn to_tql(&self, database: &Database) -> String {
        self.generator
            .generate_database(database, self.config.output.create_database)
    }

    /// Validate a database, logging a summary
    pub fn validate(&self, database: &Database) -> ValidationResult {
        let result = database.validate();
        if result.is_valid() {
            tracing::info!(database = %database.database_name(), "Database is valid");
        } else {
            tracing::warn!(
                database = %database.database_name(),
                issues = result.issues().len(),
                "Database has validation issues"
            );
        }
        result
    }

    /// Compare two databases
    pub fn compare(&self, first: &Database, second: &Database) -> SchemaDiff {
        let diff = SchemaDiff::generate(first, second);
        tracing::info!(
            first = diff.first.len(),
            second = diff.second.len(),
            "Compared databases"
        );
        diff
    }

    /// Render a list of differences as ALTER statements
    pub fn render_alters(&self, differences: &[Difference]) -> String {
        differences
            .iter()
            .map(|difference| difference.render(&self.generator))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_uses_configured_names() {
        let config = config::from_toml(
            r#"
            [database]
            name = "warehouse"
            schema = "staging"

            [output]
            case = "upper"
            "#,
        )
        .unwrap();
        let client = DdlToolsClient::new(config);

        let db = client
            .parse_str("create table orders (order_id int);")
            .unwrap();
        assert_eq!(db.database_name(), "warehouse");
        assert_eq!(db.get_table("orders").unwrap().schema_name(), "staging");

        let tql = client.to_tql(&db);
        assert!(tql.starts_with("USE \"WAREHOUSE\";\n"));
        assert!(tql.contains("CREATE TABLE \"STAGING\".\"ORDERS\" (\n    \"ORDER_ID\" BIGINT\n);\n"));
    }

    #[test]
    fn test_client_render_alters() {
        let client = DdlToolsClient::new(Config::default());
        let db1 = client.parse_str("create table t (a int);").unwrap();
        let db2 = client.parse_str("create table t (a int, b date);").unwrap();

        let diff = client.compare(&db1, &db2);
        assert_eq!(
            client.render_alters(&diff.first),
            "ALTER TABLE \"falcon_default_schema\".\"t\" ADD COLUMN \"b\" DATE DEFAULT 0;\n"
        );
        assert!(client.validate(&db2).is_valid());
    }
}
