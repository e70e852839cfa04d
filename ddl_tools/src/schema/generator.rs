//! TQL statement generation
//!
//! This module renders schema objects as TQL statements. Every statement ends with a newline,
//! every identifier is double quoted, and the configured case mode is applied to every
//! identifier except the default schema name.

use tracing::debug;

use crate::schema::types::{
    Column, Database, ForeignKey, GenericRelationship, ShardKey, Table, DEFAULT_SCHEMA,
};
use crate::utils::naming::{apply_case, quote_identifier, quote_list, CaseMode};

/// Generator for TQL statements
#[derive(Debug, Clone)]
pub struct StatementGenerator {
    case_mode: CaseMode,
    default_schema: String,
}

impl Default for StatementGenerator {
    fn default() -> Self {
        Self::new(CaseMode::Unchanged)
    }
}

impl StatementGenerator {
    /// Create a new statement generator
    pub fn new(case_mode: CaseMode) -> Self {
        Self {
            case_mode,
            default_schema: DEFAULT_SCHEMA.to_string(),
        }
    }

    /// Use a different schema name as the one exempt from case conversion
    pub fn with_default_schema(mut self, default_schema: impl Into<String>) -> Self {
        self.default_schema = default_schema.into();
        self
    }

    pub fn case_mode(&self) -> CaseMode {
        self.case_mode
    }

    fn quoted(&self, name: &str) -> String {
        quote_identifier(&apply_case(name, self.case_mode, &self.default_schema))
    }

    fn quoted_list(&self, names: &[String]) -> String {
        let names: Vec<String> = names
            .iter()
            .map(|name| apply_case(name, self.case_mode, &self.default_schema))
            .collect();
        quote_list(&names)
    }

    fn qualified(&self, schema_name: &str, table_name: &str) -> String {
        format!("{}.{}", self.quoted(schema_name), self.quoted(table_name))
    }

    fn alter(&self, schema_name: &str, table_name: &str, action: &str) -> String {
        format!(
            "ALTER TABLE {} {};\n",
            self.qualified(schema_name, table_name),
            action
        )
    }

    pub fn create_database_statement(&self, database_name: &str) -> String {
        format!("CREATE DATABASE {};\n", self.quoted(database_name))
    }

    pub fn use_database_statement(&self, database_name: &str) -> String {
        format!("USE {};\n", self.quoted(database_name))
    }

    pub fn create_schema_statement(&self, schema_name: &str) -> String {
        format!("CREATE SCHEMA {};\n", self.quoted(schema_name))
    }

    /// Render a full `CREATE TABLE` with columns, primary key and partitioning
    pub fn create_table(&self, table: &Table) -> String {
        let mut lines: Vec<String> = table
            .columns()
            .map(|column| format!("{} {}", self.quoted(column.name()), column.column_type()))
            .collect();

        if !table.primary_key().is_empty() {
            lines.push(format!(
                "CONSTRAINT PRIMARY KEY ({})",
                self.quoted_list(table.primary_key())
            ));
        }

        let mut statement = format!(
            "CREATE TABLE {} (\n",
            self.qualified(table.schema_name(), table.table_name())
        );
        for (idx, line) in lines.iter().enumerate() {
            let lead = if idx == 0 { "    " } else { "   ," };
            statement.push_str(lead);
            statement.push_str(line);
            statement.push('\n');
        }

        match table.shard_key() {
            Some(shard_key) => statement.push_str(&format!(
                ") PARTITION BY HASH({}) KEY({});\n",
                shard_key.number_shards(),
                self.quoted_list(shard_key.columns())
            )),
            None => statement.push_str(");\n"),
        }

        statement
    }

    pub fn drop_table(&self, schema_name: &str, table_name: &str) -> String {
        format!("DROP TABLE {};\n", self.qualified(schema_name, table_name))
    }

    pub fn add_primary_key(
        &self,
        schema_name: &str,
        table_name: &str,
        primary_key: &[String],
    ) -> String {
        self.alter(
            schema_name,
            table_name,
            &format!("ADD CONSTRAINT PRIMARY KEY ({})", self.quoted_list(primary_key)),
        )
    }

    pub fn drop_primary_key(&self, schema_name: &str, table_name: &str) -> String {
        self.alter(schema_name, table_name, "DROP CONSTRAINT PRIMARY KEY")
    }

    /// Make the table a sharded fact table, replacing any earlier partitioning
    pub fn add_shard_key(
        &self,
        schema_name: &str,
        table_name: &str,
        shard_key: &ShardKey,
    ) -> String {
        self.alter(
            schema_name,
            table_name,
            &format!(
                "SET FACT PARTITION BY HASH ({}) KEY ({})",
                shard_key.number_shards(),
                self.quoted_list(shard_key.columns())
            ),
        )
    }

    /// Turn a sharded table back into an unsharded dimension table
    pub fn drop_shard_key(&self, schema_name: &str, table_name: &str) -> String {
        self.alter(schema_name, table_name, "SET DIMENSIONS")
    }

    pub fn add_foreign_key(
        &self,
        schema_name: &str,
        table_name: &str,
        foreign_key: &ForeignKey,
    ) -> String {
        self.alter(
            schema_name,
            table_name,
            &format!(
                "ADD CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({})",
                self.quoted(foreign_key.name()),
                self.quoted_list(foreign_key.from_keys()),
                self.quoted(foreign_key.to_table()),
                self.quoted_list(foreign_key.to_keys())
            ),
        )
    }

    /// Conditions are emitted verbatim
    pub fn add_relationship(
        &self,
        schema_name: &str,
        table_name: &str,
        relationship: &GenericRelationship,
    ) -> String {
        self.alter(
            schema_name,
            table_name,
            &format!(
                "ADD RELATIONSHIP {} WITH {} AS {}",
                self.quoted(relationship.name()),
                self.quoted(relationship.to_table()),
                relationship.conditions()
            ),
        )
    }

    /// Drop a named foreign key or relationship
    pub fn drop_constraint(
        &self,
        schema_name: &str,
        table_name: &str,
        constraint_name: &str,
    ) -> String {
        self.alter(
            schema_name,
            table_name,
            &format!("DROP CONSTRAINT {}", self.quoted(constraint_name)),
        )
    }

    /// Add a column with a default for existing rows: `''` for VARCHAR, `0` otherwise
    pub fn add_column(&self, schema_name: &str, table_name: &str, column: &Column) -> String {
        let default = if column.is_varchar() { "''" } else { "0" };
        self.alter(
            schema_name,
            table_name,
            &format!(
                "ADD COLUMN {} {} DEFAULT {}",
                self.quoted(column.name()),
                column.column_type(),
                default
            ),
        )
    }

    pub fn modify_column(&self, schema_name: &str, table_name: &str, column: &Column) -> String {
        self.alter(
            schema_name,
            table_name,
            &format!("MODIFY COLUMN {} {}", self.quoted(column.name()), column.column_type()),
        )
    }

    pub fn drop_column(&self, schema_name: &str, table_name: &str, column_name: &str) -> String {
        self.alter(
            schema_name,
            table_name,
            &format!("DROP COLUMN {}", self.quoted(column_name)),
        )
    }

    /// Render a whole database as a TQL script
    ///
    /// Each table is dropped and recreated, then foreign keys and relationships are added once
    /// every table exists. With `create_database` the script also creates the database and
    /// every schema other than the default one.
    pub fn generate_database(&self, database: &Database, create_database: bool) -> String {
        let database_name = database.database_name();
        let mut script = String::new();

        if create_database {
            script.push_str(&self.create_database_statement(database_name));
        }
        script.push_str(&self.use_database_statement(database_name));

        if create_database {
            for schema_name in database.schema_names() {
                if schema_name != self.default_schema {
                    script.push_str(&self.create_schema_statement(schema_name));
                }
            }
        }

        for table in database.tables() {
            script.push('\n');
            script.push_str(&self.drop_table(table.schema_name(), table.table_name()));
            script.push('\n');
            script.push_str(&self.create_table(table));
        }

        for table in database.tables() {
            for foreign_key in table.foreign_keys() {
                script.push_str(&self.add_foreign_key(
                    table.schema_name(),
                    table.table_name(),
                    foreign_key,
                ));
            }
        }

        for table in database.tables() {
            for relationship in table.relationships() {
                script.push_str(&self.add_relationship(
                    table.schema_name(),
                    table.table_name(),
                    relationship,
                ));
            }
        }

        debug!(
            database = %database_name,
            tables = database.number_tables(),
            "Generated database script"
        );

        script
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    fn sample_table() -> Table {
        let mut table = Table::in_schema("sales_fact", "sales").unwrap();
        table.add_column(Column::new("order_id", "BIGINT").unwrap());
        table.add_column(Column::new("region_name", "VARCHAR(20)").unwrap());
        table
    }

    #[test]
    fn test_create_table_plain() {
        let generator = StatementGenerator::default();
        assert_eq!(
            generator.create_table(&sample_table()),
            "CREATE TABLE \"sales\".\"sales_fact\" (\n    \"order_id\" BIGINT\n   ,\"region_name\" VARCHAR(20)\n);\n"
        );
    }

    #[test]
    fn test_create_table_with_keys() {
        let table = sample_table()
            .with_primary_key(["order_id", "region_name"])
            .unwrap()
            .with_shard_key(ShardKey::new("order_id", 128).unwrap());

        let generator = StatementGenerator::default();
        assert_eq!(
            generator.create_table(&table),
            concat!(
                "CREATE TABLE \"sales\".\"sales_fact\" (\n",
                "    \"order_id\" BIGINT\n",
                "   ,\"region_name\" VARCHAR(20)\n",
                "   ,CONSTRAINT PRIMARY KEY (\"order_id\", \"region_name\")\n",
                ") PARTITION BY HASH(128) KEY(\"order_id\");\n"
            )
        );
    }

    #[test]
    fn test_case_modes() {
        let table = sample_table().with_primary_key("order_id").unwrap();

        let upper = StatementGenerator::new(CaseMode::Upper);
        assert!(upper
            .create_table(&table)
            .starts_with("CREATE TABLE \"SALES\".\"SALES_FACT\" (\n    \"ORDER_ID\" BIGINT\n"));
        assert!(upper
            .create_table(&table)
            .contains("CONSTRAINT PRIMARY KEY (\"ORDER_ID\")"));

        let camel = StatementGenerator::new(CaseMode::Camel);
        assert_eq!(
            camel.drop_table("sales", "sales_fact"),
            "DROP TABLE \"Sales\".\"SalesFact\";\n"
        );
        assert_eq!(
            camel.drop_table(DEFAULT_SCHEMA, "sales_fact"),
            "DROP TABLE \"falcon_default_schema\".\"SalesFact\";\n"
        );
    }

    #[test]
    fn test_alter_statements() {
        let g = StatementGenerator::default();
        let s = DEFAULT_SCHEMA;

        assert_eq!(
            g.add_primary_key(s, "t", &["k1".to_string(), "k2".to_string()]),
            "ALTER TABLE \"falcon_default_schema\".\"t\" ADD CONSTRAINT PRIMARY KEY (\"k1\", \"k2\");\n"
        );
        assert_eq!(
            g.drop_primary_key(s, "t"),
            "ALTER TABLE \"falcon_default_schema\".\"t\" DROP CONSTRAINT PRIMARY KEY;\n"
        );
        assert_eq!(
            g.add_shard_key(s, "t", &ShardKey::new("k1", 32).unwrap()),
            "ALTER TABLE \"falcon_default_schema\".\"t\" SET FACT PARTITION BY HASH (32) KEY (\"k1\");\n"
        );
        assert_eq!(
            g.drop_shard_key(s, "t"),
            "ALTER TABLE \"falcon_default_schema\".\"t\" SET DIMENSIONS;\n"
        );
        assert_eq!(
            g.drop_constraint(s, "t", "FK_t_to_u"),
            "ALTER TABLE \"falcon_default_schema\".\"t\" DROP CONSTRAINT \"FK_t_to_u\";\n"
        );
    }

    #[test]
    fn test_constraint_statements() {
        let g = StatementGenerator::default();
        let fk = ForeignKey::new("t", "u_id", "u", "id", None).unwrap();
        assert_eq!(
            g.add_foreign_key("s", "t", &fk),
            "ALTER TABLE \"s\".\"t\" ADD CONSTRAINT \"FK_t_to_u\" FOREIGN KEY (\"u_id\") REFERENCES \"u\" (\"id\");\n"
        );

        let rel = GenericRelationship::new("t", "u", "(\"t\".\"u_id\" = \"u\".\"id\")", Some("rel")).unwrap();
        assert_eq!(
            g.add_relationship("s", "t", &rel),
            "ALTER TABLE \"s\".\"t\" ADD RELATIONSHIP \"rel\" WITH \"u\" AS (\"t\".\"u_id\" = \"u\".\"id\");\n"
        );
    }

    #[test]
    fn test_column_statements() {
        let g = StatementGenerator::default();
        let varchar = Column::new("name", "VARCHAR(10)").unwrap();
        let number = Column::new("qty", "INT").unwrap();

        assert_eq!(
            g.add_column("s", "t", &varchar),
            "ALTER TABLE \"s\".\"t\" ADD COLUMN \"name\" VARCHAR(10) DEFAULT '';\n"
        );
        assert_eq!(
            g.add_column("s", "t", &number),
            "ALTER TABLE \"s\".\"t\" ADD COLUMN \"qty\" INT DEFAULT 0;\n"
        );
        assert_eq!(
            g.modify_column("s", "t", &number),
            "ALTER TABLE \"s\".\"t\" MODIFY COLUMN \"qty\" INT;\n"
        );
        assert_eq!(
            g.drop_column("s", "t", "qty"),
            "ALTER TABLE \"s\".\"t\" DROP COLUMN \"qty\";\n"
        );
    }

    #[test]
    fn test_generate_database() {
        let mut db = Database::new("shop").unwrap();
        let mut orders = sample_table().with_primary_key("order_id").unwrap();
        orders.add_relationship_to("customers", "a = b", Some("rel")).unwrap();
        let mut customers = Table::new("customers").unwrap();
        customers.add_column(Column::new("id", "BIGINT").unwrap());
        customers.add_foreign_key_to("id", "sales_fact", "order_id", Some("fk")).unwrap();
        db.add_table(orders);
        db.add_table(customers);

        let script = StatementGenerator::default().generate_database(&db, true);
        assert_eq!(
            script,
            concat!(
                "CREATE DATABASE \"shop\";\n",
                "USE \"shop\";\n",
                "CREATE SCHEMA \"sales\";\n",
                "\n",
                "DROP TABLE \"sales\".\"sales_fact\";\n",
                "\n",
                "CREATE TABLE \"sales\".\"sales_fact\" (\n",
                "    \"order_id\" BIGINT\n",
                "   ,\"region_name\" VARCHAR(20)\n",
                "   ,CONSTRAINT PRIMARY KEY (\"order_id\")\n",
                ");\n",
                "\n",
                "DROP TABLE \"falcon_default_schema\".\"customers\";\n",
                "\n",
                "CREATE TABLE \"falcon_default_schema\".\"customers\" (\n",
                "    \"id\" BIGINT\n",
                ");\n",
                "ALTER TABLE \"falcon_default_schema\".\"customers\" ADD CONSTRAINT \"fk\" FOREIGN KEY (\"id\") REFERENCES \"sales_fact\" (\"order_id\");\n",
                "ALTER TABLE \"sales\".\"sales_fact\" ADD RELATIONSHIP \"rel\" WITH \"customers\" AS a = b;\n",
            )
        );

        let script = StatementGenerator::default().generate_database(&db, false);
        assert!(script.starts_with("USE \"shop\";\n\nDROP TABLE"));
    }
}
