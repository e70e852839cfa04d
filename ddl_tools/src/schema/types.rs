//! Type definitions for the schema model
//!
//! Databases own tables; tables own columns, keys and relationships. Column, foreign key and
//! relationship collections keep insertion order, since column order is part of the physical
//! table layout. Re-adding an existing name replaces the value in place.

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::schema::validator::{DatabaseValidator, ValidationResult};

/// Schema every table lands in unless told otherwise
pub const DEFAULT_SCHEMA: &str = "falcon_default_schema";

/// Column types understood by the target engine. Any type starting with `VARCHAR` is also valid.
pub const VALID_TYPES: &[&str] = &[
    "VARCHAR",
    "DOUBLE",
    "FLOAT",
    "BOOL",
    "INT",
    "BIGINT",
    "DATE",
    "DATETIME",
    "TIMESTAMP",
    "TIME",
    "UNKNOWN",
];

/// Returns true if the type is part of the target type vocabulary
pub fn is_valid_type(column_type: &str) -> bool {
    VALID_TYPES.contains(&column_type) || column_type.starts_with("VARCHAR")
}

fn require_identifier(what: &str, value: String) -> Result<String> {
    if value.trim().is_empty() {
        return Err(Error::InvalidArgument(format!("{} must not be empty", what)));
    }
    Ok(value)
}

/// One column name or an ordered list of them
///
/// Used wherever a key may be given as a single column or as several.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyColumns {
    One(String),
    Many(Vec<String>),
}

impl KeyColumns {
    /// Normalize to an ordered list
    pub fn into_vec(self) -> Vec<String> {
        match self {
            KeyColumns::One(name) => vec![name],
            KeyColumns::Many(names) => names,
        }
    }

    fn into_checked_vec(self, what: &str) -> Result<Vec<String>> {
        self.into_vec()
            .into_iter()
            .map(|name| require_identifier(what, name))
            .collect()
    }
}

impl From<&str> for KeyColumns {
    fn from(name: &str) -> Self {
        KeyColumns::One(name.to_string())
    }
}

impl From<String> for KeyColumns {
    fn from(name: String) -> Self {
        KeyColumns::One(name)
    }
}

impl From<&String> for KeyColumns {
    fn from(name: &String) -> Self {
        KeyColumns::One(name.clone())
    }
}

impl From<Vec<String>> for KeyColumns {
    fn from(names: Vec<String>) -> Self {
        KeyColumns::Many(names)
    }
}

impl From<Vec<&str>> for KeyColumns {
    fn from(names: Vec<&str>) -> Self {
        KeyColumns::Many(names.into_iter().map(str::to_string).collect())
    }
}

impl From<&[String]> for KeyColumns {
    fn from(names: &[String]) -> Self {
        KeyColumns::Many(names.to_vec())
    }
}

impl From<&[&str]> for KeyColumns {
    fn from(names: &[&str]) -> Self {
        KeyColumns::Many(names.iter().map(|name| name.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for KeyColumns {
    fn from(names: [&str; N]) -> Self {
        KeyColumns::Many(names.iter().map(|name| name.to_string()).collect())
    }
}

/// Represents a single column in a table
///
/// Columns are immutable; replace the column to change its type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    name: String,
    column_type: String,
}

impl Column {
    /// Create a new column, checking the type against the vocabulary
    pub fn new(name: impl Into<String>, column_type: impl Into<String>) -> Result<Self> {
        let name = require_identifier("column name", name.into())?;
        let column_type = column_type.into();
        if !is_valid_type(&column_type) {
            return Err(Error::InvalidColumnType(format!(
                "{} is not a valid column type for column {}",
                column_type, name
            )));
        }

        Ok(Self { name, column_type })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column_type(&self) -> &str {
        &self.column_type
    }

    pub fn is_varchar(&self) -> bool {
        self.column_type.starts_with("VARCHAR")
    }
}

/// Hash partitioning of a table across shards
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShardKey {
    columns: Vec<String>,
    number_shards: u32,
}

impl ShardKey {
    pub fn new(columns: impl Into<KeyColumns>, number_shards: u32) -> Result<Self> {
        let columns = columns.into().into_checked_vec("shard key column")?;
        if columns.is_empty() {
            return Err(Error::InvalidArgument(
                "shard key needs at least one column".to_string(),
            ));
        }
        if number_shards == 0 {
            return Err(Error::InvalidArgument(
                "number of shards must be positive".to_string(),
            ));
        }

        Ok(Self {
            columns,
            number_shards,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn number_shards(&self) -> u32 {
        self.number_shards
    }
}

/// Represents a foreign key relationship with another table
#[derive(Debug, Clone, Serialize)]
pub struct ForeignKey {
    name: String,
    from_table: String,
    from_keys: Vec<String>,
    to_table: String,
    to_keys: Vec<String>,
}

impl ForeignKey {
    /// Create a foreign key; the number of from and to keys must match
    ///
    /// Without a name the key is called `FK_<from_table>_to_<to_table>`.
    pub fn new(
        from_table: impl Into<String>,
        from_keys: impl Into<KeyColumns>,
        to_table: impl Into<String>,
        to_keys: impl Into<KeyColumns>,
        name: Option<&str>,
    ) -> Result<Self> {
        let from_table = require_identifier("foreign key from_table", from_table.into())?;
        let to_table = require_identifier("foreign key to_table", to_table.into())?;
        let from_keys = from_keys.into().into_checked_vec("foreign key from column")?;
        let to_keys = to_keys.into().into_checked_vec("foreign key to column")?;

        if from_keys.is_empty() {
            return Err(Error::InvalidArgument(format!(
                "foreign key from {} to {} has no key columns",
                from_table, to_table
            )));
        }
        if from_keys.len() != to_keys.len() {
            return Err(Error::KeyMismatch(format!(
                "foreign key from {} to {} has {} from keys and {} to keys",
                from_table,
                to_table,
                from_keys.len(),
                to_keys.len()
            )));
        }

        let name = match name {
            Some(name) => require_identifier("foreign key name", name.to_string())?,
            None => format!("FK_{}_to_{}", from_table, to_table),
        };

        Ok(Self {
            name,
            from_table,
            from_keys,
            to_table,
            to_keys,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn from_table(&self) -> &str {
        &self.from_table
    }

    pub fn from_keys(&self) -> &[String] {
        &self.from_keys
    }

    pub fn to_table(&self) -> &str {
        &self.to_table
    }

    pub fn to_keys(&self) -> &[String] {
        &self.to_keys
    }
}

fn sorted(keys: &[String]) -> Vec<&String> {
    let mut keys: Vec<&String> = keys.iter().collect();
    keys.sort();
    keys
}

/// Key column order is ignored; the key sets are compared
impl PartialEq for ForeignKey {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.from_table == other.from_table
            && self.to_table == other.to_table
            && sorted(&self.from_keys) == sorted(&other.from_keys)
            && sorted(&self.to_keys) == sorted(&other.to_keys)
    }
}

impl Eq for ForeignKey {}

/// A join between two tables expressed as a free-form TQL condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenericRelationship {
    name: String,
    from_table: String,
    to_table: String,
    conditions: String,
}

impl GenericRelationship {
    /// Without a name the relationship is called `REL_<from_table>_to_<to_table>`.
    /// Several unnamed relationships between the same two tables collide on that name.
    pub fn new(
        from_table: impl Into<String>,
        to_table: impl Into<String>,
        conditions: impl Into<String>,
        name: Option<&str>,
    ) -> Result<Self> {
        let from_table = require_identifier("relationship from_table", from_table.into())?;
        let to_table = require_identifier("relationship to_table", to_table.into())?;
        let conditions = require_identifier("relationship conditions", conditions.into())?;

        let name = match name {
            Some(name) => require_identifier("relationship name", name.to_string())?,
            None => format!("REL_{}_to_{}", from_table, to_table),
        };

        Ok(Self {
            name,
            from_table,
            to_table,
            conditions,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn from_table(&self) -> &str {
        &self.from_table
    }

    pub fn to_table(&self) -> &str {
        &self.to_table
    }

    pub fn conditions(&self) -> &str {
        &self.conditions
    }
}

/// Represents a database table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    table_name: String,
    schema_name: String,
    primary_key: Vec<String>,
    shard_key: Option<ShardKey>,
    columns: IndexMap<String, Column>,
    foreign_keys: IndexMap<String, ForeignKey>,
    relationships: IndexMap<String, GenericRelationship>,
}

impl Table {
    /// Create a new table in the default schema
    pub fn new(table_name: impl Into<String>) -> Result<Self> {
        Self::in_schema(table_name, DEFAULT_SCHEMA)
    }

    /// Create a new table in the given schema
    pub fn in_schema(table_name: impl Into<String>, schema_name: impl Into<String>) -> Result<Self> {
        Ok(Self {
            table_name: require_identifier("table name", table_name.into())?,
            schema_name: require_identifier("schema name", schema_name.into())?,
            primary_key: Vec::new(),
            shard_key: None,
            columns: IndexMap::new(),
            foreign_keys: IndexMap::new(),
            relationships: IndexMap::new(),
        })
    }

    pub fn with_primary_key(mut self, primary_key: impl Into<KeyColumns>) -> Result<Self> {
        self.set_primary_key(primary_key)?;
        Ok(self)
    }

    pub fn with_shard_key(mut self, shard_key: ShardKey) -> Self {
        self.shard_key = Some(shard_key);
        self
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn schema_name(&self) -> &str {
        &self.schema_name
    }

    /// Add a column at the end, or replace the same-named column where it stands
    pub fn add_column(&mut self, column: Column) {
        self.columns.insert(column.name.clone(), column);
    }

    pub fn add_columns<I: IntoIterator<Item = Column>>(&mut self, columns: I) {
        for column in columns {
            self.add_column(column);
        }
    }

    /// Remove a column, keeping the order of the others
    pub fn drop_column(&mut self, column_name: &str) -> Option<Column> {
        self.columns.shift_remove(column_name)
    }

    pub fn has_column(&self, column_name: &str) -> bool {
        self.columns.contains_key(column_name)
    }

    pub fn get_column(&self, column_name: &str) -> Option<&Column> {
        self.columns.get(column_name)
    }

    /// Column names in first-insertion order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.keys().map(String::as_str).collect()
    }

    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.values()
    }

    pub fn number_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn primary_key(&self) -> &[String] {
        &self.primary_key
    }

    /// Replace the primary key wholesale. An empty list removes it.
    pub fn set_primary_key(&mut self, primary_key: impl Into<KeyColumns>) -> Result<()> {
        self.primary_key = primary_key.into().into_checked_vec("primary key column")?;
        Ok(())
    }

    pub fn shard_key(&self) -> Option<&ShardKey> {
        self.shard_key.as_ref()
    }

    pub fn set_shard_key(&mut self, shard_key: ShardKey) {
        self.shard_key = Some(shard_key);
    }

    pub fn clear_shard_key(&mut self) -> Option<ShardKey> {
        self.shard_key.take()
    }

    /// Store a foreign key under its name, replacing any key with the same name
    pub fn add_foreign_key(&mut self, foreign_key: ForeignKey) {
        self.foreign_keys
            .insert(foreign_key.name.clone(), foreign_key);
    }

    /// Build a foreign key from this table and store it
    pub fn add_foreign_key_to(
        &mut self,
        from_keys: impl Into<KeyColumns>,
        to_table: impl Into<String>,
        to_keys: impl Into<KeyColumns>,
        name: Option<&str>,
    ) -> Result<()> {
        let foreign_key =
            ForeignKey::new(self.table_name.clone(), from_keys, to_table, to_keys, name)?;
        self.add_foreign_key(foreign_key);
        Ok(())
    }

    pub fn get_foreign_key(&self, name: &str) -> Option<&ForeignKey> {
        self.foreign_keys.get(name)
    }

    pub fn foreign_keys(&self) -> impl Iterator<Item = &ForeignKey> {
        self.foreign_keys.values()
    }

    pub fn drop_foreign_key(&mut self, name: &str) -> Option<ForeignKey> {
        self.foreign_keys.shift_remove(name)
    }

    /// Store a relationship under its name, replacing any relationship with the same name
    pub fn add_relationship(&mut self, relationship: GenericRelationship) {
        self.relationships
            .insert(relationship.name.clone(), relationship);
    }

    /// Build a relationship from this table and store it
    pub fn add_relationship_to(
        &mut self,
        to_table: impl Into<String>,
        conditions: impl Into<String>,
        name: Option<&str>,
    ) -> Result<()> {
        let relationship =
            GenericRelationship::new(self.table_name.clone(), to_table, conditions, name)?;
        self.add_relationship(relationship);
        Ok(())
    }

    pub fn get_relationship(&self, name: &str) -> Option<&GenericRelationship> {
        self.relationships.get(name)
    }

    pub fn relationships(&self) -> impl Iterator<Item = &GenericRelationship> {
        self.relationships.values()
    }

    pub fn drop_relationship(&mut self, name: &str) -> Option<GenericRelationship> {
        self.relationships.shift_remove(name)
    }

    pub(crate) fn column_map(&self) -> &IndexMap<String, Column> {
        &self.columns
    }

    pub(crate) fn foreign_key_map(&self) -> &IndexMap<String, ForeignKey> {
        &self.foreign_keys
    }

    pub(crate) fn relationship_map(&self) -> &IndexMap<String, GenericRelationship> {
        &self.relationships
    }
}

/// Represents a database of tables
///
/// Table names are unique across the whole database. Two tables with the same name in
/// different schemas are not supported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Database {
    database_name: String,
    tables: IndexMap<String, Table>,
    /// Number of tables per schema; a schema exists while its count is positive
    schemas: IndexMap<String, usize>,
}

impl Database {
    pub fn new(database_name: impl Into<String>) -> Result<Self> {
        Ok(Self {
            database_name: require_identifier("database name", database_name.into())?,
            tables: IndexMap::new(),
            schemas: IndexMap::new(),
        })
    }

    pub fn database_name(&self) -> &str {
        &self.database_name
    }

    /// Add a table, returning the same-named table it replaced
    pub fn add_table(&mut self, table: Table) -> Option<Table> {
        *self.schemas.entry(table.schema_name.clone()).or_insert(0) += 1;

        let replaced = self.tables.insert(table.table_name.clone(), table);
        if let Some(old) = &replaced {
            self.release_schema(&old.schema_name);
        }
        replaced
    }

    /// Remove a table, returning it if it existed
    pub fn drop_table(&mut self, table_name: &str) -> Option<Table> {
        let table = self.tables.shift_remove(table_name)?;
        self.release_schema(&table.schema_name);
        Some(table)
    }

    fn release_schema(&mut self, schema_name: &str) {
        if let Some(count) = self.schemas.get_mut(schema_name) {
            *count -= 1;
            if *count == 0 {
                self.schemas.shift_remove(schema_name);
            }
        }
    }

    pub fn get_table(&self, table_name: &str) -> Option<&Table> {
        self.tables.get(table_name)
    }

    pub fn get_table_mut(&mut self, table_name: &str) -> Option<&mut Table> {
        self.tables.get_mut(table_name)
    }

    /// Table names in insertion order
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.keys().map(String::as_str).collect()
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    pub fn number_tables(&self) -> usize {
        self.tables.len()
    }

    /// Schemas that currently hold at least one table
    pub fn schema_names(&self) -> Vec<&str> {
        self.schemas.keys().map(String::as_str).collect()
    }

    pub fn validate(&self) -> ValidationResult {
        DatabaseValidator::new(self).validate()
    }

    pub(crate) fn table_map(&self) -> &IndexMap<String, Table> {
        &self.tables
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_column() {
        let column = Column::new("column_1", "INT").unwrap();
        assert_eq!(column.name(), "column_1");
        assert_eq!(column.column_type(), "INT");
        assert!(!column.is_varchar());

        let column = Column::new("column_2", "VARCHAR(20)").unwrap();
        assert!(column.is_varchar());
    }

    #[test]
    fn test_create_column_with_bad_type() {
        assert!(matches!(
            Column::new("column_1", "bit"),
            Err(Error::InvalidColumnType(_))
        ));
        assert!(matches!(
            Column::new("", "INT"),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_column_order_is_kept_on_overwrite() {
        let mut table = Table::new("table1").unwrap();
        table.add_column(Column::new("b", "INT").unwrap());
        table.add_column(Column::new("a", "DOUBLE").unwrap());
        table.add_column(Column::new("c", "DATE").unwrap());
        table.add_column(Column::new("b", "VARCHAR(10)").unwrap());

        assert_eq!(table.column_names(), vec!["b", "a", "c"]);
        assert_eq!(table.get_column("b").unwrap().column_type(), "VARCHAR(10)");
        assert_eq!(table.number_columns(), 3);
    }

    #[test]
    fn test_drop_column() {
        let mut table = Table::new("table1").unwrap();
        table.add_columns(vec![
            Column::new("a", "INT").unwrap(),
            Column::new("b", "INT").unwrap(),
            Column::new("c", "INT").unwrap(),
        ]);

        let dropped = table.drop_column("b").unwrap();
        assert_eq!(dropped.name(), "b");
        assert!(table.drop_column("b").is_none());
        assert_eq!(table.column_names(), vec!["a", "c"]);
        assert!(!table.has_column("b"));
    }

    #[test]
    fn test_set_primary_key() {
        let mut table = Table::new("table1").unwrap();
        table.set_primary_key("id").unwrap();
        assert_eq!(table.primary_key(), ["id".to_string()]);

        table.set_primary_key(vec!["a", "b"]).unwrap();
        assert_eq!(table.primary_key(), ["a".to_string(), "b".to_string()]);

        assert!(matches!(
            table.set_primary_key(vec!["a", " "]),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_foreign_key_default_name() {
        let fk = ForeignKey::new("A", "x", "B", "y", None).unwrap();
        assert_eq!(fk.name(), "FK_A_to_B");
        assert_eq!(fk.from_keys(), ["x".to_string()]);
        assert_eq!(fk.to_keys(), ["y".to_string()]);

        let fk = ForeignKey::new("A", "x", "B", "y", Some("TestFK")).unwrap();
        assert_eq!(fk.name(), "TestFK");
    }

    #[test]
    fn test_foreign_key_mismatched_keys() {
        let result = ForeignKey::new("A", vec!["x", "y"], "B", "z", None);
        assert!(matches!(result, Err(Error::KeyMismatch(_))));
    }

    #[test]
    fn test_foreign_key_equality_ignores_key_order() {
        let fk1 = ForeignKey::new("A", ["x", "y"], "B", ["p", "q"], None).unwrap();
        let fk2 = ForeignKey::new("A", ["y", "x"], "B", ["q", "p"], None).unwrap();
        let fk3 = ForeignKey::new("A", ["x", "z"], "B", ["p", "q"], None).unwrap();
        assert_eq!(fk1, fk2);
        assert_ne!(fk1, fk3);
    }

    #[test]
    fn test_relationship_default_name() {
        let rel = GenericRelationship::new("A", "B", "(\"A\".\"x\" = \"B\".\"y\")", None).unwrap();
        assert_eq!(rel.name(), "REL_A_to_B");
    }

    #[test]
    fn test_add_foreign_key_overwrites_same_name() {
        let mut table = Table::new("child").unwrap();
        table.add_foreign_key_to("a", "parent", "b", None).unwrap();
        table.add_foreign_key_to("c", "parent", "d", None).unwrap();

        let names: Vec<&str> = table.foreign_keys().map(|fk| fk.name()).collect();
        assert_eq!(names, vec!["FK_child_to_parent"]);
        assert_eq!(
            table.get_foreign_key("FK_child_to_parent").unwrap().from_keys(),
            ["c".to_string()]
        );
    }

    #[test]
    fn test_shard_key() {
        let sk = ShardKey::new("id", 96).unwrap();
        assert_eq!(sk.columns(), ["id".to_string()]);
        assert_eq!(sk.number_shards(), 96);
        assert!(ShardKey::new("id", 0).is_err());
        assert!(ShardKey::new(Vec::<String>::new(), 4).is_err());
    }

    #[test]
    fn test_schema_reference_counts() {
        let mut db = Database::new("db").unwrap();
        db.add_table(Table::new("t1").unwrap());
        db.add_table(Table::in_schema("t2", "s1").unwrap());
        db.add_table(Table::in_schema("t3", "s1").unwrap());
        assert_eq!(db.schema_names(), vec![DEFAULT_SCHEMA, "s1"]);

        db.drop_table("t2");
        assert_eq!(db.schema_names(), vec![DEFAULT_SCHEMA, "s1"]);
        db.drop_table("t3");
        assert_eq!(db.schema_names(), vec![DEFAULT_SCHEMA]);
        assert!(db.drop_table("t3").is_none());
    }

    #[test]
    fn test_overwriting_table_moves_schema_reference() {
        let mut db = Database::new("db").unwrap();
        db.add_table(Table::in_schema("t1", "s1").unwrap());
        let replaced = db.add_table(Table::in_schema("t1", "s2").unwrap());

        assert!(replaced.is_some());
        assert_eq!(db.number_tables(), 1);
        assert_eq!(db.schema_names(), vec!["s2"]);
    }
}
