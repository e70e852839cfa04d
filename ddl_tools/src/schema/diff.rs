//! Schema difference calculator
//!
//! This module compares two databases and records, for each side, the changes that would make
//! it match the other. The first list turns the first database into the second; the second list
//! is its mirror. Tables, columns, foreign keys and relationships are matched by name after
//! sorting, so the output order is deterministic.
//!
//! Tables are matched by name only. Two same-named tables in different schemas are treated as
//! the same table.

use std::cmp::Ordering;
use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use crate::schema::generator::StatementGenerator;
use crate::schema::types::{Column, Database, ForeignKey, GenericRelationship, ShardKey, Table};

/// The table a difference applies to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TableRef {
    pub database_name: String,
    pub schema_name: String,
    pub table_name: String,
}

impl TableRef {
    fn new(database: &Database, table: &Table) -> Self {
        Self {
            database_name: database.database_name().to_string(),
            schema_name: table.schema_name().to_string(),
            table_name: table.table_name().to_string(),
        }
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}",
            self.database_name, self.schema_name, self.table_name
        )
    }
}

/// The kind of a difference, without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum DifferenceKind {
    TableCreated,
    TableDropped,
    PrimaryKeyAdded,
    PrimaryKeyDropped,
    ShardKeyAdded,
    ShardKeyDropped,
    ForeignKeyAdded,
    ForeignKeyDropped,
    RelationshipAdded,
    RelationshipDropped,
    ColumnAdded,
    ColumnDropped,
    ColumnModified,
}

impl DifferenceKind {
    pub fn description(&self) -> &'static str {
        match self {
            DifferenceKind::TableCreated => "Table Created",
            DifferenceKind::TableDropped => "Table Dropped",
            DifferenceKind::PrimaryKeyAdded => "Primary Key Added",
            DifferenceKind::PrimaryKeyDropped => "Primary Key Dropped",
            DifferenceKind::ShardKeyAdded => "Shard Key Added",
            DifferenceKind::ShardKeyDropped => "Shard Key Dropped",
            DifferenceKind::ForeignKeyAdded => "Foreign Key Added",
            DifferenceKind::ForeignKeyDropped => "Foreign Key Dropped",
            DifferenceKind::RelationshipAdded => "Relationship Added",
            DifferenceKind::RelationshipDropped => "Relationship Dropped",
            DifferenceKind::ColumnAdded => "Column Added",
            DifferenceKind::ColumnDropped => "Column Dropped",
            DifferenceKind::ColumnModified => "Column Modified",
        }
    }
}

impl fmt::Display for DifferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// A single change to apply to one side of a comparison
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Difference {
    TableCreated { target: TableRef, table: Table },
    TableDropped { target: TableRef, table: Table },
    PrimaryKeyAdded { target: TableRef, primary_key: Vec<String> },
    PrimaryKeyDropped { target: TableRef },
    /// Also used when the partitioning changes; the new key replaces the old one
    ShardKeyAdded { target: TableRef, shard_key: ShardKey },
    ShardKeyDropped { target: TableRef },
    ForeignKeyAdded { target: TableRef, foreign_key: ForeignKey },
    ForeignKeyDropped { target: TableRef, name: String },
    RelationshipAdded { target: TableRef, relationship: GenericRelationship },
    RelationshipDropped { target: TableRef, name: String },
    ColumnAdded { target: TableRef, column: Column },
    ColumnDropped { target: TableRef, column: Column },
    /// Carries the column as it should become
    ColumnModified { target: TableRef, column: Column },
}

impl Difference {
    pub fn kind(&self) -> DifferenceKind {
        match self {
            Difference::TableCreated { .. } => DifferenceKind::TableCreated,
            Difference::TableDropped { .. } => DifferenceKind::TableDropped,
            Difference::PrimaryKeyAdded { .. } => DifferenceKind::PrimaryKeyAdded,
            Difference::PrimaryKeyDropped { .. } => DifferenceKind::PrimaryKeyDropped,
            Difference::ShardKeyAdded { .. } => DifferenceKind::ShardKeyAdded,
            Difference::ShardKeyDropped { .. } => DifferenceKind::ShardKeyDropped,
            Difference::ForeignKeyAdded { .. } => DifferenceKind::ForeignKeyAdded,
            Difference::ForeignKeyDropped { .. } => DifferenceKind::ForeignKeyDropped,
            Difference::RelationshipAdded { .. } => DifferenceKind::RelationshipAdded,
            Difference::RelationshipDropped { .. } => DifferenceKind::RelationshipDropped,
            Difference::ColumnAdded { .. } => DifferenceKind::ColumnAdded,
            Difference::ColumnDropped { .. } => DifferenceKind::ColumnDropped,
            Difference::ColumnModified { .. } => DifferenceKind::ColumnModified,
        }
    }

    pub fn target(&self) -> &TableRef {
        match self {
            Difference::TableCreated { target, .. }
            | Difference::TableDropped { target, .. }
            | Difference::PrimaryKeyAdded { target, .. }
            | Difference::PrimaryKeyDropped { target }
            | Difference::ShardKeyAdded { target, .. }
            | Difference::ShardKeyDropped { target }
            | Difference::ForeignKeyAdded { target, .. }
            | Difference::ForeignKeyDropped { target, .. }
            | Difference::RelationshipAdded { target, .. }
            | Difference::RelationshipDropped { target, .. }
            | Difference::ColumnAdded { target, .. }
            | Difference::ColumnDropped { target, .. }
            | Difference::ColumnModified { target, .. } => target,
        }
    }

    /// Render the statement that applies this difference
    pub fn render(&self, generator: &StatementGenerator) -> String {
        let target = self.target();
        let (schema, table) = (target.schema_name.as_str(), target.table_name.as_str());

        match self {
            Difference::TableCreated { table: created, .. } => generator.create_table(created),
            Difference::TableDropped { .. } => generator.drop_table(schema, table),
            Difference::PrimaryKeyAdded { primary_key, .. } => {
                generator.add_primary_key(schema, table, primary_key)
            }
            Difference::PrimaryKeyDropped { .. } => generator.drop_primary_key(schema, table),
            Difference::ShardKeyAdded { shard_key, .. } => {
                generator.add_shard_key(schema, table, shard_key)
            }
            Difference::ShardKeyDropped { .. } => generator.drop_shard_key(schema, table),
            Difference::ForeignKeyAdded { foreign_key, .. } => {
                generator.add_foreign_key(schema, table, foreign_key)
            }
            Difference::RelationshipAdded { relationship, .. } => {
                generator.add_relationship(schema, table, relationship)
            }
            Difference::ForeignKeyDropped { name, .. }
            | Difference::RelationshipDropped { name, .. } => {
                generator.drop_constraint(schema, table, name)
            }
            Difference::ColumnAdded { column, .. } => generator.add_column(schema, table, column),
            Difference::ColumnDropped { column, .. } => {
                generator.drop_column(schema, table, column.name())
            }
            Difference::ColumnModified { column, .. } => {
                generator.modify_column(schema, table, column)
            }
        }
    }
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.target(), self.kind())
    }
}

/// Both sides of a comparison between two databases
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SchemaDiff {
    /// Changes that make the first database match the second
    pub first: Vec<Difference>,
    /// Changes that make the second database match the first
    pub second: Vec<Difference>,
}

impl SchemaDiff {
    /// Generate a schema diff between two databases
    pub fn generate(first: &Database, second: &Database) -> Self {
        let mut diff = Self::default();
        diff.compare_tables(first, second);
        diff
    }

    /// True if the databases have the same structure
    pub fn is_empty(&self) -> bool {
        self.first.is_empty() && self.second.is_empty()
    }

    pub fn into_parts(self) -> (Vec<Difference>, Vec<Difference>) {
        (self.first, self.second)
    }

    /// Statements that turn the first database into the second
    pub fn render_first(&self, generator: &StatementGenerator) -> String {
        render_all(&self.first, generator)
    }

    /// Statements that turn the second database into the first
    pub fn render_second(&self, generator: &StatementGenerator) -> String {
        render_all(&self.second, generator)
    }

    fn compare_tables(&mut self, db1: &Database, db2: &Database) {
        for pair in merge_by_name(db1.table_map(), db2.table_map()) {
            match pair {
                Paired::First(table) => {
                    self.first.push(Difference::TableDropped {
                        target: TableRef::new(db1, table),
                        table: table.clone(),
                    });
                    self.second.push(Difference::TableCreated {
                        target: TableRef::new(db2, table),
                        table: table.clone(),
                    });
                }
                Paired::Second(table) => {
                    self.first.push(Difference::TableCreated {
                        target: TableRef::new(db1, table),
                        table: table.clone(),
                    });
                    self.second.push(Difference::TableDropped {
                        target: TableRef::new(db2, table),
                        table: table.clone(),
                    });
                }
                Paired::Both(table_1, table_2) => {
                    debug!(table = %table_1.table_name(), "Comparing tables");
                    let target_1 = TableRef::new(db1, table_1);
                    let target_2 = TableRef::new(db2, table_2);
                    self.compare_primary_keys(&target_1, table_1, &target_2, table_2);
                    self.compare_shard_keys(&target_1, table_1, &target_2, table_2);
                    self.compare_foreign_keys(&target_1, table_1, &target_2, table_2);
                    self.compare_relationships(&target_1, table_1, &target_2, table_2);
                    self.compare_columns(&target_1, table_1, &target_2, table_2);
                }
            }
        }
    }

    /// Keys are never altered in place; a changed key is dropped and added again
    fn compare_primary_keys(
        &mut self,
        target_1: &TableRef,
        table_1: &Table,
        target_2: &TableRef,
        table_2: &Table,
    ) {
        let (pk1, pk2) = (table_1.primary_key(), table_2.primary_key());
        if pk1 == pk2 {
            return;
        }

        let added = |target: &TableRef, primary_key: &[String]| Difference::PrimaryKeyAdded {
            target: target.clone(),
            primary_key: primary_key.to_vec(),
        };
        let dropped = |target: &TableRef| Difference::PrimaryKeyDropped {
            target: target.clone(),
        };

        if pk1.is_empty() {
            self.first.push(added(target_1, pk2));
            self.second.push(dropped(target_2));
        } else if pk2.is_empty() {
            self.second.push(added(target_2, pk1));
            self.first.push(dropped(target_1));
        } else {
            self.first.push(dropped(target_1));
            self.first.push(added(target_1, pk2));
            self.second.push(dropped(target_2));
            self.second.push(added(target_2, pk1));
        }
    }

    fn compare_shard_keys(
        &mut self,
        target_1: &TableRef,
        table_1: &Table,
        target_2: &TableRef,
        table_2: &Table,
    ) {
        let added = |target: &TableRef, shard_key: &ShardKey| Difference::ShardKeyAdded {
            target: target.clone(),
            shard_key: shard_key.clone(),
        };
        let dropped = |target: &TableRef| Difference::ShardKeyDropped {
            target: target.clone(),
        };

        match (table_1.shard_key(), table_2.shard_key()) {
            (None, Some(sk2)) => {
                self.first.push(added(target_1, sk2));
                self.second.push(dropped(target_2));
            }
            (Some(sk1), None) => {
                self.second.push(added(target_2, sk1));
                self.first.push(dropped(target_1));
            }
            (Some(sk1), Some(sk2)) if sk1 != sk2 => {
                self.first.push(added(target_1, sk2));
                self.second.push(added(target_2, sk1));
            }
            _ => {}
        }
    }

    fn compare_foreign_keys(
        &mut self,
        target_1: &TableRef,
        table_1: &Table,
        target_2: &TableRef,
        table_2: &Table,
    ) {
        let added = |target: &TableRef, foreign_key: &ForeignKey| Difference::ForeignKeyAdded {
            target: target.clone(),
            foreign_key: foreign_key.clone(),
        };
        let dropped = |target: &TableRef, foreign_key: &ForeignKey| Difference::ForeignKeyDropped {
            target: target.clone(),
            name: foreign_key.name().to_string(),
        };

        for pair in merge_by_name(table_1.foreign_key_map(), table_2.foreign_key_map()) {
            match pair {
                Paired::First(fk) => {
                    self.second.push(added(target_2, fk));
                    self.first.push(dropped(target_1, fk));
                }
                Paired::Second(fk) => {
                    self.first.push(added(target_1, fk));
                    self.second.push(dropped(target_2, fk));
                }
                Paired::Both(fk1, fk2) if fk1 != fk2 => {
                    self.first.push(dropped(target_1, fk1));
                    self.first.push(added(target_1, fk2));
                    self.second.push(dropped(target_2, fk2));
                    self.second.push(added(target_2, fk1));
                }
                Paired::Both(..) => {}
            }
        }
    }

    fn compare_relationships(
        &mut self,
        target_1: &TableRef,
        table_1: &Table,
        target_2: &TableRef,
        table_2: &Table,
    ) {
        let added = |target: &TableRef, relationship: &GenericRelationship| {
            Difference::RelationshipAdded {
                target: target.clone(),
                relationship: relationship.clone(),
            }
        };
        let dropped = |target: &TableRef, relationship: &GenericRelationship| {
            Difference::RelationshipDropped {
                target: target.clone(),
                name: relationship.name().to_string(),
            }
        };

        for pair in merge_by_name(table_1.relationship_map(), table_2.relationship_map()) {
            match pair {
                Paired::First(rel) => {
                    self.second.push(added(target_2, rel));
                    self.first.push(dropped(target_1, rel));
                }
                Paired::Second(rel) => {
                    self.first.push(added(target_1, rel));
                    self.second.push(dropped(target_2, rel));
                }
                Paired::Both(rel1, rel2) if rel1 != rel2 => {
                    self.first.push(dropped(target_1, rel1));
                    self.first.push(added(target_1, rel2));
                    self.second.push(dropped(target_2, rel2));
                    self.second.push(added(target_2, rel1));
                }
                Paired::Both(..) => {}
            }
        }
    }

    fn compare_columns(
        &mut self,
        target_1: &TableRef,
        table_1: &Table,
        target_2: &TableRef,
        table_2: &Table,
    ) {
        for pair in merge_by_name(table_1.column_map(), table_2.column_map()) {
            match pair {
                Paired::First(column) => {
                    self.second.push(Difference::ColumnAdded {
                        target: target_2.clone(),
                        column: column.clone(),
                    });
                    self.first.push(Difference::ColumnDropped {
                        target: target_1.clone(),
                        column: column.clone(),
                    });
                }
                Paired::Second(column) => {
                    self.first.push(Difference::ColumnAdded {
                        target: target_1.clone(),
                        column: column.clone(),
                    });
                    self.second.push(Difference::ColumnDropped {
                        target: target_2.clone(),
                        column: column.clone(),
                    });
                }
                Paired::Both(column_1, column_2)
                    if column_1.column_type() != column_2.column_type() =>
                {
                    self.first.push(Difference::ColumnModified {
                        target: target_1.clone(),
                        column: column_2.clone(),
                    });
                    self.second.push(Difference::ColumnModified {
                        target: target_2.clone(),
                        column: column_1.clone(),
                    });
                }
                Paired::Both(..) => {}
            }
        }
    }
}

/// Compare two databases, returning the changes for each side
pub fn compare_databases(db1: &Database, db2: &Database) -> (Vec<Difference>, Vec<Difference>) {
    SchemaDiff::generate(db1, db2).into_parts()
}

fn render_all(differences: &[Difference], generator: &StatementGenerator) -> String {
    differences
        .iter()
        .map(|difference| difference.render(generator))
        .collect()
}

/// Where a named item was found during a merge
enum Paired<'a, T> {
    First(&'a T),
    Second(&'a T),
    Both(&'a T, &'a T),
}

/// Walk two name-keyed collections in sorted name order
fn merge_by_name<'a, T>(
    first: &'a IndexMap<String, T>,
    second: &'a IndexMap<String, T>,
) -> Vec<Paired<'a, T>> {
    let mut left: Vec<(&String, &T)> = first.iter().collect();
    let mut right: Vec<(&String, &T)> = second.iter().collect();
    left.sort_by(|a, b| a.0.cmp(b.0));
    right.sort_by(|a, b| a.0.cmp(b.0));

    let mut merged = Vec::with_capacity(left.len().max(right.len()));
    let (mut i, mut j) = (0, 0);

    while i < left.len() && j < right.len() {
        match left[i].0.cmp(right[j].0) {
            Ordering::Less => {
                merged.push(Paired::First(left[i].1));
                i += 1;
            }
            Ordering::Greater => {
                merged.push(Paired::Second(right[j].1));
                j += 1;
            }
            Ordering::Equal => {
                merged.push(Paired::Both(left[i].1, right[j].1));
                i += 1;
                j += 1;
            }
        }
    }

    merged.extend(left[i..].iter().map(|(_, item)| Paired::First(*item)));
    merged.extend(right[j..].iter().map(|(_, item)| Paired::Second(*item)));
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    fn table(name: &str, columns: &[(&str, &str)]) -> Table {
        let mut table = Table::new(name).unwrap();
        for (column, column_type) in columns {
            table.add_column(Column::new(*column, *column_type).unwrap());
        }
        table
    }

    fn database(name: &str, tables: Vec<Table>) -> Database {
        let mut db = Database::new(name).unwrap();
        for table in tables {
            db.add_table(table);
        }
        db
    }

    fn kinds(differences: &[Difference]) -> Vec<DifferenceKind> {
        differences.iter().map(Difference::kind).collect()
    }

    #[test]
    fn test_identical_databases() {
        let db1 = database("a", vec![table("t1", &[("c", "INT")])]);
        let db2 = database("b", vec![table("t1", &[("c", "INT")])]);
        assert!(SchemaDiff::generate(&db1, &db2).is_empty());
    }

    #[test]
    fn test_table_only_in_first() {
        let db1 = database("a", vec![table("t1", &[]), table("t2", &[])]);
        let db2 = database("b", vec![table("t2", &[])]);

        let (diff1, diff2) = compare_databases(&db1, &db2);
        assert_eq!(kinds(&diff1), vec![DifferenceKind::TableDropped]);
        assert_eq!(kinds(&diff2), vec![DifferenceKind::TableCreated]);
        assert_eq!(diff1[0].to_string(), "a.falcon_default_schema.t1: Table Dropped");
        assert_eq!(diff2[0].target().database_name, "b");
    }

    #[test]
    fn test_merge_drains_both_sides() {
        let db1 = database("a", vec![table("a1", &[]), table("m", &[])]);
        let db2 = database("b", vec![table("m", &[]), table("z1", &[]), table("z2", &[])]);

        let (diff1, _) = compare_databases(&db1, &db2);
        let names: Vec<&str> = diff1.iter().map(|d| d.target().table_name.as_str()).collect();
        assert_eq!(names, vec!["a1", "z1", "z2"]);
        assert_eq!(
            kinds(&diff1),
            vec![
                DifferenceKind::TableDropped,
                DifferenceKind::TableCreated,
                DifferenceKind::TableCreated
            ]
        );
    }

    #[test]
    fn test_column_changes() {
        let db1 = database("a", vec![table("t", &[("keep", "INT"), ("old", "INT"), ("typed", "INT")])]);
        let db2 = database("b", vec![table("t", &[("keep", "INT"), ("new", "DATE"), ("typed", "BIGINT")])]);

        let diff = SchemaDiff::generate(&db1, &db2);
        assert_eq!(
            kinds(&diff.first),
            vec![
                DifferenceKind::ColumnAdded,
                DifferenceKind::ColumnDropped,
                DifferenceKind::ColumnModified
            ]
        );

        let generator = StatementGenerator::default();
        assert_eq!(
            diff.render_first(&generator),
            concat!(
                "ALTER TABLE \"falcon_default_schema\".\"t\" ADD COLUMN \"new\" DATE DEFAULT 0;\n",
                "ALTER TABLE \"falcon_default_schema\".\"t\" DROP COLUMN \"old\";\n",
                "ALTER TABLE \"falcon_default_schema\".\"t\" MODIFY COLUMN \"typed\" BIGINT;\n",
            )
        );
        assert_eq!(
            diff.render_second(&generator),
            concat!(
                "ALTER TABLE \"falcon_default_schema\".\"t\" DROP COLUMN \"new\";\n",
                "ALTER TABLE \"falcon_default_schema\".\"t\" ADD COLUMN \"old\" INT DEFAULT 0;\n",
                "ALTER TABLE \"falcon_default_schema\".\"t\" MODIFY COLUMN \"typed\" INT;\n",
            )
        );
    }

    #[test]
    fn test_primary_key_changes() {
        let keyed = |pk: &[&str]| table("t", &[("a", "INT"), ("b", "INT")]).with_primary_key(pk).unwrap();

        let (diff1, diff2) = compare_databases(
            &database("a", vec![keyed(&[])]),
            &database("b", vec![keyed(&["a"])]),
        );
        assert_eq!(kinds(&diff1), vec![DifferenceKind::PrimaryKeyAdded]);
        assert_eq!(kinds(&diff2), vec![DifferenceKind::PrimaryKeyDropped]);

        let (diff1, diff2) = compare_databases(
            &database("a", vec![keyed(&["a"])]),
            &database("b", vec![keyed(&["b"])]),
        );
        let drop_add = vec![DifferenceKind::PrimaryKeyDropped, DifferenceKind::PrimaryKeyAdded];
        assert_eq!(kinds(&diff1), drop_add);
        assert_eq!(kinds(&diff2), drop_add);
        assert_eq!(
            diff1[1],
            Difference::PrimaryKeyAdded {
                target: TableRef::new(&database("a", vec![]), &keyed(&[])),
                primary_key: vec!["b".to_string()],
            }
        );
    }

    #[test]
    fn test_changed_shard_key_is_only_added() {
        let sharded = |shards: u32| {
            table("t", &[("a", "INT")]).with_shard_key(ShardKey::new("a", shards).unwrap())
        };

        let (diff1, diff2) = compare_databases(
            &database("a", vec![sharded(8)]),
            &database("b", vec![sharded(16)]),
        );
        assert_eq!(kinds(&diff1), vec![DifferenceKind::ShardKeyAdded]);
        assert_eq!(kinds(&diff2), vec![DifferenceKind::ShardKeyAdded]);
        assert_eq!(
            diff1[0].render(&StatementGenerator::default()),
            "ALTER TABLE \"falcon_default_schema\".\"t\" SET FACT PARTITION BY HASH (16) KEY (\"a\");\n"
        );

        let (diff1, diff2) = compare_databases(
            &database("a", vec![sharded(8)]),
            &database("b", vec![table("t", &[("a", "INT")])]),
        );
        assert_eq!(kinds(&diff1), vec![DifferenceKind::ShardKeyDropped]);
        assert_eq!(kinds(&diff2), vec![DifferenceKind::ShardKeyAdded]);
    }

    #[test]
    fn test_foreign_key_and_relationship_changes() {
        let mut t1 = table("t", &[("a", "INT")]);
        t1.add_foreign_key_to("a", "u", "id", Some("fk_same")).unwrap();
        t1.add_foreign_key_to("a", "u", "id", Some("fk_gone")).unwrap();
        t1.add_relationship_to("u", "a = b", Some("rel")).unwrap();

        let mut t2 = table("t", &[("a", "INT")]);
        t2.add_foreign_key_to("a", "v", "id", Some("fk_same")).unwrap();
        t2.add_relationship_to("u", "a = b", Some("rel")).unwrap();
        t2.add_relationship_to("w", "a = c", Some("rel_new")).unwrap();

        let (diff1, diff2) = compare_databases(&database("a", vec![t1]), &database("b", vec![t2]));
        assert_eq!(
            kinds(&diff1),
            vec![
                DifferenceKind::ForeignKeyDropped,
                DifferenceKind::ForeignKeyDropped,
                DifferenceKind::ForeignKeyAdded,
                DifferenceKind::RelationshipAdded,
            ]
        );
        assert_eq!(
            kinds(&diff2),
            vec![
                DifferenceKind::ForeignKeyAdded,
                DifferenceKind::ForeignKeyDropped,
                DifferenceKind::ForeignKeyAdded,
                DifferenceKind::RelationshipDropped,
            ]
        );

        let generator = StatementGenerator::default();
        assert_eq!(
            diff1[0].render(&generator),
            "ALTER TABLE \"falcon_default_schema\".\"t\" DROP CONSTRAINT \"fk_gone\";\n"
        );
        assert_eq!(
            diff2[3].render(&generator),
            "ALTER TABLE \"falcon_default_schema\".\"t\" DROP CONSTRAINT \"rel_new\";\n"
        );
    }

    #[test]
    fn test_swapped_comparison_mirrors() {
        let mut t1 = table("t", &[("a", "INT"), ("b", "VARCHAR(4)")]).with_primary_key("a").unwrap();
        t1.add_foreign_key_to("a", "u", "id", None).unwrap();
        let db1 = database("a", vec![t1, table("only_a", &[])]);
        let db2 = database(
            "b",
            vec![table("t", &[("a", "BIGINT"), ("c", "DATE")]), table("only_b", &[])],
        );

        let (forward_1, forward_2) = compare_databases(&db1, &db2);
        let (reverse_1, reverse_2) = compare_databases(&db2, &db1);
        assert_eq!(forward_1, reverse_2);
        assert_eq!(forward_2, reverse_1);
    }

    #[test]
    fn test_difference_serializes_with_kind_tag() {
        let db1 = database("a", vec![table("t", &[("a", "INT")])]);
        let db2 = database("b", vec![table("t", &[])]);
        let (diff1, _) = compare_databases(&db1, &db2);

        let json = serde_json::to_value(&diff1[0]).unwrap();
        assert_eq!(json["kind"], "column_dropped");
        assert_eq!(json["target"]["table_name"], "t");
        assert_eq!(json["column"]["name"], "a");
    }
}
