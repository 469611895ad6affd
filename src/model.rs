//! Schema model produced by the DDL parser.

use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;

/// Column name used when a reference omits its column list.
pub const DEFAULT_REF_COLUMN: &str = "id";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResult {
    pub tables: Vec<Table>,
    pub relationships: Vec<Relationship>,
    pub diagram_text: String,
}

impl ParseResult {
    /// Result with no tables and a header-only diagram.
    pub fn empty() -> Self {
        Self {
            tables: vec![],
            relationships: vec![],
            diagram_text: crate::mermaid::encode(&[], &[]),
        }
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    /// Primary key column names, deduplicated, in declaration order.
    pub primary_keys: Vec<String>,
    pub foreign_keys: Vec<ForeignKey>,
}

impl Table {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    /// Raw type token as written, without its argument list.
    pub declared_type: String,
    pub is_primary_key: bool,
    pub references: Option<ColumnRef>,
    pub not_null: bool,
    pub unique: bool,
}

impl Column {
    pub fn new(name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
            is_primary_key: false,
            references: None,
            not_null: false,
            unique: false,
        }
    }

    pub fn is_foreign_key(&self) -> bool {
        self.references.is_some()
    }
}

// Flattened into the `foreignKey`/`refTable`/`refColumn` shape renderers expect.
impl Serialize for Column {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Column", 8)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("type", &self.declared_type)?;
        state.serialize_field("primaryKey", &self.is_primary_key)?;
        state.serialize_field("foreignKey", &self.is_foreign_key())?;
        state.serialize_field("notNull", &self.not_null)?;
        state.serialize_field("unique", &self.unique)?;
        match &self.references {
            Some(r) => {
                state.serialize_field("refTable", &r.table)?;
                state.serialize_field("refColumn", &r.column)?;
            }
            None => {
                state.skip_field("refTable")?;
                state.skip_field("refColumn")?;
            }
        }
        state.end()
    }
}

/// Target of a column-level foreign key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    pub table: String,
    pub column: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignKey {
    pub column: String,
    pub ref_table: String,
    pub ref_column: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_delete: Option<ReferentialAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_update: Option<ReferentialAction>,
}

impl ForeignKey {
    pub fn new(
        column: impl Into<String>,
        ref_table: impl Into<String>,
        ref_column: impl Into<String>,
    ) -> Self {
        Self {
            column: column.into(),
            ref_table: ref_table.into(),
            ref_column: ref_column.into(),
            on_delete: None,
            on_update: None,
        }
    }

    pub fn target(&self) -> ColumnRef {
        ColumnRef {
            table: self.ref_table.clone(),
            column: self.ref_column.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReferentialAction {
    #[serde(rename = "CASCADE")]
    Cascade,
    #[serde(rename = "RESTRICT")]
    Restrict,
    #[serde(rename = "SET NULL")]
    SetNull,
    #[serde(rename = "SET DEFAULT")]
    SetDefault,
    #[serde(rename = "NO ACTION")]
    NoAction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub id: String,
    pub source_table: String,
    pub source_column: String,
    pub target_table: String,
    pub target_column: String,
    pub kind: RelationshipKind,
}

impl Relationship {
    pub fn one_to_many(
        source_table: &str,
        source_column: &str,
        target_table: &str,
        target_column: &str,
    ) -> Self {
        Self {
            id: format!(
                "{}_{}_to_{}_{}",
                source_table, source_column, target_table, target_column
            ),
            source_table: source_table.to_string(),
            source_column: source_column.to_string(),
            target_table: target_table.to_string(),
            target_column: target_column.to_string(),
            kind: RelationshipKind::OneToMany,
        }
    }

    /// True if both relationships connect the same column pair.
    pub fn same_link(&self, other: &Relationship) -> bool {
        self.source_table == other.source_table
            && self.source_column == other.source_column
            && self.target_table == other.target_table
            && self.target_column == other.target_column
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RelationshipKind {
    #[serde(rename = "one-to-many")]
    OneToMany,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relationship_id_is_deterministic() {
        let rel = Relationship::one_to_many("orders", "customer_id", "customers", "id");
        assert_eq!(rel.id, "orders_customer_id_to_customers_id");
        assert_eq!(rel.kind, RelationshipKind::OneToMany);
    }

    #[test]
    fn test_column_json_shape() {
        let mut col = Column::new("customer_id", "INT");
        col.references = Some(ColumnRef {
            table: "customers".to_string(),
            column: "id".to_string(),
        });
        let json = serde_json::to_value(&col).unwrap();
        assert_eq!(json["type"], "INT");
        assert_eq!(json["foreignKey"], true);
        assert_eq!(json["refTable"], "customers");
        assert_eq!(json["refColumn"], "id");

        let plain = serde_json::to_value(Column::new("name", "TEXT")).unwrap();
        assert_eq!(plain["foreignKey"], false);
        assert!(plain.get("refTable").is_none());
    }

    #[test]
    fn test_relationship_json_shape() {
        let rel = Relationship::one_to_many("orders", "customer_id", "customers", "id");
        let json = serde_json::to_value(&rel).unwrap();
        assert_eq!(json["sourceTable"], "orders");
        assert_eq!(json["targetColumn"], "id");
        assert_eq!(json["kind"], "one-to-many");
    }

    #[test]
    fn test_referential_action_serializes_with_sql_spelling() {
        let mut fk = ForeignKey::new("user_id", "users", "id");
        fk.on_delete = Some(ReferentialAction::SetNull);
        let json = serde_json::to_value(&fk).unwrap();
        assert_eq!(json["onDelete"], "SET NULL");
        assert!(json.get("onUpdate").is_none());
    }
}
