//! Relationship resolution across parsed tables.

use super::error::{Diagnostic, Diagnostics};
use crate::model::{DEFAULT_REF_COLUMN, Relationship, Table};

/// Resolve foreign keys into relationships, explicit declarations first.
///
/// When no explicit relationship resolves and there is more than one table,
/// `<stem>_id` columns are linked to `<stem>.id` if `infer` is set. The stem
/// also matches its plural table name (`customer_id` -> `customers`).
pub(crate) fn build_relationships(
    tables: &[Table],
    infer: bool,
    diagnostics: &mut Diagnostics,
) -> Vec<Relationship> {
    let mut relationships = Vec::new();

    for table in tables {
        for fk in &table.foreign_keys {
            if find_table(tables, &fk.ref_table).is_none() {
                diagnostics.push(Diagnostic::DanglingReference {
                    table: table.name.clone(),
                    column: fk.column.clone(),
                    ref_table: fk.ref_table.clone(),
                });
                continue;
            }
            push_unique(
                &mut relationships,
                Relationship::one_to_many(&table.name, &fk.column, &fk.ref_table, &fk.ref_column),
            );
        }
    }

    if relationships.is_empty() && tables.len() > 1 && infer {
        for table in tables {
            for column in &table.columns {
                let Some(stem) = naming_stem(&column.name) else {
                    continue;
                };
                let target = table_candidates(stem)
                    .iter()
                    .find_map(|candidate| find_table(tables, candidate));
                if let Some(target) = target {
                    log::debug!(
                        "Inferred FK by naming convention: {}.{} -> {}.{}",
                        table.name,
                        column.name,
                        target,
                        DEFAULT_REF_COLUMN
                    );
                    push_unique(
                        &mut relationships,
                        Relationship::one_to_many(&table.name, &column.name, target, DEFAULT_REF_COLUMN),
                    );
                }
            }
        }
    }

    relationships
}

fn find_table<'a>(tables: &'a [Table], name: &str) -> Option<&'a str> {
    tables
        .iter()
        .find(|t| t.name == name)
        .map(|t| t.name.as_str())
}

fn push_unique(relationships: &mut Vec<Relationship>, rel: Relationship) {
    if !relationships.iter().any(|r| r.same_link(&rel)) {
        relationships.push(rel);
    }
}

/// `customer_id` -> `customer`. The `_id` suffix matches case-insensitively.
fn naming_stem(column: &str) -> Option<&str> {
    let split = column.len().checked_sub(3)?;
    if split == 0 || !column.is_char_boundary(split) {
        return None;
    }
    let (stem, suffix) = column.split_at(split);
    suffix.eq_ignore_ascii_case("_id").then_some(stem)
}

/// Table names a stem may refer to, exact name first.
fn table_candidates(stem: &str) -> Vec<String> {
    let mut candidates = vec![stem.to_string(), format!("{}s", stem), format!("{}es", stem)];
    if let Some(base) = stem.strip_suffix('y') {
        candidates.push(format!("{}ies", base));
    }
    candidates
}
