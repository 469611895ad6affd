//! Encoder for Mermaid `erDiagram` text.

use std::collections::{HashMap, HashSet};

use crate::model::{Column, Relationship, Table};

const HEADER: &str = "erDiagram\n";

/// Encode tables and relationships as a Mermaid `erDiagram` block.
///
/// Relationships whose endpoints are not among `tables` are skipped.
pub fn encode(tables: &[Table], relationships: &[Relationship]) -> String {
    let mut output = String::from(HEADER);
    let entities = entity_names(tables);

    for (table, entity) in tables.iter().zip(&entities) {
        encode_table(&mut output, entity, table);
    }

    let lookup: HashMap<&str, &str> = tables
        .iter()
        .zip(&entities)
        .map(|(t, e)| (t.name.as_str(), e.as_str()))
        .collect();

    for rel in relationships {
        let source = lookup.get(rel.source_table.as_str());
        let target = lookup.get(rel.target_table.as_str());
        match (source, target) {
            (Some(source), Some(target)) => encode_relationship(&mut output, source, target, rel),
            _ => log::warn!(
                "Skipping relationship {}: missing table {}",
                rel.id,
                if source.is_some() { &rel.target_table } else { &rel.source_table }
            ),
        }
    }

    output
}

/// One Mermaid entity name per table. Names that sanitize to the same token
/// (`order items`, `order_items`) get a numeric suffix in table order.
fn entity_names(tables: &[Table]) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::new();
    tables
        .iter()
        .map(|table| {
            let base = identifier(&table.name);
            let mut name = base.clone();
            let mut n = 2;
            while !used.insert(name.clone()) {
                name = format!("{}_{}", base, n);
                n += 1;
            }
            name
        })
        .collect()
}

fn encode_table(output: &mut String, entity: &str, table: &Table) {
    output.push_str(&format!("    {} {{\n", entity));
    for column in &table.columns {
        encode_column(output, column);
    }
    output.push_str("    }\n");
}

fn encode_column(output: &mut String, column: &Column) {
    let pk = if column.is_primary_key { "PK " } else { "" };
    let fk = if column.is_foreign_key() { "FK " } else { "" };
    let typ = if column.declared_type.is_empty() {
        "unknown".to_string()
    } else {
        identifier(&column.declared_type)
    };

    output.push_str(&format!(
        "        {}{}{} {}\n",
        pk,
        fk,
        typ,
        identifier(&column.name)
    ));
}

fn encode_relationship(output: &mut String, source: &str, target: &str, rel: &Relationship) {
    output.push_str(&format!(
        "    {} ||--o{{ {} : \"{} -> {}\"\n",
        source,
        target,
        rel.source_column.replace('"', "'"),
        rel.target_column.replace('"', "'")
    ));
}

/// Mermaid entity and attribute names are bare tokens.
fn identifier(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
