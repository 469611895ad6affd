//! Positioned node/edge graph for diagram renderers.

use serde::Serialize;

use crate::measure::TextMetrics;
use crate::model::{ParseResult, Table};

/// Grid placement settings: tables fill rows of `columns` nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct GridLayout {
    pub columns: usize,
    pub spacing_x: f64,
    pub spacing_y: f64,
    pub origin_x: f64,
    pub origin_y: f64,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            columns: 3,
            spacing_x: 300.0,
            spacing_y: 400.0,
            origin_x: 50.0,
            origin_y: 50.0,
        }
    }
}

impl GridLayout {
    /// Top-left corner of the `index`-th node.
    pub fn position(&self, index: usize) -> (f64, f64) {
        let columns = self.columns.max(1);
        let x = self.origin_x + (index % columns) as f64 * self.spacing_x;
        let y = self.origin_y + (index / columns) as f64 * self.spacing_y;
        (x, y)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub id: String,
    pub label: String,
    pub columns: Vec<NodeColumn>,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeColumn {
    pub name: String,
    #[serde(rename = "type")]
    pub typ: String,
    pub primary_key: bool,
    pub foreign_key: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub source_column: String,
    pub target_column: String,
    pub label: String,
}

impl Graph {
    pub fn from_result(result: &ParseResult, layout: &GridLayout, metrics: &TextMetrics) -> Self {
        let nodes: Vec<Node> = result
            .tables
            .iter()
            .enumerate()
            .map(|(i, table)| node_for(table, layout.position(i), metrics))
            .collect();

        let mut edges = Vec::new();
        for (index, rel) in result.relationships.iter().enumerate() {
            let source_exists = nodes.iter().any(|n| n.id == rel.source_table);
            let target_exists = nodes.iter().any(|n| n.id == rel.target_table);
            if !source_exists || !target_exists {
                log::warn!(
                    "Skipping edge {}: node not found for {}",
                    rel.id,
                    if source_exists { &rel.target_table } else { &rel.source_table }
                );
                continue;
            }

            edges.push(Edge {
                id: format!("edge-{}", index),
                source: rel.source_table.clone(),
                target: rel.target_table.clone(),
                source_column: rel.source_column.clone(),
                target_column: rel.target_column.clone(),
                label: format!("{} -> {}", rel.source_column, rel.target_column),
            });
        }

        Self { nodes, edges }
    }
}

fn node_for(table: &Table, (x, y): (f64, f64), metrics: &TextMetrics) -> Node {
    let columns: Vec<NodeColumn> = table
        .columns
        .iter()
        .map(|c| NodeColumn {
            name: c.name.clone(),
            typ: c.declared_type.clone(),
            primary_key: c.is_primary_key,
            foreign_key: c.is_foreign_key(),
        })
        .collect();
    let (width, height) = metrics.node_size(&table.name, &columns);

    Node {
        id: table.name.clone(),
        label: table.name.clone(),
        columns,
        x,
        y,
        width,
        height,
    }
}
