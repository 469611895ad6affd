//! SQL DDL to schema model conversion.
//!
//! The pipeline runs strictly forward: comments are stripped, the text is
//! tokenized, `CREATE TABLE` blocks are extracted, each block becomes a
//! [`Table`], and relationships are resolved over the finished tables.

mod clause;
mod error;
mod extract;
mod lexer;
mod preprocess;
mod relations;

use std::collections::HashMap;

pub use clause::{Clause, ColumnClause, classify, split_clauses};
pub use error::{Diagnostic, SqlParseError};
pub use extract::TableBlock;
pub use lexer::{Lexer, Token};
pub use preprocess::preprocess;

use crate::mermaid;
use crate::model::{ParseResult, Table};
use error::Diagnostics;

/// Parser settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Link `<table>_id` columns when no explicit foreign key resolves.
    pub infer_relationships: bool,
    /// Parenthesis depth at which the input is rejected as hostile.
    pub max_nesting_depth: usize,
    /// Inputs longer than this are rejected without scanning.
    pub max_input_bytes: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            infer_relationships: true,
            max_nesting_depth: 256,
            max_input_bytes: 16 * 1024 * 1024,
        }
    }
}

/// A parse result together with everything that was skipped on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed {
    pub result: ParseResult,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Default)]
pub struct Parser {
    options: ParseOptions,
}

impl Parser {
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }

    /// Parse DDL text. Never fails: a rejected input yields an empty result.
    pub fn parse(&self, input: &str) -> ParseResult {
        match self.parse_detailed(input) {
            Ok(parsed) => parsed.result,
            Err(e) => {
                log::error!("Error parsing SQL: {}", e);
                ParseResult::empty()
            }
        }
    }

    /// Parse DDL text, reporting diagnostics and hard failures.
    pub fn parse_detailed(&self, input: &str) -> Result<Parsed, SqlParseError> {
        if input.len() > self.options.max_input_bytes {
            return Err(SqlParseError::InputTooLarge {
                size: input.len(),
                limit: self.options.max_input_bytes,
            });
        }

        let text = preprocess(input);
        if text.is_empty() {
            log::debug!("Empty SQL provided");
            return Ok(Parsed {
                result: ParseResult::empty(),
                diagnostics: vec![],
            });
        }

        let mut diagnostics = Diagnostics::default();
        let tokens = Lexer::new(&text).tokenize();
        let blocks =
            extract::extract_tables(&tokens, self.options.max_nesting_depth, &mut diagnostics)?;
        let tables = assemble_tables(&blocks, &mut diagnostics);
        let relationships = relations::build_relationships(
            &tables,
            self.options.infer_relationships,
            &mut diagnostics,
        );
        let diagram_text = mermaid::encode(&tables, &relationships);

        log::debug!(
            "Parsed {} tables, {} relationships",
            tables.len(),
            relationships.len()
        );

        Ok(Parsed {
            result: ParseResult {
                tables,
                relationships,
                diagram_text,
            },
            diagnostics: diagnostics.into_vec(),
        })
    }
}

/// Build tables in first-seen order; a redefined name takes the later body.
fn assemble_tables(blocks: &[TableBlock], diagnostics: &mut Diagnostics) -> Vec<Table> {
    let mut tables: Vec<Table> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for block in blocks {
        let table = clause::build_table(block, diagnostics);
        match index.get(&table.name) {
            Some(&pos) => {
                diagnostics.push(Diagnostic::DuplicateTable {
                    table: table.name.clone(),
                });
                tables[pos] = table;
            }
            None => {
                index.insert(table.name.clone(), tables.len());
                tables.push(table);
            }
        }
    }

    tables
}
