//! Parse failures and recoverable diagnostics.

use thiserror::Error;

/// Conditions that abort the whole parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SqlParseError {
    #[error("Input is {size} bytes, limit is {limit}")]
    InputTooLarge { size: usize, limit: usize },
    #[error("Parenthesis nesting exceeds {limit} levels in table {table}")]
    NestingTooDeep { table: String, limit: usize },
}

/// Conditions that skip one statement, clause or reference.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Diagnostic {
    #[error("CREATE TABLE {table} has no closing parenthesis; statement skipped")]
    UnterminatedStatement { table: String },
    #[error("CREATE TABLE {table} has no column list; statement skipped")]
    MissingBody { table: String },
    #[error("CREATE TABLE without a table name; statement skipped")]
    MissingTableName,
    #[error("Unrecognized clause in {table}: {clause}")]
    UnrecognizedClause { table: String, clause: String },
    #[error("Table {table} redefined; later definition wins")]
    DuplicateTable { table: String },
    #[error("Referenced table {ref_table} not found for FK {table}.{column}")]
    DanglingReference {
        table: String,
        column: String,
        ref_table: String,
    },
}

impl Diagnostic {
    /// Emit through the `log` facade.
    pub(crate) fn log(&self) {
        match self {
            Diagnostic::UnrecognizedClause { .. } | Diagnostic::DuplicateTable { .. } => {
                log::debug!("{}", self)
            }
            _ => log::warn!("{}", self),
        }
    }
}

/// Collects diagnostics in discovery order, logging each as it arrives.
#[derive(Debug, Default)]
pub(crate) struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn push(&mut self, diagnostic: Diagnostic) {
        diagnostic.log();
        self.items.push(diagnostic);
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}
