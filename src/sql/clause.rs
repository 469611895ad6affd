//! Table body clause splitting and classification.

use super::error::{Diagnostic, Diagnostics};
use super::extract::TableBlock;
use super::lexer::{Token, render};
use crate::model::{Column, DEFAULT_REF_COLUMN, ForeignKey, ReferentialAction, Table};

/// One top-level, comma-separated segment of a table body.
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    /// `PRIMARY KEY (a, b)`
    PrimaryKey(Vec<String>),
    /// `FOREIGN KEY (a) REFERENCES t (b)`, one entry per column pair.
    ForeignKey(Vec<ForeignKey>),
    Column(ColumnClause),
    /// Neither a key constraint nor a `name type` pair; holds the clause text.
    Unrecognized(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnClause {
    pub column: Column,
    /// Set when the constraint tail carries `REFERENCES`.
    pub inline_fk: Option<ForeignKey>,
}

/// Words that can open a table-level constraint. Most are not reserved, so
/// `key TEXT` is still a column; see `Cursor::opens_table_constraint`.
const CONSTRAINT_KEYWORDS: &[&str] = &[
    "CONSTRAINT", "PRIMARY", "FOREIGN", "UNIQUE", "CHECK", "KEY", "INDEX", "FULLTEXT",
    "SPATIAL", "EXCLUDE", "LIKE", "PERIOD",
];

/// Index-style constraints: `KEY [name] (cols)`, `UNIQUE [KEY] [name] (cols)`.
const INDEX_KEYWORDS: &[&str] = &["UNIQUE", "KEY", "INDEX", "FULLTEXT", "SPATIAL"];

/// Build a table from its block: classify every clause, then reconcile the
/// per-column key flags with the table-level key lists.
pub(crate) fn build_table(block: &TableBlock, diagnostics: &mut Diagnostics) -> Table {
    let mut columns: Vec<Column> = Vec::new();
    let mut primary_keys: Vec<String> = Vec::new();
    let mut foreign_keys: Vec<ForeignKey> = Vec::new();

    for tokens in split_clauses(&block.body) {
        match classify(tokens) {
            Clause::PrimaryKey(cols) => {
                for col in cols {
                    push_unique(&mut primary_keys, col);
                }
            }
            Clause::ForeignKey(fks) => foreign_keys.extend(fks),
            Clause::Column(ColumnClause { column, inline_fk }) => {
                if column.is_primary_key {
                    push_unique(&mut primary_keys, column.name.clone());
                }
                if let Some(fk) = inline_fk {
                    foreign_keys.push(fk);
                }
                columns.push(column);
            }
            Clause::Unrecognized(clause) => diagnostics.push(Diagnostic::UnrecognizedClause {
                table: block.name.clone(),
                clause,
            }),
        }
    }

    for col in &mut columns {
        if primary_keys.contains(&col.name) {
            col.is_primary_key = true;
        }
        if col.references.is_none() {
            col.references = foreign_keys
                .iter()
                .find(|fk| fk.column == col.name)
                .map(ForeignKey::target);
        }
    }

    Table {
        name: block.name.clone(),
        columns,
        primary_keys,
        foreign_keys,
    }
}

fn push_unique(list: &mut Vec<String>, name: String) {
    if !list.contains(&name) {
        list.push(name);
    }
}

/// Split on commas at nesting depth zero, dropping empty segments.
pub fn split_clauses(body: &[Token]) -> Vec<&[Token]> {
    let mut clauses = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (idx, token) in body.iter().enumerate() {
        match token {
            Token::LParen => depth += 1,
            Token::RParen => depth = depth.saturating_sub(1),
            Token::Comma if depth == 0 => {
                clauses.push(&body[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    clauses.push(&body[start..]);

    clauses.retain(|c| !c.is_empty());
    clauses
}

/// Classify one clause. Key constraints take priority over column parsing.
pub fn classify(tokens: &[Token]) -> Clause {
    let mut cursor = Cursor { tokens, pos: 0 };
    let unrecognized = || Clause::Unrecognized(render(tokens));

    // CONSTRAINT <name> prefix on table-level constraints
    if cursor.current().is_keyword("CONSTRAINT") {
        cursor.advance();
        let opens_constraint = CONSTRAINT_KEYWORDS
            .iter()
            .any(|kw| cursor.current().is_keyword(kw));
        if !opens_constraint && cursor.current().as_identifier().is_some() {
            cursor.advance();
        }
    }

    if cursor.eat_keywords(&["PRIMARY", "KEY"]) {
        return match cursor.parse_name_list() {
            Some(cols) if !cols.is_empty() => Clause::PrimaryKey(cols),
            _ => unrecognized(),
        };
    }

    if cursor.eat_keywords(&["FOREIGN", "KEY"]) {
        return match cursor.parse_foreign_key() {
            Some(fks) => Clause::ForeignKey(fks),
            None => unrecognized(),
        };
    }

    if cursor.pos > 0 || cursor.opens_table_constraint() {
        return unrecognized();
    }

    match cursor.parse_column() {
        Some(column) => Clause::Column(column),
        None => unrecognized(),
    }
}

struct Cursor<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl Cursor<'_> {
    fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&Token::Eof)
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.pos + 1).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn token_at(&self, offset: usize) -> &Token {
        self.tokens.get(self.pos + offset).unwrap_or(&Token::Eof)
    }

    /// Whether the clause at the cursor is a table-level constraint such as
    /// `KEY idx (a)`, `CHECK (x > 0)` or `PERIOD FOR ...`, as opposed to a
    /// column whose name happens to be one of those words.
    fn opens_table_constraint(&self) -> bool {
        let first = self.current();
        let next = self.peek();

        if first.is_keyword("LIKE") || first.is_keyword("CONSTRAINT") {
            // Reserved in every dialect; a column must quote them
            return true;
        }
        if first.is_keyword("CHECK") {
            return next == &Token::LParen;
        }
        if first.is_keyword("EXCLUDE") {
            return next == &Token::LParen || next.is_keyword("USING");
        }
        if first.is_keyword("PERIOD") {
            return next.is_keyword("FOR");
        }
        if !INDEX_KEYWORDS.iter().any(|kw| first.is_keyword(kw)) {
            return false;
        }

        // Optional KEY/INDEX, optional index name, then a list of column
        // names. `key VARCHAR(10)` has a numeric list, so it is a column.
        let mut offset = 1;
        if self.token_at(offset).is_keyword("KEY") || self.token_at(offset).is_keyword("INDEX") {
            offset += 1;
        }
        let name = self.token_at(offset);
        if !name.is_keyword("USING") && name.as_identifier().is_some() {
            offset += 1;
        }
        if self.token_at(offset).is_keyword("USING") {
            offset += 2;
        }
        self.token_at(offset) == &Token::LParen
            && self.token_at(offset + 1).as_identifier().is_some()
    }

    /// Consume the keyword sequence if it is next; otherwise stay put.
    fn eat_keywords(&mut self, keywords: &[&str]) -> bool {
        let matched = keywords.iter().enumerate().all(|(i, kw)| {
            self.tokens
                .get(self.pos + i)
                .is_some_and(|t| t.is_keyword(kw))
        });
        if matched {
            self.pos += keywords.len();
        }
        matched
    }

    fn parse_column(&mut self) -> Option<ColumnClause> {
        let name = self.current().as_identifier()?.to_string();
        self.advance();

        let declared_type = match self.current() {
            Token::Word(t) | Token::Quoted(t) => t.clone(),
            _ => return None,
        };
        self.advance();

        let mut column = Column::new(name, declared_type);
        let mut inline_fk = None;

        // Constraint tail
        loop {
            match self.current() {
                Token::Eof => break,
                Token::LParen => {
                    // Type arguments, CHECK (...), DEFAULT (...)
                    self.skip_parenthesized();
                }
                t if t.is_keyword("PRIMARY") && self.peek().is_keyword("KEY") => {
                    self.pos += 2;
                    column.is_primary_key = true;
                }
                t if t.is_keyword("NOT") && self.peek().is_keyword("NULL") => {
                    self.pos += 2;
                    column.not_null = true;
                }
                t if t.is_keyword("UNIQUE") => {
                    self.advance();
                    self.eat_keywords(&["KEY"]);
                    column.unique = true;
                }
                t if t.is_keyword("REFERENCES") => {
                    self.advance();
                    if let Some((ref_table, ref_columns)) = self.parse_reference() {
                        let ref_column = ref_columns
                            .into_iter()
                            .next()
                            .unwrap_or_else(|| DEFAULT_REF_COLUMN.to_string());
                        let mut fk = ForeignKey::new(column.name.clone(), ref_table, ref_column);
                        (fk.on_delete, fk.on_update) = self.parse_actions();
                        column.references = Some(fk.target());
                        inline_fk = Some(fk);
                    }
                }
                _ => self.advance(),
            }
        }

        Some(ColumnClause { column, inline_fk })
    }

    /// After `FOREIGN KEY`: `(cols) REFERENCES table [(cols)] [ON ...]`.
    fn parse_foreign_key(&mut self) -> Option<Vec<ForeignKey>> {
        let columns = self.parse_name_list()?;
        if columns.is_empty() || !self.eat_keywords(&["REFERENCES"]) {
            return None;
        }
        let (ref_table, ref_columns) = self.parse_reference()?;
        let (on_delete, on_update) = self.parse_actions();

        let fks = columns
            .into_iter()
            .enumerate()
            .map(|(i, column)| ForeignKey {
                column,
                ref_table: ref_table.clone(),
                ref_column: ref_columns
                    .get(i)
                    .cloned()
                    .unwrap_or_else(|| DEFAULT_REF_COLUMN.to_string()),
                on_delete,
                on_update,
            })
            .collect();
        Some(fks)
    }

    /// After `REFERENCES`: `table [(cols)]`, `schema.table` keeps the last part.
    fn parse_reference(&mut self) -> Option<(String, Vec<String>)> {
        let mut table = self.current().as_identifier()?.to_string();
        self.advance();

        while self.current() == &Token::Dot {
            match self.peek().as_identifier() {
                Some(part) => {
                    table = part.to_string();
                    self.pos += 2;
                }
                None => break,
            }
        }

        let columns = if self.current() == &Token::LParen {
            self.parse_name_list()?
        } else {
            vec![]
        };

        Some((table, columns))
    }

    /// `ON DELETE <action>` / `ON UPDATE <action>`, in either order.
    fn parse_actions(&mut self) -> (Option<ReferentialAction>, Option<ReferentialAction>) {
        let mut on_delete = None;
        let mut on_update = None;

        while self.current().is_keyword("ON") {
            let is_delete = self.peek().is_keyword("DELETE");
            if !is_delete && !self.peek().is_keyword("UPDATE") {
                break;
            }
            self.pos += 2;

            let action = self.parse_action();
            if is_delete {
                on_delete = action;
            } else {
                on_update = action;
            }
        }

        (on_delete, on_update)
    }

    fn parse_action(&mut self) -> Option<ReferentialAction> {
        if self.eat_keywords(&["CASCADE"]) {
            Some(ReferentialAction::Cascade)
        } else if self.eat_keywords(&["RESTRICT"]) {
            Some(ReferentialAction::Restrict)
        } else if self.eat_keywords(&["SET", "NULL"]) {
            Some(ReferentialAction::SetNull)
        } else if self.eat_keywords(&["SET", "DEFAULT"]) {
            Some(ReferentialAction::SetDefault)
        } else if self.eat_keywords(&["NO", "ACTION"]) {
            Some(ReferentialAction::NoAction)
        } else {
            None
        }
    }

    /// `(a, b DESC, c(10))` -> `[a, b, c]`. `None` if unterminated.
    fn parse_name_list(&mut self) -> Option<Vec<String>> {
        if self.current() != &Token::LParen {
            return None;
        }
        self.advance();

        let mut names = Vec::new();
        let mut depth = 1usize;
        let mut element_named = false;

        loop {
            match self.current() {
                Token::Eof => return None,
                Token::LParen => depth += 1,
                Token::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        self.advance();
                        return Some(names);
                    }
                }
                Token::Comma if depth == 1 => element_named = false,
                t if depth == 1 && !element_named => {
                    if let Some(name) = t.as_identifier() {
                        names.push(name.trim().to_string());
                        element_named = true;
                    }
                }
                _ => {}
            }
            self.advance();
        }
    }

    fn skip_parenthesized(&mut self) {
        if self.current() != &Token::LParen {
            self.advance();
            return;
        }
        self.advance();
        let mut depth = 1;
        while depth > 0 {
            match self.current() {
                Token::LParen => depth += 1,
                Token::RParen => depth -= 1,
                Token::Eof => break,
                _ => {}
            }
            self.advance();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ColumnRef;
    use crate::sql::lexer::Lexer;

    fn clause(sql: &str) -> Clause {
        classify(&Lexer::new(sql).tokenize())
    }

    fn table(name: &str, body: &str) -> (Table, Vec<Diagnostic>) {
        let block = TableBlock {
            name: name.to_string(),
            body: Lexer::new(body).tokenize(),
        };
        let mut diagnostics = Diagnostics::default();
        let table = build_table(&block, &mut diagnostics);
        (table, diagnostics.into_vec())
    }

    #[test]
    fn test_split_ignores_nested_commas() {
        let tokens = Lexer::new("id INT, price DECIMAL(10,2), PRIMARY KEY (a, b),").tokenize();
        let clauses = split_clauses(&tokens);

        assert_eq!(clauses.len(), 3);
        assert_eq!(render(clauses[1]), "price DECIMAL(10, 2)");
        assert_eq!(render(clauses[2]), "PRIMARY KEY(a, b)");
    }

    #[test]
    fn test_classify_primary_key() {
        assert_eq!(
            clause("PRIMARY KEY (`order_id`, \"line\")"),
            Clause::PrimaryKey(vec!["order_id".to_string(), "line".to_string()])
        );
        assert_eq!(
            clause("CONSTRAINT pk_items PRIMARY KEY (id)"),
            Clause::PrimaryKey(vec!["id".to_string()])
        );
    }

    #[test]
    fn test_classify_foreign_key_defaults_ref_column() {
        assert_eq!(
            clause("FOREIGN KEY (customer_id) REFERENCES customers"),
            Clause::ForeignKey(vec![ForeignKey::new("customer_id", "customers", "id")])
        );
    }

    #[test]
    fn test_classify_foreign_key_with_actions() {
        let Clause::ForeignKey(fks) = clause(
            "CONSTRAINT fk_user FOREIGN KEY (user_id) REFERENCES app.users (uid) ON DELETE SET NULL ON UPDATE CASCADE",
        ) else {
            panic!("expected foreign key");
        };

        assert_eq!(fks.len(), 1);
        assert_eq!(fks[0].ref_table, "users");
        assert_eq!(fks[0].ref_column, "uid");
        assert_eq!(fks[0].on_delete, Some(ReferentialAction::SetNull));
        assert_eq!(fks[0].on_update, Some(ReferentialAction::Cascade));
    }

    #[test]
    fn test_composite_foreign_key_pairs_columns() {
        let Clause::ForeignKey(fks) =
            clause("FOREIGN KEY (order_id, line_no) REFERENCES order_lines (order_id, line_no)")
        else {
            panic!("expected foreign key");
        };

        assert_eq!(fks.len(), 2);
        assert_eq!(fks[1].column, "line_no");
        assert_eq!(fks[1].ref_column, "line_no");
    }

    #[test]
    fn test_classify_column_with_inline_constraints() {
        let Clause::Column(ColumnClause { column, inline_fk }) = clause(
            "`customer_id` INT NOT NULL UNIQUE REFERENCES customers(id) ON DELETE CASCADE",
        ) else {
            panic!("expected column");
        };

        assert_eq!(column.name, "customer_id");
        assert_eq!(column.declared_type, "INT");
        assert!(column.not_null);
        assert!(column.unique);
        assert!(!column.is_primary_key);
        assert_eq!(column.references.as_ref().map(|r| r.table.as_str()), Some("customers"));

        let fk = inline_fk.unwrap();
        assert_eq!(fk.ref_column, "id");
        assert_eq!(fk.on_delete, Some(ReferentialAction::Cascade));
    }

    #[test]
    fn test_type_arguments_are_not_part_of_type() {
        let Clause::Column(ColumnClause { column, .. }) = clause("price DECIMAL(10,2) CHECK (price > 0)")
        else {
            panic!("expected column");
        };

        assert_eq!(column.declared_type, "DECIMAL");
        assert!(!column.is_primary_key);
    }

    #[test]
    fn test_keywords_inside_check_or_strings_are_ignored() {
        let Clause::Column(parsed) = clause(
            "note TEXT DEFAULT 'PRIMARY KEY' CHECK (note <> 'REFERENCES x')",
        ) else {
            panic!("expected column");
        };

        assert!(!parsed.column.is_primary_key);
        assert!(parsed.inline_fk.is_none());
    }

    #[test]
    fn test_unrecognized_clauses() {
        assert!(matches!(clause("UNIQUE (email)"), Clause::Unrecognized(_)));
        assert!(matches!(clause("CHECK (price > 0)"), Clause::Unrecognized(_)));
        assert!(matches!(clause("KEY idx_name (name)"), Clause::Unrecognized(_)));
        assert!(matches!(clause("UNIQUE KEY uk_email (email)"), Clause::Unrecognized(_)));
        assert!(matches!(clause("INDEX idx USING BTREE (name)"), Clause::Unrecognized(_)));
        assert!(matches!(clause("UNIQUE USING HASH (code)"), Clause::Unrecognized(_)));
        assert!(matches!(
            clause("PERIOD FOR SYSTEM_TIME (valid_from, valid_to)"),
            Clause::Unrecognized(_)
        ));
        assert!(matches!(clause("LIKE parent INCLUDING ALL"), Clause::Unrecognized(_)));
        assert!(matches!(clause("lonely"), Clause::Unrecognized(_)));
        assert!(matches!(clause("PRIMARY KEY"), Clause::Unrecognized(_)));
        assert!(matches!(
            clause("FOREIGN KEY (a) REFERENCES"),
            Clause::Unrecognized(_)
        ));
    }

    #[test]
    fn test_table_level_keys_mark_earlier_columns() {
        let (table, diagnostics) = table(
            "orders",
            "id INT, customer_id INT, PRIMARY KEY (id), FOREIGN KEY (customer_id) REFERENCES customers(id)",
        );

        assert!(diagnostics.is_empty());
        assert_eq!(table.primary_keys, vec!["id"]);
        assert!(table.columns[0].is_primary_key);

        let customer_id = table.column("customer_id").unwrap();
        assert!(customer_id.is_foreign_key());
        assert_eq!(
            customer_id.references,
            Some(ColumnRef {
                table: "customers".to_string(),
                column: "id".to_string()
            })
        );
    }

    #[test]
    fn test_primary_key_declared_twice_is_unioned() {
        let (table, _) = table("t", "id INT PRIMARY KEY, code INT, PRIMARY KEY (id, code)");

        assert_eq!(table.primary_keys, vec!["id", "code"]);
        assert!(table.columns.iter().all(|c| c.is_primary_key));
    }

    #[test]
    fn test_inline_reference_appends_constraint() {
        let (table, _) = table("orders", "id INT, customer_id INT REFERENCES customers");

        assert_eq!(
            table.foreign_keys,
            vec![ForeignKey::new("customer_id", "customers", "id")]
        );
    }

    #[test]
    fn test_unrecognized_clause_is_dropped_and_parsing_continues() {
        let (table, diagnostics) = table("t", "id INT, CHECK (id > 0), name TEXT");

        assert_eq!(table.columns.len(), 2);
        assert_eq!(
            diagnostics,
            vec![Diagnostic::UnrecognizedClause {
                table: "t".to_string(),
                clause: "CHECK(id > 0)".to_string()
            }]
        );
    }

    #[test]
    fn test_non_reserved_keywords_as_column_names() {
        let (table, diagnostics) = table(
            "settings",
            "key TEXT PRIMARY KEY, value TEXT, period VARCHAR(10), index INT, check BOOLEAN NOT NULL",
        );

        assert!(diagnostics.is_empty());
        let names: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["key", "value", "period", "index", "check"]);
        assert_eq!(table.primary_keys, vec!["key"]);
        assert!(table.columns[0].is_primary_key);
        assert_eq!(table.columns[2].declared_type, "VARCHAR");
        assert!(table.columns[4].not_null);
    }

    #[test]
    fn test_key_column_with_type_arguments_is_not_an_index() {
        let Clause::Column(ColumnClause { column, .. }) = clause("key VARCHAR(64) UNIQUE") else {
            panic!("expected a column");
        };
        assert_eq!(column.name, "key");
        assert!(column.unique);
    }
}
