//! CREATE TABLE statement extraction.

use super::error::{Diagnostic, Diagnostics, SqlParseError};
use super::lexer::Token;

/// A table name with the tokens between its outer parentheses.
#[derive(Debug, Clone, PartialEq)]
pub struct TableBlock {
    pub name: String,
    pub body: Vec<Token>,
}

/// Find every `CREATE TABLE` in `tokens`, in order of appearance.
///
/// Unterminated or bodiless statements are skipped with a diagnostic. Only
/// nesting beyond `max_depth` aborts the scan.
pub(crate) fn extract_tables(
    tokens: &[Token],
    max_depth: usize,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<TableBlock>, SqlParseError> {
    let mut scanner = Scanner { tokens, pos: 0 };
    let mut blocks = Vec::new();

    while scanner.pos < tokens.len() {
        if !scanner.current().is_keyword("CREATE") {
            scanner.advance();
            continue;
        }
        scanner.advance();

        // CREATE [OR REPLACE] [GLOBAL|LOCAL] [TEMP|TEMPORARY|UNLOGGED] TABLE
        while ["OR", "REPLACE", "GLOBAL", "LOCAL", "TEMP", "TEMPORARY", "UNLOGGED"]
            .iter()
            .any(|kw| scanner.current().is_keyword(kw))
        {
            scanner.advance();
        }
        if !scanner.current().is_keyword("TABLE") {
            // CREATE INDEX, CREATE VIEW, ...
            continue;
        }
        scanner.advance();

        if scanner.current().is_keyword("IF") {
            scanner.advance();
            if scanner.current().is_keyword("NOT") {
                scanner.advance();
            }
            if scanner.current().is_keyword("EXISTS") {
                scanner.advance();
            }
        }

        let Some(name) = scanner.parse_table_name() else {
            diagnostics.push(Diagnostic::MissingTableName);
            continue;
        };

        if scanner.current() != &Token::LParen {
            diagnostics.push(Diagnostic::MissingBody { table: name });
            continue;
        }
        let open = scanner.pos;

        match find_matching_paren(tokens, open, max_depth, &name)? {
            Some(close) => {
                log::debug!("Found table: {}", name);
                blocks.push(TableBlock {
                    name,
                    body: tokens[open + 1..close].to_vec(),
                });
                scanner.pos = close + 1;
            }
            None => {
                diagnostics.push(Diagnostic::UnterminatedStatement { table: name });
                // Rescan the swallowed text so later statements still count
                scanner.pos = open + 1;
            }
        }
    }

    Ok(blocks)
}

/// Index of the parenthesis closing the one at `open`, tracked by depth.
fn find_matching_paren(
    tokens: &[Token],
    open: usize,
    max_depth: usize,
    table: &str,
) -> Result<Option<usize>, SqlParseError> {
    let mut depth = 0usize;

    for (idx, token) in tokens.iter().enumerate().skip(open) {
        match token {
            Token::LParen => {
                depth += 1;
                if depth > max_depth {
                    return Err(SqlParseError::NestingTooDeep {
                        table: table.to_string(),
                        limit: max_depth,
                    });
                }
            }
            Token::RParen => {
                depth -= 1;
                if depth == 0 {
                    return Ok(Some(idx));
                }
            }
            _ => {}
        }
    }

    Ok(None)
}

struct Scanner<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl Scanner<'_> {
    fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    /// Table name with quotes stripped; `schema.table` keeps the last part.
    fn parse_table_name(&mut self) -> Option<String> {
        let mut name = self.current().as_identifier()?.to_string();
        self.advance();

        while self.current() == &Token::Dot {
            let next = self.tokens.get(self.pos + 1).and_then(Token::as_identifier);
            match next {
                Some(part) => {
                    name = part.to_string();
                    self.pos += 2;
                }
                None => break,
            }
        }

        Some(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::lexer::{Lexer, render};

    fn extract(sql: &str) -> (Vec<TableBlock>, Vec<Diagnostic>) {
        let tokens = Lexer::new(sql).tokenize();
        let mut diagnostics = Diagnostics::default();
        let blocks = extract_tables(&tokens, 64, &mut diagnostics).unwrap();
        (blocks, diagnostics.into_vec())
    }

    #[test]
    fn test_nested_parens_do_not_truncate_body() {
        let sql = "CREATE TABLE products (id INT, price DECIMAL(10,2) CHECK (price > 0), name TEXT);";
        let (blocks, diagnostics) = extract(sql);

        assert!(diagnostics.is_empty());
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].name, "products");
        assert_eq!(
            render(&blocks[0].body),
            "id INT, price DECIMAL(10, 2) CHECK(price > 0), name TEXT"
        );
    }

    #[test]
    fn test_if_not_exists_and_quoted_names() {
        let sql = r#"
            create table if not exists `users` (id INT);
            CREATE TABLE "order items" (id INT);
            CREATE TABLE 'legacy' (id INT);
            CREATE TEMPORARY TABLE [scratch] (id INT);
        "#;
        let (blocks, _) = extract(sql);
        let names: Vec<&str> = blocks.iter().map(|b| b.name.as_str()).collect();

        assert_eq!(names, vec!["users", "order items", "legacy", "scratch"]);
    }

    #[test]
    fn test_schema_qualified_name() {
        let (blocks, _) = extract("CREATE TABLE public.accounts (id INT);");
        assert_eq!(blocks[0].name, "accounts");
    }

    #[test]
    fn test_other_statements_are_ignored() {
        let sql = r#"
            CREATE INDEX idx_users_email ON users (email);
            ALTER TABLE users ADD COLUMN age INT;
            CREATE VIEW v AS SELECT 1;
            CREATE TABLE users (id INT);
        "#;
        let (blocks, diagnostics) = extract(sql);

        assert_eq!(blocks.len(), 1);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_unterminated_statement_is_skipped() {
        let (blocks, diagnostics) = extract("CREATE TABLE broken (");

        assert!(blocks.is_empty());
        assert_eq!(
            diagnostics,
            vec![Diagnostic::UnterminatedStatement {
                table: "broken".to_string()
            }]
        );
    }

    #[test]
    fn test_statement_after_unterminated_one_is_found() {
        let sql = "CREATE TABLE a (id INT;\nCREATE TABLE b (id INT);";
        let (blocks, diagnostics) = extract(sql);

        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].name, "b");
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_missing_body() {
        let (blocks, diagnostics) = extract("CREATE TABLE copy AS SELECT * FROM src;");

        assert!(blocks.is_empty());
        assert_eq!(
            diagnostics,
            vec![Diagnostic::MissingBody {
                table: "copy".to_string()
            }]
        );
    }

    #[test]
    fn test_duplicates_are_kept_in_order() {
        let (blocks, _) = extract("CREATE TABLE t (a INT); CREATE TABLE t (b INT);");
        assert_eq!(blocks.len(), 2);
        assert_eq!(render(&blocks[1].body), "b INT");
    }

    #[test]
    fn test_nesting_limit() {
        let sql = format!("CREATE TABLE deep (x INT CHECK {}1{});", "(".repeat(100), ")".repeat(100));
        let tokens = Lexer::new(&sql).tokenize();
        let mut diagnostics = Diagnostics::default();
        let err = extract_tables(&tokens, 64, &mut diagnostics).unwrap_err();

        assert_eq!(
            err,
            SqlParseError::NestingTooDeep {
                table: "deep".to_string(),
                limit: 64
            }
        );
    }
}
