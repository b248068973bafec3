// SQL Parser
// Converts one statement into a typed Statement by recursive descent over the token stream

use super::lexer::{self, is_keyword, Lexed};
use crate::error::{DbError, Result};
use crate::storage::PRIMARY_KEY;
use sqlparser::tokenizer::Token;

/// The statements the engine understands, one variant per command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// CREATE TABLE name (col type, ...)
    CreateTable {
        name: String,
        columns: Vec<ColumnDef>,
    },
    /// DROP TABLE name
    DropTable { name: String },
    /// INSERT INTO name VALUES (v1, v2, ...)
    /// Values bind positionally and are coerced against the schema on execution
    Insert { table: String, values: Vec<String> },
    /// SELECT * FROM name [WHERE id = n]
    Select {
        table: String,
        projection: Projection,
        filter: Option<KeyFilter>,
    },
    /// SELECT ... FROM left JOIN right ON ...
    /// `on` is kept for display only; it is never evaluated
    Join {
        left: String,
        right: String,
        on: String,
    },
    /// UPDATE name SET c1 = v1, ... WHERE id = n
    Update {
        table: String,
        assignments: Vec<Assignment>,
        filter: KeyFilter,
    },
    /// DELETE FROM name WHERE id = n
    Delete { table: String, filter: KeyFilter },
    /// Any statement whose leading keyword is not recognized
    Unknown { keyword: String },
}

impl Statement {
    /// True for statements that never modify the database
    pub fn is_read_only(&self) -> bool {
        matches!(
            self,
            Statement::Select { .. } | Statement::Join { .. } | Statement::Unknown { .. }
        )
    }
}

/// A column declaration from CREATE TABLE, with its raw type token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub type_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    All,
    Columns(Vec<String>),
}

/// `column = value` from an UPDATE's SET clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub column: String,
    pub value: String,
}

/// The only predicate supported: `id = <integer>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyFilter {
    pub id: i64,
}

/// Leading keywords that have a statement form
const COMMANDS: &[&str] = &["CREATE", "DROP", "INSERT", "SELECT", "UPDATE", "DELETE"];

/// The query parser
pub struct QueryParser {
    lexed: Lexed,
    position: usize,
}

impl QueryParser {
    /// Parse a SQL string into a Statement
    /// This is the main entry point for parsing SQL
    pub fn parse(sql: &str) -> Result<Statement> {
        let sql = sql.trim();

        // Classify before tokenizing so an unknown command never fails on its body
        let leading: String = sql
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
            .collect::<String>()
            .to_uppercase();
        if !COMMANDS.contains(&leading.as_str()) {
            let keyword = sql.split_whitespace().next().unwrap_or("").to_uppercase();
            return Ok(Statement::Unknown { keyword });
        }

        let mut parser = Self {
            lexed: lexer::tokenize(sql)?,
            position: 0,
        };
        parser.parse_statement()
    }

    fn parse_statement(&mut self) -> Result<Statement> {
        let keyword = match self.peek() {
            None => {
                return Ok(Statement::Unknown {
                    keyword: String::new(),
                })
            }
            Some(Token::Word(w)) if w.quote_style.is_none() => w.value.to_uppercase(),
            Some(other) => {
                return Ok(Statement::Unknown {
                    keyword: other.to_string(),
                })
            }
        };

        let statement = match keyword.as_str() {
            "CREATE" => self.parse_create_table()?,
            "DROP" => self.parse_drop_table()?,
            "INSERT" => self.parse_insert()?,
            "SELECT" if self.contains_keyword("JOIN") => self.parse_join()?,
            "SELECT" => self.parse_select()?,
            "UPDATE" => self.parse_update()?,
            "DELETE" => self.parse_delete()?,
            _ => return Ok(Statement::Unknown { keyword }),
        };

        // A trailing semicolon is optional
        if self.peek() == Some(&Token::SemiColon) {
            self.position += 1;
        }
        if let Some(token) = self.peek() {
            return Err(DbError::syntax(format!(
                "unexpected '{}' after end of statement",
                token
            )));
        }

        Ok(statement)
    }

    /// CREATE TABLE name ( col type [, col type]* )
    fn parse_create_table(&mut self) -> Result<Statement> {
        self.expect_keyword("CREATE")?;
        self.expect_keyword("TABLE")?;
        let name = self.parse_identifier("table name")?;
        self.expect_token(&Token::LParen)?;

        let mut columns = Vec::new();
        loop {
            columns.push(self.parse_column_def()?);
            match self.next() {
                Some(Token::Comma) => continue,
                Some(Token::RParen) => break,
                Some(other) => {
                    return Err(DbError::syntax(format!("expected ',' or ')', found '{}'", other)))
                }
                None => return Err(DbError::syntax("expected ')' to close the column list")),
            }
        }

        Ok(Statement::CreateTable { name, columns })
    }

    /// `name type`, followed by anything the type may carry (`varchar(20)`, `primary key`),
    /// which is skipped
    fn parse_column_def(&mut self) -> Result<ColumnDef> {
        let name = self.parse_identifier("column name")?;
        // Any single token names the type
        let type_name = match self.next() {
            Some(Token::Word(w)) => w.value,
            Some(Token::Comma) | Some(Token::RParen) | None => {
                return Err(DbError::syntax(format!(
                    "expected a type for column '{}'",
                    name
                )))
            }
            Some(other) => other.to_string(),
        };

        let mut depth = 0usize;
        while let Some(token) = self.peek() {
            match token {
                Token::Comma | Token::RParen if depth == 0 => break,
                Token::LParen => depth += 1,
                Token::RParen => depth -= 1,
                _ => {}
            }
            self.position += 1;
        }

        Ok(ColumnDef { name, type_name })
    }

    /// DROP TABLE name
    fn parse_drop_table(&mut self) -> Result<Statement> {
        self.expect_keyword("DROP")?;
        self.expect_keyword("TABLE")?;
        let name = self.parse_identifier("table name")?;
        Ok(Statement::DropTable { name })
    }

    /// INSERT INTO name VALUES ( v1 [, v2]* )
    fn parse_insert(&mut self) -> Result<Statement> {
        self.expect_keyword("INSERT")?;
        self.expect_keyword("INTO")?;
        let table = self.parse_identifier("table name")?;
        self.expect_keyword("VALUES")?;
        self.expect_token(&Token::LParen)?;

        let mut values = Vec::new();
        if self.peek() == Some(&Token::RParen) {
            self.position += 1;
        } else {
            loop {
                values.push(self.parse_literal()?);
                match self.next() {
                    Some(Token::Comma) => continue,
                    Some(Token::RParen) => break,
                    Some(other) => {
                        return Err(DbError::syntax(format!(
                            "expected ',' or ')', found '{}'",
                            other
                        )))
                    }
                    None => return Err(DbError::syntax("expected ')' to close the value list")),
                }
            }
        }

        Ok(Statement::Insert { table, values })
    }

    /// SELECT projection FROM name [WHERE id = n]
    fn parse_select(&mut self) -> Result<Statement> {
        self.expect_keyword("SELECT")?;

        let projection = if self.peek() == Some(&Token::Mul) {
            self.position += 1;
            Projection::All
        } else {
            let mut columns = vec![self.parse_identifier("column name or '*'")?];
            while self.peek() == Some(&Token::Comma) {
                self.position += 1;
                columns.push(self.parse_identifier("column name")?);
            }
            Projection::Columns(columns)
        };

        self.expect_keyword("FROM")?;
        let table = self.parse_identifier("table name")?;

        let filter = if self.peek_keyword("WHERE") {
            Some(self.parse_key_filter()?)
        } else {
            None
        };

        Ok(Statement::Select {
            table,
            projection,
            filter,
        })
    }

    /// SELECT ... FROM left [INNER] JOIN right ON ...
    /// The projection is not used, and the ON clause is captured as text
    fn parse_join(&mut self) -> Result<Statement> {
        self.expect_keyword("SELECT")?;
        while self.peek().is_some() && !self.peek_keyword("FROM") {
            self.position += 1;
        }
        self.expect_keyword("FROM")?;
        let left = self.parse_identifier("left table name")?;
        if self.peek_keyword("INNER") {
            self.position += 1;
        }
        self.expect_keyword("JOIN")?;
        let right = self.parse_identifier("right table name")?;
        self.expect_keyword("ON")?;

        let mut end = self.lexed.tokens.len();
        if self.lexed.tokens.last() == Some(&Token::SemiColon) {
            end -= 1;
        }
        if end <= self.position {
            return Err(DbError::syntax("expected a predicate after ON"));
        }
        let on = self.lexed.text(self.position..end);
        self.position = end;

        Ok(Statement::Join { left, right, on })
    }

    /// UPDATE name SET c1 = v1 [, c2 = v2]* WHERE id = n
    fn parse_update(&mut self) -> Result<Statement> {
        self.expect_keyword("UPDATE")?;
        let table = self.parse_identifier("table name")?;
        self.expect_keyword("SET")?;

        let mut assignments = Vec::new();
        loop {
            let column = self.parse_identifier("column name")?;
            self.expect_token(&Token::Eq)?;
            let value = self.parse_literal()?;
            assignments.push(Assignment { column, value });

            if self.peek() == Some(&Token::Comma) {
                self.position += 1;
            } else {
                break;
            }
        }

        if !self.peek_keyword("WHERE") {
            return Err(DbError::syntax("UPDATE requires WHERE clause"));
        }
        let filter = self.parse_key_filter()?;

        Ok(Statement::Update {
            table,
            assignments,
            filter,
        })
    }

    /// DELETE FROM name WHERE id = n
    fn parse_delete(&mut self) -> Result<Statement> {
        self.expect_keyword("DELETE")?;
        self.expect_keyword("FROM")?;
        let table = self.parse_identifier("table name")?;

        if !self.peek_keyword("WHERE") {
            return Err(DbError::syntax("DELETE requires WHERE clause"));
        }
        let filter = self.parse_key_filter()?;

        Ok(Statement::Delete { table, filter })
    }

    /// WHERE id = n
    /// Any column other than the primary key is rejected
    fn parse_key_filter(&mut self) -> Result<KeyFilter> {
        self.expect_keyword("WHERE")?;
        let column = self.parse_identifier("column name")?;
        if !column.eq_ignore_ascii_case(PRIMARY_KEY) {
            return Err(DbError::UnsupportedPredicate(column));
        }
        self.expect_token(&Token::Eq)?;

        let raw = self.parse_literal()?;
        let cleaned = raw.trim_matches(|c| c == '"' || c == '\'').trim();
        let id = cleaned.parse::<i64>().map_err(|_| DbError::TypeCoercion {
            column: PRIMARY_KEY.to_string(),
            value: cleaned.to_string(),
        })?;

        Ok(KeyFilter { id })
    }

    /// A single value
    ///
    /// Quoted strings are one token. Unquoted text runs until the next ',', ')',
    /// ';' or WHERE and is taken as written, so `John  Doe` and `a@b.com` survive intact.
    fn parse_literal(&mut self) -> Result<String> {
        match self.peek() {
            Some(Token::SingleQuotedString(s)) | Some(Token::DoubleQuotedString(s)) => {
                let s = s.clone();
                self.position += 1;
                return Ok(s);
            }
            Some(Token::Word(w)) if w.quote_style.is_some() => {
                let s = w.value.clone();
                self.position += 1;
                return Ok(s);
            }
            _ => {}
        }

        let start = self.position;
        while let Some(token) = self.peek() {
            if matches!(token, Token::Comma | Token::RParen | Token::SemiColon)
                || is_keyword(token, "WHERE")
            {
                break;
            }
            self.position += 1;
        }

        if self.position == start {
            return Err(DbError::syntax("expected a value"));
        }
        Ok(self.lexed.text(start..self.position))
    }

    fn parse_identifier(&mut self, what: &str) -> Result<String> {
        match self.next() {
            Some(Token::Word(w)) => Ok(w.value),
            Some(other) => Err(DbError::syntax(format!(
                "expected {}, found '{}'",
                what, other
            ))),
            None => Err(DbError::syntax(format!("expected {}", what))),
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<()> {
        match self.next() {
            Some(token) if is_keyword(&token, keyword) => Ok(()),
            Some(other) => Err(DbError::syntax(format!(
                "expected {}, found '{}'",
                keyword, other
            ))),
            None => Err(DbError::syntax(format!("expected {}", keyword))),
        }
    }

    fn expect_token(&mut self, expected: &Token) -> Result<()> {
        match self.next() {
            Some(token) if &token == expected => Ok(()),
            Some(other) => Err(DbError::syntax(format!(
                "expected '{}', found '{}'",
                expected, other
            ))),
            None => Err(DbError::syntax(format!("expected '{}'", expected))),
        }
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        self.peek().is_some_and(|t| is_keyword(t, keyword))
    }

    fn contains_keyword(&self, keyword: &str) -> bool {
        self.lexed.tokens.iter().any(|t| is_keyword(t, keyword))
    }

    fn peek(&self) -> Option<&Token> {
        self.lexed.tokens.get(self.position)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.lexed.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }
}
