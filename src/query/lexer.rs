// Lexer
// Tokenizing is handed to the sqlparser crate; we only keep the meaningful tokens

use crate::error::Result;
use sqlparser::dialect::GenericDialect;
use sqlparser::tokenizer::{Token, Tokenizer};

/// Tokens of one statement with the whitespace that preceded each of them
#[derive(Debug, Clone, Default)]
pub struct Lexed {
    pub tokens: Vec<Token>,
    /// `gaps[i]` is the whitespace (and comments) between `tokens[i - 1]` and `tokens[i]`
    pub gaps: Vec<String>,
}

impl Lexed {
    /// Source text of `tokens[range]`, spacing included, as it was written
    pub fn text(&self, range: std::ops::Range<usize>) -> String {
        let first = range.start;
        let mut out = String::new();
        for i in range {
            if i > first {
                out.push_str(&self.gaps[i]);
            }
            out.push_str(&self.tokens[i].to_string());
        }
        out
    }
}

/// Split a statement into tokens, moving whitespace and comments into the gaps
pub fn tokenize(sql: &str) -> Result<Lexed> {
    let dialect = GenericDialect {};
    let raw = Tokenizer::new(&dialect, sql).tokenize()?;

    let mut lexed = Lexed::default();
    let mut gap = String::new();
    for token in raw {
        match token {
            Token::Whitespace(w) => gap.push_str(&w.to_string()),
            Token::EOF => {}
            token => {
                lexed.tokens.push(token);
                lexed.gaps.push(std::mem::take(&mut gap));
            }
        }
    }
    Ok(lexed)
}

/// True when the token is the given keyword, unquoted, in any case
pub fn is_keyword(token: &Token, keyword: &str) -> bool {
    match token {
        Token::Word(w) => w.quote_style.is_none() && w.value.eq_ignore_ascii_case(keyword),
        _ => false,
    }
}
