//! Formula lexer
//!
//! Scans formula text left to right into a [`TokenStream`]: an ordered,
//! replayable cursor over the tokens. Whitespace advances the scan position
//! but is not surfaced by the cursor. A position with no matching token
//! pattern aborts the scan with a lexical error naming the offending
//! fragment and byte offset.

use crate::error::{ErrorKind, FormulaError, FormulaResult};
use crate::token::{match_token, Token, TokenKind};

/// How much of the unmatched tail a lexical error quotes
const LEX_ERROR_FRAGMENT_LEN: usize = 12;

/// An ordered cursor over the tokens of one formula.
///
/// `next` advances and returns a token; `current` is the last token returned
/// and `prev` the one before it. `step_back` un-consumes exactly one token —
/// the parser uses it to hand a separator or closing bracket back to an
/// enclosing argument-group parse.
#[derive(Debug)]
pub struct TokenStream {
    src: String,
    tokens: Vec<Token>,
    pos: usize,
}

impl TokenStream {
    /// Lex a formula into a token stream. `ws_name` is only used to give
    /// lexical errors their worksheet context.
    pub fn lex(line: &str, ws_name: &str) -> FormulaResult<Self> {
        let mut tokens = Vec::new();
        let mut pos = 0;

        while pos < line.len() {
            let rest = &line[pos..];
            match match_token(rest) {
                Some((TokenKind::Space, len)) => pos += len,
                Some((kind, len)) => {
                    tokens.push(Token {
                        kind,
                        src: rest[..len].to_string(),
                        pos,
                    });
                    pos += len;
                }
                None => {
                    let fragment: String = rest.chars().take(LEX_ERROR_FRAGMENT_LEN).collect();
                    return Err(FormulaError::new(ErrorKind::Lex { fragment, pos })
                        .with_formula(line)
                        .with_ws(ws_name));
                }
            }
        }

        log::trace!("lexed {:?} into {} tokens", line, tokens.len());
        Ok(Self {
            src: line.to_string(),
            tokens,
            pos: 0,
        })
    }

    /// The formula text this stream was lexed from
    pub fn src(&self) -> &str {
        &self.src
    }

    /// Advance the cursor and return the consumed token
    pub fn next(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    /// The last token returned by `next`
    pub fn current(&self) -> Option<&Token> {
        self.pos.checked_sub(1).and_then(|i| self.tokens.get(i))
    }

    /// The token before `current`
    pub fn prev(&self) -> Option<&Token> {
        self.pos.checked_sub(2).and_then(|i| self.tokens.get(i))
    }

    /// Un-consume the most recently returned token
    pub fn step_back(&mut self) {
        self.pos = self.pos.saturating_sub(1);
    }

    /// True once every token has been consumed
    pub fn is_ended(&self) -> bool {
        self.pos >= self.tokens.len()
    }
}
