//! Lexical tokens
//!
//! Each token kind owns an anchored pattern; [`match_token`] tries the
//! patterns at the current scan position in a fixed declared priority order,
//! most specific first, and the first match wins. Address patterns run before
//! the bare-word named-range fallback (which matches almost anything), and
//! the function-name pattern runs before the boolean and address patterns so
//! `TRUE(` and `LOG10(` lex as calls.
//!
//! Tokens are per-scan: they are produced by the lexer, consumed immediately
//! by the parser, and never persisted.

use gridcalc_core::address::column_index;
use lazy_regex::regex;

/// A single-cell reference decoded from formula text.
///
/// Row and column are 1-based; the column comes from the bijective base-26
/// letter run. The `$` anchors are preserved but semantically inert here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellRef {
    pub document: Option<String>,
    pub ws_name: Option<String>,
    pub row: u32,
    pub column: u32,
    pub row_fixed: bool,
    pub column_fixed: bool,
}

/// A range reference. Either corner's row and column are independently
/// optional; an absent component denotes an open-ended range (a whole row or
/// column span, clamped to the sheet extent at resolution time).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeRef {
    pub document: Option<String>,
    pub ws_name: Option<String>,
    pub row1: Option<u32>,
    pub column1: Option<u32>,
    pub row2: Option<u32>,
    pub column2: Option<u32>,
    pub row1_fixed: bool,
    pub column1_fixed: bool,
    pub row2_fixed: bool,
    pub column2_fixed: bool,
}

/// A named-range reference with its optional worksheet qualification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameRef {
    pub document: Option<String>,
    pub ws_name: Option<String>,
    pub name: String,
}

/// Token kinds with their decoded payloads (~20 kinds)
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    Float(f64),
    Int(f64),
    Bool(bool),
    Str(String),

    // References
    SingleCell(CellRef),
    CellsRange(RangeRef),
    NamedRange(NameRef),

    // Function name (uppercase run immediately followed by `(`)
    Function(String),

    // Operators
    Add,
    Subtract,
    Multiply,
    Divide,
    Concat,
    Exponent,
    Eq,
    NotEq,
    Gt,
    Gte,
    Lt,
    Lte,

    // Structure
    LeftBracket,
    RightBracket,
    Separator,
    Space,
}

impl TokenKind {
    /// True for tokens the parser turns into operands
    pub fn is_operand(&self) -> bool {
        matches!(
            self,
            TokenKind::Float(_)
                | TokenKind::Int(_)
                | TokenKind::Bool(_)
                | TokenKind::Str(_)
                | TokenKind::SingleCell(_)
                | TokenKind::CellsRange(_)
                | TokenKind::NamedRange(_)
        )
    }

    /// True for arithmetic and comparison operator tokens
    pub fn is_operator(&self) -> bool {
        matches!(
            self,
            TokenKind::Add
                | TokenKind::Subtract
                | TokenKind::Multiply
                | TokenKind::Divide
                | TokenKind::Concat
                | TokenKind::Exponent
                | TokenKind::Eq
                | TokenKind::NotEq
                | TokenKind::Gt
                | TokenKind::Gte
                | TokenKind::Lt
                | TokenKind::Lte
        )
    }
}

/// A lexed token: kind tag, matched source text, byte offset in the formula
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub src: String,
    pub pos: usize,
}

/// Try every token pattern at the start of `rest`, in declared priority
/// order. Returns the winning kind and matched byte length, or `None` when
/// nothing matches (a lexical failure).
pub(crate) fn match_token(rest: &str) -> Option<(TokenKind, usize)> {
    if let Some(m) = regex!(r"^\d+\.\d+").find(rest) {
        let value = m.as_str().parse().ok()?;
        return Some((TokenKind::Float(value), m.end()));
    }

    if let Some(m) = regex!(r#"^"[^"]*""#).find(rest) {
        let inner = &m.as_str()[1..m.as_str().len() - 1];
        return Some((TokenKind::Str(inner.to_string()), m.end()));
    }

    // The regex crate has no lookahead, so the original `[A-Z]+(?=\()` form
    // becomes a run match plus a peek at the following byte; the `(` is not
    // consumed.
    if let Some(m) = regex!(r"^[A-Z]+").find(rest) {
        if rest[m.end()..].starts_with('(') {
            return Some((TokenKind::Function(m.as_str().to_string()), m.end()));
        }
    }

    if let Some(m) = regex!(r"^(?:TRUE|FALSE)").find(rest) {
        return Some((TokenKind::Bool(m.as_str() == "TRUE"), m.end()));
    }

    if let Some((range, len)) = match_cells_range(rest) {
        return Some((TokenKind::CellsRange(range), len));
    }

    if let Some((cell, len)) = match_single_cell(rest) {
        return Some((TokenKind::SingleCell(cell), len));
    }

    // After the address patterns: a bare digit run left of `:` belongs to an
    // open-ended row range, not to an integer literal.
    if let Some(m) = regex!(r"^\d+").find(rest) {
        let value = m.as_str().parse().ok()?;
        return Some((TokenKind::Int(value), m.end()));
    }

    if let Some((name, len)) = match_named_range(rest) {
        return Some((TokenKind::NamedRange(name), len));
    }

    let simple: &[(&str, TokenKind)] = &[
        ("<>", TokenKind::NotEq),
        (">=", TokenKind::Gte),
        ("<=", TokenKind::Lte),
        (">", TokenKind::Gt),
        ("<", TokenKind::Lt),
        ("=", TokenKind::Eq),
        ("+", TokenKind::Add),
        ("-", TokenKind::Subtract),
        ("*", TokenKind::Multiply),
        ("/", TokenKind::Divide),
        ("&", TokenKind::Concat),
        ("^", TokenKind::Exponent),
        ("(", TokenKind::LeftBracket),
        (")", TokenKind::RightBracket),
        (",", TokenKind::Separator),
    ];
    for (symbol, kind) in simple {
        if rest.starts_with(symbol) {
            return Some((kind.clone(), symbol.len()));
        }
    }

    if let Some(m) = regex!(r"^[ ]+").find(rest) {
        return Some((TokenKind::Space, m.end()));
    }

    None
}

fn match_single_cell(rest: &str) -> Option<(CellRef, usize)> {
    let caps = regex!(
        r"^(?:(?:\[(?P<doc>\w+)\])?(?P<ws>'[^']+'|\w+)?!)?(?P<colfix>\$)?(?P<col>[A-Z]+)(?P<rowfix>\$)?(?P<row>[0-9]+)\b"
    )
    .captures(rest)?;

    let cell = CellRef {
        document: caps.name("doc").map(|m| m.as_str().to_string()),
        ws_name: caps.name("ws").map(|m| clean_ws_name(m.as_str())),
        row: caps.name("row")?.as_str().parse().ok()?,
        column: column_index(caps.name("col")?.as_str()).ok()?,
        row_fixed: caps.name("rowfix").is_some(),
        column_fixed: caps.name("colfix").is_some(),
    };
    Some((cell, caps.get(0)?.end()))
}

fn match_cells_range(rest: &str) -> Option<(RangeRef, usize)> {
    let caps = regex!(
        r"^(?:(?:\[(?P<doc>\w+)\])?(?P<ws>'[^']+'|\w+)?!)?(?:(?P<col1fix>\$)?(?P<col1>[A-Z]+))?(?:(?P<row1fix>\$)?(?P<row1>[0-9]+))?:(?:(?P<col2fix>\$)?(?P<col2>[A-Z]+))?(?:(?P<row2fix>\$)?(?P<row2>[0-9]+))?\b"
    )
    .captures(rest)?;

    let parse_row = |name: &str| -> Option<Option<u32>> {
        match caps.name(name) {
            Some(m) => m.as_str().parse().ok().map(Some),
            None => Some(None),
        }
    };
    let parse_col = |name: &str| -> Option<Option<u32>> {
        match caps.name(name) {
            Some(m) => column_index(m.as_str()).ok().map(Some),
            None => Some(None),
        }
    };

    let range = RangeRef {
        document: caps.name("doc").map(|m| m.as_str().to_string()),
        ws_name: caps.name("ws").map(|m| clean_ws_name(m.as_str())),
        row1: parse_row("row1")?,
        column1: parse_col("col1")?,
        row2: parse_row("row2")?,
        column2: parse_col("col2")?,
        row1_fixed: caps.name("row1fix").is_some(),
        column1_fixed: caps.name("col1fix").is_some(),
        row2_fixed: caps.name("row2fix").is_some(),
        column2_fixed: caps.name("col2fix").is_some(),
    };
    Some((range, caps.get(0)?.end()))
}

fn match_named_range(rest: &str) -> Option<(NameRef, usize)> {
    let caps = regex!(
        r"^(?:(?:\[(?P<doc>\w+)\])?(?P<ws>'[^']+'|\w+)?!)?(?P<name>\w+)"
    )
    .captures(rest)?;

    let name = NameRef {
        document: caps.name("doc").map(|m| m.as_str().to_string()),
        ws_name: caps.name("ws").map(|m| clean_ws_name(m.as_str())),
        name: caps.name("name")?.as_str().to_string(),
    };
    Some((name, caps.get(0)?.end()))
}

/// Strip surrounding single quotes from a worksheet name
fn clean_ws_name(raw: &str) -> String {
    if let Some(stripped) = raw.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')) {
        stripped.to_string()
    } else {
        raw.to_string()
    }
}
