//! Formula parser
//!
//! A hand-rolled shunting-yard pass from the token stream to an RPN program.
//! Two places recurse: a `(` directly after a function name opens that call's
//! first argument-group, and every top-level `,` opens the next one. An inner
//! argument-group parse discovers its own end by *underflow*: when a `)` or
//! `,` drains the group's operator stack without finding a left bracket, the
//! token belongs to the enclosing call — the group un-consumes it with
//! `step_back` and returns what it accumulated as a single operand. At the
//! top level the same underflow is a structural error.

use crate::error::{ErrorKind, FormulaError, FormulaResult};
use crate::lexer::TokenStream;
use crate::operand::Operand;
use crate::operation::{Operation, OperatorKind};
use crate::rpn::{Rpn, RpnItem};
use crate::token::{CellRef, NameRef, RangeRef, TokenKind};
use gridcalc_core::Value;

/// Parse a formula into an RPN program.
///
/// `ws_name` is the worksheet the formula lives on; references without their
/// own worksheet qualification inherit it. A leading `=` is accepted and
/// stripped.
///
/// # Example
/// ```rust
/// use gridcalc_formula::parse;
///
/// let rpn = parse("SUM(A1:A10)*2", "Sheet 1").unwrap();
/// assert_eq!(rpn.src(), "SUM(A1:A10)*2");
/// ```
pub fn parse(formula: &str, ws_name: &str) -> FormulaResult<Rpn> {
    let text = formula.trim();
    let text = text.strip_prefix('=').unwrap_or(text);

    let mut line = TokenStream::lex(text, ws_name)?;
    let parser = Parser { ws_name };
    let items = parser.shunt(&mut line, false)?;
    log::trace!("parsed {:?} into {} rpn items", text, items.len());
    Ok(Rpn::new(items, text.to_string()))
}

/// Entries of the transient operator stack
enum StackItem {
    Op(Operation),
    Bracket,
}

struct Parser<'a> {
    ws_name: &'a str,
}

impl Parser<'_> {
    /// One shunting pass. `in_argument` marks an argument-group recursion,
    /// which turns stack underflow on `)`/`,` into the hand-back contract
    /// instead of an error.
    fn shunt(&self, line: &mut TokenStream, in_argument: bool) -> FormulaResult<Vec<RpnItem>> {
        let mut result: Vec<RpnItem> = Vec::new();
        let mut stack: Vec<StackItem> = Vec::new();

        while !line.is_ended() {
            let Some(token) = line.next().cloned() else {
                break;
            };

            match token.kind {
                TokenKind::Float(n) | TokenKind::Int(n) => {
                    result.push(RpnItem::Operand(Operand::Value(Value::Number(n))));
                }
                TokenKind::Bool(b) => {
                    result.push(RpnItem::Operand(Operand::Value(Value::Bool(b))));
                }
                TokenKind::Str(s) => {
                    result.push(RpnItem::Operand(Operand::Value(Value::String(s))));
                }
                TokenKind::SingleCell(cell) => {
                    result.push(RpnItem::Operand(self.cell_operand(cell)));
                }
                TokenKind::CellsRange(range) => {
                    result.push(RpnItem::Operand(self.range_operand(range)));
                }
                TokenKind::NamedRange(name) => {
                    result.push(RpnItem::Operand(self.named_range_operand(name)));
                }

                TokenKind::Function(name) => {
                    stack.push(StackItem::Op(Operation::function(name)));
                }

                TokenKind::LeftBracket => {
                    stack.push(StackItem::Bracket);
                    // A bracket right after a function name opens the call's
                    // first argument-group; the call itself stays on the
                    // stack to receive the close.
                    if matches!(line.prev().map(|t| &t.kind), Some(TokenKind::Function(_))) {
                        let group = self.argument_group(line)?;
                        result.push(RpnItem::Operand(group));
                    }
                }

                TokenKind::RightBracket => {
                    let mut matched = false;
                    while let Some(item) = stack.pop() {
                        match item {
                            StackItem::Bracket => {
                                matched = true;
                                break;
                            }
                            StackItem::Op(op) => result.push(RpnItem::Operation(op)),
                        }
                    }
                    if !matched {
                        // This close belongs to the enclosing call.
                        if in_argument {
                            line.step_back();
                            return Ok(result);
                        }
                        return Err(self.structural(ErrorKind::InconsistentParentheses, line));
                    }
                }

                TokenKind::Separator => {
                    loop {
                        match stack.last() {
                            Some(StackItem::Bracket) => break,
                            Some(StackItem::Op(_)) => {
                                if let Some(StackItem::Op(op)) = stack.pop() {
                                    result.push(RpnItem::Operation(op));
                                }
                            }
                            None => {
                                // This separator belongs to the enclosing call.
                                if in_argument {
                                    line.step_back();
                                    return Ok(result);
                                }
                                return Err(
                                    self.structural(ErrorKind::SeparatorOutsideFunction, line)
                                );
                            }
                        }
                    }
                    // The call owning the bracket below the top has one more
                    // argument.
                    let below_top = stack.len().wrapping_sub(2);
                    if let Some(StackItem::Op(op)) = stack.get_mut(below_top) {
                        if matches!(op, Operation::Function { .. }) {
                            op.bump_operands_count();
                        }
                    }
                    let group = self.argument_group(line)?;
                    result.push(RpnItem::Operand(group));
                }

                TokenKind::Space => {}

                ref kind => {
                    if let Some(op) = OperatorKind::from_token(kind) {
                        let operation = if self.is_unary(op, line) {
                            Operation::unary_operator(op)
                        } else {
                            Operation::operator(op)
                        };
                        while matches!(
                            stack.last(),
                            Some(StackItem::Op(top)) if top.priority() >= operation.priority()
                        ) {
                            if let Some(StackItem::Op(popped)) = stack.pop() {
                                result.push(RpnItem::Operation(popped));
                            }
                        }
                        stack.push(StackItem::Op(operation));
                    }
                }
            }
        }

        while let Some(item) = stack.pop() {
            match item {
                StackItem::Bracket => {
                    return Err(self.structural(ErrorKind::InconsistentParentheses, line))
                }
                StackItem::Op(op) => result.push(RpnItem::Operation(op)),
            }
        }

        Ok(result)
    }

    /// Parse one argument-group. A single accumulated operand passes through
    /// unwrapped; anything else (several entries, or a lone operation) wraps
    /// into a sub-expression-group operand.
    fn argument_group(&self, line: &mut TokenStream) -> FormulaResult<Operand> {
        let mut items = self.shunt(line, true)?;
        if items.len() == 1 {
            match items.pop() {
                Some(RpnItem::Operand(operand)) => return Ok(operand),
                Some(item) => items.push(item),
                None => {}
            }
        }
        Ok(Operand::Rpn(Rpn::new(items, line.src().to_string())))
    }

    /// An arithmetic `+`/`-` is unary when nothing precedes it, or the
    /// preceding token is an operator, a left bracket or a separator.
    fn is_unary(&self, op: OperatorKind, line: &TokenStream) -> bool {
        if !matches!(op, OperatorKind::Add | OperatorKind::Subtract) {
            return false;
        }
        match line.prev() {
            None => true,
            Some(t) => {
                t.kind.is_operator()
                    || matches!(t.kind, TokenKind::LeftBracket | TokenKind::Separator)
            }
        }
    }

    fn cell_operand(&self, cell: CellRef) -> Operand {
        Operand::SingleCell {
            row: cell.row,
            column: cell.column,
            ws_name: self.resolve_ws(cell.ws_name),
        }
    }

    fn range_operand(&self, range: RangeRef) -> Operand {
        Operand::CellRange {
            row1: range.row1,
            column1: range.column1,
            row2: range.row2,
            column2: range.column2,
            ws_name: self.resolve_ws(range.ws_name),
        }
    }

    fn named_range_operand(&self, name: NameRef) -> Operand {
        Operand::NamedRange {
            name: name.name,
            ws_name: self.resolve_ws(name.ws_name),
        }
    }

    /// Token-level worksheet qualification overrides the inherited default
    fn resolve_ws(&self, token_ws: Option<String>) -> String {
        token_ws.unwrap_or_else(|| self.ws_name.to_string())
    }

    fn structural(&self, kind: ErrorKind, line: &TokenStream) -> FormulaError {
        FormulaError::new(kind)
            .with_formula(line.src())
            .with_ws(self.ws_name)
    }
}
