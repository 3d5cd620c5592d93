use super::{ast::*, lexer::*};
use crate::common::*;
use logos_iter::LogosIter;
use tracing::debug;

type PResult<T = Node> = Result<T, ParseError>;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("unexpected input on line {line}, col {col}: expected {}, got {got}", fmt_expected(.expected))]
pub struct ParseError {
    pub line: usize,
    pub col: usize,
    pub got: String,
    pub expected: Vec<String>,
}

fn fmt_expected(expected: &[String]) -> String {
    match expected {
        [] => String::from("nothing"),
        [one] => one.clone(),
        [a, b] => format!("{} or {}", a, b),
        [rest @ .., last] => format!("{}, or {}", rest.join(", "), last),
    }
}

pub(crate) struct Parser<'a> {
    source: &'a str,
    lexer: Lexer<'a>,
    ambiguities: &'static [TokenKind],
    /// Offset of the last consumed token that could also start a comment.
    last_ambiguity: Option<usize>,
}

impl<'a> Parser<'a> {
    const ATOM_START: &'static [TokenKind] = &[
        TokenKind::LeftParen,
        TokenKind::Integer,
        TokenKind::Decimal,
        TokenKind::Dice,
        TokenKind::Plus,
        TokenKind::Minus,
    ];

    const CONTINUATIONS: &'static [TokenKind] = &[
        TokenKind::Plus,
        TokenKind::Minus,
        TokenKind::Star,
        TokenKind::Slash,
        TokenKind::SlashSlash,
        TokenKind::Percent,
        TokenKind::LessThan,
        TokenKind::GreaterThan,
        TokenKind::LessEqual,
        TokenKind::GreaterEqual,
        TokenKind::EqualEqual,
        TokenKind::BangEqual,
    ];

    pub fn new(source: &'a str) -> Self {
        Self::with_ambiguities(source, &[])
    }

    pub fn with_ambiguities(source: &'a str, ambiguities: &'static [TokenKind]) -> Self {
        Self {
            source,
            lexer: lexer(source),
            ambiguities,
            last_ambiguity: None,
        }
    }

    pub fn parse_expression(mut self) -> PResult<Expression> {
        let roll = self.parse_comparison()?;
        if self.lexer.peek().is_some() {
            return self.unexpected_token(Self::CONTINUATIONS);
        }
        Ok(Expression::new(roll, None))
    }

    pub fn parse_commented_expression(&mut self) -> PResult<Expression> {
        let roll = self.parse_comparison()?;
        let comment = match self.lexer.next() {
            None => None,
            Some(_) => {
                let start = self.lexer.span().start;
                let (expr, rest) = self.source.split_at(start);
                if !expr.ends_with(char::is_whitespace) {
                    let got = self.lexer.slice().to_string();
                    let mut expected: Vec<_> =
                        Self::CONTINUATIONS.iter().map(ToString::to_string).collect();
                    expected.push(String::from("<whitespace>"));
                    return Err(self.error_at(start, got, expected));
                }
                Some(rest.trim().to_string()).filter(|c| !c.is_empty())
            }
        };
        Ok(Expression::new(roll, comment))
    }

    fn advance(&mut self) -> Option<TokenKind> {
        let token = self.lexer.next()?;
        if self.ambiguities.contains(&token) {
            self.last_ambiguity = Some(self.lexer.span().start);
        } else if !TokenKind::SELECTORS.contains(&token) {
            self.last_ambiguity = None;
        }
        Some(token)
    }

    fn matches(&mut self, kind: TokenKind) -> bool {
        self.lexer.peek().map_or(false, |&peeked| peeked == kind)
    }

    fn consume(&mut self, expected: TokenKind) -> PResult<()> {
        if self.matches(expected) {
            self.advance();
            Ok(())
        } else {
            self.unexpected_token(&[expected])
        }
    }

    fn error_at(&self, offset: usize, got: String, expected: Vec<String>) -> ParseError {
        let before = &self.source[..offset];
        let line = before.matches('\n').count() + 1;
        let col = before.rsplit('\n').next().unwrap_or("").chars().count() + 1;
        ParseError {
            line,
            col,
            got,
            expected,
        }
    }

    fn unexpected_token<T>(&mut self, expected: &[TokenKind]) -> PResult<T> {
        let (offset, got) = match self.lexer.next() {
            Some(_) => (self.lexer.span().start, self.lexer.slice().to_string()),
            None => (self.source.len(), String::from("end of input")),
        };
        let expected = expected.iter().map(ToString::to_string).collect();
        Err(self.error_at(offset, got, expected))
    }

    fn invalid_literal(&self, expected: TokenKind) -> ParseError {
        self.error_at(
            self.lexer.span().start,
            self.lexer.slice().to_string(),
            vec![expected.to_string()],
        )
    }

    fn parse_int(&self) -> PResult<Int> {
        self.lexer
            .slice()
            .parse()
            .map_err(|_| self.invalid_literal(TokenKind::Integer))
    }

    fn match_binary(&mut self, ops: &[TokenKind]) -> Option<BinaryOperator> {
        let op = self
            .lexer
            .peek()
            .filter(|peeked| ops.contains(*peeked))
            .and_then(TokenKind::as_binary_op)?;
        self.advance();
        Some(op)
    }

    fn parse_comparison(&mut self) -> PResult {
        let mut lhs = self.parse_addition()?;
        while let Some(op) = self.match_binary(TokenKind::COMPARISON_OPS) {
            let rhs = self.parse_addition()?;
            lhs = Node::binop(lhs, op, rhs);
        }
        Ok(lhs)
    }

    fn parse_addition(&mut self) -> PResult {
        let mut lhs = self.parse_multiplication()?;
        while let Some(op) = self.match_binary(TokenKind::ADDITION_OPS) {
            let rhs = self.parse_multiplication()?;
            lhs = Node::binop(lhs, op, rhs);
        }
        Ok(lhs)
    }

    fn parse_multiplication(&mut self) -> PResult {
        let mut lhs = self.parse_unary_prefix()?;
        while let Some(op) = self.match_binary(TokenKind::MULTIPLICATION_OPS) {
            let rhs = self.parse_unary_prefix()?;
            lhs = Node::binop(lhs, op, rhs);
        }
        Ok(lhs)
    }

    fn parse_unary_prefix(&mut self) -> PResult {
        match self.lexer.peek().and_then(TokenKind::as_unary_op) {
            Some(op) => {
                self.advance();
                let value = self.parse_unary_prefix()?;
                Ok(Node::unop(op, value))
            }
            None => self.parse_atom(),
        }
    }

    fn parse_atom(&mut self) -> PResult {
        let value = match self.lexer.peek().copied() {
            Some(TokenKind::Integer) => {
                self.advance();
                Node::literal(self.parse_int()?)
            }
            Some(TokenKind::Decimal) => {
                self.advance();
                let x: Float = self
                    .lexer
                    .slice()
                    .parse()
                    .map_err(|_| self.invalid_literal(TokenKind::Decimal))?;
                Node::literal(x)
            }
            Some(TokenKind::Dice) => self.parse_dice()?,
            Some(TokenKind::LeftParen) => self.parse_set_or_parens()?,
            _ => return self.unexpected_token(Self::ATOM_START),
        };

        let mut annotations = Vec::new();
        while self.matches(TokenKind::Annotation) {
            self.advance();
            annotations.push(self.lexer.slice().trim().to_string());
        }

        Ok(if annotations.is_empty() {
            value
        } else {
            Node::annotated(value, annotations)
        })
    }

    fn parse_set_or_parens(&mut self) -> PResult {
        self.consume(TokenKind::LeftParen)?;

        let mut values = Vec::new();
        let mut trailing_comma = false;
        if !self.matches(TokenKind::RightParen) {
            values.push(self.parse_comparison()?);
            while self.matches(TokenKind::Comma) {
                self.advance();
                trailing_comma = true;
                if self.matches(TokenKind::RightParen) {
                    break;
                }
                values.push(self.parse_comparison()?);
                trailing_comma = false;
            }
        }

        if !self.matches(TokenKind::RightParen) {
            return self.unexpected_token(&[TokenKind::Comma, TokenKind::RightParen]);
        }
        self.advance();

        let set = match values.pop() {
            Some(value) if values.is_empty() && !trailing_comma => Node::parenthetical(value),
            Some(value) => {
                values.push(value);
                Node::set(values)
            }
            None => Node::set(values),
        };

        let ops = self.parse_operations(TokenKind::SET_OPERATORS)?;
        Ok(if ops.is_empty() {
            set
        } else {
            Node::operated(set, ops)
        })
    }

    fn parse_dice(&mut self) -> PResult {
        self.consume(TokenKind::Dice)?;

        let slice = self.lexer.slice();
        let (num, size) = slice
            .split_once('d')
            .ok_or_else(|| self.invalid_literal(TokenKind::Dice))?;
        let num = if num.is_empty() {
            1
        } else {
            num.parse()
                .map_err(|_| self.invalid_literal(TokenKind::Dice))?
        };
        let size = if size == "%" {
            DiceSize::Percentile
        } else {
            DiceSize::Int(
                size.parse()
                    .map_err(|_| self.invalid_literal(TokenKind::Dice))?,
            )
        };

        let dice = Node::dice(num, size);
        let ops = self.parse_operations(TokenKind::DICE_OPERATORS)?;
        Ok(if ops.is_empty() {
            dice
        } else {
            Node::operated(dice, ops)
        })
    }

    fn parse_operations(&mut self, allowed: &[TokenKind]) -> PResult<Vec<SetOperator>> {
        let mut ops = Vec::new();
        while let Some(op) = self
            .lexer
            .peek()
            .filter(|peeked| allowed.contains(*peeked))
            .and_then(TokenKind::as_set_op)
        {
            self.advance();
            let sel = self.parse_selector()?;
            ops.push(SetOperator::new(op, sel));
        }
        Ok(ops)
    }

    fn parse_selector(&mut self) -> PResult<SetSelector> {
        let cat = match self.lexer.peek().and_then(TokenKind::as_selector) {
            Some(cat) => {
                self.advance();
                cat
            }
            None if self.matches(TokenKind::Integer) => SetSelectorKind::EqualTo,
            None => {
                let mut expected = TokenKind::SELECTORS.to_vec();
                expected.push(TokenKind::Integer);
                return self.unexpected_token(&expected);
            }
        };
        self.consume(TokenKind::Integer)?;
        let num = self.parse_int()?;
        Ok(SetSelector::new(cat, num))
    }
}

pub(crate) fn parse_commented(
    source: &str,
    ambiguities: &'static [TokenKind],
) -> PResult<Expression> {
    let mut parser = Parser::with_ambiguities(source, ambiguities);
    let err = match parser.parse_commented_expression() {
        Ok(expr) => return Ok(expr),
        Err(err) => err,
    };
    let Some(split) = parser.last_ambiguity else {
        return Err(err);
    };

    let (head, comment) = source.split_at(split);
    debug!(expr = head, comment, "retrying parse with ambiguous operator as comment");
    match Parser::new(head).parse_commented_expression() {
        Ok(mut expr) => {
            expr.comment = Some(comment.to_string());
            Ok(expr)
        }
        Err(_) => Err(err),
    }
}
