use crate::common::*;
use logos::{Lexer as LogosLexer, Logos};
use logos_iter::{LogosIter, PeekableLexer};
use std::fmt;

pub type Lexer<'a> = PeekableLexer<'a, LogosLexer<'a, TokenKind>, TokenKind>;

pub fn lexer(s: &str) -> Lexer {
    TokenKind::lexer(s).peekable_lexer()
}

#[derive(Logos, Debug, Copy, Clone, Eq, PartialEq)]
pub enum TokenKind {
    #[regex(r"[0-9]+")]
    Integer,
    #[regex(r"([0-9]+\.[0-9]*)|(\.[0-9]+)")]
    Decimal,
    #[regex(r"[0-9]*d(%|[0-9]+)")]
    Dice,

    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,
    #[token(",")]
    Comma,

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("//")]
    SlashSlash,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("==")]
    EqualEqual,
    #[token(">=")]
    GreaterEqual,
    #[token("<=")]
    LessEqual,
    #[token("!=")]
    BangEqual,
    #[token("<")]
    LessThan,
    #[token(">")]
    GreaterThan,

    #[token("k")]
    Keep,
    #[token("p")]
    Drop,
    #[token("rr")]
    Reroll,
    #[token("ro")]
    RerollOnce,
    #[token("ra")]
    RerollAdd,
    #[token("e")]
    Explode,
    #[token("mi")]
    Minimum,
    #[token("ma")]
    Maximum,

    #[token("l")]
    Lowest,
    #[token("h")]
    Highest,

    #[regex(r"\[[^\]]*\]")]
    Annotation,

    #[regex(r"[ \t\r\n\f]+", logos::skip)]
    #[error]
    Error,
}

impl TokenKind {
    pub const COMPARISON_OPS: &'static [Self] = &[
        Self::LessThan,
        Self::GreaterThan,
        Self::LessEqual,
        Self::GreaterEqual,
        Self::EqualEqual,
        Self::BangEqual,
    ];

    pub const ADDITION_OPS: &'static [Self] = &[Self::Plus, Self::Minus];

    pub const MULTIPLICATION_OPS: &'static [Self] =
        &[Self::Star, Self::Slash, Self::SlashSlash, Self::Percent];

    pub const UNARY_OPS: &'static [Self] = &[Self::Plus, Self::Minus];

    pub const SET_OPERATORS: &'static [Self] = &[Self::Keep, Self::Drop];

    pub const DICE_OPERATORS: &'static [Self] = &[
        Self::Keep,
        Self::Drop,
        Self::Reroll,
        Self::RerollOnce,
        Self::RerollAdd,
        Self::Explode,
        Self::Minimum,
        Self::Maximum,
    ];

    // No category letter means "equal to"
    pub const SELECTORS: &'static [Self] = &[
        Self::Lowest,
        Self::Highest,
        Self::LessThan,
        Self::GreaterThan,
    ];

    pub const COMMENT_AMBIGUITIES: &'static [Self] = &[
        Self::Star,
        Self::Keep,
        Self::Drop,
        Self::Reroll,
        Self::RerollOnce,
        Self::RerollAdd,
        Self::Explode,
        Self::Minimum,
        Self::Maximum,
    ];

    pub fn as_str(&self) -> &'static str {
        use TokenKind::*;

        match self {
            Integer => "<integer>",
            Decimal => "<decimal>",
            Dice => "<dice>",
            LeftParen => "'('",
            RightParen => "')'",
            Comma => "','",
            Plus => "'+'",
            Minus => "'-'",
            Star => "'*'",
            Slash => "'/'",
            SlashSlash => "'//'",
            Percent => "'%'",
            EqualEqual => "'=='",
            GreaterEqual => "'>='",
            LessEqual => "'<='",
            BangEqual => "'!='",
            LessThan => "'<'",
            GreaterThan => "'>'",
            Keep => "'k'",
            Drop => "'p'",
            Reroll => "'rr'",
            RerollOnce => "'ro'",
            RerollAdd => "'ra'",
            Explode => "'e'",
            Minimum => "'mi'",
            Maximum => "'ma'",
            Lowest => "'l'",
            Highest => "'h'",
            Annotation => "<annotation>",
            Error => "<error>",
        }
    }

    pub fn as_unary_op(&self) -> Option<UnaryOperator> {
        use UnaryOperator::*;
        Some(match self {
            Self::Plus => Pos,
            Self::Minus => Neg,
            _ => return None,
        })
    }

    pub fn as_binary_op(&self) -> Option<BinaryOperator> {
        use BinaryOperator::*;
        Some(match self {
            Self::Plus => Add,
            Self::Minus => Sub,
            Self::Star => Mul,
            Self::Slash => Div,
            Self::SlashSlash => Flr,
            Self::Percent => Rem,
            Self::LessThan => Lt,
            Self::GreaterThan => Gt,
            Self::LessEqual => Le,
            Self::GreaterEqual => Ge,
            Self::EqualEqual => Eq,
            Self::BangEqual => Ne,
            _ => return None,
        })
    }

    pub fn as_set_op(&self) -> Option<SetOperatorKind> {
        use SetOperatorKind::*;
        Some(match self {
            Self::Keep => Keep,
            Self::Drop => Drop,
            Self::Reroll => Reroll,
            Self::RerollOnce => RerollOnce,
            Self::RerollAdd => ExplodeOnce,
            Self::Explode => Explode,
            Self::Minimum => Minimum,
            Self::Maximum => Maximum,
            _ => return None,
        })
    }

    pub fn as_selector(&self) -> Option<SetSelectorKind> {
        use SetSelectorKind::*;
        Some(match self {
            Self::Lowest => Lowest,
            Self::Highest => Highest,
            Self::LessThan => LessThan,
            Self::GreaterThan => GreaterThan,
            _ => return None,
        })
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use TokenKind::*;

    fn check(s: &str, expected: &[TokenKind]) {
        let actual: Vec<_> = TokenKind::lexer(s).collect();
        assert_eq!(expected, &actual[..], "lexing {:?}", s);
    }

    #[test]
    fn test_lex_dice() {
        check("d20", &[Dice]);
        check("4d6kh3", &[Dice, Keep, Highest, Integer]);
        check("1d%", &[Dice]);
        check("0d0", &[Dice]);
        check("10d4rol2mi5", &[Dice, RerollOnce, Lowest, Integer, Minimum, Integer]);
    }

    #[test]
    fn test_lex_numbers() {
        check("12 1.5 .5 3.", &[Integer, Decimal, Decimal, Decimal]);
        check("1 // 2 / 3", &[Integer, SlashSlash, Integer, Slash, Integer]);
        check("1<=2!=3", &[Integer, LessEqual, Integer, BangEqual, Integer]);
    }

    #[test]
    fn test_lex_annotations() {
        check("1d6 [fire] []", &[Dice, Annotation, Annotation]);
        check("1 [", &[Integer, Error]);
    }
}
