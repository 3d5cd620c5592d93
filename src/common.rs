use std::cmp::Ordering;
use std::fmt::{self, Write};
use std::iter::Sum;
use std::ops;

pub use vec1::vec1;

pub type Int = i64;
pub type UInt = u64;

pub type Float = f64;

pub type NonEmpty<T> = vec1::Vec1<T>;

#[derive(Debug, Copy, Clone)]
pub enum Value {
    Int(Int),
    Float(Float),
}

impl Value {
    pub const ZERO: Self = Self::Int(0);

    pub fn as_int(self) -> Int {
        match self {
            Self::Int(x) => x,
            Self::Float(x) => x as Int,
        }
    }

    pub fn as_float(self) -> Float {
        match self {
            Self::Int(x) => x as Float,
            Self::Float(x) => x,
        }
    }

    pub fn is_zero(self) -> bool {
        match self {
            Self::Int(x) => x == 0,
            Self::Float(x) => x == 0.0,
        }
    }

    pub fn unary(self, op: UnaryOperator) -> Self {
        match (op, self) {
            (UnaryOperator::Pos, _) => self,
            (UnaryOperator::Neg, Self::Int(x)) => x
                .checked_neg()
                .map_or(Self::Float(-(x as Float)), Self::Int),
            (UnaryOperator::Neg, Self::Float(x)) => Self::Float(-x),
        }
    }

    pub fn checked_binary(self, op: BinaryOperator, rhs: Self) -> Option<Self> {
        use BinaryOperator::*;

        if matches!(op, Div | Flr | Rem) && rhs.is_zero() {
            return None;
        }

        let (l, r) = (self.as_float(), rhs.as_float());
        let ints = match (self, rhs) {
            (Self::Int(a), Self::Int(b)) => Some((a, b)),
            _ => None,
        };

        let value = match op {
            Add => self + rhs,
            Sub => int_or_float(ints.and_then(|(a, b)| a.checked_sub(b)), l - r),
            Mul => int_or_float(ints.and_then(|(a, b)| a.checked_mul(b)), l * r),
            Div => Self::Float(l / r),
            Flr => match ints {
                Some((a, b)) => int_or_float(floor_div(a, b), (l / r).floor()),
                None => Self::Float((l / r).floor()),
            },
            Rem => match ints {
                Some((a, b)) => Self::Int(floor_rem(a, b)),
                None => Self::Float(float_rem(l, r)),
            },
            Lt => (self < rhs).into(),
            Gt => (self > rhs).into(),
            Le => (self <= rhs).into(),
            Ge => (self >= rhs).into(),
            Eq => (self == rhs).into(),
            Ne => (self != rhs).into(),
        };
        Some(value)
    }
}

fn int_or_float(checked: Option<Int>, fallback: Float) -> Value {
    checked.map_or(Value::Float(fallback), Value::Int)
}

fn floor_div(a: Int, b: Int) -> Option<Int> {
    let q = a.checked_div(b)?;
    if a % b != 0 && ((a < 0) != (b < 0)) {
        q.checked_sub(1)
    } else {
        Some(q)
    }
}

// The result takes the sign of the divisor.
fn floor_rem(a: Int, b: Int) -> Int {
    let m = a.checked_rem(b).unwrap_or(0);
    if m != 0 && ((m < 0) != (b < 0)) {
        m + b
    } else {
        m
    }
}

fn float_rem(a: Float, b: Float) -> Float {
    let m = a % b;
    if m != 0.0 && ((m < 0.0) != (b < 0.0)) {
        m + b
    } else {
        m
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a == b,
            _ => self.as_float() == other.as_float(),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a.partial_cmp(b),
            _ => self.as_float().partial_cmp(&other.as_float()),
        }
    }
}

impl ops::Add for Value {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        match (self, rhs) {
            (Self::Int(a), Self::Int(b)) => {
                int_or_float(a.checked_add(b), a as Float + b as Float)
            }
            _ => Self::Float(self.as_float() + rhs.as_float()),
        }
    }
}

impl Sum for Value {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, x| acc + x)
    }
}

impl From<i32> for Value {
    fn from(x: i32) -> Self {
        Self::Int(x.into())
    }
}

impl From<Int> for Value {
    fn from(x: Int) -> Self {
        Self::Int(x)
    }
}

impl From<Float> for Value {
    fn from(x: Float) -> Self {
        Self::Float(x)
    }
}

impl From<bool> for Value {
    fn from(x: bool) -> Self {
        Self::Int(x as Int)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(x) => fmt::Display::fmt(x, f),
            // never exponent notation, which does not lex back
            Self::Float(x) if x.is_finite() && x.fract() == 0.0 => write!(f, "{}.0", x),
            Self::Float(x) => fmt::Display::fmt(x, f),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum DiceSize {
    Int(UInt),
    /// `d%`: rolls 0, 10, ..., 90.
    Percentile,
}

impl fmt::Display for DiceSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(x) => fmt::Display::fmt(x, f),
            Self::Percentile => f.write_char('%'),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum UnaryOperator {
    Pos,
    Neg,
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Self::Pos => '+',
            Self::Neg => '-',
        };
        f.write_char(c)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Flr,
    Rem,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
}

impl BinaryOperator {
    pub const fn is_multiplicative(&self) -> bool {
        matches!(self, Self::Mul | Self::Div | Self::Flr | Self::Rem)
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Flr => "//",
            Self::Rem => "%",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Ge => ">=",
            Self::Eq => "==",
            Self::Ne => "!=",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum SetOperatorKind {
    Keep,
    Drop,
    Reroll,
    RerollOnce,
    ExplodeOnce,
    Explode,
    Minimum,
    Maximum,
}

impl SetOperatorKind {
    pub const fn is_immediate(&self) -> bool {
        matches!(self, Self::Minimum | Self::Maximum)
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Keep => "k",
            Self::Drop => "p",
            Self::Reroll => "rr",
            Self::RerollOnce => "ro",
            Self::ExplodeOnce => "ra",
            Self::Explode => "e",
            Self::Minimum => "mi",
            Self::Maximum => "ma",
        }
    }
}

impl fmt::Display for SetOperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct SetOperator {
    pub op: SetOperatorKind,
    pub sels: NonEmpty<SetSelector>,
}

impl SetOperator {
    pub fn new(op: SetOperatorKind, sel: SetSelector) -> Self {
        Self::with_sels(op, vec1![sel])
    }

    pub fn with_sels(op: SetOperatorKind, sels: NonEmpty<SetSelector>) -> Self {
        Self { op, sels }
    }

    pub fn add_sels(&mut self, sels: &mut Vec<SetSelector>) {
        self.sels.append(sels);
    }
}

impl fmt::Display for SetOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for sel in self.sels.iter() {
            write!(f, "{}{}", self.op, sel)?;
        }
        Ok(())
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum SetSelectorKind {
    Lowest,
    Highest,
    LessThan,
    GreaterThan,
    EqualTo,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct SetSelector {
    pub cat: SetSelectorKind,
    pub num: Int,
}

impl SetSelector {
    pub fn new(cat: SetSelectorKind, num: Int) -> Self {
        Self { cat, num }
    }
}

impl fmt::Display for SetSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cat {
            SetSelectorKind::Lowest => write!(f, "l{}", self.num),
            SetSelectorKind::Highest => write!(f, "h{}", self.num),
            SetSelectorKind::LessThan => write!(f, "<{}", self.num),
            SetSelectorKind::GreaterThan => write!(f, ">{}", self.num),
            SetSelectorKind::EqualTo => write!(f, "{}", self.num),
        }
    }
}
