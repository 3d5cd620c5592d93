use super::{ctx::RollContext, roller::Roller, RResult};
use crate::common::*;
use crate::error::RollError;
use crate::utils::TreeNode;
use enum_dispatch::enum_dispatch;
use std::slice;

#[enum_dispatch]
pub trait Eval {
    fn kept(&self) -> bool;

    fn drop(&mut self);

    fn annotation(&self) -> Option<&str>;

    fn set_annotation(&mut self, annotation: Option<String>);

    fn number(&self) -> RResult<Value>;

    fn total(&self) -> RResult<Value> {
        if self.kept() {
            self.number()
        } else {
            Ok(Value::ZERO)
        }
    }
}

macro_rules! eval_meta {
    () => {
        fn kept(&self) -> bool {
            self.kept
        }

        fn drop(&mut self) {
            self.kept = false;
        }

        fn annotation(&self) -> Option<&str> {
            self.annotation.as_deref()
        }

        fn set_annotation(&mut self, annotation: Option<String>) {
            self.annotation = annotation;
        }
    };
}

fn sum_kept<'a, T: Eval + 'a>(values: impl IntoIterator<Item = &'a T>) -> RResult<Value> {
    values
        .into_iter()
        .filter(|x| x.kept())
        .map(Eval::number)
        .sum()
}

#[enum_dispatch(Eval)]
#[derive(Debug, Clone, PartialEq)]
pub enum Number {
    Expression(Expression),
    Literal(Literal),
    UnOp(UnOp),
    BinOp(BinOp),
    Parenthetical(Parenthetical),
    Set(Set),
    Dice(Dice),
}

pub(crate) enum SetMut<'a> {
    Numbers(&'a mut [Number]),
    Dice(&'a mut Dice),
}

impl Number {
    pub(crate) fn set_mut(&mut self) -> SetMut<'_> {
        match self {
            Self::Expression(x) => x.roll.set_mut(),
            Self::Parenthetical(x) => x.value.set_mut(),
            Self::Set(x) => SetMut::Numbers(&mut x.values),
            Self::Dice(x) => SetMut::Dice(x),
            other => SetMut::Numbers(slice::from_mut(other)),
        }
    }

    pub(crate) fn operations_mut(&mut self) -> Option<&mut Vec<SetOperator>> {
        match self {
            Self::Parenthetical(x) => Some(&mut x.operations),
            Self::Set(x) => Some(&mut x.operations),
            Self::Dice(x) => Some(&mut x.operations),
            _ => None,
        }
    }
}

impl TreeNode for Number {
    fn children(&self) -> Vec<&Self> {
        match self {
            Self::Expression(x) => vec![&*x.roll],
            Self::UnOp(x) => vec![&*x.value],
            Self::BinOp(x) => vec![&*x.left, &*x.right],
            Self::Parenthetical(x) => vec![&*x.value],
            Self::Set(x) => x.values.iter().collect(),
            Self::Literal(_) | Self::Dice(_) => vec![],
        }
    }

    fn children_mut(&mut self) -> Vec<&mut Self> {
        match self {
            Self::Expression(x) => vec![&mut *x.roll],
            Self::UnOp(x) => vec![&mut *x.value],
            Self::BinOp(x) => vec![&mut *x.left, &mut *x.right],
            Self::Parenthetical(x) => vec![&mut *x.value],
            Self::Set(x) => x.values.iter_mut().collect(),
            Self::Literal(_) | Self::Dice(_) => vec![],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub roll: Box<Number>,
    pub comment: Option<String>,
    kept: bool,
    annotation: Option<String>,
}

impl Expression {
    pub fn new(roll: Number, comment: Option<String>) -> Self {
        Self {
            roll: Box::new(roll),
            comment,
            kept: true,
            annotation: None,
        }
    }
}

impl Eval for Expression {
    eval_meta!();

    fn number(&self) -> RResult<Value> {
        self.roll.total()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub values: NonEmpty<Value>,
    pub exploded: bool,
    kept: bool,
    annotation: Option<String>,
}

impl Literal {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            values: vec1![value.into()],
            exploded: false,
            kept: true,
            annotation: None,
        }
    }

    pub fn explode(&mut self) {
        self.exploded = true;
    }

    pub fn update(&mut self, value: impl Into<Value>) {
        self.values.push(value.into());
    }
}

impl Eval for Literal {
    eval_meta!();

    fn number(&self) -> RResult<Value> {
        Ok(*self.values.last())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnOp {
    pub op: UnaryOperator,
    pub value: Box<Number>,
    kept: bool,
    annotation: Option<String>,
}

impl UnOp {
    pub fn new(op: UnaryOperator, value: Number) -> Self {
        Self {
            op,
            value: Box::new(value),
            kept: true,
            annotation: None,
        }
    }
}

impl Eval for UnOp {
    eval_meta!();

    fn number(&self) -> RResult<Value> {
        Ok(self.value.total()?.unary(self.op))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinOp {
    pub op: BinaryOperator,
    pub left: Box<Number>,
    pub right: Box<Number>,
    kept: bool,
    annotation: Option<String>,
}

impl BinOp {
    pub fn new(left: Number, op: BinaryOperator, right: Number) -> Self {
        Self {
            op,
            left: Box::new(left),
            right: Box::new(right),
            kept: true,
            annotation: None,
        }
    }
}

impl Eval for BinOp {
    eval_meta!();

    fn number(&self) -> RResult<Value> {
        let (left, right) = (self.left.total()?, self.right.total()?);
        left.checked_binary(self.op, right)
            .ok_or_else(|| RollError::value_error("cannot divide by zero"))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parenthetical {
    pub value: Box<Number>,
    pub operations: Vec<SetOperator>,
    kept: bool,
    annotation: Option<String>,
}

impl Parenthetical {
    pub fn new(value: Number) -> Self {
        Self {
            value: Box::new(value),
            operations: Vec::new(),
            kept: true,
            annotation: None,
        }
    }
}

impl Eval for Parenthetical {
    eval_meta!();

    fn number(&self) -> RResult<Value> {
        self.value.total()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Set {
    pub values: Vec<Number>,
    pub operations: Vec<SetOperator>,
    kept: bool,
    annotation: Option<String>,
}

impl Set {
    pub fn new(values: Vec<Number>) -> Self {
        Self {
            values,
            operations: Vec::new(),
            kept: true,
            annotation: None,
        }
    }

    pub fn keptset(&self) -> impl Iterator<Item = &Number> {
        self.values.iter().filter(|x| x.kept())
    }
}

impl Eval for Set {
    eval_meta!();

    fn number(&self) -> RResult<Value> {
        sum_kept(&self.values)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dice {
    pub num: UInt,
    pub size: DiceSize,
    pub values: Vec<Die>,
    pub operations: Vec<SetOperator>,
    kept: bool,
    annotation: Option<String>,
}

impl Dice {
    pub fn new(num: UInt, size: DiceSize, values: Vec<Die>) -> Self {
        Self {
            num,
            size,
            values,
            operations: Vec::new(),
            kept: true,
            annotation: None,
        }
    }

    pub fn roll_new<R: Roller>(ctx: &mut RollContext<R>, num: UInt, size: DiceSize) -> RResult<Self> {
        let mut values = Vec::new();
        for _ in 0..num {
            values.push(Die::roll_new(ctx, size)?);
        }
        Ok(Self::new(num, size, values))
    }

    pub fn roll_another<R: Roller>(&mut self, ctx: &mut RollContext<R>) -> RResult<()> {
        self.values.push(Die::roll_new(ctx, self.size)?);
        Ok(())
    }

    pub fn keptset(&self) -> impl Iterator<Item = &Die> {
        self.values.iter().filter(|x| x.kept())
    }
}

impl Eval for Dice {
    eval_meta!();

    fn number(&self) -> RResult<Value> {
        sum_kept(&self.values)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Die {
    pub size: DiceSize,
    pub values: NonEmpty<Literal>,
    kept: bool,
    annotation: Option<String>,
}

impl Die {
    pub fn new(size: DiceSize, value: impl Into<Value>) -> Self {
        Self {
            size,
            values: vec1![Literal::new(value)],
            kept: true,
            annotation: None,
        }
    }

    pub fn roll_new<R: Roller>(ctx: &mut RollContext<R>, size: DiceSize) -> RResult<Self> {
        Ok(Self::new(size, ctx.roll_one(size)?))
    }

    pub fn reroll<R: Roller>(&mut self, ctx: &mut RollContext<R>) -> RResult<()> {
        let value = ctx.roll_one(self.size)?;
        self.values.last_mut().drop();
        self.values.push(Literal::new(value));
        Ok(())
    }

    pub fn explode(&mut self) {
        self.values.last_mut().explode();
    }

    pub fn exploded(&self) -> bool {
        self.values.last().exploded
    }

    pub fn force_value(&mut self, value: impl Into<Value>) {
        self.values.last_mut().update(value);
    }
}

impl Eval for Die {
    eval_meta!();

    fn number(&self) -> RResult<Value> {
        self.values.last().total()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals_skip_dropped() {
        let mut set = Set::new(vec![
            Literal::new(3).into(),
            Literal::new(4.5).into(),
            Literal::new(5).into(),
        ]);
        assert_eq!(Value::Float(12.5), set.number().unwrap());
        set.values[1].drop();
        assert_eq!(Value::Int(8), set.total().unwrap());
        assert_eq!(Value::Float(4.5), set.values[1].number().unwrap());
        assert_eq!(Value::ZERO, set.values[1].total().unwrap());
        set.drop();
        assert_eq!(Value::ZERO, set.total().unwrap());
        assert_eq!(Value::Int(8), set.number().unwrap());
    }

    #[test]
    fn test_die_history() {
        let mut die = Die::new(DiceSize::Int(6), 1);
        die.force_value(3);
        assert_eq!(Value::Int(3), die.number().unwrap());
        assert_eq!(1, die.values.len());
        assert_eq!(2, die.values.last().values.len());
        die.explode();
        assert!(die.exploded());
    }

    #[test]
    fn test_divide_by_zero() {
        let node = BinOp::new(Literal::new(1).into(), BinaryOperator::Rem, Literal::new(0).into());
        assert_eq!(
            RollError::value_error("cannot divide by zero"),
            node.number().unwrap_err()
        );
    }

    #[test]
    fn test_set_mut_passes_through_wrappers() {
        let set: Number = Set::new(vec![Literal::new(1).into(), Literal::new(2).into()]).into();
        let mut node: Number = Parenthetical::new(set).into();
        match node.set_mut() {
            SetMut::Numbers(values) => assert_eq!(2, values.len()),
            SetMut::Dice(_) => panic!("expected numbers"),
        }
        let mut node: Number = Literal::new(1).into();
        assert!(matches!(node.set_mut(), SetMut::Numbers(values) if values.len() == 1));
        assert!(node.operations_mut().is_none());
    }
}
