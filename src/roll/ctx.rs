use super::{roller::Roller, tree::*, RResult};
use crate::common::*;
use crate::error::RollError;
use crate::parse::{ast, AstVisitor};
use std::num::NonZeroU64;
use tracing::trace;

pub type DefaultRoller = rand::rngs::ThreadRng;

pub const DEFAULT_MAX_ROLLS: usize = 1000;

const PERCENTILE_SIDES: NonZeroU64 = match NonZeroU64::new(10) {
    Some(sides) => sides,
    None => panic!("10 is non-zero"),
};

pub struct RollContext<R = DefaultRoller> {
    max_rolls: Option<usize>,
    rolls: usize,
    roller: R,
}

impl<R: Roller> RollContext<R> {
    pub fn new(max_rolls: Option<usize>, roller: R) -> Self {
        Self {
            max_rolls,
            rolls: 0,
            roller,
        }
    }

    pub fn new_bounded(max_rolls: usize, roller: R) -> Self {
        Self::new(Some(max_rolls), roller)
    }

    pub fn new_unbounded(roller: R) -> Self {
        Self::new(None, roller)
    }

    pub fn max_rolls(&self) -> Option<usize> {
        self.max_rolls
    }

    /// The number of dice rolled since the last reset.
    pub fn rolls(&self) -> usize {
        self.rolls
    }

    pub fn reset(&mut self) {
        self.rolls = 0;
    }

    fn count_roll(&mut self) -> RResult<()> {
        self.rolls += 1;
        if self.max_rolls.map_or(false, |max| self.rolls > max) {
            Err(RollError::TooManyRolls)
        } else {
            Ok(())
        }
    }

    pub fn roll_one(&mut self, size: DiceSize) -> RResult<Int> {
        let sides = match size {
            DiceSize::Int(x) if Int::try_from(x).is_err() => {
                return Err(RollError::value_error(format!("cannot roll a {}-sided die", x)))
            }
            DiceSize::Int(x) => NonZeroU64::new(x)
                .ok_or_else(|| RollError::value_error("cannot roll a 0-sided die"))?,
            DiceSize::Percentile => PERCENTILE_SIDES,
        };
        self.count_roll()?;

        let face = self.roller.roll(sides);
        let value = match size {
            DiceSize::Int(_) => face,
            DiceSize::Percentile => (face - 1) * 10,
        };
        trace!(%size, value, rolls = self.rolls, "rolled die");
        Int::try_from(value)
            .map_err(|_| RollError::value_error(format!("cannot roll a {}-sided die", size)))
    }

    pub fn eval(&mut self, node: &ast::Node) -> RResult<Number> {
        self.visit(node)
    }
}

impl Default for RollContext {
    fn default() -> Self {
        Self::new_bounded(DEFAULT_MAX_ROLLS, rand::thread_rng())
    }
}

impl<R: Roller> AstVisitor for RollContext<R> {
    type Output = RResult<Number>;

    fn visit_expression(&mut self, node: &ast::Expression) -> Self::Output {
        let roll = self.visit(&node.roll)?;
        Ok(Expression::new(roll, node.comment.clone()).into())
    }

    fn visit_annotated(&mut self, node: &ast::AnnotatedNumber) -> Self::Output {
        let mut value = self.visit(&node.value)?;
        value.set_annotation(Some(node.annotations.concat()));
        Ok(value)
    }

    fn visit_literal(&mut self, node: &ast::Literal) -> Self::Output {
        Ok(Literal::new(node.value).into())
    }

    fn visit_parenthetical(&mut self, node: &ast::Parenthetical) -> Self::Output {
        let value = self.visit(&node.value)?;
        Ok(Parenthetical::new(value).into())
    }

    fn visit_unop(&mut self, node: &ast::UnOp) -> Self::Output {
        let value = self.visit(&node.value)?;
        Ok(UnOp::new(node.op, value).into())
    }

    fn visit_binop(&mut self, node: &ast::BinOp) -> Self::Output {
        let left = self.visit(&node.left)?;
        let right = self.visit(&node.right)?;
        let ret = BinOp::new(left, node.op, right);
        // surface division by zero here rather than at display time
        ret.number()?;
        Ok(ret.into())
    }

    fn visit_operated_set(&mut self, node: &ast::OperatedSet) -> Self::Output {
        let mut target = self.visit(&node.value)?;
        for op in &node.operations {
            op.operate(&mut target, self)?;
        }
        Ok(target)
    }

    fn visit_number_set(&mut self, node: &ast::NumberSet) -> Self::Output {
        let values = node
            .values
            .iter()
            .map(|value| self.visit(value))
            .collect::<RResult<_>>()?;
        Ok(Set::new(values).into())
    }

    fn visit_dice(&mut self, node: &ast::Dice) -> Self::Output {
        Ok(Dice::roll_new(self, node.num, node.size)?.into())
    }
}
