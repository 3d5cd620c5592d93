use super::{ctx::RollContext, roller::Roller, tree::*, RResult};
use crate::common::*;
use crate::error::RollError;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use SetOperatorKind::*;

impl SetOperator {
    pub(crate) fn operate<R: Roller>(
        &self,
        target: &mut Number,
        ctx: &mut RollContext<R>,
    ) -> RResult<()> {
        if target.operations_mut().is_none() {
            return Err(RollError::value_error(format!(
                "cannot apply '{}' to a single value",
                self
            )));
        }

        match target.set_mut() {
            SetMut::Dice(dice) => self.operate_on_dice(dice, ctx)?,
            SetMut::Numbers(values) => self.operate_on_numbers(values)?,
        }

        if let Some(operations) = target.operations_mut() {
            operations.push(self.clone());
        }
        Ok(())
    }

    fn operate_on_numbers(&self, values: &mut [Number]) -> RResult<()> {
        match self.op {
            Keep => self.keep(values),
            Drop => self.drop(values),
            op => Err(RollError::value_error(format!(
                "'{}' can only operate on dice",
                op
            ))),
        }
    }

    fn operate_on_dice<R: Roller>(&self, dice: &mut Dice, ctx: &mut RollContext<R>) -> RResult<()> {
        match self.op {
            Keep => self.keep(&mut dice.values),
            Drop => self.drop(&mut dice.values),
            Reroll => self.reroll(dice, ctx),
            RerollOnce => self.reroll_once(dice, ctx),
            ExplodeOnce => self.explode_once(dice, ctx),
            Explode => self.explode(dice, ctx),
            Minimum => self.minimum(dice),
            Maximum => self.maximum(dice),
        }
    }

    pub(crate) fn select<T: Eval>(
        &self,
        target: &[T],
        max_targets: Option<usize>,
    ) -> RResult<BTreeSet<usize>> {
        let mut out = BTreeSet::new();
        for sel in self.sels.iter() {
            let remaining = match max_targets {
                Some(max) if out.len() >= max => break,
                Some(max) => Some(max - out.len()),
                None => None,
            };
            out.extend(sel.select(target, remaining)?);
        }
        Ok(out)
    }

    fn keep<T: Eval>(&self, target: &mut [T]) -> RResult<()> {
        let selected = self.select(target, None)?;
        for (i, value) in target.iter_mut().enumerate() {
            if value.kept() && !selected.contains(&i) {
                value.drop();
            }
        }
        Ok(())
    }

    fn drop<T: Eval>(&self, target: &mut [T]) -> RResult<()> {
        for i in self.select(target, None)? {
            target[i].drop();
        }
        Ok(())
    }

    fn reroll<R: Roller>(&self, dice: &mut Dice, ctx: &mut RollContext<R>) -> RResult<()> {
        let mut to_reroll = self.select(&dice.values, None)?;
        while !to_reroll.is_empty() {
            for &i in &to_reroll {
                dice.values[i].reroll(ctx)?;
            }
            to_reroll = self.select(&dice.values, None)?;
        }
        Ok(())
    }

    fn reroll_once<R: Roller>(&self, dice: &mut Dice, ctx: &mut RollContext<R>) -> RResult<()> {
        for i in self.select(&dice.values, None)? {
            dice.values[i].reroll(ctx)?;
        }
        Ok(())
    }

    fn explode_once<R: Roller>(&self, dice: &mut Dice, ctx: &mut RollContext<R>) -> RResult<()> {
        for i in self.select(&dice.values, Some(1))? {
            dice.values[i].explode();
            dice.roll_another(ctx)?;
        }
        Ok(())
    }

    fn explode<R: Roller>(&self, dice: &mut Dice, ctx: &mut RollContext<R>) -> RResult<()> {
        let mut exploded = BTreeSet::new();
        let mut to_explode = self.select(&dice.values, None)?;
        while !to_explode.is_empty() {
            for &i in &to_explode {
                dice.values[i].explode();
                dice.roll_another(ctx)?;
            }
            exploded.append(&mut to_explode);
            to_explode = self
                .select(&dice.values, None)?
                .difference(&exploded)
                .copied()
                .collect();
        }
        Ok(())
    }

    fn bound(&self, kind: &str) -> RResult<Int> {
        let sel = self.sels.last();
        if sel.cat == SetSelectorKind::EqualTo {
            Ok(sel.num)
        } else {
            Err(RollError::value_error(format!(
                "{} is not a valid selector for {}.",
                sel, kind
            )))
        }
    }

    fn minimum(&self, dice: &mut Dice) -> RResult<()> {
        let min = Value::Int(self.bound("minimums")?);
        for die in dice.values.iter_mut().filter(|d| d.kept()) {
            if die.number()? < min {
                die.force_value(min);
            }
        }
        Ok(())
    }

    fn maximum(&self, dice: &mut Dice) -> RResult<()> {
        let max = Value::Int(self.bound("maximums")?);
        for die in dice.values.iter_mut().filter(|d| d.kept()) {
            if die.number()? > max {
                die.force_value(max);
            }
        }
        Ok(())
    }
}

impl SetSelector {
    pub(crate) fn select<T: Eval>(
        &self,
        target: &[T],
        max_targets: Option<usize>,
    ) -> RResult<Vec<usize>> {
        let mut kept = target
            .iter()
            .enumerate()
            .filter(|(_, x)| x.kept())
            .map(|(i, x)| Ok((i, x.number()?)))
            .collect::<RResult<Vec<_>>>()?;

        let num = Value::Int(self.num);
        let count = usize::try_from(self.num).unwrap_or(0);
        // stable sorts, so ties go to the earlier element
        match self.cat {
            SetSelectorKind::Lowest => {
                kept.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
                kept.truncate(count);
            }
            SetSelectorKind::Highest => {
                kept.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
                kept.truncate(count);
            }
            SetSelectorKind::LessThan => kept.retain(|(_, v)| *v < num),
            SetSelectorKind::GreaterThan => kept.retain(|(_, v)| *v > num),
            SetSelectorKind::EqualTo => kept.retain(|(_, v)| *v == num),
        }
        if let Some(max) = max_targets {
            kept.truncate(max);
        }
        Ok(kept.into_iter().map(|(i, _)| i).collect())
    }
}
