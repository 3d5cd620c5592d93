mod ctx;
mod ops;
mod roller;
mod tree;

use crate::error::RollError;

pub(crate) type RResult<T> = Result<T, RollError>;

pub use ctx::{DefaultRoller, RollContext, DEFAULT_MAX_ROLLS};
pub use roller::Roller;
pub use tree::{
    BinOp, Dice, Die, Eval, Expression, Literal, Number, Parenthetical, Set, UnOp,
};

#[cfg(test)]
pub(crate) use roller::StepRoller;
