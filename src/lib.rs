pub mod common;
pub mod dice;
pub mod error;
pub mod logging;
pub mod parse;
pub mod roll;
pub mod stringifiers;
pub mod utils;

use std::cell::RefCell;

pub use dice::{AdvType, CritType, DiceRoller, RollInput, RollOptions, RollResult};
pub use error::RollError;
pub use parse::{DiceParser, ParseError, StartRule};
pub use roll::{RollContext, Roller};
pub use stringifiers::{MarkdownStringifier, SimpleStringifier, Stringify};

pub type Result<T, E = RollError> = std::result::Result<T, E>;

thread_local! {
    static ROLLER: RefCell<DiceRoller> = RefCell::new(DiceRoller::new());
}

/// Rolls `expr` with the thread's default roller.
pub fn roll(expr: &str) -> Result<RollResult> {
    roll_with_options(expr, RollOptions::default())
}

pub fn roll_with_options(expr: &str, options: RollOptions) -> Result<RollResult> {
    ROLLER.with(|roller| roller.borrow_mut().roll(expr, options))
}

pub fn parse(expr: &str, allow_comments: bool) -> Result<parse::ast::Node> {
    Ok(DiceParser::new().parse(expr, allow_comments)?)
}
