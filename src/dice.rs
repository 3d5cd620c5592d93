use crate::common::*;
use crate::parse::{ast, DiceParser};
use crate::roll::{DefaultRoller, Eval, Expression, Number, RollContext, Roller};
use crate::stringifiers::{MarkdownStringifier, Stringify};
use crate::utils::{ast_adv_copy, leftmost};
use std::fmt;
use tracing::debug;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum CritType {
    #[default]
    None,
    Crit,
    Fail,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum AdvType {
    #[default]
    None,
    Advantage,
    Disadvantage,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub struct RollOptions {
    pub allow_comments: bool,
    pub advantage: AdvType,
}

impl RollOptions {
    pub fn with_comments(mut self) -> Self {
        self.allow_comments = true;
        self
    }

    pub fn with_advantage(mut self, advantage: AdvType) -> Self {
        self.advantage = advantage;
        self
    }
}

#[derive(Debug, Copy, Clone)]
pub enum RollInput<'a> {
    Text(&'a str),
    Ast(&'a ast::Node),
}

impl<'a> From<&'a str> for RollInput<'a> {
    fn from(s: &'a str) -> Self {
        Self::Text(s)
    }
}

impl<'a> From<&'a String> for RollInput<'a> {
    fn from(s: &'a String) -> Self {
        Self::Text(s)
    }
}

impl<'a> From<&'a ast::Node> for RollInput<'a> {
    fn from(node: &'a ast::Node) -> Self {
        Self::Ast(node)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RollResult {
    pub ast: ast::Node,
    pub expr: Number,
    pub result: String,
    pub comment: Option<String>,
    value: Value,
    crit: CritType,
}

impl RollResult {
    /// The total, truncated toward zero.
    pub fn total(&self) -> Int {
        self.value.as_int()
    }

    pub fn float_total(&self) -> Float {
        self.value.as_float()
    }

    pub fn crit(&self) -> CritType {
        self.crit
    }
}

impl fmt::Display for RollResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.result)
    }
}

fn find_crit(expr: &Number) -> crate::Result<CritType> {
    let dice = match leftmost(expr) {
        Number::Dice(dice) => dice,
        _ => return Ok(CritType::None),
    };
    if dice.size != DiceSize::Int(20) || dice.keptset().count() != 1 {
        return Ok(CritType::None);
    }
    Ok(match dice.total()? {
        Value::Int(1) => CritType::Fail,
        Value::Int(20) => CritType::Crit,
        _ => CritType::None,
    })
}

pub struct DiceRoller<R = DefaultRoller> {
    context: RollContext<R>,
    parser: DiceParser,
}

impl DiceRoller {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for DiceRoller {
    fn default() -> Self {
        Self::with_context(RollContext::default())
    }
}

impl<R: Roller> DiceRoller<R> {
    pub fn with_context(context: RollContext<R>) -> Self {
        Self {
            context,
            parser: DiceParser::new(),
        }
    }

    pub fn context(&self) -> &RollContext<R> {
        &self.context
    }

    pub fn parse(&self, expr: &str, allow_comments: bool) -> crate::Result<ast::Node> {
        Ok(self.parser.parse(expr, allow_comments)?)
    }

    pub fn roll<'a>(
        &mut self,
        input: impl Into<RollInput<'a>>,
        options: RollOptions,
    ) -> crate::Result<RollResult> {
        self.roll_with(input, &mut MarkdownStringifier::default(), options)
    }

    pub fn roll_with<'a, S: Stringify + ?Sized>(
        &mut self,
        input: impl Into<RollInput<'a>>,
        stringifier: &mut S,
        options: RollOptions,
    ) -> crate::Result<RollResult> {
        self.context.reset();

        let ast = match input.into() {
            RollInput::Text(text) => {
                debug!(
                    expr = text,
                    ?options,
                    max_rolls = ?self.context.max_rolls(),
                    "rolling"
                );
                self.parse(text, options.allow_comments)?
            }
            RollInput::Ast(node) => {
                debug!(
                    expr = %node,
                    ?options,
                    max_rolls = ?self.context.max_rolls(),
                    "rolling"
                );
                node.clone()
            }
        };
        let ast = ast_adv_copy(&ast, options.advantage);

        let expr = match self.context.eval(&ast)? {
            expr @ Number::Expression(_) => expr,
            other => Expression::new(other, None).into(),
        };
        let comment = match &expr {
            Number::Expression(x) => x.comment.clone(),
            _ => None,
        };

        let result = stringifier.stringify(&expr)?;
        let value = expr.total()?;
        let crit = find_crit(&expr)?;
        debug!(%result, rolls = self.context.rolls(), "rolled");

        Ok(RollResult {
            ast,
            expr,
            result,
            comment,
            value,
            crit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RollError;
    use crate::roll::{StepRoller, DEFAULT_MAX_ROLLS};
    use crate::stringifiers::SimpleStringifier;
    use rstest::rstest;

    fn roller(initial: UInt) -> DiceRoller<StepRoller> {
        DiceRoller::with_context(RollContext::new_bounded(
            DEFAULT_MAX_ROLLS,
            StepRoller::new(initial, 1),
        ))
    }

    fn roll(expr: &str) -> RollResult {
        roller(10).roll(expr, RollOptions::default()).unwrap()
    }

    #[test]
    fn test_roll_result() {
        let result = roll("1d20 + 4");
        assert_eq!("1d20 (10) + 4 = `14`", result.result);
        assert_eq!("1d20 (10) + 4 = `14`", result.to_string());
        assert_eq!(14, result.total());
        assert_eq!(14.0, result.float_total());
        assert_eq!(None, result.comment);
        assert_eq!(CritType::None, result.crit());
    }

    #[test]
    fn test_totals_truncate() {
        let result = roll("7 / 2");
        assert_eq!(3, result.total());
        assert_eq!(3.5, result.float_total());
        assert_eq!(-3, roll("-7 / 2").total());
    }

    #[rstest]
    #[case("1d20", 20, CritType::Crit)]
    #[case("1d20", 1, CritType::Fail)]
    #[case("1d20", 10, CritType::None)]
    #[case("1d20 + 5", 20, CritType::Crit)]
    #[case("(1d20)", 1, CritType::Fail)]
    #[case("2d20", 20, CritType::None)]
    #[case("2d20kh1", 19, CritType::Crit)]
    #[case("5 + 1d20", 20, CritType::None)]
    #[case("1d%", 3, CritType::None)]
    fn test_crit(#[case] expr: &str, #[case] initial: UInt, #[case] expected: CritType) {
        let result = roller(initial).roll(expr, RollOptions::default()).unwrap();
        assert_eq!(expected, result.crit());
    }

    #[test]
    fn test_roll_advantage() {
        let mut roller = roller(10);
        let options = RollOptions::default().with_advantage(AdvType::Advantage);
        let result = roller.roll("1d20 + 1", options).unwrap();
        assert_eq!("2d20kh1 + 1", result.ast.to_string());
        assert_eq!("2d20kh1 (~~10~~, 11) + 1 = `12`", result.result);

        let options = RollOptions::default().with_advantage(AdvType::Disadvantage);
        let result = roller.roll("1d20 + 1", options).unwrap();
        assert_eq!("2d20kl1 (12, ~~13~~) + 1 = `13`", result.result);
    }

    #[test]
    fn test_roll_comments() {
        let options = RollOptions::default().with_comments();
        let result = roller(10).roll("1d20 for the dragon", options).unwrap();
        assert_eq!(Some("for the dragon"), result.comment.as_deref());
        assert_eq!("1d20 (10) = `10`", result.result);

        let err = roller(10).roll("1d20 for the dragon", RollOptions::default());
        assert!(matches!(err, Err(RollError::SyntaxError(_))));
    }

    #[test]
    fn test_roll_ast() {
        let mut roller = roller(10);
        let ast = roller.parse("2d6 [fire]", false).unwrap();
        let result = roller
            .roll_with(&ast, &mut SimpleStringifier, RollOptions::default())
            .unwrap();
        assert_eq!("2d6 (4, 5) [fire] = 9", result.result);

        let bare = ast::Node::literal(3);
        let result = roller.roll(&bare, RollOptions::default()).unwrap();
        assert_eq!("3 = `3`", result.result);
        assert!(matches!(result.expr, Number::Expression(_)));
    }

    #[test]
    fn test_budget_resets_per_roll() {
        let mut roller = DiceRoller::with_context(RollContext::new_bounded(3, StepRoller::new(1, 1)));
        assert!(roller.roll("3d6", RollOptions::default()).is_ok());
        assert!(roller.roll("3d6", RollOptions::default()).is_ok());
        assert_eq!(
            Err(RollError::TooManyRolls),
            roller.roll("4d6", RollOptions::default())
        );
    }
}
