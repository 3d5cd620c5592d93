use dice_expr::roll::{Eval, Number};
use dice_expr::{AdvType, CritType, DiceRoller, RollError, RollOptions};
use rstest::rstest;

const TRIALS: usize = 200;

fn roll_many(expr: &str, options: RollOptions) -> Vec<i64> {
    let mut roller = DiceRoller::new();
    (0..TRIALS)
        .map(|_| roller.roll(expr, options).unwrap().total())
        .collect()
}

#[rstest]
#[case("1d20", 1, 20)]
#[case("4d6kh3", 3, 18)]
#[case("2d20kl1 + 5", 6, 25)]
#[case("1d%", 0, 90)]
#[case("8d6mi3ma5", 24, 40)]
#[case("(1d4, 1d6, 1d8)ph1", 2, 10)]
#[case("4d6rr<3", 12, 24)]
#[case("1d6ro1", 1, 6)]
fn test_totals_in_range(#[case] expr: &str, #[case] min: i64, #[case] max: i64) {
    for total in roll_many(expr, RollOptions::default()) {
        assert!(
            (min..=max).contains(&total),
            "{} rolled {}, expected {}..={}",
            expr,
            total,
            min,
            max
        );
    }
}

#[test]
fn test_percentile_steps() {
    for total in roll_many("1d%", RollOptions::default()) {
        assert_eq!(0, total % 10);
    }
}

#[test]
fn test_explode_adds_dice() {
    let mut roller = DiceRoller::new();
    for _ in 0..TRIALS {
        let result = roller.roll("3d6e6", RollOptions::default()).unwrap();
        let Number::Expression(expr) = &result.expr else {
            panic!("expected an expression")
        };
        let Number::Dice(dice) = &*expr.roll else {
            panic!("expected dice")
        };
        let exploded = dice.values.iter().filter(|d| d.exploded()).count();
        assert_eq!(3 + exploded, dice.values.len());
        assert!(dice.values.iter().all(|d| d.kept()));
    }
}

#[test]
fn test_advantage_crit_matches_total() {
    let mut roller = DiceRoller::new();
    let options = RollOptions::default().with_advantage(AdvType::Advantage);
    for _ in 0..TRIALS {
        let result = roller.roll("1d20", options).unwrap();
        let expected = match result.total() {
            1 => CritType::Fail,
            20 => CritType::Crit,
            _ => CritType::None,
        };
        assert_eq!(expected, result.crit());
        assert!(result.result.starts_with("2d20kh1 ("));
    }
}

#[test]
fn test_module_functions() {
    let result = dice_expr::roll("1d1 + 2").unwrap();
    assert_eq!(3, result.total());
    assert_eq!("1d1 (**1**) + 2 = `3`", result.result);

    let ast = dice_expr::parse("4d6kh3 [str] save", true).unwrap();
    assert_eq!("4d6kh3 [str] save", ast.to_string());

    assert!(matches!(
        dice_expr::roll("1d20 +"),
        Err(RollError::SyntaxError(_))
    ));
    assert_eq!(
        Err(RollError::TooManyRolls),
        dice_expr::roll("1d6e<7").map(|r| r.total())
    );
}
