use clap::{ArgGroup, Parser};
use dice_expr::logging::init_logging;
use dice_expr::roll::DEFAULT_MAX_ROLLS;
use dice_expr::{AdvType, DiceRoller, RollContext, RollOptions};
use std::process::ExitCode;

/// Roll a dice expression and print the result.
#[derive(Debug, Clone, Parser)]
#[command(version, about)]
#[command(group = ArgGroup::new("advantage").args(["adv", "dis"]).multiple(false))]
struct Cli {
    /// Allow free text after the expression, e.g. `1d20+5 to hit`.
    #[arg(short = 'c', long)]
    allow_comments: bool,

    /// Roll the leftmost d20 with advantage.
    #[arg(short, long)]
    adv: bool,

    /// Roll the leftmost d20 with disadvantage.
    #[arg(short, long)]
    dis: bool,

    /// The most dice a single roll may use.
    #[arg(long, default_value_t = DEFAULT_MAX_ROLLS)]
    max_rolls: usize,

    /// The expression to roll.
    #[arg(
        default_value = "d20",
        num_args = 1..,
        allow_hyphen_values = true,
        trailing_var_arg = true
    )]
    expr: Vec<String>,
}

impl Cli {
    fn expression(&self) -> String {
        self.expr.join(" ")
    }

    fn options(&self) -> RollOptions {
        let advantage = if self.adv {
            AdvType::Advantage
        } else if self.dis {
            AdvType::Disadvantage
        } else {
            AdvType::None
        };
        RollOptions {
            allow_comments: self.allow_comments,
            advantage,
        }
    }
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    let context = RollContext::new_bounded(cli.max_rolls, rand::thread_rng());
    let mut roller = DiceRoller::with_context(context);
    match roller.roll(&cli.expression(), cli.options()) {
        Ok(result) => {
            println!("{}", result);
            ExitCode::SUCCESS
        }
        Err(why) => {
            eprintln!("Error: {}", why);
            ExitCode::FAILURE
        }
    }
}
