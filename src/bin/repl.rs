use dice_expr::logging::init_logging;
use dice_expr::{DiceRoller, RollOptions};
use std::io::{self, BufRead, Write};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    let mut roller = DiceRoller::new();
    let options = RollOptions::default().with_comments();

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    print!("> ");
    io::stdout().flush()?;
    while let Some(line) = lines.next() {
        let line = line?;
        let line = line.trim();
        if !line.is_empty() {
            match roller.roll(line, options) {
                Ok(result) => println!("{}", result),
                Err(why) => eprintln!("Error: {}", why),
            }
        }
        print!("> ");
        io::stdout().flush()?;
    }
    println!();
    Ok(())
}
