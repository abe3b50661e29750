//! Prompt loop: ask for city, budget and diet, print recommendations, repeat.
//!
//! Ends on EOF (Ctrl+D) or `quit`/`exit` at any prompt.

use std::io::Write;

use restaurant_recommender::RecommendationApp;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};

pub async fn run(app: &RecommendationApp) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("Zomato AI Restaurant Recommender");
    println!("Type 'quit' to exit.\n");

    while let Some((city, price, diet)) = read_preferences(&mut lines).await? {
        println!("{}", app.get_recommendations(&city, price, &diet).await);
    }

    println!("Goodbye!");
    Ok(())
}

/// `None` when the user quits or input ends.
async fn read_preferences<R>(lines: &mut Lines<R>) -> anyhow::Result<Option<(String, i64, String)>>
where
    R: AsyncBufRead + Unpin,
{
    let Some(city) = ask(lines, "City: ").await? else {
        return Ok(None);
    };

    let price = loop {
        let Some(answer) = ask(lines, "Budget for two (Rs.): ").await? else {
            return Ok(None);
        };
        match answer.parse::<i64>() {
            Ok(price) => break price,
            Err(_) => println!("Budget must be a whole number of rupees."),
        }
    };

    let Some(diet) = ask(lines, "Diet (veg/non-veg): ").await? else {
        return Ok(None);
    };

    Ok(Some((city, price, diet)))
}

async fn ask<R>(lines: &mut Lines<R>, prompt: &str) -> anyhow::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    print!("{prompt}");
    std::io::stdout().flush()?;

    Ok(lines
        .next_line()
        .await?
        .map(|line| line.trim().to_string())
        .filter(|line| !is_quit_command(line)))
}

fn is_quit_command(line: &str) -> bool {
    matches!(line.to_lowercase().as_str(), "quit" | "exit" | "q")
}
