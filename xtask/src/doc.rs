use anyhow::Result;
use colored::Colorize;
use std::time::Instant;

use crate::step::{cargo, done, OnFailure};

pub fn run(open: bool) -> Result<()> {
    println!();
    println!("{}", "📚 Building documentation...".cyan().bold());
    println!();

    let start = Instant::now();

    let mut args = vec!["doc", "--workspace", "--no-deps", "--document-private-items"];
    if open {
        args.push("--open");
    }
    cargo("Documentation", &args, OnFailure::Bail)?;

    if !open {
        println!(
            "   {}",
            "Open target/doc/weather_sync/index.html in your browser".dimmed()
        );
        println!("   {}", "Or run 'cargo run -p xtask -- doc --open'".dimmed());
        println!();
    }

    done("Documentation", start);
    Ok(())
}
