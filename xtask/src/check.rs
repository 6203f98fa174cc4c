use anyhow::Result;
use colored::Colorize;
use std::time::Instant;

use crate::step::{cargo, done, OnFailure};

/// Crates that must keep building without `std`.
const NO_STD_CRATES: [&str; 3] = ["platform", "companion", "ui"];

/// Bare-metal target used to prove `no_std` compatibility.
const NO_STD_TARGET: &str = "thumbv7em-none-eabihf";

pub fn run() -> Result<()> {
    println!();
    println!("{}", "🔍 Checking workspace...".cyan().bold());
    println!();

    let total_start = Instant::now();

    cargo(
        "Host build (all targets)",
        &["check", "--workspace", "--all-targets"],
        OnFailure::Bail,
    )?;

    for krate in NO_STD_CRATES {
        cargo(
            &format!("{krate} (no_std, {NO_STD_TARGET})"),
            &["check", "-p", krate, "--target", NO_STD_TARGET, "--no-default-features"],
            OnFailure::Bail,
        )?;
    }

    // Lints and formatting are reported, never fatal.
    cargo(
        "Clippy",
        &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
        OnFailure::Warn,
    )?;
    if cargo("Formatting", &["fmt", "--all", "--check"], OnFailure::Warn)?.is_none() {
        eprintln!("     Run 'cargo fmt --all' to fix");
        println!();
    }

    done("All checks", total_start);
    Ok(())
}
