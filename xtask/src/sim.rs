//! xtask sim - run the desktop simulator
//!
//! Builds and runs the `watchface` binary in the foreground with inherited
//! stdio, so the rendered frames stream straight to the terminal. Everything
//! after `--` is forwarded, e.g.
//!
//! ```text
//! cargo run -p xtask -- sim -- --duration-secs 60 --visible-secs 20 --hidden-secs 10
//! ```

use anyhow::{Context, Result};
use colored::Colorize;
use platform::config;
use std::process::Command;

pub fn run(release: bool, log: &str, args: &[String]) -> Result<()> {
    print_banner();

    let mut cmd = Command::new("cargo");
    cmd.args(["run", "-p", "watchface"]);
    if release {
        cmd.arg("--release");
    }
    cmd.arg("--").args(args).env("RUST_LOG", log);

    println!(
        "{}",
        format!(
            "  cargo run -p watchface{} -- {}",
            if release { " --release" } else { "" },
            args.join(" ")
        )
        .dimmed()
    );
    println!();

    let status = cmd.status().context("Failed to start simulator")?;
    if !status.success() {
        anyhow::bail!("Simulator exited with {status}");
    }
    Ok(())
}

fn print_banner() {
    println!();
    println!(
        "{}",
        format!("☀  {} simulator", config::app_title()).yellow().bold()
    );
    println!("{}", config::dev_banner().dimmed());
    println!();
}
