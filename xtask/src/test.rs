use anyhow::Result;
use colored::Colorize;
use std::time::Instant;

use crate::step::{cargo, done, OnFailure};

pub fn run(unit_only: bool, integration_only: bool) -> Result<()> {
    println!();
    println!("{}", "🧪 Running tests...".cyan().bold());
    println!();

    let total_start = Instant::now();

    if !integration_only {
        let output = cargo(
            "Unit tests",
            &["test", "--lib", "--bins", "--workspace"],
            OnFailure::Bail,
        )?;
        print_summary(output.as_ref());
    }

    if !unit_only {
        // tests/ directories of every crate, proptest suites included
        let output = cargo(
            "Integration tests",
            &["test", "--tests", "--workspace", "--exclude", "xtask"],
            OnFailure::Bail,
        )?;
        print_summary(output.as_ref());
    }

    let output = cargo("Doc tests", &["test", "--doc", "--workspace"], OnFailure::Warn)?;
    print_summary(output.as_ref());

    done("All tests", total_start);
    Ok(())
}

fn print_summary(output: Option<&std::process::Output>) {
    if let Some(output) = output {
        let summary = extract_test_summary(&String::from_utf8_lossy(&output.stdout));
        println!("    {}", summary.dimmed());
        println!();
    }
}

/// Sum every `test result:` line cargo prints (one per test binary).
fn extract_test_summary(output: &str) -> String {
    let mut passed = 0_u64;
    let mut failed = 0_u64;
    let mut ignored = 0_u64;
    let mut binaries = 0_u64;

    for line in output.lines() {
        let Some(result) = line.split("test result:").nth(1) else {
            continue;
        };
        binaries = binaries.saturating_add(1);
        for part in result.split(';') {
            let mut words = part.split_whitespace().rev();
            let (Some(kind), Some(count)) = (words.next(), words.next()) else {
                continue;
            };
            let Ok(count) = count.parse::<u64>() else {
                continue;
            };
            match kind {
                "passed" => passed = passed.saturating_add(count),
                "failed" => failed = failed.saturating_add(count),
                "ignored" => ignored = ignored.saturating_add(count),
                _ => {}
            }
        }
    }

    if binaries == 0 {
        return "(summary not available)".to_string();
    }
    format!("{passed} passed; {failed} failed; {ignored} ignored across {binaries} test binaries")
}

#[cfg(test)]
mod tests {
    use super::extract_test_summary;

    #[test]
    fn test_summary_sums_all_binaries() {
        let output = "\
running 3 tests
test result: ok. 3 passed; 0 failed; 1 ignored; 0 measured; 0 filtered out; finished in 0.01s

running 2 tests
test result: ok. 2 passed; 0 failed; 0 ignored; 0 measured; 0 filtered out; finished in 0.20s
";
        assert_eq!(
            extract_test_summary(output),
            "5 passed; 0 failed; 1 ignored across 2 test binaries"
        );
    }

    #[test]
    fn test_summary_without_results() {
        assert_eq!(extract_test_summary("error: could not compile"), "(summary not available)");
    }
}
