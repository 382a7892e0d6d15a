//! Runs each NDR scenario target below through `cargo test --test <name>`
//! and prints a pass/fail table; exits non-zero if any target fails.

use std::process::Command;
use std::time::{Duration, Instant};

use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Test category
#[derive(Debug, Clone)]
struct TestCategory {
    name: &'static str,
    description: &'static str,
    test_name: &'static str,
}

const TEST_CATEGORIES: &[TestCategory] = &[
    TestCategory {
        name: "Wire Tests",
        description: "Byte-exact classic NDR fixtures, full pointer aliasing, VAX floats, hooks",
        test_name: "wire_tests",
    },
    TestCategory {
        name: "Syntax Tests",
        description: "Same values under NDR and NDR64",
        test_name: "syntax_tests",
    },
    TestCategory {
        name: "Hand-off Tests",
        description: "Encoder and decoder on two threads",
        test_name: "handoff_tests",
    },
    TestCategory {
        name: "Fragment Tests",
        description: "One stub data stream over several fragments",
        test_name: "fragment_tests",
    },
    TestCategory {
        name: "Serialization Tests",
        description: "Type serialization version 1 headers",
        test_name: "serialization_tests",
    },
];

fn print_test_categories() {
    println!("Test Categories:");
    println!("{}", "-".repeat(80));
    for (i, cat) in TEST_CATEGORIES.iter().enumerate() {
        println!("  {}. {} - {}", i + 1, cat.name, cat.description);
    }
    println!("{}", "-".repeat(80));
    println!();
}

fn run_test_category(category: &TestCategory) -> (bool, Duration, String) {
    info!(category = category.name, "running");
    let start = Instant::now();

    let output = Command::new("cargo")
        .args(["test", "-p", "integration-tests", "--test", category.test_name])
        .output();

    let duration = start.elapsed();

    match output {
        Ok(output) => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            if !stdout.is_empty() {
                println!("{}", stdout);
            }

            if output.status.success() {
                (true, duration, "PASSED".to_string())
            } else {
                eprintln!("{}", String::from_utf8_lossy(&output.stderr));
                (false, duration, format!("FAILED (exit code: {:?})", output.status.code()))
            }
        }
        Err(e) => {
            error!(category = category.name, error = %e, "failed to run cargo");
            (false, duration, format!("Failed to execute: {}", e))
        }
    }
}

fn main() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
    print_test_categories();

    let total_start = Instant::now();
    let results: Vec<_> = TEST_CATEGORIES
        .iter()
        .map(|category| {
            let (success, duration, summary) = run_test_category(category);
            (category.name, success, duration, summary)
        })
        .collect();
    let total_duration = total_start.elapsed();

    println!("\n{}", "=".repeat(80));
    println!("FINAL SUMMARY");
    println!("{}", "=".repeat(80));

    let failed = results.iter().filter(|(_, s, _, _)| !*s).count();
    println!(
        "\nCategories: {} | Passed: {} | Failed: {}",
        results.len(),
        results.len() - failed,
        failed
    );
    println!("Total Duration: {:?}\n", total_duration);

    println!("{:<30} {:<10} {:<15} {}", "Category", "Status", "Duration", "Details");
    println!("{}", "-".repeat(80));
    for (name, success, duration, summary) in &results {
        let status = if *success { "PASS" } else { "FAIL" };
        println!("{:<30} {:<10} {:<15?} {}", name, status, duration, summary);
    }
    println!("{}", "=".repeat(80));

    if failed > 0 {
        std::process::exit(1);
    }
}
