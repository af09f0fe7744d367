//! Final results, as text or JSON
//!
//! The JSON form is meant for CI jobs that want to archive or diff runs.

use crate::tester::ApiTester;
use serde::Serialize;

/// Summary of a complete run
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub base_url: String,
    pub tests_run: usize,
    pub tests_passed: usize,
    pub tests_failed: usize,
    pub success_rate: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<String>,
    pub created_actors: Vec<CreatedEntry>,
    pub created_movies: Vec<CreatedEntry>,
}

/// A record created during the run
#[derive(Debug, Serialize)]
pub struct CreatedEntry {
    pub id: String,
    pub name: String,
}

impl RunSummary {
    pub fn from_tester(tester: &ApiTester) -> Self {
        Self {
            base_url: tester.base_url().to_string(),
            tests_run: tester.tests_run,
            tests_passed: tester.tests_passed,
            tests_failed: tester.tests_run - tester.tests_passed,
            success_rate: success_rate(tester.tests_passed, tester.tests_run),
            failures: tester.failures.clone(),
            created_actors: tester
                .created_actors
                .iter()
                .map(|a| CreatedEntry::new(&a.id, &a.name))
                .collect(),
            created_movies: tester
                .created_movies
                .iter()
                .map(|m| CreatedEntry::new(&m.id, &m.name))
                .collect(),
        }
    }

    pub fn all_passed(&self) -> bool {
        self.tests_failed == 0
    }

    pub fn print_text(&self) {
        println!("\nFINAL RESULTS");
        println!("{}", "=".repeat(50));
        println!("Tests run: {}", self.tests_run);
        println!("Tests passed: {}", self.tests_passed);
        println!("Success rate: {:.1}%", self.success_rate);

        print_created("actors", &self.created_actors);
        print_created("movies", &self.created_movies);

        if self.all_passed() {
            println!("\nAll tests passed!");
        } else {
            println!("\n{} test(s) failed", self.tests_failed);
            for failure in &self.failures {
                println!("  - {}", failure);
            }
        }
    }
}

impl CreatedEntry {
    fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
        }
    }
}

fn print_created(kind: &str, entries: &[CreatedEntry]) {
    if entries.is_empty() {
        return;
    }
    println!("\nCreated {} {}:", entries.len(), kind);
    for entry in entries {
        println!("  - {} (ID: {})", entry.name, entry.id);
    }
}

/// Percentage of passed tests; an empty run counts as fully successful
pub fn success_rate(passed: usize, run: usize) -> f64 {
    if run == 0 {
        return 100.0;
    }
    passed as f64 / run as f64 * 100.0
}

/// Print JSON output to stdout
pub fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing JSON: {}", e);
            std::process::exit(1);
        }
    }
}
