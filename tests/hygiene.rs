//! Hygiene: enforces coding standards at test time.
//!
//! Scans the production sources under `src/` for antipatterns. Each pattern
//! has a budget (ideally zero). If you must add one, fix an existing one
//! first; budgets never grow.
#![allow(clippy::absurd_extreme_comparisons)]

use std::fs;
use std::path::Path;

struct SourceFile {
    path: String,
    content: String,
}

/// A banned substring and how many occurrences are tolerated.
struct Budget {
    pattern: &'static str,
    max: usize,
    why: &'static str,
}

// Panics crash the host process; silent discards lose errors.
const LIBRARY_BUDGETS: &[Budget] = &[
    Budget { pattern: ".unwrap()", max: 0, why: "panics" },
    Budget { pattern: ".expect(", max: 0, why: "panics" },
    Budget { pattern: "panic!(", max: 0, why: "panics" },
    Budget { pattern: "unreachable!(", max: 0, why: "panics" },
    Budget { pattern: "todo!(", max: 0, why: "stub" },
    Budget { pattern: "unimplemented!(", max: 0, why: "stub" },
    Budget { pattern: "let _ =", max: 0, why: "silent discard" },
    Budget { pattern: ".ok()", max: 0, why: "silent discard" },
    Budget { pattern: "#[allow(dead_code)]", max: 0, why: "dead code" },
    Budget { pattern: "dbg!(", max: 0, why: "debug output" },
];

// The library reports through `tracing`; only the binary prints.
const PRINT_BUDGETS: &[Budget] = &[
    Budget { pattern: "println!(", max: 0, why: "library output goes through tracing" },
    Budget { pattern: "eprintln!(", max: 0, why: "library output goes through tracing" },
];

/// Production `.rs` files under `src/`, excluding `*_test.rs`.
fn source_files() -> Vec<SourceFile> {
    let mut files = Vec::new();
    collect_rs_files(Path::new("src"), &mut files);
    files
}

fn collect_rs_files(dir: &Path, out: &mut Vec<SourceFile>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_rs_files(&path, out);
        } else if path.extension().is_some_and(|e| e == "rs") {
            let path_str = path.to_string_lossy().to_string();
            if path_str.ends_with("_test.rs") {
                continue;
            }
            if let Ok(content) = fs::read_to_string(&path) {
                out.push(SourceFile { path: path_str, content });
            }
        }
    }
}

fn count_in_source(files: &[&SourceFile], pattern: &str) -> Vec<(String, usize)> {
    files
        .iter()
        .filter_map(|file| {
            let count = file.content.lines().filter(|line| line.contains(pattern)).count();
            (count > 0).then(|| (file.path.clone(), count))
        })
        .collect()
}

fn check_budgets(files: &[&SourceFile], budgets: &[Budget]) {
    let mut failures = Vec::new();
    for budget in budgets {
        let hits = count_in_source(files, budget.pattern);
        let count: usize = hits.iter().map(|(_, c)| c).sum();
        if count > budget.max {
            let detail: Vec<String> = hits.iter().map(|(path, n)| format!("    {path}: {n}")).collect();
            failures.push(format!(
                "`{}` ({}) budget exceeded: found {count}, max {}\n{}",
                budget.pattern,
                budget.why,
                budget.max,
                detail.join("\n")
            ));
        }
    }
    assert!(failures.is_empty(), "{}", failures.join("\n"));
}

#[test]
fn panic_and_discard_budgets() {
    let files = source_files();
    let refs: Vec<&SourceFile> = files.iter().collect();
    check_budgets(&refs, LIBRARY_BUDGETS);
}

#[test]
fn library_does_not_print() {
    let files = source_files();
    let library: Vec<&SourceFile> = files.iter().filter(|f| !f.path.ends_with("main.rs")).collect();
    assert!(!library.is_empty());
    check_budgets(&library, PRINT_BUDGETS);
}

/// Every `#[path = "x_test.rs"]` points at a file, and every `*_test.rs`
/// file is wired into some module.
#[test]
fn test_modules_are_wired() {
    let files = source_files();
    let mut referenced = Vec::new();
    for file in &files {
        for line in file.content.lines() {
            let Some(rest) = line.trim().strip_prefix("#[path = \"") else {
                continue;
            };
            if let Some(name) = rest.strip_suffix("\"]") {
                assert!(Path::new("src").join(name).exists(), "{}: missing {name}", file.path);
                referenced.push(name.to_owned());
            }
        }
    }

    let Ok(entries) = fs::read_dir("src") else {
        return;
    };
    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().to_string();
        if name.ends_with("_test.rs") {
            assert!(referenced.contains(&name), "src/{name} is not referenced by any #[path]");
        }
    }
}
