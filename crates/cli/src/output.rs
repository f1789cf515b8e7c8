//! Plain-text rendering of command results.

use t411_core::{Category, CategoryBranch, TermType, TorrentEntry};

fn parent(category: &Category) -> String {
    category
        .parent_id
        .map(|id| id.to_string())
        .unwrap_or_default()
}

pub fn print_categories(tree: &[CategoryBranch]) {
    println!("{:<30} {:<5} {:<5}", "Name", "PID", "ID");
    for branch in tree {
        let category = &branch.category;
        println!(
            "{:<30} {:<5} {:<5}",
            category.name,
            parent(category),
            category.id
        );
        for sub in &branch.sub_categories {
            println!("     {:<25} {:<5} {:<5}", sub.name, parent(sub), sub.id);
        }
    }
}

pub fn print_terms(category: &Category, term_types: &[TermType]) {
    println!("Terms for the category {} ({})", category.name, category.id);
    println!("{:<32} {:<10} {:<5}", "Name", "Mode", "Id");
    for term_type in term_types {
        println!(
            "{:<32} {:<10} {:<5}",
            term_type.name, term_type.mode, term_type.id
        );
        for term in &term_type.terms {
            println!("     {:<27} {:<10} {:<5}", term.name, "", term.id);
        }
    }
}

pub fn print_entries(entries: &[TorrentEntry]) {
    if entries.is_empty() {
        println!("No results");
        return;
    }

    for entry in entries {
        let verified = if entry.is_verified { "*" } else { " " };
        println!(
            "{}{:<9} {:<60} {:>6}S {:>5}L {:>10} {}",
            verified,
            entry.id,
            entry.name,
            entry.seeders,
            entry.leechers,
            human_size(entry.size),
            entry.added.format("%Y-%m-%d %H:%M"),
        );
    }
}

fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}
