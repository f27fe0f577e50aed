/// Rewiring Example
///
/// This example demonstrates:
/// - Loading rows and columns from JSON
/// - Compiling a text filter into per-column predicates
/// - Moving a filter view between two roots at runtime
/// - Exporting the final view as JSON

use tableview::{compile_filters, export, parse_columns, parse_rows, parse_sorts, ColumnSpec, FilterView, RootView, SortView, View};

const COLUMNS: &str = r#"[
    {"id": "name", "width": 120},
    {"id": "team"},
    {"id": "score", "align": "right", "className": "numeric"}
]"#;

const SPRING: &str = r#"[
    {"name": "Alice", "team": "red", "score": 91},
    {"name": "Bob", "team": "blue", "score": 78},
    {"name": "Ann", "team": "blue", "score": 88},
    {"name": "Carl", "team": "red", "score": null}
]"#;

const AUTUMN: &str = r#"[
    {"name": "Abe", "team": "red", "score": 95},
    {"name": "Dora", "team": "blue", "score": 99},
    {"name": "Amy", "team": "red", "score": 85}
]"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== TableView Rewiring Example ===\n");

    let descriptors: Vec<_> = parse_columns(COLUMNS)?.into_iter().map(ColumnSpec::into_descriptor).collect();
    let spring = RootView::new(&descriptors, parse_rows(SPRING)?);
    let autumn = RootView::new(&descriptors, parse_rows(AUTUMN)?);

    // 1. Filter and sort the spring results
    println!("1. Spring results, names starting with A, best first:");
    let filtered = FilterView::with_filters(spring.clone(), compile_filters("name ^= 'A' AND score IS NOT NULL")?);
    let sorted = SortView::with_sorts(filtered.clone(), parse_sorts("score:desc")?);
    for row in sorted.data().iter() {
        println!("   {} ({})", row["name"], row["score"]);
    }
    println!();

    // 2. Point the same filter at the autumn root
    println!("2. Rewiring filter to autumn results...");
    filtered.set_parent(autumn.clone());
    for row in sorted.data().iter() {
        println!("   {} ({})", row["name"], row["score"]);
    }
    println!("   spring listeners left: {}\n", spring.listeners().len());

    // 3. Export
    println!("3. Exported view:");
    println!("{}", serde_json::to_string_pretty(&export(&*sorted)?)?);

    println!("\n=== Example Complete ===");
    Ok(())
}
