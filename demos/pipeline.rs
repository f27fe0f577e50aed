/// Pipeline Example
///
/// This example demonstrates:
/// - Declaring columns with field and function accessors
/// - Wiring root → filter → sort → props with `Pipeline`
/// - Subscribing to the end of the chain
/// - Watching a root update flow through every stage

use std::collections::HashMap;
use std::rc::Rc;
use tableview::{
    Accessor, Align, CellValue, ColumnDescriptor, Columns, Filters, Pipeline, Props, Rows, SortKey, SortOrder, Sorts,
    View, CLASS_NAME,
};

type Row = HashMap<String, CellValue>;

fn product(name: &str, category: &str, price: f64, quantity: i64) -> Row {
    let mut row = HashMap::new();
    row.insert("product".to_string(), CellValue::from(name));
    row.insert("category".to_string(), CellValue::from(category));
    row.insert("price".to_string(), CellValue::Float(price));
    row.insert("quantity".to_string(), CellValue::Int(quantity));
    row
}

fn print_view(view: &dyn View<Row>) {
    for row in view.data().iter() {
        let cells: Vec<String> = view.columns().iter().map(|c| c.cell(row).to_string()).collect();
        let class = view.row_props(row).get(CLASS_NAME).unwrap_or("").to_string();
        println!("   {:<40} [{}]", cells.join(" | "), class);
    }
    println!();
}

fn main() {
    println!("=== TableView Pipeline Example ===\n");

    // 1. Declare columns
    println!("1. Declaring columns...");
    let columns = vec![
        ColumnDescriptor::new("product", "product").width(160.0),
        ColumnDescriptor::new("category", "category"),
        ColumnDescriptor::new("price", "price").align(Align::Right),
        ColumnDescriptor::new(
            "total",
            Accessor::func(|row: &Row| {
                let price = row["price"].as_f64().unwrap_or(0.0);
                let quantity = row["quantity"].as_f64().unwrap_or(0.0);
                CellValue::Float((price * quantity * 100.0).round() / 100.0)
            }),
        )
        .align(Align::Right),
    ];
    println!("   {} columns\n", columns.len());

    // 2. Build the pipeline
    println!("2. Building pipeline...");
    let rows = vec![
        product("Laptop", "Electronics", 999.99, 5),
        product("Mouse", "Electronics", 29.99, 20),
        product("Desk", "Furniture", 299.99, 3),
        product("Chair", "Furniture", 199.99, 8),
        product("Monitor", "Electronics", 399.99, 10),
    ];
    let pipeline = Pipeline::new(&columns, rows);
    let output = pipeline.output();
    print_view(&*output);

    // 3. Subscribe to the output
    let _subscription = output.subscribe(Rc::new(|_: &Columns<Row>, rows: &Rows<Row>| {
        println!("   -> update: {} rows", rows.len());
    }));

    // 4. Filter to electronics
    println!("3. Filtering to Electronics...");
    pipeline
        .filter()
        .set_filters(Filters::new().with("category", |v| v.as_str() == Some("Electronics")));
    print_view(&*output);

    // 5. Sort by total, largest first
    println!("4. Sorting by total (descending)...");
    pipeline
        .sort()
        .set_sorts(Sorts::new().by("total", SortKey::new(SortOrder::Descending, Default::default())));
    print_view(&*output);

    // 6. Decorate expensive rows
    println!("5. Highlighting rows over $300...");
    pipeline.props().set_props(|row: &Row| {
        if row["price"].as_f64().unwrap_or(0.0) > 300.0 {
            Props::class_name("expensive")
        } else {
            Props::new()
        }
    });
    print_view(&*output);

    // 7. Replace the root data; every stage recomputes
    println!("6. Replacing root data...");
    pipeline.root().set_data(vec![
        product("Tablet", "Electronics", 499.99, 4),
        product("Cable", "Electronics", 9.99, 50),
        product("Lamp", "Furniture", 49.99, 6),
    ]);
    print_view(&*output);

    println!("=== Example Complete ===");
}
