use data_loader::AdIndex;
use std::path::PathBuf;
use std::time::Instant;

fn main() {
    let data_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data/sample"));

    println!("Loading advertisement data from {}...\n", data_dir.display());

    let start = Instant::now();
    let index = AdIndex::load_from_files(&data_dir).expect("Failed to load advertisement data");
    let elapsed = start.elapsed();

    let (content, groups, customers) = index.counts();

    println!("\n=== Load Complete ===");
    println!("Time taken: {:?}", elapsed);
    println!("Marketplaces: {}", index.marketplace_ids().join(", "));
    println!("Content: {}", content);
    println!("Targeting groups: {}", groups);
    println!("Customers: {}", customers);
    println!(
        "\nPerformance: {:.0} records/second",
        (content + groups + customers) as f64 / elapsed.as_secs_f64()
    );
}
