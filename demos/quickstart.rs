//! Quickstart: aggregate one evaluation round

use fedeval::{ClientReport, Denominator, MetricsAggregator};

fn main() {
    println!("fedeval Quickstart Demo\n");

    let mut agg = MetricsAggregator::new(Denominator::PerMetric);

    println!("Simulating 3 clients with different dataset sizes...\n");

    let reports = vec![
        ClientReport::from_pairs(100, [("accuracy", 0.92), ("loss", 0.21)]),
        ClientReport::from_pairs(400, [("accuracy", 0.81), ("loss", 0.44)]),
        ClientReport::from_pairs(500, [("accuracy", 0.77), ("loss", 0.52)]),
    ];

    let result = agg.aggregate(&reports).expect("valid reports");

    println!("Aggregation complete!");
    for (name, value) in result.iter() {
        println!("   {:<10} {:.4}", name, value);
    }
    println!("\nLarger clients pull the mean toward their own values.");
}
