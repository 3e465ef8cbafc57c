//! Compare denominator policies when clients report different metrics

use fedeval::{weighted_average, ClientReport, Denominator};

fn main() {
    println!("Comparing Denominator Policies\n");
    println!("Scenario: 3 clients report accuracy, only 1 reports f1\n");

    let reports = vec![
        ClientReport::from_pairs(100, [("accuracy", 0.9), ("f1", 0.8)]),
        ClientReport::from_pairs(100, [("accuracy", 0.8)]),
        ClientReport::from_pairs(100, [("accuracy", 0.7)]),
    ];

    for (name, denominator) in [
        ("PerMetric", Denominator::PerMetric),
        ("Global", Denominator::Global),
    ] {
        let result = weighted_average(&reports, denominator).expect("valid reports");
        println!(
            "{:<10} accuracy: {:.3}  f1: {:.3}",
            name,
            result.get("accuracy").unwrap_or_default(),
            result.get("f1").unwrap_or_default()
        );
    }

    println!("\nGlobal divides f1 by all 300 examples and reports 0.267 instead of 0.8.");
}
