//! Ingest fund administrator reports into a CSV-backed investor-flow tracker
//!
//! Usage: cargo run --example ingest_report -- <tracker.csv> <report>...

use fundflow_core::utils::CsvLedgerStore;
use fundflow_core::FlowTracker;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let tracker_path = args
        .next()
        .ok_or("usage: ingest_report <tracker.csv> <report>...")?;
    let reports: Vec<String> = args.collect();

    let mut tracker = FlowTracker::new(CsvLedgerStore::new(&tracker_path));

    println!("Ingesting {} report(s) into {tracker_path}\n", reports.len());
    for entry in tracker.ingest_reports(&reports).await {
        match &entry.result {
            Ok(outcome) => {
                println!("  ✓ {}", entry.path.display());
                println!("{}", serde_json::to_string_pretty(&outcome.stats)?);
                for issue in &outcome.issues {
                    println!("    row {} ({:?}): {}", issue.row, issue.kind, issue.message);
                }
            }
            Err(err) => println!("  ✗ {}: {err}", entry.path.display()),
        }
    }

    println!("\nInvestor summary:");
    let summary = tracker.investor_summary().await?;
    for row in summary.rows.iter().chain(std::iter::once(&summary.totals)) {
        println!(
            "  {:<30} actual {:>15}  forecast {:>15}  total {:>15}",
            row.entity_name, row.actual_net, row.forecast_net, row.total_net
        );
    }

    println!("\nMonthly net flows:");
    for month in tracker.monthly_net_flows().await? {
        println!(
            "  {}  actual {:>15}  forecast {:>15}",
            month.month, month.actual_net, month.forecast_net
        );
    }

    Ok(())
}
