// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{bail, Result};
use std::env;
use std::path::Path;

use cap_table::{
    can_deliver_report, format_percent, load_entries, ownership_percent, CapTable,
    ReportData, ReportRequest,
};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("import") => run_import(&args[2..]),
        Some("report") => run_report(&args[2..]),
        Some("export") => run_export(&args[2..]),
        _ => run_ui_mode(),
    }
}

/// Headless import check: validate a JSON file and print the table it
/// would install, with the derived metrics.
fn run_import(args: &[String]) -> Result<()> {
    let path = match args.first() {
        Some(path) => Path::new(path),
        None => bail!("usage: cap-table import <entries.json>"),
    };

    println!("📂 Importing {}...", path.display());
    let entries = load_entries(path)?;

    let mut table = CapTable::new();
    table.replace_all(entries);
    println!("✓ Imported {} entries", table.len());

    print_summary(&table);
    Ok(())
}

/// Build the report bundle for an imported table and print it as JSON.
/// Requires a destination address, same as any delivery collaborator.
fn run_report(args: &[String]) -> Result<()> {
    let (path, address) = match (args.first(), args.get(1)) {
        (Some(path), Some(address)) => (Path::new(path), address.as_str()),
        _ => bail!("usage: cap-table report <entries.json> <email>"),
    };

    if !can_deliver_report(address) {
        bail!("a destination email address is required before the report can be produced");
    }

    let entries = load_entries(path)?;
    let mut table = CapTable::new();
    table.replace_all(entries);
    table.submit();

    let request = ReportRequest::new(address, ReportData::build(&table))?;
    println!("{}", serde_json::to_string_pretty(&request)?);
    Ok(())
}

/// Convert a JSON entries file to CSV (or re-export normalized JSON)
fn run_export(args: &[String]) -> Result<()> {
    let (input, output) = match (args.first(), args.get(1)) {
        (Some(input), Some(output)) => (Path::new(input), Path::new(output)),
        _ => bail!("usage: cap-table export <entries.json> <out.csv|out.json>"),
    };

    let entries = load_entries(input)?;

    let is_json = output
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if is_json {
        cap_table::export::write_json(output, &entries)?;
    } else {
        cap_table::export::write_csv(output, &entries)?;
    }

    println!("✓ Exported {} entries to {}", entries.len(), output.display());
    Ok(())
}

fn print_summary(table: &CapTable) {
    let entries = table.entries();

    println!("\n📊 Cap table summary");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for entry in entries {
        println!(
            "  {:<24} {:>12} shares  {:>8}  ${:>14.2}",
            entry.display_name(),
            entry.shares,
            format_percent(ownership_percent(entry, entries)),
            entry.investment,
        );
    }
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("  Total shares:     {}", cap_table::total_shares(entries));
    println!("  Total investment: ${:.2}", cap_table::total_investment(entries));
    println!("  Pre-money:        ${:.2}", cap_table::pre_money_valuation(entries));
    println!("  Post-money:       ${:.2}", cap_table::post_money_valuation(entries));
}

#[cfg(feature = "tui")]
fn run_ui_mode() -> Result<()> {
    println!("🖥️  Loading Cap Table UI...\n");
    println!("Starting UI... (Press 'q' to quit)\n");

    let mut app = ui::App::new(CapTable::default());
    ui::run_ui(&mut app)?;

    println!("\n✅ UI closed successfully");
    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode() -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use the headless commands: import, report, export");
    std::process::exit(1);
}
