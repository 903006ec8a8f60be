//! Check command - parse and validate an element catalog.

use std::path::PathBuf;

use satsky::catalog::Catalog;
use satsky::elements::ChecksumWarning;
use serde_json::json;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the check command.
pub struct CheckArgs {
    pub tle_dir: Option<PathBuf>,
    pub json: bool,
}

/// Run the check command.
pub fn run(mut runner: CliRunner, args: CheckArgs) -> Result<(), CliError> {
    runner.log_startup("check");
    if let Some(dir) = args.tle_dir {
        runner.config_mut().catalog.tle_dir = dir;
    }

    let catalog = runner.load_catalog()?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report(&catalog))?);
    } else {
        print_table(&catalog);
    }
    Ok(())
}

fn warning_json(warning: &ChecksumWarning) -> serde_json::Value {
    json!({
        "name": warning.name,
        "line": warning.line,
        "found": warning.found,
        "expected": warning.expected,
    })
}

fn report(catalog: &Catalog) -> serde_json::Value {
    let objects: Vec<_> = catalog
        .records()
        .iter()
        .zip(catalog.objects().iter())
        .enumerate()
        .map(|(index, (record, descriptor))| {
            json!({
                "index": index,
                "source": catalog.sources().get(index).map(|p| p.display().to_string()),
                "descriptor": descriptor,
                "record": record,
                "regime": record.orbit_regime(),
                "epoch": record.epoch_datetime().map(|t| t.and_utc().to_rfc3339()),
            })
        })
        .collect();

    json!({
        "objects": objects,
        "checksum_warnings": catalog.warnings().iter().map(warning_json).collect::<Vec<_>>(),
    })
}

fn print_table(catalog: &Catalog) {
    println!("Element Catalog");
    println!("===============");
    println!();
    println!(
        "{:>5}  {:<6} {:<24} {:>9} {:>10} {:>12}  {:<5} Epoch",
        "#", "ID", "Name", "Incl", "Ecc", "Rev/day", "Orbit"
    );

    for (index, (record, descriptor)) in catalog
        .records()
        .iter()
        .zip(catalog.objects().iter())
        .enumerate()
    {
        let epoch = record
            .epoch_datetime()
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "(invalid)".to_string());
        println!(
            "{:>5}  {:<6} {:<24} {:>9.4} {:>10.7} {:>12.8}  {:<5} {}",
            index,
            record.catalog_id,
            truncate(&descriptor.name, 24),
            record.inclination_deg,
            record.eccentricity,
            record.mean_motion,
            format!("{:?}", record.orbit_regime()),
            epoch
        );
    }

    println!();
    println!("{} objects", catalog.len());

    if !catalog.warnings().is_empty() {
        println!();
        println!("Checksum warnings ({}):", catalog.warnings().len());
        for warning in catalog.warnings() {
            println!("  {}", warning);
        }
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
        cut.push('…');
        cut
    }
}
