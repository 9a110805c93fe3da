use anyhow::Result;
use clap::Parser;

use depfilter::{build_options, logger, run_filter, Args};

fn main() -> Result<()> {
    let args = Args::parse();
    logger::init(&args.log_level)?;

    let opts = match build_options(&args) {
        Ok(o) => o,
        Err(e) => {
            tracing::error!("{e:#}");
            return Err(e);
        }
    };

    let report = run_filter(&opts)?;

    if opts.dry_run {
        println!("== DRY RUN ({} mode) ==", report.mode);
        let mut keys: Vec<_> = report.selected.iter().map(|r| r.key()).collect();
        keys.sort();
        for key in keys {
            println!("{key}");
        }
    }

    let c = &report.counters;
    println!("== depfilter: Summary ==");
    println!("Mode:                 {}", report.mode);
    println!("Scanned files:        {}", c.scanned);
    println!("Previous manifest:    {}", c.previous);
    println!("Selected:             {}", c.selected);
    println!("  added/recent:       {}", c.added);
    println!("  removed:            {}", c.removed);
    println!("Archived:             {}", c.archived);
    match &report.archive {
        Some(path) => println!("Output at:            {:?}", path),
        None => println!("Output at:            (none)"),
    }

    Ok(())
}
