extern crate pretty_env_logger;

#[macro_use]
extern crate log;

use clap::Parser;
use std::fs::File;
use std::io::{BufWriter, Write};

mod cli;

use crate::cli::ArgParser;
use kmeval::{Dataset, KMeans, Report};

fn run(args: &ArgParser) -> kmeval::Result<()> {
    let config = args.engine_config()?;
    let dataset = Dataset::from_path(&args.input)?;
    info!(
        "{} points, {} dimensions, {} classes",
        dataset.len(),
        dataset.dim(),
        dataset.num_classes()
    );

    let mut engine = KMeans::new(args.k, dataset.num_classes(), config);
    engine.fit(&dataset.points)?;
    let report = Report::new(&engine, &dataset)?;
    info!("scatter {:.4}", report.scatter);

    match &args.out {
        Some(path) => {
            let mut file = BufWriter::new(File::create(path)?);
            report.write_to(&mut file)?;
            file.flush()?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            report.write_to(&mut handle)?;
        }
    }
    Ok(())
}

fn main() {
    let args = ArgParser::parse();
    let level = if args.debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    pretty_env_logger::formatted_timed_builder()
        .filter_level(level)
        .init();

    if !args.validate() {
        std::process::exit(1);
    }

    if let Err(e) = run(&args) {
        error!("{}", e);
        std::process::exit(1);
    }
    info!("finished");
}
