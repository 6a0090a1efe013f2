use anyhow::Context;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tradescope::datasource::PriceField;
use tradescope::engine::open_positions;
use tradescope::feed::{read_events, Replayer};
use tradescope::{config::Config, Table};

fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&config) {
        eprintln!("Analysis failed: {:#}", e);
        std::process::exit(1);
    }
}

fn run(config: &Config) -> anyhow::Result<()> {
    let file = File::open(&config.events_path)
        .with_context(|| format!("opening {}", config.events_path.display()))?;
    let events = read_events(BufReader::new(file))
        .with_context(|| format!("reading {}", config.events_path.display()))?;
    tracing::info!(events = events.len(), "Loaded simulation events");

    let mut replayer = Replayer::new();
    replayer.run(&events).context("replaying simulation events")?;

    std::fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("creating {}", config.output_dir.display()))?;

    let trades = replayer.trade_analyzer().get_analysis();
    write_table(&config.output_dir, "trades.csv", &trades)?;

    let portfolio = replayer.portfolio_analyzer().get_analysis();
    write_table(&config.output_dir, "position_qty.csv", &portfolio.position_qty)?;
    write_table(&config.output_dir, "position_value.csv", &portfolio.position_value)?;
    write_table(&config.output_dir, "position_wgt.csv", &portfolio.position_wgt)?;
    write_table(&config.output_dir, "performance.csv", &portfolio.performance)?;

    match replayer
        .portfolio_analyzer()
        .realized_volatility(config.vol_lookback, config.periods_per_year)
    {
        Ok(vol) => tracing::info!(
            look_back = config.vol_lookback,
            volatility = %vol,
            "Realized portfolio volatility"
        ),
        Err(e) => tracing::warn!(error = %e, "Realized volatility unavailable"),
    }

    let marks = open_positions(replayer.positions(), replayer.prices(), PriceField::Close, 0)
        .context("marking open positions")?;
    for mark in marks.values() {
        tracing::info!(
            instrument = %mark.instrument,
            size = %mark.size,
            price = %mark.price,
            value = %mark.value(),
            "Open position"
        );
    }

    Ok(())
}

fn write_table(dir: &Path, name: &str, table: &Table) -> anyhow::Result<()> {
    let path = dir.join(name);
    let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    table
        .write_csv(file)
        .with_context(|| format!("writing {}", path.display()))?;
    tracing::info!(path = %path.display(), rows = table.len(), "Wrote table");
    Ok(())
}
