use clap::Parser;
use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Config as LogConfig, Root};
use log4rs::encode::pattern::PatternEncoder;
use prefix_list_sync::config::{normalize_flags, Args, Config};
use std::error::Error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Do as little as possible in main.rs as it can't contain any tests
    init_logging()?;
    dotenv::dotenv().ok();
    log::info!("#Start main()");

    let args = Args::parse_from(normalize_flags(std::env::args()));
    let config = Config::try_from(args)?;

    for report in prefix_list_sync::run(config).await? {
        println!("{report}");
    }

    Ok(())
}

/// log4rs.yml from the working directory, or plain stderr at info.
fn init_logging() -> Result<(), Box<dyn Error>> {
    if log4rs::init_file("log4rs.yml", Default::default()).is_ok() {
        return Ok(());
    }
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} {h({l:5})} {t} - {m}{n}",
        )))
        .build();
    let config = LogConfig::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(LevelFilter::Info))?;
    log4rs::init_config(config)?;
    Ok(())
}
