//! Module provides initialization of global application logger

use std::error::Error;

use chrono::{Local, SecondsFormat};
use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;
use log4rs::Handle;

/// Initializes the global logger for an application.
///
/// Messages are written both to the console and to the new file in the `logs` directory.
/// Messages of the ECS below info level are filtered out.
///
/// # Errors
/// An error is returned if log file cannot be created
/// or logger has already been initialized.
///
pub fn init() -> Result<Handle, Box<dyn Error + Send + Sync + 'static>> {
    let pattern = "{d:<35} [thread \"{T}\" id {({I}]):<6} {l:<5} {t} >> {m}{n}";
    let encoder = Box::new(PatternEncoder::new(pattern));

    let stdout = ConsoleAppender::builder().encoder(encoder.clone()).build();
    let file_name = format!(
        "logs/logfile_{}.log",
        Local::now()
            .to_rfc3339_opts(SecondsFormat::Secs, true)
            .replace(':', "-"),
    );
    let file = FileAppender::builder().encoder(encoder).build(file_name)?;

    let level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .appender(Appender::builder().build("file", Box::new(file)))
        .logger(Logger::builder().build("rampart_ecs", LevelFilter::Info))
        .build(
            Root::builder()
                .appenders(["stdout", "file"])
                .build(level),
        )?;
    Ok(log4rs::init_config(config)?)
}
