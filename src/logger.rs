//! Tracing subscribers for the environments and their binaries.

use std::fs::File;

use anyhow::Context;
use time::{
    format_description::{self, parse},
    OffsetDateTime, UtcOffset,
};
use tracing::{debug, subscriber::set_global_default, Level};
use tracing_subscriber::{
    fmt::{time::OffsetTime, writer::BoxMakeWriter},
    FmtSubscriber,
};

/// Log every event to a timestamped file in the current directory.
///
/// Does nothing if a global subscriber is already installed.
pub fn init_logger() -> anyhow::Result<()> {
    let file_name = get_log_file_name()?;
    let file = File::create(&file_name).with_context(|| format!("could not create log file {file_name}"))?;
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::TRACE)
        .with_ansi(false)
        .with_timer(local_timer()?)
        .with_writer(BoxMakeWriter::new(file))
        .finish();
    install(subscriber);
    Ok(())
}

/// Log events up to `level` on stderr.
///
/// Does nothing if a global subscriber is already installed.
pub fn init_console_logger(level: Level) -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_timer(local_timer()?)
        .with_writer(std::io::stderr)
        .finish();
    install(subscriber);
    Ok(())
}

fn install<S>(subscriber: S)
where
    S: tracing::Subscriber + Send + Sync + 'static,
{
    if set_global_default(subscriber).is_err() {
        debug!("a global tracing subscriber is already installed");
    }
}

fn local_timer() -> anyhow::Result<OffsetTime<Vec<format_description::BorrowedFormatItem<'static>>>> {
    let local_offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    let format = format_description::parse("[year]-[month]-[day] [hour]:[minute]:[second]")
        .context("invalid timestamp format")?;
    Ok(OffsetTime::new(local_offset, format))
}

fn get_log_file_name() -> anyhow::Result<String> {
    let format = parse("[year]-[month]-[day]_[hour]:[minute]:[second]_gym_log.txt").context("invalid log file format")?;
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    now.format(&format).context("could not format the log file name")
}
