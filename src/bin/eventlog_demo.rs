//! eventlog-demo: end-to-end walk through the event log
//!
//! Records the start and end of a Golang Dorset meetup, looks the first event
//! up by code, then lists every event held in Bournemouth.
//!
//! ## Configuration
//! - EVENTLOG_CONFIG: Path to a YAML config file (optional)
//! - EVENTLOG__STORAGE__TYPE: sqlite (default), postgres or mysql
//! - EVENTLOG_LOG: Log filter (default: info)

use futures::StreamExt;
use tracing::{info, warn};

use eventlog::config::Config;
use eventlog::storage::init_storage;
use eventlog::utils::bootstrap::init_tracing;
use eventlog::{KeyValue, Metadata, NewEvent};

const MEETUP_BEGIN: &str = "golangdorset.meetup.begin";
const MEETUP_END: &str = "golangdorset.meetup.end";

fn meetup_metadata() -> Metadata {
    Metadata::new()
        .with("location", "Bournemouth")
        .with("attendees", "10")
        .with("organiser", "Golang Dorset")
        .with("talks", "2")
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = Config::load(None)?;
    let log = init_storage(&config.storage).await?;

    let events = [
        NewEvent::new(MEETUP_BEGIN, "Golang Dorset Meetup has begun.", meetup_metadata())?,
        NewEvent::new(MEETUP_END, "Golang Dorset Meetup has finished.", meetup_metadata())?,
    ];
    for event in &events {
        log.insert(event).await?;
    }
    info!(count = events.len(), "Inserted events");

    let first = log.find_by_code(MEETUP_BEGIN).await?;
    println!("{}", first);

    let location = KeyValue::new("location", "Bournemouth");
    let mut matches = log.find_by_metadata(&location);
    while let Some(result) = matches.next().await {
        match result {
            Ok(event) => println!("{}", event),
            Err(e) => warn!(error = %e, "Skipping unreadable event"),
        }
    }

    Ok(())
}
