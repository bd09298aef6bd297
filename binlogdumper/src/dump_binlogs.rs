use mysql_replication_rs::{
    binlog_client::BinlogClient,
    event::{event_data::EventData, event_type::EventType},
    BinlogError, BinlogPosition,
};

use crate::event_output::{create_event_output_request, event_output_worker};

use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{info, warn};

pub struct DumpOptions {
    pub url: String,
    pub server_id: u64,
    pub binlog_file: String,
    pub binlog_position: u32,
    pub stop_at: String,
    pub event_types: String,
    pub excluded_dbs: String,
    pub excluded_objects: String,
    pub heartbeat_secs: u64,
    pub timeout_secs: u64,
    pub max_events: u64,
    pub max_duration_secs: u64,
    pub output: String,
}

struct StopCondition {
    file: Option<String>,
    position: Option<u32>,
    max_events: u64,
    max_duration: u64,
    start_time: Instant,
}

impl StopCondition {
    fn new(stop_at: &str, max_events: u64, max_duration: u64) -> Self {
        let (file, position) = if stop_at.is_empty() {
            (None, None)
        } else if let Some((file, pos)) = stop_at.split_once(':') {
            (Some(file.to_string()), pos.parse::<u32>().ok())
        } else {
            (Some(stop_at.to_string()), None)
        };
        Self {
            file,
            position,
            max_events,
            max_duration,
            start_time: Instant::now(),
        }
    }

    fn should_stop(&self, current: &BinlogPosition, event_count: u64) -> bool {
        if self.max_duration > 0 && self.start_time.elapsed() >= Duration::from_secs(self.max_duration) {
            info!("time limit of {} seconds reached", self.max_duration);
            return true;
        }
        if self.max_events > 0 && event_count >= self.max_events {
            return true;
        }
        if let Some(stop_file) = &self.file {
            if &current.filename == stop_file {
                return self.position.map_or(true, |p| current.offset >= p);
            }
        }
        false
    }
}

fn set_excluded_items(excluded_objects: &str) -> Option<Vec<String>> {
    if excluded_objects.is_empty() {
        None
    } else {
        Some(
            excluded_objects
                .split(',')
                .map(|s| s.trim().to_string())
                .collect::<Vec<_>>(),
        )
    }
}

fn object_excluded(
    excluded_dbs: &Option<Vec<String>>,
    excluded_objects: &Option<Vec<String>>,
    schema_name: &str,
    table_name: &str,
) -> bool {
    if excluded_dbs
        .as_ref()
        .map_or(false, |excluded| excluded.iter().any(|db| db == schema_name))
    {
        return true;
    }

    excluded_objects.as_ref().map_or(false, |excluded| {
        let full_name = format!("{}.{}", schema_name, table_name);
        let wildcard_name = format!("*.{}", table_name);
        excluded.contains(&full_name) || excluded.contains(&wildcard_name)
    })
}

fn table_of(data: &EventData) -> Option<(&str, &str)> {
    match data {
        EventData::TableMap(event) => Some((event.schema_name.as_str(), event.table_name.as_str())),
        data => data
            .as_dml_event()
            .map(|dml| (dml.schema_name(), dml.table_name())),
    }
}

/// Streams events to the output until a stop condition hits or the server
/// ends the stream. Returns the last position reached.
pub async fn dump_binlogs(options: DumpOptions) -> Result<BinlogPosition, BinlogError> {
    let event_types = EventType::parse_list(&options.event_types)?;
    let excluded_dbs = set_excluded_items(&options.excluded_dbs);
    let excluded_objects = set_excluded_items(&options.excluded_objects);
    let stop = StopCondition::new(
        &options.stop_at,
        options.max_events,
        options.max_duration_secs,
    );

    let (tx, rx) = mpsc::channel(500);
    let worker = tokio::spawn(event_output_worker(rx, options.output.clone()));

    let mut client = BinlogClient {
        url: options.url,
        binlog_filename: options.binlog_file,
        binlog_position: options.binlog_position,
        server_id: options.server_id,
        heartbeat_interval_secs: options.heartbeat_secs,
        timeout_secs: options.timeout_secs,
    };
    let mut stream = client.connect().await?;

    let mut event_count = 0;
    loop {
        let event = match stream.read().await? {
            Some(event) => event,
            None => {
                info!("binlog stream ended");
                break;
            }
        };

        if let EventData::Error(error) = &event.data {
            warn!("server error {}: {}", error.code, error.message);
            return Err(error.clone().into_error());
        }

        let wanted = event_types
            .as_ref()
            .map_or(true, |types| types.contains(&event.event_type()));
        let excluded = table_of(&event.data).map_or(false, |(schema, table)| {
            object_excluded(&excluded_dbs, &excluded_objects, schema, table)
        });

        if wanted && !excluded && !matches!(event.data, EventData::EmptyPayload) {
            if tx
                .send(create_event_output_request(stream.position(), event))
                .await
                .is_err()
            {
                warn!("output worker stopped");
                break;
            }
            event_count += 1;
        }

        if stop.should_stop(stream.position(), event_count) {
            info!(
                "stopping at {} after {} events (elapsed time: {:.2?})",
                stream.position(),
                event_count,
                stop.start_time.elapsed()
            );
            break;
        }
    }

    let position = stream.position().clone();
    stream.close()?;
    drop(tx);
    if let Err(e) = worker.await {
        warn!("output worker failed: {}", e);
    }
    Ok(position)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_excluded() {
        let dbs = set_excluded_items("mysql, sys");
        let objects = set_excluded_items("shop.audit,*.tmp");
        assert!(object_excluded(&dbs, &objects, "sys", "x"));
        assert!(object_excluded(&dbs, &objects, "shop", "audit"));
        assert!(object_excluded(&dbs, &objects, "crm", "tmp"));
        assert!(!object_excluded(&dbs, &objects, "shop", "orders"));
        assert!(!object_excluded(&None, &None, "mysql", "user"));
    }

    #[test]
    fn test_stop_condition() {
        let stop = StopCondition::new("mysql-bin.000003:500", 0, 0);
        assert!(!stop.should_stop(&BinlogPosition::new("mysql-bin.000002", 900), 1));
        assert!(!stop.should_stop(&BinlogPosition::new("mysql-bin.000003", 400), 1));
        assert!(stop.should_stop(&BinlogPosition::new("mysql-bin.000003", 500), 1));

        let by_file = StopCondition::new("mysql-bin.000003", 0, 0);
        assert!(by_file.should_stop(&BinlogPosition::new("mysql-bin.000003", 4), 1));

        let by_count = StopCondition::new("", 10, 0);
        assert!(!by_count.should_stop(&BinlogPosition::default(), 9));
        assert!(by_count.should_stop(&BinlogPosition::default(), 10));
    }
}
