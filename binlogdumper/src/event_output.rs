use mysql_replication_rs::{
    event::{binlog_event::BinlogEvent, event_data::EventData},
    BinlogPosition,
};
use serde_json::{json, Value};
use tokio::{
    fs::File,
    io::{self, AsyncWrite, AsyncWriteExt},
    sync::mpsc,
};
use tracing::{error, info};

pub struct EventOutputRequest {
    position: BinlogPosition,
    event: BinlogEvent,
}

pub fn create_event_output_request(position: &BinlogPosition, event: BinlogEvent) -> EventOutputRequest {
    EventOutputRequest {
        position: position.clone(),
        event,
    }
}

/// One JSON object per event; rows events are flattened into schema, table
/// and rendered rows.
pub fn event_to_json(req: &EventOutputRequest) -> Value {
    let header = &req.event.header;
    let mut value = json!({
        "binlog_file": req.position.filename,
        "binlog_position": req.position.offset,
        "timestamp": header.timestamp,
        "server_id": header.server_id,
        "event_type": format!("{:?}", req.event.event_type()),
    });

    let body = if let Some(dml) = req.event.data.as_dml_event() {
        json!({
            "schema": dml.schema_name(),
            "table": dml.table_name(),
            "dml_type": dml.dml_type().to_string(),
            "row_count": dml.row_count(),
            "rows": dml.rows_as_json(),
        })
    } else {
        match &req.event.data {
            EventData::TableMap(event) => json!({
                "schema": event.schema_name,
                "table": event.table_name,
                "table_id": event.table_id,
                "columns": event.column_names(),
                "primary_key": event.primary_key_columns(),
            }),
            EventData::Gtid(event) => json!({ "gtid": event.gtid() }),
            EventData::PreviousGtids(event) => json!({ "gtid_set": event.gtid_set_string() }),
            data => serde_json::to_value(data).unwrap_or(Value::Null),
        }
    };
    value["data"] = body;
    value
}

async fn open_output(output: &str) -> io::Result<Box<dyn AsyncWrite + Unpin + Send>> {
    if output.is_empty() {
        Ok(Box::new(io::stdout()))
    } else {
        Ok(Box::new(File::create(output).await?))
    }
}

/// Writes requests as JSON lines until the sender side is dropped.
pub async fn event_output_worker(mut rx: mpsc::Receiver<EventOutputRequest>, output: String) -> u64 {
    let mut writer = match open_output(&output).await {
        Ok(writer) => writer,
        Err(e) => {
            error!("cannot open output {}: {}", output, e);
            return 0;
        }
    };

    let mut written = 0;
    while let Some(req) = rx.recv().await {
        let mut line = event_to_json(&req).to_string();
        line.push('\n');
        if let Err(e) = writer.write_all(line.as_bytes()).await {
            error!("error writing event: {}", e);
            break;
        }
        written += 1;
    }
    if let Err(e) = writer.flush().await {
        error!("error flushing output: {}", e);
    }
    info!("wrote {} events", written);
    written
}

#[cfg(test)]
mod tests {
    use mysql_replication_rs::event::{
        event_header::EventHeader, rotate_event::RotateEvent, xid_event::XidEvent,
    };

    use super::*;

    fn request(data: EventData, event_type: u8) -> EventOutputRequest {
        create_event_output_request(
            &BinlogPosition::new("mysql-bin.000001", 120),
            BinlogEvent {
                header: EventHeader {
                    event_type,
                    timestamp: 1_700_000_000,
                    ..Default::default()
                },
                data,
            },
        )
    }

    #[test]
    fn test_event_to_json() {
        let value = event_to_json(&request(EventData::Xid(XidEvent { xid: 5 }), 16));
        assert_eq!(value["binlog_file"], "mysql-bin.000001");
        assert_eq!(value["binlog_position"], 120);
        assert_eq!(value["event_type"], "Xid");
        assert_eq!(value["data"]["Xid"]["xid"], 5);
    }

    #[test]
    fn test_rotate_to_json() {
        let rotate = RotateEvent {
            binlog_filename: "mysql-bin.000002".into(),
            binlog_position: 4,
        };
        let value = event_to_json(&request(EventData::Rotate(rotate), 4));
        assert_eq!(value["data"]["Rotate"]["binlog_filename"], "mysql-bin.000002");
    }
}
