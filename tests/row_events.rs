mod common;

use common::*;
use mysql_replication_rs::{
    event::{dml_event::DmlType, event_data::EventData},
    BinlogError, BinlogParser, CellValue, ChecksumType, ColumnValue,
};

const LONG: u8 = 3;
const VARCHAR: u8 = 15;
const NEWDECIMAL: u8 = 246;
const STRING: u8 = 254;

fn products_table_map(table_id: u64) -> Vec<u8> {
    let columns = [
        Column::new(LONG, &[], "id"),
        Column::new(VARCHAR, &[200, 0], "name"),
        Column::new(NEWDECIMAL, &[10, 2], "price"),
    ];
    // id is the primary key
    let primary_key = metadata_field(8, &[0]);
    table_map_body(table_id, "shop", "products", &columns, &primary_key)
}

fn product_row(id: i32, name: &str, price: [u8; 5]) -> Vec<u8> {
    let mut row = vec![0];
    row.extend_from_slice(&id.to_le_bytes());
    row.extend_from_slice(&lenenc_str(name));
    row.extend_from_slice(&price);
    row
}

#[test]
fn test_table_map_then_write_rows() {
    let mut parser = BinlogParser::new(ChecksumType::Crc32);

    let table_map = parser
        .parse_frame(&frame(&event(TABLE_MAP, 300, &products_table_map(42), true)))
        .unwrap()
        .unwrap();
    match &table_map.data {
        EventData::TableMap(event) => {
            assert_eq!(event.schema_name, "shop");
            assert_eq!(event.table_name, "products");
            assert_eq!(event.primary_key_columns(), vec![0]);
        }
        other => panic!("unexpected {:?}", other),
    }
    assert!(parser.state().get_table_map(42).is_some());

    // 19.99 as DECIMAL(10,2)
    let row = product_row(1, "Widget", [0x80, 0x00, 0x00, 0x13, 0x63]);
    let body = rows_body_v2(42, 3, false, &[row]);
    let event = parser
        .parse_frame(&frame(&event(WRITE_ROWS_V2, 400, &body, true)))
        .unwrap()
        .unwrap();

    let EventData::WriteRows(write) = &event.data else {
        panic!("unexpected {:?}", event.data);
    };
    assert_eq!(write.table_name, "products");
    let rows = &write.rows;
    assert_eq!(rows.len(), 1);
    assert_eq!(
        rows.column_names.as_deref(),
        Some(&["id".to_string(), "name".to_string(), "price".to_string()][..])
    );
    assert_eq!(rows.cell(0, "id").unwrap().value(), Some(&ColumnValue::Long(1)));
    assert_eq!(
        rows.cell(0, "name").unwrap().value(),
        Some(&ColumnValue::String("Widget".into()))
    );
    assert_eq!(
        rows.cell(0, "price").unwrap().value(),
        Some(&ColumnValue::Decimal("19.99".into()))
    );

    let dml = event.data.as_dml_event().unwrap();
    assert_eq!(dml.dml_type(), DmlType::Insert);
    assert_eq!(dml.rows_as_json()[0]["name"], "Widget");
}

#[test]
fn test_update_rows_pairs_images() {
    let mut parser = BinlogParser::default();
    let columns = [
        Column::new(LONG, &[], "id"),
        Column::new(VARCHAR, &[80, 0], "owner"),
    ];
    let body = table_map_body(7, "crm", "accounts", &columns, &[]);
    parser.parse_frame(&frame(&event(TABLE_MAP, 100, &body, false))).unwrap();

    let image = |owner: &str| {
        let mut row = vec![0];
        row.extend_from_slice(&7i32.to_le_bytes());
        row.extend_from_slice(&lenenc_str(owner));
        row
    };
    let mut pair = image("Kerry");
    pair.extend_from_slice(&image("Linda"));
    let body = rows_body_v2(7, 2, true, &[pair]);
    let event = parser
        .parse_frame(&frame(&event(UPDATE_ROWS_V2, 200, &body, false)))
        .unwrap()
        .unwrap();

    let EventData::UpdateRows(update) = &event.data else {
        panic!("unexpected {:?}", event.data);
    };
    assert_eq!(update.rows.len(), 1);
    assert_eq!(
        update.rows.cell(0, "owner"),
        Some(&CellValue::Update {
            old: ColumnValue::String("Kerry".into()),
            new: ColumnValue::String("Linda".into()),
        })
    );
    assert_eq!(
        update.rows.cell(0, "id"),
        Some(&CellValue::Update {
            old: ColumnValue::Long(7),
            new: ColumnValue::Long(7),
        })
    );

    let json = update.rows.to_json();
    assert_eq!(json[0]["before"]["owner"], "Kerry");
    assert_eq!(json[0]["after"]["owner"], "Linda");
}

#[test]
fn test_delete_rows_with_null_cell() {
    let mut parser = BinlogParser::default();
    parser
        .parse_frame(&frame(&event(TABLE_MAP, 100, &products_table_map(5), false)))
        .unwrap();

    // name is NULL: null bitmap bit 1 set and no bytes for the cell
    let mut row = vec![0b010];
    row.extend_from_slice(&3i32.to_le_bytes());
    row.extend_from_slice(&[0x80, 0x00, 0x00, 0x01, 0x00]);
    let body = rows_body_v2(5, 3, false, &[row]);
    let event = parser
        .parse_frame(&frame(&event(DELETE_ROWS_V2, 200, &body, false)))
        .unwrap()
        .unwrap();

    let EventData::DeleteRows(delete) = &event.data else {
        panic!("unexpected {:?}", event.data);
    };
    assert_eq!(delete.rows.cell(0, "name").unwrap().value(), Some(&ColumnValue::None));
    assert_eq!(
        delete.rows.cell(0, "price").unwrap().value(),
        Some(&ColumnValue::Decimal("1.00".into()))
    );
}

#[test]
fn test_v1_write_rows_without_extra_data() {
    let mut parser = BinlogParser::default();
    parser
        .parse_frame(&frame(&event(TABLE_MAP, 100, &products_table_map(6), false)))
        .unwrap();

    let mut body = 6u64.to_le_bytes()[..6].to_vec();
    body.extend_from_slice(&[1, 0]);
    body.extend_from_slice(&[3, 0b111]);
    body.extend_from_slice(&product_row(2, "Gadget", [0x80, 0x00, 0x00, 0x05, 0x32]));
    let event = parser
        .parse_frame(&frame(&event(WRITE_ROWS_V1, 200, &body, false)))
        .unwrap()
        .unwrap();

    let EventData::WriteRows(write) = &event.data else {
        panic!("unexpected {:?}", event.data);
    };
    assert_eq!(
        write.rows.cell(0, "price").unwrap().value(),
        Some(&ColumnValue::Decimal("5.50".into()))
    );
}

#[test]
fn test_missing_table_map() {
    let mut parser = BinlogParser::default();
    let row = product_row(1, "Widget", [0x80, 0x00, 0x00, 0x13, 0x63]);
    let body = rows_body_v2(99, 3, false, &[row]);
    let err = parser
        .parse_frame(&frame(&event(WRITE_ROWS_V2, 400, &body, false)))
        .unwrap_err();
    assert!(matches!(err, BinlogError::MissingTableMetadata { table_id: 99 }));
    assert!(err.is_missing_table_metadata());
}

#[test]
fn test_truncated_row_reports_table() {
    let mut parser = BinlogParser::default();
    parser
        .parse_frame(&frame(&event(TABLE_MAP, 100, &products_table_map(8), false)))
        .unwrap();

    // the VARCHAR claims 50 bytes but the frame ends first
    let mut row = vec![0];
    row.extend_from_slice(&1i32.to_le_bytes());
    row.extend_from_slice(&[50, b'W']);
    let body = rows_body_v2(8, 3, false, &[row]);
    let err = parser
        .parse_frame(&frame(&event(WRITE_ROWS_V2, 200, &body, false)))
        .unwrap_err();
    assert!(matches!(
        err,
        BinlogError::EventDecode {
            table_id: Some(8),
            ..
        }
    ));

    // other tables keep decoding
    assert!(parser.state().get_table_map(8).is_some());
}

#[test]
fn test_table_map_replaces_previous_definition() {
    let mut parser = BinlogParser::default();
    parser
        .parse_frame(&frame(&event(TABLE_MAP, 100, &products_table_map(11), false)))
        .unwrap();
    let columns = [Column::new(LONG, &[], "only_id")];
    let body = table_map_body(11, "shop", "renamed", &columns, &[]);
    parser.parse_frame(&frame(&event(TABLE_MAP, 200, &body, false))).unwrap();

    let table_map = parser.state().get_table_map(11).unwrap();
    assert_eq!(table_map.table_name, "renamed");
    assert_eq!(table_map.columns.len(), 1);
}

#[test]
fn test_enum_and_set_columns() {
    let mut parser = BinlogParser::default();
    let columns = [
        // STRING carrying the real type in its metadata high byte
        Column::new(STRING, &[0xF7, 0x01], "size"),
        Column::new(STRING, &[0xF8, 0x01], "colors"),
    ];
    let mut extra = metadata_field(6, &string_tables(&[&["SMALL", "MEDIUM", "LARGE"]]));
    extra.extend_from_slice(&metadata_field(5, &string_tables(&[&["RED", "GREEN", "BLUE"]])));
    let body = table_map_body(3, "shop", "shirts", &columns, &extra);
    parser.parse_frame(&frame(&event(TABLE_MAP, 100, &body, false))).unwrap();

    let rows = vec![vec![0, 2, 0b101], vec![0, 0, 0], vec![0, 4, 0b010]];
    let body = rows_body_v2(3, 2, false, &rows);
    let event = parser
        .parse_frame(&frame(&event(WRITE_ROWS_V2, 200, &body, false)))
        .unwrap()
        .unwrap();

    let EventData::WriteRows(write) = &event.data else {
        panic!("unexpected {:?}", event.data);
    };
    let value = |row: usize, name: &str| write.rows.cell(row, name).unwrap().value().cloned();
    assert_eq!(value(0, "size"), Some(ColumnValue::Enum("MEDIUM".into())));
    assert_eq!(value(0, "colors"), Some(ColumnValue::Set("RED,BLUE".into())));
    assert_eq!(value(1, "size"), Some(ColumnValue::Enum(String::new())));
    assert_eq!(value(1, "colors"), Some(ColumnValue::Set(String::new())));
    assert_eq!(value(2, "size"), Some(ColumnValue::None));
    assert_eq!(value(2, "colors"), Some(ColumnValue::Set("GREEN".into())));
}
