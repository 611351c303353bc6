use chrono::NaiveDate;
use rust_decimal::Decimal;
use tempfile::TempDir;

use pharmabot_core::domain::order::OrderDraft;
use pharmabot_db::{CsvOrderLog, OrderLog, ORDER_LOG_HEADER};

#[tokio::test]
async fn confirmed_draft_lands_in_csv_with_fixed_columns() {
    let temp_dir = TempDir::new().expect("temp dir");
    let path = temp_dir.path().join("orders.csv");
    let log = CsvOrderLog::new(&path);

    let draft = OrderDraft {
        name: Some("Ma Thida".to_owned()),
        phone: Some("09 444 111".to_owned()),
        address: Some("မလို".to_owned()),
        items_text: Some("Paracetamol 500mg x 3, extra".to_owned()),
        total: Some(Decimal::new(1_050, 0)),
    };
    let at = NaiveDate::from_ymd_opt(2026, 1, 2)
        .and_then(|date| date.and_hms_opt(3, 4, 5))
        .expect("valid timestamp");

    log.append(&draft.to_record(at)).await.expect("append order");

    let contents = std::fs::read_to_string(&path).expect("read log");
    let mut lines = contents.lines();
    assert_eq!(lines.next(), Some(ORDER_LOG_HEADER.join(",").as_str()));
    assert_eq!(
        lines.next(),
        Some("2026-01-02 03:04:05,Ma Thida,09 444 111,မလို,\"Paracetamol 500mg x 3, extra\",\"1,050\"")
    );
    assert_eq!(lines.next(), None);
}

#[tokio::test]
async fn existing_file_is_appended_without_new_header() {
    let temp_dir = TempDir::new().expect("temp dir");
    let path = temp_dir.path().join("orders.csv");
    std::fs::write(&path, "datetime,name,phone,address,items,total\n").expect("seed header");

    let at = NaiveDate::from_ymd_opt(2026, 1, 2)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .expect("valid timestamp");
    CsvOrderLog::new(&path)
        .append(&OrderDraft::default().to_record(at))
        .await
        .expect("append order");

    let contents = std::fs::read_to_string(&path).expect("read log");
    assert_eq!(contents.matches("datetime").count(), 1);
    assert!(contents.ends_with("2026-01-02 00:00:00,,,,,0\n"));
}
