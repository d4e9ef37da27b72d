//! CSV loading for line items and issue records.
//!
//! Columns are matched by header name, not position.
//! Items: `id,item_type,merchant,ordered,received_good` (merchant may be
//! empty). Issues:
//! `id,line_item,kind,quantity,description,status,reported_by,reported_at`.

use chrono::{DateTime, Utc};
use stockroom_receiving::model::{IssueKind, IssueRecord, IssueStatus};
use stockroom_receiving::LineItem;

fn header_indices<'a>(
    headers: &'a csv::StringRecord,
    names: &[&str],
) -> Result<Vec<usize>, String> {
    names
        .iter()
        .map(|name| {
            headers
                .iter()
                .position(|h| h == *name)
                .ok_or_else(|| format!("missing column '{name}'"))
        })
        .collect()
}

fn parse_qty(value: &str, column: &str, record_id: &str) -> Result<u32, String> {
    value
        .parse()
        .map_err(|_| format!("record '{record_id}': cannot parse {column} '{value}'"))
}

pub fn load_line_items(csv_data: &str) -> Result<Vec<LineItem>, String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(csv_data.as_bytes());
    let headers = reader.headers().map_err(|e| e.to_string())?.clone();
    let idx = header_indices(
        &headers,
        &["id", "item_type", "merchant", "ordered", "received_good"],
    )?;

    let mut items = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| e.to_string())?;
        let field = |i: usize| record.get(idx[i]).unwrap_or("");
        let id = field(0).to_string();
        let merchant = field(2);
        items.push(LineItem {
            item_type_id: field(1).to_string(),
            merchant_id: if merchant.is_empty() { None } else { Some(merchant.to_string()) },
            ordered: parse_qty(field(3), "ordered", &id)?,
            received_good: parse_qty(field(4), "received_good", &id)?,
            id,
        });
    }
    Ok(items)
}

pub fn load_issues(csv_data: &str) -> Result<Vec<IssueRecord>, String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(csv_data.as_bytes());
    let headers = reader.headers().map_err(|e| e.to_string())?.clone();
    let idx = header_indices(
        &headers,
        &[
            "id",
            "line_item",
            "kind",
            "quantity",
            "description",
            "status",
            "reported_by",
            "reported_at",
        ],
    )?;

    let mut issues = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| e.to_string())?;
        let field = |i: usize| record.get(idx[i]).unwrap_or("");
        let id = field(0).to_string();

        let kind: IssueKind = field(2)
            .parse()
            .map_err(|()| format!("record '{id}': unknown issue kind '{}'", field(2)))?;
        let status: IssueStatus = field(5)
            .parse()
            .map_err(|()| format!("record '{id}': unknown status '{}'", field(5)))?;
        let reported_at = DateTime::parse_from_rfc3339(field(7))
            .map_err(|_| format!("record '{id}': cannot parse reported_at '{}'", field(7)))?
            .with_timezone(&Utc);

        issues.push(IssueRecord {
            line_item_id: field(1).to_string(),
            kind,
            quantity: parse_qty(field(3), "quantity", &id)?,
            description: field(4).to_string(),
            status,
            reported_by: field(6).to_string(),
            reported_at,
            resolution: None,
            id,
        });
    }
    Ok(issues)
}
