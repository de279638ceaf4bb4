//! Text and JSON rendering of command results.

use crate::error::CliResult;
use colis_core::label::{ScannedPayload, ShipmentLabel};
use colis_core::model::timestamp::format_timestamp;
use colis_core::{ModificationSummary, ShipmentRecord};
use serde::Serialize;

/// Selected output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Text,
    Json,
}

impl OutputMode {
    pub fn from_flag(json: bool) -> Self {
        if json {
            Self::Json
        } else {
            Self::Text
        }
    }
}

/// Prints `value` as pretty JSON, or `text` otherwise.
pub fn emit<T: Serialize + ?Sized>(mode: OutputMode, value: &T, text: &str) -> CliResult<()> {
    match mode {
        OutputMode::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputMode::Text => println!("{text}"),
    }
    Ok(())
}

/// One line per record, for `list` and `search`.
pub fn record_line(record: &ShipmentRecord) -> String {
    let details = &record.details;
    let mut line = format!(
        "#{:<5} {} ({}) -> {} ({})  {} x {}  {} Kg  {} €",
        record.id,
        details.name_exp,
        details.city_exp,
        details.name_dest,
        details.city_dest,
        details.nmbr_package,
        details.gender_package,
        details.kilos,
        details.price,
    );
    if let Some(status) = &record.status {
        line.push_str("  [");
        line.push_str(status);
        line.push(']');
    }
    line
}

pub fn record_table(records: &[ShipmentRecord]) -> String {
    if records.is_empty() {
        return "no records".to_string();
    }
    records
        .iter()
        .map(record_line)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Full detail view for `show`.
pub fn record_detail(record: &ShipmentRecord) -> String {
    let details = &record.details;
    let mut lines = vec![
        format!("Record #{}", record.id),
        format!(
            "Sender:      {} - {} - {}",
            details.name_exp, details.city_exp, details.phone_exp
        ),
        format!(
            "Recipient:   {} - {} - {}",
            details.name_dest, details.city_dest, details.phone_dest
        ),
        format!("Packages:    {} x {}", details.nmbr_package, details.gender_package),
        format!("Value:       {} €", details.value_package),
        format!("Weight:      {} Kg", details.kilos),
        format!("Price:       {} €", details.price),
        format!("Created at:  {}", format_timestamp(&record.created_at)),
    ];
    if let Some(modified_at) = &record.modified_at {
        lines.push(format!("Modified at: {}", format_timestamp(modified_at)));
    }
    if let Some(status) = &record.status {
        lines.push(format!("Status:      {status}"));
    }
    lines.join("\n")
}

pub fn history_table(entries: &[ModificationSummary]) -> String {
    if entries.is_empty() {
        return "no modifications".to_string();
    }
    entries
        .iter()
        .map(|entry| {
            let at = entry
                .modified_at
                .as_ref()
                .map(format_timestamp)
                .unwrap_or_else(|| "-".to_string());
            format!("{at}  {}", entry.action_type)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn scanned_payload(payload: &ScannedPayload) -> String {
    match payload {
        ScannedPayload::Shipment(ShipmentLabel {
            record_id,
            tracking_code,
            details,
            date,
        }) => {
            let mut lines = vec![
                format!("Shipment #{record_id} ({tracking_code})"),
                format!(
                    "Sender:    {} - {} - {}",
                    details.name_exp, details.city_exp, details.phone_exp
                ),
                format!(
                    "Recipient: {} - {} - {}",
                    details.name_dest, details.city_dest, details.phone_dest
                ),
                format!(
                    "Package:   {} x {}, {} Kg, value {} €, price {} €",
                    details.nmbr_package,
                    details.gender_package,
                    details.kilos,
                    details.value_package,
                    details.price
                ),
            ];
            if let Some(date) = date {
                lines.push(format!("Date:      {date}"));
            }
            lines.join("\n")
        }
        ScannedPayload::Text { raw } => format!("Text payload:\n{raw}"),
    }
}
