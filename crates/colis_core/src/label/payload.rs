use crate::model::record::{RecordId, ShipmentDetails, ShipmentRecord};
use crate::model::timestamp::format_timestamp;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter, Write};

static LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([^:]+?)\s*:\s*(.*?)\s*$").expect("valid line regex"));
static TITLE_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^COLIS\s*#\s*(\d+)$").expect("valid title regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Section {
    Header,
    Sender,
    Recipient,
    Package,
}

impl Section {
    fn name(self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::Sender => "EXPEDITEUR",
            Self::Recipient => "DESTINATAIRE",
            Self::Package => "COLIS",
        }
    }

    fn from_title(folded: &str) -> Option<Self> {
        match folded {
            "EXPEDITEUR" => Some(Self::Sender),
            "DESTINATAIRE" => Some(Self::Recipient),
            "COLIS" | "DETAILS COLIS" => Some(Self::Package),
            _ => None,
        }
    }
}

/// Shipment data recovered from a scanned label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShipmentLabel {
    pub record_id: RecordId,
    pub tracking_code: String,
    pub details: ShipmentDetails,
    /// Creation date as printed; kept verbatim.
    pub date: Option<String>,
}

/// Result of reading a QR payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScannedPayload {
    /// Text carrying an `ID` entry: a shipment label.
    Shipment(ShipmentLabel),
    /// Any other content, returned untouched.
    Text { raw: String },
}

/// Label text carried an ID but could not be read as a shipment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelError {
    InvalidId(String),
    MissingField {
        section: &'static str,
        key: &'static str,
    },
    InvalidNumber {
        key: &'static str,
        value: String,
    },
}

impl Display for LabelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidId(value) => write!(f, "label id `{value}` is not a number"),
            Self::MissingField { section, key } => {
                write!(f, "label is missing `{key}` in section {section}")
            }
            Self::InvalidNumber { key, value } => {
                write!(f, "label value `{value}` for `{key}` is not a number")
            }
        }
    }
}

impl Error for LabelError {}

/// Returns the human tracking code printed for a record, e.g. `TR000042`.
pub fn tracking_code(id: RecordId) -> String {
    format!("TR{id:06}")
}

/// Renders the QR payload text for a record.
///
/// Line breaks inside values are flattened to spaces so every entry stays on
/// one line.
pub fn render_label(record: &ShipmentRecord) -> String {
    let details = &record.details;
    let mut out = String::new();
    let mut line = |key: &str, value: &str| {
        let _ = if value.is_empty() {
            writeln!(out, "{key}:")
        } else {
            writeln!(out, "{key}: {}", flatten(value))
        };
    };

    line("ID", &record.id.to_string());
    line("Suivi", &tracking_code(record.id));
    line("EXPEDITEUR", "");
    line("Nom", &details.name_exp);
    line("Ville", &details.city_exp);
    line("Tel", &details.phone_exp);
    line("DESTINATAIRE", "");
    line("Nom", &details.name_dest);
    line("Ville", &details.city_dest);
    line("Tel", &details.phone_dest);
    line("COLIS", "");
    line("Nombre", &details.nmbr_package.to_string());
    line("Type", &details.gender_package);
    line("Valeur", &format!("{} €", details.value_package));
    line("Poids", &format!("{} Kg", details.kilos));
    line("Prix", &format!("{} €", details.price));
    line("Date", &format_timestamp(&record.created_at));

    out
}

/// Parses scanned QR text.
///
/// Accepts labels rendered by [`render_label`] as well as the older layout
/// titled `COLIS #<id>` with accented keys (`EXPÉDITEUR`, `Tél`).
/// Text without an `ID` entry (case-sensitive) is returned as
/// [`ScannedPayload::Text`].
pub fn parse_label(text: &str) -> Result<ScannedPayload, LabelError> {
    let mut section = Section::Header;
    let mut raw_id: Option<String> = None;
    let mut values: HashMap<(Section, String), String> = HashMap::new();

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let folded_line = fold(trimmed);
        if let Some(caps) = TITLE_ID_RE.captures(&folded_line) {
            raw_id = Some(caps[1].to_string());
            continue;
        }

        let Some(caps) = LINE_RE.captures(trimmed) else {
            continue;
        };
        let raw_key = caps[1].trim();
        let key = fold(raw_key);
        let value = caps[2].to_string();

        if value.is_empty() {
            if let Some(next) = Section::from_title(&key) {
                section = next;
                continue;
            }
        }

        // Only the exact `ID` key marks a shipment label.
        if section == Section::Header && raw_key == "ID" {
            raw_id = Some(value);
            continue;
        }
        values.entry((section, key)).or_insert(value);
    }

    let Some(raw_id) = raw_id else {
        return Ok(ScannedPayload::Text {
            raw: text.to_string(),
        });
    };
    let record_id = raw_id
        .trim()
        .parse::<RecordId>()
        .map_err(|_| LabelError::InvalidId(raw_id.clone()))?;

    let reader = LabelReader { values: &values };
    let details = ShipmentDetails {
        name_exp: reader.text(Section::Sender, "NOM")?,
        city_exp: reader.text(Section::Sender, "VILLE")?,
        phone_exp: reader.text(Section::Sender, "TEL")?,
        name_dest: reader.text(Section::Recipient, "NOM")?,
        phone_dest: reader.text(Section::Recipient, "TEL")?,
        city_dest: reader.text(Section::Recipient, "VILLE")?,
        nmbr_package: reader.integer(Section::Package, "NOMBRE")?,
        gender_package: reader.text(Section::Package, "TYPE")?,
        value_package: reader.number(Section::Package, "VALEUR")?,
        kilos: reader.number(Section::Package, "POIDS")?,
        price: reader.number(Section::Package, "PRIX")?,
    };

    Ok(ScannedPayload::Shipment(ShipmentLabel {
        record_id,
        tracking_code: tracking_code(record_id),
        details,
        date: reader.optional(Section::Package, "DATE"),
    }))
}

struct LabelReader<'a> {
    values: &'a HashMap<(Section, String), String>,
}

impl LabelReader<'_> {
    fn optional(&self, section: Section, key: &'static str) -> Option<String> {
        self.values.get(&(section, key.to_string())).cloned()
    }

    fn text(&self, section: Section, key: &'static str) -> Result<String, LabelError> {
        self.optional(section, key)
            .ok_or(LabelError::MissingField {
                section: section.name(),
                key,
            })
    }

    fn integer(&self, section: Section, key: &'static str) -> Result<i64, LabelError> {
        let value = self.text(section, key)?;
        strip_unit(&value)
            .parse()
            .map_err(|_| LabelError::InvalidNumber { key, value })
    }

    fn number(&self, section: Section, key: &'static str) -> Result<f64, LabelError> {
        let value = self.text(section, key)?;
        strip_unit(&value)
            .parse()
            .map_err(|_| LabelError::InvalidNumber { key, value })
    }
}

/// Uppercases and drops the accents used in label keys.
fn fold(value: &str) -> String {
    value
        .trim()
        .to_uppercase()
        .replace(['É', 'È', 'Ê'], "E")
}

fn strip_unit(value: &str) -> &str {
    value
        .trim()
        .trim_end_matches(|c: char| c == '€' || c.is_ascii_alphabetic() || c.is_whitespace())
}

fn flatten(value: &str) -> String {
    value.replace(['\r', '\n'], " ")
}
