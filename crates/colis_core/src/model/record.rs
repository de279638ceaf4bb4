//! Shipment record model and field-map validator.
//!
//! # Responsibility
//! - Define the stored shipment record and its typed editable details.
//! - Turn user-entered field maps into typed details, or explain why not.
//!
//! # Invariants
//! - Presence of every required field is checked before any format check.
//! - `phone_exp` and `phone_dest` contain ASCII digits only.
//! - Text fields are stored trimmed; numbers are finite.
//! - `created_at` is set once at insert; `modified_at` and `status` stay
//!   `None` until the first update.

use crate::model::timestamp::Timestamp;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+$").expect("valid phone regex"));

/// SQLite row id of a shipment record.
pub type RecordId = i64;

/// Status written on every successful update.
pub const STATUS_MODIFIED: &str = "Modifié";

/// Editable fields of a shipment, keyed by their column names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordField {
    NameExp,
    CityExp,
    PhoneExp,
    NameDest,
    PhoneDest,
    CityDest,
    NmbrPackage,
    GenderPackage,
    ValuePackage,
    Kilos,
    Price,
}

impl RecordField {
    /// Every field, in the order presence is validated.
    pub const ALL: [RecordField; 11] = [
        Self::NameExp,
        Self::CityExp,
        Self::PhoneExp,
        Self::NameDest,
        Self::PhoneDest,
        Self::CityDest,
        Self::NmbrPackage,
        Self::GenderPackage,
        Self::ValuePackage,
        Self::Kilos,
        Self::Price,
    ];

    /// Field-map key, identical to the `records` column name.
    pub fn key(self) -> &'static str {
        match self {
            Self::NameExp => "name_exp",
            Self::CityExp => "city_exp",
            Self::PhoneExp => "phone_exp",
            Self::NameDest => "name_dest",
            Self::PhoneDest => "phone_dest",
            Self::CityDest => "city_dest",
            Self::NmbrPackage => "nmbr_package",
            Self::GenderPackage => "gender_package",
            Self::ValuePackage => "value_package",
            Self::Kilos => "kilos",
            Self::Price => "price",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.key() == key)
    }
}

impl Display for RecordField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Reason a field map was rejected. Only the first failing check is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordValidationError {
    /// Field absent, empty or whitespace-only.
    MissingField(RecordField),
    /// `nmbr_package` is not an integer.
    InvalidInteger(RecordField),
    /// Value, weight or price is not a number.
    InvalidNumber(RecordField),
    /// Phone contains something other than digits.
    InvalidPhone(RecordField),
}

impl Display for RecordValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "field `{field}` is required"),
            Self::InvalidInteger(field) => write!(f, "field `{field}` must be a whole number"),
            Self::InvalidNumber(field) => write!(f, "field `{field}` must be a number"),
            Self::InvalidPhone(field) => {
                write!(f, "field `{field}` must contain digits only")
            }
        }
    }
}

impl Error for RecordValidationError {}

/// Raw user-entered field map, as submitted by a form.
///
/// Unknown keys are kept but ignored by validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordFields(BTreeMap<String, String>);

impl RecordFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefills a map from stored details, as an edit form would.
    pub fn from_details(details: &ShipmentDetails) -> Self {
        let mut fields = Self::new();
        fields.set(RecordField::NameExp, details.name_exp.as_str());
        fields.set(RecordField::CityExp, details.city_exp.as_str());
        fields.set(RecordField::PhoneExp, details.phone_exp.as_str());
        fields.set(RecordField::NameDest, details.name_dest.as_str());
        fields.set(RecordField::PhoneDest, details.phone_dest.as_str());
        fields.set(RecordField::CityDest, details.city_dest.as_str());
        fields.set(RecordField::NmbrPackage, details.nmbr_package.to_string());
        fields.set(RecordField::GenderPackage, details.gender_package.as_str());
        fields.set(RecordField::ValuePackage, details.value_package.to_string());
        fields.set(RecordField::Kilos, details.kilos.to_string());
        fields.set(RecordField::Price, details.price.to_string());
        fields
    }

    pub fn get(&self, field: RecordField) -> Option<&str> {
        self.0.get(field.key()).map(String::as_str)
    }

    pub fn set(&mut self, field: RecordField, value: impl Into<String>) {
        self.0.insert(field.key().to_string(), value.into());
    }

    /// Sets a value by raw key. Returns `false` for keys that are not fields.
    pub fn set_key(&mut self, key: &str, value: impl Into<String>) -> bool {
        match RecordField::from_key(key.trim()) {
            Some(field) => {
                self.set(field, value);
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, field: RecordField) -> Option<String> {
        self.0.remove(field.key())
    }

    /// Iterates `(key, value)` pairs in key order, unknown keys included.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RecordFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// Typed, validated editable content of a shipment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipmentDetails {
    pub name_exp: String,
    pub city_exp: String,
    pub phone_exp: String,
    pub name_dest: String,
    pub phone_dest: String,
    pub city_dest: String,
    /// Package count. Negative values are not rejected.
    pub nmbr_package: i64,
    /// Free-text package type.
    pub gender_package: String,
    /// Declared value.
    pub value_package: f64,
    /// Weight in kilograms.
    pub kilos: f64,
    pub price: f64,
}

impl ShipmentDetails {
    /// Validates a field map and converts it into typed details.
    ///
    /// Check order: presence of all fields, package count, value, weight,
    /// price, then both phones.
    pub fn from_fields(fields: &RecordFields) -> Result<Self, RecordValidationError> {
        for field in RecordField::ALL {
            if fields.get(field).map_or(true, |value| value.trim().is_empty()) {
                return Err(RecordValidationError::MissingField(field));
            }
        }

        let text = |field: RecordField| fields.get(field).unwrap_or_default().trim().to_string();
        let nmbr_package = parse_integer(fields, RecordField::NmbrPackage)?;
        let value_package = parse_number(fields, RecordField::ValuePackage)?;
        let kilos = parse_number(fields, RecordField::Kilos)?;
        let price = parse_number(fields, RecordField::Price)?;

        let details = Self {
            name_exp: text(RecordField::NameExp),
            city_exp: text(RecordField::CityExp),
            phone_exp: text(RecordField::PhoneExp),
            name_dest: text(RecordField::NameDest),
            phone_dest: text(RecordField::PhoneDest),
            city_dest: text(RecordField::CityDest),
            nmbr_package,
            gender_package: text(RecordField::GenderPackage),
            value_package,
            kilos,
            price,
        };
        details.validate()?;
        Ok(details)
    }

    /// Checks invariants that typed construction cannot enforce.
    ///
    /// Called by every repository write path. Text is compared trimmed, as
    /// repositories store it.
    pub fn validate(&self) -> Result<(), RecordValidationError> {
        let texts = [
            (RecordField::NameExp, &self.name_exp),
            (RecordField::CityExp, &self.city_exp),
            (RecordField::PhoneExp, &self.phone_exp),
            (RecordField::NameDest, &self.name_dest),
            (RecordField::PhoneDest, &self.phone_dest),
            (RecordField::CityDest, &self.city_dest),
            (RecordField::GenderPackage, &self.gender_package),
        ];
        for (field, value) in texts {
            if value.trim().is_empty() {
                return Err(RecordValidationError::MissingField(field));
            }
        }

        for (field, value) in [
            (RecordField::PhoneExp, &self.phone_exp),
            (RecordField::PhoneDest, &self.phone_dest),
        ] {
            if !is_phone_number(value.trim()) {
                return Err(RecordValidationError::InvalidPhone(field));
            }
        }

        for (field, value) in [
            (RecordField::ValuePackage, self.value_package),
            (RecordField::Kilos, self.kilos),
            (RecordField::Price, self.price),
        ] {
            if !value.is_finite() {
                return Err(RecordValidationError::InvalidNumber(field));
            }
        }

        Ok(())
    }
}

/// Validates a field map without keeping the typed result.
pub fn validate_record_fields(fields: &RecordFields) -> Result<(), RecordValidationError> {
    ShipmentDetails::from_fields(fields).map(|_| ())
}

/// Stored shipment record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShipmentRecord {
    pub id: RecordId,
    #[serde(flatten)]
    pub details: ShipmentDetails,
    pub created_at: Timestamp,
    pub modified_at: Option<Timestamp>,
    pub status: Option<String>,
}

impl ShipmentRecord {
    /// Returns whether the record went through at least one update.
    pub fn is_modified(&self) -> bool {
        self.modified_at.is_some()
    }
}

fn parse_integer(fields: &RecordFields, field: RecordField) -> Result<i64, RecordValidationError> {
    fields
        .get(field)
        .unwrap_or_default()
        .trim()
        .parse::<i64>()
        .map_err(|_| RecordValidationError::InvalidInteger(field))
}

fn parse_number(fields: &RecordFields, field: RecordField) -> Result<f64, RecordValidationError> {
    fields
        .get(field)
        .unwrap_or_default()
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or(RecordValidationError::InvalidNumber(field))
}

fn is_phone_number(value: &str) -> bool {
    PHONE_RE.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::{
        validate_record_fields, RecordField, RecordFields, RecordValidationError, ShipmentDetails,
    };

    fn complete_fields() -> RecordFields {
        [
            ("name_exp", "Alice"),
            ("city_exp", "Paris"),
            ("phone_exp", "0600000001"),
            ("name_dest", "Bob"),
            ("phone_dest", "0700000002"),
            ("city_dest", "Rabat"),
            ("nmbr_package", "2"),
            ("gender_package", "Documents"),
            ("value_package", "100"),
            ("kilos", "1.5"),
            ("price", "20"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn complete_map_converts_to_typed_details() {
        let details = ShipmentDetails::from_fields(&complete_fields()).unwrap();
        assert_eq!(details.name_exp, "Alice");
        assert_eq!(details.nmbr_package, 2);
        assert_eq!(details.value_package, 100.0);
        assert_eq!(details.kilos, 1.5);
        assert_eq!(details.price, 20.0);
    }

    #[test]
    fn presence_is_checked_before_number_format() {
        let mut fields = complete_fields();
        fields.set(RecordField::NmbrPackage, "two");
        fields.set(RecordField::Price, "  ");

        let err = validate_record_fields(&fields).unwrap_err();
        assert_eq!(err, RecordValidationError::MissingField(RecordField::Price));
    }

    #[test]
    fn first_missing_field_in_form_order_is_reported() {
        let mut fields = complete_fields();
        fields.remove(RecordField::CityDest);
        fields.remove(RecordField::NameExp);

        let err = validate_record_fields(&fields).unwrap_err();
        assert_eq!(
            err,
            RecordValidationError::MissingField(RecordField::NameExp)
        );
        assert!(err.to_string().contains("name_exp"));
    }

    #[test]
    fn package_count_must_be_integer() {
        let mut fields = complete_fields();
        fields.set(RecordField::NmbrPackage, "2.5");
        assert_eq!(
            validate_record_fields(&fields).unwrap_err(),
            RecordValidationError::InvalidInteger(RecordField::NmbrPackage)
        );
    }

    #[test]
    fn numbers_are_checked_before_phones() {
        let mut fields = complete_fields();
        fields.set(RecordField::Kilos, "heavy");
        fields.set(RecordField::PhoneExp, "06-00");
        assert_eq!(
            validate_record_fields(&fields).unwrap_err(),
            RecordValidationError::InvalidNumber(RecordField::Kilos)
        );
    }

    #[test]
    fn numeric_fields_tolerate_surrounding_whitespace() {
        let mut fields = complete_fields();
        fields.set(RecordField::NmbrPackage, " 3 ");
        fields.set(RecordField::Price, "19.90 ");
        let details = ShipmentDetails::from_fields(&fields).unwrap();
        assert_eq!(details.nmbr_package, 3);
        assert_eq!(details.price, 19.9);
    }

    #[test]
    fn non_finite_numbers_are_rejected() {
        for raw in ["NaN", "nan", "inf", "-inf", "infinity", "1e999"] {
            let mut fields = complete_fields();
            fields.set(RecordField::Kilos, raw);
            assert_eq!(
                validate_record_fields(&fields).unwrap_err(),
                RecordValidationError::InvalidNumber(RecordField::Kilos),
                "{raw}"
            );
        }

        let mut details = ShipmentDetails::from_fields(&complete_fields()).unwrap();
        details.value_package = f64::NAN;
        assert_eq!(
            details.validate().unwrap_err(),
            RecordValidationError::InvalidNumber(RecordField::ValuePackage)
        );
    }

    #[test]
    fn text_fields_are_trimmed() {
        let mut fields = complete_fields();
        fields.set(RecordField::NameExp, " Alice ");
        fields.set(RecordField::GenderPackage, "Documents\t");
        let details = ShipmentDetails::from_fields(&fields).unwrap();
        assert_eq!(details.name_exp, "Alice");
        assert_eq!(details.gender_package, "Documents");
    }

    #[test]
    fn phones_must_be_digits_only() {
        let mut fields = complete_fields();
        fields.set(RecordField::PhoneDest, "+212600000000");
        assert_eq!(
            validate_record_fields(&fields).unwrap_err(),
            RecordValidationError::InvalidPhone(RecordField::PhoneDest)
        );

        fields.set(RecordField::PhoneDest, "06 00");
        assert!(validate_record_fields(&fields).is_err());
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let mut fields = complete_fields();
        assert!(!fields.set_key("tracking_note", "fragile"));
        let extra: RecordFields = [("tracking_note", "fragile")].into_iter().collect();
        assert!(validate_record_fields(&extra).is_err());
        assert!(validate_record_fields(&fields).is_ok());
    }

    #[test]
    fn prefilled_map_from_details_validates_back_to_same_details() {
        let details = ShipmentDetails::from_fields(&complete_fields()).unwrap();
        let refilled = RecordFields::from_details(&details);
        assert_eq!(ShipmentDetails::from_fields(&refilled).unwrap(), details);
    }
}
