//! Shipping label payloads.
//!
//! # Responsibility
//! - Render the text block embedded in a shipment's QR code.
//! - Parse scanned text back into shipment fields, or keep it as raw text.
//!
//! Image encoding and camera decoding happen outside core; this module only
//! deals with the UTF-8 payload.

mod payload;

pub use payload::{
    parse_label, render_label, tracking_code, LabelError, ScannedPayload, ShipmentLabel,
};
