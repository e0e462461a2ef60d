//! Field mappers
//!
//! Pure functions that translate one clinical sub-record into the
//! canonical resource representation used inside a bundle entry. No I/O,
//! no state: every mapper is a plain struct of flat fields with a
//! required-field check and a `bundle_entry`/`bundle_entries` method.
//!
//! Entry identifiers are fresh v4 UUIDs minted at mapping time, never
//! derived from source-system ids: the transaction protocol uses
//! temporary `urn:uuid:` references so the registry can assign permanent
//! resource ids atomically within one transaction.

pub mod condition;
pub mod encounter;
pub mod entry;
pub mod medication_dispense;
pub mod medication_request;
pub mod observation;
pub mod vital_sign;

pub use condition::ConditionDiagnosisMapper;
pub use encounter::{EncounterDiagnosisRef, EncounterMapper};
pub use entry::{transaction_entry, EntryTransform};
pub use medication_dispense::MedicationDispenseMapper;
pub use medication_request::MedicationRequestMapper;
pub use observation::{ObservationMapper, ObservationValue, ObservationValueCode};
pub use vital_sign::VitalSignMapper;

use chrono::{Duration, NaiveDateTime};

/// Render a SIMRS-local (WIB) timestamp for the wire.
///
/// The registry expects the `+00:00` suffix either way; conversion only
/// shifts the clock back seven hours. `None` renders empty and is caught
/// by the mappers' required-field checks.
pub(crate) fn format_time(t: Option<NaiveDateTime>, convert_to_utc: bool) -> String {
    match t {
        None => String::new(),
        Some(t) => {
            let t = if convert_to_utc {
                t - Duration::hours(7)
            } else {
                t
            };
            t.format("%Y-%m-%dT%H:%M:%S+00:00").to_string()
        }
    }
}

/// Parse a free-text vital-sign reading into a numeric quantity.
///
/// SIMRS operators type decimal commas and stray trailing separators;
/// anything that still fails to parse yields `None` and the reading is
/// skipped.
pub(crate) fn parse_decimal(s: &str) -> Option<f64> {
    let s = s.trim().replacen(',', ".", 1);
    let s = s.trim_end_matches('.');
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok()
}

/// Collect blank required fields into a single validation message.
pub(crate) fn missing_fields(fields: &[(&'static str, &str)]) -> Result<(), String> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(format!("missing required fields: {}", missing.join(", ")))
    }
}
