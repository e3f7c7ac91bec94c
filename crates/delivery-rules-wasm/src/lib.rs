//! WASM bindings for delivery-rules.
//!
//! Exposes availability evaluation and the selection gate to a JavaScript
//! checkout widget via `wasm-bindgen`. Configurations and results cross the
//! boundary as JSON strings; dates as `YYYY-MM-DD` (timestamps are truncated to
//! their date).
//!
//! Each export is a thin wrapper over a plain-Rust function in this crate that
//! returns `Result<_, String>`, so the logic is testable off-wasm.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p delivery-rules-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target web --out-dir packages/delivery-rules-js/wasm/ \
//!   target/wasm32-unknown-unknown/release/delivery_rules_wasm.wasm
//! ```

use chrono::NaiveDate;
use delivery_rules::calendar::{self, format_date};
use delivery_rules::{BlockReason, Configuration, Decision, GateResponse};
use serde::Serialize;
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Serde-friendly DTOs for crossing the WASM boundary as JSON
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct DecisionDto {
    available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<BlockReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
}

impl From<Decision> for DecisionDto {
    fn from(decision: Decision) -> Self {
        let reason = decision.reason();
        Self {
            available: decision.is_available(),
            reason,
            message: reason.map(|r| r.message()),
        }
    }
}

fn parse_day(label: &str, s: &str) -> Result<NaiveDate, String> {
    calendar::parse_candidate(s).map_err(|e| format!("Invalid {}: {}", label, e))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization error: {}", e))
}

// ---------------------------------------------------------------------------
// Plain-Rust entry points
// ---------------------------------------------------------------------------

/// Evaluate `candidate` against a stored configuration blob.
///
/// Returns `{"available": bool, "reason"?: string, "message"?: string}`.
pub fn evaluate_date_json(
    config_json: &str,
    candidate: &str,
    today: &str,
) -> Result<String, String> {
    let config = Configuration::from_json(config_json);
    let candidate = parse_day("candidate", candidate)?;
    let today = parse_day("today", today)?;
    to_json(&DecisionDto::from(delivery_rules::evaluate(&config, candidate, today)))
}

/// Run the selection gate and return the consumer-facing response.
///
/// `selection` of `None` (or an empty string) means nothing was chosen.
pub fn can_proceed_json(
    config_json: &str,
    selection: Option<&str>,
    today: &str,
) -> Result<String, String> {
    let config = Configuration::from_json(config_json);
    let selection = match selection.map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(parse_day("selection", raw)?),
    };
    let today = parse_day("today", today)?;
    to_json(&GateResponse::from(delivery_rules::can_proceed(&config, selection, today)))
}

/// Decode leniently and re-encode in canonical form.
pub fn normalize_config_json(config_json: &str) -> Result<String, String> {
    Configuration::from_json(config_json)
        .to_json()
        .map_err(|e| e.to_string())
}

/// First available date on or after `from`, within `horizon_days`.
pub fn next_available_json(
    config_json: &str,
    from: &str,
    today: &str,
    horizon_days: u32,
) -> Result<Option<String>, String> {
    let config = Configuration::from_json(config_json);
    let from = parse_day("from", from)?;
    let today = parse_day("today", today)?;
    Ok(delivery_rules::next_available(&config, from, today, horizon_days).map(format_date))
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Evaluate a single candidate date.
///
/// # Arguments
/// - `config_json` -- stored configuration blob (malformed parts are ignored)
/// - `candidate` -- date or timestamp chosen by the buyer
/// - `today` -- reference date for the past-date cutoff
#[wasm_bindgen(js_name = "evaluateDate")]
pub fn evaluate_date(config_json: &str, candidate: &str, today: &str) -> Result<String, JsValue> {
    evaluate_date_json(config_json, candidate, today).map_err(|e| JsValue::from_str(&e))
}

/// Decide whether checkout may proceed with `selection`.
///
/// Returns `{"behavior": "allow" | "block", "reason"?: string, "errors"?: [{"message"}]}`.
/// Call it on every change for inline feedback and again before submitting.
#[wasm_bindgen(js_name = "canProceed")]
pub fn can_proceed(
    config_json: &str,
    selection: Option<String>,
    today: &str,
) -> Result<String, JsValue> {
    can_proceed_json(config_json, selection.as_deref(), today).map_err(|e| JsValue::from_str(&e))
}

#[wasm_bindgen(js_name = "normalizeConfig")]
pub fn normalize_config(config_json: &str) -> Result<String, JsValue> {
    normalize_config_json(config_json).map_err(|e| JsValue::from_str(&e))
}

/// First available date on or after `from`, or `undefined` if none within the horizon.
#[wasm_bindgen(js_name = "nextAvailable")]
pub fn next_available(
    config_json: &str,
    from: &str,
    today: &str,
    horizon_days: u32,
) -> Result<Option<String>, JsValue> {
    next_available_json(config_json, from, today, horizon_days).map_err(|e| JsValue::from_str(&e))
}
