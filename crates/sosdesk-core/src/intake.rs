//! Intake normalizer. Turns a raw submission payload into a [`NewSos`] or a
//! field-keyed [`ValidationErrors`] report.
//!
//! The API accepts two payload shapes, told apart by the JSON type of
//! `location`:
//!
//! | `location` | Shape | Required fields |
//! |------------|-------|-----------------|
//! | object `{latitude, longitude}` | [`StructuredSubmission`] | `disasterType` |
//! | string | [`LegacySubmission`] | `message` |
//!
//! [`classify`] decides the shape once; validation then runs every check for
//! that shape and reports all failures together. Nothing here performs I/O.

use std::{collections::BTreeMap, fmt};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::sos::{NewSos, SosStatus};

/// A decoded JSON request body.
pub type Payload = Map<String, Value>;

/// Reporter name given to every structured submission.
pub const STRUCTURED_NAME: &str = "API Structured Submission";

pub const SOURCE_STRUCTURED: &str = "api_structured";
pub const SOURCE_LEGACY: &str = "api_legacy";
pub const SOURCE_WEB: &str = "web";

const INVALID_LOCATION: &str = "Missing or invalid location field. Must be a \
                                string or an object {\"latitude\": ..., \
                                \"longitude\": ...}";

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Field name → human-readable message. Serialises as a flat JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
  pub fn new() -> Self { Self::default() }

  pub fn single(field: &str, message: impl Into<String>) -> Self {
    let mut errors = Self::new();
    errors.add(field, message);
    errors
  }

  pub fn add(&mut self, field: &str, message: impl Into<String>) {
    self.0.insert(field.to_owned(), message.into());
  }

  pub fn get(&self, field: &str) -> Option<&str> {
    self.0.get(field).map(String::as_str)
  }

  pub fn contains(&self, field: &str) -> bool { self.0.contains_key(field) }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn fields(&self) -> impl Iterator<Item = &str> {
    self.0.keys().map(String::as_str)
  }
}

impl fmt::Display for ValidationErrors {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut first = true;
    for (field, message) in &self.0 {
      if !first {
        f.write_str("; ")?;
      }
      write!(f, "{field}: {message}")?;
      first = false;
    }
    Ok(())
  }
}

impl std::error::Error for ValidationErrors {}

// ─── Shapes ──────────────────────────────────────────────────────────────────

/// A payload routed by the type of its `location` field.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
  Structured(StructuredSubmission),
  Legacy(LegacySubmission),
}

/// Coordinates plus a disaster classification. Values are kept as raw JSON
/// until validation; `null` is already folded into `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredSubmission {
  pub disaster_type: Option<Value>,
  pub details:       Option<Value>,
  pub latitude:      Option<Value>,
  pub longitude:     Option<Value>,
  pub mobile_number: Option<Value>,
  pub source:        Option<Value>,
}

/// Free-text location and message, with an optional reporter name.
#[derive(Debug, Clone, PartialEq)]
pub struct LegacySubmission {
  pub location: String,
  pub message:  Option<Value>,
  pub name:     Option<Value>,
  pub source:   Option<Value>,
}

impl Submission {
  /// Short label used in logs.
  pub fn kind(&self) -> &'static str {
    match self {
      Self::Structured(_) => "structured",
      Self::Legacy(_) => "legacy",
    }
  }

  pub fn validate(self) -> Result<NewSos, ValidationErrors> {
    match self {
      Self::Structured(s) => s.validate(),
      Self::Legacy(l) => l.validate(),
    }
  }
}

/// Decide which shape `payload` is. A `location` that is neither an object
/// nor a string yields a single `location` error.
pub fn classify(payload: &Payload) -> Result<Submission, ValidationErrors> {
  match payload.get("location") {
    Some(Value::Object(coords)) => {
      Ok(Submission::Structured(StructuredSubmission {
        disaster_type: field(payload, "disasterType"),
        details:       field(payload, "details"),
        latitude:      field(coords, "latitude"),
        longitude:     field(coords, "longitude"),
        mobile_number: field(payload, "mobileNumber"),
        source:        field(payload, "source"),
      }))
    }
    Some(Value::String(location)) => Ok(Submission::Legacy(LegacySubmission {
      location: location.clone(),
      message:  field(payload, "message"),
      name:     field(payload, "name"),
      source:   field(payload, "source"),
    })),
    _ => Err(ValidationErrors::single("location", INVALID_LOCATION)),
  }
}

/// Classify and validate an API payload in one step.
pub fn normalize(payload: &Payload) -> Result<NewSos, ValidationErrors> {
  classify(payload)?.validate()
}

// ─── Structured ──────────────────────────────────────────────────────────────

impl StructuredSubmission {
  pub fn validate(self) -> Result<NewSos, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let disaster_type = non_empty_str(self.disaster_type.as_ref());
    if disaster_type.is_none() {
      errors.add(
        "disasterType",
        "Missing or invalid disasterType (must be a non-empty string)",
      );
    }

    let coordinates = match (&self.latitude, &self.longitude) {
      (Some(lat), Some(lng)) => match (coerce_f64(lat), coerce_f64(lng)) {
        (Some(lat), Some(lng)) => {
          if !(-90.0..=90.0).contains(&lat) {
            errors.add("latitude", "Latitude must be between -90 and 90");
          }
          if !(-180.0..=180.0).contains(&lng) {
            errors.add("longitude", "Longitude must be between -180 and 180");
          }
          Some((lat, lng))
        }
        _ => {
          errors.add("location", "Latitude and Longitude must be valid numbers");
          None
        }
      },
      _ => {
        errors.add(
          "location",
          "Location object must contain numeric latitude and longitude",
        );
        None
      }
    };

    let mobile_number = match mobile_number(self.mobile_number.as_ref()) {
      Ok(number) => number,
      Err(message) => {
        errors.add("mobileNumber", message);
        None
      }
    };

    let source =
      resolve_source(self.source.as_ref(), SOURCE_STRUCTURED, &mut errors);

    match (disaster_type, coordinates) {
      (Some(disaster_type), Some((lat, lng))) if errors.is_empty() => {
        let mut lines = vec![format!("Disaster Type: {disaster_type}")];
        if let Some(details) = non_empty_str(self.details.as_ref()) {
          lines.push(format!("Details: {details}"));
        }
        if let Some(number) = &mobile_number {
          lines.push(format!("Contact Number: {number}"));
        }

        Ok(NewSos {
          name: Some(STRUCTURED_NAME.to_owned()),
          location: format!("Lat: {lat:.6}, Lng: {lng:.6}"),
          message: lines.join("\n"),
          status: SosStatus::Pending,
          source,
          mobile_number,
          disaster_type: Some(disaster_type),
        })
      }
      _ => Err(errors),
    }
  }
}

// ─── Legacy ──────────────────────────────────────────────────────────────────

impl LegacySubmission {
  pub fn validate(self) -> Result<NewSos, ValidationErrors> {
    let location = self.location.trim();
    if location.is_empty() {
      return Err(ValidationErrors::single(
        "location",
        "Location string cannot be empty",
      ));
    }

    let mut errors = ValidationErrors::new();

    let message = non_empty_str(self.message.as_ref());
    if message.is_none() {
      errors.add(
        "message",
        "Missing or invalid message (must be a non-empty string)",
      );
    }

    let source = resolve_source(self.source.as_ref(), SOURCE_LEGACY, &mut errors);

    match message {
      Some(message) if errors.is_empty() => Ok(NewSos {
        name: non_empty_str(self.name.as_ref()),
        location: location.to_owned(),
        message,
        status: SosStatus::Pending,
        source,
        mobile_number: None,
        disaster_type: None,
      }),
      _ => Err(errors),
    }
  }
}

// ─── Web form ────────────────────────────────────────────────────────────────

/// Validate a browser form submission. `name`, `location` and `message` are
/// all required strings; the source is always [`SOURCE_WEB`].
pub fn normalize_web_form(payload: &Payload) -> Result<NewSos, ValidationErrors> {
  let mut errors = ValidationErrors::new();

  let name = required_str(payload, "name", &mut errors);
  let location = required_str(payload, "location", &mut errors);
  let message = required_str(payload, "message", &mut errors);

  match (name, location, message) {
    (Some(name), Some(location), Some(message)) => Ok(NewSos {
      name: Some(name),
      ..NewSos::new(location, message, SOURCE_WEB)
    }),
    _ => Err(errors),
  }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn field(map: &Payload, key: &str) -> Option<Value> {
  map.get(key).filter(|v| !v.is_null()).cloned()
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
  value
    .and_then(Value::as_str)
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(str::to_owned)
}

fn required_str(
  payload: &Payload,
  key: &str,
  errors: &mut ValidationErrors,
) -> Option<String> {
  let value = non_empty_str(payload.get(key));
  if value.is_none() {
    errors.add(key, format!("Missing or invalid {key} (must be a non-empty string)"));
  }
  value
}

/// Numbers pass through; strings are parsed after trimming.
///
/// Booleans are rejected rather than read as `1.0`/`0.0` the way a lenient
/// float cast would, so `{"latitude": true}` is a location error.
fn coerce_f64(value: &Value) -> Option<f64> {
  match value {
    Value::Number(n) => n.as_f64(),
    Value::String(s) => s.trim().parse().ok(),
    _ => None,
  }
}

/// Empty-ish JSON values (`null`, `""`, `0`, `false`, `[]`, `{}`).
fn is_blank(value: &Value) -> bool {
  match value {
    Value::Null => true,
    Value::Bool(b) => !b,
    Value::Number(n) => n.as_f64().is_some_and(|f| f == 0.0),
    Value::String(s) => s.is_empty(),
    Value::Array(a) => a.is_empty(),
    Value::Object(o) => o.is_empty(),
  }
}

fn mobile_number(value: Option<&Value>) -> Result<Option<String>, &'static str> {
  let Some(value) = value.filter(|v| !is_blank(v)) else {
    return Ok(None);
  };
  match value {
    Value::String(s) => {
      let trimmed = s.trim();
      Ok((!trimmed.is_empty()).then(|| trimmed.to_owned()))
    }
    Value::Number(n) => Ok(Some(n.to_string())),
    _ => Err("Mobile number must be a string or number if provided"),
  }
}

/// A non-blank string `source` overrides `default`; a non-string one is an
/// error.
fn resolve_source(
  value: Option<&Value>,
  default: &str,
  errors: &mut ValidationErrors,
) -> String {
  match value {
    None => default.to_owned(),
    Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_owned(),
    Some(Value::String(_)) => default.to_owned(),
    Some(_) => {
      errors.add("source", "Source must be a string if provided");
      default.to_owned()
    }
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn payload(value: Value) -> Payload {
    match value {
      Value::Object(map) => map,
      other => panic!("test payload must be an object, got {other}"),
    }
  }

  fn errors_of(value: Value) -> ValidationErrors {
    normalize(&payload(value)).expect_err("payload should be rejected")
  }

  // ── Routing ────────────────────────────────────────────────────────────────

  #[test]
  fn object_location_routes_to_structured() {
    let s = classify(&payload(json!({
      "location": { "latitude": 1, "longitude": 2 }
    })))
    .unwrap();
    assert_eq!(s.kind(), "structured");
  }

  #[test]
  fn string_location_routes_to_legacy() {
    let s = classify(&payload(json!({ "location": "Pier 9" }))).unwrap();
    assert_eq!(s.kind(), "legacy");
  }

  #[test]
  fn unrecognised_location_is_a_single_error() {
    for location in [json!(null), json!(42), json!(true), json!(["a"])] {
      let errors = errors_of(json!({
        "location": location,
        "disasterType": "",
        "message": 7,
      }));
      assert_eq!(errors.len(), 1, "{errors}");
      assert!(errors.contains("location"));
    }

    let errors = errors_of(json!({ "message": "help" }));
    assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["location"]);
  }

  // ── Structured ─────────────────────────────────────────────────────────────

  #[test]
  fn structured_coordinates_are_formatted_to_six_places() {
    let sos = normalize(&payload(json!({
      "disasterType": "Flood",
      "location": { "latitude": 12.345678, "longitude": -98.765432 }
    })))
    .unwrap();

    assert_eq!(sos.location, "Lat: 12.345678, Lng: -98.765432");
    assert_eq!(sos.message, "Disaster Type: Flood");
    assert_eq!(sos.name.as_deref(), Some(STRUCTURED_NAME));
    assert_eq!(sos.source, SOURCE_STRUCTURED);
    assert_eq!(sos.disaster_type.as_deref(), Some("Flood"));
    assert_eq!(sos.status, SosStatus::Pending);
    assert!(sos.mobile_number.is_none());
  }

  #[test]
  fn structured_message_lines_are_ordered() {
    let sos = normalize(&payload(json!({
      "disasterType": "Fire",
      "details": "Building collapse",
      "mobileNumber": "555-1234",
      "location": { "latitude": 0, "longitude": 0 }
    })))
    .unwrap();

    assert_eq!(
      sos.message,
      "Disaster Type: Fire\nDetails: Building collapse\nContact Number: 555-1234"
    );
    assert_eq!(sos.mobile_number.as_deref(), Some("555-1234"));
    assert_eq!(sos.location, "Lat: 0.000000, Lng: 0.000000");
  }

  #[test]
  fn structured_skips_blank_details() {
    let sos = normalize(&payload(json!({
      "disasterType": "  Storm ",
      "details": "   ",
      "mobileNumber": "  0712 ",
      "location": { "latitude": "45.5", "longitude": " -73.25 " }
    })))
    .unwrap();

    assert_eq!(sos.message, "Disaster Type: Storm\nContact Number: 0712");
    assert_eq!(sos.disaster_type.as_deref(), Some("Storm"));
    assert_eq!(sos.location, "Lat: 45.500000, Lng: -73.250000");
  }

  #[test]
  fn out_of_range_coordinates_report_independently() {
    let errors = errors_of(json!({
      "disasterType": "Quake",
      "location": { "latitude": 95, "longitude": 200 }
    }));

    assert_eq!(errors.len(), 2);
    assert!(errors.contains("latitude"));
    assert!(errors.contains("longitude"));
    assert!(!errors.contains("location"));
  }

  #[test]
  fn range_bounds_are_inclusive() {
    let sos = normalize(&payload(json!({
      "disasterType": "Quake",
      "location": { "latitude": -90, "longitude": 180 }
    })))
    .unwrap();
    assert_eq!(sos.location, "Lat: -90.000000, Lng: 180.000000");
  }

  #[test]
  fn missing_coordinate_is_a_location_error() {
    let errors = errors_of(json!({
      "disasterType": "Flood",
      "location": { "latitude": 10, "longitude": null }
    }));
    assert_eq!(
      errors.get("location"),
      Some("Location object must contain numeric latitude and longitude")
    );
  }

  #[test]
  fn unparseable_coordinate_is_a_location_error_not_a_range_error() {
    let errors = errors_of(json!({
      "disasterType": "Flood",
      "location": { "latitude": "north", "longitude": 500 }
    }));
    assert_eq!(
      errors.get("location"),
      Some("Latitude and Longitude must be valid numbers")
    );
    assert!(!errors.contains("longitude"));

    let errors = errors_of(json!({
      "disasterType": "Flood",
      "location": { "latitude": true, "longitude": 5 }
    }));
    assert!(errors.contains("location"));
  }

  #[test]
  fn structured_errors_accumulate() {
    let errors = errors_of(json!({
      "disasterType": "   ",
      "mobileNumber": { "cell": "555" },
      "source": 12,
      "location": { "latitude": -91, "longitude": 10 }
    }));

    let fields: Vec<_> = errors.fields().collect();
    assert_eq!(
      fields,
      vec!["disasterType", "latitude", "mobileNumber", "source"]
    );
  }

  #[test]
  fn numeric_mobile_number_is_stringified() {
    let sos = normalize(&payload(json!({
      "disasterType": "Flood",
      "mobileNumber": 5551234,
      "location": { "latitude": 1, "longitude": 1 }
    })))
    .unwrap();
    assert_eq!(sos.mobile_number.as_deref(), Some("5551234"));
    assert!(sos.message.ends_with("\nContact Number: 5551234"));
  }

  #[test]
  fn blank_mobile_numbers_are_absent() {
    for blank in [json!(""), json!("   "), json!(0), json!(false), json!([])] {
      let sos = normalize(&payload(json!({
        "disasterType": "Flood",
        "mobileNumber": blank,
        "location": { "latitude": 1, "longitude": 1 }
      })))
      .unwrap();
      assert!(sos.mobile_number.is_none());
      assert_eq!(sos.message, "Disaster Type: Flood");
    }
  }

  #[test]
  fn boolean_true_mobile_number_is_rejected() {
    let errors = errors_of(json!({
      "disasterType": "Flood",
      "mobileNumber": true,
      "location": { "latitude": 1, "longitude": 1 }
    }));
    assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["mobileNumber"]);
  }

  // ── Legacy ─────────────────────────────────────────────────────────────────

  #[test]
  fn legacy_fields_are_trimmed() {
    let sos = normalize(&payload(json!({
      "location": "  123 Main St  ",
      "message": "  help  ",
      "name": "  Joe  "
    })))
    .unwrap();

    assert_eq!(sos.location, "123 Main St");
    assert_eq!(sos.message, "help");
    assert_eq!(sos.name.as_deref(), Some("Joe"));
    assert_eq!(sos.source, SOURCE_LEGACY);
    assert!(sos.disaster_type.is_none());
    assert!(sos.mobile_number.is_none());
  }

  #[test]
  fn legacy_blank_name_is_absent() {
    for name in [json!("   "), json!(3), json!(null)] {
      let sos = normalize(&payload(json!({
        "location": "Harbor",
        "message": "stranded",
        "name": name
      })))
      .unwrap();
      assert!(sos.name.is_none());
    }
  }

  #[test]
  fn blank_legacy_location_short_circuits() {
    let errors = errors_of(json!({ "location": "   ", "message": "x" }));
    assert_eq!(errors.get("location"), Some("Location string cannot be empty"));

    let errors = errors_of(json!({ "location": "", "message": 5 }));
    assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["location"]);
  }

  #[test]
  fn legacy_message_is_required() {
    for message in [json!(null), json!(""), json!("  "), json!(["help"])] {
      let errors = errors_of(json!({ "location": "Harbor", "message": message }));
      assert!(errors.contains("message"), "{errors}");
    }
  }

  // ── Source ─────────────────────────────────────────────────────────────────

  #[test]
  fn explicit_source_overrides_either_default() {
    let structured = normalize(&payload(json!({
      "disasterType": "Flood",
      "source": "partner-app",
      "location": { "latitude": 1, "longitude": 1 }
    })))
    .unwrap();
    assert_eq!(structured.source, "partner-app");

    let legacy = normalize(&payload(json!({
      "location": "Harbor",
      "message": "stranded",
      "source": " sms-gateway "
    })))
    .unwrap();
    assert_eq!(legacy.source, "sms-gateway");
  }

  #[test]
  fn blank_source_falls_back_to_default() {
    let legacy = normalize(&payload(json!({
      "location": "Harbor",
      "message": "stranded",
      "source": "  "
    })))
    .unwrap();
    assert_eq!(legacy.source, SOURCE_LEGACY);

    for blank in [json!(""), json!("   ")] {
      let structured = normalize(&payload(json!({
        "disasterType": "Flood",
        "source": blank,
        "location": { "latitude": 1, "longitude": 1 }
      })))
      .unwrap();
      assert_eq!(structured.source, SOURCE_STRUCTURED);
    }
  }

  // ── Web form ───────────────────────────────────────────────────────────────

  #[test]
  fn web_form_requires_all_three_fields() {
    let errors = normalize_web_form(&payload(json!({
      "name": " ",
      "location": "Square"
    })))
    .unwrap_err();
    assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["message", "name"]);
  }

  #[test]
  fn web_form_is_trimmed_and_tagged() {
    let sos = normalize_web_form(&payload(json!({
      "name": " Ana ",
      "location": " Square ",
      "message": " trapped "
    })))
    .unwrap();
    assert_eq!(sos.name.as_deref(), Some("Ana"));
    assert_eq!(sos.location, "Square");
    assert_eq!(sos.message, "trapped");
    assert_eq!(sos.source, SOURCE_WEB);
  }

  #[test]
  fn validation_errors_serialise_as_flat_object() {
    let errors = errors_of(json!({ "location": "Harbor" }));
    assert_eq!(
      serde_json::to_value(&errors).unwrap(),
      json!({ "message": "Missing or invalid message (must be a non-empty string)" })
    );
  }
}
