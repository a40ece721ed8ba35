//! JSON Schema validation for generated Artillery scripts.
//!
//! Every config goes through two checks before the pipeline reports
//! success:
//!
//! - shape, against the embedded JSON Schema Draft 7 definition
//! - arrival budget, comparing declared phase arrivals with the number
//!   of payload records the scenarios are expected to send
//!
//! # Embedded Schema
//!
//! The schema is embedded at compile time from the `schemas/` directory:
//! - `artillery-script.json`

use serde_json::Value;

use crate::artillery::{ArtilleryScript, Phase};
use crate::error::{ValidationError, ValidationResult};

/// Validate a JSON object against a JSON schema.
///
/// # Arguments
/// * `schema` - The JSON schema (already parsed)
/// * `data` - The object to validate
///
/// # Returns
/// * `Ok(())` when valid
/// * `Err(Vec<String>)` with one message per violation
pub fn validate(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator =
        jsonschema::draft7::new(schema).map_err(|e| vec![format!("Invalid schema: {}", e)])?;

    let errors: Vec<String> = validator.iter_errors(data).map(|e| e.to_string()).collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Simpler variant: just true/false.
pub fn is_valid(schema: &Value, data: &Value) -> bool {
    jsonschema::draft7::is_valid(schema, data)
}

/// Validate a JSON value against the Artillery script schema.
pub fn validate_script_value(data: &Value) -> Result<(), Vec<String>> {
    let schema: Value = serde_json::from_str(include_str!("../../schemas/artillery-script.json"))
        .expect("Invalid embedded schema");
    validate(&schema, data)
}

/// Quick check against the Artillery script schema.
pub fn is_valid_script(data: &Value) -> bool {
    let schema: Value = serde_json::from_str(include_str!("../../schemas/artillery-script.json"))
        .expect("Invalid embedded schema");
    is_valid(&schema, data)
}

/// Validate a built script before it is written out.
pub fn validate_script(script: &ArtilleryScript) -> ValidationResult<()> {
    let data = serde_json::to_value(script)?;
    validate_script_value(&data).map_err(|errors| ValidationError::Schema { errors })
}

/// Check that the phases of a script start enough virtual users to send
/// `records` draw events.
///
/// Count-based phases arrive exactly `arrivalCount` users, so their total
/// must equal the record count; rate-based phases only need to cover it.
pub fn check_event_budget(script: &ArtilleryScript, records: u64) -> ValidationResult<()> {
    let declared: u64 = script
        .config
        .phases
        .iter()
        .map(Phase::planned_arrivals)
        .sum();
    let exact = script
        .config
        .phases
        .iter()
        .all(|p| matches!(p, Phase::Count { .. }));

    let covered = if exact {
        declared == records
    } else {
        declared >= records
    };

    if covered {
        Ok(())
    } else {
        Err(ValidationError::EventBudget { declared, records })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artillery::{PayloadRef, Scenario, ScriptConfig, SocketIoEngine};
    use crate::models::Pixel;
    use serde_json::json;

    fn burst_script(count: u64) -> ArtilleryScript {
        ArtilleryScript::new(
            ScriptConfig::new("http://localhost:3000", Phase::count(count, 80))
                .with_engine(SocketIoEngine::websocket_only())
                .with_payload(PayloadRef::pixel_fields("payload.json")),
            vec![Scenario::templated(1)],
        )
    }

    #[test]
    fn test_valid_per_pixel_script() {
        let pixel = Pixel::new(3, 4, "#fff", 7);
        let script = ArtilleryScript::new(
            ScriptConfig::new("http://localhost:3000", Phase::rate(30, 15)),
            vec![Scenario::per_pixel(&pixel, 0.0, 1)],
        );
        assert!(validate_script(&script).is_ok());
    }

    #[test]
    fn test_valid_templated_script() {
        assert!(validate_script(&burst_script(12)).is_ok());
    }

    #[test]
    fn test_missing_engines_rejected() {
        let data = json!({
            "config": {
                "target": "http://localhost:3000",
                "phases": [{"arrivalCount": 1, "duration": 80}]
            },
            "scenarios": [{"engine": "socketio", "flow": [{"think": 0.0}]}]
        });
        assert!(!is_valid_script(&data));
    }

    #[test]
    fn test_mixed_phase_keys_rejected() {
        let data = json!({
            "config": {
                "target": "http://localhost:3000",
                "phases": [{"arrivalRate": 30, "arrivalCount": 10, "duration": 80}],
                "engines": {"socketio": {}}
            },
            "scenarios": [{"engine": "socketio", "flow": [{"think": 0.0}]}]
        });
        assert!(!is_valid_script(&data));
    }

    #[test]
    fn test_broken_template_rejected() {
        let mut data = serde_json::to_value(burst_script(1)).unwrap();
        data["scenarios"][0]["flow"][0]["emit"]["data"]["x"] = json!("{{ x");
        assert!(!is_valid_script(&data));
    }

    #[test]
    fn test_numeric_canvas_id_rejected() {
        let mut data = serde_json::to_value(burst_script(1)).unwrap();
        data["scenarios"][0]["flow"][0]["emit"]["data"]["canvas_id"] = json!(1);
        assert!(!is_valid_script(&data));
    }

    #[test]
    fn test_validate_reports_errors() {
        let data = json!({ "config": { "target": "not-a-url" } });
        let result = validate_script_value(&data);
        assert!(result.is_err());
        let errors = result.unwrap_err();
        assert!(!errors.is_empty());
    }

    #[test]
    fn test_event_budget_count_must_match() {
        assert!(check_event_budget(&burst_script(3), 3).is_ok());

        let err = check_event_budget(&burst_script(3), 2).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::EventBudget {
                declared: 3,
                records: 2
            }
        ));
    }

    #[test]
    fn test_event_budget_rate_must_cover() {
        let pixel = Pixel::new(0, 0, "#fff", 1);
        let script = ArtilleryScript::new(
            ScriptConfig::new("http://localhost:3000", Phase::rate(30, 10)),
            vec![Scenario::per_pixel(&pixel, 0.0, 1)],
        );

        assert!(check_event_budget(&script, 250).is_ok());
        assert!(check_event_budget(&script, 301).is_err());
    }
}
