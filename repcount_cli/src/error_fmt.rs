//! Human-readable error descriptions and structured JSON error formatting.

use repcount_core::error::{BuildError, RepError};

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    if let Some(BuildError::InvalidConfig(msg)) = err.downcast_ref::<BuildError>() {
        return format!(
            "What happened: Invalid session settings ({msg}).\nLikely causes: Out-of-range values in the TOML or on the command line.\nHow to fix: Adjust [thresholds], [smoothing] or [audio], or the matching --window/--volume flags."
        );
    }

    if let Some(re) = err.downcast_ref::<RepError>() {
        return match re {
            RepError::Config(msg) => format!(
                "What happened: Configuration is invalid ({msg}).\nLikely causes: A typo or out-of-range value in the TOML, or a bad pose trace file.\nHow to fix: Edit the file named above and rerun; `repcount self-check` validates a config."
            ),
            RepError::AcquireTimeout(ms) => format!(
                "What happened: The pose source did not come up within {ms} ms.\nLikely causes: Camera busy or model still loading.\nHow to fix: Close other apps using the camera, or raise source.acquire_timeout_ms."
            ),
            RepError::Acquire(msg) => format!(
                "What happened: Could not open the pose source ({msg}).\nLikely causes: No camera, missing permission, or an unreadable trace.\nHow to fix: Check the device and permissions, then start a new session."
            ),
            other => format!(
                "What happened: {other}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
            ),
        };
    }

    // String-based heuristics for errors coming from init
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();
    if lower.contains("pose trace csv must have headers") {
        return "Invalid headers in pose trace CSV. Expected 'frame,keypoint,x,y,score'.".to_string();
    }

    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable short name of the error class, used in JSON output.
pub fn error_class(err: &eyre::Report) -> &'static str {
    if err.downcast_ref::<BuildError>().is_some() {
        return "Config";
    }
    match err.downcast_ref::<RepError>() {
        Some(RepError::Config(_)) => "Config",
        Some(RepError::Acquire(_)) => "Acquire",
        Some(RepError::AcquireTimeout(_)) => "AcquireTimeout",
        Some(RepError::Source(_)) => "Source",
        Some(RepError::WorkerLost(_)) => "WorkerLost",
        Some(RepError::State(_)) => "State",
        None => "Error",
    }
}

/// Stable exit codes per error class: config 2, acquisition 3, acquisition
/// timeout 4, source 5, anything else 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    match error_class(err) {
        "Config" => 2,
        "Acquire" => 3,
        "AcquireTimeout" => 4,
        "Source" => 5,
        _ => 1,
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    let reason = error_class(err);
    let obj = match err.downcast_ref::<RepError>() {
        Some(RepError::AcquireTimeout(ms)) => json!({
            "reason": reason,
            "details": { "timeout_ms": ms },
            "message": humanize(err),
        }),
        _ => json!({ "reason": reason, "message": humanize(err) }),
    };
    obj.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(eyre::Report::new(RepError::Config("x".into())), 2)]
    #[case(eyre::Report::new(BuildError::InvalidConfig("y")), 2)]
    #[case(eyre::Report::new(RepError::Acquire("no camera".into())), 3)]
    #[case(eyre::Report::new(RepError::AcquireTimeout(10)), 4)]
    #[case(eyre::Report::new(RepError::Source("bad frame".into())), 5)]
    #[case(eyre::eyre!("something else"), 1)]
    fn exit_codes_are_stable(#[case] err: eyre::Report, #[case] code: i32) {
        assert_eq!(exit_code_for_error(&err), code);
    }

    #[test]
    fn timeout_json_carries_details() {
        let err = eyre::Report::new(RepError::AcquireTimeout(250));
        let v: serde_json::Value = serde_json::from_str(&format_error_json(&err)).expect("json");
        assert_eq!(v["reason"], "AcquireTimeout");
        assert_eq!(v["details"]["timeout_ms"], 250);
        assert!(v["message"].as_str().is_some_and(|m| m.contains("250 ms")));
    }
}
