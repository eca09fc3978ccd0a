//! Human-readable error descriptions and structured JSON error formatting.

use plateau_core::PlateauError;

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(pe) = err.downcast_ref::<PlateauError>() {
        return match pe {
            PlateauError::InvalidParameter(msg) => format!(
                "What happened: Invalid analysis parameter ({msg}).\nLikely causes: A zero/negative value in [analysis] or on the command line, or explicit ranges outside the file.\nHow to fix: Use tolerance > 0, num_points >= 1, step_size >= 1, plateau_threshold >= 0 and check [explicit] ranges."
            ),
            PlateauError::UnknownChannel(name) => format!(
                "What happened: Column '{name}' is not in the data.\nLikely causes: input.columns does not match the file layout, or input.channels names a column that is not loaded.\nHow to fix: Run `plateau channels <FILE>` and adjust [input] in the config."
            ),
            PlateauError::DataQuality { channel, row } => format!(
                "What happened: Missing or non-numeric reading in '{channel}' at row {row}.\nLikely causes: Logger dropout, a corrupted line, or a wrong delimiter.\nHow to fix: Repair the file, or exclude the channel via input.channels."
            ),
            PlateauError::Sync(msg) => format!(
                "What happened: Could not synchronize the time axis ({msg}).\nLikely causes: The run never heats through the [sync] window, or the first channel is not a temperature probe.\nHow to fix: Adjust sync.window_low/window_high/reference_temp, or rerun with --no-sync."
            ),
        };
    }

    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("open temperature log") {
        return format!(
            "What happened: The log file could not be read.\nLikely causes: Wrong path or missing permissions.\nHow to fix: Check the path. Original: {msg}"
        );
    }

    if lower.contains("no input files found") {
        return format!(
            "What happened: {msg}.\nLikely causes: The directory holds no files with the configured extension.\nHow to fix: Pass files explicitly or set input.extension in the config."
        );
    }

    if lower.contains("analysis.")
        || lower.contains("input.")
        || lower.contains("sync.")
        || lower.contains("explicit")
    {
        return format!(
            "What happened: Configuration is invalid ({msg}).\nLikely causes: Out-of-range or inconsistent values in the TOML.\nHow to fix: Edit the config file, then rerun."
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes per error kind; anything untyped returns 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    match err.downcast_ref::<PlateauError>() {
        Some(PlateauError::InvalidParameter(_) | PlateauError::UnknownChannel(_)) => 2,
        Some(PlateauError::DataQuality { .. }) => 3,
        Some(PlateauError::Sync(_)) => 4,
        None => 1,
    }
}

pub fn reason_name(err: &eyre::Report) -> &'static str {
    match err.downcast_ref::<PlateauError>() {
        Some(PlateauError::InvalidParameter(_)) => "InvalidParameter",
        Some(PlateauError::UnknownChannel(_)) => "UnknownChannel",
        Some(PlateauError::DataQuality { .. }) => "DataQuality",
        Some(PlateauError::Sync(_)) => "Sync",
        None => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    let msg = humanize(err);
    let obj = match err.downcast_ref::<PlateauError>() {
        Some(PlateauError::DataQuality { channel, row }) => json!({
            "reason": reason_name(err),
            "details": { "channel": channel, "row": row },
            "message": msg,
        }),
        _ => json!({ "reason": reason_name(err), "message": msg }),
    };
    obj.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_errors_map_to_codes() {
        let e: eyre::Report = PlateauError::Sync("x".into()).into();
        assert_eq!(exit_code_for_error(&e), 4);
        assert!(humanize(&e).contains("--no-sync"));

        let wrapped = eyre::Report::from(PlateauError::DataQuality {
            channel: "ch2".into(),
            row: 7,
        })
        .wrap_err("all 1 input file(s) failed");
        assert_eq!(exit_code_for_error(&wrapped), 3);
        let v: serde_json::Value = serde_json::from_str(&format_error_json(&wrapped)).unwrap();
        assert_eq!(v["reason"], "DataQuality");
        assert_eq!(v["details"]["row"], 7);
    }

    #[test]
    fn untyped_errors_fall_back() {
        let e = eyre::eyre!("no input files found (extension 'txt')");
        assert_eq!(exit_code_for_error(&e), 1);
        assert!(humanize(&e).contains("input.extension"));
    }
}
