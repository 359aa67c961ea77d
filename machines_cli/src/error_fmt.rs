//! Human-readable error descriptions, exit codes and structured JSON errors.

use machines_core::{ApiError, BuildError, ViewError};

fn api_error_of(err: &eyre::Report) -> Option<&ApiError> {
    if let Some(ve) = err.downcast_ref::<ViewError>() {
        return ve.api_error();
    }
    err.downcast_ref::<ApiError>()
}

fn describe_api(e: &ApiError) -> String {
    match e {
        ApiError::Server { status, .. } => format!(
            "What happened: The server rejected the request: {e}\nLikely causes: The machine is not in a state that allows this, or the session expired (status {status}).\nHow to fix: Run `machines show --id <ID>` to see the current state; log in again if the server says unauthorized."
        ),
        ApiError::Network(_) => format!(
            "What happened: {e}\nLikely causes: The backend is down, unreachable from this network, or too slow for api.timeout_ms.\nHow to fix: Check api.backend_url (or --backend-url) and your connection, then retry."
        ),
        ApiError::Request(_) => format!(
            "What happened: {e}\nLikely causes: A malformed backend URL or a request the HTTP client refused to build.\nHow to fix: Check api.backend_url in the config; it must be an http(s) URL without query or fragment."
        ),
        ApiError::Decode(_) => format!(
            "What happened: {e}\nLikely causes: The backend at api.backend_url is not the machines backend, or its version differs.\nHow to fix: Verify the backend URL; re-run with --log-level=debug to see the response."
        ),
    }
}

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    if let Some(ve) = err.downcast_ref::<ViewError>() {
        return match ve {
            ViewError::LoginRequired => {
                "What happened: You are not logged in.\nHow to fix: Run `machines login --phone <PHONE> --password <PASSWORD>` first.".to_string()
            }
            ViewError::MissingMachineId => {
                "Machine Id is incorrect.\nHow to fix: Pass the machine with --id <ID> (see `machines list`).".to_string()
            }
            ViewError::MissingParam(name) => format!(
                "What happened: Missing parameter `{name}`.\nHow to fix: Provide it on the command line or in the route query."
            ),
            ViewError::CommandDisabled { command, state } => format!(
                "What happened: Cannot {command} a machine that is {state}.\nHow to fix: Run `machines show` to see which commands are available."
            ),
            ViewError::LoadFailed(e) => format!("{ve}.\n{}", describe_api(e)),
            ViewError::Api(e) => describe_api(e),
            ViewError::Session(msg) => format!(
                "What happened: Could not store the session ({msg}).\nHow to fix: Check that session.token_file points to a writable location."
            ),
        };
    }

    if let Some(e) = err.downcast_ref::<ApiError>() {
        return describe_api(e);
    }

    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingBackend => {
                "What happened: No backend was configured for the client.\nHow to fix: Pass --sim or set api.backend_url.".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun."
            ),
        };
    }

    // String-based heuristics for errors coming from config loading
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("invalid configuration")
        || lower.starts_with("api.")
        || lower.starts_with("session.")
        || lower.starts_with("logging.")
    {
        return format!(
            "What happened: Configuration is invalid ({msg}).\nHow to fix: Edit the TOML config and try again."
        );
    }

    if lower.contains("unknown route") {
        return format!(
            "What happened: {msg}.\nHow to fix: Use one of /, /login, /machines, /machine?id=<ID>, /finish_session?key=<KEY>&parking_name=<NAME>."
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

/// Stable exit codes; anything unclassified returns 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if let Some(ve) = err.downcast_ref::<ViewError>() {
        match ve {
            ViewError::LoginRequired => return 3,
            ViewError::CommandDisabled { .. } => return 7,
            ViewError::MissingMachineId | ViewError::MissingParam(_) => return 8,
            ViewError::Session(_) => return 1,
            ViewError::LoadFailed(_) | ViewError::Api(_) => {}
        }
    }
    if err.downcast_ref::<BuildError>().is_some() {
        return 6;
    }
    match api_error_of(err) {
        Some(ApiError::Server { .. } | ApiError::Decode(_)) => 4,
        Some(ApiError::Network(_)) => 5,
        Some(ApiError::Request(_)) => 6,
        None => 1,
    }
}

fn reason_name(err: &eyre::Report) -> &'static str {
    if let Some(ve) = err.downcast_ref::<ViewError>() {
        match ve {
            ViewError::LoginRequired => return "LoginRequired",
            ViewError::MissingMachineId => return "MissingMachineId",
            ViewError::MissingParam(_) => return "MissingParam",
            ViewError::CommandDisabled { .. } => return "CommandDisabled",
            ViewError::Session(_) => return "Session",
            ViewError::LoadFailed(_) | ViewError::Api(_) => {}
        }
    }
    match api_error_of(err) {
        Some(ApiError::Server { .. }) => "ServerError",
        Some(ApiError::Network(_)) => "NoResponse",
        Some(ApiError::Request(_)) => "RequestSetup",
        Some(ApiError::Decode(_)) => "Decode",
        None => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    let mut obj = json!({
        "reason": reason_name(err),
        "message": err.to_string(),
        "help": humanize(err),
    });
    if let Some(ApiError::Server { status, .. }) = api_error_of(err) {
        obj["status"] = json!(status);
    }
    if let Some(route) = err.downcast_ref::<ViewError>().and_then(ViewError::redirect) {
        obj["redirect"] = json!(route.path());
    }
    obj.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ViewError::LoginRequired, 3)]
    #[case(ViewError::MissingMachineId, 8)]
    #[case(ViewError::MissingParam("key"), 8)]
    #[case(ViewError::Api(ApiError::Server { status: 400, message: None }), 4)]
    #[case(ViewError::LoadFailed(ApiError::Network("x".into())), 5)]
    #[case(ViewError::Api(ApiError::Request("x".into())), 6)]
    fn exit_codes_are_stable(#[case] e: ViewError, #[case] code: i32) {
        assert_eq!(exit_code_for_error(&eyre::Report::new(e)), code);
    }

    #[test]
    fn plain_report_is_generic() {
        let e = eyre::eyre!("boom");
        assert_eq!(exit_code_for_error(&e), 1);
        assert!(humanize(&e).starts_with("Something went wrong."));
    }

    #[test]
    fn json_error_carries_reason_and_redirect() {
        let v: serde_json::Value = serde_json::from_str(&format_error_json(&eyre::Report::new(
            ViewError::LoginRequired,
        )))
        .unwrap();
        assert_eq!(v["reason"], "LoginRequired");
        assert_eq!(v["redirect"], "/login");
    }

    #[test]
    fn server_message_is_shown_verbatim() {
        let e = eyre::Report::new(ViewError::Api(ApiError::Server {
            status: 400,
            message: Some("X".into()),
        }));
        let v: serde_json::Value = serde_json::from_str(&format_error_json(&e)).unwrap();
        assert_eq!(v["message"], "X");
        assert_eq!(v["status"], 400);
        assert!(humanize(&e).contains("rejected the request: X"));
    }
}
