//! Commands against a recorded backend: endpoint, body, bearer and the
//! single optimistic transition.

use machines_core::mocks::ScriptedBackend;
use machines_core::{ApiClient, ApiError, Command, CommandDispatcher, Machine, MachineState, NO_RESPONSE_MESSAGE};
use machines_traits::Method;
use rstest::rstest;

fn machine(state: MachineState) -> Machine {
    Machine {
        id: "m1".into(),
        state,
        voltage: 12.0,
        ip_addr: "10.0.0.5".into(),
        parking_id: None,
    }
}

#[rstest]
#[case(Command::Start, MachineState::Free, "/unlock_machine", MachineState::InUse)]
#[case(Command::Pause, MachineState::InUse, "/stop_machine", MachineState::Stopped)]
#[case(Command::Resume, MachineState::Stopped, "/unstop_machine", MachineState::InUse)]
#[case(Command::Finish, MachineState::InUse, "/lock_machine", MachineState::Free)]
fn success_applies_target_once(
    #[case] command: Command,
    #[case] from: MachineState,
    #[case] endpoint: &str,
    #[case] to: MachineState,
) {
    let backend = ScriptedBackend::new();
    backend.push_json(200, r#"{"msg":"ok"}"#);
    let client = ApiClient::new(backend.clone(), Default::default());
    let mut m = machine(from);

    let state = CommandDispatcher::new(&client, "tok")
        .dispatch(command, &mut m)
        .unwrap();

    assert_eq!(state, to);
    assert_eq!(m.state, to);

    let requests = backend.requests();
    assert_eq!(requests.len(), 1, "exactly one request per command");
    let req = &requests[0];
    assert_eq!(req.method, Method::Post);
    assert_eq!(req.path, endpoint);
    assert_eq!(req.bearer.as_deref(), Some("tok"));
    let body: serde_json::Value = serde_json::from_slice(req.body.as_deref().unwrap()).unwrap();
    assert_eq!(body, serde_json::json!({ "machine_id": "m1" }));
}

#[test]
fn server_error_body_is_the_message() {
    let backend = ScriptedBackend::new();
    backend.push_json(400, r#"{"error":"X"}"#);
    let client = ApiClient::new(backend, Default::default());
    let mut m = machine(MachineState::Free);

    let err = CommandDispatcher::new(&client, "tok").start(&mut m).unwrap_err();
    assert_eq!(
        err,
        ApiError::Server {
            status: 400,
            message: Some("X".into())
        }
    );
    assert_eq!(err.to_string(), "X");
    assert_eq!(m.state, MachineState::Free);
}

#[test]
fn no_response_shows_connectivity_message() {
    let backend = ScriptedBackend::new();
    backend.push_no_response("connection refused");
    let client = ApiClient::new(backend, Default::default());
    let mut m = machine(MachineState::InUse);

    let err = CommandDispatcher::new(&client, "tok").finish(&mut m).unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
    assert_eq!(err.to_string(), NO_RESPONSE_MESSAGE);
    assert_eq!(m.state, MachineState::InUse);
}

#[test]
fn repeated_commands_each_send_a_request() {
    let backend = ScriptedBackend::new();
    let client = ApiClient::new(backend.clone(), Default::default());
    let mut m = machine(MachineState::Free);
    let d = CommandDispatcher::new(&client, "tok");

    d.start(&mut m).unwrap();
    d.start(&mut m).unwrap();
    assert_eq!(backend.requests().len(), 2);
    assert_eq!(m.state, MachineState::InUse);
}

// Holds with and without the `http-errors` downcast.
#[test]
fn refused_connection_is_network_error() {
    let port = {
        let l = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        l.local_addr().unwrap().port()
    };
    let http = machines_http::HttpBackend::new(
        &format!("http://127.0.0.1:{port}"),
        std::time::Duration::from_secs(2),
    )
    .unwrap();
    let client = ApiClient::new(http, Default::default());
    let mut m = machine(MachineState::Free);

    let err = CommandDispatcher::new(&client, "tok")
        .dispatch(Command::Start, &mut m)
        .unwrap_err();

    assert!(matches!(err, ApiError::Network(_)), "got {err:?}");
    assert_eq!(err.to_string(), NO_RESPONSE_MESSAGE);
    assert_eq!(m.state, MachineState::Free);
}
