use std::io::Read;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use machines_http::{HttpBackend, HttpError};
use machines_traits::{ApiRequest, Backend};
use tiny_http::{Header, Response, Server};

struct Seen {
    method: String,
    url: String,
    authorization: Option<String>,
    content_type: Option<String>,
    body: String,
}

/// Serve exactly one request with `status`/`body` and report what arrived.
fn one_shot(status: u16, reply_body: &'static str) -> (String, mpsc::Receiver<Seen>) {
    let server = Server::http("127.0.0.1:0").expect("bind");
    let addr = format!("http://{}", server.server_addr());
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        if let Ok(mut req) = server.recv() {
            let header = |name: &'static str| {
                req.headers()
                    .iter()
                    .find(|h| h.field.equiv(name))
                    .map(|h| h.value.as_str().to_string())
            };
            let authorization = header("Authorization");
            let content_type = header("Content-Type");
            let mut body = String::new();
            let _ = req.as_reader().read_to_string(&mut body);
            let seen = Seen {
                method: req.method().as_str().to_string(),
                url: req.url().to_string(),
                authorization,
                content_type,
                body,
            };
            let response = Response::from_string(reply_body)
                .with_status_code(status)
                .with_header(
                    Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap(),
                );
            let _ = tx.send(seen);
            let _ = req.respond(response);
        }
    });
    (addr, rx)
}

#[test]
fn get_sends_bearer_and_encoded_query() {
    let (addr, rx) = one_shot(
        200,
        r#"{"id":"m 1","state":0,"voltage":12,"ipAddr":"10.0.0.5"}"#,
    );
    let backend = HttpBackend::new(&addr, Duration::from_secs(5)).unwrap();
    let reply = backend
        .execute(
            &ApiRequest::get("/get_machine")
                .query("machine_id", "m 1")
                .bearer("tok-123"),
        )
        .expect("reply");
    assert_eq!(reply.status, 200);
    assert!(String::from_utf8_lossy(&reply.body).contains("10.0.0.5"));

    let seen = rx.recv_timeout(Duration::from_secs(5)).expect("request seen");
    assert_eq!(seen.method, "GET");
    assert_eq!(seen.url, "/get_machine?machine_id=m+1");
    assert_eq!(seen.authorization.as_deref(), Some("Bearer tok-123"));
    assert_eq!(seen.content_type.as_deref(), Some("application/json"));
}

#[test]
fn post_carries_json_body_and_error_status_is_a_reply() {
    let (addr, rx) = one_shot(409, r#"{"error":"machine busy"}"#);
    let backend = HttpBackend::new(&addr, Duration::from_secs(5)).unwrap();
    let reply = backend
        .execute(
            &ApiRequest::post("/unlock_machine", br#"{"machine_id":"m1"}"#.to_vec()).bearer("t"),
        )
        .expect("non-2xx is still a reply");
    assert_eq!(reply.status, 409);
    assert_eq!(reply.body, br#"{"error":"machine busy"}"#.to_vec());

    let seen = rx.recv_timeout(Duration::from_secs(5)).expect("request seen");
    assert_eq!(seen.method, "POST");
    assert_eq!(seen.body, r#"{"machine_id":"m1"}"#);
}

#[test]
fn closed_port_is_no_response() {
    // Bind then drop to get a port nobody listens on.
    let addr = {
        let server = Server::http("127.0.0.1:0").expect("bind");
        format!("http://{}", server.server_addr())
    };
    let backend = HttpBackend::new(&addr, Duration::from_secs(2)).unwrap();
    let err = backend
        .execute(&ApiRequest::get("/get_all_machines"))
        .expect_err("nothing listens");
    match err.downcast_ref::<HttpError>() {
        Some(HttpError::NoResponse(_)) | Some(HttpError::Timeout) => {}
        other => panic!("unexpected error: {other:?}"),
    }
}
