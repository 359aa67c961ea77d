//! In-memory stand-in for the machines backend.
//!
//! Enforces the lock state machine the real server enforces
//! (Free -> InUse -> Stopped -> InUse -> Free), checks the bearer token, and
//! answers with the same JSON shapes, including `{ "error": ... }` bodies.

use std::collections::BTreeMap;
use std::sync::Mutex;

use machines_traits::{ApiRequest, Backend, BoxError, Method, Reply};
use serde_json::{Value, json};

use crate::error::HttpError;

/// Token handed out by `/login` and accepted on every other endpoint.
pub const SIM_TOKEN: &str = "simulated-session";
pub const SIM_PHONE: &str = "+70000000000";
pub const SIM_PASSWORD: &str = "password";
/// QR key accepted by `/finish_session`.
pub const SIM_QR_KEY: &str = "sim-qr-key";

const FREE: i64 = 0;
const STOPPED: i64 = 1;
const IN_USE: i64 = 2;

#[derive(Debug, Clone)]
struct SimMachine {
    state: i64,
    voltage: i64,
    ip_addr: String,
    parking_id: i64,
}

#[derive(Debug, Default)]
struct SimState {
    machines: BTreeMap<String, SimMachine>,
    requests: u64,
    offline: bool,
}

#[derive(Debug, Default)]
pub struct SimulatedBackend {
    state: Mutex<SimState>,
}

impl SimulatedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Three machines, one per state.
    pub fn with_demo_fleet() -> Self {
        let sim = Self::new();
        sim.insert_machine("m1", FREE, 12, "10.0.0.5");
        sim.insert_machine("m2", IN_USE, 11, "10.0.0.6");
        sim.insert_machine("m3", STOPPED, 12, "10.0.0.7");
        sim
    }

    pub fn insert_machine(&self, id: &str, state: i64, voltage: i64, ip_addr: &str) {
        if let Ok(mut s) = self.state.lock() {
            s.machines.insert(
                id.to_string(),
                SimMachine {
                    state,
                    voltage,
                    ip_addr: ip_addr.to_string(),
                    parking_id: 1,
                },
            );
        }
    }

    /// Server-side state of `id`, if known.
    pub fn machine_state(&self, id: &str) -> Option<i64> {
        self.state
            .lock()
            .ok()
            .and_then(|s| s.machines.get(id).map(|m| m.state))
    }

    /// Change state behind the client's back, as another user would.
    pub fn set_machine_state(&self, id: &str, state: i64) {
        if let Ok(mut s) = self.state.lock()
            && let Some(m) = s.machines.get_mut(id)
        {
            m.state = state;
        }
    }

    /// Number of requests that reached the simulated server.
    pub fn request_count(&self) -> u64 {
        self.state.lock().map(|s| s.requests).unwrap_or(0)
    }

    /// While offline every request fails without a response.
    pub fn set_offline(&self, offline: bool) {
        if let Ok(mut s) = self.state.lock() {
            s.offline = offline;
        }
    }

    fn handle(&self, req: &ApiRequest) -> Result<Reply, HttpError> {
        let mut s = self
            .state
            .lock()
            .map_err(|_| HttpError::NoResponse("simulated backend poisoned".into()))?;
        if s.offline {
            return Err(HttpError::NoResponse("simulated backend offline".into()));
        }
        s.requests += 1;

        if req.method == Method::Post && req.path == "/login" {
            return Ok(login(req));
        }
        if req.bearer.as_deref() != Some(SIM_TOKEN) {
            return Ok(error(401, "unauthorized"));
        }

        let reply = match (req.method, req.path.as_str()) {
            (Method::Get, "/get_all_machines") => {
                let list: Vec<Value> = s
                    .machines
                    .iter()
                    .map(|(id, m)| machine_json(id, m))
                    .collect();
                ok(Value::Array(list))
            }
            (Method::Get, "/get_machine") => match req.query_value("machine_id") {
                None | Some("") => error(400, "machine_id is required"),
                Some(id) => match s.machines.get(id) {
                    Some(m) => ok(machine_json(id, m)),
                    None => error(404, "machine not found"),
                },
            },
            (Method::Post, "/unlock_machine") => transition(&mut s, req, FREE, IN_USE, "unlock"),
            (Method::Post, "/stop_machine") => transition(&mut s, req, IN_USE, STOPPED, "stop"),
            (Method::Post, "/unstop_machine") => {
                transition(&mut s, req, STOPPED, IN_USE, "unstop")
            }
            (Method::Post, "/lock_machine") => transition(&mut s, req, IN_USE, FREE, "lock"),
            (Method::Post, "/finish_session") => finish_session(req),
            (_, "/get_all_machines" | "/get_machine" | "/unlock_machine" | "/stop_machine"
            | "/unstop_machine" | "/lock_machine" | "/finish_session") => {
                error(405, "method not allowed")
            }
            _ => error(404, "not found"),
        };
        Ok(reply)
    }
}

impl Backend for SimulatedBackend {
    fn execute(&self, request: &ApiRequest) -> Result<Reply, BoxError> {
        tracing::debug!(
            method = request.method.as_str(),
            path = %request.path,
            "simulated backend request"
        );
        self.handle(request).map_err(|e| Box::new(e) as BoxError)
    }
}

fn body_json(req: &ApiRequest) -> Option<Value> {
    req.body
        .as_deref()
        .and_then(|b| serde_json::from_slice::<Value>(b).ok())
}

fn str_field<'a>(v: &'a Value, key: &str) -> Option<&'a str> {
    v.get(key).and_then(Value::as_str)
}

fn login(req: &ApiRequest) -> Reply {
    let Some(body) = body_json(req) else {
        return error(400, "invalid request body");
    };
    match (str_field(&body, "phone_number"), str_field(&body, "password")) {
        (Some(SIM_PHONE), Some(SIM_PASSWORD)) => ok(json!({ "token": SIM_TOKEN })),
        _ => error(401, "invalid phone number or password"),
    }
}

fn transition(s: &mut SimState, req: &ApiRequest, from: i64, to: i64, verb: &str) -> Reply {
    let Some(id) = body_json(req).and_then(|b| str_field(&b, "machine_id").map(str::to_string))
    else {
        return error(400, "machine_id is required");
    };
    let Some(machine) = s.machines.get_mut(&id) else {
        return error(404, "machine not found");
    };
    if machine.state != from {
        return error(
            400,
            &format!("cannot {verb} machine {id} in state {}", machine.state),
        );
    }
    machine.state = to;
    ok(json!({ "msg": format!("machine {id}: {verb} ok") }))
}

fn finish_session(req: &ApiRequest) -> Reply {
    let Some(body) = body_json(req) else {
        return error(400, "invalid request body");
    };
    match (str_field(&body, "key"), str_field(&body, "parking_name")) {
        (Some(SIM_QR_KEY), Some(parking)) if !parking.is_empty() => {
            ok(json!({ "msg": format!("session finished at {parking}") }))
        }
        _ => error(400, "invalid qr key"),
    }
}

fn machine_json(id: &str, m: &SimMachine) -> Value {
    json!({
        "id": id,
        "state": m.state,
        "parking_id": m.parking_id,
        "voltage": m.voltage,
        "ipAddr": m.ip_addr,
    })
}

fn ok(v: Value) -> Reply {
    Reply::new(200, v.to_string())
}

fn error(status: u16, msg: &str) -> Reply {
    Reply::new(status, json!({ "error": msg }).to_string())
}
