#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Client logic for the shared-machines backend (transport-agnostic).
//!
//! Every backend call goes through `machines_traits::Backend`; the HTTP
//! transport lives in `machines_http`.
//!
//! ## Architecture
//!
//! - **Model**: `Machine` and its integer-coded `MachineState` (`model`)
//! - **Client**: typed endpoint calls and error mapping (`client`, `transport_error`)
//! - **Commands**: start/pause/resume/finish and the button panel (`command`, `dispatch`)
//! - **Views**: detail, list, login and finish-session (`detail`, `list`, `login`, `finish`)
//! - **Session**: token storage (`session`)
//! - **Watching**: background re-fetch of one machine (`poller`)
//!
//! ## Optimistic state
//!
//! A successful command sets the local state to the command's target without
//! reading anything back. Set `ApiSettings::refresh_after_command` to re-read
//! the machine afterwards.

pub mod atomic;
pub mod client;
pub mod command;
pub mod config;
pub mod conversions;
pub mod detail;
pub mod dispatch;
pub mod error;
pub mod finish;
pub mod list;
pub mod login;
pub mod mocks;
pub mod model;
pub mod poller;
pub mod route;
pub mod session;
pub mod status;
pub mod transport_error;

pub use client::{ApiClient, ApiClientBuilder};
pub use command::{Button, Command, ControlPanel};
pub use config::ApiSettings;
pub use detail::{DetailModel, MachineView};
pub use dispatch::CommandDispatcher;
pub use error::{ApiError, BuildError, FETCH_FAILED_MESSAGE, NO_RESPONSE_MESSAGE, ViewError};
pub use finish::{FinishOutcome, finish_session};
pub use list::{MachineRow, MachinesView};
pub use login::{LoginForm, logout};
pub use model::{Machine, MachineState};
pub use poller::{Poller, Snapshot};
pub use route::{QueryParams, Route};
pub use session::FileTokenStore;
pub use status::{StatusBadge, StatusColor, status_badge};
