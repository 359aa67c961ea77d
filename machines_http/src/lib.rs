//! Backend transports for the machines client: a real HTTP backend and an
//! in-memory simulation with the same wire shapes.
pub mod error;
pub mod http;
pub mod sim;

pub use error::HttpError;
pub use http::HttpBackend;
pub use sim::SimulatedBackend;
