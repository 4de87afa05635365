//! Clients for the Polymarket CLOB and Safe relayer.

pub mod clob;
pub mod poll;
pub mod relayer;
pub mod transport;

pub use clob::ClobClient;
pub use poll::{CancelToken, PollOptions};
pub use relayer::RelayerClient;
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
