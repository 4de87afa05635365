//! Request and response types shared by the CLOB and relayer clients.

pub mod order;
pub mod relayer;
pub mod safe;

pub use order::*;
pub use relayer::*;
pub use safe::*;
