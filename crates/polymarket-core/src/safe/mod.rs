//! Gnosis Safe plumbing: address derivation, call batching, approvals and
//! transaction signing.

pub mod approvals;
pub mod derive;
pub mod multisend;
pub mod safe_tx;

pub use approvals::approval_transactions;
pub use derive::{derive_safe_address, SAFE_INIT_CODE_HASH};
pub use multisend::aggregate_transactions;
pub use safe_tx::{sign_safe_transaction, split_and_pack_signature};
