//! API credentials and authentication headers.

pub mod credentials;
pub mod headers;

pub use credentials::{ApiKeyCreds, BuilderApiKeyCreds};
pub use headers::{
    build_hmac_signature, create_builder_headers, create_l1_headers, create_l2_headers,
    inject_builder_headers, Headers, L2HeaderArgs,
};
