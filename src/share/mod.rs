//! Share links
//!
//! A build plus its checklist packed into a self-contained, URL-safe token,
//! and the read-only preview built from one.

pub mod codec;
pub mod link;
pub mod preview;

pub use codec::{ShareSnapshot, encode, decode};
pub use link::{share_url, extract_token, parse_share_url, SHARE_ROUTE, DATA_PARAM};
pub use preview::SharePreview;
