//! dojutsu-protocol: Wire envelopes for the Dojutsu daemon
//!
//! A request is a single JSON object written to a Unix domain socket and
//! terminated by shutting down the write half of the connection. The
//! response is a single JSON object terminated by the daemon closing the
//! connection. There is no length prefix in either direction.

pub mod codec;
pub mod envelope;
pub mod error;

pub use codec::{decode_response, EnvelopeCodec};
pub use envelope::{Request, Response, ERROR_FIELD};
pub use error::ProtocolError;

/// Module identifier the daemon dispatches requests to
pub const DEFAULT_PACKAGE: &str = "dojutsu-agent";
