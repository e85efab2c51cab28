//! # pincer-client
//!
//! RPC transport for talking to a Pincer cluster controller.
//!
//! The wire protocol is a private HTTP-like exchange over TCP, optionally
//! TLS-wrapped: the client POSTs a JSON payload describing an operation and
//! the controller answers with headers (`Set-Cookie:`, `Server:`) followed
//! by a JSON body. One logical record ends at a blank line, or at a 0x1E
//! separator byte in streaming mode; a stream may carry several records
//! back-to-back (continuous job log tailing uses this).
//!
//! Layering, bottom up:
//! - [`framer::RecordBuffer`] — growable byte region fed by socket reads;
//!   detects and extracts complete records.
//! - [`headers::SessionHeaders`] — session cookies and server identity
//!   harvested from received records.
//! - [`transport::Connection`] — the socket (and optional TLS session),
//!   resolution, connect/handshake, guarded read/write, teardown.
//! - [`client::RpcClient`] — composes requests from a
//!   [`pincer_proto::VariantMap`], drives the framer until a reply record
//!   is complete, and exposes the decoded [`reply::RpcReply`].
//!
//! The protocol is strictly synchronous request/reply over one socket: no
//! pipelining, one request in flight. Cloned [`client::RpcClient`] handles
//! share a single physical connection behind a mutex; the connection is
//! torn down when the last clone drops.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod config;
pub mod error;
pub mod framer;
pub mod headers;
pub mod reply;
pub mod transport;

pub use client::RpcClient;
pub use config::ClientConfig;
pub use error::ClientError;
pub use framer::RecordBuffer;
pub use headers::SessionHeaders;
pub use reply::RpcReply;
pub use transport::Connection;
