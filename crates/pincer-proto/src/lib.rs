//! # pincer-proto
//!
//! Value model for the Pincer controller protocol.
//!
//! Every request payload sent to a controller and every decoded reply is
//! built from [`Variant`], a closed tagged union over the scalar types,
//! ordered key/value mappings, append-ordered lists and [`Node`] objects.
//! The crate is pure data: no sockets, no framing, no I/O. The transport
//! side lives in `pincer-client`.
//!
//! Record bodies arrive as JSON; [`Variant::parse_document`] bridges a
//! decoded `serde_json` document into the variant model, and
//! [`Variant::to_json`] goes the other way when composing a request.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cluster;
pub mod error;
pub mod node;
pub mod variant;

pub use cluster::Cluster;
pub use error::ProtoError;
pub use node::Node;
pub use variant::{map_to_json, Variant, VariantList, VariantMap};
