//! Client-server communication protocol.
//!
//! This module defines the protocol spoken between a climate-monitoring
//! client and the dispatcher that fronts the record store: the operation
//! tags, the envelope exchanged per call, and the transport machinery that
//! moves typed values over a single long-lived TCP connection.
//!
//! # Overview
//!
//! A client opens one [`Connection`] and keeps it for its whole session.
//! Every remote operation is one envelope exchange in lockstep: the client
//! writes an operation tag followed by that operation's arguments, each as
//! its own value; the dispatcher answers with an [`Outcome`] flag followed
//! by the typed result on success or a [`DatabaseError`] on failure.
//! Requests on one connection never overlap and responses arrive in request
//! order.
//!
//! # Key Components
//!
//! - [`RequestTag`]: the closed set of remote operations.
//! - [`Transport`]: one `Encode` value out, one `Decode` value in, over any
//!   `Read + Write` stream.
//! - [`Connection`]: a transport session with an explicit lifecycle; any
//!   transport error is terminal for it.
//! - [`Client`]: the proxy, one method per remote operation, connection
//!   behind a mutex.
//! - [`Server`]: the dispatcher, one pool thread per connection, backed by a
//!   shared [`Store`](crate::store::Store).
//!
//! # Wire Format
//!
//! Values are bincode-encoded, big-endian with fixed-width integers. There
//! is no framing: each value is self-delimiting under its own encoding, so
//! both ends must agree on what type comes next; the tag determines the
//! argument list, the outcome determines the payload. Enums travel as their
//! variant index; a stream positioned on bytes of the wrong shape fails to
//! decode and ends the connection.
//!
//! # Versioning
//!
//! The tag enumeration is the single source of truth for the operation set,
//! shared by proxy and dispatcher. Variants are append-only; reordering or
//! removal changes encoded indices and breaks peers, which is why the wire
//! values are pinned by tests and stamped with [`PROTOCOL_VERSION`].

mod client;
mod connection;
mod request;
mod response;
mod server;
mod thread;
mod transport;

use thread::ThreadPool;

pub use client::{Client, ClientError};
pub use connection::{Connection, ConnectionState};
pub use request::{PROTOCOL_VERSION, RequestTag};
pub use response::{DatabaseError, DatabaseErrorKind, Outcome};
pub use server::Server;
pub use transport::{Transport, TransportError};
