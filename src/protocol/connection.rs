use std::io;
use std::net::{Shutdown, TcpStream};

use bincode::{Decode, Encode};
use log::debug;

use super::request::RequestTag;
use super::response::Outcome;
use super::transport::{Transport, TransportError};

/// Lifecycle states of a [`Connection`].
///
/// `Open` is the only state that accepts calls. Any transport error latches
/// `Failed`, which is terminal: no further I/O is attempted through this
/// connection. `Closing` exists only for the duration of the cooperative
/// disconnect exchange; `Closed` is the orderly end state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Open,
    Closing,
    Closed,
    Failed,
}

/// One established transport session to a dispatcher.
///
/// Owns the socket and its state machine. All sends and receives block the
/// calling thread; serialization of whole calls is the owner's job (the
/// proxy holds a connection behind a mutex and never interleaves envelopes).
pub struct Connection {
    transport: Transport<TcpStream>,
    state: ConnectionState,
}

impl Connection {
    /// Opens a session. On failure nothing is constructed, so a half-open
    /// connection is never observable.
    pub fn open(host: &str, port: u16) -> Result<Self, TransportError> {
        let stream = TcpStream::connect((host, port))?;
        debug!("connection open to {host}:{port}");

        Ok(Self {
            transport: Transport::new(stream),
            state: ConnectionState::Open,
        })
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// An independently owned handle to the underlying socket. Shutting it
    /// down from another thread makes a send or receive blocked here fail,
    /// which latches the connection `Failed`.
    pub fn stream_handle(&self) -> Result<TcpStream, TransportError> {
        Ok(self.transport.get_ref().try_clone()?)
    }

    /// Writes one value. Any transport error moves the connection to
    /// `Failed` before propagating.
    pub fn send<V: Encode>(&mut self, value: V) -> Result<(), TransportError> {
        self.guard_io()?;
        self.latch(|t| t.send(value))
    }

    /// Reads one value, blocking until it is complete. Any transport error,
    /// including a decode of unexpected shape, moves the connection to
    /// `Failed` before propagating.
    pub fn receive<V: Decode<()>>(&mut self) -> Result<V, TransportError> {
        self.guard_io()?;
        self.latch(|t| t.receive())
    }

    pub fn flush(&mut self) -> Result<(), TransportError> {
        self.guard_io()?;
        self.latch(|t| t.flush())
    }

    /// Cooperative shutdown: sends the disconnect tag, waits for the peer's
    /// acknowledgement, then releases the stream.
    ///
    /// A no-op when already `Closed`. Fails without touching the socket when
    /// the connection is `Failed`; if the exchange itself fails at the I/O
    /// level the connection ends `Failed` rather than `Closed`.
    pub fn close(&mut self) -> Result<(), TransportError> {
        match self.state {
            ConnectionState::Closed => Ok(()),
            ConnectionState::Failed => Err(not_open()),
            _ => {
                self.state = ConnectionState::Closing;
                self.send(RequestTag::Disconnect)?;
                self.flush()?;
                match self.receive::<Outcome>()? {
                    Outcome::Success | Outcome::Failure => {}
                }

                let _ = self.transport.get_ref().shutdown(Shutdown::Both);
                self.state = ConnectionState::Closed;
                debug!("connection closed");
                Ok(())
            }
        }
    }

    /// Unconditional shutdown: releases the stream immediately, skipping the
    /// handshake. Idempotent and infallible, whatever state the connection
    /// is in. Only a live connection moves to `Closed`; a `Failed` one keeps
    /// reporting `Failed`.
    pub fn force_close(&mut self) {
        match self.state {
            ConnectionState::Closed => {}
            ConnectionState::Failed => {
                let _ = self.transport.get_ref().shutdown(Shutdown::Both);
            }
            ConnectionState::Open | ConnectionState::Closing => {
                let _ = self.transport.get_ref().shutdown(Shutdown::Both);
                self.state = ConnectionState::Closed;
                debug!("connection closed (forced)");
            }
        }
    }

    fn guard_io(&self) -> Result<(), TransportError> {
        match self.state {
            ConnectionState::Open | ConnectionState::Closing => Ok(()),
            ConnectionState::Closed | ConnectionState::Failed => Err(not_open()),
        }
    }

    fn latch<R>(
        &mut self,
        op: impl FnOnce(&mut Transport<TcpStream>) -> Result<R, TransportError>,
    ) -> Result<R, TransportError> {
        match op(&mut self.transport) {
            Ok(value) => Ok(value),
            Err(e) => {
                debug!("transport failure, connection is now unusable: {e}");
                self.state = ConnectionState::Failed;
                Err(e)
            }
        }
    }
}

fn not_open() -> TransportError {
    TransportError::Io(io::Error::new(
        io::ErrorKind::NotConnected,
        "connection is not open",
    ))
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;
    use std::thread;

    use super::*;

    #[test]
    fn open_reaches_open_state() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let server = thread::spawn(move || listener.accept().map(|(s, _)| s));

        let conn = Connection::open("127.0.0.1", addr.port()).unwrap();
        assert_eq!(conn.state(), ConnectionState::Open);

        server.join().unwrap().unwrap();
    }

    #[test]
    fn open_to_dead_port_fails() {
        // Grab a port the OS considers free, then close it again.
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        assert!(Connection::open("127.0.0.1", port).is_err());
    }

    #[test]
    fn force_close_is_idempotent() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let server = thread::spawn(move || listener.accept().map(|(s, _)| s));

        let mut conn = Connection::open("127.0.0.1", addr.port()).unwrap();
        conn.force_close();
        conn.force_close();
        conn.force_close();
        assert_eq!(conn.state(), ConnectionState::Closed);

        server.join().unwrap().unwrap();
    }

    #[test]
    fn io_on_closed_connection_is_rejected_without_latching() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let server = thread::spawn(move || listener.accept().map(|(s, _)| s));

        let mut conn = Connection::open("127.0.0.1", addr.port()).unwrap();
        conn.force_close();

        assert!(conn.send(1_i32).is_err());
        assert!(conn.receive::<i32>().is_err());
        // Closed is terminal; a rejected call must not repaint it as Failed.
        assert_eq!(conn.state(), ConnectionState::Closed);

        server.join().unwrap().unwrap();
    }

    #[test]
    fn peer_drop_latches_failed() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let server = thread::spawn(move || {
            // Accept and drop straight away: the client sees EOF.
            let _ = listener.accept();
        });

        let mut conn = Connection::open("127.0.0.1", addr.port()).unwrap();
        server.join().unwrap();

        assert!(conn.receive::<i32>().is_err());
        assert_eq!(conn.state(), ConnectionState::Failed);

        // Terminal: later attempts fail without touching the socket.
        assert!(conn.send(1_i32).is_err());
        assert_eq!(conn.state(), ConnectionState::Failed);
    }

    #[test]
    fn failed_disconnect_exchange_latches_failed() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let server = thread::spawn(move || {
            // Accept and hang up instead of acknowledging the disconnect.
            let _ = listener.accept();
        });

        let mut conn = Connection::open("127.0.0.1", addr.port()).unwrap();
        server.join().unwrap();

        assert!(conn.close().is_err());
        assert_eq!(conn.state(), ConnectionState::Failed);
    }

    #[test]
    fn force_close_leaves_a_failed_connection_failed() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let server = thread::spawn(move || {
            let _ = listener.accept();
        });

        let mut conn = Connection::open("127.0.0.1", addr.port()).unwrap();
        server.join().unwrap();

        assert!(conn.receive::<i32>().is_err());
        assert_eq!(conn.state(), ConnectionState::Failed);

        conn.force_close();
        conn.force_close();
        assert_eq!(conn.state(), ConnectionState::Failed);

        // A failure stays reported as one.
        assert!(conn.close().is_err());
    }
}
