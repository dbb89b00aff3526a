//! The client-side proxy.
//!
//! [`Client`] exposes one method per remote operation and hides the wire
//! entirely: callers see plain argument and result types plus exactly two
//! failure kinds. A call writes the operation tag and its arguments, then
//! blocks until the dispatcher's outcome and payload arrive. The connection
//! lives behind a mutex, so concurrent callers queue and envelopes never
//! interleave; one call equals one envelope exchange. `force_close` is the
//! one path that does not queue: it shuts the socket down out from under a
//! call in flight.
//!
//! Failure surface:
//! - [`ClientError::ConnectionLost`] for anything wrong with the transport,
//!   including an envelope that does not decode. Terminal for the current
//!   connection; only `connect` recovers.
//! - [`ClientError::Database`] when the dispatcher reports that the store
//!   rejected the request. The connection stays usable.

use std::net::{Shutdown, TcpStream};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use bincode::Decode;
use log::debug;
use thiserror::Error;

use crate::domain::{Area, Category, Center, Operator, Parameter};

use super::connection::Connection;
use super::request::RequestTag;
use super::response::{DatabaseError, Outcome};
use super::transport::TransportError;

#[derive(Debug, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The connection is gone or was never usable. Reconnect to continue.
    #[error("connection lost")]
    ConnectionLost,

    /// The store rejected the request. The connection is still good.
    #[error("database request failed: {0}")]
    Database(#[from] DatabaseError),
}

/// A remote handle to the climate-monitoring store.
///
/// All methods take `&self`; the connection mutex serializes every exchange.
/// Methods block the calling thread for the full round trip.
///
/// ```no_run
/// use stratus::Client;
///
/// # fn main() -> Result<(), stratus::ClientError> {
/// let client = Client::new();
/// client.connect("127.0.0.1", 9090)?;
/// println!("rtt: {:?}", client.ping()?);
///
/// for area in client.search_areas_by_name("var")? {
///     println!("{area}");
/// }
///
/// client.close()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct Client {
    conn: Mutex<Option<Connection>>,
    // Second handle to the connection's socket, reachable while a call holds
    // the connection lock. force_close shuts it down to interrupt the call.
    breaker: Mutex<Option<TcpStream>>,
}

impl Client {
    /// A proxy with no connection. Every remote call fails with
    /// [`ClientError::ConnectionLost`] until [`connect`](Self::connect)
    /// succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a connection to a dispatcher. An existing connection is
    /// force-closed first; if the new one cannot be opened the proxy is left
    /// with no connection at all.
    pub fn connect(&self, host: &str, port: u16) -> Result<(), ClientError> {
        let mut slot = self.conn.lock().unwrap();
        if let Some(old) = slot.as_mut() {
            old.force_close();
        }
        *slot = None;
        *self.breaker.lock().unwrap() = None;

        let conn = Connection::open(host, port).map_err(lost)?;
        *self.breaker.lock().unwrap() = Some(conn.stream_handle().map_err(lost)?);
        *slot = Some(conn);
        Ok(())
    }

    /// Cooperative shutdown. A no-op when there is nothing to close; fails
    /// with [`ClientError::ConnectionLost`] when the connection had already
    /// failed.
    pub fn close(&self) -> Result<(), ClientError> {
        let mut slot = self.conn.lock().unwrap();
        match slot.as_mut() {
            None => Ok(()),
            Some(conn) => conn.close().map_err(lost),
        }
    }

    /// Drops the connection on the floor, skipping the handshake. Never
    /// fails, never blocks on the peer, and never waits for a call in
    /// flight: the socket is shut down out from under it, which fails that
    /// call with [`ClientError::ConnectionLost`].
    pub fn force_close(&self) {
        // Shut the socket down before touching the connection lock; a call
        // blocked mid-read holds that lock until the shutdown fails it.
        if let Some(stream) = self.breaker.lock().unwrap().take() {
            let _ = stream.shutdown(Shutdown::Both);
        }
        if let Some(conn) = self.conn.lock().unwrap().as_mut() {
            conn.force_close();
        }
    }

    pub fn begin(&self) -> Result<(), ClientError> {
        self.call_ack(RequestTag::Begin, |_| Ok(()))
    }

    pub fn end(&self) -> Result<(), ClientError> {
        self.call_ack(RequestTag::End, |_| Ok(()))
    }

    /// Areas whose name contains the given string, alphabetically.
    pub fn search_areas_by_name(&self, name: &str) -> Result<Vec<Area>, ClientError> {
        self.call(RequestTag::SearchAreasByName, |c| c.send(name))
    }

    /// Areas whose country name contains the given string, alphabetically.
    pub fn search_areas_by_country(&self, country: &str) -> Result<Vec<Area>, ClientError> {
        self.call(RequestTag::SearchAreasByCountry, |c| c.send(country))
    }

    /// Areas within about half a degree of the given point.
    pub fn search_areas_by_coords(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Vec<Area>, ClientError> {
        self.call(RequestTag::SearchAreasByCoords, |c| {
            c.send(latitude)?;
            c.send(longitude)
        })
    }

    /// Centers whose id contains the given string, alphabetically.
    pub fn search_centers_by_name(&self, name: &str) -> Result<Vec<Center>, ClientError> {
        self.call(RequestTag::SearchCentersByName, |c| c.send(name))
    }

    pub fn area(&self, geoname_id: i32) -> Result<Area, ClientError> {
        self.call(RequestTag::GetArea, |c| c.send(geoname_id))
    }

    pub fn monitored_areas(&self, center_id: &str) -> Result<Vec<Area>, ClientError> {
        self.call(RequestTag::GetMonitoredAreas, |c| c.send(center_id))
    }

    pub fn center(&self, center_id: &str) -> Result<Center, ClientError> {
        self.call(RequestTag::GetCenter, |c| c.send(center_id))
    }

    pub fn centers(&self) -> Result<Vec<Center>, ClientError> {
        self.call(RequestTag::GetCenters, |_| Ok(()))
    }

    /// The center at the given address; `city` is the city's geoname id.
    pub fn center_by_address(
        &self,
        city: i32,
        street: &str,
        house_number: i32,
    ) -> Result<Center, ClientError> {
        self.call(RequestTag::GetCenterByAddress, |c| {
            c.send(city)?;
            c.send(street)?;
            c.send(house_number)
        })
    }

    /// The center that submitted the most recent recording for the area.
    pub fn latest_center(&self, geoname_id: i32) -> Result<Center, ClientError> {
        self.call(RequestTag::GetLatestCenter, |c| c.send(geoname_id))
    }

    /// Centers that monitor the given area.
    pub fn associated_centers(&self, geoname_id: i32) -> Result<Vec<Center>, ClientError> {
        self.call(RequestTag::GetAssociatedCenters, |c| c.send(geoname_id))
    }

    pub fn operator(&self, user_id: &str) -> Result<Operator, ClientError> {
        self.call(RequestTag::GetOperator, |c| c.send(user_id))
    }

    pub fn operator_by_ssid(&self, ssid: &str) -> Result<Operator, ClientError> {
        self.call(RequestTag::GetOperatorBySsid, |c| c.send(ssid))
    }

    pub fn operator_by_email(&self, email: &str) -> Result<Operator, ClientError> {
        self.call(RequestTag::GetOperatorByEmail, |c| c.send(email))
    }

    /// Recordings for the area/center/category triple, oldest first.
    pub fn parameters(
        &self,
        geoname_id: i32,
        center_id: &str,
        category: &str,
    ) -> Result<Vec<Parameter>, ClientError> {
        self.call(RequestTag::GetParameters, |c| {
            c.send(geoname_id)?;
            c.send(center_id)?;
            c.send(category)
        })
    }

    /// Mean score over the area/center/category triple.
    pub fn parameters_average(
        &self,
        geoname_id: i32,
        center_id: &str,
        category: &str,
    ) -> Result<f64, ClientError> {
        self.call(RequestTag::GetParametersAverage, |c| {
            c.send(geoname_id)?;
            c.send(center_id)?;
            c.send(category)
        })
    }

    pub fn categories(&self) -> Result<Vec<Category>, ClientError> {
        self.call(RequestTag::GetCategories, |_| Ok(()))
    }

    /// The category of the center's most recent recording for the area.
    pub fn latest_category(
        &self,
        geoname_id: i32,
        center_id: &str,
    ) -> Result<Category, ClientError> {
        self.call(RequestTag::GetLatestCategory, |c| {
            c.send(geoname_id)?;
            c.send(center_id)
        })
    }

    pub fn add_area(&self, area: &Area) -> Result<(), ClientError> {
        self.call_ack(RequestTag::AddArea, |c| c.send(area))
    }

    pub fn add_center(&self, center: &Center) -> Result<(), ClientError> {
        self.call_ack(RequestTag::AddCenter, |c| c.send(center))
    }

    pub fn add_operator(&self, operator: &Operator) -> Result<(), ClientError> {
        self.call_ack(RequestTag::AddOperator, |c| c.send(operator))
    }

    pub fn add_parameter(&self, parameter: &Parameter) -> Result<(), ClientError> {
        self.call_ack(RequestTag::AddParameter, |c| c.send(parameter))
    }

    /// Overwrites the operator stored under `user_id`.
    pub fn edit_operator(&self, user_id: &str, operator: &Operator) -> Result<(), ClientError> {
        self.call_ack(RequestTag::EditOperator, |c| {
            c.send(user_id)?;
            c.send(operator)
        })
    }

    /// Puts an existing area under a center's watch.
    pub fn include_area_to_center(
        &self,
        geoname_id: i32,
        center_id: &str,
    ) -> Result<(), ClientError> {
        self.call_ack(RequestTag::IncludeAreaToCenter, |c| {
            c.send(geoname_id)?;
            c.send(center_id)
        })
    }

    /// Whether the center monitors the area.
    pub fn monitors(&self, center_id: &str, geoname_id: i32) -> Result<bool, ClientError> {
        self.call(RequestTag::Monitors, |c| {
            c.send(center_id)?;
            c.send(geoname_id)
        })
    }

    /// Whether the center employs the operator.
    pub fn employs(&self, center_id: &str, user_id: &str) -> Result<bool, ClientError> {
        self.call(RequestTag::Employs, |c| {
            c.send(center_id)?;
            c.send(user_id)
        })
    }

    /// The operator matching the credential pair.
    pub fn validate_credentials(
        &self,
        user_id: &str,
        password: &str,
    ) -> Result<Operator, ClientError> {
        self.call(RequestTag::ValidateCredentials, |c| {
            c.send(user_id)?;
            c.send(password)
        })
    }

    /// Round-trip time to the dispatcher, measured from the start of the
    /// send to the full receipt of the acknowledgement.
    pub fn ping(&self) -> Result<Duration, ClientError> {
        let mut slot = self.conn.lock().unwrap();
        let conn = slot.as_mut().ok_or(ClientError::ConnectionLost)?;

        let start = Instant::now();
        match request(conn, RequestTag::Ping, |_| Ok(())).map_err(lost)? {
            Outcome::Success => Ok(start.elapsed()),
            Outcome::Failure => Err(failure(conn)?),
        }
    }

    /// One envelope exchange expecting a typed payload on success.
    fn call<T, F>(&self, tag: RequestTag, write_args: F) -> Result<T, ClientError>
    where
        T: Decode<()>,
        F: FnOnce(&mut Connection) -> Result<(), TransportError>,
    {
        let mut slot = self.conn.lock().unwrap();
        let conn = slot.as_mut().ok_or(ClientError::ConnectionLost)?;

        match request(conn, tag, write_args).map_err(lost)? {
            Outcome::Success => conn.receive().map_err(lost),
            Outcome::Failure => Err(failure(conn)?),
        }
    }

    /// One envelope exchange where success carries no payload.
    fn call_ack<F>(&self, tag: RequestTag, write_args: F) -> Result<(), ClientError>
    where
        F: FnOnce(&mut Connection) -> Result<(), TransportError>,
    {
        let mut slot = self.conn.lock().unwrap();
        let conn = slot.as_mut().ok_or(ClientError::ConnectionLost)?;

        match request(conn, tag, write_args).map_err(lost)? {
            Outcome::Success => Ok(()),
            Outcome::Failure => Err(failure(conn)?),
        }
    }
}

/// Writes one request and reads the outcome flag.
fn request<F>(
    conn: &mut Connection,
    tag: RequestTag,
    write_args: F,
) -> Result<Outcome, TransportError>
where
    F: FnOnce(&mut Connection) -> Result<(), TransportError>,
{
    conn.send(tag)?;
    write_args(conn)?;
    conn.flush()?;
    conn.receive()
}

/// Reads the error payload of a failure envelope.
fn failure(conn: &mut Connection) -> Result<ClientError, ClientError> {
    let err: DatabaseError = conn.receive().map_err(lost)?;
    Ok(ClientError::Database(err))
}

/// The single fold point from transport trouble to the client's terminal
/// failure kind. The cause is not surfaced, so record it here.
fn lost(e: TransportError) -> ClientError {
    debug!("treating transport failure as a lost connection: {e}");
    ClientError::ConnectionLost
}
