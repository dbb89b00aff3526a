//! The dispatcher.
//!
//! [`Server`] accepts connections and drives each one on a pool thread in
//! strict lockstep with the peer: read a tag, read that tag's arguments,
//! run the store operation, write back exactly one outcome plus payload.
//! Store failures travel the failure envelope and leave the connection
//! alone; only transport trouble (or the disconnect handshake) ends it.

use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::{Arc, Mutex};

use log::{debug, info, warn};

use crate::store::Store;

use super::ThreadPool;
use super::request::RequestTag;
use super::response::{DatabaseError, Outcome};
use super::transport::{Transport, TransportError};

pub struct Server<S> {
    listener: TcpListener,
    store: Arc<Mutex<S>>,
    pool: ThreadPool,
}

impl<S: Store + 'static> Server<S> {
    /// Binds the listener immediately, so an ephemeral port is observable
    /// through [`local_addr`](Self::local_addr) before `listen` is called.
    pub fn bind<A: ToSocketAddrs>(address: A, store: S) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(address)?;
        Ok(Self {
            listener,
            store: Arc::new(Mutex::new(store)),
            pool: ThreadPool::new(15),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts connections until the listener dies. Each connection gets a
    /// pool thread; a connection that ends badly is logged, not fatal.
    pub fn listen(self) -> Result<(), TransportError> {
        info!("listening at {}", self.listener.local_addr()?);

        for stream in self.listener.incoming() {
            match stream {
                Ok(stream) => {
                    let store = Arc::clone(&self.store);
                    self.pool.execute(move || {
                        if let Err(e) = handle_connection(stream, store) {
                            warn!("connection ended with transport failure: {e}");
                        }
                    });
                }
                Err(e) => warn!("broken connection: {e:?}"),
            }
        }
        Ok(())
    }
}

fn handle_connection<S: Store>(
    stream: TcpStream,
    store: Arc<Mutex<S>>,
) -> Result<(), TransportError> {
    if let Ok(peer) = stream.peer_addr() {
        info!("connection from {peer}");
    }

    let mut transport = Transport::new(stream);
    let mut in_bracket = false;
    let result = serve(&mut transport, &store, &mut in_bracket);

    // A peer that vanished mid-bracket must not wedge the shared store.
    if in_bracket {
        warn!("peer left a transaction bracket open, releasing it");
        if let Err(e) = store.lock().unwrap().end() {
            warn!("bracket release failed: {e}");
        }
    }

    result
}

fn serve<S: Store>(
    transport: &mut Transport<TcpStream>,
    store: &Arc<Mutex<S>>,
    in_bracket: &mut bool,
) -> Result<(), TransportError> {
    loop {
        let tag: RequestTag = transport.receive()?;
        debug!("request: {tag:?}");

        match tag {
            RequestTag::Disconnect => {
                transport.send(Outcome::Success)?;
                transport.flush()?;
                info!("peer disconnected");
                return Ok(());
            }
            RequestTag::Ping => {
                transport.send(Outcome::Success)?;
                transport.flush()?;
            }
            RequestTag::Begin => {
                let result = store.lock().unwrap().begin();
                if result.is_ok() {
                    *in_bracket = true;
                }
                respond_ack(transport, result)?;
            }
            RequestTag::End => {
                let result = store.lock().unwrap().end();
                if result.is_ok() {
                    *in_bracket = false;
                }
                respond_ack(transport, result)?;
            }
            RequestTag::SearchAreasByName => {
                let name: String = transport.receive()?;
                let result = store.lock().unwrap().search_areas_by_name(&name);
                respond(transport, result)?;
            }
            RequestTag::SearchAreasByCountry => {
                let country: String = transport.receive()?;
                let result = store.lock().unwrap().search_areas_by_country(&country);
                respond(transport, result)?;
            }
            RequestTag::SearchAreasByCoords => {
                let latitude: f64 = transport.receive()?;
                let longitude: f64 = transport.receive()?;
                let result = store.lock().unwrap().search_areas_by_coords(latitude, longitude);
                respond(transport, result)?;
            }
            RequestTag::SearchCentersByName => {
                let name: String = transport.receive()?;
                let result = store.lock().unwrap().search_centers_by_name(&name);
                respond(transport, result)?;
            }
            RequestTag::GetArea => {
                let geoname_id: i32 = transport.receive()?;
                let result = store.lock().unwrap().area(geoname_id);
                respond(transport, result)?;
            }
            RequestTag::GetMonitoredAreas => {
                let center_id: String = transport.receive()?;
                let result = store.lock().unwrap().monitored_areas(&center_id);
                respond(transport, result)?;
            }
            RequestTag::GetCenter => {
                let center_id: String = transport.receive()?;
                let result = store.lock().unwrap().center(&center_id);
                respond(transport, result)?;
            }
            RequestTag::GetCenters => {
                let result = store.lock().unwrap().centers();
                respond(transport, result)?;
            }
            RequestTag::GetCenterByAddress => {
                let city: i32 = transport.receive()?;
                let street: String = transport.receive()?;
                let house_number: i32 = transport.receive()?;
                let result = store
                    .lock()
                    .unwrap()
                    .center_by_address(city, &street, house_number);
                respond(transport, result)?;
            }
            RequestTag::GetLatestCenter => {
                let geoname_id: i32 = transport.receive()?;
                let result = store.lock().unwrap().latest_center(geoname_id);
                respond(transport, result)?;
            }
            RequestTag::GetAssociatedCenters => {
                let geoname_id: i32 = transport.receive()?;
                let result = store.lock().unwrap().associated_centers(geoname_id);
                respond(transport, result)?;
            }
            RequestTag::GetOperator => {
                let user_id: String = transport.receive()?;
                let result = store.lock().unwrap().operator(&user_id);
                respond(transport, result)?;
            }
            RequestTag::GetOperatorBySsid => {
                let ssid: String = transport.receive()?;
                let result = store.lock().unwrap().operator_by_ssid(&ssid);
                respond(transport, result)?;
            }
            RequestTag::GetOperatorByEmail => {
                let email: String = transport.receive()?;
                let result = store.lock().unwrap().operator_by_email(&email);
                respond(transport, result)?;
            }
            RequestTag::GetParameters => {
                let geoname_id: i32 = transport.receive()?;
                let center_id: String = transport.receive()?;
                let category: String = transport.receive()?;
                let result = store
                    .lock()
                    .unwrap()
                    .parameters(geoname_id, &center_id, &category);
                respond(transport, result)?;
            }
            RequestTag::GetParametersAverage => {
                let geoname_id: i32 = transport.receive()?;
                let center_id: String = transport.receive()?;
                let category: String = transport.receive()?;
                let result = store
                    .lock()
                    .unwrap()
                    .parameters_average(geoname_id, &center_id, &category);
                respond(transport, result)?;
            }
            RequestTag::GetCategories => {
                let result = store.lock().unwrap().categories();
                respond(transport, result)?;
            }
            RequestTag::GetLatestCategory => {
                let geoname_id: i32 = transport.receive()?;
                let center_id: String = transport.receive()?;
                let result = store.lock().unwrap().latest_category(geoname_id, &center_id);
                respond(transport, result)?;
            }
            RequestTag::AddArea => {
                let area = transport.receive()?;
                let result = store.lock().unwrap().add_area(area);
                respond_ack(transport, result)?;
            }
            RequestTag::AddCenter => {
                let center = transport.receive()?;
                let result = store.lock().unwrap().add_center(center);
                respond_ack(transport, result)?;
            }
            RequestTag::AddOperator => {
                let operator = transport.receive()?;
                let result = store.lock().unwrap().add_operator(operator);
                respond_ack(transport, result)?;
            }
            RequestTag::AddParameter => {
                let parameter = transport.receive()?;
                let result = store.lock().unwrap().add_parameter(parameter);
                respond_ack(transport, result)?;
            }
            RequestTag::EditOperator => {
                let user_id: String = transport.receive()?;
                let operator = transport.receive()?;
                let result = store.lock().unwrap().edit_operator(&user_id, operator);
                respond_ack(transport, result)?;
            }
            RequestTag::IncludeAreaToCenter => {
                let geoname_id: i32 = transport.receive()?;
                let center_id: String = transport.receive()?;
                let result = store
                    .lock()
                    .unwrap()
                    .include_area_to_center(geoname_id, &center_id);
                respond_ack(transport, result)?;
            }
            RequestTag::Monitors => {
                let center_id: String = transport.receive()?;
                let geoname_id: i32 = transport.receive()?;
                let result = store.lock().unwrap().monitors(&center_id, geoname_id);
                respond(transport, result)?;
            }
            RequestTag::Employs => {
                let center_id: String = transport.receive()?;
                let user_id: String = transport.receive()?;
                let result = store.lock().unwrap().employs(&center_id, &user_id);
                respond(transport, result)?;
            }
            RequestTag::ValidateCredentials => {
                let user_id: String = transport.receive()?;
                let password: String = transport.receive()?;
                let result = store.lock().unwrap().validate_credentials(&user_id, &password);
                respond(transport, result)?;
            }
        }
    }
}

/// Writes a success envelope with a payload, or a failure envelope.
fn respond<T: bincode::Encode>(
    transport: &mut Transport<TcpStream>,
    result: Result<T, DatabaseError>,
) -> Result<(), TransportError> {
    match result {
        Ok(value) => {
            transport.send(Outcome::Success)?;
            transport.send(value)?;
        }
        Err(e) => {
            debug!("request failed: {e}");
            transport.send(Outcome::Failure)?;
            transport.send(e)?;
        }
    }
    transport.flush()
}

/// Writes an acknowledgement envelope, which carries no success payload.
fn respond_ack(
    transport: &mut Transport<TcpStream>,
    result: Result<(), DatabaseError>,
) -> Result<(), TransportError> {
    match result {
        Ok(()) => transport.send(Outcome::Success)?,
        Err(e) => {
            debug!("request failed: {e}");
            transport.send(Outcome::Failure)?;
            transport.send(e)?;
        }
    }
    transport.flush()
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::thread;
    use std::time::Duration;

    use super::*;
    use crate::store::MemoryStore;

    fn spawn_server() -> SocketAddr {
        let server = Server::bind("127.0.0.1:0", MemoryStore::with_sample_data()).unwrap();
        let addr = server.local_addr().unwrap();
        thread::spawn(move || server.listen());
        addr
    }

    fn raw_transport(addr: SocketAddr) -> Transport<TcpStream> {
        Transport::new(TcpStream::connect(addr).unwrap())
    }

    #[test]
    fn binds_an_ephemeral_port_eagerly() {
        let server = Server::bind("127.0.0.1:0", MemoryStore::new()).unwrap();
        assert_ne!(server.local_addr().unwrap().port(), 0);
    }

    #[test]
    fn disconnect_is_acknowledged_then_the_stream_closes() {
        let addr = spawn_server();
        let mut transport = raw_transport(addr);

        transport.send(RequestTag::Disconnect).unwrap();
        transport.flush().unwrap();
        assert_eq!(transport.receive::<Outcome>().unwrap(), Outcome::Success);

        // The handler returned; the next read finds the stream closed.
        assert!(transport.receive::<Outcome>().is_err());
    }

    #[test]
    fn malformed_tag_tears_down_the_connection() {
        let addr = spawn_server();
        let mut transport = raw_transport(addr);

        transport.send(9999_u32).unwrap();
        transport.flush().unwrap();

        assert!(transport.receive::<Outcome>().is_err());
    }

    #[test]
    fn bracket_is_released_when_the_peer_vanishes() {
        let addr = spawn_server();

        let mut first = raw_transport(addr);
        first.send(RequestTag::Begin).unwrap();
        first.flush().unwrap();
        assert_eq!(first.receive::<Outcome>().unwrap(), Outcome::Success);
        drop(first);

        // The release happens when the handler notices the dead stream.
        let mut second = raw_transport(addr);
        let mut acquired = false;
        for _ in 0..100 {
            second.send(RequestTag::Begin).unwrap();
            second.flush().unwrap();
            match second.receive::<Outcome>().unwrap() {
                Outcome::Success => {
                    acquired = true;
                    break;
                }
                Outcome::Failure => {
                    let _: DatabaseError = second.receive().unwrap();
                    thread::sleep(Duration::from_millis(10));
                }
            }
        }
        assert!(acquired, "bracket was never released");
    }
}
