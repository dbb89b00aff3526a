use std::io::{self, Read, Write};

use bincode::{
    Decode, Encode,
    config::{BigEndian, Configuration, Fixint},
    decode_from_std_read, encode_into_std_write,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to encode value: {0}")]
    Serialize(#[from] bincode::error::EncodeError),
    #[error("failed to decode value: {0}")]
    Deserialize(#[from] bincode::error::DecodeError),
    #[error("transport IO error: {0}")]
    Io(#[from] io::Error),
}

/// Typed value codec over a bidirectional byte stream.
///
/// Values travel one at a time with no outer framing: each value is
/// self-delimiting under the fixed-int big-endian bincode configuration, and
/// both peers must agree on the sequence of types, value by value. A decode
/// against the wrong type is a protocol breach and surfaces as an error here,
/// never as a default value.
pub struct Transport<T: Read + Write> {
    stream: T,
    config: Configuration<BigEndian, Fixint>,
}

impl<T: Read + Write> Transport<T> {
    pub fn new(stream: T) -> Self {
        let config = bincode::config::standard()
            .with_big_endian()
            .with_fixed_int_encoding();
        Self { stream, config }
    }

    pub fn send<V: Encode>(&mut self, value: V) -> Result<(), TransportError> {
        encode_into_std_write(value, &mut self.stream, self.config)?;
        Ok(())
    }

    /// Blocks until one full value of type `V` has been read.
    pub fn receive<V: Decode<()>>(&mut self) -> Result<V, TransportError> {
        let value = decode_from_std_read(&mut self.stream, self.config)?;
        Ok(value)
    }

    pub fn flush(&mut self) -> Result<(), TransportError> {
        self.stream.flush()?;
        Ok(())
    }

    pub fn get_ref(&self) -> &T {
        &self.stream
    }
}
