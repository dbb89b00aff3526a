use bincode::{Decode, Encode};

/// Protocol revision. Bumped whenever the tag set below or any operation's
/// argument/result shape changes; both peers must be built from the same
/// revision of this module.
pub const PROTOCOL_VERSION: u16 = 1;

/// Operation identifier sent first in every request.
///
/// This enum is the single source of truth for the tag set: the client proxy
/// writes it, the server dispatcher matches on it, and nothing else maps
/// operations to wire values. The encoded form is the variant index, so the
/// order here is append-only: new tags go at the end, existing tags are
/// never reordered or removed within a protocol version.
///
/// A tag is followed on the wire by that operation's arguments, one encoded
/// value each, in the order fixed by the [`Client`](super::Client) method and
/// the [`Store`](crate::store::Store) trait. There is no argument count or
/// per-value type marker; the tag alone determines how many values follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
pub enum RequestTag {
    Begin,
    End,
    SearchAreasByName,
    SearchAreasByCountry,
    SearchAreasByCoords,
    SearchCentersByName,
    GetArea,
    GetMonitoredAreas,
    GetCenter,
    GetCenters,
    GetCenterByAddress,
    GetLatestCenter,
    GetAssociatedCenters,
    GetOperator,
    GetOperatorBySsid,
    GetOperatorByEmail,
    GetParameters,
    GetParametersAverage,
    GetCategories,
    GetLatestCategory,
    AddArea,
    AddCenter,
    AddOperator,
    AddParameter,
    EditOperator,
    IncludeAreaToCenter,
    Monitors,
    Employs,
    ValidateCredentials,
    Ping,
    Disconnect,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(tag: RequestTag) -> Vec<u8> {
        let config = bincode::config::standard()
            .with_big_endian()
            .with_fixed_int_encoding();
        bincode::encode_to_vec(tag, config).unwrap()
    }

    // The wire value of a tag is its variant index. These pins catch an
    // accidental reorder, which would silently desynchronize the two peers.
    #[test]
    fn tag_wire_values_are_stable() {
        assert_eq!(encode(RequestTag::Begin), [0, 0, 0, 0]);
        assert_eq!(encode(RequestTag::End), [0, 0, 0, 1]);
        assert_eq!(encode(RequestTag::GetArea), [0, 0, 0, 6]);
        assert_eq!(encode(RequestTag::ValidateCredentials), [0, 0, 0, 28]);
        assert_eq!(encode(RequestTag::Ping), [0, 0, 0, 29]);
        assert_eq!(encode(RequestTag::Disconnect), [0, 0, 0, 30]);
    }

    #[test]
    fn tag_round_trip() {
        let config = bincode::config::standard()
            .with_big_endian()
            .with_fixed_int_encoding();

        let bytes = bincode::encode_to_vec(RequestTag::Monitors, config).unwrap();
        let (tag, read): (RequestTag, usize) =
            bincode::decode_from_slice(&bytes, config).unwrap();

        assert_eq!(tag, RequestTag::Monitors);
        assert_eq!(read, bytes.len());
    }
}
