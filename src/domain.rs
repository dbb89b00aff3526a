//! Climate monitoring records.
//!
//! Plain data holders for the five record kinds the remote store manages:
//! geographical [`Area`]s, monitoring [`Center`]s, [`Operator`]s employed by
//! centers, recorded climate [`Parameter`]s, and the [`Category`] catalogue a
//! parameter is recorded under.
//!
//! Every record derives the bincode traits so it can travel as an opaque
//! payload inside a call envelope. The protocol layer never inspects these
//! fields; query semantics live behind the [`Store`](crate::store::Store)
//! trait on the server side.
use std::fmt;

use bincode::{Decode, Encode};

/// A geographical area that can be monitored, identified by its geoname id.
#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct Area {
    pub geoname_id: i32,
    pub name: String,
    /// Two-letter country code, e.g. "IT".
    pub country_code: String,
    pub country_name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// A monitoring center and its street address.
#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct Center {
    pub center_id: String,
    pub street: String,
    pub house_number: i32,
    pub postal_code: i32,
    /// Geoname id of the city the center is located in.
    pub city: i32,
    pub district: String,
}

/// An operator account. `center_id` is the employing center, if any.
#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct Operator {
    pub user_id: String,
    pub ssid: String,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub password: String,
    pub center_id: Option<String>,
}

/// One climate recording: a center scored a category for an area at a point
/// in time. Scores range 1..=5; `timestamp` is Unix seconds.
#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct Parameter {
    pub geoname_id: i32,
    pub center_id: String,
    pub category: String,
    pub timestamp: i64,
    pub score: i32,
    pub notes: String,
}

/// A recordable category and its explanation.
#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct Category {
    pub name: String,
    pub explanation: String,
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {} ({:.4}, {:.4}) #{}",
            self.name, self.country_name, self.latitude, self.longitude, self.geoname_id
        )
    }
}

impl fmt::Display for Center {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} {}, {} {}",
            self.center_id, self.street, self.house_number, self.postal_code, self.district
        )
    }
}

impl fmt::Display for Operator {
    // Never prints the password.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} <{}> ({})",
            self.name, self.surname, self.email, self.user_id
        )
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} = {} for area #{} by {} at {}",
            self.category, self.score, self.geoname_id, self.center_id, self.timestamp
        )
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.explanation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn area_display() {
        let area = Area {
            geoname_id: 3164699,
            name: "Varese".into(),
            country_code: "IT".into(),
            country_name: "Italy".into(),
            latitude: 45.8206,
            longitude: 8.8251,
        };

        assert_eq!(area.to_string(), "Varese, Italy (45.8206, 8.8251) #3164699");
    }

    #[test]
    fn operator_display_hides_password() {
        let operator = Operator {
            user_id: "mrossi".into(),
            ssid: "RSSMRA80A01L682K".into(),
            name: "Mario".into(),
            surname: "Rossi".into(),
            email: "mario.rossi@example.com".into(),
            password: "hunter2".into(),
            center_id: Some("alpine-watch".into()),
        };

        assert!(!operator.to_string().contains("hunter2"));
    }
}
