//! Backing stores for the dispatcher.
//!
//! [`Store`] is the contract the dispatcher programs against: one method per
//! remote operation, synchronous, with every failure expressed as a
//! [`DatabaseError`] so it can travel back to the client in a failure
//! envelope. A store never signals failure by tearing down the connection;
//! that distinction belongs to the transport layer.

pub mod memory;

pub use memory::MemoryStore;

use crate::domain::{Area, Category, Center, Operator, Parameter};
use crate::protocol::DatabaseError;

/// A climate-monitoring record store.
///
/// Collection results come back ordered: name searches alphabetically,
/// recordings oldest first. A lookup that names a missing entity fails with
/// the `NotFound` kind; key collisions on insert fail with `Duplicate`;
/// bracket misuse fails with `Transaction`.
pub trait Store: Send {
    /// Opens the transaction bracket. A second `begin` before `end` is
    /// rejected.
    fn begin(&mut self) -> Result<(), DatabaseError>;

    /// Closes the transaction bracket. An `end` without a matching `begin`
    /// is rejected.
    fn end(&mut self) -> Result<(), DatabaseError>;

    /// Areas whose name contains `name`, case-insensitively.
    fn search_areas_by_name(&mut self, name: &str) -> Result<Vec<Area>, DatabaseError>;

    /// Areas whose country name contains `country`, case-insensitively.
    fn search_areas_by_country(&mut self, country: &str) -> Result<Vec<Area>, DatabaseError>;

    /// Areas within about half a degree of the given point. Coordinates
    /// outside [-90, 90] x [-180, 180] are invalid.
    fn search_areas_by_coords(
        &mut self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Vec<Area>, DatabaseError>;

    /// Centers whose id contains `name`, case-insensitively.
    fn search_centers_by_name(&mut self, name: &str) -> Result<Vec<Center>, DatabaseError>;

    fn area(&mut self, geoname_id: i32) -> Result<Area, DatabaseError>;

    /// Areas monitored by the given center.
    fn monitored_areas(&mut self, center_id: &str) -> Result<Vec<Area>, DatabaseError>;

    fn center(&mut self, center_id: &str) -> Result<Center, DatabaseError>;

    fn centers(&mut self) -> Result<Vec<Center>, DatabaseError>;

    /// The center at the given address; `city` is the city's geoname id.
    fn center_by_address(
        &mut self,
        city: i32,
        street: &str,
        house_number: i32,
    ) -> Result<Center, DatabaseError>;

    /// The center that submitted the most recent recording for the area.
    fn latest_center(&mut self, geoname_id: i32) -> Result<Center, DatabaseError>;

    /// Centers that monitor the given area.
    fn associated_centers(&mut self, geoname_id: i32) -> Result<Vec<Center>, DatabaseError>;

    fn operator(&mut self, user_id: &str) -> Result<Operator, DatabaseError>;

    fn operator_by_ssid(&mut self, ssid: &str) -> Result<Operator, DatabaseError>;

    fn operator_by_email(&mut self, email: &str) -> Result<Operator, DatabaseError>;

    /// Recordings for the area/center/category triple, oldest first.
    fn parameters(
        &mut self,
        geoname_id: i32,
        center_id: &str,
        category: &str,
    ) -> Result<Vec<Parameter>, DatabaseError>;

    /// Mean score over the same triple; fails when there is nothing to
    /// average.
    fn parameters_average(
        &mut self,
        geoname_id: i32,
        center_id: &str,
        category: &str,
    ) -> Result<f64, DatabaseError>;

    fn categories(&mut self) -> Result<Vec<Category>, DatabaseError>;

    /// The category of the center's most recent recording for the area.
    fn latest_category(
        &mut self,
        geoname_id: i32,
        center_id: &str,
    ) -> Result<Category, DatabaseError>;

    fn add_area(&mut self, area: Area) -> Result<(), DatabaseError>;

    fn add_center(&mut self, center: Center) -> Result<(), DatabaseError>;

    fn add_operator(&mut self, operator: Operator) -> Result<(), DatabaseError>;

    fn add_parameter(&mut self, parameter: Parameter) -> Result<(), DatabaseError>;

    /// Replaces the operator stored under `user_id` with `operator`, which
    /// may carry a new user id.
    fn edit_operator(&mut self, user_id: &str, operator: Operator) -> Result<(), DatabaseError>;

    /// Puts an existing area under a center's watch.
    fn include_area_to_center(
        &mut self,
        geoname_id: i32,
        center_id: &str,
    ) -> Result<(), DatabaseError>;

    /// Whether the center monitors the area. Unknown ids are simply `false`.
    fn monitors(&mut self, center_id: &str, geoname_id: i32) -> Result<bool, DatabaseError>;

    /// Whether the center employs the operator. Unknown ids are simply
    /// `false`.
    fn employs(&mut self, center_id: &str, user_id: &str) -> Result<bool, DatabaseError>;

    /// The operator matching the credential pair; a miss of either half is
    /// `NotFound`.
    fn validate_credentials(
        &mut self,
        user_id: &str,
        password: &str,
    ) -> Result<Operator, DatabaseError>;
}
