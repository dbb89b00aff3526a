//! An in-memory [`Store`].
//!
//! Everything lives in ordered maps so collection results come out in a
//! stable order without extra bookkeeping. There is no persistence; the
//! transaction bracket is validated for pairing but carries no rollback.

use std::collections::{BTreeMap, BTreeSet};

use crate::domain::{Area, Category, Center, Operator, Parameter};
use crate::protocol::DatabaseError;

use super::Store;

#[derive(Debug, Default)]
pub struct MemoryStore {
    areas: BTreeMap<i32, Area>,
    centers: BTreeMap<String, Center>,
    operators: BTreeMap<String, Operator>,
    categories: Vec<Category>,
    recordings: Vec<Parameter>,
    // center id -> geoname ids under that center's watch
    monitored: BTreeMap<String, BTreeSet<i32>>,
    in_transaction: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-filled with a handful of northern-Italian areas, three
    /// monitoring centers, their operators and a season of recordings.
    pub fn with_sample_data() -> Self {
        let mut store = Self::new();

        for area in [
            sample_area(3164699, "Varese", "IT", "Italy", 45.8206, 8.8251),
            sample_area(3172391, "Novarese", "IT", "Italy", 45.4469, 8.6211),
            sample_area(3175432, "Isola Dovarese", "IT", "Italy", 45.1686, 10.3121),
            sample_area(3178229, "Como", "IT", "Italy", 45.8103, 9.0852),
            sample_area(3173435, "Milano", "IT", "Italy", 45.4643, 9.1895),
            sample_area(2657896, "Zurich", "CH", "Switzerland", 47.3667, 8.5500),
        ] {
            store.areas.insert(area.geoname_id, area);
        }

        for center in [
            sample_center("Centro di Varese", "Via Ravasi", 2, 21100, 3164699, "Varese"),
            sample_center(
                "Centro di Milano",
                "Via Festa del Perdono",
                7,
                20122,
                3173435,
                "Milano",
            ),
            sample_center(
                "Centro Lago di Como",
                "Via Cernobbio",
                11,
                22100,
                3178229,
                "Como",
            ),
        ] {
            store.centers.insert(center.center_id.clone(), center);
        }

        store.monitored.insert(
            "Centro di Varese".into(),
            BTreeSet::from([3164699, 3172391]),
        );
        store.monitored.insert(
            "Centro di Milano".into(),
            BTreeSet::from([3173435, 3175432]),
        );
        store
            .monitored
            .insert("Centro Lago di Como".into(), BTreeSet::from([3178229]));

        for operator in [
            sample_operator(
                "mrossi",
                "RSSMRA80A01L682X",
                "Mario",
                "Rossi",
                "mario.rossi@centrovarese.it",
                "tramonto",
                Some("Centro di Varese"),
            ),
            sample_operator(
                "lbianchi",
                "BNCLCU85T41F205Z",
                "Lucia",
                "Bianchi",
                "lucia.bianchi@centromilano.it",
                "altostrato",
                Some("Centro di Milano"),
            ),
            sample_operator(
                "gverdi",
                "VRDGPP90E15L682K",
                "Giuseppe",
                "Verdi",
                "giuseppe.verdi@example.org",
                "brezza",
                None,
            ),
        ] {
            store.operators.insert(operator.user_id.clone(), operator);
        }

        for (name, explanation) in [
            ("temperature", "Surface air temperature"),
            ("humidity", "Relative humidity of the air"),
            ("pressure", "Atmospheric pressure at sea level"),
            ("wind", "Average wind speed"),
            ("precipitation", "Rain and snow accumulation"),
            ("glacier-altitude", "Altitude of the glacier front"),
            ("glacier-mass", "Estimated mass balance of the glacier"),
        ] {
            store.categories.push(Category {
                name: name.to_string(),
                explanation: explanation.to_string(),
            });
        }

        for (geoname_id, center_id, category, timestamp, score, notes) in [
            (
                3164699,
                "Centro di Varese",
                "temperature",
                1_700_000_000,
                3,
                "seasonal average",
            ),
            (3164699, "Centro di Varese", "temperature", 1_702_592_000, 4, ""),
            (
                3164699,
                "Centro di Varese",
                "temperature",
                1_705_184_000,
                5,
                "warm spell",
            ),
            (3164699, "Centro di Varese", "humidity", 1_707_776_000, 2, ""),
            (
                3175432,
                "Centro di Milano",
                "precipitation",
                1_706_000_000,
                4,
                "po valley fog",
            ),
            (3173435, "Centro di Milano", "temperature", 1_704_000_000, 3, ""),
            (3178229, "Centro Lago di Como", "pressure", 1_703_000_000, 5, ""),
        ] {
            store.recordings.push(Parameter {
                geoname_id,
                center_id: center_id.to_string(),
                category: category.to_string(),
                timestamp,
                score,
                notes: notes.to_string(),
            });
        }

        store
    }

    fn area_ref(&self, geoname_id: i32) -> Result<&Area, DatabaseError> {
        self.areas
            .get(&geoname_id)
            .ok_or_else(|| DatabaseError::not_found(format!("no area {geoname_id}")))
    }

    fn center_ref(&self, center_id: &str) -> Result<&Center, DatabaseError> {
        self.centers
            .get(center_id)
            .ok_or_else(|| DatabaseError::not_found(format!("no center {center_id}")))
    }

    fn recordings_for(&self, geoname_id: i32, center_id: &str, category: &str) -> Vec<&Parameter> {
        self.recordings
            .iter()
            .filter(|p| {
                p.geoname_id == geoname_id && p.center_id == center_id && p.category == category
            })
            .collect()
    }
}

impl Store for MemoryStore {
    fn begin(&mut self) -> Result<(), DatabaseError> {
        if self.in_transaction {
            return Err(DatabaseError::transaction("transaction already in progress"));
        }
        self.in_transaction = true;
        Ok(())
    }

    fn end(&mut self) -> Result<(), DatabaseError> {
        if !self.in_transaction {
            return Err(DatabaseError::transaction("no transaction in progress"));
        }
        self.in_transaction = false;
        Ok(())
    }

    fn search_areas_by_name(&mut self, name: &str) -> Result<Vec<Area>, DatabaseError> {
        let needle = name.to_lowercase();
        let mut found: Vec<Area> = self
            .areas
            .values()
            .filter(|a| a.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(found)
    }

    fn search_areas_by_country(&mut self, country: &str) -> Result<Vec<Area>, DatabaseError> {
        let needle = country.to_lowercase();
        let mut found: Vec<Area> = self
            .areas
            .values()
            .filter(|a| a.country_name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(found)
    }

    fn search_areas_by_coords(
        &mut self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Vec<Area>, DatabaseError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(DatabaseError::invalid(format!(
                "latitude {latitude} out of range"
            )));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(DatabaseError::invalid(format!(
                "longitude {longitude} out of range"
            )));
        }

        let mut found: Vec<Area> = self
            .areas
            .values()
            .filter(|a| {
                (a.latitude - latitude).abs() <= 0.5 && (a.longitude - longitude).abs() <= 0.5
            })
            .cloned()
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(found)
    }

    fn search_centers_by_name(&mut self, name: &str) -> Result<Vec<Center>, DatabaseError> {
        let needle = name.to_lowercase();
        // Map iteration is already ordered by center id.
        Ok(self
            .centers
            .values()
            .filter(|c| c.center_id.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    fn area(&mut self, geoname_id: i32) -> Result<Area, DatabaseError> {
        self.area_ref(geoname_id).cloned()
    }

    fn monitored_areas(&mut self, center_id: &str) -> Result<Vec<Area>, DatabaseError> {
        self.center_ref(center_id)?;
        let mut areas: Vec<Area> = self
            .monitored
            .get(center_id)
            .into_iter()
            .flatten()
            .filter_map(|id| self.areas.get(id))
            .cloned()
            .collect();
        areas.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(areas)
    }

    fn center(&mut self, center_id: &str) -> Result<Center, DatabaseError> {
        self.center_ref(center_id).cloned()
    }

    fn centers(&mut self) -> Result<Vec<Center>, DatabaseError> {
        Ok(self.centers.values().cloned().collect())
    }

    fn center_by_address(
        &mut self,
        city: i32,
        street: &str,
        house_number: i32,
    ) -> Result<Center, DatabaseError> {
        self.centers
            .values()
            .find(|c| c.city == city && c.street == street && c.house_number == house_number)
            .cloned()
            .ok_or_else(|| {
                DatabaseError::not_found(format!("no center at {street} {house_number}"))
            })
    }

    fn latest_center(&mut self, geoname_id: i32) -> Result<Center, DatabaseError> {
        let latest = self
            .recordings
            .iter()
            .filter(|p| p.geoname_id == geoname_id)
            .max_by_key(|p| p.timestamp)
            .ok_or_else(|| {
                DatabaseError::not_found(format!("no recordings for area {geoname_id}"))
            })?;
        self.center_ref(&latest.center_id).cloned()
    }

    fn associated_centers(&mut self, geoname_id: i32) -> Result<Vec<Center>, DatabaseError> {
        self.area_ref(geoname_id)?;
        Ok(self
            .monitored
            .iter()
            .filter(|(_, areas)| areas.contains(&geoname_id))
            .filter_map(|(id, _)| self.centers.get(id))
            .cloned()
            .collect())
    }

    fn operator(&mut self, user_id: &str) -> Result<Operator, DatabaseError> {
        self.operators
            .get(user_id)
            .cloned()
            .ok_or_else(|| DatabaseError::not_found(format!("no operator {user_id}")))
    }

    fn operator_by_ssid(&mut self, ssid: &str) -> Result<Operator, DatabaseError> {
        self.operators
            .values()
            .find(|o| o.ssid == ssid)
            .cloned()
            .ok_or_else(|| DatabaseError::not_found(format!("no operator with ssid {ssid}")))
    }

    fn operator_by_email(&mut self, email: &str) -> Result<Operator, DatabaseError> {
        self.operators
            .values()
            .find(|o| o.email == email)
            .cloned()
            .ok_or_else(|| DatabaseError::not_found(format!("no operator with email {email}")))
    }

    fn parameters(
        &mut self,
        geoname_id: i32,
        center_id: &str,
        category: &str,
    ) -> Result<Vec<Parameter>, DatabaseError> {
        let mut found: Vec<Parameter> = self
            .recordings_for(geoname_id, center_id, category)
            .into_iter()
            .cloned()
            .collect();
        found.sort_by_key(|p| p.timestamp);
        Ok(found)
    }

    fn parameters_average(
        &mut self,
        geoname_id: i32,
        center_id: &str,
        category: &str,
    ) -> Result<f64, DatabaseError> {
        let found = self.recordings_for(geoname_id, center_id, category);
        if found.is_empty() {
            return Err(DatabaseError::not_found(format!(
                "no {category} recordings for area {geoname_id} at {center_id}"
            )));
        }

        let total: f64 = found.iter().map(|p| f64::from(p.score)).sum();
        Ok(total / found.len() as f64)
    }

    fn categories(&mut self) -> Result<Vec<Category>, DatabaseError> {
        Ok(self.categories.clone())
    }

    fn latest_category(
        &mut self,
        geoname_id: i32,
        center_id: &str,
    ) -> Result<Category, DatabaseError> {
        let latest = self
            .recordings
            .iter()
            .filter(|p| p.geoname_id == geoname_id && p.center_id == center_id)
            .max_by_key(|p| p.timestamp)
            .ok_or_else(|| {
                DatabaseError::not_found(format!(
                    "no recordings for area {geoname_id} at {center_id}"
                ))
            })?;
        self.categories
            .iter()
            .find(|c| c.name == latest.category)
            .cloned()
            .ok_or_else(|| DatabaseError::not_found(format!("no category {}", latest.category)))
    }

    fn add_area(&mut self, area: Area) -> Result<(), DatabaseError> {
        if self.areas.contains_key(&area.geoname_id) {
            return Err(DatabaseError::duplicate(format!(
                "area {} already exists",
                area.geoname_id
            )));
        }
        self.areas.insert(area.geoname_id, area);
        Ok(())
    }

    fn add_center(&mut self, center: Center) -> Result<(), DatabaseError> {
        if self.centers.contains_key(&center.center_id) {
            return Err(DatabaseError::duplicate(format!(
                "center {} already exists",
                center.center_id
            )));
        }
        self.centers.insert(center.center_id.clone(), center);
        Ok(())
    }

    fn add_operator(&mut self, operator: Operator) -> Result<(), DatabaseError> {
        if self.operators.contains_key(&operator.user_id) {
            return Err(DatabaseError::duplicate(format!(
                "operator {} already exists",
                operator.user_id
            )));
        }
        if let Some(center_id) = &operator.center_id {
            self.center_ref(center_id)?;
        }
        self.operators.insert(operator.user_id.clone(), operator);
        Ok(())
    }

    fn add_parameter(&mut self, parameter: Parameter) -> Result<(), DatabaseError> {
        if !(1..=5).contains(&parameter.score) {
            return Err(DatabaseError::invalid(format!(
                "score {} out of range",
                parameter.score
            )));
        }
        self.area_ref(parameter.geoname_id)?;
        self.center_ref(&parameter.center_id)?;
        if !self.categories.iter().any(|c| c.name == parameter.category) {
            return Err(DatabaseError::not_found(format!(
                "no category {}",
                parameter.category
            )));
        }
        self.recordings.push(parameter);
        Ok(())
    }

    fn edit_operator(&mut self, user_id: &str, operator: Operator) -> Result<(), DatabaseError> {
        if !self.operators.contains_key(user_id) {
            return Err(DatabaseError::not_found(format!("no operator {user_id}")));
        }
        if operator.user_id != user_id && self.operators.contains_key(&operator.user_id) {
            return Err(DatabaseError::duplicate(format!(
                "operator {} already exists",
                operator.user_id
            )));
        }
        if let Some(center_id) = &operator.center_id {
            self.center_ref(center_id)?;
        }
        self.operators.remove(user_id);
        self.operators.insert(operator.user_id.clone(), operator);
        Ok(())
    }

    fn include_area_to_center(
        &mut self,
        geoname_id: i32,
        center_id: &str,
    ) -> Result<(), DatabaseError> {
        self.area_ref(geoname_id)?;
        self.center_ref(center_id)?;
        let watched = self.monitored.entry(center_id.to_string()).or_default();
        if !watched.insert(geoname_id) {
            return Err(DatabaseError::duplicate(format!(
                "center {center_id} already monitors area {geoname_id}"
            )));
        }
        Ok(())
    }

    fn monitors(&mut self, center_id: &str, geoname_id: i32) -> Result<bool, DatabaseError> {
        Ok(self
            .monitored
            .get(center_id)
            .is_some_and(|areas| areas.contains(&geoname_id)))
    }

    fn employs(&mut self, center_id: &str, user_id: &str) -> Result<bool, DatabaseError> {
        Ok(self
            .operators
            .get(user_id)
            .is_some_and(|o| o.center_id.as_deref() == Some(center_id)))
    }

    fn validate_credentials(
        &mut self,
        user_id: &str,
        password: &str,
    ) -> Result<Operator, DatabaseError> {
        // Same failure for a bad id and a bad password.
        self.operators
            .get(user_id)
            .filter(|o| o.password == password)
            .cloned()
            .ok_or_else(|| DatabaseError::not_found("invalid credentials"))
    }
}

fn sample_area(
    geoname_id: i32,
    name: &str,
    country_code: &str,
    country_name: &str,
    latitude: f64,
    longitude: f64,
) -> Area {
    Area {
        geoname_id,
        name: name.to_string(),
        country_code: country_code.to_string(),
        country_name: country_name.to_string(),
        latitude,
        longitude,
    }
}

fn sample_center(
    center_id: &str,
    street: &str,
    house_number: i32,
    postal_code: i32,
    city: i32,
    district: &str,
) -> Center {
    Center {
        center_id: center_id.to_string(),
        street: street.to_string(),
        house_number,
        postal_code,
        city,
        district: district.to_string(),
    }
}

fn sample_operator(
    user_id: &str,
    ssid: &str,
    name: &str,
    surname: &str,
    email: &str,
    password: &str,
    center_id: Option<&str>,
) -> Operator {
    Operator {
        user_id: user_id.to_string(),
        ssid: ssid.to_string(),
        name: name.to_string(),
        surname: surname.to_string(),
        email: email.to_string(),
        password: password.to_string(),
        center_id: center_id.map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::DatabaseErrorKind;

    fn names(areas: &[Area]) -> Vec<&str> {
        areas.iter().map(|a| a.name.as_str()).collect()
    }

    #[test]
    fn name_search_is_case_insensitive_and_alphabetical() {
        let mut store = MemoryStore::with_sample_data();
        let found = store.search_areas_by_name("VAR").unwrap();
        assert_eq!(names(&found), ["Isola Dovarese", "Novarese", "Varese"]);
    }

    #[test]
    fn country_search_matches_substrings() {
        let mut store = MemoryStore::with_sample_data();
        let found = store.search_areas_by_country("ital").unwrap();
        assert_eq!(
            names(&found),
            ["Como", "Isola Dovarese", "Milano", "Novarese", "Varese"]
        );

        let found = store.search_areas_by_country("switz").unwrap();
        assert_eq!(names(&found), ["Zurich"]);
    }

    #[test]
    fn coords_search_uses_a_half_degree_box() {
        let mut store = MemoryStore::with_sample_data();

        let found = store.search_areas_by_coords(45.2, 10.4).unwrap();
        assert_eq!(names(&found), ["Isola Dovarese"]);

        let found = store.search_areas_by_coords(47.0, 7.5).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn coords_search_rejects_out_of_range_input() {
        let mut store = MemoryStore::with_sample_data();

        let err = store.search_areas_by_coords(91.0, 0.0).unwrap_err();
        assert_eq!(err.kind, DatabaseErrorKind::Invalid);

        let err = store.search_areas_by_coords(0.0, -181.0).unwrap_err();
        assert_eq!(err.kind, DatabaseErrorKind::Invalid);
    }

    #[test]
    fn center_search_matches_ids() {
        let mut store = MemoryStore::with_sample_data();
        let found = store.search_centers_by_name("var").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].center_id, "Centro di Varese");
    }

    #[test]
    fn missing_lookups_are_not_found() {
        let mut store = MemoryStore::with_sample_data();

        assert_eq!(
            store.area(1).unwrap_err().kind,
            DatabaseErrorKind::NotFound
        );
        assert_eq!(
            store.center("nowhere").unwrap_err().kind,
            DatabaseErrorKind::NotFound
        );
        assert_eq!(
            store.operator("nobody").unwrap_err().kind,
            DatabaseErrorKind::NotFound
        );
        assert_eq!(
            store.monitored_areas("nowhere").unwrap_err().kind,
            DatabaseErrorKind::NotFound
        );
    }

    #[test]
    fn address_lookup_matches_all_three_parts() {
        let mut store = MemoryStore::with_sample_data();

        let found = store.center_by_address(3164699, "Via Ravasi", 2).unwrap();
        assert_eq!(found.center_id, "Centro di Varese");

        assert!(store.center_by_address(3164699, "Via Ravasi", 3).is_err());
    }

    #[test]
    fn latest_center_and_category_follow_newest_recording() {
        let mut store = MemoryStore::with_sample_data();

        let center = store.latest_center(3164699).unwrap();
        assert_eq!(center.center_id, "Centro di Varese");

        let center = store.latest_center(3175432).unwrap();
        assert_eq!(center.center_id, "Centro di Milano");

        let category = store.latest_category(3164699, "Centro di Varese").unwrap();
        assert_eq!(category.name, "humidity");

        // Zurich has no recordings.
        assert_eq!(
            store.latest_center(2657896).unwrap_err().kind,
            DatabaseErrorKind::NotFound
        );
    }

    #[test]
    fn parameters_come_back_oldest_first() {
        let mut store = MemoryStore::with_sample_data();
        let found = store
            .parameters(3164699, "Centro di Varese", "temperature")
            .unwrap();
        let timestamps: Vec<i64> = found.iter().map(|p| p.timestamp).collect();
        assert_eq!(timestamps, [1_700_000_000, 1_702_592_000, 1_705_184_000]);
    }

    #[test]
    fn average_is_the_mean_of_matching_scores() {
        let mut store = MemoryStore::with_sample_data();

        let avg = store
            .parameters_average(3164699, "Centro di Varese", "temperature")
            .unwrap();
        assert_eq!(avg, 4.0);

        assert_eq!(
            store
                .parameters_average(3164699, "Centro di Varese", "wind")
                .unwrap_err()
                .kind,
            DatabaseErrorKind::NotFound
        );
    }

    #[test]
    fn bracket_must_alternate() {
        let mut store = MemoryStore::new();

        store.begin().unwrap();
        assert_eq!(
            store.begin().unwrap_err().kind,
            DatabaseErrorKind::Transaction
        );
        store.end().unwrap();
        assert_eq!(
            store.end().unwrap_err().kind,
            DatabaseErrorKind::Transaction
        );
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let mut store = MemoryStore::with_sample_data();

        let varese = store.area(3164699).unwrap();
        assert_eq!(
            store.add_area(varese).unwrap_err().kind,
            DatabaseErrorKind::Duplicate
        );

        store.include_area_to_center(2657896, "Centro di Varese").unwrap();
        assert_eq!(
            store
                .include_area_to_center(2657896, "Centro di Varese")
                .unwrap_err()
                .kind,
            DatabaseErrorKind::Duplicate
        );
    }

    #[test]
    fn add_parameter_checks_references_and_score() {
        let mut store = MemoryStore::with_sample_data();

        let mut recording = Parameter {
            geoname_id: 3178229,
            center_id: "Centro Lago di Como".to_string(),
            category: "wind".to_string(),
            timestamp: 1_708_000_000,
            score: 4,
            notes: String::new(),
        };
        store.add_parameter(recording.clone()).unwrap();

        recording.score = 6;
        assert_eq!(
            store.add_parameter(recording.clone()).unwrap_err().kind,
            DatabaseErrorKind::Invalid
        );

        recording.score = 4;
        recording.center_id = "nowhere".to_string();
        assert_eq!(
            store.add_parameter(recording).unwrap_err().kind,
            DatabaseErrorKind::NotFound
        );
    }

    #[test]
    fn edit_operator_can_rename() {
        let mut store = MemoryStore::with_sample_data();

        let mut operator = store.operator("gverdi").unwrap();
        operator.user_id = "g.verdi".to_string();
        operator.email = "g.verdi@example.org".to_string();
        store.edit_operator("gverdi", operator).unwrap();

        assert!(store.operator("gverdi").is_err());
        let renamed = store.operator("g.verdi").unwrap();
        assert_eq!(renamed.email, "g.verdi@example.org");
    }

    #[test]
    fn edit_operator_rejects_taken_ids_and_missing_targets() {
        let mut store = MemoryStore::with_sample_data();

        let mut operator = store.operator("gverdi").unwrap();
        operator.user_id = "mrossi".to_string();
        assert_eq!(
            store.edit_operator("gverdi", operator).unwrap_err().kind,
            DatabaseErrorKind::Duplicate
        );

        let operator = store.operator("gverdi").unwrap();
        assert_eq!(
            store.edit_operator("nobody", operator).unwrap_err().kind,
            DatabaseErrorKind::NotFound
        );
    }

    #[test]
    fn relationship_checks_answer_false_for_unknown_pairs() {
        let mut store = MemoryStore::with_sample_data();

        assert!(store.monitors("Centro di Varese", 3164699).unwrap());
        assert!(!store.monitors("Centro di Varese", 3175432).unwrap());
        assert!(!store.monitors("nowhere", 3164699).unwrap());

        assert!(store.employs("Centro di Varese", "mrossi").unwrap());
        assert!(!store.employs("Centro di Milano", "mrossi").unwrap());
        assert!(!store.employs("Centro di Milano", "nobody").unwrap());
    }

    #[test]
    fn credentials_must_match_exactly() {
        let mut store = MemoryStore::with_sample_data();

        let operator = store.validate_credentials("mrossi", "tramonto").unwrap();
        assert_eq!(operator.email, "mario.rossi@centrovarese.it");

        assert_eq!(
            store
                .validate_credentials("mrossi", "alba")
                .unwrap_err()
                .kind,
            DatabaseErrorKind::NotFound
        );
        assert_eq!(
            store
                .validate_credentials("nobody", "tramonto")
                .unwrap_err()
                .kind,
            DatabaseErrorKind::NotFound
        );
    }

    #[test]
    fn associated_centers_lists_watchers_in_id_order() {
        let mut store = MemoryStore::with_sample_data();

        store.include_area_to_center(3164699, "Centro di Milano").unwrap();
        let centers = store.associated_centers(3164699).unwrap();
        let ids: Vec<&str> = centers.iter().map(|c| c.center_id.as_str()).collect();
        assert_eq!(ids, ["Centro di Milano", "Centro di Varese"]);
    }

    #[test]
    fn monitored_areas_are_alphabetical() {
        let mut store = MemoryStore::with_sample_data();
        let areas = store.monitored_areas("Centro di Milano").unwrap();
        assert_eq!(names(&areas), ["Isola Dovarese", "Milano"]);
    }

    #[test]
    fn add_operator_validates_center_reference() {
        let mut store = MemoryStore::with_sample_data();

        let mut operator = sample_operator(
            "fnero",
            "NREFNC92M30L682T",
            "Franca",
            "Nero",
            "franca.nero@example.org",
            "grandine",
            Some("nowhere"),
        );
        assert_eq!(
            store.add_operator(operator.clone()).unwrap_err().kind,
            DatabaseErrorKind::NotFound
        );

        operator.center_id = Some("Centro Lago di Como".to_string());
        store.add_operator(operator).unwrap();
        assert!(store.employs("Centro Lago di Como", "fnero").unwrap());
    }
}
