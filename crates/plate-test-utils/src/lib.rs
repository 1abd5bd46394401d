//! Testing utilities for Climate Plate workspace
//!
//! Shared fakes, fixtures, and assertions.

#![allow(missing_docs)]

use async_trait::async_trait;
use parking_lot::Mutex;
use plate_client::{ImpactService, PlateApp, Registration};
use plate_core::{
    Catalog, HealthStatus, ImpactSummary, IngredientImpact, PayloadItem, PlateConfig, PlateItem,
    RemoteIngredient, RemotePlate, SelectionStore, ServiceError, SessionStarted, Stage,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Call observed by [`FakeImpactService`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    StartSession,
    AddToPlate { session_id: String, item: PayloadItem },
    RemoveFromPlate { session_id: String, remote_id: u32 },
    FetchPlate { session_id: String },
    FetchSummary { session_id: String },
    ListIngredients,
    Health,
}

impl Call {
    /// Stage this call belongs to
    #[must_use]
    pub fn stage(&self) -> Stage {
        match self {
            Self::StartSession => Stage::StartSession,
            Self::AddToPlate { .. } => Stage::AddIngredient,
            Self::RemoveFromPlate { .. } => Stage::RemoveIngredient,
            Self::FetchPlate { .. } => Stage::FetchPlate,
            Self::FetchSummary { .. } => Stage::FetchSummary,
            Self::ListIngredients => Stage::ListIngredients,
            Self::Health => Stage::Health,
        }
    }
}

/// Per-kg factors for the service-side catalog fixture
#[derive(Debug, Clone, Copy)]
struct Factors {
    name: &'static str,
    category: &'static str,
    co2: f64,
    land: f64,
    water: f64,
    portion: u32,
}

const FIXTURE_CATALOG: &[(u32, Factors)] = &[
    (1, Factors { name: "Wheat & Rye (Bread)", category: "plant", co2: 1.4, land: 3.85, water: 648.5, portion: 100 }),
    (2, Factors { name: "Barley (Beer)", category: "drink", co2: 1.2, land: 1.1, water: 17.1, portion: 250 }),
    (3, Factors { name: "Rice", category: "plant", co2: 4.0, land: 2.8, water: 2248.4, portion: 100 }),
    (4, Factors { name: "Potatoes", category: "plant", co2: 0.3, land: 0.88, water: 59.1, portion: 100 }),
    (5, Factors { name: "Peas", category: "plant", co2: 0.8, land: 7.46, water: 396.6, portion: 100 }),
    (6, Factors { name: "Bananas", category: "fruit", co2: 0.8, land: 1.93, water: 114.5, portion: 100 }),
    (7, Factors { name: "Apples", category: "fruit", co2: 0.3, land: 0.63, water: 179.9, portion: 100 }),
    (8, Factors { name: "Wine", category: "drink", co2: 1.4, land: 1.78, water: 78.9, portion: 250 }),
    (9, Factors { name: "Coffee", category: "drink", co2: 16.5, land: 21.62, water: 22.3, portion: 250 }),
    (10, Factors { name: "Beef (beef herd)", category: "meat", co2: 59.6, land: 326.21, water: 1451.2, portion: 150 }),
    (11, Factors { name: "Lamb & Mutton", category: "meat", co2: 24.5, land: 369.81, water: 1803.1, portion: 150 }),
    (12, Factors { name: "Pig Meat", category: "meat", co2: 7.2, land: 17.36, water: 1795.8, portion: 150 }),
    (13, Factors { name: "Poultry Meat", category: "meat", co2: 6.1, land: 12.22, water: 370.0, portion: 150 }),
    (14, Factors { name: "Cheese", category: "plant", co2: 21.2, land: 87.79, water: 5605.2, portion: 100 }),
    (15, Factors { name: "Eggs", category: "plant", co2: 4.5, land: 5.7, water: 577.7, portion: 100 }),
    (16, Factors { name: "Fish (farmed)", category: "meat", co2: 13.6, land: 8.41, water: 3691.3, portion: 150 }),
];

fn factors(remote_id: u32) -> Option<&'static Factors> {
    FIXTURE_CATALOG
        .iter()
        .find(|(id, _)| *id == remote_id)
        .map(|(_, f)| f)
}

fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}

/// Lower impact scores higher: 60% CO2, 30% water, 10% land against rough caps
#[must_use]
pub fn impact_score(total_co2: f64, total_water: f64, total_land: f64) -> f64 {
    let co2 = (total_co2 / 20.0).min(1.0);
    let water = (total_water / 10_000.0).min(1.0);
    let land = (total_land / 50.0).min(1.0);
    let combined = 0.6 * co2 + 0.3 * water + 0.1 * land;
    round_to((10.0 - combined * 9.0).clamp(1.0, 10.0), 1)
}

#[derive(Debug, Default)]
struct FakeState {
    calls: Vec<Call>,
    plates: HashMap<String, Vec<PlateItem>>,
    next_session: u64,
}

/// In-memory impact service that records every call
///
/// Behaves like the real service: sessions are independent plates, adding an
/// ingredient twice replaces its quantity, unknown ingredient ids are refused
/// with HTTP 400 and summaries are computed from a fixture catalog.
#[derive(Debug, Default)]
pub struct FakeImpactService {
    state: Mutex<FakeState>,
    failures: HashMap<Stage, ServiceError>,
    rejected: HashMap<u32, u16>,
    transport_failures: HashSet<u32>,
}

impl FakeImpactService {
    /// Create fake with no injected failures
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every call of `stage` with HTTP `status`
    #[must_use]
    pub fn with_status_failure(mut self, stage: Stage, status: u16) -> Self {
        self.failures
            .insert(stage, ServiceError::Status { stage, status });
        self
    }

    /// Fail every call of `stage` as if the connection dropped
    #[must_use]
    pub fn with_transport_failure(mut self, stage: Stage) -> Self {
        self.failures.insert(
            stage,
            ServiceError::Transport {
                stage,
                message: "connection refused".to_string(),
            },
        );
        self
    }

    /// Answer `POST /plate/add` for `remote_id` with `status`
    #[must_use]
    pub fn rejecting(mut self, remote_id: u32, status: u16) -> Self {
        self.rejected.insert(remote_id, status);
        self
    }

    /// Drop the connection on `POST /plate/add` for `remote_id`
    #[must_use]
    pub fn dropping(mut self, remote_id: u32) -> Self {
        self.transport_failures.insert(remote_id);
        self
    }

    /// Every call seen so far, in arrival order
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    /// Stages of every call seen so far
    #[must_use]
    pub fn stages(&self) -> Vec<Stage> {
        self.state.lock().calls.iter().map(Call::stage).collect()
    }

    /// Number of sessions started
    #[must_use]
    pub fn sessions_started(&self) -> u64 {
        self.state.lock().next_session
    }

    /// Current plate for `session_id`
    #[must_use]
    pub fn plate(&self, session_id: &str) -> Option<Vec<PlateItem>> {
        self.state.lock().plates.get(session_id).cloned()
    }

    fn record(&self, stage: Stage, call: Call) -> Result<(), ServiceError> {
        self.state.lock().calls.push(call);
        match self.failures.get(&stage) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn not_found(stage: Stage) -> ServiceError {
        ServiceError::Status { stage, status: 404 }
    }
}

#[async_trait]
impl ImpactService for FakeImpactService {
    async fn start_session(&self) -> Result<SessionStarted, ServiceError> {
        self.record(Stage::StartSession, Call::StartSession)?;

        let mut state = self.state.lock();
        state.next_session += 1;
        let session_id = format!("session-{}", state.next_session);
        state.plates.insert(session_id.clone(), Vec::new());
        Ok(SessionStarted { session_id })
    }

    async fn add_to_plate(
        &self,
        session_id: &str,
        item: PayloadItem,
    ) -> Result<Registration, ServiceError> {
        let call = Call::AddToPlate {
            session_id: session_id.to_string(),
            item,
        };
        if let Err(err) = self.record(Stage::AddIngredient, call) {
            return match err {
                ServiceError::Status { status, .. } => Ok(Registration::Rejected { status }),
                other => Err(other),
            };
        }
        if self.transport_failures.contains(&item.remote_id) {
            return Err(ServiceError::Transport {
                stage: Stage::AddIngredient,
                message: "connection reset by peer".to_string(),
            });
        }
        if let Some(&status) = self.rejected.get(&item.remote_id) {
            return Ok(Registration::Rejected { status });
        }
        if factors(item.remote_id).is_none() {
            return Ok(Registration::Rejected { status: 400 });
        }

        let mut state = self.state.lock();
        let plate = state.plates.entry(session_id.to_string()).or_default();
        match plate.iter_mut().find(|p| p.ingredient_id == item.remote_id) {
            Some(existing) => existing.quantity_g = item.grams,
            None => plate.push(PlateItem {
                ingredient_id: item.remote_id,
                quantity_g: item.grams,
            }),
        }
        Ok(Registration::Accepted)
    }

    async fn remove_from_plate(
        &self,
        session_id: &str,
        remote_id: u32,
    ) -> Result<RemotePlate, ServiceError> {
        let call = Call::RemoveFromPlate {
            session_id: session_id.to_string(),
            remote_id,
        };
        self.record(Stage::RemoveIngredient, call)?;

        let mut state = self.state.lock();
        let plate = state.plates.entry(session_id.to_string()).or_default();
        plate.retain(|p| p.ingredient_id != remote_id);
        Ok(RemotePlate {
            session_id: session_id.to_string(),
            items: plate.clone(),
        })
    }

    async fn fetch_plate(&self, session_id: &str) -> Result<RemotePlate, ServiceError> {
        let call = Call::FetchPlate {
            session_id: session_id.to_string(),
        };
        self.record(Stage::FetchPlate, call)?;

        let items = self
            .plate(session_id)
            .ok_or_else(|| Self::not_found(Stage::FetchPlate))?;
        Ok(RemotePlate {
            session_id: session_id.to_string(),
            items,
        })
    }

    async fn fetch_summary(&self, session_id: &str) -> Result<ImpactSummary, ServiceError> {
        let call = Call::FetchSummary {
            session_id: session_id.to_string(),
        };
        self.record(Stage::FetchSummary, call)?;

        let plate = self
            .plate(session_id)
            .ok_or_else(|| Self::not_found(Stage::FetchSummary))?;

        let (mut co2, mut water, mut land) = (0.0, 0.0, 0.0);
        let mut items = Vec::new();
        for line in plate {
            let Some(f) = factors(line.ingredient_id) else {
                continue;
            };
            let kg = f64::from(line.quantity_g) / 1000.0;
            let (c, w, l) = (kg * f.co2, kg * f.water, kg * f.land);
            co2 += c;
            water += w;
            land += l;
            items.push(IngredientImpact {
                ingredient_id: line.ingredient_id,
                name: f.name.to_string(),
                quantity_g: line.quantity_g,
                co2_kg: round_to(c, 4),
                freshwater_l: round_to(w, 1),
                land_m2: round_to(l, 2),
            });
        }

        Ok(ImpactSummary {
            session_id: session_id.to_string(),
            total_co2_kg: round_to(co2, 4),
            total_freshwater_l: round_to(water, 1),
            total_land_m2: round_to(land, 2),
            impact_score_1_to_10: impact_score(co2, water, land),
            items,
        })
    }

    async fn list_ingredients(&self) -> Result<Vec<RemoteIngredient>, ServiceError> {
        self.record(Stage::ListIngredients, Call::ListIngredients)?;

        Ok(FIXTURE_CATALOG
            .iter()
            .map(|(id, f)| RemoteIngredient {
                id: *id,
                slug: f.name.to_lowercase().replace(' ', "_"),
                name: f.name.to_string(),
                category: f.category.to_string(),
                co2_kg_per_kg: f.co2,
                land_m2_per_kg: Some(f.land),
                freshwater_l_per_kg: Some(f.water),
                scarcity_water_l_per_kg: None,
                default_portion_g: f.portion,
            })
            .collect())
    }

    async fn health(&self) -> Result<HealthStatus, ServiceError> {
        self.record(Stage::Health, Call::Health)?;
        Ok(HealthStatus {
            status: "ok".to_string(),
        })
    }
}

/// Store with chicken selected at `grams`
#[must_use]
pub fn chicken_store(grams: u32) -> SelectionStore {
    SelectionStore::default()
        .toggle("chicken", true)
        .set_grams("chicken", &grams.to_string())
}

/// App over the built-in catalog and default config
#[must_use]
pub fn setup_test_app() -> PlateApp {
    PlateApp::new(Arc::new(Catalog::builtin()), PlateConfig::default())
}

/// Assert `actual` is within `1e-6` of `expected`
#[track_caller]
pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}
