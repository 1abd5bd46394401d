//! Core types for Climate Plate
//!
//! Defines:
//! - Submission payload items
//! - Impact service wire types (session, plate, summary, remote catalog)

use serde::{Deserialize, Serialize};

/// One `{remote_id, grams}` pair sent to the impact service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PayloadItem {
    /// Service-side ingredient id
    pub remote_id: u32,
    /// Quantity in grams (always positive)
    pub grams: u32,
}

impl PayloadItem {
    /// Create payload item
    #[inline]
    #[must_use]
    pub fn new(remote_id: u32, grams: u32) -> Self {
        Self { remote_id, grams }
    }
}

/// Session created by `POST /session/start`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStarted {
    /// Opaque session identifier, scoped to one submission
    pub session_id: String,
}

/// Line on a server-side plate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlateItem {
    pub ingredient_id: u32,
    pub quantity_g: u32,
}

/// Server-side plate for a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemotePlate {
    pub session_id: String,
    #[serde(default)]
    pub items: Vec<PlateItem>,
}

/// Per-ingredient metrics in an impact summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientImpact {
    pub ingredient_id: u32,
    pub name: String,
    pub quantity_g: u32,
    pub co2_kg: f64,
    pub freshwater_l: f64,
    pub land_m2: f64,
}

/// Aggregate metrics returned by `GET /impact/summary`
///
/// Only ever replaced wholesale from a successful response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactSummary {
    pub session_id: String,
    pub total_co2_kg: f64,
    pub total_freshwater_l: f64,
    pub total_land_m2: f64,
    pub impact_score_1_to_10: f64,
    #[serde(default)]
    pub items: Vec<IngredientImpact>,
}

/// Ingredient as listed by the service's `GET /ingredients/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteIngredient {
    pub id: u32,
    pub slug: String,
    pub name: String,
    pub category: String,
    pub co2_kg_per_kg: f64,
    #[serde(default)]
    pub land_m2_per_kg: Option<f64>,
    #[serde(default)]
    pub freshwater_l_per_kg: Option<f64>,
    #[serde(default)]
    pub scarcity_water_l_per_kg: Option<f64>,
    pub default_portion_g: u32,
}

/// `GET /health` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}
