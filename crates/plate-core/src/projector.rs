//! View projector
//!
//! Stateless derivations from (catalog, selection store):
//! - plate sprites positioned and scaled for the canvas
//! - the `{remote_id, grams}` submission payload
//! - a local summary that stays visible whatever the remote outcome

use crate::catalog::Catalog;
use crate::config::{PlateConfig, RenderConfig, SelectionConfig};
use crate::selection::SelectionStore;
use crate::types::PayloadItem;
use serde::{Deserialize, Serialize};

/// Positioned overlay for one ingredient on the plate canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sprite {
    pub ingredient_id: String,
    /// Alt text
    pub name: String,
    pub asset: String,
    /// Centre, percent from the left
    pub x_pct: f32,
    /// Centre, percent from the top
    pub y_pct: f32,
    /// Width/height before scaling
    pub base_size: f32,
    pub scale: f32,
    /// Degrees
    pub rotation: Option<f32>,
}

impl Sprite {
    /// CSS transform centring the sprite on its anchor, then scaling and rotating
    #[must_use]
    pub fn css_transform(&self) -> String {
        let mut transform = format!("translate(-50%, -50%) scale({:.3})", self.scale);
        if let Some(rotation) = self.rotation {
            transform.push_str(&format!(" rotate({rotation}deg)"));
        }
        transform
    }

    /// Rendered edge length in px
    #[inline]
    #[must_use]
    pub fn rendered_size(&self) -> f32 {
        self.base_size * self.scale
    }
}

/// One selected ingredient in the local summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalLine {
    pub ingredient_id: String,
    pub name: String,
    pub grams: u32,
}

/// Totals computed without the impact service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalSummary {
    pub lines: Vec<LocalLine>,
    pub total_grams: u64,
}

impl LocalSummary {
    /// Number of selected ingredients
    #[inline]
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.lines.len()
    }
}

/// Linear interpolation of `grams`, clamped to the slider bounds, into the scale range
///
/// Monotonic non-decreasing in `grams`; constant below `min_grams` and above
/// `max_grams`.
#[must_use]
pub fn scale_for_grams(grams: u32, selection: &SelectionConfig, render: &RenderConfig) -> f32 {
    #[allow(clippy::cast_precision_loss)]
    let (lo, hi, g) = (
        selection.min_grams as f32,
        selection.max_grams as f32,
        grams as f32,
    );
    if hi <= lo {
        return render.scale_max;
    }
    let t = (g.clamp(lo, hi) - lo) / (hi - lo);
    render.scale_min + t * (render.scale_max - render.scale_min)
}

/// Derivation logic over a catalog
#[derive(Debug, Clone, Copy)]
pub struct ViewProjector<'a> {
    catalog: &'a Catalog,
    selection: SelectionConfig,
    render: RenderConfig,
}

impl<'a> ViewProjector<'a> {
    /// Create projector with explicit bounds
    #[inline]
    #[must_use]
    pub fn new(catalog: &'a Catalog, selection: SelectionConfig, render: RenderConfig) -> Self {
        Self {
            catalog,
            selection,
            render,
        }
    }

    /// Create projector from client configuration
    #[inline]
    #[must_use]
    pub fn from_config(catalog: &'a Catalog, config: &PlateConfig) -> Self {
        Self::new(catalog, config.selection, config.render)
    }

    /// Sprites for every active catalog ingredient, in catalog order
    #[must_use]
    pub fn sprites(&self, store: &SelectionStore) -> Vec<Sprite> {
        self.catalog
            .iter()
            .filter_map(|ingredient| {
                let entry = store.entry(&ingredient.id)?;
                if !entry.is_active() {
                    return None;
                }
                Some(Sprite {
                    ingredient_id: ingredient.id.clone(),
                    name: ingredient.name.clone(),
                    asset: ingredient.image_asset.clone(),
                    x_pct: ingredient.plate_x,
                    y_pct: ingredient.plate_y,
                    base_size: ingredient.base_size,
                    scale: scale_for_grams(entry.grams, &self.selection, &self.render),
                    rotation: ingredient.rotation,
                })
            })
            .collect()
    }

    /// Submission payload in store insertion order
    ///
    /// Ids missing from the catalog are dropped.
    #[must_use]
    pub fn payload(&self, store: &SelectionStore) -> Vec<PayloadItem> {
        store
            .iter()
            .filter(|(_, entry)| entry.is_active())
            .filter_map(|(id, entry)| match self.catalog.get(id) {
                Some(ingredient) => Some(PayloadItem::new(ingredient.remote_id, entry.grams)),
                None => {
                    tracing::debug!("dropping selection for unknown ingredient {}", id);
                    None
                }
            })
            .collect()
    }

    /// Local totals for the same entries the payload carries
    #[must_use]
    pub fn local_summary(&self, store: &SelectionStore) -> LocalSummary {
        let lines: Vec<LocalLine> = store
            .iter()
            .filter(|(_, entry)| entry.is_active())
            .filter_map(|(id, entry)| {
                self.catalog.get(id).map(|ingredient| LocalLine {
                    ingredient_id: ingredient.id.clone(),
                    name: ingredient.name.clone(),
                    grams: entry.grams,
                })
            })
            .collect();
        let total_grams = lines.iter().map(|l| u64::from(l.grams)).sum();

        LocalSummary { lines, total_grams }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Ingredient;
    use pretty_assertions::assert_eq;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    fn projector(catalog: &Catalog) -> ViewProjector<'_> {
        ViewProjector::from_config(catalog, &PlateConfig::default())
    }

    #[test]
    fn scale_endpoints_and_midpoint() {
        let s = SelectionConfig::default();
        let r = RenderConfig::default();
        assert!(approx(scale_for_grams(50, &s, &r), 0.4));
        assert!(approx(scale_for_grams(200, &s, &r), 1.1));
        assert!(approx(scale_for_grams(125, &s, &r), 0.75));
    }

    #[test]
    fn scale_clamps_outside_slider_range() {
        let s = SelectionConfig::default();
        let r = RenderConfig::default();
        assert!(approx(scale_for_grams(10, &s, &r), 0.4));
        assert!(approx(scale_for_grams(5000, &s, &r), 1.1));
    }

    #[test]
    fn scale_uses_configured_range() {
        let s = SelectionConfig::default();
        let r = RenderConfig { scale_min: 0.9, scale_max: 1.25 };
        assert!(approx(scale_for_grams(50, &s, &r), 0.9));
        assert!(approx(scale_for_grams(200, &s, &r), 1.25));
    }

    #[test]
    fn sprites_skip_inactive_entries() {
        let catalog = Catalog::builtin();
        let store = SelectionStore::default()
            .toggle("bread", true)
            .toggle("chicken", true)
            .toggle("chicken", false)
            .toggle("peas", true)
            .set_grams("peas", "0")
            .set_grams("rice", "120");

        let sprites = projector(&catalog).sprites(&store);
        let ids: Vec<_> = sprites.iter().map(|s| s.ingredient_id.as_str()).collect();
        assert_eq!(ids, ["bread"]);
    }

    #[test]
    fn sprite_carries_catalog_geometry() {
        let catalog = Catalog::builtin();
        let store = SelectionStore::default()
            .toggle("banana", true)
            .set_grams("banana", "200");

        let sprites = projector(&catalog).sprites(&store);
        assert_eq!(sprites.len(), 1);
        let banana = &sprites[0];
        assert_eq!(banana.asset, "/images/banana.png");
        assert!(approx(banana.x_pct, 70.0));
        assert!(approx(banana.y_pct, 70.0));
        assert_eq!(banana.rotation, Some(25.0));
        assert!(approx(banana.scale, 1.1));
        assert_eq!(
            banana.css_transform(),
            "translate(-50%, -50%) scale(1.100) rotate(25deg)"
        );
    }

    #[test]
    fn sprites_follow_catalog_order() {
        let catalog = Catalog::builtin();
        let store = SelectionStore::default()
            .toggle("chicken", true)
            .toggle("bread", true);
        let ids: Vec<_> = projector(&catalog)
            .sprites(&store)
            .into_iter()
            .map(|s| s.ingredient_id)
            .collect();
        assert_eq!(ids, ["bread", "chicken"]);
    }

    #[test]
    fn sprite_without_rotation() {
        let catalog = Catalog::new([Ingredient::new("bread", "Bread", 1, 40.0, 55.0, 110.0)]).unwrap();
        let store = SelectionStore::default().toggle("bread", true);
        let sprite = &projector(&catalog).sprites(&store)[0];
        assert_eq!(sprite.css_transform(), "translate(-50%, -50%) scale(0.400)");
        assert!(approx(sprite.rendered_size(), 44.0));
    }

    #[test]
    fn payload_for_single_chicken() {
        let catalog = Catalog::builtin();
        let store = SelectionStore::default()
            .toggle("chicken", true)
            .set_grams("chicken", "150");
        assert_eq!(projector(&catalog).payload(&store), vec![PayloadItem::new(13, 150)]);
    }

    #[test]
    fn payload_drops_unknown_and_inactive() {
        let catalog = Catalog::builtin();
        let store = SelectionStore::default()
            .toggle("tofu", true)
            .toggle("bread", true)
            .toggle("fish", false)
            .toggle("rice", true)
            .set_grams("rice", "0");
        assert_eq!(projector(&catalog).payload(&store), vec![PayloadItem::new(1, 50)]);
    }

    #[test]
    fn payload_uses_insertion_order() {
        let catalog = Catalog::builtin();
        let store = SelectionStore::default()
            .toggle("fish", true)
            .toggle("bread", true);
        let remote: Vec<_> = projector(&catalog)
            .payload(&store)
            .into_iter()
            .map(|p| p.remote_id)
            .collect();
        assert_eq!(remote, [16, 1]);
    }

    #[test]
    fn local_summary_totals() {
        let catalog = Catalog::builtin();
        let store = SelectionStore::default()
            .toggle("bread", true)
            .toggle("chicken", true)
            .set_grams("chicken", "150")
            .toggle("unknown", true);

        let summary = projector(&catalog).local_summary(&store);
        assert_eq!(summary.item_count(), 2);
        assert_eq!(summary.total_grams, 200);
        assert_eq!(summary.lines[1].name, "Chicken");
    }
}
