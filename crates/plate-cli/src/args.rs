//! Command-line argument helpers

use plate_core::{Catalog, PlateConfig, SelectionAction};

/// One `--select id[=grams]` occurrence
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Selection {
    pub(crate) id: String,
    pub(crate) grams: Option<String>,
}

impl Selection {
    /// Parse `id` or `id=grams`
    ///
    /// Grams are kept raw; the selection store decides how to read them.
    pub(crate) fn parse(raw: &str) -> Result<Self, String> {
        let (id, grams) = match raw.split_once('=') {
            Some((id, grams)) => (id.trim(), Some(grams.trim().to_string())),
            None => (raw.trim(), None),
        };
        if id.is_empty() {
            return Err(format!("missing ingredient id in {raw:?}"));
        }
        Ok(Self {
            id: id.to_string(),
            grams,
        })
    }

    /// Store actions equivalent to ticking the box and moving the slider
    pub(crate) fn actions(&self) -> Vec<SelectionAction> {
        let mut actions = vec![SelectionAction::Toggle {
            id: self.id.clone(),
            checked: true,
        }];
        if let Some(raw) = &self.grams {
            actions.push(SelectionAction::SetGrams {
                id: self.id.clone(),
                raw: raw.clone(),
            });
        }
        actions
    }
}

/// Ids in `selections` that the catalog does not know
pub(crate) fn unknown_ids<'a>(catalog: &Catalog, selections: &'a [Selection]) -> Vec<&'a str> {
    selections
        .iter()
        .filter(|s| !catalog.contains(&s.id))
        .map(|s| s.id.as_str())
        .collect()
}

/// Apply `--base-url` on top of the loaded config
pub(crate) fn apply_overrides(config: PlateConfig, base_url: Option<&String>) -> PlateConfig {
    match base_url {
        Some(url) => config.with_base_url(url.clone()),
        None => config,
    }
}
