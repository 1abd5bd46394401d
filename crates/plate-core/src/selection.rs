//! Selection store
//!
//! Maps ingredient id → `{is_selected, grams}`. Every operation is a pure
//! update: it takes the previous store by reference and returns a new one,
//! touching only the targeted id.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Quantity seeded on first toggle when no config is supplied
pub const DEFAULT_GRAMS: u32 = 50;

/// Selection state for one touched ingredient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionEntry {
    /// Checkbox state
    pub is_selected: bool,
    /// Slider quantity in grams; not clamped
    pub grams: u32,
}

impl SelectionEntry {
    /// Create entry
    #[inline]
    #[must_use]
    pub fn new(is_selected: bool, grams: u32) -> Self {
        Self { is_selected, grams }
    }

    /// Whether this entry reaches the plate and the payload
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_selected && self.grams > 0
    }
}

/// Reducer input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionAction {
    /// Checkbox changed
    Toggle { id: String, checked: bool },
    /// Slider moved; `raw` is the unparsed control value
    SetGrams { id: String, raw: String },
    /// Clear every entry
    Reset,
}

/// Immutable-update selection store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionStore {
    entries: IndexMap<String, SelectionEntry>,
    default_grams: u32,
}

impl SelectionStore {
    /// Create empty store seeding first toggles with `default_grams`
    #[inline]
    #[must_use]
    pub fn new(default_grams: u32) -> Self {
        Self {
            entries: IndexMap::new(),
            default_grams,
        }
    }

    /// Set the selected flag for `id`
    ///
    /// Seeds `grams` with the default when the id was never touched and keeps
    /// any existing quantity otherwise. Unknown ids are recorded as-is.
    #[must_use]
    pub fn toggle(&self, id: &str, checked: bool) -> Self {
        let grams = self
            .entries
            .get(id)
            .map_or(self.default_grams, |entry| entry.grams);
        self.with_entry(id, SelectionEntry::new(checked, grams))
    }

    /// Set the quantity for `id` from a raw control value
    ///
    /// See [`parse_grams`] for how `raw` is interpreted. The selected flag is
    /// preserved, defaulting to unselected for untouched ids.
    #[must_use]
    pub fn set_grams(&self, id: &str, raw: &str) -> Self {
        let is_selected = self.entries.get(id).is_some_and(|entry| entry.is_selected);
        self.with_entry(id, SelectionEntry::new(is_selected, parse_grams(raw)))
    }

    /// Drop every entry
    #[inline]
    #[must_use]
    pub fn reset(&self) -> Self {
        Self::new(self.default_grams)
    }

    /// Apply a reducer action
    #[must_use]
    pub fn apply(&self, action: &SelectionAction) -> Self {
        match action {
            SelectionAction::Toggle { id, checked } => self.toggle(id, *checked),
            SelectionAction::SetGrams { id, raw } => self.set_grams(id, raw),
            SelectionAction::Reset => self.reset(),
        }
    }

    fn with_entry(&self, id: &str, entry: SelectionEntry) -> Self {
        let mut next = self.clone();
        next.entries.insert(id.to_string(), entry);
        next
    }

    /// Entry for `id`, if touched
    #[inline]
    #[must_use]
    pub fn entry(&self, id: &str) -> Option<SelectionEntry> {
        self.entries.get(id).copied()
    }

    /// Entry for `id`, or the unselected default used to render untouched rows
    #[inline]
    #[must_use]
    pub fn entry_or_default(&self, id: &str) -> SelectionEntry {
        self.entry(id)
            .unwrap_or_else(|| SelectionEntry::new(false, self.default_grams))
    }

    /// Iterate entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SelectionEntry)> {
        self.entries.iter().map(|(id, entry)| (id.as_str(), entry))
    }

    /// Number of active (selected, positive quantity) entries
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.entries.values().filter(|e| e.is_active()).count()
    }

    /// Number of touched ids
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no id was touched
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Seed quantity for first toggles
    #[inline]
    #[must_use]
    pub fn default_grams(&self) -> u32 {
        self.default_grams
    }
}

impl Default for SelectionStore {
    fn default() -> Self {
        Self::new(DEFAULT_GRAMS)
    }
}

/// Interpret a slider/text value as whole grams
///
/// Surrounding whitespace is ignored and decimals are rounded. Empty,
/// non-numeric, non-finite and negative input all read as 0. Only decimal
/// notation is accepted: hex or binary literals such as `"0x10"` read as 0.
#[must_use]
pub fn parse_grams(raw: &str) -> u32 {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => {
            let rounded = value.round();
            if rounded >= f64::from(u32::MAX) {
                u32::MAX
            } else {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let grams = rounded as u32;
                grams
            }
        }
        _ => 0,
    }
}
