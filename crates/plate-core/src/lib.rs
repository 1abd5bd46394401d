//! Plate Core - selection state and plate projection
//!
//! The client-side core of Climate Plate:
//! - A static, indexed ingredient catalog
//! - An immutable-update selection store (toggle / set grams / reset)
//! - A view projector deriving plate sprites, the submission payload and
//!   local totals
//! - The submission phase state machine and error taxonomy
//!
//! # Example
//!
//! ```rust
//! use plate_core::{Catalog, PlateConfig, SelectionStore, ViewProjector, PayloadItem};
//!
//! let catalog = Catalog::builtin();
//! let config = PlateConfig::default();
//! let store = SelectionStore::new(config.selection.default_grams)
//!     .toggle("chicken", true)
//!     .set_grams("chicken", "150");
//!
//! let projector = ViewProjector::from_config(&catalog, &config);
//! assert_eq!(projector.payload(&store), vec![PayloadItem::new(13, 150)]);
//! assert_eq!(projector.sprites(&store).len(), 1);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod catalog;
pub mod config;
pub mod error;
pub mod projector;
pub mod selection;
pub mod state_machine;
pub mod types;

pub use catalog::{Catalog, Category, Ingredient};
pub use config::{ApiConfig, PlateConfig, RenderConfig, SelectionConfig, DEFAULT_BASE_URL};
pub use error::{CatalogError, ConfigError, ServiceError, Stage, SubmitError, TransitionError};
pub use projector::{scale_for_grams, LocalLine, LocalSummary, Sprite, ViewProjector};
pub use selection::{parse_grams, SelectionAction, SelectionEntry, SelectionStore};
pub use state_machine::{SubmissionPhase, View};
pub use types::{
    HealthStatus, ImpactSummary, IngredientImpact, PayloadItem, PlateItem, RemoteIngredient,
    RemotePlate, SessionStarted,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with Plate Core
    pub use crate::{
        Catalog, ImpactSummary, LocalSummary, PayloadItem, PlateConfig, SelectionStore,
        Sprite, SubmissionPhase, SubmitError, View, ViewProjector,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
