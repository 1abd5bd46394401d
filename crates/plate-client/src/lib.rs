//! Plate Client - impact service access and submission flow
//!
//! - [`ImpactService`]: seam to the remote impact-calculation service
//! - [`HttpImpactService`]: reqwest implementation of that seam
//! - [`RemoteExchange`]: start session → register ingredients → fetch summary
//! - [`PlateApp`]: controller tying the selection store, projections and
//!   submission state together
//!
//! # Example
//!
//! ```rust,ignore
//! use plate_client::{HttpImpactService, PlateApp};
//! use plate_core::PlateConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PlateConfig::default();
//! let service = HttpImpactService::new(&config.api)?;
//! let mut app = PlateApp::default();
//!
//! app.toggle("chicken", true);
//! app.set_grams("chicken", "150");
//! app.submit(&service).await?;
//!
//! println!("{:?}", app.remote_summary());
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod app;
pub mod error;
pub mod http;
pub mod orchestrator;
pub mod service;

pub use app::{PlateApp, Submission};
pub use error::ClientError;
pub use http::HttpImpactService;
pub use orchestrator::{ExchangeReport, RejectedItem, RemoteExchange};
pub use service::{ImpactService, Registration};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with Plate Client
    pub use crate::{HttpImpactService, ImpactService, PlateApp, RemoteExchange};
    pub use plate_core::prelude::*;
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
