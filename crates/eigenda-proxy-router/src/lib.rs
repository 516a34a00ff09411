//! Routes PUT/GET traffic across a primary backend and its configured
//! cache/fallback secondaries.

mod config;
mod router;
mod workers;

pub use config::SecondaryRouterConfig;
pub use router::SecondaryRouter;
