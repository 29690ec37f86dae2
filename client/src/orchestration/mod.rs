//! Screen-level data orchestration over the laboratory client traits.
//!
//! Each screen owns the [`ActionState`] of its actions and shares one [`QueryCache`] with the
//! other screens. Queries are served from the cache by `load` and always fetched by `refresh`.
//! Completed mutations patch the affected cached list by id and drop cached results of other
//! queries that read the changed entities, as listed in the [operation table](crate::api::operations).
//!
//! A screen can be [unmounted](DeviceScreen::unmount). Operations still running at that point
//! complete and reconcile the shared cache, but no longer change the screen's action states.

pub mod cache;
mod catalog;
mod dashboard;
mod devices;
mod session;
mod state;

pub use cache::{CacheKey, QueryCache};
pub use catalog::{CatalogEntity, CatalogRow, CatalogScreen, CatalogView, DeviceTypeScreen, SoftwareScreen};
pub use dashboard::{DashboardScreen, DashboardView, ExperimentRun, ScriptOutcome, device_config};
pub use devices::{DeviceDetailScreen, DeviceDetailView, DeviceListView, DeviceRow, DeviceScreen};
pub use session::{SessionScreen, SessionView};
pub use state::{ActionResult, ActionState};
