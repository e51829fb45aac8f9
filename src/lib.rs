//! oreregen — region protection and delayed block restoration core.
//!
//! Protects player build areas in a shared voxel world and puts back
//! blocks broken in the wild after a fixed delay. The crate is structured
//! in a decentralized way:
//! - **[area]** — Area type and bounding-box geometry
//! - **[store]** — quota-checked area registry
//! - **[ledger]** — bounded restoration ledger and batch scheduler
//! - **[presence]** — edge-triggered enter/exit tracking
//! - **[persist]** — atomic single-file persistence
//! - **[config]** — TOML configuration
//! - **[service]** — the inbound ports a host plugin drives
//!
//! Decoupled from any particular server: the host dispatches its
//! block-break and movement events into [`service::RegenService`], drives
//! [`RegenService::tick`](service::RegenService::tick) and
//! [`RegenService::maintenance`](service::RegenService::maintenance) from
//! its own scheduler, and supplies world access through
//! [`ledger::BlockAccess`]. The core never sleeps and never arms timers;
//! background saves are the one piece of work it hands to the ambient
//! tokio runtime.

pub mod area;
pub mod config;
pub mod error;
pub mod ledger;
pub mod persist;
pub mod presence;
pub mod service;
pub mod store;

pub use area::{Area, BlockPos, WORLD_MAX_Y, WORLD_MIN_Y};
pub use config::RegenConfig;
pub use error::RegenError;
pub use ledger::{BlockAccess, OreLedger, OreRecord};
pub use persist::{DataFile, SavedState};
pub use presence::{PresenceEvent, PresenceTracker};
pub use service::{BreakOutcome, RegenService, RegenStats};
pub use store::{AreaStore, Corner};
