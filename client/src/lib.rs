//! # Campo Client
//!
//! The IO shell of the offline-first field data client. The mobile UI layer
//! links against this crate and drives four operations:
//!
//! 1. [`SnapshotLoader::refresh`] at session start - pull the agent's
//!    assigned blocks and properties, or fall back to the stored copies
//!    when the device is offline.
//! 2. [`MutationRecorder`] while working - capture visits and property
//!    edits into the local store, tagged as pending. Never touches the
//!    network.
//! 3. [`Reconciler::synchronize`] when connectivity allows - push every
//!    pending record, absorb the per-item outcomes, report the counts.
//!    Safe to invoke repeatedly.
//! 4. [`ClosureEngine`] at period end - once [`Reconciler::pending_work`]
//!    reports clear (see [`closure::ensure_ready`]), commit the finalized
//!    period per area.
//!
//! Persistent state lives in a [`FileStore`]: one JSON file per collection
//! under the legacy keys `dadosQuarteiroes`, `dadosImoveis` and `visitas`.
//! All remote traffic goes through the [`remote::RemoteApi`] seam,
//! implemented over HTTP by [`HttpRemoteApi`].

pub mod closure;
pub mod config;
pub mod error;
pub mod reconcile;
pub mod recorder;
pub mod remote;
pub mod snapshot;
pub mod store;

pub use closure::{ensure_ready, ClosureEngine, ClosureReport};
pub use config::{Config, ConfigError};
pub use error::SyncError;
pub use reconcile::{BlockFinalization, Reconciler, SyncReport};
pub use recorder::{MutationRecorder, VisitDraft};
pub use remote::{AreaClosureSummary, HttpRemoteApi, RemoteApi, RemoteError};
pub use snapshot::SnapshotLoader;
pub use store::{FileStore, StorageError};
