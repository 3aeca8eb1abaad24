/*
    confab-core - peer-replicated append-only log

    Every node runs the same components: a shared log of immutable,
    logically-timestamped entries (core_log) and a set of per-connection
    sync sessions that push and pull deltas between peers (core_sync).
    There is no coordinator and no leader; replicas converge because the
    log merge is a conflict-free join.
*/

pub mod config;
pub mod core_log;
pub mod core_sync;
pub mod logging;
pub mod metrics;
pub mod shutdown;

pub use config::SyncConfig;
pub use core_log::{Clock, Entry, Log, SharedLog};
pub use core_sync::{PeerEvent, PeerRegistry, SyncError, SyncResult};
pub use logging::{init_logging, LogLevel};
pub use shutdown::ShutdownCoordinator;
