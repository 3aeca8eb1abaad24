/*
    core_sync subsystem - delta exchange between peers

    Per-connection sessions push local deltas on a cadence and merge
    inbound deltas as they arrive; the registry owns the listener and the
    table of live sessions. Everything here fails session-local: the
    shared log and the rest of the node never see a transport error.
*/

pub mod errors;
pub mod registry;
pub mod session;
pub mod wire;

pub use errors::{SyncError, SyncResult};
pub use registry::{PeerEvent, PeerRegistry};
pub use session::{CloseSignal, SyncSession};
