//! # Beacon
//!
//! Keeps a game server discoverable on an external presence directory.
//!
//! Beacon resolves the address clients should connect to, creates a
//! directory session for the server in the background, and then runs a
//! heartbeat that refreshes the advertised player count and keeps the
//! underlying connection alive for as long as the process runs.
//!
//! The directory protocol itself is not part of Beacon: plug it in by
//! implementing [`SessionManager`]. The game server is seen through
//! [`HostServer`].
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use beacon::prelude::*;
//!
//! let config = BroadcastConfig::load_or_create(&data_dir)?;
//! let controller = BroadcastController::new(
//!     config,
//!     Arc::new(MyDirectoryClient::new()),
//!     Arc::new(MyServer::handle()),
//!     TokioScheduler::current(),
//! );
//! controller.start()?;
//! ```

mod config;
mod controller;
mod error;
mod heartbeat;
mod host;
mod state;

pub use config::{BroadcastConfig, CONFIG_FILE_NAME, ConfigError, DEFAULT_CONFIG};
pub use controller::BroadcastController;
pub use error::BeaconError;
pub use host::HostServer;
pub use state::LifecycleState;

pub use beacon_net::{AUTO, AddressResolver, NetError, ResolveStrategy};
pub use beacon_session::{SessionError, SessionInfo, SessionManager};
pub use beacon_tick::{RepeatingTask, TaskHandle, TaskScheduler, TokioScheduler};

/// Everything needed to wire up a controller.
pub mod prelude {
    pub use std::sync::Arc;

    pub use crate::{
        AddressResolver, BeaconError, BroadcastConfig, BroadcastController, HostServer,
        LifecycleState, SessionError, SessionInfo, SessionManager, TokioScheduler,
    };
}
