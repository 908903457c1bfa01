//! The session descriptor: what this server advertises on the directory.
//!
//! A descriptor is built once during bring-up, after the address and port
//! are resolved. From then on only the player count changes: every heartbeat
//! re-samples it from the live server and overwrites the previous value.

use std::fmt;

use serde::Serialize;

/// Metadata published to the presence directory for this server.
///
/// Fields are private so the `players <= max_players` invariant can't be
/// broken from outside: [`set_players`](Self::set_players) clamps, and the
/// capacity is fixed when the descriptor is built.
///
/// Serialized with camelCase keys, the shape directory clients expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    host_name: String,
    world_name: String,
    version: String,
    protocol: u32,
    players: u32,
    max_players: u32,
    ip: String,
    port: u16,
}

impl SessionInfo {
    /// Starts building a descriptor for the given advertised address.
    pub fn builder(ip: impl Into<String>, port: u16) -> SessionInfoBuilder {
        SessionInfoBuilder {
            info: SessionInfo {
                host_name: String::new(),
                world_name: String::new(),
                version: String::new(),
                protocol: 0,
                players: 0,
                max_players: 0,
                ip: ip.into(),
                port,
            },
        }
    }

    /// Overwrites the advertised player count.
    ///
    /// Counts above capacity are clamped to `max_players` (a server can
    /// briefly exceed its configured limit, the directory must not see it).
    /// Returns the value actually stored.
    pub fn set_players(&mut self, players: u32) -> u32 {
        if players > self.max_players {
            tracing::warn!(
                players,
                max_players = self.max_players,
                "player count exceeds capacity, clamping"
            );
        }
        self.players = players.min(self.max_players);
        self.players
    }

    pub fn host_name(&self) -> &str {
        &self.host_name
    }

    pub fn world_name(&self) -> &str {
        &self.world_name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn protocol(&self) -> u32 {
        self.protocol
    }

    pub fn players(&self) -> u32 {
        self.players
    }

    pub fn max_players(&self) -> u32 {
        self.max_players
    }

    pub fn ip(&self) -> &str {
        &self.ip
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl fmt::Display for SessionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) at {}:{} [{}/{}] v{} (protocol {})",
            self.host_name,
            self.world_name,
            self.ip,
            self.port,
            self.players,
            self.max_players,
            self.version,
            self.protocol
        )
    }
}

/// Builder for [`SessionInfo`]. Obtained from [`SessionInfo::builder`].
#[derive(Debug, Clone)]
pub struct SessionInfoBuilder {
    info: SessionInfo,
}

impl SessionInfoBuilder {
    /// Primary display line (the server name shown in the browser).
    pub fn host_name(mut self, host_name: impl Into<String>) -> Self {
        self.info.host_name = host_name.into();
        self
    }

    /// Secondary display line.
    pub fn world_name(mut self, world_name: impl Into<String>) -> Self {
        self.info.world_name = world_name.into();
        self
    }

    /// Game version and protocol number. These must match the running
    /// server, or clients will see the session as incompatible.
    pub fn game_version(mut self, version: impl Into<String>, protocol: u32) -> Self {
        self.info.version = version.into();
        self.info.protocol = protocol;
        self
    }

    pub fn max_players(mut self, max_players: u32) -> Self {
        self.info.max_players = max_players;
        self
    }

    /// Initial player count. Clamped like [`SessionInfo::set_players`].
    pub fn players(mut self, players: u32) -> Self {
        self.info.players = players;
        self
    }

    pub fn build(self) -> SessionInfo {
        let mut info = self.info;
        let players = info.players;
        info.set_players(players);
        info
    }
}
