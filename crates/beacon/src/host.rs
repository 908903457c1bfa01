//! The host server collaborator: live state of the game server being
//! advertised.

/// Read-only view of the running game server.
///
/// The controller samples it once at bring-up for the full descriptor and
/// then once per heartbeat for [`player_count`](Self::player_count).
/// Implementations should be cheap: every method is called from the
/// background tasks, never while holding anything the host needs.
pub trait HostServer: Send + Sync + 'static {
    /// Primary display line (server name / MOTD).
    fn host_name(&self) -> String;

    /// Secondary display line (world or sub-MOTD).
    fn world_name(&self) -> String;

    /// Human-readable game version, e.g. `"1.20.40"`.
    fn version(&self) -> String;

    /// Network protocol number matching [`version`](Self::version).
    fn protocol(&self) -> u32;

    /// Players connected right now.
    fn player_count(&self) -> u32;

    /// Configured capacity.
    fn max_players(&self) -> u32;

    /// Address the server binds to. Advertised when no better address
    /// can be detected.
    fn bind_address(&self) -> String;

    /// Port the server listens on. Advertised when `remote_port = "auto"`.
    fn port(&self) -> u16;
}
