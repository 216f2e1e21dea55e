//! The level-travel seam: how the orchestrator hands off to the game.
//!
//! The orchestrator never opens levels or connects sockets itself. When a
//! hosted session starts it asks this collaborator to open the target map;
//! when a join resolves it asks it to connect to the host's address. The
//! game engine integration implements this trait; tests implement it with a
//! recorder.

/// Level-travel / transport collaborator.
pub trait Travel {
    /// Host side: open `map` with the given `?`-joined `arguments`.
    fn open_level(&mut self, map: &str, arguments: &str, absolute: bool);

    /// Client side: connect to the resolved `address`.
    fn connect(&mut self, address: &str, absolute: bool);
}

/// A travel collaborator that only logs. Useful for tools and demos that
/// exercise the session flow without a game attached.
#[derive(Debug, Default)]
pub struct NullTravel;

impl Travel for NullTravel {
    fn open_level(&mut self, map: &str, arguments: &str, absolute: bool) {
        tracing::info!(map, arguments, absolute, "open level requested");
    }

    fn connect(&mut self, address: &str, absolute: bool) {
        tracing::info!(address, absolute, "client connect requested");
    }
}
