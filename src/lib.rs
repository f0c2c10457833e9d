//! Pure Rust async client for the [Minecraft Query protocol](https://wiki.vg/Query),
//! the GameSpy-derived UDP protocol servers expose when `enable-query` is set.
//!
//! One call performs the whole exchange: a handshake obtains a session
//! challenge token, a full-stat request carrying that token fetches the
//! server status, and the response is decoded into a [ServerStatus] with
//! the server's key/value fields and connected player names.
//!
//! ```no_run
//! # async fn run() -> Result<(), mcquery::QueryError> {
//! let status = mcquery::query("mc.example.com", mcquery::DEFAULT_PORT, None).await?;
//! println!(
//!     "{}: {}/{} players",
//!     status.motd().unwrap_or("?"),
//!     status.num_players().unwrap_or("?"),
//!     status.max_players().unwrap_or("?"),
//! );
//! # Ok(())
//! # }
//! ```
pub mod error;
pub mod packet;
pub mod query;
pub mod status;

pub use error::QueryError;
pub use query::{query, query_with_options, QueryOptions, DEFAULT_PORT};
pub use status::ServerStatus;
