//! Durable JSON-file-backed entity stores.
//!
//! Each [`EntityStore`] owns one backing file holding a JSON array of
//! records. It keeps the whole snapshot in memory, assigns identifiers,
//! enforces case-insensitive uniqueness, and rewrites the file after every
//! mutation through a temp file and an atomic move.
//!
//! ```rust,no_run
//! use json_entities::ClientStore;
//!
//! let clients = ClientStore::open("data/clients.json");
//! let acme = clients.create_client("Acme", "ops@acme.test").unwrap();
//! assert_eq!(acme.id, Some(1));
//! let new_key = clients.rotate_token(1).unwrap();
//! assert_eq!(clients.find_by_api_key(&new_key).unwrap().name, "Acme");
//! ```
//!
//! Nothing here fails loudly: a corrupted file loads as empty, a failed
//! write keeps the in-memory change, and both are reported through
//! `tracing` events.
//!
//! **Single-process only.** Two stores (or two processes) writing the same
//! file will clobber each other.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod entity;
pub mod error;
pub mod kinds;
pub mod mover;
pub mod persist;
pub mod serializer;
pub mod store;

pub use config::{StoreConfig, Stores};
pub use entity::{Entity, Tokenized, UniqueKey, TOKEN_LEN};
pub use error::{Error, Rejection, Result};
pub use kinds::{AppUser, AppUserStore, Client, ClientStore, PreferenceStore, UserPreference};
pub use mover::{MoveStrategy, RenameMove};
pub use store::{EntityStore, EntityStoreBuilder};
