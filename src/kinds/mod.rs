//! The concrete entity kinds: API clients, their application users, and
//! per-user preferences.

mod app_user;
mod client;
mod preference;

pub use app_user::{AppUser, AppUserStore};
pub use client::{Client, ClientStore};
pub use preference::{PreferenceStore, UserPreference};
