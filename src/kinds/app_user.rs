use crate::entity::{non_blank, require, Entity, UniqueKey};
use crate::error::Rejection;
use crate::store::EntityStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An end user registered under a [`Client`](crate::Client).
///
/// Deactivation is an ordinary field; deactivated users stay in the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppUser {
    /// Store-assigned identifier.
    pub id: Option<i64>,
    /// Owning client.
    pub client_id: Option<i64>,
    /// Login name, unique per client ignoring case.
    pub username: Option<String>,
    /// Contact address, unique per client ignoring case.
    pub user_email: Option<String>,
    /// `true` on create; cleared by deactivation.
    pub active: Option<bool>,
    /// Time of the most recent login, `None` until the first one.
    pub last_login: Option<DateTime<Utc>>,
}

impl AppUser {
    /// Draft for [`EntityStore::create`].
    pub fn new(client_id: i64, username: impl Into<String>, user_email: impl Into<String>) -> Self {
        Self {
            client_id: Some(client_id),
            username: Some(username.into()),
            user_email: Some(user_email.into()),
            ..Self::default()
        }
    }

    /// `true` when the user is marked active.
    pub fn is_active(&self) -> bool {
        self.active.unwrap_or(false)
    }
}

impl Entity for AppUser {
    const KIND: &'static str = "app_user";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn check_required(&self) -> Result<(), Rejection> {
        if self.client_id.is_none() {
            return Err(Rejection::Blank { field: "clientId" });
        }
        require("username", self.username.as_deref())?;
        require("userEmail", self.user_email.as_deref())
    }

    // a provided username may not be blank; omitted fields are kept
    fn check_patch(&self) -> Result<(), Rejection> {
        match self.username {
            Some(_) => require("username", self.username.as_deref()),
            None => Ok(()),
        }
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        let client = self.client_id.map(|id| id.to_string());
        vec![
            UniqueKey::composite("clientId+username", [client.clone(), self.username.clone()]),
            UniqueKey::composite("clientId+userEmail", [client, self.user_email.clone()]),
        ]
    }

    fn init_defaults(&mut self) {
        self.active = Some(true);
        self.last_login = None;
    }

    fn apply_patch(&mut self, patch: Self) {
        if let Some(client_id) = patch.client_id {
            self.client_id = Some(client_id);
        }
        if let Some(username) = non_blank(patch.username) {
            self.username = Some(username);
        }
        if let Some(email) = non_blank(patch.user_email) {
            self.user_email = Some(email);
        }
        if let Some(active) = patch.active {
            self.active = Some(active);
        }
        if let Some(at) = patch.last_login {
            self.last_login = Some(at);
        }
    }
}

/// Store of [`AppUser`] records.
pub type AppUserStore = EntityStore<AppUser>;

impl EntityStore<AppUser> {
    /// Register an active user under `client_id`.
    pub fn register(
        &self,
        client_id: i64,
        username: impl Into<String>,
        user_email: impl Into<String>,
    ) -> Result<AppUser, Rejection> {
        self.create(AppUser::new(client_id, username, user_email))
    }

    /// Activate or deactivate a user. Returns `false` if there's no such user.
    pub fn set_active(&self, id: i64, active: bool) -> bool {
        self.modify(id, |u| u.active = Some(active)).is_some()
    }

    /// Stamp the user's last login time. Returns `false` if there's no such user.
    pub fn record_login(&self, id: i64, at: DateTime<Utc>) -> bool {
        self.modify(id, |u| u.last_login = Some(at)).is_some()
    }

    /// The user named `username` under `client_id`, ignoring case.
    #[must_use]
    pub fn find_by_username(&self, client_id: i64, username: &str) -> Option<AppUser> {
        let wanted = username.to_lowercase();
        self.find_where(|u| {
            u.client_id == Some(client_id)
                && u.username.as_deref().map(str::to_lowercase).as_deref() == Some(wanted.as_str())
        })
    }

    /// Every user registered under `client_id`.
    #[must_use]
    pub fn users_for_client(&self, client_id: i64) -> Vec<AppUser> {
        self.filter(|u| u.client_id == Some(client_id))
    }
}
