use crate::entity::{generate_token, non_blank, require, Entity, Tokenized, UniqueKey};
use crate::error::Rejection;
use crate::store::EntityStore;
use serde::{Deserialize, Serialize};

/// A registered API consumer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Client {
    /// Store-assigned identifier.
    pub id: Option<i64>,
    /// Display name, unique ignoring case.
    pub name: String,
    /// Contact address, unique ignoring case.
    pub email: String,
    /// Secret key, generated on create and rotated on demand.
    pub api_key: Option<String>,
}

impl Client {
    /// Draft for [`EntityStore::create`].
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            ..Self::default()
        }
    }
}

impl Entity for Client {
    const KIND: &'static str = "client";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn check_required(&self) -> Result<(), Rejection> {
        require("name", Some(self.name.as_str()))?;
        require("email", Some(self.email.as_str()))
    }

    // the name is mandatory on every update, the rest is optional
    fn check_patch(&self) -> Result<(), Rejection> {
        require("name", Some(self.name.as_str()))
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![
            UniqueKey::single("name", Some(self.name.clone())),
            UniqueKey::single("email", Some(self.email.clone())),
        ]
    }

    fn init_defaults(&mut self) {
        self.api_key = Some(generate_token());
    }

    fn apply_patch(&mut self, patch: Self) {
        self.name = patch.name;
        if let Some(email) = non_blank(Some(patch.email)) {
            self.email = email;
        }
        if let Some(key) = non_blank(patch.api_key) {
            self.api_key = Some(key);
        }
    }
}

impl Tokenized for Client {
    fn token(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    fn set_token(&mut self, token: String) {
        self.api_key = Some(token);
    }
}

/// Store of [`Client`] records.
pub type ClientStore = EntityStore<Client>;

impl EntityStore<Client> {
    /// Register a client with a fresh API key.
    pub fn create_client(&self, name: impl Into<String>, email: impl Into<String>) -> Result<Client, Rejection> {
        self.create(Client::new(name, email))
    }

    /// The client owning `key`. Keys are compared exactly.
    #[must_use]
    pub fn find_by_api_key(&self, key: &str) -> Option<Client> {
        if key.is_empty() {
            return None;
        }
        self.find_where(|c| c.api_key.as_deref() == Some(key))
    }
}
