use crate::entity::{non_blank, Entity, UniqueKey};
use crate::error::Rejection;
use crate::store::EntityStore;
use serde::{Deserialize, Serialize};

const DEFAULT_TEMPERATURE_UNIT: &str = "celsius";

/// Per-user settings for the weather, crime, and travel-advisory views.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserPreference {
    /// Store-assigned identifier.
    pub id: Option<i64>,
    /// The [`AppUser`](crate::AppUser) these belong to. One record per user.
    pub user_id: Option<i64>,
    /// City shown first on the dashboard.
    pub default_city: Option<String>,
    /// `"celsius"` unless set otherwise.
    pub temperature_unit: Option<String>,
    /// Countries whose travel advisories the user follows.
    pub watched_countries: Vec<String>,
    /// Whether to surface crime alerts.
    pub crime_alerts: Option<bool>,
}

impl UserPreference {
    /// Draft for [`EntityStore::create`] with every optional field unset.
    pub fn new(user_id: i64) -> Self {
        Self {
            user_id: Some(user_id),
            ..Self::default()
        }
    }
}

impl Entity for UserPreference {
    const KIND: &'static str = "preference";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn check_required(&self) -> Result<(), Rejection> {
        match self.user_id {
            Some(_) => Ok(()),
            None => Err(Rejection::Blank { field: "userId" }),
        }
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![UniqueKey::single("userId", self.user_id.map(|id| id.to_string()))]
    }

    fn init_defaults(&mut self) {
        if non_blank(self.temperature_unit.clone()).is_none() {
            self.temperature_unit = Some(DEFAULT_TEMPERATURE_UNIT.to_string());
        }
        self.crime_alerts.get_or_insert(false);
    }

    fn apply_patch(&mut self, patch: Self) {
        if let Some(user_id) = patch.user_id {
            self.user_id = Some(user_id);
        }
        if let Some(city) = non_blank(patch.default_city) {
            self.default_city = Some(city);
        }
        if let Some(unit) = non_blank(patch.temperature_unit) {
            self.temperature_unit = Some(unit);
        }
        if !patch.watched_countries.is_empty() {
            self.watched_countries = patch.watched_countries;
        }
        if let Some(alerts) = patch.crime_alerts {
            self.crime_alerts = Some(alerts);
        }
    }
}

/// Store of [`UserPreference`] records.
pub type PreferenceStore = EntityStore<UserPreference>;

impl EntityStore<UserPreference> {
    /// The preference record of `user_id`, if one was created.
    #[must_use]
    pub fn for_user(&self, user_id: i64) -> Option<UserPreference> {
        self.find_where(|p| p.user_id == Some(user_id))
    }
}
