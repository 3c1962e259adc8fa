//! The contract a record type implements to live in an [`EntityStore`](crate::EntityStore).

use crate::error::Rejection;
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

/// Length of generated tokens such as client API keys.
pub const TOKEN_LEN: usize = 32;

/// A record with a store-assigned identifier and per-kind validation rules.
///
/// The store owns identifier assignment, uniqueness checks, and persistence;
/// the entity only describes its own fields.
pub trait Entity: Clone + Serialize + DeserializeOwned + Send + 'static {
    /// Short name used in log events, e.g. `"client"`.
    const KIND: &'static str;

    /// The assigned identifier, `None` before creation.
    fn id(&self) -> Option<i64>;

    /// Assigns the identifier. Only the store calls this.
    fn set_id(&mut self, id: i64);

    /// Required-field checks applied on create.
    fn check_required(&self) -> Result<(), Rejection>;

    /// Checks applied to an update input before it is merged. Defaults to none.
    fn check_patch(&self) -> Result<(), Rejection> {
        Ok(())
    }

    /// Values that must not repeat (ignoring case) across live entities.
    fn unique_keys(&self) -> Vec<UniqueKey>;

    /// Fills kind-specific defaults on a freshly created entity.
    fn init_defaults(&mut self) {}

    /// Merges an update input into the stored entity. Fields that are absent
    /// or blank in `patch` must leave the stored value alone.
    fn apply_patch(&mut self, patch: Self);
}

/// An entity carrying a secret token that can be rotated.
pub trait Tokenized: Entity {
    /// Current token, if any.
    fn token(&self) -> Option<&str>;

    /// Replaces the token.
    fn set_token(&mut self, token: String);
}

/// One uniqueness constraint as it applies to one entity.
///
/// A key has one part per participating field. Two keys collide when they
/// name the same constraint and every part is present on both sides and
/// equal ignoring case. Blank parts count as absent and never collide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueKey {
    name: &'static str,
    parts: Vec<Option<String>>,
}

impl UniqueKey {
    /// Constraint over a single field.
    pub fn single(name: &'static str, value: Option<String>) -> Self {
        Self::composite(name, [value])
    }

    /// Constraint over a combination of fields.
    pub fn composite<I>(name: &'static str, parts: I) -> Self
    where
        I: IntoIterator<Item = Option<String>>,
    {
        let parts = parts
            .into_iter()
            .map(|p| p.filter(|v| !v.trim().is_empty()).map(|v| v.to_lowercase()))
            .collect();
        Self { name, parts }
    }

    /// Constraint name, reported in [`Rejection::Duplicate`].
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// `true` if both keys hold the same fully-present value.
    pub fn collides(&self, other: &UniqueKey) -> bool {
        self.name == other.name
            && self.parts.len() == other.parts.len()
            && self
                .parts
                .iter()
                .zip(&other.parts)
                .all(|(a, b)| matches!((a, b), (Some(a), Some(b)) if a == b))
    }
}

/// Name of the first constraint on which `candidate` collides with a live
/// entity, skipping the entity whose id is `skip`.
pub(crate) fn find_collision<E: Entity>(records: &[E], candidate: &E, skip: Option<i64>) -> Option<&'static str> {
    let keys = candidate.unique_keys();
    records
        .iter()
        .filter(|e| skip.map_or(true, |id| e.id() != Some(id)))
        .find_map(|existing| {
            let theirs = existing.unique_keys();
            keys.iter()
                .find(|k| theirs.iter().any(|t| k.collides(t)))
                .map(UniqueKey::name)
        })
}

/// Rejects an absent or whitespace-only value for `field`.
pub fn require(field: &'static str, value: Option<&str>) -> Result<(), Rejection> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(()),
        _ => Err(Rejection::Blank { field }),
    }
}

/// Drops blank strings so a patch treats them as "not provided".
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Random opaque token of [`TOKEN_LEN`] hex characters.
pub fn generate_token() -> String {
    Uuid::new_v4().simple().to_string()
}

/// A new token guaranteed to differ from `previous`.
pub fn fresh_token(previous: Option<&str>) -> String {
    loop {
        let token = generate_token();
        if previous != Some(token.as_str()) {
            return token;
        }
    }
}
