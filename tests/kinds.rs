use chrono::{TimeZone, Utc};
use json_entities::{
    AppUser, AppUserStore, PreferenceStore, Rejection, StoreConfig, Stores, UserPreference,
};

// ---- application users ----------------------------------------------------------

#[test]
fn register_sets_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let users = AppUserStore::open(dir.path().join("users.json"));
    let bob = users.register(1, "bob", "bob@x.com").unwrap();
    assert_eq!(bob.id, Some(1));
    assert_eq!(bob.active, Some(true));
    assert!(bob.is_active());
    assert_eq!(bob.last_login, None);
}

#[test]
fn username_and_email_are_unique_per_client() {
    let dir = tempfile::tempdir().unwrap();
    let users = AppUserStore::open(dir.path().join("users.json"));
    users.register(1, "bob", "bob@x.com").unwrap();

    assert_eq!(
        users.register(1, "BOB", "other@x.com").unwrap_err(),
        Rejection::Duplicate { field: "clientId+username" }
    );
    assert_eq!(
        users.register(1, "robert", "Bob@X.com").unwrap_err(),
        Rejection::Duplicate { field: "clientId+userEmail" }
    );
    // another client may reuse both
    assert!(users.register(2, "bob", "bob@x.com").is_ok());
    assert_eq!(users.len(), 2);
}

#[test]
fn register_requires_every_field() {
    let dir = tempfile::tempdir().unwrap();
    let users = AppUserStore::open(dir.path().join("users.json"));

    let mut orphan = AppUser::new(1, "bob", "bob@x.com");
    orphan.client_id = None;
    assert_eq!(
        users.create(orphan).unwrap_err(),
        Rejection::Blank { field: "clientId" }
    );
    assert_eq!(
        users.register(1, " ", "bob@x.com").unwrap_err(),
        Rejection::Blank { field: "username" }
    );
    assert_eq!(
        users.register(1, "bob", "").unwrap_err(),
        Rejection::Blank { field: "userEmail" }
    );
    assert!(users.is_empty());
}

#[test]
fn deactivation_and_login_persist() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("users.json");
    let users = AppUserStore::open(&path);
    users.register(1, "bob", "bob@x.com").unwrap();
    let at = Utc.with_ymd_and_hms(2026, 3, 14, 15, 9, 26).unwrap();

    assert!(users.set_active(1, false));
    assert!(users.record_login(1, at));
    assert!(!users.set_active(9, false));
    assert!(!users.record_login(9, at));

    let reopened = AppUserStore::open(&path);
    let bob = reopened.find(1).unwrap();
    assert!(!bob.is_active());
    assert_eq!(bob.last_login, Some(at));
}

#[test]
fn partial_update_keeps_omitted_fields() {
    let dir = tempfile::tempdir().unwrap();
    let users = AppUserStore::open(dir.path().join("users.json"));
    users.register(1, "bob", "bob@x.com").unwrap();

    let patch = AppUser {
        id: Some(1),
        user_email: Some("robert@x.com".into()),
        ..AppUser::default()
    };
    users.update(patch).unwrap();

    let bob = users.find(1).unwrap();
    assert_eq!(bob.username.as_deref(), Some("bob"));
    assert_eq!(bob.user_email.as_deref(), Some("robert@x.com"));
    assert_eq!(bob.client_id, Some(1));
    assert!(bob.is_active());
}

#[test]
fn update_rejects_blank_username_and_clashes() {
    let dir = tempfile::tempdir().unwrap();
    let users = AppUserStore::open(dir.path().join("users.json"));
    users.register(1, "bob", "bob@x.com").unwrap();
    users.register(1, "alice", "alice@x.com").unwrap();

    let blank = AppUser {
        id: Some(1),
        username: Some("   ".into()),
        ..AppUser::default()
    };
    assert_eq!(
        users.update(blank).unwrap_err(),
        Rejection::Blank { field: "username" }
    );

    let clash = AppUser {
        id: Some(1),
        username: Some("Alice".into()),
        ..AppUser::default()
    };
    assert_eq!(
        users.update(clash).unwrap_err(),
        Rejection::Duplicate { field: "clientId+username" }
    );
    assert_eq!(users.find(1).unwrap().username.as_deref(), Some("bob"));
}

#[test]
fn lookups_by_client_and_username() {
    let dir = tempfile::tempdir().unwrap();
    let users = AppUserStore::open(dir.path().join("users.json"));
    users.register(1, "bob", "bob@x.com").unwrap();
    users.register(1, "alice", "alice@x.com").unwrap();
    users.register(2, "bob", "bob@y.com").unwrap();

    assert_eq!(users.find_by_username(2, "BOB").unwrap().id, Some(3));
    assert_eq!(users.find_by_username(3, "bob"), None);
    let ids: Vec<_> = users.users_for_client(1).into_iter().filter_map(|u| u.id).collect();
    assert_eq!(ids, vec![1, 2]);
}

// ---- preferences ----------------------------------------------------------------

#[test]
fn preference_defaults_and_one_per_user() {
    let dir = tempfile::tempdir().unwrap();
    let prefs = PreferenceStore::open(dir.path().join("preferences.json"));

    let created = prefs.create(UserPreference::new(7)).unwrap();
    assert_eq!(created.temperature_unit.as_deref(), Some("celsius"));
    assert_eq!(created.crime_alerts, Some(false));

    let mut fahrenheit = UserPreference::new(8);
    fahrenheit.temperature_unit = Some("fahrenheit".into());
    assert_eq!(
        prefs.create(fahrenheit).unwrap().temperature_unit.as_deref(),
        Some("fahrenheit")
    );

    assert_eq!(
        prefs.create(UserPreference::new(7)).unwrap_err(),
        Rejection::Duplicate { field: "userId" }
    );
    assert_eq!(
        prefs.create(UserPreference::default()).unwrap_err(),
        Rejection::Blank { field: "userId" }
    );
}

#[test]
fn preference_patch() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("preferences.json");
    let prefs = PreferenceStore::open(&path);
    let mut draft = UserPreference::new(7);
    draft.default_city = Some("Lisbon".into());
    draft.watched_countries = vec!["PT".into()];
    prefs.create(draft).unwrap();

    let patch = UserPreference {
        id: Some(1),
        watched_countries: vec!["ES".into(), "FR".into()],
        crime_alerts: Some(true),
        ..UserPreference::default()
    };
    prefs.update(patch).unwrap();

    let stored = PreferenceStore::open(&path).for_user(7).unwrap();
    assert_eq!(stored.default_city.as_deref(), Some("Lisbon"));
    assert_eq!(stored.watched_countries, vec!["ES".to_string(), "FR".to_string()]);
    assert_eq!(stored.crime_alerts, Some(true));
    assert_eq!(stored.temperature_unit.as_deref(), Some("celsius"));
    assert_eq!(prefs.for_user(8), None);
}

// ---- config ---------------------------------------------------------------------

#[test]
fn stores_open_under_one_data_dir() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig::in_dir(dir.path().join("data"));
    let stores = Stores::open(&config).unwrap();

    let client = stores.clients.create_client("Acme", "a@x.com").unwrap();
    let user = stores
        .users
        .register(client.id.unwrap(), "bob", "bob@x.com")
        .unwrap();
    stores.preferences.create(UserPreference::new(user.id.unwrap())).unwrap();

    for path in [config.clients_path(), config.users_path(), config.preferences_path()] {
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.starts_with("[{"), "{} holds {raw}", path.display());
    }
}

#[test]
fn stores_reject_bad_config() {
    let config = StoreConfig {
        users_file: "sub/users.json".into(),
        ..StoreConfig::default()
    };
    assert!(Stores::open(&config).is_err());
}
