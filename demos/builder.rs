use json_entities::{StoreConfig, Stores, UserPreference};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), json_entities::Error> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let root = std::env::temp_dir().join("json_entities_example_builder");
    let _ = std::fs::remove_dir_all(&root);

    // pretty-printed files under one data directory
    let config = StoreConfig {
        pretty: true,
        ..StoreConfig::in_dir(&root)
    };
    let stores = Stores::open(&config)?;

    let client = stores
        .clients
        .create_client("Acme", "ops@acme.test")
        .map_err(|r| json_entities::Error::Config(r.to_string()))?;
    let user = stores
        .users
        .register(client.id.unwrap_or_default(), "bob", "bob@acme.test")
        .map_err(|r| json_entities::Error::Config(r.to_string()))?;
    let mut prefs = UserPreference::new(user.id.unwrap_or_default());
    prefs.default_city = Some("Lisbon".into());
    prefs.watched_countries = vec!["PT".into(), "ES".into()];
    let _ = stores.preferences.create(prefs);

    // the files on disk are now nicely indented
    for path in [config.clients_path(), config.users_path(), config.preferences_path()] {
        let contents = std::fs::read_to_string(&path)?;
        println!("{}:\n{contents}\n", path.display());
    }

    println!("Debug output: {stores:?}");

    let _ = std::fs::remove_dir_all(&root);
    Ok(())
}
