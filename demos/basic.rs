use json_entities::{Client, ClientStore};
use tracing_subscriber::EnvFilter;

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let path = std::env::temp_dir().join("json_entities_example_basic.json");
    let _ = std::fs::remove_file(&path);
    let clients = ClientStore::open(&path);

    // create / find
    let acme = clients.create_client("Acme", "ops@acme.test").expect("fresh store");
    println!("created  = {acme:?}");
    match clients.create_client("ACME", "other@acme.test") {
        Ok(c) => println!("unexpected duplicate {c:?}"),
        Err(reason) => println!("rejected = {reason}"),
    }

    // partial update keeps the api key
    let patch = Client {
        id: acme.id,
        name: "Acme Corp".into(),
        ..Client::default()
    };
    println!("update ok? {}", clients.update(patch).is_ok());
    println!("after    = {:?}", clients.find(1));

    // rotate the key
    if let Some(key) = clients.rotate_token(1) {
        println!("new key  = {key}");
    }

    println!("on disk  = {}", std::fs::read_to_string(clients.path()).unwrap_or_default());
    println!("removed? {}", clients.remove(1));

    let _ = std::fs::remove_file(&path);
}
