//! Shared helpers for integration tests.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use spa_router::routing::{NavigationNotice, RouterInstance, Subscription};

/// The application's route table as shipped.
pub const API_KING_ROUTES: &str = r#"
[[routes]]
path = "/"
redirect = "/api"

[[routes]]
path = "/api"
name = "Api"
component = "Api"

[routes.meta]
label = "API客户端"
icon = "icons/SendAlt.svg"
"#;

/// Write `content` to a fresh file under the temp dir.
pub fn write_config(content: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("spa-router-{}.toml", uuid::Uuid::new_v4()));
    std::fs::write(&path, content).unwrap();
    path
}

/// Subscribe a listener that records every notice.
#[allow(dead_code)]
pub fn record_notices(router: &RouterInstance) -> (Arc<Mutex<Vec<NavigationNotice>>>, Subscription) {
    let notices = Arc::new(Mutex::new(Vec::new()));
    let sink = notices.clone();
    let sub = router.subscribe(move |notice| sink.lock().unwrap().push(notice.clone()));
    (notices, sub)
}
