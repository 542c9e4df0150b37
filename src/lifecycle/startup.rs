//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Initialize logging from the loaded configuration
//! - Build the route table
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Nothing is logged before the subscriber exists; the config loader
//!   stays silent and startup reports the load once logging is up

use std::path::Path;

use crate::config::{build_table, load_config, ConfigError, RouterConfig};
use crate::observability::logging::init_logging;
use crate::routing::RouteTable;

/// Everything a command needs once startup has succeeded.
#[derive(Debug)]
pub struct Startup {
    pub config: RouterConfig,
    pub table: RouteTable,
}

/// Load the configuration at `path`, initialize logging, build the table.
pub fn start(path: &Path) -> Result<Startup, ConfigError> {
    let config = load_config(path)?;
    init_logging(&config.observability);

    tracing::info!(path = ?path, routes = config.routes.len(), "Configuration loaded");

    let table = build_table(&config)?;

    Ok(Startup { config, table })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;
    use std::sync::{Arc, Mutex};

    use tracing::field::{Field, Visit};
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::Layer;

    /// Collects the message of every event it sees.
    #[derive(Clone, Default)]
    struct Messages(Arc<Mutex<Vec<String>>>);

    impl<S: tracing::Subscriber> Layer<S> for Messages {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            let mut visitor = MessageVisitor(String::new());
            event.record(&mut visitor);
            self.0.lock().unwrap().push(visitor.0);
        }
    }

    struct MessageVisitor(String);

    impl Visit for MessageVisitor {
        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            if field.name() == "message" {
                self.0 = format!("{:?}", value);
            }
        }
    }

    const ROUTES: &str = r#"
[[routes]]
path = "/"
redirect = "/api"

[[routes]]
path = "/api"
name = "Api"
component = "Api"

[routes.meta]
label = "API客户端"
"#;

    #[test]
    fn test_configuration_load_is_logged_after_logging_init() {
        let path = std::env::temp_dir().join(format!("spa-router-startup-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, ROUTES).unwrap();

        let messages = Messages::default();
        let subscriber = tracing_subscriber::registry().with(messages.clone());

        tracing::subscriber::with_default(subscriber, || {
            load_config(&path).unwrap();
            assert!(messages.0.lock().unwrap().is_empty());

            let startup = start(&path).unwrap();
            assert_eq!(startup.table.len(), 2);
        });
        std::fs::remove_file(&path).unwrap();

        let seen = messages.0.lock().unwrap();
        assert_eq!(seen.iter().filter(|m| *m == "Configuration loaded").count(), 1);
    }
}
