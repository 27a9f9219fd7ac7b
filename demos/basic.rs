//! Basic example of the wiring DI container.
//!
//! Run with `RUST_LOG=wiring_container=trace cargo run --example basic` to
//! watch every resolution step.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use wiring::{Container, Injectable, Result, Symbol, Token, TokenContainer};

// === Define your traits and types ===

trait Logger: Send + Sync {
    fn log(&self, msg: &str);
}

#[derive(Injectable)]
struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn log(&self, msg: &str) {
        println!("[LOG] {msg}");
    }
}

wiring::implements!(ConsoleLogger => dyn Logger);
wiring::injectable!(dyn Logger);

struct Config {
    database_url: String,
}

wiring::injectable!(Config);

#[derive(Injectable)]
struct Database {
    config: Arc<Config>,
    logger: Arc<dyn Logger>,
}

impl Database {
    fn query(&self, sql: &str) -> String {
        self.logger.log(&format!("Executing: {sql}"));
        format!("Results from {}", self.config.database_url)
    }
}

#[derive(Injectable)]
struct UserRepository {
    db: Arc<Database>,
}

impl UserRepository {
    fn find_user(&self, id: u64) -> String {
        self.db.query(&format!("SELECT * FROM users WHERE id = {id}"))
    }
}

#[derive(Injectable)]
#[injectable(supports_only)]
struct UserController {
    repo: Arc<UserRepository>,
    logger: Arc<dyn Logger>,
}

impl UserController {
    fn get_user(&self, id: u64) -> String {
        self.logger.log(&format!("Getting user {id}"));
        self.repo.find_user(id)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("wiring_container=debug")),
        )
        .init();

    // Direct API: keys are types.
    let container = Container::new();
    container.register_instance::<Config>(Config {
        database_url: "postgres://localhost/myapp".to_string(),
    });
    container.register_singleton_as::<dyn Logger, ConsoleLogger>()?;
    container.register_singleton::<Database>()?;
    container.register_transient::<UserRepository>()?;
    container.register_transient::<UserController>()?;
    container.validate()?;

    let controller = container.resolve::<UserController>()?;
    println!("{}", controller.get_user(42));

    let again = container.resolve::<UserController>()?;
    println!(
        "controllers distinct: {}, database shared: {}",
        !Arc::ptr_eq(&controller, &again),
        Arc::ptr_eq(&controller.repo.db, &again.repo.db)
    );

    // Token API: keys are names, bindings are committed explicitly.
    let tokens = TokenContainer::new();
    tokens
        .register::<dyn Logger>(Symbol::new("ILogger"))?
        .to::<ConsoleLogger>()
        .as_singleton()
        .commit()?;
    tokens
        .register::<ConsoleLogger>(Token::class::<ConsoleLogger>())?
        .to_self()
        .commit()?;

    let logger = tokens.resolve::<dyn Logger>(Symbol::new("ILogger"))?;
    logger.log("resolved through a symbol token");

    let merged = tokens.merge(&TokenContainer::new());
    tracing::info!(bindings = merged.len(), "Merged token container");

    Ok(())
}
