//! Basic example of the Sanad DI container.
//!
//! Run with `RUST_LOG=sanad_container=debug` to watch registrations and
//! auto-registration as they happen.

use std::sync::Arc;

use sanad::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

// === Define your types ===

trait Logger: Send + Sync {
    fn log(&self, msg: &str);
}

struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn log(&self, msg: &str) {
        println!("[LOG] {msg}");
    }
}

struct Config {
    database_url: String,
}

struct Database {
    url: String,
    logger: Arc<dyn Logger>,
}

impl Database {
    fn query(&self, sql: &str) -> String {
        self.logger.log(&format!("Executing: {sql}"));
        format!("Results from {}", self.url)
    }
}

impl Injectable for Database {
    fn dependencies() -> Vec<Dependency> {
        vec![
            Dependency::of::<Config>(),
            Dependency::of::<Arc<dyn Logger>>(),
        ]
    }

    fn construct(args: Arguments) -> Result<Self> {
        let config = args.get::<Config>(0)?;
        let logger = args.get::<Arc<dyn Logger>>(1)?;
        Ok(Database {
            url: config.database_url.clone(),
            logger: (*logger).clone(),
        })
    }
}

struct UserService {
    db: Arc<Database>,
    audit: Option<Arc<AuditLog>>,
}

struct AuditLog;

impl UserService {
    fn get_user(&self, id: u64) -> String {
        if self.audit.is_some() {
            println!("[AUDIT] user {id} requested");
        }
        self.db.query(&format!("SELECT * FROM users WHERE id = {id}"))
    }
}

impl Injectable for UserService {
    fn dependencies() -> Vec<Dependency> {
        vec![
            Dependency::of::<Database>(),
            Optional::of(DependencyKey::of::<AuditLog>(), true).into(),
        ]
    }

    fn construct(args: Arguments) -> Result<Self> {
        Ok(UserService {
            db: args.get(0)?,
            audit: args.optional(1)?,
        })
    }
}

fn main() -> Result<()> {
    // Initialize tracing (logging)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sanad_container=debug")),
        )
        .init();

    // Declare what the container may build on its own
    let metadata = MetadataStore::new();
    metadata.declare::<Database>();
    let service = metadata.declare::<UserService>();

    let root = Container::builder().metadata(metadata).build();

    // Values the container cannot build are registered as instances
    root.register_instance(
        DependencyKey::of::<Config>(),
        Arc::new(Config {
            database_url: "postgres://localhost/myapp".to_string(),
        }),
    )?;
    root.register_instance(
        DependencyKey::of::<Arc<dyn Logger>>(),
        Arc::new(Arc::new(ConsoleLogger) as Arc<dyn Logger>),
    )?;

    // One child per request, each with its own UserService singleton.
    // The audit log only exists in the second one.
    let first = root.create_child();
    let second = root.create_child();
    second.register_instance(DependencyKey::of::<AuditLog>(), Arc::new(AuditLog))?;
    first.auto_register(&service, None)?;
    second.auto_register(&service, None)?;

    let a = first.resolve::<UserService>()?;
    let b = second.resolve::<UserService>()?;

    info!(same_database = Arc::ptr_eq(&a.db, &b.db), "Resolved user services");

    println!("{}", a.get_user(1));
    println!("{}", b.get_user(2));

    match first.resolve::<String>() {
        Ok(_) => println!("Unexpected: String resolved"),
        Err(e) => println!("\nExpected error:\n{e}"),
    }

    Ok(())
}
