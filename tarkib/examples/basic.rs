//! Basic example of the Tarkib container.
//!
//! Wires a small application graph from a JSON configuration snapshot:
//! a preference redirects `Logger` to `ConsoleLogger`, `Database` is a
//! shared singleton, and `CachedUserRepo` is a virtual type building
//! `UserRepo` with a preset `ttl`.

use std::sync::Arc;

use tarkib::prelude::*;

struct ConsoleLogger;

impl ConsoleLogger {
    fn log(&self, msg: &str) {
        println!("[LOG] {msg}");
    }
}

struct Database {
    url: String,
    logger: Arc<ConsoleLogger>,
}

impl Database {
    fn query(&self, sql: &str) -> String {
        self.logger.log(&format!("executing: {sql}"));
        format!("results from {}", self.url)
    }
}

struct UserRepo {
    ttl: i64,
    db: Arc<Database>,
}

impl UserRepo {
    fn find_user(&self, id: u64) -> String {
        self.db
            .query(&format!("SELECT * FROM users WHERE id = {id} /* ttl={} */", self.ttl))
    }
}

const CONFIG: &str = r#"{
    "preferences": { "Logger": "ConsoleLogger" },
    "virtual_types": {
        "CachedUserRepo": {
            "type": "UserRepo",
            "arguments": { "ttl": { "kind": "scalar", "value": 60 } }
        }
    },
    "types": {
        "ConsoleLogger": { "shared": true },
        "Database": {
            "shared": true,
            "arguments": {
                "url": { "kind": "scalar", "value": "postgres://localhost/myapp" }
            }
        }
    }
}"#;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("tarkib_container=debug")
        .init();

    let config: ContainerConfig = serde_json::from_str(CONFIG).expect("invalid config snapshot");

    let container = Container::builder()
        .config(config)
        .factory::<ConsoleLogger, _>("ConsoleLogger", vec![], |_| Ok(ConsoleLogger))
        .factory::<Database, _>(
            "Database",
            vec![
                ParamSpec::value("url"),
                ParamSpec::object("logger", "Logger"),
            ],
            |args| {
                Ok(Database {
                    url: args.str("url")?.to_string(),
                    logger: args.object::<ConsoleLogger>("logger")?,
                })
            },
        )
        .factory::<UserRepo, _>(
            "UserRepo",
            vec![
                ParamSpec::value("ttl"),
                ParamSpec::object("db", "Database"),
            ],
            |args| {
                Ok(UserRepo {
                    ttl: args.i64("ttl")?,
                    db: args.object::<Database>("db")?,
                })
            },
        )
        .method::<UserRepo, String, _>("find_user", vec![ParamSpec::value("id")], |repo, args| {
            Ok(repo.find_user(args.i64("id")? as u64))
        })
        .build();

    println!("{container:?}");

    // A virtual type: UserRepo with ttl preset to 60.
    let repo = container.create_as::<UserRepo>("CachedUserRepo", ArgumentSet::new())?;
    println!("{}", repo.find_user(42));

    // Two fresh repos share one Database, because Database is shared.
    let other = container.create_as::<UserRepo>("CachedUserRepo", ArgumentSet::new())?;
    assert!(Arc::ptr_eq(&repo.db, &other.db));

    // invoke() calls a registered method on an erased instance.
    let erased = container.create("CachedUserRepo", ArgumentSet::new())?;
    let answer = container.invoke(&erased, "find_user", ArgumentSet::new().with_scalar("id", 7))?;
    println!("{}", answer.downcast::<String>().expect("find_user returns String"));

    Ok(())
}
