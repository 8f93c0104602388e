//! # Sanad, a hierarchical dependency injection container for Rust
//!
//! Containers form a tree: a child resolves what it knows and hands the
//! rest to its parent, and the root builds anything its metadata can
//! describe. Registration strategies decide where an instance lives,
//! resolvers decide how an argument is looked up.
//!
//! ```
//! use sanad::prelude::*;
//! use std::sync::Arc;
//!
//! struct Config { name: &'static str }
//! struct Greeter { config: Arc<Config> }
//!
//! impl Injectable for Config {
//!     fn construct(_: Arguments) -> Result<Self> {
//!         Ok(Config { name: "sanad" })
//!     }
//! }
//!
//! impl Injectable for Greeter {
//!     fn dependencies() -> Vec<Dependency> {
//!         vec![Dependency::of::<Config>()]
//!     }
//!     fn construct(args: Arguments) -> Result<Self> {
//!         Ok(Greeter { config: args.get(0)? })
//!     }
//! }
//!
//! let metadata = MetadataStore::new();
//! metadata.declare::<Config>();
//! let greeter = metadata.declare::<Greeter>();
//! metadata.transient(greeter.key(), None);
//!
//! let root = Container::builder().metadata(metadata).build();
//! let request = root.create_child();
//!
//! let a = request.resolve::<Greeter>().unwrap();
//! let b = request.resolve::<Greeter>().unwrap();
//! assert!(!Arc::ptr_eq(&a, &b));
//! assert!(Arc::ptr_eq(&a.config, &b.config));
//! assert_eq!(a.config.name, "sanad");
//! ```

pub use sanad_container::*;
pub use sanad_support::*;
