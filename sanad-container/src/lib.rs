//! Core container implementation for Sanad DI.
//!
//! A [`Container`] maps [`DependencyKey`]s to handlers. Functions are
//! described to it through a [`MetadataProvider`]; resolvers, registration
//! strategies and activators customize how keys become instances.

pub mod activator;
pub mod construction;
pub mod container;
pub mod error;
pub mod function;
pub mod key;
pub mod metadata;
mod path;
pub mod registration;
pub mod registry;
pub mod resolver;
pub mod settings;

pub use activator::Activator;
pub use construction::{ConstructionInfo, ParameterInfoLocator};
pub use container::{Container, ContainerBuilder, prelude};
pub use error::{Result, SanadError};
pub use function::{Arguments, Function, Inject, Injectable, Instance};
pub use key::DependencyKey;
pub use metadata::{MetadataProvider, MetadataStore};
pub use registration::{Registration, SingletonRegistration, TransientRegistration};
pub use registry::Handler;
pub use resolver::{All, Dependency, Lazy, LazyInstance, Optional, Parent, Resolver};
pub use settings::ContainerSettings;
