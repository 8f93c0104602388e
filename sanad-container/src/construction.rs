//! Construction info: the activator and dependency list of a function.
//!
//! Computed once per function and cached. The cache may be shared by
//! a whole container tree (the default) or owned by a single container,
//! see [`ContainerSettings::share_construction_info`].
//!
//! [`ContainerSettings::share_construction_info`]: crate::settings::ContainerSettings::share_construction_info

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use tracing::trace;

use crate::activator::Activator;
use crate::function::Function;
use crate::metadata::MetadataProvider;
use crate::resolver::Dependency;

/// Shared, immutable empty parameter list.
static EMPTY_PARAMETERS: Lazy<Arc<[Dependency]>> = Lazy::new(|| Arc::from(Vec::new()));

/// Alternate source of parameter keys, consulted before metadata.
pub type ParameterInfoLocator = Arc<dyn Fn(&Function) -> Option<Vec<Dependency>> + Send + Sync>;

/// Keyed by [`Function::id`].
pub(crate) type ConstructionInfoCache = Arc<RwLock<HashMap<usize, Arc<ConstructionInfo>>>>;

pub(crate) fn new_cache() -> ConstructionInfoCache {
    Arc::new(RwLock::new(HashMap::new()))
}

/// Chains two locators: the first answer wins, even an empty list.
pub(crate) fn compose(first: ParameterInfoLocator, second: ParameterInfoLocator) -> ParameterInfoLocator {
    Arc::new(move |function: &Function| first(function).or_else(|| second(function)))
}

/// What `invoke` needs to build a function: how, and with what.
#[derive(Debug, Clone)]
pub struct ConstructionInfo {
    activator: Activator,
    keys: Arc<[Dependency]>,
}

impl ConstructionInfo {
    /// Derives the info for `function`.
    ///
    /// Order of precedence for the key list: the function's explicit
    /// `inject` list, then the locator chain, then declared parameter
    /// keys, then the empty list.
    pub(crate) fn derive(
        function: &Function,
        metadata: &dyn MetadataProvider,
        locator: Option<&ParameterInfoLocator>,
    ) -> Self {
        let activator = metadata.activator(function).unwrap_or_default();

        let keys = match function.injected() {
            Some(inject) => inject.keys(),
            None => locator
                .and_then(|locate| locate(function))
                .or_else(|| metadata.parameter_keys(function))
                .map(Arc::<[Dependency]>::from)
                .unwrap_or_else(|| EMPTY_PARAMETERS.clone()),
        };

        trace!(function = function.name(), %activator, keys = keys.len(), "Computed construction info");
        Self { activator, keys }
    }

    #[inline]
    pub fn activator(&self) -> Activator {
        self.activator
    }

    #[inline]
    pub fn keys(&self) -> &[Dependency] {
        &self.keys
    }

    /// Whether this info uses the shared empty parameter list.
    pub fn has_no_parameters(&self) -> bool {
        Arc::ptr_eq(&self.keys, &*EMPTY_PARAMETERS)
    }
}
