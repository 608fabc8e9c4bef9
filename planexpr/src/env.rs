//! The explicit context object.
//!
//! An [`Environment`] owns the managers of one modelling session. Nothing is global: two
//! environments never share types or expressions, and dropping an environment releases all of
//! them.
use log::debug;

use crate::{
    config::EnvironmentConfig, expr::manager::ExpressionManager, free_vars::FreeVarsOracle,
    types::TypeManager,
};

pub struct Environment {
    config: EnvironmentConfig,
    expression_manager: ExpressionManager,
    free_vars_oracle: FreeVarsOracle,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    /// An environment with the default configuration.
    pub fn new() -> Self {
        Self::with_config(EnvironmentConfig::default())
    }

    pub fn with_config(config: EnvironmentConfig) -> Self {
        let types = TypeManager::with_rules(config.compatibility);
        let expression_manager = ExpressionManager::with_type_manager(types);
        debug!(
            "Created environment #{} with {:?}.",
            expression_manager.manager_id(),
            config
        );
        Self {
            config,
            expression_manager,
            free_vars_oracle: FreeVarsOracle::new(),
        }
    }

    #[inline]
    pub fn config(&self) -> &EnvironmentConfig {
        &self.config
    }

    #[inline]
    pub fn type_manager(&self) -> &TypeManager {
        self.expression_manager.types()
    }

    #[inline]
    pub fn expression_manager(&self) -> &ExpressionManager {
        &self.expression_manager
    }

    #[inline]
    pub fn free_vars_oracle(&self) -> &FreeVarsOracle {
        &self.free_vars_oracle
    }
}
