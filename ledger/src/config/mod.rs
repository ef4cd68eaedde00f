pub mod params;

use params::{DEFAULT_PARAMS, Params};
use std::ops::Deref;

/// Ledger configuration. Dereferences into [`Params`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub params: Params,

    /// Reject non-minimal CompactSize prefixes when decoding
    pub strict_canonical_decoding: bool,
}

impl Config {
    pub fn new(params: Params) -> Self {
        Self { params, strict_canonical_decoding: false }
    }

    pub fn to_builder(&self) -> ConfigBuilder {
        ConfigBuilder { config: self.clone() }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_PARAMS)
    }
}

impl AsRef<Params> for Config {
    fn as_ref(&self) -> &Params {
        &self.params
    }
}

impl Deref for Config {
    type Target = Params;

    fn deref(&self) -> &Self::Target {
        &self.params
    }
}

pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new(params: Params) -> Self {
        Self { config: Config::new(params) }
    }

    pub fn edit_params<F>(mut self, edit_func: F) -> Self
    where
        F: Fn(&mut Params),
    {
        edit_func(&mut self.config.params);
        self
    }

    pub fn apply_args<F>(mut self, edit_func: F) -> Self
    where
        F: Fn(&mut Config),
    {
        edit_func(&mut self.config);
        self
    }

    pub fn strict_decoding(mut self) -> Self {
        self.config.strict_canonical_decoding = true;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
