use std::process::ExitCode;

use clap::Args;
use directory_resolver_sdk::IdentityDirectory;

use crate::common::{CommonArgs, print_lookup};

#[derive(Args)]
pub struct LookupNameArgs {
    /// Login name
    pub name: String,
}

impl LookupNameArgs {
    pub fn run(&self, common: &CommonArgs) -> anyhow::Result<ExitCode> {
        let (config, bridge) = common.bridge()?;
        let lookup = bridge.resolve_by_name(&self.name)?;
        Ok(print_lookup(lookup, &config, common.json))
    }
}

#[derive(Args)]
pub struct LookupIdArgs {
    /// Numeric user id
    pub uid: u32,
}

impl LookupIdArgs {
    pub fn run(&self, common: &CommonArgs) -> anyhow::Result<ExitCode> {
        let (config, bridge) = common.bridge()?;
        let lookup = bridge.resolve_by_id(self.uid)?;
        Ok(print_lookup(lookup, &config, common.json))
    }
}
