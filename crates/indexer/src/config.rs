use crate::cli::Cli;
use anyhow::{ensure, Context};
use devhub_primitives::AccountId;
use devhub_processor::{Contract, Method};
use serde::Deserialize;
use std::path::Path;
use url::Url;


#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct IndexerConfig {
    #[serde(default = "default_contract")]
    pub contract: AccountId,
    #[serde(default = "default_methods")]
    pub methods: Vec<Method>,
    #[serde(default)]
    pub hasura: HasuraConfig
}


#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct HasuraConfig {
    pub url: Option<Url>,
    pub role: Option<String>,
    #[serde(default)]
    pub table_prefix: String,
    pub admin_secret: Option<String>
}


fn default_contract() -> AccountId {
    Contract::default().account_id
}


fn default_methods() -> Vec<Method> {
    Contract::default().methods
}


impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            contract: default_contract(),
            methods: default_methods(),
            hasura: HasuraConfig::default()
        }
    }
}


impl IndexerConfig {
    pub fn read_config_file(file: &Path) -> anyhow::Result<Self> {
        let reader = std::io::BufReader::new(
            std::fs::File::open(file).with_context(|| format!("failed to open {}", file.display()))?
        );
        let config = serde_yaml::from_reader(reader)
            .with_context(|| format!("failed to parse {}", file.display()))?;
        Ok(config)
    }

    /// Reads the config file if one was given and applies command line overrides
    pub fn load(args: &Cli) -> anyhow::Result<Self> {
        let mut config = match args.config.as_ref() {
            Some(file) => Self::read_config_file(file)?,
            None => Self::default()
        };
        config.apply_overrides(args);
        config.validate()?;
        Ok(config)
    }

    fn apply_overrides(&mut self, args: &Cli) {
        if let Some(url) = args.graphql_url.as_ref() {
            self.hasura.url = Some(url.clone());
        }
        if let Some(role) = args.hasura_role.as_ref() {
            self.hasura.role = Some(role.clone());
        }
        if let Some(prefix) = args.table_prefix.as_ref() {
            self.hasura.table_prefix = prefix.clone();
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(!self.contract.is_empty(), "contract account id can't be empty");
        ensure!(!self.methods.is_empty(), "method allow-list can't be empty");
        Ok(())
    }

    pub fn contract(&self) -> Contract {
        Contract::new(self.contract.clone(), self.methods.clone())
    }
}
