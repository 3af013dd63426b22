use anyhow::{bail, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use salis_common::{
    config::{
        DEFAULT_INITIAL_SUPPLY, DEFAULT_MAX_SUPPLY, DEFAULT_NDA_CONTENT, DEFAULT_TOKEN_NAME,
        DEFAULT_TOKEN_SYMBOL, VERSION,
    },
    crypto::{hash, Address, Hash},
    time::TimestampSeconds,
    token::{Amount, TokenParams},
};

/// Label hashed into the deployer address when none is configured
pub const DEFAULT_OWNER_LABEL: &str = "owner";

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_filter(&self) -> log::LevelFilter {
        match self {
            Self::Off => log::LevelFilter::Off,
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_name() -> String {
    DEFAULT_TOKEN_NAME.to_owned()
}

fn default_symbol() -> String {
    DEFAULT_TOKEN_SYMBOL.to_owned()
}

fn default_initial_supply() -> Amount {
    DEFAULT_INITIAL_SUPPLY
}

fn default_max_supply() -> Amount {
    DEFAULT_MAX_SUPPLY
}

#[derive(Debug, Clone, clap::Args, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Token name
    #[clap(long, default_value_t = default_name())]
    #[serde(default = "default_name")]
    pub name: String,
    /// Token symbol
    #[clap(long, default_value_t = default_symbol())]
    #[serde(default = "default_symbol")]
    pub symbol: String,
    /// Supply minted to the owner at deployment, in base units (18 decimals)
    #[clap(long, default_value_t = default_initial_supply())]
    #[serde(default = "default_initial_supply")]
    pub initial_supply: Amount,
    /// Initial supply cap, in base units
    #[clap(long, default_value_t = default_max_supply())]
    #[serde(default = "default_max_supply")]
    pub max_supply: Amount,
    /// Keccak-256 hash of the NDA document, hex encoded
    #[clap(long)]
    #[serde(default)]
    pub nda_hash: Option<Hash>,
    /// NDA document content, hashed with Keccak-256
    #[clap(long)]
    #[serde(default)]
    pub nda_content: Option<String>,
    /// Owner (deployer) address, hex encoded
    ///
    /// By default the address derived from the label "owner" is used, the
    /// same one a batch file refers to with that label.
    #[clap(long)]
    #[serde(default)]
    pub owner: Option<Address>,
}

impl TokenConfig {
    pub fn nda_hash(&self) -> Hash {
        match (&self.nda_hash, &self.nda_content) {
            (Some(nda_hash), _) => *nda_hash,
            (None, Some(content)) => hash(content.as_bytes()),
            (None, None) => hash(DEFAULT_NDA_CONTENT.as_bytes()),
        }
    }

    pub fn owner(&self) -> Address {
        self.owner
            .unwrap_or_else(|| Address::from_label(DEFAULT_OWNER_LABEL))
    }

    pub fn params(&self) -> TokenParams {
        TokenParams {
            name: self.name.clone(),
            symbol: self.symbol.clone(),
            initial_supply: self.initial_supply,
            max_supply: self.max_supply,
            nda_hash: self.nda_hash(),
        }
    }
}

#[derive(Debug, Parser, Serialize, Deserialize, Clone)]
#[clap(
    version = VERSION,
    about = "Salis Daemon - deploy a compliance-gated token ledger and replay calls against it"
)]
pub struct Config {
    /// Token deployment parameters
    #[clap(flatten)]
    pub token: TokenConfig,
    /// Set log level
    ///
    /// `RUST_LOG` overrides it when set.
    #[clap(long, value_enum, default_value_t)]
    #[serde(default)]
    pub log_level: LogLevel,
    /// Unix timestamp the replay clock starts at
    ///
    /// By default the current time is used.
    #[clap(long)]
    #[serde(default)]
    pub start_time: Option<TimestampSeconds>,
    /// JSON file containing the calls to replay
    #[clap(long)]
    #[serde(skip)]
    #[serde(default)]
    pub batch: Option<String>,
    /// Write the final report to this file instead of stdout
    #[clap(long)]
    #[serde(skip)]
    #[serde(default)]
    pub output: Option<String>,
    /// JSON file to load the configuration from
    #[clap(long)]
    #[serde(skip)]
    #[serde(default)]
    pub config_file: Option<String>,
    /// Generate the template at the `config_file` path
    #[clap(long)]
    #[serde(skip)]
    #[serde(default)]
    pub generate_config_template: bool,
}

impl Config {
    /// Check everything that can be rejected before deploying
    pub fn validate(&self) -> Result<()> {
        if self.token.nda_hash.is_some() && self.token.nda_content.is_some() {
            bail!("--nda-hash and --nda-content are mutually exclusive");
        }
        if self.token.owner.is_some_and(|owner| owner.is_zero()) {
            bail!("owner cannot be the zero address");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_deployment_defaults() {
        let config = Config::parse_from(["salis_daemon"]);
        assert_eq!(config.token.params(), TokenParams::default());
        assert_eq!(config.token.owner(), Address::from_label("owner"));
        assert_eq!(config.log_level, LogLevel::Info);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_nda_sources() {
        let config = Config::parse_from(["salis_daemon", "--nda-content", "Test NDA Content"]);
        assert_eq!(config.token.nda_hash(), hash(b"Test NDA Content"));

        let explicit = hash(b"other");
        let arg = explicit.to_hex();
        let config = Config::parse_from(["salis_daemon", "--nda-hash", arg.as_str()]);
        assert_eq!(config.token.nda_hash(), explicit);

        let config = Config::parse_from([
            "salis_daemon",
            "--nda-hash",
            arg.as_str(),
            "--nda-content",
            "x",
        ]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_json_round_trip_skips_runtime_flags() {
        let mut config = Config::parse_from(["salis_daemon", "--symbol", "TEST"]);
        config.batch = Some("calls.json".into());

        let json = serde_json::to_string_pretty(&config).unwrap();
        let loaded: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.token.symbol, "TEST");
        assert_eq!(loaded.token.max_supply, DEFAULT_MAX_SUPPLY);
        assert!(loaded.batch.is_none());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let loaded: Config = serde_json::from_str(r#"{"token": {"name": "TestToken"}}"#).unwrap();
        assert_eq!(loaded.token.name, "TestToken");
        assert_eq!(loaded.token.symbol, DEFAULT_TOKEN_SYMBOL);
        assert_eq!(loaded.token.initial_supply, DEFAULT_INITIAL_SUPPLY);
    }
}
