//! Guild configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::Path;

use guild_types::{GovernanceParams, Identity, Rank};
use guild_utils::LogFormat;

use crate::GuildError;

/// Configuration for a guild instance.
///
/// Can be loaded from a TOML file via [`GuildConfig::from_toml_file`] or
/// built programmatically (e.g. for tests). Governance parameters given here
/// are only the starting values; afterwards they change by proposal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildConfig {
    #[serde(default = "default_voting_period")]
    pub voting_period_secs: u64,

    /// Quorum in basis points of the snapshot total.
    #[serde(default = "default_quorum_bps")]
    pub quorum_bps: u64,

    #[serde(default = "default_order_delay")]
    pub order_delay_secs: u64,

    /// Treasury payout delay. Stored and governed here, enforced by the treasury.
    #[serde(default = "default_execution_delay")]
    pub execution_delay_secs: u64,

    /// Invite lifetime. Stored and governed here, enforced by the invite service.
    #[serde(default = "default_invite_expiry")]
    pub invite_expiry_secs: u64,

    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Identities bound to the gateway and to each role behind it.
    #[serde(default)]
    pub principals: Principals,

    /// Founding members, allocated ids 1..n in this order.
    #[serde(default)]
    pub genesis: Vec<GenesisMember>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principals {
    #[serde(default = "default_gateway")]
    pub gateway: Identity,
    #[serde(default = "default_order_engine")]
    pub order_engine: Identity,
    #[serde(default = "default_proposal_engine")]
    pub proposal_engine: Identity,
    #[serde(default = "default_invite_service")]
    pub invite_service: Identity,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisMember {
    pub identity: Identity,
    /// Rank name, e.g. "SSS" or "c".
    pub rank: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_voting_period() -> u64 {
    GovernanceParams::default().voting_period_secs
}

fn default_quorum_bps() -> u64 {
    GovernanceParams::default().quorum_bps
}

fn default_order_delay() -> u64 {
    GovernanceParams::default().order_delay_secs
}

fn default_execution_delay() -> u64 {
    GovernanceParams::default().execution_delay_secs
}

fn default_invite_expiry() -> u64 {
    GovernanceParams::default().invite_expiry_secs
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_gateway() -> Identity {
    Identity::new("guild.gateway")
}

fn default_order_engine() -> Identity {
    Identity::new("guild.orders")
}

fn default_proposal_engine() -> Identity {
    Identity::new("guild.proposals")
}

fn default_invite_service() -> Identity {
    Identity::new("guild.invites")
}

// ── Impl ───────────────────────────────────────────────────────────────

impl GuildConfig {
    /// Load and validate configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, GuildError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| GuildError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, GuildError> {
        let config: Self = toml::from_str(s).map_err(|e| GuildError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, GuildError> {
        toml::to_string_pretty(self).map_err(|e| GuildError::Config(e.to_string()))
    }

    pub fn params(&self) -> GovernanceParams {
        GovernanceParams {
            voting_period_secs: self.voting_period_secs,
            quorum_bps: self.quorum_bps,
            order_delay_secs: self.order_delay_secs,
            execution_delay_secs: self.execution_delay_secs,
            invite_expiry_secs: self.invite_expiry_secs,
        }
    }

    /// Genesis members with their ranks parsed.
    pub fn genesis_members(&self) -> Result<Vec<(Identity, Rank)>, GuildError> {
        self.genesis
            .iter()
            .map(|m| -> Result<_, GuildError> { Ok((m.identity.clone(), m.rank.parse::<Rank>()?)) })
            .collect()
    }

    /// Install the global tracing subscriber with the configured format and level.
    /// Returns `false` if one was already installed.
    pub fn init_tracing(&self) -> bool {
        guild_utils::init_tracing(self.log_format, &self.log_level)
    }

    /// Check parameter bounds, genesis ranks and principal shape.
    pub fn validate(&self) -> Result<(), GuildError> {
        if let Some((param, value)) = self.params().first_out_of_bounds() {
            let (min, max) = param.bounds();
            return Err(GuildError::Config(format!(
                "{param} = {value} outside bounds [{min}, {max}]"
            )));
        }
        self.genesis_members()?;
        let p = &self.principals;
        for principal in [&p.gateway, &p.order_engine, &p.proposal_engine, &p.invite_service] {
            if !principal.is_valid() {
                return Err(GuildError::Config(format!("malformed principal {principal:?}")));
            }
        }
        Ok(())
    }
}

impl Default for GuildConfig {
    fn default() -> Self {
        Self {
            voting_period_secs: default_voting_period(),
            quorum_bps: default_quorum_bps(),
            order_delay_secs: default_order_delay(),
            execution_delay_secs: default_execution_delay(),
            invite_expiry_secs: default_invite_expiry(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            principals: Principals::default(),
            genesis: Vec::new(),
        }
    }
}

impl Default for Principals {
    fn default() -> Self {
        Self {
            gateway: default_gateway(),
            order_engine: default_order_engine(),
            proposal_engine: default_proposal_engine(),
            invite_service: default_invite_service(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guild_types::ErrorKind;

    #[test]
    fn default_config_round_trips_through_toml() {
        let mut config = GuildConfig::default();
        config.genesis.push(GenesisMember {
            identity: Identity::new("founder"),
            rank: "SSS".to_string(),
        });
        let toml_str = config.to_toml_string().unwrap();
        let parsed = GuildConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed, config);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = GuildConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.params(), GovernanceParams::default());
        assert_eq!(config.log_format, LogFormat::Human);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.principals.gateway, Identity::new("guild.gateway"));
        assert!(config.genesis.is_empty());
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            quorum_bps = 3500
            log_format = "json"

            [principals]
            invite_service = "host.invites"

            [[genesis]]
            identity = "founder"
            rank = "sss"

            [[genesis]]
            identity = "second"
            rank = " a "
        "#;
        let config = GuildConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.quorum_bps, 3_500);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.principals.invite_service, Identity::new("host.invites"));
        assert_eq!(config.principals.order_engine, Identity::new("guild.orders"));
        assert_eq!(
            config.genesis_members().unwrap(),
            vec![(Identity::new("founder"), Rank::SSS), (Identity::new("second"), Rank::A)]
        );
    }

    #[test]
    fn out_of_bounds_parameter_is_rejected() {
        let err = GuildConfig::from_toml_str("quorum_bps = 0").unwrap_err();
        assert!(matches!(err, GuildError::Config(_)));
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn unknown_rank_is_rejected() {
        let toml = r#"
            [[genesis]]
            identity = "founder"
            rank = "Z"
        "#;
        let err = GuildConfig::from_toml_str(toml).unwrap_err();
        assert!(matches!(err, GuildError::Genesis(_)));
    }

    #[test]
    fn missing_file_returns_config_error() {
        let err = GuildConfig::from_toml_file("/nonexistent/guild.toml").unwrap_err();
        assert!(matches!(err, GuildError::Config(_)));
    }
}
