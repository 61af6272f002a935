use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::{
    models::{EntityId, Period},
    resources::ResourceKind,
};

#[derive(Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to a feed config file (TOML). Without it, configuration comes from
    /// API_BASE_URL and the SERIES_FEED_* environment variables.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// What an entity identifier names; decides which external metric applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum EntityKind {
    City,
    Coin,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the cities the API serves
    Cities,

    /// Fetch a single resource for one entity
    Fetch {
        /// github, airquality, crypto or correlation
        resource: ResourceKind,

        /// Entity identifier (e.g. "bangalore", "bitcoin")
        entity: EntityId,

        /// Days of history: 7, 14, 30, 60 or 90
        #[arg(default_value = "30")]
        period: Period,

        /// Which metric a correlation is computed against
        #[arg(long = "against", value_enum, default_value = "city")]
        kind: EntityKind,
    },

    /// Fetch activity, the external metric and their correlation together
    Aggregate {
        #[arg(value_enum)]
        kind: EntityKind,

        entity: EntityId,

        #[arg(default_value = "30")]
        period: Period,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fetch() {
        let cli = Cli::try_parse_from([
            "series-feed",
            "fetch",
            "crypto",
            "Bitcoin",
            "14",
        ])
        .unwrap();
        match cli.command {
            Commands::Fetch {
                resource,
                entity,
                period,
                kind,
            } => {
                assert_eq!(resource, ResourceKind::Crypto);
                assert_eq!(entity.as_str(), "bitcoin");
                assert_eq!(period, Period::Fortnight);
                assert_eq!(kind, EntityKind::City);
            }
            _ => panic!("expected fetch"),
        }
    }

    #[test]
    fn correlation_can_target_coins() {
        let cli = Cli::try_parse_from([
            "series-feed",
            "fetch",
            "correlation",
            "bitcoin",
            "--against",
            "coin",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Fetch {
                kind: EntityKind::Coin,
                period: Period::Month,
                ..
            }
        ));
    }

    #[test]
    fn rejects_unsupported_period() {
        assert!(Cli::try_parse_from(["series-feed", "aggregate", "coin", "bitcoin", "45"]).is_err());
    }
}
