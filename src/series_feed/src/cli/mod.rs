//! Command-line front end: fetch resources from the configured API and print
//! the resulting states as JSON.

pub mod commands;

use anyhow::{Context, bail};
use serde::Serialize;
use tracing::info;

use crate::{
    config::FeedConfig,
    fetcher::{FeedContext, FetchState},
    resources::{AirQuality, Correlation, CryptoPrice, GithubActivity, ResourceKind},
};

pub use commands::{Cli, Commands, EntityKind};

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => FeedConfig::from_path(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => FeedConfig::from_env().context("loading config from the environment")?,
    };
    info!(base_url = %config.api_base_url, policy = ?config.fallback_policy, mode = ?config.build_mode, "starting");
    let ctx = FeedContext::connect(config)?;

    match cli.command {
        Commands::Cities => print_json(&ctx.cities().await?),
        Commands::Fetch {
            resource,
            entity,
            period,
            kind,
        } => match (resource, kind) {
            (ResourceKind::Github, _) => {
                report(ctx.fetcher::<GithubActivity>(entity, period).fetch().await)
            }
            (ResourceKind::AirQuality, _) => {
                report(ctx.fetcher::<AirQuality>(entity, period).fetch().await)
            }
            (ResourceKind::Crypto, _) => {
                report(ctx.fetcher::<CryptoPrice>(entity, period).fetch().await)
            }
            (ResourceKind::Correlation, EntityKind::City) => report(
                ctx.fetcher::<Correlation<AirQuality>>(entity, period)
                    .fetch()
                    .await,
            ),
            (ResourceKind::Correlation, EntityKind::Coin) => report(
                ctx.fetcher::<Correlation<CryptoPrice>>(entity, period)
                    .fetch()
                    .await,
            ),
        },
        Commands::Aggregate {
            kind,
            entity,
            period,
        } => {
            let errors = match kind {
                EntityKind::City => {
                    let state = ctx.aggregate::<AirQuality>(entity, period).load().await;
                    print_json(&state)?;
                    state.errors
                }
                EntityKind::Coin => {
                    let state = ctx.aggregate::<CryptoPrice>(entity, period).load().await;
                    print_json(&state)?;
                    state.errors
                }
            };
            if !errors.is_empty() {
                bail!("{} resource(s) failed", errors.len());
            }
            Ok(())
        }
    }
}

/// Prints the state and turns a surfaced error into a non-zero exit.
fn report<T: Serialize>(state: FetchState<T>) -> anyhow::Result<()> {
    print_json(&state)?;
    match state.error {
        Some(error) => bail!(error),
        None => Ok(()),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
