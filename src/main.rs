mod cli;
mod error;
mod fetcher;
mod kubernetes;
mod log_grepper;
mod matcher;
mod resolver;
mod searcher;
mod serializer;
#[cfg(test)]
mod tests;
mod types;
mod utils;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::debug;

use cli::{Cli, Command, LogsArgs, ResourcesArgs, ScopedArgs};
use kubernetes::{KubeCluster, PodLogReader};
use log_grepper::{LogGrepper, SortKey};
use resolver::{CoreKind, ResolutionMode};
use searcher::{NamespaceScope, Searcher};
use utils::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so search results on stdout stay clean
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let context = cli.context.as_deref();
    match &cli.command {
        Command::Pods(args) => run_core_search(CoreKind::Pod, args, context, "pods").await,
        Command::ConfigMaps(args) => {
            run_core_search(CoreKind::ConfigMap, args, context, "configmaps").await
        }
        Command::Secrets(args) => {
            run_core_search(CoreKind::Secret, args, context, "secrets").await
        }
        Command::ServiceAccounts(args) => {
            run_core_search(CoreKind::ServiceAccount, args, context, "serviceaccounts").await
        }
        Command::Resources(args) => run_resources(args, context).await,
        Command::Logs(args) => run_logs(args, context).await,
        Command::Version => {
            println!("{}", version_info());
            Ok(())
        }
    }
}

async fn run_core_search(
    kind: CoreKind,
    args: &ScopedArgs,
    context: Option<&str>,
    label: &str,
) -> anyhow::Result<()> {
    run_search(ResolutionMode::CoreKind(kind), args, context)
        .await
        .with_context(|| format!("failed to search {}", label))
}

async fn run_resources(args: &ResourcesArgs, context: Option<&str>) -> anyhow::Result<()> {
    let mode = ResolutionMode::new(&args.kind, args.api_version.as_deref());
    run_search(mode, &args.scope, context)
        .await
        .context("failed to search resources")
}

async fn run_search(
    mode: ResolutionMode,
    args: &ScopedArgs,
    context: Option<&str>,
) -> anyhow::Result<()> {
    // Flag validation happens before anything touches the cluster
    if args.pattern.is_empty() {
        anyhow::bail!("pattern is required");
    }
    NamespaceScope::from_flags(args.namespace.as_deref(), args.all_namespaces)?;

    let cluster = Arc::new(KubeCluster::connect(context).await?);
    let mut searcher = Searcher::new(cluster, mode);
    let outcome = searcher
        .search_scoped(
            args.namespace.as_deref(),
            args.all_namespaces,
            &args.pattern,
        )
        .await?;

    log_skipped(&outcome.skipped);
    print_occurrences(&outcome.occurrences, &args.pattern);
    Ok(())
}

async fn run_logs(args: &LogsArgs, context: Option<&str>) -> anyhow::Result<()> {
    if args.pattern.is_empty() {
        anyhow::bail!("pattern is required");
    }
    let namespaces = match &args.namespace {
        Some(raw) if !raw.is_empty() => parse_namespace_list(raw)?,
        _ => Vec::new(),
    };
    let sort = SortKey::parse(&args.sort_by);

    let cluster = KubeCluster::connect(context)
        .await
        .context("failed to create log grepper")?;
    let reader = Arc::new(PodLogReader::new(cluster.client()));
    let grepper = LogGrepper::new(Arc::new(cluster), reader);

    let outcome = grepper
        .grep_namespaces(&namespaces, args.resource.as_deref(), &args.pattern, &sort)
        .await?;

    log_skipped(&outcome.skipped);
    print_messages(&outcome.messages, &args.pattern);
    Ok(())
}

fn log_skipped(skipped: &[types::Skipped]) {
    for s in skipped {
        debug!(
            "Skipped {}{}: {}",
            s.namespace.as_deref().map(|ns| format!("{}/", ns)).unwrap_or_default(),
            s.name,
            s.reason
        );
    }
}
