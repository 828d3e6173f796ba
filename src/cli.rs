use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "kgrep")]
#[command(version)]
#[command(about = "kgrep - Search and analyze logs and resources in Kubernetes")]
#[command(
    long_about = "kgrep is a command-line utility designed to simplify the process of searching and analyzing logs and resources in Kubernetes."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Kubernetes context to use instead of the current one
    #[arg(long, global = true)]
    pub context: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Search Pods in Kubernetes
    Pods(ScopedArgs),

    /// Search ConfigMaps in Kubernetes
    #[command(name = "configmaps")]
    ConfigMaps(ScopedArgs),

    /// Search Secrets in Kubernetes
    Secrets(ScopedArgs),

    /// Search ServiceAccounts in Kubernetes
    #[command(name = "serviceaccounts")]
    ServiceAccounts(ScopedArgs),

    /// Search Generic Resources in Kubernetes
    Resources(ResourcesArgs),

    /// Search logs in Kubernetes
    Logs(LogsArgs),

    /// Show detailed version information
    Version,
}

#[derive(Args, Debug, Clone)]
pub struct ScopedArgs {
    /// grep search pattern
    #[arg(short, long)]
    pub pattern: String,

    /// The Kubernetes namespace
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// If present, list the requested object(s) across all namespaces
    #[arg(short = 'A', long)]
    pub all_namespaces: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ResourcesArgs {
    /// Resource kind (e.g., Pod, Deployment)
    #[arg(short, long)]
    pub kind: String,

    /// API version (e.g., v1, apps/v1). If not provided, will be auto-discovered.
    #[arg(long)]
    pub api_version: Option<String>,

    #[command(flatten)]
    pub scope: ScopedArgs,
}

#[derive(Args, Debug, Clone)]
pub struct LogsArgs {
    /// grep search pattern
    #[arg(short, long)]
    pub pattern: String,

    /// The Kubernetes namespace(s), comma-separated
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// Only pods whose name contains this value
    #[arg(short, long)]
    pub resource: Option<String>,

    /// Sort by: timestamp, message, pod_and_container
    #[arg(short, long, default_value = "timestamp")]
    pub sort_by: String,
}
