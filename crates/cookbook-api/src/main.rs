//! CLI entry point for the Cookbook recipe graph.

use clap::{Parser, Subcommand};
use tokio::io::AsyncReadExt;
use tracing_subscriber::{fmt, EnvFilter};

use cookbook_api::{dispatch, Request, RequestContext, Resolvers, Response, ServiceConfig};
use cookbook_auth::CredentialService;
use cookbook_core::ApiError;
use cookbook_graph::{GraphClient, MemoryGraph, RecipeStore};

#[derive(Parser)]
#[command(name = "cookbook")]
#[command(about = "Recipe catalog on a property graph")]
struct Cli {
    /// Config file prefix (default: cookbook).
    #[arg(short, long, default_value = "cookbook")]
    config: String,

    /// Use an empty in-process graph instead of Neo4j.
    #[arg(long, global = true)]
    in_memory: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the uniqueness constraints in Neo4j.
    InitSchema,
    /// Run JSON requests read from stdin; one JSON reply per line on stdout.
    Exec {
        /// Bearer token for operations that require identity.
        #[arg(long)]
        token: Option<String>,
    },
    /// Check that the store is reachable.
    Ping,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();
    let settings = ServiceConfig::load(&cli.config)?;

    if cli.in_memory {
        if let Command::InitSchema = cli.command {
            anyhow::bail!("init-schema needs Neo4j; drop --in-memory");
        }
        tracing::info!("Using in-memory graph");
        return run(MemoryGraph::new(), &settings, cli.command).await;
    }

    let graph = GraphClient::connect(&settings.neo4j).await?;
    if let Command::InitSchema = cli.command {
        graph.ensure_constraints().await?;
        return Ok(());
    }
    run(graph, &settings, cli.command).await
}

async fn run<S: RecipeStore>(
    store: S,
    settings: &ServiceConfig,
    command: Command,
) -> anyhow::Result<()> {
    match command {
        Command::Ping => {
            store.health_check().await?;
            tracing::info!("Store is reachable");
            Ok(())
        }
        Command::Exec { token } => {
            let credentials = CredentialService::from_config(&settings.auth)?;
            let resolvers = Resolvers::new(store, credentials);
            let header = token.map(|t| format!("Bearer {t}"));
            let ctx = resolvers.context(header.as_deref());
            exec(&resolvers, &ctx).await
        }
        Command::InitSchema => anyhow::bail!("init-schema is handled before a store is chosen"),
    }
}

/// Execute every request on stdin in order, printing one reply per request.
async fn exec<S: RecipeStore>(resolvers: &Resolvers<S>, ctx: &RequestContext) -> anyhow::Result<()> {
    let mut input = String::new();
    tokio::io::stdin().read_to_string(&mut input).await?;

    for parsed in serde_json::Deserializer::from_str(&input).into_iter::<Request>() {
        let response = match parsed {
            Ok(request) => Response::from(dispatch(resolvers, ctx, request).await),
            Err(e) => {
                let response = Response::Error(
                    ApiError::Validation(format!("Malformed request: {e}")).to_body(),
                );
                println!("{}", serde_json::to_string(&response)?);
                break;
            }
        };
        println!("{}", serde_json::to_string(&response)?);
    }
    Ok(())
}
