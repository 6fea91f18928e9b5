// MemberDB server entrypoint
//
// Parses CLI arguments, loads configuration, wires the sqlx-backed
// repositories and live tenant connector into the application state and
// runs the HTTP server. The `keygen` subcommand writes a fresh transport
// private key and exits.

mod config;
mod logging;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use actix_web::{middleware, web, App, HttpServer};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use memberdb_api::{actions, configure_routes, AppState};
use memberdb_auth::cipher::{generate_private_key_pem, CredentialCipher, KEY_BITS};
use memberdb_core::oracle::{CompletionOracle, OracleConfig};
use memberdb_store::memberships::bootstrap;
use memberdb_store::{
    PgMembershipRepository, PgMetadataRepository, PgTenantConnector, PgTenantDatabaseRepository,
};

use config::ServerConfig;

#[derive(Parser)]
#[command(name = "memberdb", about = "Multi-tenant membership service")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Run embedded migrations (and the bootstrap seed, if configured)
    /// before serving
    #[arg(long)]
    migrate: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a fresh transport private key (PKCS#8 PEM)
    Keygen {
        #[arg(long, default_value = "encryption_private_key.pem")]
        out: PathBuf,
    },
}

#[actix_web::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(Command::Keygen { out }) = cli.command {
        return keygen(&out);
    }

    let config = match ServerConfig::from_file(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!(
                "warning: could not load {} ({e}), using defaults",
                cli.config.display()
            );
            ServerConfig::default()
        }
    };

    logging::init_logging(
        &config.logging.level,
        config.logging.file_path.as_deref(),
        config.logging.log_to_console,
        &config.logging.format,
    )?;

    info!("starting memberdb v{}", env!("CARGO_PKG_VERSION"));
    info!("host={} port={}", config.server.host, config.server.port);

    // Process-wide system store pool; torn down when the server exits.
    let pool = memberdb_store::connect(
        &config.store.url,
        config.store.max_connections,
        Duration::from_secs(config.store.acquire_timeout_seconds),
    )
    .await?;
    info!("system store pool ready ({} max)", config.store.max_connections);

    if cli.migrate {
        memberdb_store::run_migrations(&pool).await?;
        info!("migrations applied");

        if let Some(seed) = &config.bootstrap {
            let permissions: Vec<String> =
                actions::ALL.iter().map(|a| actions::permission_for(a)).collect();
            bootstrap::ensure_role(&pool, &seed.admin_role, &permissions).await?;
            bootstrap::ensure_membership(
                &pool,
                &seed.admin_username,
                &seed.admin_password,
                &seed.admin_role,
            )
            .await?;
            info!("bootstrap seed ensured for role '{}'", seed.admin_role);
        }
    }

    let cipher = CredentialCipher::from_pem_file(config.encryption.private_key_path.as_ref())
        .context("loading transport private key")?;

    let oracle = CompletionOracle::new(OracleConfig {
        api_key: config.oracle.api_key.clone(),
        base_url: config.oracle.base_url.clone(),
        model: config.oracle.model.clone(),
        request_timeout: Duration::from_secs(config.oracle.request_timeout_seconds),
    })?;

    let state = web::Data::new(AppState::new(
        Arc::new(PgMembershipRepository::new(pool.clone())),
        Arc::new(PgTenantDatabaseRepository::new(pool.clone())),
        Arc::new(PgMetadataRepository::new(pool.clone())),
        Arc::new(PgTenantConnector::new(Duration::from_secs(
            config.tenant.connect_timeout_seconds,
        ))),
        Arc::new(oracle),
        cipher,
    ));

    let bind_addr = (config.server.host.clone(), config.server.port);
    let workers = if config.server.workers == 0 {
        num_cpus::get()
    } else {
        config.server.workers
    };
    let max_blocking = config.server.worker_max_blocking_threads;

    info!("listening on {}:{} with {workers} workers", bind_addr.0, bind_addr.1);

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure_routes)
    })
    .bind(bind_addr)?
    .workers(workers)
    .worker_max_blocking_threads(max_blocking)
    .run()
    .await?;

    info!("server shutdown complete");
    pool.close().await;
    Ok(())
}

fn keygen(out: &PathBuf) -> Result<()> {
    let pem = generate_private_key_pem(KEY_BITS)?;
    std::fs::write(out, pem.as_bytes())
        .with_context(|| format!("writing {}", out.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(out, std::fs::Permissions::from_mode(0o600))?;
    }

    println!("wrote private key to {}", out.display());
    Ok(())
}
