use command_engine::{Session, SessionError};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::config::{resolve_loop_config, resolve_session_config, ConfigError, LoopConfig};

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to build session: {0}")]
    Session(#[from] SessionError),
}

pub(crate) struct AppWiring {
    pub(crate) session: Session,
    pub(crate) loop_config: LoopConfig,
}

pub(crate) fn build_app() -> Result<AppWiring, AppError> {
    init_tracing();
    info!("=== Command Demo Startup ===");

    let session_config = resolve_session_config()?;
    let loop_config = resolve_loop_config()?;
    let session = Session::from_config(&session_config)?;

    Ok(AppWiring {
        session,
        loop_config,
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
