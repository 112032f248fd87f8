pub mod read;
pub mod write;

use crate::cli::ConnectionArgs;
use crate::state::AppState;
use anyhow::Result;
use std::sync::Arc;

fn open_state(connection: ConnectionArgs) -> Result<Arc<AppState>> {
    let config = Arc::new(connection.into_config()?);
    Ok(Arc::new(AppState::new(config)?))
}
