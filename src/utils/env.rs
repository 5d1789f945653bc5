// src/utils/env.rs
use log::debug;

/// Load variables from a `.env` file in the working directory (or a parent),
/// if one exists. Variables already set in the process environment win.
pub fn load_env() {
    match dotenv::dotenv() {
        Ok(path) => debug!("Loaded environment from {}", path.display()),
        Err(e) => debug!("No .env file loaded: {}", e),
    }
}
