mod config;

use std::{
    fs,
    io::{self, Read},
    path::PathBuf,
    process::exit,
};

use edid::{Edid, EdidError};
use log::{debug, error, info, warn};
use thiserror::Error;

use crate::config::{ConfigError, DecodeConfig, load_config};

#[derive(Debug, Error)]
pub enum DecodeAppError {
    #[error("Couldn't read {0}: {1}")]
    Io(String, io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Couldn't decode the EDID: {0}")]
    Decode(#[from] EdidError),
    #[error("Couldn't serialize the decoded EDID: {0}")]
    Json(#[from] serde_json::Error),
}

/// Reads the blob from the file named by the first argument, or stdin.
fn read_blob(path: Option<PathBuf>) -> Result<Vec<u8>, DecodeAppError> {
    match path {
        Some(path) => {
            fs::read(&path).map_err(|e| DecodeAppError::Io(path.display().to_string(), e))
        }
        None => {
            let mut blob = Vec::new();
            io::stdin()
                .read_to_end(&mut blob)
                .map_err(|e| DecodeAppError::Io("stdin".to_string(), e))?;
            Ok(blob)
        }
    }
}

fn run(config: &DecodeConfig, path: Option<PathBuf>) -> Result<Edid, DecodeAppError> {
    let blob = read_blob(path)?;
    debug!("Read {} bytes", blob.len());

    let edid = edid::parse(&blob)?;
    info!(
        "Decoded EDID {}.{} with {} extension block(s)",
        edid.version,
        edid.revision,
        edid.extensions.len()
    );

    let json = if config.pretty {
        serde_json::to_string_pretty(&edid)?
    } else {
        serde_json::to_string(&edid)?
    };
    println!("{}", json);

    Ok(edid)
}

fn main() {
    // Logging isn't up yet, keep the error until it is
    let loaded = load_config();
    let config = loaded.as_ref().cloned().unwrap_or_default();

    env_logger::builder()
        .filter_level(config.level_filter())
        .parse_default_env()
        .init();

    if let Err(e) = loaded.map_err(DecodeAppError::from) {
        error!("{}, using defaults", e);
    }

    let path = std::env::args_os().nth(1).map(PathBuf::from);
    match run(&config, path) {
        Ok(edid) => {
            if let Some(failures) = edid.failure_msg.as_deref() {
                warn!("The EDID does not conform");
                if config.print_failures {
                    eprint!("{}", failures);
                }
            }
        }
        Err(e) => {
            error!("{}", e);
            exit(1);
        }
    }
}
