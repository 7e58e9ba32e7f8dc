//! services/api/src/bin/openapi.rs
//!
//! Writes the OpenAPI document for the content generation API to disk without starting
//! the server. Usage: `openapi [OUTPUT]`, where `OUTPUT` defaults to `openapi.json`.

use content_api::{error::ApiError, web::rest::ApiDoc};
use std::path::{Path, PathBuf};
use utoipa::OpenApi;

const DEFAULT_OUTPUT: &str = "openapi.json";

/// Serializes `doc` and writes it to `output`, creating missing parent directories.
/// Returns the number of documented paths.
fn write_document(doc: &utoipa::openapi::OpenApi, output: &Path) -> Result<usize, ApiError> {
    let json = doc
        .to_pretty_json()
        .map_err(|e| ApiError::Internal(format!("Failed to serialize OpenAPI document: {e}")))?;

    if let Some(parent) = output.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(output, json)?;
    Ok(doc.paths.paths.len())
}

fn main() -> Result<(), ApiError> {
    let output = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

    let documented = write_document(&ApiDoc::openapi(), &output)?;
    println!(
        "OpenAPI document with {documented} paths written to {}",
        output.display()
    );
    Ok(())
}
