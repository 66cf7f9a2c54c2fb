use thiserror::Error;

#[derive(Error, Debug)]
pub enum EstimateError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid raster image: {0}")]
    Raster(String),

    #[error("PDF assembly failed: {0}")]
    Pdf(String),

    #[error("Failed to precache {assets} assets into {cache}: {reason}")]
    Precache {
        cache: String,
        assets: usize,
        reason: String,
    },
}
