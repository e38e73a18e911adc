use std::io;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("required collaborator `{0}` was not provided")]
    MissingCollaborator(&'static str),

    #[error("invalid calibration grid: {0}")]
    Calibration(String),

    #[error("vehicle initialization failed: {0}")]
    VehicleInit(String),

    #[error("config parse error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}
