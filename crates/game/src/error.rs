use thiserror::Error;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("Terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),
}
