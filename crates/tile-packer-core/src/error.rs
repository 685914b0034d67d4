use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TilePackerError {
    #[error("Wrong parameters: {0}")]
    WrongParameters(String),
    #[error("Out of memory while allocating packer storage")]
    NoMemory,
    #[error("Tile index {index} out of range (session holds {len} tiles)")]
    TileIndexOutOfRange { index: usize, len: usize },
    #[error("Tile {0} is not packed")]
    TileNotPacked(usize),
}

impl From<std::collections::TryReserveError> for TilePackerError {
    fn from(_: std::collections::TryReserveError) -> Self {
        TilePackerError::NoMemory
    }
}

pub type Result<T> = std::result::Result<T, TilePackerError>;
