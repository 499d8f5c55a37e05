#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Graph(#[from] narwhal_graph::Error),
    #[error("invalid layout options: {0}")]
    InvalidOptions(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
