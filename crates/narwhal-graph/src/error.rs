#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no graphical counterpart for element `{id}`")]
    MissingElement { id: String },
    #[error("edge `{edge}` references a port or node that does not exist")]
    DanglingEdge { edge: String },
    #[error("nested graph of `{id}` is not owned by that node")]
    OwnershipMismatch { id: String },
    #[error("container nesting below `{id}` exceeds the depth limit of {limit}")]
    NestingTooDeep { id: String, limit: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
