use crate::graph::VertexId;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("a component must contain at least one vertex")]
    EmptyComponent,
    #[error("vertex {id} is not part of the graph")]
    UnknownVertex { id: VertexId },
    #[error("invalid layout option `{name}`: {reason}")]
    InvalidOption { name: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
