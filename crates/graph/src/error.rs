use thiserror::Error;

pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Graph build error: {0}")]
    BuildError(String),

    #[error("Invalid entry-point pattern: {0}")]
    InvalidEntryPattern(#[from] regex::Error),

    #[error("Parser error: {0}")]
    Parser(#[from] codescape_parser::ParserError),
}
