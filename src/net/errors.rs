use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("unexpected message during session establishment: {0}")]
    UnexpectedMessage(String),
    #[error("lost connection to seat {0}")]
    ConnectionLost(usize),
    #[error("host roster does not list this endpoint")]
    NotInRoster,
}
