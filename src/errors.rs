use std::fmt;

/// Convenience alias used throughout the library.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors surfaced by this library.
///
/// `Io` and `Protocol` leave the connection broken; `Server` does not, since
/// the server finished the query cleanly at the protocol level before
/// reporting it.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Socket failure, including end-of-stream in the middle of a packet.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// The peer sent bytes this client cannot make sense of.
    #[error("protocol error: {0}")]
    Protocol(String),
    /// An exception chain the server sent in place of results.
    #[error(transparent)]
    Server(#[from] ServerError),
    /// The client was used in a way the wire cannot express.
    #[error("client error: {0}")]
    Client(String),
}

/// One frame of a server-side exception chain.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("[{code}] {name}: {message}")]
pub struct Exception {
    pub code:        i32,
    pub name:        String,
    pub message:     String,
    pub stack_trace: String,
}

/// An exception received from the server.
///
/// The server sends these as a chain; `head` is the proximate cause and
/// `nested` holds the causes it wrapped, outermost first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerError {
    pub head:   Exception,
    pub nested: Vec<Exception>,
}

impl ServerError {
    /// Error code of the proximate cause.
    pub fn code(&self) -> i32 { self.head.code }

    /// All frames of the chain, head first.
    pub fn chain(&self) -> impl Iterator<Item = &Exception> {
        std::iter::once(&self.head).chain(self.nested.iter())
    }
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.head)?;
        if !self.nested.is_empty() {
            write!(f, " (+{} nested)", self.nested.len())?;
        }
        Ok(())
    }
}

impl std::error::Error for ServerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.nested.first().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(code: i32, name: &str) -> Exception {
        Exception {
            code,
            name: name.into(),
            message: format!("{name} failed"),
            stack_trace: String::new(),
        }
    }

    #[test]
    fn display_includes_head_and_nested_count() {
        let error = ServerError { head: frame(516, "AUTH"), nested: vec![frame(1, "INNER")] };
        assert_eq!(error.to_string(), "[516] AUTH: AUTH failed (+1 nested)");
        assert_eq!(error.code(), 516);
        assert_eq!(error.chain().count(), 2);
    }

    #[test]
    fn source_points_at_first_nested_frame() {
        use std::error::Error as _;
        let error = ServerError { head: frame(516, "AUTH"), nested: vec![frame(1, "INNER")] };
        assert_eq!(error.source().unwrap().to_string(), "[1] INNER: INNER failed");
        let flat = ServerError { head: frame(516, "AUTH"), nested: vec![] };
        assert!(flat.source().is_none());
    }
}
