use std::fmt;

/// Newtype to protect secrets from being logged.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Secret(String);

impl Secret {
    pub fn new<P: AsRef<str>>(s: P) -> Self { Self(s.as_ref().to_string()) }

    #[must_use]
    pub fn get(&self) -> &str { &self.0 }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "Password(*****)") }
}

impl<T: AsRef<str>> From<T> for Secret {
    fn from(s: T) -> Self { Self(s.as_ref().to_string()) }
}

/// Options set for a `ClickHouse` connection.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientOptions {
    /// Server hostname or address.
    pub host:             String,
    /// Native protocol port, 9000 unless reconfigured server-side.
    pub port:             u16,
    /// Username credential.
    pub username:         String,
    /// Password credential. [`Secret`] is used to minimize likelihood of
    /// exposure through logs.
    pub password:         Secret,
    /// Scope this client to a specific database.
    pub default_database: String,
    /// Also raise decoded server exceptions out of `execute`/`select`, in
    /// addition to delivering them to the event sink.
    pub rethrow_server_exceptions: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        ClientOptions {
            host:             "localhost".to_string(),
            port:             9000,
            username:         "default".to_string(),
            password:         Secret::new(""),
            default_database: "default".to_string(),
            rethrow_server_exceptions: false,
        }
    }
}

impl ClientOptions {
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    #[must_use]
    pub fn with_password(mut self, password: impl Into<Secret>) -> Self {
        self.password = password.into();
        self
    }

    #[must_use]
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.default_database = database.into();
        self
    }

    #[must_use]
    pub fn with_rethrow_server_exceptions(mut self, enabled: bool) -> Self {
        self.rethrow_server_exceptions = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_never_shows_in_debug_output() {
        let options = ClientOptions::default().with_password("hunter2");
        let rendered = format!("{options:?}");
        assert!(!rendered.contains("hunter2"));
        assert_eq!(options.password.get(), "hunter2");
    }

    #[test]
    fn builder_setters_compose() {
        let options = ClientOptions::default()
            .with_host("db.internal")
            .with_port(9440)
            .with_username("writer")
            .with_database("events")
            .with_rethrow_server_exceptions(true);
        assert_eq!(options.host, "db.internal");
        assert_eq!(options.port, 9440);
        assert_eq!(options.username, "writer");
        assert_eq!(options.default_database, "events");
        assert!(options.rethrow_server_exceptions);
    }
}
