use anyhow::anyhow;

pub type Result<T> = std::result::Result<T, LibError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Conflict,
    Database,
    InvalidInput,
    NotFound,
    Unauthorized,
    /// The store could not be reached in time. Only reads may be retried.
    Unavailable,
}

#[derive(Debug)]
pub struct LibError {
    pub kind: ErrorKind,
    pub code: &'static str,
    pub public: &'static str,
    pub source: anyhow::Error,
}

impl LibError {
    pub fn database(public: &'static str, source: anyhow::Error) -> Self {
        Self {
            kind: ErrorKind::Database,
            code: "database_error",
            public,
            source,
        }
    }

    pub fn unavailable(public: &'static str, source: anyhow::Error) -> Self {
        Self {
            kind: ErrorKind::Unavailable,
            code: "store_unavailable",
            public,
            source,
        }
    }

    pub fn invalid(public: &'static str, source: anyhow::Error) -> Self {
        Self {
            kind: ErrorKind::InvalidInput,
            code: "invalid_input",
            public,
            source,
        }
    }

    pub fn invalid_with_code(
        code: &'static str,
        public: &'static str,
        source: anyhow::Error,
    ) -> Self {
        Self {
            kind: ErrorKind::InvalidInput,
            code,
            public,
            source,
        }
    }

    pub fn conflict(code: &'static str, public: &'static str, source: anyhow::Error) -> Self {
        Self {
            kind: ErrorKind::Conflict,
            code,
            public,
            source,
        }
    }

    pub fn unauthorized(public: &'static str, source: anyhow::Error) -> Self {
        Self {
            kind: ErrorKind::Unauthorized,
            code: "unauthorized",
            public,
            source,
        }
    }

    pub fn not_found(public: &'static str, source: anyhow::Error) -> Self {
        Self {
            kind: ErrorKind::NotFound,
            code: "not_found",
            public,
            source,
        }
    }

    /// Marks a store outage hit while writing as not retryable. The write may
    /// have committed before the connection dropped.
    pub fn for_write(mut self) -> Self {
        if self.kind == ErrorKind::Unavailable {
            self.code = "store_unavailable_write";
        }
        self
    }

    pub fn is_retryable(&self) -> bool {
        self.kind == ErrorKind::Unavailable && self.code == "store_unavailable"
    }
}

impl std::fmt::Display for LibError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}): {}", self.public, self.code, self.source)
    }
}

impl std::error::Error for LibError {}

#[cfg(feature = "sqlx")]
pub(crate) fn from_store_error(public: &'static str, err: sqlx::Error) -> LibError {
    match &err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            LibError::unavailable(public, anyhow!(err))
        }
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            LibError::conflict("store_conflict", public, anyhow!(err))
        }
        _ => LibError::database(public, anyhow!(err)),
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for LibError {
    fn from(value: sqlx::Error) -> Self {
        from_store_error("Database request failed", value)
    }
}
