use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("couldn't parse stored value for {key}: {source}")]
    Corrupted {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("couldn't serialize value: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("invalid config file: {0}")]
    Config(String),
    #[error("Please fill all fields")]
    MissingFields,
    #[error("User already exists with this email")]
    DuplicateEmail,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("no active session")]
    NotAuthenticated,
}

impl Error {
    /// Text shown to the user. Validation failures keep their own message,
    /// everything else collapses into a generic notice.
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingFields | Self::DuplicateEmail | Self::InvalidCredentials => {
                self.to_string()
            }
            Self::NotAuthenticated => "Please log in first".to_string(),
            _ => "Something went wrong".to_string(),
        }
    }
}

pub type Result<T> = core::result::Result<T, Error>;
