use derive_more::{Display, Error};

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("configuration error")]
    Config,
    /// Neither the command line nor the configuration provides this value.
    #[display("missing {_0}; set it in the config file or the environment")]
    MissingSetting(#[error(not(source))] &'static str),
    #[display("could not set up the remote store")]
    Remote,
    #[display("login failed")]
    Login,
    #[display("upload failed")]
    Upload,
    #[display("could not list the gallery")]
    Fetch,
}
