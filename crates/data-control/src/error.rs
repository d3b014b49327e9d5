use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("{error}"))]
    Bridge { error: crate::bridge::Error },
}

impl From<crate::bridge::Error> for Error {
    fn from(error: crate::bridge::Error) -> Self { Self::Bridge { error } }
}
