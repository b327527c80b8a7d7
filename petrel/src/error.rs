use petrel_observability::ObservabilityError;
use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum PetrelError {
    #[snafu(display("invalid server address"))]
    InvalidServerAddress { source: std::net::AddrParseError },
    #[snafu(display("io error"))]
    Io { source: std::io::Error },
    #[snafu(display("object store error"))]
    ObjectStore { source: object_store::Error },
    #[snafu(display("failed to initialize observability"))]
    Observability { source: ObservabilityError },
}

pub type Result<T, E = PetrelError> = std::result::Result<T, E>;
