use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChartError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("invalid date input '{0}'")]
    InvalidDateInput(String),
    #[error("record is missing key field '{0}'")]
    MissingKeyField(String),
    #[error("unknown period unit '{0}'")]
    UnknownPeriod(String),
    #[error("unknown metric field '{0}'")]
    UnknownMetric(String),
}

pub type ChartResult<T> = Result<T, ChartError>;
