use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum DatasetError {
    Io(std::io::Error),
    Corrupt(String),
}

impl Display for DatasetError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetError::Io(e) => write!(f, "Dataset file error: {}", e),
            DatasetError::Corrupt(detail) => write!(f, "Corrupt dataset record: {}", detail),
        }
    }
}

impl Error for DatasetError {}

impl From<std::io::Error> for DatasetError {
    fn from(e: std::io::Error) -> DatasetError {
        DatasetError::Io(e)
    }
}
