//! On-disk store for training records: bincode-framed pairs of an encoded
//! plane stack and the move that was played. Planes are stored as i8 and
//! labels as u16 to keep the files small; both are widened on load.

mod error;

pub use error::*;

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::Path;
use tch::{Kind, Tensor};

use crate::engine::policy_net::constants::NUM_FEATURE_PLANES;
use crate::engine::policy_net::features::DEVICE;
use crate::utils::{BOARD_SIZE, NUM_INTERSECTIONS};

pub const PLANE_VALUES_PER_RECORD: usize = NUM_FEATURE_PLANES * NUM_INTERSECTIONS;

/// One training example: the feature planes a move was chosen from, and the
/// chosen move as a row-major label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainRecord {
    pub planes: Vec<i8>,
    pub label: u16,
}

impl TrainRecord {
    /// Snapshots a single board's plane stack (any shape with 13*361 values).
    pub fn from_planes(planes: &Tensor, label: usize) -> TrainRecord {
        let mut values = vec![0.0f32; PLANE_VALUES_PER_RECORD];
        planes
            .view([-1])
            .to_device(tch::Device::Cpu)
            .copy_data(&mut values, PLANE_VALUES_PER_RECORD);
        TrainRecord {
            planes: values.iter().map(|v| *v as i8).collect(),
            label: label as u16,
        }
    }
}

/// Widens a slice of records into network-ready tensors: planes as float
/// (B, 13, 19, 19) and labels as int64 (B,).
pub fn records_to_tensors(records: &[TrainRecord]) -> Result<(Tensor, Tensor), DatasetError> {
    let mut planes = Vec::with_capacity(records.len());
    let mut labels = Vec::with_capacity(records.len());
    for record in records {
        if record.planes.len() != PLANE_VALUES_PER_RECORD {
            return Err(DatasetError::Corrupt(format!(
                "expected {} plane values, found {}",
                PLANE_VALUES_PER_RECORD,
                record.planes.len()
            )));
        }
        if record.label as usize >= NUM_INTERSECTIONS {
            return Err(DatasetError::Corrupt(format!(
                "label {} is outside the board",
                record.label
            )));
        }
        planes.push(
            Tensor::from_slice(&record.planes)
                .to_kind(Kind::Float)
                .view([NUM_FEATURE_PLANES as i64, BOARD_SIZE as i64, BOARD_SIZE as i64]),
        );
        labels.push(record.label as i64);
    }
    Ok((
        Tensor::stack(&planes, 0).to_device(*DEVICE),
        Tensor::from_slice(&labels).to_device(*DEVICE),
    ))
}

pub struct DatasetWriter {
    writer: BufWriter<File>,
}

impl DatasetWriter {
    pub fn create(path: impl AsRef<Path>) -> Result<DatasetWriter, DatasetError> {
        let file = File::create(path)?;
        Ok(DatasetWriter {
            writer: BufWriter::new(file),
        })
    }

    pub fn write(&mut self, record: &TrainRecord) -> Result<(), DatasetError> {
        bincode::serialize_into(&mut self.writer, record)
            .map_err(|e| DatasetError::Corrupt(e.to_string()))
    }

    pub fn flush(&mut self) -> Result<(), DatasetError> {
        self.writer.flush()?;
        Ok(())
    }
}

pub struct DatasetReader {
    reader: BufReader<File>,
}

impl DatasetReader {
    pub fn open(path: impl AsRef<Path>) -> Result<DatasetReader, DatasetError> {
        let file = File::open(path)?;
        Ok(DatasetReader {
            reader: BufReader::new(file),
        })
    }
}

impl Iterator for DatasetReader {
    type Item = Result<TrainRecord, DatasetError>;

    fn next(&mut self) -> Option<Self::Item> {
        match bincode::deserialize_from::<_, TrainRecord>(&mut self.reader) {
            Ok(record) => Some(Ok(record)),
            Err(e) => match *e {
                // a clean end of file terminates the stream
                bincode::ErrorKind::Io(ref io) if io.kind() == ErrorKind::UnexpectedEof => None,
                _ => Some(Err(DatasetError::Corrupt(e.to_string()))),
            },
        }
    }
}

/// Reads every record of a dataset file into memory.
pub fn read_all(path: impl AsRef<Path>) -> Result<Vec<TrainRecord>, DatasetError> {
    DatasetReader::open(path)?.collect()
}
