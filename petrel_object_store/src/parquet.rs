//! Buffered parquet writer.

use arrow::{datatypes::SchemaRef, record_batch::RecordBatch};
use bytesize::ByteSize;
use parquet::{arrow::ArrowWriter, errors::ParquetError, file::properties::WriterProperties};
use snafu::Snafu;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(transparent)]
    Parquet { source: ParquetError },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

const DEFAULT_BUFFER_CAPACITY: usize = 8 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct FileMetadata {
    pub file_size: ByteSize,
    pub num_rows: usize,
}

/// Writes record batches into an in-memory parquet file.
///
/// `finish` always yields a valid parquet file, even when no batch was
/// written: a zero-row import must still land a file carrying the schema.
pub struct ParquetWriter {
    schema: SchemaRef,
    writer_properties: WriterProperties,
    inner_writer: Option<ArrowWriter<Vec<u8>>>,
}

impl ParquetWriter {
    pub fn new(schema: SchemaRef, writer_properties: WriterProperties) -> Self {
        Self {
            schema,
            writer_properties,
            inner_writer: None,
        }
    }

    fn ensure_writer(&mut self) -> Result<&mut ArrowWriter<Vec<u8>>> {
        if self.inner_writer.is_none() {
            let buffer = Vec::with_capacity(DEFAULT_BUFFER_CAPACITY);
            let writer = ArrowWriter::try_new(
                buffer,
                self.schema.clone(),
                self.writer_properties.clone().into(),
            )?;

            self.inner_writer = Some(writer);
        }

        Ok(self.inner_writer.as_mut().expect("inner parquet writer"))
    }

    pub fn write(&mut self, batch: &RecordBatch) -> Result<()> {
        let writer = self.ensure_writer()?;
        writer.write(batch)?;

        Ok(())
    }

    pub fn finish(&mut self) -> Result<(Vec<u8>, FileMetadata)> {
        self.ensure_writer()?;

        let mut writer = self.inner_writer.take().expect("inner parquet writer");
        let metadata = writer.finish()?;
        let data = std::mem::take(&mut *writer.inner_mut());
        let file_size = ByteSize::b(data.len() as _);

        let file_metadata = FileMetadata {
            file_size,
            num_rows: metadata.num_rows as usize,
        };

        Ok((data, file_metadata))
    }

    pub fn current_file_size(&self) -> u64 {
        self.inner_writer
            .as_ref()
            .map(|w| w.in_progress_size() + w.bytes_written())
            .unwrap_or_default() as _
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::array::{Int32Array, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

    use super::*;

    fn test_schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("id", DataType::Int32, false),
            Field::new("name", DataType::Utf8, false),
        ]))
    }

    fn test_batch() -> RecordBatch {
        let id_array = Int32Array::from(vec![1, 2, 3]);
        let name_array = StringArray::from(vec!["alice", "bob", "charlie"]);

        RecordBatch::try_new(test_schema(), vec![Arc::new(id_array), Arc::new(name_array)])
            .unwrap()
    }

    #[test]
    fn test_write_and_finish() {
        let mut writer = ParquetWriter::new(test_schema(), WriterProperties::builder().build());

        writer.write(&test_batch()).unwrap();
        let (data, metadata) = writer.finish().unwrap();

        assert!(!data.is_empty());
        assert_eq!(metadata.num_rows, 3);
        assert!(metadata.file_size.as_u64() > 0);
    }

    #[test]
    fn test_finish_without_writes_yields_valid_empty_file() {
        let mut writer = ParquetWriter::new(test_schema(), WriterProperties::builder().build());

        let (data, metadata) = writer.finish().unwrap();
        assert!(!data.is_empty());
        assert_eq!(metadata.num_rows, 0);

        let reader = ParquetRecordBatchReaderBuilder::try_new(bytes::Bytes::from(data)).unwrap();
        assert_eq!(reader.schema().fields().len(), 2);
    }

    #[test]
    fn test_current_file_size_grows() {
        let mut writer = ParquetWriter::new(test_schema(), WriterProperties::builder().build());
        assert_eq!(writer.current_file_size(), 0);

        writer.write(&test_batch()).unwrap();
        assert!(writer.current_file_size() > 0);
    }
}
