use crate::domain::allocation::PayBandAssignment;
use crate::error::{PayRateError, Result};
use std::io::{Read, Write};

/// Reads pay-band assignments (`pay_band,start_date,end_date`).
pub struct PayBandReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> PayBandReader<R> {
    pub fn new(source: R) -> Self {
        Self {
            reader: super::reader_builder().from_reader(source),
        }
    }

    pub fn assignments(self) -> impl Iterator<Item = Result<PayBandAssignment>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(PayRateError::from))
    }
}

pub struct PayBandWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> PayBandWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_assignments<'a>(
        &mut self,
        assignments: impl IntoIterator<Item = &'a PayBandAssignment>,
    ) -> Result<()> {
        for assignment in assignments {
            self.writer.serialize(assignment)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
