use crate::domain::pay_rate::RequestedPayRate;
use crate::error::{PayRateError, Result};
use std::io::Read;

/// Reads requested pay rates (`incentive_level,pay_band,rate`) from a CSV source.
///
/// Rates are truncated to the stored scale as they are read; negative rates
/// are reported as errors for the offending line.
pub struct RequestedPayRateReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> RequestedPayRateReader<R> {
    /// Creates a new `RequestedPayRateReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        Self {
            reader: super::reader_builder().from_reader(source),
        }
    }

    /// Returns an iterator that lazily reads and deserializes requested rates.
    pub fn requested_rates(self) -> impl Iterator<Item = Result<RequestedPayRate>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(PayRateError::from))
    }
}
