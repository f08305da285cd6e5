use crate::domain::pay_rate::{ActivityId, PayRate};
use crate::domain::rate::Rate;
use crate::error::{PayRateError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

#[derive(Debug, Deserialize)]
struct PayRateRecord {
    incentive_level: String,
    pay_band: String,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
    rate: Rate,
}

#[derive(Debug, Serialize)]
struct PayRateRow<'a> {
    incentive_level: &'a str,
    pay_band: &'a str,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
    rate: String,
}

/// Reads pay-rate rows (`incentive_level,pay_band,start_date,end_date,rate`)
/// for one activity. An empty `end_date` means the row is open-ended.
pub struct PayRateReader<R: Read> {
    reader: csv::Reader<R>,
    activity_id: ActivityId,
}

impl<R: Read> PayRateReader<R> {
    pub fn new(source: R, activity_id: ActivityId) -> Self {
        Self {
            reader: super::reader_builder().from_reader(source),
            activity_id,
        }
    }

    pub fn pay_rates(self) -> impl Iterator<Item = Result<PayRate>> {
        let activity_id = self.activity_id;
        self.reader.into_deserialize().map(move |result| -> Result<PayRate> {
            let record: PayRateRecord = result.map_err(PayRateError::from)?;
            Ok(PayRate {
                activity_id,
                incentive_level: record.incentive_level,
                pay_band: record.pay_band,
                start_date: record.start_date,
                end_date: record.end_date,
                half_day_rate: record.rate,
            })
        })
    }
}

/// Writes pay-rate rows as CSV, rates at their fixed scale.
pub struct PayRateWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> PayRateWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_pay_rates<'a>(
        &mut self,
        pay_rates: impl IntoIterator<Item = &'a PayRate>,
    ) -> Result<()> {
        for rate in pay_rates {
            self.writer.serialize(PayRateRow {
                incentive_level: &rate.incentive_level,
                pay_band: &rate.pay_band,
                start_date: rate.start_date,
                end_date: rate.end_date,
                rate: rate.half_day_rate.to_string(),
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
