//! CSV adapters for pay-rate requests, pay-rate rows and pay-band assignments.
//!
//! All readers trim whitespace and expect a header row.

pub mod pay_band;
pub mod pay_rate;
pub mod requested_reader;

fn reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder.trim(csv::Trim::All).flexible(true);
    builder
}
