//! Domain layer: effective-dated value types and the ports the application
//! layer talks to.

pub mod activity;
pub mod allocation;
pub mod dates;
pub mod pay_rate;
pub mod ports;
pub mod rate;
