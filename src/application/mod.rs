//! Application layer: the pure effective-dating rules and the service that
//! validates, applies and persists them.
//!
//! [`reconcile::reconcile`] and [`pay_band::transition_pay_band`] are plain
//! functions over value types; [`service::ActivityService`] wires them to the
//! ports so that validation always completes before anything is written.

pub mod changes;
pub mod pay_band;
pub mod reconcile;
pub mod service;
