//! Services composing the storage managers and outbound HTTP.

pub mod importer;
pub mod link_checker;
pub mod preview;
