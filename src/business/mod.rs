pub mod ports;
pub mod projection;
pub mod reconcile;
pub mod sheet_writer;
pub mod sync_service;

#[cfg(test)]
pub(crate) mod testing;

pub use ports::*;
pub use projection::*;
pub use reconcile::*;
pub use sheet_writer::*;
pub use sync_service::*;
