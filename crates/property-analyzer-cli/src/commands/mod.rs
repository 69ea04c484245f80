pub mod analysis;
pub mod costs;
pub mod loan;
pub mod renting;
