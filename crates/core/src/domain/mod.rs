pub mod customer;
pub mod loan;
pub mod session;
