pub mod balance_sheet;
pub mod charges;
pub mod monthly;
pub mod sig;
