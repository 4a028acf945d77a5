pub mod funds;
pub mod returns;
pub mod setup;
pub mod ui;
