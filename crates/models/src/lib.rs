pub mod challan;
pub mod errors;
