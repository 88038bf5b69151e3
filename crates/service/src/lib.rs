pub mod challans;
pub mod errors;
pub mod ocr;
pub mod store;
