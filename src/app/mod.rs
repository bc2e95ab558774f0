pub mod catalog_service;
pub mod csv_import;
