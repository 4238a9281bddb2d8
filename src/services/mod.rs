pub mod autosave_service;
pub mod diagram_io_service;

pub use autosave_service::AutosaveService;
