pub mod photo_handler;

pub use photo_handler::PhotoHandler;
