pub mod mimetype;
pub mod orientation;
