pub mod image;
pub mod post;
pub mod record;
pub mod request;
