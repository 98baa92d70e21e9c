pub mod credentials;
pub mod youtube;
