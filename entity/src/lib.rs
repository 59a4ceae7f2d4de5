pub mod donation;
pub mod event;
pub mod gallery;
pub mod member;
pub mod prashad;
pub mod sequence;
