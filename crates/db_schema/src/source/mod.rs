pub mod comment;
pub mod community;
pub mod person;
pub mod post;
pub mod vote;
