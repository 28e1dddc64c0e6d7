pub mod rating;
pub mod slug;
pub mod token;
