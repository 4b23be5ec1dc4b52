pub mod article;
pub mod email_batch;
pub mod object;
pub mod shared_list;
pub mod user;
