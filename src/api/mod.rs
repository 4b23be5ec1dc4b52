pub mod articles;
pub mod health;
pub mod routes;
pub mod test_email;
pub mod users;

pub use routes::routes;
