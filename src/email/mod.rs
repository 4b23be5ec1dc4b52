pub mod delivery;
pub mod digest;
pub mod samples;

pub use delivery::{DeliveryError, EmailService};
pub use digest::{DigestComposer, DigestEmail};
pub use samples::placeholder_articles;
