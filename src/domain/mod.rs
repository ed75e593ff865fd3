pub mod article;
pub mod credentials;
pub mod pending;

pub use article::Article;
pub use credentials::{Credentials, Session};
pub use pending::PendingSubmission;
