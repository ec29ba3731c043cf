//! Infrastructure adapters: counter stores, repositories, rendering, email
//! and push delivery.

pub mod counter;
pub mod email;
pub mod push;
pub mod render;
pub mod store;

pub use counter::InMemoryCounterStore;
#[cfg(feature = "redis")]
pub use counter::RedisCounterStore;
pub use email::LogEmailSender;
pub use push::{Notice, NotificationHub, UserPushChannel};
pub use render::{render_document, PdfRenderer};
pub use store::{
    InMemoryTodoRepository, InMemoryUserRepository, RepositoryError, TodoRepository, UserRepository,
};
