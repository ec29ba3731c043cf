//! Application services between the HTTP layer and the repositories.

pub mod todos;
pub mod token;
pub mod users;

pub use todos::TodoService;
pub use token::{JwtService, TokenError, TokenService};
pub use users::UserService;
