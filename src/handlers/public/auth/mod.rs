// handlers/public/auth/mod.rs - Public authentication handlers
//
// Account creation and token acquisition. Everything else needs a bearer token.

pub mod login; // POST /api/auth/login - verify credentials and issue JWT
pub mod register; // POST /api/auth/register - create a `user` account

pub use login::login_post;
pub use register::register_post;
