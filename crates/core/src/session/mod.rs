//! Session module - auth models, the auth gateway trait, and the session context.

mod session_context;
mod session_model;
mod session_traits;


pub use session_context::SessionContext;
pub use session_model::{Profile, ProfileUpdate, Session, SignUp, User};
pub use session_traits::AuthGateway;
