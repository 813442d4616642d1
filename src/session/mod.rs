//! Session lifecycle: who is signed in, and whether a seller still owes a
//! diagnostic.

pub mod controller;
pub mod model;
pub mod token;

pub use controller::SessionController;
pub use model::{LogoutReason, Session, SessionEvent, SessionPhase};
pub use token::{FileTokenStore, MemoryTokenStore, TokenSource, TokenStore};
