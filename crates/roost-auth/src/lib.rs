//! # roost-auth
//!
//! Session state and credential handling for the remote service.
//!
//! - [`session`]: the [`SessionHolder`] cell owned by the base client and the
//!   read-only [`SessionProbe`] every other component uses
//! - [`artifact`]: serialisable [`SessionArtifact`] (cookies)
//! - [`cache`]: the [`ArtifactCache`] collaborator plus in-memory and
//!   JSON-file implementations
//! - [`login`]: trait boundary to the remote service's login flow
//! - [`validator`]: one-shot [`CredentialValidator`]
//!
//! Session artifacts are cached under `<namespace>/<username>/cookies` so a
//! later session can be established without a fresh login.

#![deny(unsafe_code)]

pub mod artifact;
pub mod cache;
pub mod errors;
pub mod login;
pub mod session;
pub mod validator;

pub use artifact::{Cookie, SessionArtifact};
pub use cache::{
    ArtifactCache, FileArtifactCache, MemoryArtifactCache, cookie_cache_key, load_session_artifact,
    save_session_artifact,
};
pub use errors::AuthError;
pub use login::{LoginClient, LoginClientFactory};
pub use session::{SessionHandle, SessionHolder, SessionProbe};
pub use validator::CredentialValidator;
