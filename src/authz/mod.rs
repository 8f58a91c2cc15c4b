//! Authorization resolution engine.
//!
//! Given an authenticated principal and a requested (action, resource) pair,
//! decide allow/deny by walking principal role -> permission-group membership
//! -> permission set, with kind-specific policy per account kind:
//!
//! - platform admins with the `admin` role bypass everything;
//! - admin moderators expand their groups against the platform catalog;
//! - organizations own their user roster and notes outright, nothing else;
//! - base users are always denied (ownership checks live at the resource
//!   layer, not here);
//! - user moderators expand their groups against the organization catalog.
//!
//! The engine is stateless and uncached: every decision re-reads current
//! group membership, so a revocation is visible on the next check. Any
//! lookup failure is a denial, never an allow.

pub mod catalog;
pub mod directory;
pub mod engine;
pub mod errors;
pub mod gate;
pub mod types;

pub use engine::{Decision, Resolver};
pub use errors::AuthzError;
pub use types::{AccountKind, Action, Module, OrgModule, Principal, Resource};
