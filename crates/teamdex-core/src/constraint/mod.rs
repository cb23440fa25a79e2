//! Team member legality checks.
//!
//! A [`MemberSpec`] is what a caller asks for; a [`ValidatedMember`] is the
//! same member after every catalog reference has been resolved and checked.

mod member;
mod validator;

pub use member::{ItemRef, MemberSpec, ValidatedMember};
pub use validator::MemberValidator;
