//! Route guarding for FitFlow.
//!
//! The [`RouteGuard`] reads the principal from the session store, checks the
//! bearer credential locally with the [`TokenValidator`] and turns the result
//! into a [`Decision`]. Every failure resolves into a redirect; nothing is
//! surfaced to the page renderer as an error.

#![deny(missing_docs)]

mod clock;
mod decision;
mod error;
mod homes;
mod login;
mod route_guard;
mod token;
mod tracker;

pub use clock::{Clock, FixedClock, SystemClock};
pub use decision::{Decision, Route, roles_intersect};
pub use error::{AuthError, DirectoryError, LoginError};
pub use homes::RoleHomes;
pub use login::{LoggedIn, LoginPayload};
pub use route_guard::RouteGuard;
pub use token::{DecodedCredential, TokenValidator};
pub use tracker::{AccountDirectory, AlwaysActive, GuardState, GuardTracker};
