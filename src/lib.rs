//! Shared slot scheduling server.
//!
//! Administrators publish time slots on dates, volunteers sign up by typing
//! their name, and every connected page is pushed the updated schedule. A
//! device may only remove names it added itself, tracked in its session
//! cookie; administrators may remove anyone and delete slots outright.

pub mod display;
pub mod error;
pub mod export;
pub mod registry;
pub mod slot;
pub mod store;
pub mod web;
