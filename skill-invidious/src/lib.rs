//! skill-invidious library interface
//!
//! Voice-assistant search skills backed by public Invidious instances.
//! Exposes the skill entry point plus its services for integration testing.

pub mod error;
pub mod models;
pub mod services;
pub mod skill;

pub use crate::error::{SkillError, SkillResult};
pub use crate::skill::{InvidiousSkill, SkillProfile};
