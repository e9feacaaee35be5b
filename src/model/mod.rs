//! Data models for ratedesk.
//!
//! This module contains the domain models:
//! - Item (sanitized dataset record) and ItemKey
//! - RatingRecord

pub mod item;
pub mod rating;

pub use item::{Item, ItemId, ItemKey};
pub use rating::{strict_fields_complete, RatingRecord};
