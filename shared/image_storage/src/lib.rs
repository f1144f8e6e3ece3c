//! Metadata storage for uploaded gallery images
//!
//! This crate owns the persisted [`image_record::ImageRecord`] shape and the
//! `DynamoDB` table that holds it.

pub mod image_record;
