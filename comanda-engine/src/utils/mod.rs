//! Small cross-cutting helpers

pub mod validation;
