//! Dependency analyzers: package manifests → project Component +
//! Dependencies.

pub mod gem;
pub mod golang;
pub mod gradle;
pub mod maven;
pub mod npm;
pub mod nuget;
pub mod pip;
