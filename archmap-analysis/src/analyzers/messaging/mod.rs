//! Messaging analyzers: handlers and producers → MessageFlows.

pub mod celery;
pub mod kafka;
pub mod sidekiq;
