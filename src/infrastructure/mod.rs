//! Infrastructure layer - backend implementations, storage services and logging

pub mod logging;
pub mod storage;
