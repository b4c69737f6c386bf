// Library exports for the Halite bot
// This allows the replay tool and integration tests to use the core decision logic

pub mod bot;
pub mod config;
pub mod debug_logger;
pub mod map_state;
pub mod profiler;
pub mod protocol;
pub mod replay;
pub mod resolver;
pub mod session;
pub mod topology;
pub mod types;
