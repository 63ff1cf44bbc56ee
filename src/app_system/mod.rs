//! System orchestration, startup, and shutdown logic.

pub mod config;
pub mod order_system;
pub mod shutdown;
pub mod tracing;

pub use self::config::SystemConfig;
pub use self::order_system::OrderSystem;
pub use self::shutdown::ShutdownHandle;
pub use self::tracing::setup_tracing;
