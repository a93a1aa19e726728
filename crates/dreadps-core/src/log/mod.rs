mod capture;
mod chain;

pub use capture::read_combat_log;
pub use chain::ChainResolver;
