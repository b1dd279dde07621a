// TabKeeper services
// Stateless computation (derivation engine) and configuration.

pub mod settings_engine;
pub mod tab_derivation;
