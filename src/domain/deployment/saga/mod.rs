pub mod compensation;
pub mod deployment_saga;
pub mod saga_state;
