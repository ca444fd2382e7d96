pub mod factory;
pub mod windmill;
