pub mod rules;
pub mod state;
