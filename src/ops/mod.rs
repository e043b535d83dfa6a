pub mod extract;
pub mod harmony;
