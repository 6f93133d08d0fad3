pub mod alias;
pub mod geo;
pub mod text;
