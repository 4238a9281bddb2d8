pub mod diagrams;
pub mod health;
