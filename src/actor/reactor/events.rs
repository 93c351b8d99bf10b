pub mod startup;
pub mod window;
pub mod workspace;
