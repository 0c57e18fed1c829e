pub mod advice;
pub mod classifier;
pub mod dataset;
pub mod prescription;
pub mod spell;
