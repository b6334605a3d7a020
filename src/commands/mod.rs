pub mod guests;
pub mod ingredients;
pub mod mancos;
pub mod orders;
pub mod shifts;
