pub mod answers;
pub mod assessment;
pub mod feature;
