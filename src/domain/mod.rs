pub mod challenges;
pub mod marketplace;
