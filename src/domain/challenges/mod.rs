pub mod challenge;
pub mod minigame;
