pub mod score_card;
pub mod status_badge;
pub mod table;
