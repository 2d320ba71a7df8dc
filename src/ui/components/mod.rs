pub mod input_bar;
pub mod lobby;
pub mod message_list;
pub mod roster;
pub mod typing_indicator;
