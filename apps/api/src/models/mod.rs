pub mod board_event;
