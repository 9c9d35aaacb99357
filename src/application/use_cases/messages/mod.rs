pub mod conversations;
pub mod get_thread;
pub mod send_message;
pub mod unread;
