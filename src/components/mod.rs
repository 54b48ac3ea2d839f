pub mod notify_buttons;
