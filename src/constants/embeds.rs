use serenity::all::{Colour, CreateEmbed};

/// Success color - Emerald green
pub const SUCCESS_COLOR: Colour = Colour::from_rgb(16, 185, 129);

/// Error color - Rose red
pub const ERROR_COLOR: Colour = Colour::from_rgb(244, 63, 94);

/// Warning color - Amber
pub const WARNING_COLOR: Colour = Colour::from_rgb(245, 158, 11);

/// Create a success embed
pub fn success_embed() -> CreateEmbed {
    CreateEmbed::new().color(SUCCESS_COLOR)
}

/// Create an error embed
pub fn error_embed() -> CreateEmbed {
    CreateEmbed::new().color(ERROR_COLOR)
}

/// Create a warning embed
pub fn warning_embed() -> CreateEmbed {
    CreateEmbed::new().color(WARNING_COLOR)
}
