pub const APP_NAME: &str = "Ripple";

// Limits
pub const MAX_MESSAGE_LENGTH: usize = 4000;
pub const MAX_USERNAME_LENGTH: usize = 32;
pub const MIN_USERNAME_LENGTH: usize = 2;
pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_EMOJI_LENGTH: usize = 32;
pub const MAX_ATTACHMENTS_PER_MESSAGE: usize = 10;

pub const MESSAGE_PAGE_SIZE: i64 = 50;
