/// Longest edge accepted by the inference service before downscaling.
pub const DEFAULT_MAX_DIMENSION: u32 = 2048;

/// JPEG quality used for the outbound payload (1-100).
pub const DEFAULT_JPEG_QUALITY: u8 = 70;
