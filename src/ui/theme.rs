use ratatui::style::Color;

// Small palette: dark neutrals with a green accent. Add roles here instead of
// scattering raw colors through the render code.
pub const BG: Color = Color::Rgb(12, 14, 17);
pub const SURFACE: Color = Color::Rgb(18, 22, 28);
pub const BAR_BG: Color = Color::Rgb(15, 19, 25);

pub const FG: Color = Color::Rgb(226, 228, 233);
pub const MUTED: Color = Color::Rgb(152, 160, 173);
pub const DIM: Color = Color::Rgb(104, 112, 126);
pub const BORDER: Color = Color::Rgb(56, 66, 82);

pub const ACCENT: Color = Color::Rgb(118, 209, 130);
pub const ACCENT_BG: Color = Color::Rgb(22, 40, 26);
