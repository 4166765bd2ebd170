#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RGB8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Into<RGBA8> for RGB8 {
    #[inline]
    fn into(self) -> RGBA8 {
        RGBA8 {
            r: self.r,
            g: self.g,
            b: self.b,
            a: 255,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RGBA8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl RGBA8 {
    pub const WHITE: Self = Self::new(255, 255, 255, 255);
    pub const BLACK: Self = Self::new(0, 0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Returns the same color with its alpha scaled by `factor` (clamped to
    /// `[0, 1]`).
    pub fn with_alpha_scaled(self, factor: f32) -> Self {
        let a = (self.a as f32 * factor.clamp(0.0, 1.0)) as u8;
        Self { a, ..self }
    }
}

impl Default for RGBA8 {
    fn default() -> Self {
        Self::WHITE
    }
}
