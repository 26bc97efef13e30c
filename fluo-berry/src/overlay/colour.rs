use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// RGB 颜色.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Colour(pub [u8; 3]);

impl Colour {
    /// 红.
    pub const RED: Self = Self([255, 0, 0]);
    /// 绿.
    pub const GREEN: Self = Self([0, 255, 0]);
    /// 青.
    pub const CYAN: Self = Self([0, 255, 255]);
    /// 橙.
    pub const ORANGE: Self = Self([255, 128, 0]);
    /// 紫.
    pub const PURPLE: Self = Self([128, 0, 128]);
    /// 品红.
    pub const MAGENTA: Self = Self([255, 0, 255]);

    /// 通道 `channel` (0 起) 的标记颜色: 红, 绿, 青, 橙, 之后循环.
    pub const fn for_channel(channel: usize) -> Self {
        const PALETTE: [Colour; 4] = [Colour::RED, Colour::GREEN, Colour::CYAN, Colour::ORANGE];
        PALETTE[channel % PALETTE.len()]
    }

    /// 颜色名称. 不在调色板内的颜色以 `#rrggbb` 表示.
    pub fn name(&self) -> String {
        match *self {
            Self::RED => "Red".to_string(),
            Self::GREEN => "Green".to_string(),
            Self::CYAN => "Cyan".to_string(),
            Self::ORANGE => "Orange".to_string(),
            Self::PURPLE => "Purple".to_string(),
            Self::MAGENTA => "Magenta".to_string(),
            Self([r, g, b]) => format!("#{r:02x}{g:02x}{b:02x}"),
        }
    }
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl From<Colour> for image::Rgb<u8> {
    #[inline]
    fn from(c: Colour) -> Self {
        image::Rgb(c.0)
    }
}
