// SPDX-License-Identifier: MIT
//! # Extend Anchors
//!
//! The nine symbolic positions describing where the original image sits when
//! the canvas is extended to the training grid: left/center/right crossed
//! with up/middle/down. The two-letter wire codes match the backend contract
//! (`lu cu ru lm cm rm ld md rd`; note that center-down is `md`).

/// Anchor for the extend operation. The default is dead center (`cm`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ExtendAnchor {
    #[clap(name = "lu")]
    LeftUp,
    #[clap(name = "cu")]
    CenterUp,
    #[clap(name = "ru")]
    RightUp,
    #[clap(name = "lm")]
    LeftMiddle,
    #[default]
    #[clap(name = "cm")]
    CenterMiddle,
    #[clap(name = "rm")]
    RightMiddle,
    #[clap(name = "ld")]
    LeftDown,
    #[clap(name = "md")]
    CenterDown,
    #[clap(name = "rd")]
    RightDown,
}

impl ExtendAnchor {
    /// Two-letter code sent over the wire.
    pub fn code(self) -> &'static str {
        match self {
            Self::LeftUp => "lu",
            Self::CenterUp => "cu",
            Self::RightUp => "ru",
            Self::LeftMiddle => "lm",
            Self::CenterMiddle => "cm",
            Self::RightMiddle => "rm",
            Self::LeftDown => "ld",
            Self::CenterDown => "md",
            Self::RightDown => "rd",
        }
    }

    /// Parse a wire code; unknown codes yield `None`.
    pub fn from_code(code: &str) -> Option<Self> {
        let all = [
            Self::LeftUp,
            Self::CenterUp,
            Self::RightUp,
            Self::LeftMiddle,
            Self::CenterMiddle,
            Self::RightMiddle,
            Self::LeftDown,
            Self::CenterDown,
            Self::RightDown,
        ];
        all.into_iter()
            .find(|anchor| anchor.code().eq_ignore_ascii_case(code))
    }

    /// Where the original image lands on the extended canvas, given the extra
    /// width and height the extension adds. Mirrors the backend's paste
    /// placement so the client can preview the result.
    pub fn offsets(self, extra_w: u32, extra_h: u32) -> (u32, u32) {
        let x = match self {
            Self::LeftUp | Self::LeftMiddle | Self::LeftDown => 0,
            Self::CenterUp | Self::CenterMiddle | Self::CenterDown => extra_w / 2,
            Self::RightUp | Self::RightMiddle | Self::RightDown => extra_w,
        };
        let y = match self {
            Self::LeftUp | Self::CenterUp | Self::RightUp => 0,
            Self::LeftMiddle | Self::CenterMiddle | Self::RightMiddle => extra_h / 2,
            Self::LeftDown | Self::CenterDown | Self::RightDown => extra_h,
        };
        (x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for code in ["lu", "cu", "ru", "lm", "cm", "rm", "ld", "md", "rd"] {
            let anchor = ExtendAnchor::from_code(code).expect(code);
            assert_eq!(anchor.code(), code);
        }
        assert_eq!(ExtendAnchor::from_code("cd"), None);
        assert_eq!(ExtendAnchor::from_code(""), None);
    }

    #[test]
    fn default_is_center() {
        assert_eq!(ExtendAnchor::default().code(), "cm");
    }

    #[test]
    fn offsets_match_backend_placement() {
        assert_eq!(ExtendAnchor::LeftUp.offsets(10, 6), (0, 0));
        assert_eq!(ExtendAnchor::CenterMiddle.offsets(10, 6), (5, 3));
        assert_eq!(ExtendAnchor::RightDown.offsets(10, 6), (10, 6));
        assert_eq!(ExtendAnchor::CenterDown.offsets(11, 7), (5, 7));
    }
}
