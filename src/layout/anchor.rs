//! Text anchors: which point of a text block its position refers to.
//!
//! ```text
//!  horizontal: l ─── m ─── r        vertical:  a  ascender
//!              (s = l)                          t  top of the first line's ink
//!                                               m  middle
//!                                               s  baseline
//!                                               b  bottom
//!                                               d  descender
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::LabelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HorizontalAnchor {
    #[default]
    Left,
    Middle,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerticalAnchor {
    #[default]
    Ascender,
    Top,
    Middle,
    Baseline,
    Bottom,
    Descender,
}

/// A two-part anchor such as `la` (left, ascender).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Anchor {
    pub horizontal: HorizontalAnchor,
    pub vertical: VerticalAnchor,
}

impl Anchor {
    pub const LEFT_ASCENDER: Self = Self {
        horizontal: HorizontalAnchor::Left,
        vertical: VerticalAnchor::Ascender,
    };

    /// Offset from the anchor point to the left edge of a line `width` wide.
    pub fn x_offset(&self, width: f32) -> f32 {
        match self.horizontal {
            HorizontalAnchor::Left => 0.0,
            HorizontalAnchor::Middle => -width / 2.0,
            HorizontalAnchor::Right => -width,
        }
    }

    /// Offset from the anchor point to the baseline of a line.
    ///
    /// `ascent`, `descent` and `ink_top` are positive distances from the
    /// baseline; `ink_top` reaches the highest inked pixel.
    pub fn baseline_offset(&self, ascent: f32, descent: f32, ink_top: f32) -> f32 {
        match self.vertical {
            VerticalAnchor::Ascender => ascent,
            VerticalAnchor::Top => ink_top,
            VerticalAnchor::Middle => (ascent - descent) / 2.0,
            VerticalAnchor::Baseline => 0.0,
            VerticalAnchor::Bottom | VerticalAnchor::Descender => -descent,
        }
    }

    /// How far a stack of lines moves up, as a share of the stack's
    /// total inter-line advance.
    pub fn stack_shift(&self) -> f32 {
        match self.vertical {
            VerticalAnchor::Middle => 0.5,
            VerticalAnchor::Bottom | VerticalAnchor::Descender => 1.0,
            _ => 0.0,
        }
    }
}

impl FromStr for Anchor {
    type Err = LabelError;

    /// Parse `""`, `"l"` or `"la"` style anchors. A missing vertical part
    /// means ascender.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || LabelError::Configuration(format!("Invalid anchor '{}'", s));
        let mut chars = s.trim().chars();

        let horizontal = match chars.next() {
            None | Some('l') | Some('s') => HorizontalAnchor::Left,
            Some('m') => HorizontalAnchor::Middle,
            Some('r') => HorizontalAnchor::Right,
            Some(_) => return Err(invalid()),
        };
        let vertical = match chars.next() {
            None | Some('a') => VerticalAnchor::Ascender,
            Some('t') => VerticalAnchor::Top,
            Some('m') => VerticalAnchor::Middle,
            Some('s') => VerticalAnchor::Baseline,
            Some('b') => VerticalAnchor::Bottom,
            Some('d') => VerticalAnchor::Descender,
            Some(_) => return Err(invalid()),
        };
        if chars.next().is_some() {
            return Err(invalid());
        }

        Ok(Self {
            horizontal,
            vertical,
        })
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let h = match self.horizontal {
            HorizontalAnchor::Left => 'l',
            HorizontalAnchor::Middle => 'm',
            HorizontalAnchor::Right => 'r',
        };
        let v = match self.vertical {
            VerticalAnchor::Ascender => 'a',
            VerticalAnchor::Top => 't',
            VerticalAnchor::Middle => 'm',
            VerticalAnchor::Baseline => 's',
            VerticalAnchor::Bottom => 'b',
            VerticalAnchor::Descender => 'd',
        };
        write!(f, "{}{}", h, v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_common_anchors() {
        assert_eq!("la".parse::<Anchor>().unwrap(), Anchor::LEFT_ASCENDER);
        assert_eq!("".parse::<Anchor>().unwrap(), Anchor::LEFT_ASCENDER);
        let mm: Anchor = "mm".parse().unwrap();
        assert_eq!(mm.horizontal, HorizontalAnchor::Middle);
        assert_eq!(mm.vertical, VerticalAnchor::Middle);
        let r: Anchor = "r".parse().unwrap();
        assert_eq!(r.vertical, VerticalAnchor::Ascender);
        assert_eq!("sd".parse::<Anchor>().unwrap().horizontal, HorizontalAnchor::Left);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!("xa".parse::<Anchor>().is_err());
        assert!("lz".parse::<Anchor>().is_err());
        assert!("lab".parse::<Anchor>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        for s in ["la", "lt", "mm", "rs", "rb", "md"] {
            assert_eq!(s.parse::<Anchor>().unwrap().to_string(), s);
        }
    }

    #[test]
    fn test_offsets() {
        let rs: Anchor = "rs".parse().unwrap();
        assert_eq!(rs.x_offset(100.0), -100.0);
        assert_eq!(rs.baseline_offset(20.0, 5.0, 14.0), 0.0);
        let la = Anchor::LEFT_ASCENDER;
        assert_eq!(la.baseline_offset(20.0, 5.0, 14.0), 20.0);
        let lt: Anchor = "lt".parse().unwrap();
        assert_eq!(lt.baseline_offset(20.0, 5.0, 14.0), 14.0);
        let md: Anchor = "md".parse().unwrap();
        assert_eq!(md.x_offset(100.0), -50.0);
        assert_eq!(md.baseline_offset(20.0, 5.0, 14.0), -5.0);
        assert_eq!(md.stack_shift(), 1.0);
    }
}
