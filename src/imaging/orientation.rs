//! EXIF orientation → rotation to apply during resize.
//!
//! Only the pure rotations are honoured. Mirrored orientations (2, 4, 5, 7),
//! `Normal`, unknown values and missing metadata all resolve to no rotation.
//! Reading the tag never fails: unreadable EXIF is logged and treated as absent.

use log::debug;
use std::io::Cursor;

/// Clockwise quarter-turn applied after scaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    None,
    Cw90,
    Cw180,
    Cw270,
}

impl Rotation {
    pub fn degrees(self) -> u16 {
        match self {
            Rotation::None => 0,
            Rotation::Cw90 => 90,
            Rotation::Cw180 => 180,
            Rotation::Cw270 => 270,
        }
    }

    /// Whether the rotation exchanges width and height.
    pub fn swaps_dimensions(self) -> bool {
        matches!(self, Rotation::Cw90 | Rotation::Cw270)
    }
}

/// Map an EXIF Orientation value (1-8) to a rotation.
pub fn rotation_for_tag(tag: Option<u32>) -> Rotation {
    match tag {
        Some(6) => Rotation::Cw90,
        Some(3) => Rotation::Cw180,
        Some(8) => Rotation::Cw270,
        _ => Rotation::None,
    }
}

/// Extract the EXIF Orientation tag from an encoded image.
pub fn read_orientation_tag(bytes: &[u8]) -> Option<u32> {
    let mut cursor = Cursor::new(bytes);
    let exif = match exif::Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => exif,
        Err(e) => {
            debug!("no usable EXIF data: {e}");
            return None;
        }
    };
    let field = exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)?;
    field.value.get_uint(0)
}
