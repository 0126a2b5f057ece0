//! Fixed symbols of the page label grammar
//!
//! Page file names carry outline entries such as `p.002 ❶1.1 title ※scan.png`.
//! The circled digits encode the nesting level and everything after the note
//! delimiter is ignored.

/// Level markers, indexed by the level they encode (0 to 15)
pub const LEVEL_MARKERS: [char; 16] = [
    '⓿', '❶', '❷', '❸', '❹', '❺', '❻', '❼', '❽', '❾', '❿', '⓫', '⓬', '⓭', '⓮', '⓯',
];

/// Highest level a marker can encode
pub const MAX_LEVEL: u8 = (LEVEL_MARKERS.len() - 1) as u8;

/// Start of an annotation that is dropped from the title
pub const NOTE_DELIMITER: char = '※';

/// Level of a marker symbol, `None` for any other character
#[inline]
pub fn marker_level(c: char) -> Option<u8> {
    LEVEL_MARKERS
        .iter()
        .position(|&marker| marker == c)
        .map(|index| index as u8)
}
