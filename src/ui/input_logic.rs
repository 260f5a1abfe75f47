/// Advance a screen cursor, wrapping to 0 after `max_index`.
pub fn next_screen(index: u8, max_index: u8) -> u8 {
    if index >= max_index {
        0
    } else {
        index + 1
    }
}
