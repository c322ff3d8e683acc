//! Comment blanking for `.jsonc` fragments
//!
//! Comments are overwritten with spaces instead of being removed, so every
//! byte keeps its offset and diagnostics still point into the text the
//! operator wrote. Newlines inside block comments are kept for the same
//! reason.

#[derive(Clone, Copy)]
enum State {
    Code,
    String,
    Escape,
    LineComment,
    BlockComment,
}

/// Blank out `//` and `/* */` comments that sit outside string literals.
///
/// An unterminated block comment runs to the end of the buffer.
pub fn strip_comments(buf: &mut [u8]) {
    let mut state = State::Code;
    let mut i = 0;

    while i < buf.len() {
        let byte = buf[i];
        let next = buf.get(i + 1).copied();

        state = match state {
            State::Code => match (byte, next) {
                (b'"', _) => State::String,
                (b'/', Some(b'/')) => {
                    blank(buf, i, 2);
                    i += 1;
                    State::LineComment
                }
                (b'/', Some(b'*')) => {
                    blank(buf, i, 2);
                    i += 1;
                    State::BlockComment
                }
                _ => State::Code,
            },
            State::String => match byte {
                b'\\' => State::Escape,
                b'"' => State::Code,
                _ => State::String,
            },
            State::Escape => State::String,
            State::LineComment => {
                if byte == b'\n' {
                    State::Code
                } else {
                    blank(buf, i, 1);
                    State::LineComment
                }
            }
            State::BlockComment => match (byte, next) {
                (b'*', Some(b'/')) => {
                    blank(buf, i, 2);
                    i += 1;
                    State::Code
                }
                (b'\n', _) => State::BlockComment,
                _ => {
                    blank(buf, i, 1);
                    State::BlockComment
                }
            },
        };

        i += 1;
    }
}

fn blank(buf: &mut [u8], start: usize, len: usize) {
    for byte in buf.iter_mut().skip(start).take(len) {
        *byte = b' ';
    }
}
