/// Default width of an output group.
pub const GROUP_WIDTH: usize = 5;

/// Splits `text` into space-separated groups of `width` symbols; the last
/// group may be shorter. A width of zero leaves the text as is.
pub fn group_symbols(text: &str, width: usize) -> String {
    if width == 0 {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len() + text.len() / width);
    for (position, symbol) in text.chars().enumerate() {
        if position > 0 && position % width == 0 {
            out.push(' ');
        }
        out.push(symbol);
    }
    out
}
