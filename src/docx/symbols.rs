/// Map a `w:sym` code point in a symbol font to the Unicode character it draws.
///
/// Word stores symbol-font characters either as raw bytes or shifted into the
/// private use area (F000-F0FF). Check boxes in checklists are usually
/// Wingdings or Wingdings 2 glyphs, so those get explicit tables; other fonts
/// fall back to the byte value.
pub(super) fn symbol_char(font: &str, cp: u32) -> Option<char> {
    let sym = if (0xF000..=0xF0FF).contains(&cp) {
        cp - 0xF000
    } else {
        cp
    };
    let mapped = match font.to_ascii_lowercase().as_str() {
        "wingdings" => wingdings(sym),
        "wingdings 2" => wingdings_2(sym),
        "symbol" => symbol(sym),
        _ => None,
    };
    mapped.or_else(|| char::from_u32(sym))
}

fn wingdings(sym: u32) -> Option<char> {
    let c = match sym {
        0x6F => '\u{25A1}', // white square
        0x71 => '\u{2751}',
        0x9F => '\u{2022}', // bullet
        0xA7 => '\u{25A0}', // black square
        0xA8 => '\u{25CB}', // white circle
        0xD8 => '\u{2666}', // diamond
        0xFB => '\u{2717}', // ballot x
        0xFC => '\u{2714}', // heavy check mark
        0xFD => '\u{2612}', // ballot box with x
        0xFE => '\u{2611}', // ballot box with check
        _ => return None,
    };
    Some(c)
}

fn wingdings_2(sym: u32) -> Option<char> {
    let c = match sym {
        0x4F => '\u{2717}',
        0x50 => '\u{2714}',
        0x51 => '\u{2612}',
        0x52 => '\u{2611}',
        0x54 => '\u{2612}',
        0xA3 => '\u{25A1}',
        _ => return None,
    };
    Some(c)
}

fn symbol(sym: u32) -> Option<char> {
    let c = match sym {
        0xB7 => '\u{2022}',
        0xD6 => '\u{221A}', // radical, used as a check mark
        _ => return None,
    };
    Some(c)
}
