use crate::error::EngineError;

/// Phoneme used for any character without a letter mapping.
const FALLBACK: &str = "AH";

/// One phoneme per letter, no context rules.
fn letter_phoneme(letter: char) -> Option<&'static str> {
    let code = match letter {
        'A' => "AE",
        'B' => "B",
        'C' => "K",
        'D' => "D",
        'E' => "EH",
        'F' => "F",
        'G' => "G",
        'H' => "/H",
        'I' => "IH",
        'J' => "J",
        'K' => "K",
        'L' => "L",
        'M' => "M",
        'N' => "N",
        'O' => "AA",
        'P' => "P",
        'Q' => "K",
        'R' => "R",
        'S' => "S",
        'T' => "T",
        'U' => "AH",
        'V' => "V",
        'W' => "UW",
        'X' => "S",
        'Y' => "Y",
        'Z' => "Z",
        _ => return None,
    };
    Some(code)
}

/// Convert plain text to space-separated phoneme codes.
///
/// Letters map one-to-one, the pause marks `. , ? -` pass through,
/// whitespace is dropped and anything else becomes `AH`.
pub fn to_phonemes(text: &str) -> Result<String, EngineError> {
    let codes: Vec<&str> = text
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| {
            let upper = c.to_ascii_uppercase();
            match upper {
                '.' => ".",
                ',' => ",",
                '?' => "?",
                '-' => "-",
                _ => letter_phoneme(upper).unwrap_or(FALLBACK),
            }
        })
        .collect();

    if codes.is_empty() {
        return Err(EngineError::Phonemization(format!(
            "no speakable characters in {text:?}"
        )));
    }
    Ok(codes.join(" "))
}
