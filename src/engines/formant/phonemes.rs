use std::fmt;

use crate::error::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Vowel,
    Diphthong,
    Semivowel,
    Nasal,
    Fricative,
    Affricate,
    Stop,
    Special,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Vowel,
        Category::Diphthong,
        Category::Semivowel,
        Category::Nasal,
        Category::Fricative,
        Category::Affricate,
        Category::Stop,
        Category::Special,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Vowel => "Vowels",
            Category::Diphthong => "Diphthongs",
            Category::Semivowel => "Semivowels",
            Category::Nasal => "Nasals",
            Category::Fricative => "Fricatives",
            Category::Affricate => "Affricates",
            Category::Stop => "Stops",
            Category::Special => "Special",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhonemeInfo {
    pub code: &'static str,
    pub category: Category,
    pub example: &'static str,
}

const fn p(code: &'static str, category: Category, example: &'static str) -> PhonemeInfo {
    PhonemeInfo {
        code,
        category,
        example,
    }
}

use Category::*;

/// Every phoneme code the engine accepts.
pub const PHONEMES: &[PhonemeInfo] = &[
    p("IY", Vowel, "ee (feet)"),
    p("IH", Vowel, "i (it)"),
    p("EH", Vowel, "e (pet)"),
    p("AE", Vowel, "a (cat)"),
    p("AA", Vowel, "o (hot)"),
    p("AH", Vowel, "u (but)"),
    p("AO", Vowel, "aw (law)"),
    p("UH", Vowel, "oo (put)"),
    p("AX", Vowel, "a (about)"),
    p("IX", Vowel, "i (roses)"),
    p("ER", Vowel, "ur (bird)"),
    p("UX", Vowel, "oo (loot)"),
    p("OH", Vowel, "o (go)"),
    p("RX", Vowel, "r-color"),
    p("LX", Vowel, "l-color"),
    p("WX", Vowel, "w-color"),
    p("YX", Vowel, "y-color"),
    p("EY", Diphthong, "ay (say)"),
    p("AY", Diphthong, "i (my)"),
    p("OY", Diphthong, "oy (boy)"),
    p("AW", Diphthong, "ow (now)"),
    p("OW", Diphthong, "o (go)"),
    p("UW", Diphthong, "oo (blue)"),
    p("R", Semivowel, "r (red)"),
    p("L", Semivowel, "l (let)"),
    p("W", Semivowel, "w (wet)"),
    p("Y", Semivowel, "y (yes)"),
    p("M", Nasal, "m (man)"),
    p("N", Nasal, "n (no)"),
    p("NX", Nasal, "ng (sing)"),
    p("S", Fricative, "s (sit)"),
    p("SH", Fricative, "sh (she)"),
    p("F", Fricative, "f (fun)"),
    p("TH", Fricative, "th (thin)"),
    p("/H", Fricative, "h (hat)"),
    p("/X", Fricative, "ch (loch)"),
    p("Z", Fricative, "z (zoo)"),
    p("ZH", Fricative, "zh (azure)"),
    p("V", Fricative, "v (vest)"),
    p("DH", Fricative, "th (the)"),
    p("CH", Fricative, "ch (church)"),
    p("J", Affricate, "j (judge)"),
    p("B", Stop, "b (bad)"),
    p("D", Stop, "d (did)"),
    p("G", Stop, "g (got)"),
    p("GX", Stop, "gx"),
    p("P", Stop, "p (put)"),
    p("T", Stop, "t (top)"),
    p("K", Stop, "k (kit)"),
    p("KX", Stop, "kx"),
    p("DX", Special, "r (rider)"),
    p("Q", Special, "glottal stop"),
    p("UL", Special, "l (settle)"),
    p("UM", Special, "m (bottom)"),
    p("UN", Special, "n (button)"),
    p(".", Special, "period"),
    p("?", Special, "question"),
    p(",", Special, "comma"),
    p("-", Special, "pause"),
];

pub fn lookup(code: &str) -> Option<&'static PhonemeInfo> {
    PHONEMES.iter().find(|info| info.code == code)
}

/// Phonemes of one category, in table order.
pub fn by_category(category: Category) -> impl Iterator<Item = &'static PhonemeInfo> {
    PHONEMES.iter().filter(move |info| info.category == category)
}

/// How a phoneme is sounded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Articulation {
    /// Glottal source through two formant filters.
    Voiced { f1: f32, f2: f32 },
    /// High-passed noise.
    Noise,
    /// Silence.
    Pause,
}

const DEFAULT_FORMANTS: (f32, f32) = (500.0, 1500.0);

fn formants(code: &str) -> (f32, f32) {
    match code {
        "AA" | "AW" => (730.0, 1090.0),
        "AE" | "AY" => (660.0, 1720.0),
        "AH" | "AX" => (640.0, 1190.0),
        "AO" | "OW" | "OY" | "OH" => (570.0, 840.0),
        "EH" | "EY" => (530.0, 1840.0),
        "ER" | "RX" => (490.0, 1350.0),
        "IH" | "IX" => (390.0, 1990.0),
        "IY" => (270.0, 2290.0),
        "UH" => (440.0, 1020.0),
        "UW" | "UX" => (300.0, 870.0),
        _ => DEFAULT_FORMANTS,
    }
}

/// A parsed phoneme with its optional stress digit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Phoneme {
    pub info: &'static PhonemeInfo,
    /// 1–8, higher is more emphasis.
    pub stress: Option<u8>,
}

impl Phoneme {
    pub fn articulation(&self) -> Articulation {
        match self.info.code {
            "." | "?" | "," | "-" | "Q" => Articulation::Pause,
            "S" | "SH" | "F" | "TH" | "T" | "K" | "P" | "/H" | "/X" | "CH" | "KX" => {
                Articulation::Noise
            }
            code => {
                let (f1, f2) = formants(code);
                Articulation::Voiced { f1, f2 }
            }
        }
    }

    /// Notation for this phoneme alone, e.g. `"EH4"`.
    pub fn notation(&self) -> String {
        match self.stress {
            Some(stress) => format!("{}{stress}", self.info.code),
            None => self.info.code.to_string(),
        }
    }

    /// Length at nominal speed, in seconds.
    pub fn nominal_duration(&self) -> f32 {
        let base = match (self.info.code, self.info.category) {
            ("." | "?", _) => 0.20,
            (",", _) => 0.12,
            ("-", _) => 0.06,
            ("Q" | "DX", _) => 0.04,
            (_, Vowel | Diphthong) => 0.14,
            (_, Semivowel | Nasal) => 0.09,
            (_, Fricative) => 0.10,
            (_, Affricate | Stop) => 0.06,
            (_, Special) => 0.10,
        };
        base * (1.0 + 0.05 * f32::from(self.stress.unwrap_or(0)))
    }
}

/// Parse phoneme notation such as `"/HEH4LOW"` or `"S AE T ER D EY"`.
///
/// Codes are matched longest first; whitespace is ignored; a digit 1–8 after
/// a code sets its stress.
pub fn parse_phonemes(text: &str) -> Result<Vec<Phoneme>, EngineError> {
    let chars: Vec<char> = text.chars().map(|c| c.to_ascii_uppercase()).collect();
    let mut phonemes = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        if chars[i].is_whitespace() {
            i += 1;
            continue;
        }

        let pair: String = chars[i..chars.len().min(i + 2)].iter().collect();
        let single = chars[i].to_string();
        let info = match lookup(&pair).filter(|_| pair.len() == 2) {
            Some(info) => {
                i += 2;
                info
            }
            None => match lookup(&single) {
                Some(info) => {
                    i += 1;
                    info
                }
                None => {
                    return Err(EngineError::InvalidPhoneme {
                        position: i,
                        found: pair,
                    })
                }
            },
        };

        let stress = match chars.get(i).and_then(|c| c.to_digit(10)) {
            Some(d @ 1..=8) => {
                i += 1;
                Some(d as u8)
            }
            _ => None,
        };

        phonemes.push(Phoneme { info, stress });
    }

    Ok(phonemes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(text: &str) -> Vec<&'static str> {
        parse_phonemes(text)
            .unwrap()
            .iter()
            .map(|p| p.info.code)
            .collect()
    }

    #[test]
    fn every_category_has_phonemes() {
        for category in Category::ALL {
            assert!(by_category(category).next().is_some(), "{category}");
        }
        assert_eq!(PHONEMES.len(), 59);
    }

    #[test]
    fn codes_are_unique() {
        for (i, a) in PHONEMES.iter().enumerate() {
            assert!(PHONEMES[i + 1..].iter().all(|b| b.code != a.code), "{}", a.code);
        }
    }

    #[test]
    fn parses_packed_notation_longest_first() {
        assert_eq!(codes("/HEH4LOW"), vec!["/H", "EH", "L", "OW"]);
        assert_eq!(codes("SHIY"), vec!["SH", "IY"]);
        assert_eq!(codes("s ae t er d ey"), vec!["S", "AE", "T", "ER", "D", "EY"]);
    }

    #[test]
    fn reads_stress_digits() {
        let parsed = parse_phonemes("AE5T").unwrap();
        assert_eq!(parsed[0].stress, Some(5));
        assert_eq!(parsed[1].stress, None);
        assert!(parsed[0].nominal_duration() > 0.14);
    }

    #[test]
    fn rejects_unknown_codes_with_position() {
        assert_eq!(
            parse_phonemes("AE HH"),
            Err(EngineError::InvalidPhoneme {
                position: 3,
                found: "HH".to_string()
            })
        );
        assert!(parse_phonemes("AE9").is_err());
    }

    #[test]
    fn classifies_articulation() {
        let parsed = parse_phonemes("AA S . M").unwrap();
        assert_eq!(
            parsed[0].articulation(),
            Articulation::Voiced {
                f1: 730.0,
                f2: 1090.0
            }
        );
        assert_eq!(parsed[1].articulation(), Articulation::Noise);
        assert_eq!(parsed[2].articulation(), Articulation::Pause);
        assert_eq!(
            parsed[3].articulation(),
            Articulation::Voiced {
                f1: 500.0,
                f2: 1500.0
            }
        );
    }

    #[test]
    fn phonemes_write_back_their_notation() {
        let parsed = parse_phonemes("/heh4low").unwrap();
        let notation: Vec<String> = parsed.iter().map(Phoneme::notation).collect();
        assert_eq!(notation, vec!["/H", "EH4", "L", "OW"]);
    }

    #[test]
    fn blank_notation_is_empty() {
        assert!(parse_phonemes("  ").unwrap().is_empty());
    }
}
