use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::domain::challenges::minigame::Minigame;

pub const KEY_PARTS: usize = 5;
pub const QUIZ_ROUND_SIZE: usize = 3;
pub const QUIZ_PASS_MARK: usize = 2;
pub const SLIDER_SOLVED: [u8; 9] = [1, 2, 3, 4, 5, 6, 7, 8, 0];

/// One slice of a recovery key, dealt to a specific game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPart {
    pub index: usize,
    pub value: String,
    pub game: Minigame,
}

/// Splits a key into up to five parts, dealt round-robin to the games in
/// `Minigame::ALL` order. Leading parts absorb the remainder, so a part
/// is never more than one character longer than the others.
pub fn split_key(key: &str) -> Vec<KeyPart> {
    if key.is_empty() {
        return Vec::new();
    }
    let chars: Vec<char> = key.chars().collect();
    let base = chars.len() / KEY_PARTS;
    let remainder = chars.len() % KEY_PARTS;
    let mut parts = Vec::new();
    let mut start = 0usize;
    for i in 0..KEY_PARTS {
        let size = base + usize::from(i < remainder);
        if size == 0 {
            continue;
        }
        let value: String = chars[start..start + size].iter().collect();
        parts.push(KeyPart {
            index: i,
            value,
            game: Minigame::ALL[i % Minigame::ALL.len()],
        });
        start += size;
    }
    parts
}

pub fn part_for(parts: &[KeyPart], game: Minigame) -> Option<&KeyPart> {
    parts.iter().find(|p| p.game == game)
}

/// Key as the player currently sees it: completed games show their slice,
/// the rest are starred out.
pub fn revealed_key(parts: &[KeyPart], completed: &HashSet<Minigame>) -> String {
    let mut out = String::new();
    for part in parts {
        if completed.contains(&part.game) {
            out.push_str(&part.value);
        } else {
            out.push_str(&"*".repeat(part.value.chars().count()));
        }
    }
    out
}

// --- Wheel spin ---

#[derive(Debug, Clone)]
pub struct WheelSegment {
    pub label: char,
    pub is_correct: bool,
}

/// Key characters hidden among decoys. At least four decoys, more when
/// the key part is short.
pub fn wheel_segments(rng: &mut impl Rng, key_part: &str) -> Vec<WheelSegment> {
    const CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    let mut segments: Vec<WheelSegment> = key_part
        .chars()
        .map(|c| WheelSegment {
            label: c.to_ascii_uppercase(),
            is_correct: true,
        })
        .collect();
    let decoy_count = 8usize.saturating_sub(segments.len()).max(4);
    for _ in 0..decoy_count {
        segments.push(WheelSegment {
            label: CHARS[rng.gen_range(0..CHARS.len())] as char,
            is_correct: false,
        });
    }
    segments.shuffle(rng);
    segments
}

// --- Quiz ---

#[derive(Debug, Clone)]
pub struct QuizQuestion {
    pub question: &'static str,
    pub options: [&'static str; 4],
    pub answer: usize,
}

pub static QUIZ_BANK: [QuizQuestion; 10] = [
    QuizQuestion {
        question: "What does AES stand for?",
        options: [
            "Advanced Encryption Standard",
            "Automatic Encryption System",
            "Applied Electronic Security",
            "Abstract Encoding Scheme",
        ],
        answer: 0,
    },
    QuizQuestion {
        question: "Which encryption is asymmetric?",
        options: ["AES", "DES", "RSA", "XOR"],
        answer: 2,
    },
    QuizQuestion {
        question: "What is the purpose of an IV in encryption?",
        options: [
            "Speed up encryption",
            "Add randomness",
            "Compress data",
            "Verify integrity",
        ],
        answer: 1,
    },
    QuizQuestion {
        question: "Which hash function is considered insecure?",
        options: ["SHA-256", "SHA-512", "MD5", "SHA-3"],
        answer: 2,
    },
    QuizQuestion {
        question: "What does XOR mean?",
        options: [
            "Extra Operational Register",
            "Exclusive OR",
            "Extended Output Result",
            "External Operation Request",
        ],
        answer: 1,
    },
    QuizQuestion {
        question: "What key size does AES-256 use?",
        options: ["128 bits", "192 bits", "256 bits", "512 bits"],
        answer: 2,
    },
    QuizQuestion {
        question: "What is a Caesar cipher?",
        options: [
            "Substitution cipher",
            "Block cipher",
            "Stream cipher",
            "Hash function",
        ],
        answer: 0,
    },
    QuizQuestion {
        question: "What does SSL stand for?",
        options: [
            "Secure Sockets Layer",
            "System Security Lock",
            "Safe Socket Link",
            "Secure System Login",
        ],
        answer: 0,
    },
    QuizQuestion {
        question: "What is a rainbow table used for?",
        options: [
            "Color encryption",
            "Password cracking",
            "Data compression",
            "Network routing",
        ],
        answer: 1,
    },
    QuizQuestion {
        question: "What is the purpose of salt in hashing?",
        options: [
            "Speed up hashing",
            "Prevent rainbow table attacks",
            "Compress data",
            "Encrypt the hash",
        ],
        answer: 1,
    },
];

/// Samples a round of distinct question indexes into `QUIZ_BANK`.
pub fn quiz_round(rng: &mut impl Rng) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..QUIZ_BANK.len()).collect();
    idx.shuffle(rng);
    idx.truncate(QUIZ_ROUND_SIZE);
    idx
}

pub fn grade_quiz(answer_key: &[usize], answers: &[usize]) -> (usize, usize) {
    let mut correct = 0;
    for (i, key) in answer_key.iter().enumerate() {
        if answers.get(i) == Some(key) {
            correct += 1;
        }
    }
    (correct, answer_key.len())
}

pub fn quiz_passed(correct: usize) -> bool {
    correct >= QUIZ_PASS_MARK
}

// --- Memory match ---

#[derive(Debug, Clone)]
pub struct MemoryCard {
    pub id: String,
    pub value: char,
    pub pair_id: usize,
    pub is_decoy: bool,
}

/// A pair per key character plus up to three decoy pairs, shuffled.
pub fn memory_cards(rng: &mut impl Rng, key_part: &str) -> Vec<MemoryCard> {
    let chars: Vec<char> = key_part.to_ascii_uppercase().chars().collect();
    let mut cards = Vec::new();
    for (i, c) in chars.iter().enumerate() {
        cards.push(MemoryCard {
            id: format!("{i}a"),
            value: *c,
            pair_id: i,
            is_decoy: false,
        });
        cards.push(MemoryCard {
            id: format!("{i}b"),
            value: *c,
            pair_id: i,
            is_decoy: false,
        });
    }
    let decoy_count = 3usize.min(26usize.saturating_sub(chars.len()));
    let mut letters: Vec<char> = ('A'..='Z').collect();
    letters.shuffle(rng);
    for (j, c) in letters.into_iter().take(decoy_count).enumerate() {
        let idx = chars.len() + j;
        cards.push(MemoryCard {
            id: format!("{idx}a"),
            value: c,
            pair_id: idx,
            is_decoy: true,
        });
        cards.push(MemoryCard {
            id: format!("{idx}b"),
            value: c,
            pair_id: idx,
            is_decoy: true,
        });
    }
    cards.shuffle(rng);
    cards
}

// --- Slider puzzle ---

/// 3x3 slider, scrambled by a walk of valid moves so it stays solvable.
pub fn slider_puzzle(rng: &mut impl Rng) -> Vec<u8> {
    let mut puzzle: Vec<u8> = SLIDER_SOLVED.to_vec();
    for _ in 0..100 {
        let empty = puzzle.iter().position(|&v| v == 0).unwrap_or(8);
        let mut moves = Vec::new();
        if empty >= 3 {
            moves.push(empty - 3);
        }
        if empty < 6 {
            moves.push(empty + 3);
        }
        if empty % 3 > 0 {
            moves.push(empty - 1);
        }
        if empty % 3 < 2 {
            moves.push(empty + 1);
        }
        let swap = moves[rng.gen_range(0..moves.len())];
        puzzle.swap(empty, swap);
    }
    puzzle
}

pub fn slider_solved(state: &[u8]) -> bool {
    state == SLIDER_SOLVED
}

// --- Word scramble ---

pub static SCRAMBLE_WORDS: [(&str, &str); 10] = [
    ("ENCRYPTION", "Process of encoding data"),
    ("DECRYPTION", "Process of decoding data"),
    ("ALGORITHM", "Set of rules for calculations"),
    ("CIPHERTEXT", "Encrypted message"),
    ("PLAINTEXT", "Unencrypted message"),
    ("SYMMETRIC", "Same key for encrypt/decrypt"),
    ("ASYMMETRIC", "Different keys for encrypt/decrypt"),
    ("HASHING", "One-way function"),
    ("SECURITY", "Protection from threats"),
    ("CRYPTOGRAPHY", "Science of secret writing"),
];

#[derive(Debug, Clone)]
pub struct Scramble {
    pub word: String,
    pub scrambled: String,
    pub hint: String,
}

pub fn scramble_round(rng: &mut impl Rng) -> Scramble {
    let (word, hint) = SCRAMBLE_WORDS[rng.gen_range(0..SCRAMBLE_WORDS.len())];
    let mut letters: Vec<char> = word.chars().collect();
    letters.shuffle(rng);
    while letters.iter().collect::<String>() == word {
        letters.shuffle(rng);
    }
    Scramble {
        word: word.to_string(),
        scrambled: letters.into_iter().collect(),
        hint: hint.to_string(),
    }
}

pub fn scramble_matches(submitted: &str, word: &str) -> bool {
    submitted.trim().eq_ignore_ascii_case(word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_twenty_chars_into_five_even_parts() {
        let parts = split_key("K7Q2M9X4L1P8Z3W6N5R0");
        assert_eq!(parts.len(), 5);
        assert!(parts.iter().all(|p| p.value.len() == 4));
        assert_eq!(parts[0].game, Minigame::Wheel);
        assert_eq!(parts[4].game, Minigame::Scramble);
        let joined: String = parts.iter().map(|p| p.value.as_str()).collect();
        assert_eq!(joined, "K7Q2M9X4L1P8Z3W6N5R0");
    }

    #[test]
    fn remainder_goes_to_the_leading_parts() {
        let parts = split_key("12345678901");
        let sizes: Vec<usize> = parts.iter().map(|p| p.value.len()).collect();
        assert_eq!(sizes, vec![3, 2, 2, 2, 2]);
    }

    #[test]
    fn short_keys_skip_trailing_games() {
        let parts = split_key("abc");
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[2].game, Minigame::Memory);
        assert!(part_for(&parts, Minigame::Scramble).is_none());
        assert!(split_key("").is_empty());
    }

    #[test]
    fn revealed_key_stars_out_unfinished_games() {
        let parts = split_key("ABCDEFGHIJ");
        let mut done = HashSet::new();
        done.insert(Minigame::Wheel);
        done.insert(Minigame::Slider);
        assert_eq!(revealed_key(&parts, &done), "AB****GH**");
        for g in Minigame::ALL {
            done.insert(g);
        }
        assert_eq!(revealed_key(&parts, &done), "ABCDEFGHIJ");
    }

    #[test]
    fn wheel_keeps_all_key_chars_and_pads_with_decoys() {
        let mut rng = rand::thread_rng();
        let segments = wheel_segments(&mut rng, "k9q2");
        let correct: Vec<char> = segments
            .iter()
            .filter(|s| s.is_correct)
            .map(|s| s.label)
            .collect();
        assert_eq!(correct.len(), 4);
        for c in ['K', '9', 'Q', '2'] {
            assert!(correct.contains(&c));
        }
        assert_eq!(segments.len(), 8);
    }

    #[test]
    fn quiz_round_is_a_sample_without_repeats() {
        let mut rng = rand::thread_rng();
        let round = quiz_round(&mut rng);
        assert_eq!(round.len(), QUIZ_ROUND_SIZE);
        let unique: HashSet<usize> = round.iter().copied().collect();
        assert_eq!(unique.len(), QUIZ_ROUND_SIZE);
        assert!(round.iter().all(|i| *i < QUIZ_BANK.len()));
    }

    #[test]
    fn quiz_grading_tolerates_short_answers() {
        assert_eq!(grade_quiz(&[0, 2, 1], &[0, 2, 1]), (3, 3));
        assert_eq!(grade_quiz(&[0, 2, 1], &[0, 1, 1]), (2, 3));
        assert_eq!(grade_quiz(&[0, 2, 1], &[0]), (1, 3));
        assert_eq!(grade_quiz(&[0, 2, 1], &[]), (0, 3));
        assert!(quiz_passed(2));
        assert!(!quiz_passed(1));
    }

    #[test]
    fn memory_cards_pair_up() {
        let mut rng = rand::thread_rng();
        let cards = memory_cards(&mut rng, "Z3W6");
        // 4 key pairs + 3 decoy pairs
        assert_eq!(cards.len(), 14);
        for pair_id in 0..7 {
            assert_eq!(cards.iter().filter(|c| c.pair_id == pair_id).count(), 2);
        }
        assert_eq!(cards.iter().filter(|c| c.is_decoy).count(), 6);
    }

    #[test]
    fn slider_puzzle_is_a_permutation_and_solvable_state_checks() {
        let mut rng = rand::thread_rng();
        let puzzle = slider_puzzle(&mut rng);
        let mut sorted = puzzle.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![0, 1, 2, 3, 4, 5, 6, 7, 8]);
        assert!(slider_solved(&[1, 2, 3, 4, 5, 6, 7, 8, 0]));
        assert!(!slider_solved(&[1, 2, 3, 4, 5, 6, 8, 7, 0]));
    }

    #[test]
    fn scramble_round_reorders_the_word() {
        let mut rng = rand::thread_rng();
        let round = scramble_round(&mut rng);
        assert_ne!(round.scrambled, round.word);
        let mut a: Vec<char> = round.scrambled.chars().collect();
        let mut b: Vec<char> = round.word.chars().collect();
        a.sort_unstable();
        b.sort_unstable();
        assert_eq!(a, b);
        assert!(scramble_matches(" encryption ", "ENCRYPTION"));
        assert!(!scramble_matches("decryption", "ENCRYPTION"));
    }
}
