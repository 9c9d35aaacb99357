/// The five key-reveal games, in the order key parts are dealt to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Minigame {
    Wheel,
    Quiz,
    Memory,
    Slider,
    Scramble,
}

impl Minigame {
    pub const ALL: [Minigame; 5] = [
        Minigame::Wheel,
        Minigame::Quiz,
        Minigame::Memory,
        Minigame::Slider,
        Minigame::Scramble,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Minigame::Wheel => "wheel",
            Minigame::Quiz => "quiz",
            Minigame::Memory => "memory",
            Minigame::Slider => "slider",
            Minigame::Scramble => "scramble",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "wheel" => Some(Minigame::Wheel),
            "quiz" => Some(Minigame::Quiz),
            "memory" => Some(Minigame::Memory),
            "slider" => Some(Minigame::Slider),
            "scramble" => Some(Minigame::Scramble),
            _ => None,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Minigame::Wheel => "Wheel Spin",
            Minigame::Quiz => "Crypto Quiz",
            Minigame::Memory => "Memory Match",
            Minigame::Slider => "Slider Puzzle",
            Minigame::Scramble => "Word Scramble",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_any_case() {
        assert_eq!(Minigame::parse("Wheel"), Some(Minigame::Wheel));
        assert_eq!(Minigame::parse("SCRAMBLE"), Some(Minigame::Scramble));
        assert_eq!(Minigame::parse("chess"), None);
    }

    #[test]
    fn all_lists_five_games_in_deal_order() {
        assert_eq!(Minigame::ALL.len(), 5);
        assert_eq!(Minigame::ALL[0], Minigame::Wheel);
        assert_eq!(Minigame::ALL[4], Minigame::Scramble);
    }
}
