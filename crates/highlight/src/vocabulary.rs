/// Fixed word and symbol sets the tokenizer classifies against.
#[derive(Debug, Clone, Copy)]
pub struct Vocabulary {
    pub keywords: &'static [&'static str],
    pub builtins: &'static [&'static str],
    pub operators: &'static [char],
    pub comment: &'static str,
    /// Reserved framing character, flagged wherever it appears.
    pub flagged: char,
}

impl Vocabulary {
    /// Lua with the firmware's built-in modules.
    pub const LUA: Vocabulary = Vocabulary {
        keywords: &[
            "and", "break", "do", "else", "elseif", "end", "false", "for", "function", "if", "in",
            "local", "nil", "not", "or", "repeat", "return", "then", "true", "until", "while",
            "goto",
        ],
        builtins: &[
            "print", "type", "next", "pairs", "ipairs", "tonumber", "tostring", "string", "table",
            "math", "debug", "CAN", "gpio", "tmr", "wifi", "net", "file", "node", "SPI", "I2C",
            "UART", "bit", "crypto", "sjson", "COM",
        ],
        operators: &[
            '+', '-', '*', '/', '%', '^', '=', '~', '<', '>', '(', ')', '{', '}', '[', ']', ',',
            ';', ':', '.',
        ],
        comment: "--",
        flagged: '$',
    };

    pub fn is_keyword(&self, word: &str) -> bool {
        self.keywords.contains(&word)
    }

    pub fn is_builtin(&self, word: &str) -> bool {
        self.builtins.contains(&word)
    }

    pub fn is_operator(&self, c: char) -> bool {
        self.operators.contains(&c)
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::LUA
    }
}
