pub(crate) struct Symbols {
    pub spinner_frames: &'static [&'static str],
    pub prompt: &'static str,
    pub checked: &'static str,
    pub unchecked: &'static str,
    pub cursor: &'static str,
    pub crumb_separator: &'static str,
    pub ellipsis: &'static str,
    pub bullet: &'static str,
    pub warning: &'static str,
    pub code_bar: &'static str,
    pub skeleton: &'static str,
}

impl Symbols {
    pub fn current() -> &'static Self {
        #[cfg(windows)]
        {
            let is_modern = std::env::var("WT_SESSION").is_ok()
                || std::env::var("TERM_PROGRAM").is_ok()
                || std::env::var("ALACRITTY_WINDOW_ID").is_ok();
            if !is_modern {
                return &ASCII_SYMBOLS;
            }
        }
        &UNICODE_SYMBOLS
    }
}

const UNICODE_SYMBOLS: Symbols = Symbols {
    spinner_frames: &["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"],
    prompt: "❯",
    checked: "☑",
    unchecked: "☐",
    cursor: "▸",
    crumb_separator: "›",
    ellipsis: "…",
    bullet: "•",
    warning: "⚠",
    code_bar: "│",
    skeleton: "░",
};

#[cfg_attr(not(windows), allow(dead_code))]
const ASCII_SYMBOLS: Symbols = Symbols {
    spinner_frames: &["|", "/", "-", "\\"],
    prompt: ">",
    checked: "[x]",
    unchecked: "[ ]",
    cursor: ">",
    crumb_separator: ">",
    ellipsis: "...",
    bullet: "*",
    warning: "!",
    code_bar: "|",
    skeleton: "#",
};
