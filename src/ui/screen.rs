use std::io::{self, Write};

use crossterm::{
    cursor,
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute, queue,
    style::{Color, Print, Stylize},
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use unicode_width::UnicodeWidthChar;

use crate::agent::pipeline::REQUEST_MAX_CHARS;
use crate::app::state::{App, Focus, ResultArea};
use crate::ui::format::{
    error_lines, errors_hint, format_errors, format_guide, placeholder_lines, skeleton_lines,
};
use crate::ui::symbols::Symbols;

pub(crate) const TITLE_BANNER: [&str; 6] = [
    r"   __                  _          ",
    r"  / _|_ __ __ _ _ __  | | ___   _ ",
    r" | |_| '__/ _` | '_ \ | |/ / | | |",
    r" |  _| | | (_| | | | ||   <| |_| |",
    r" |_| |_|  \__,_|_| |_||_|\_\\__, |",
    r"                            |___/ ",
];

const SUBTITLE: &str =
    "Enter a DevOps task below, and I'll generate a step-by-step guide for you.";

/// A composed frame: one string per terminal row plus the input cursor.
pub(crate) struct Frame {
    pub lines: Vec<String>,
    pub cursor: Option<(u16, u16)>,
}

/// Full-screen terminal surface. Raw mode and the alternate screen are
/// released on drop.
pub(crate) struct Screen {
    stdout: io::Stdout,
}

impl Screen {
    pub(crate) fn new() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(
            stdout,
            EnterAlternateScreen,
            EnableBracketedPaste,
            cursor::Hide
        )?;
        Ok(Self { stdout })
    }

    pub(crate) fn draw(&mut self, app: &App) -> io::Result<()> {
        let (cols, rows) = terminal::size().unwrap_or((80, 24));
        let frame = compose_frame(app, cols.max(1) as usize, rows.max(1) as usize);

        queue!(self.stdout, cursor::MoveTo(0, 0), Clear(ClearType::All))?;
        for (row, line) in frame.lines.iter().enumerate() {
            queue!(self.stdout, cursor::MoveTo(0, row as u16), Print(line))?;
        }
        match frame.cursor {
            Some((col, row)) => queue!(self.stdout, cursor::MoveTo(col, row), cursor::Show)?,
            None => queue!(self.stdout, cursor::Hide)?,
        }
        self.stdout.flush()
    }
}

impl Drop for Screen {
    fn drop(&mut self) {
        let _ = execute!(
            self.stdout,
            DisableBracketedPaste,
            cursor::Show,
            LeaveAlternateScreen
        );
        let _ = terminal::disable_raw_mode();
    }
}

pub(crate) fn compose_frame(app: &App, cols: usize, rows: usize) -> Frame {
    let sym = Symbols::current();
    let gold = Color::Rgb {
        r: 255,
        g: 215,
        b: 0,
    };

    let mut head: Vec<String> = TITLE_BANNER
        .iter()
        .map(|line| line.with(gold).bold().to_string())
        .collect();
    head.push(format!("  {}", SUBTITLE).grey().to_string());
    head.push(String::new());

    // Input line: the tail of the input stays visible while typing.
    let counter = format!(" {}/{}", app.input.chars().count(), REQUEST_MAX_CHARS);
    let prompt = format!("  {} ", sym.prompt);
    let budget = cols
        .saturating_sub(rendered_text_width(&prompt))
        .saturating_sub(rendered_text_width(&counter) + 1);
    let shown = fit_single_line_tail(&app.input, budget);
    let input_row = head.len();
    let cursor_col = rendered_text_width(&prompt) + rendered_text_width(&shown);
    let prompt_styled = if app.focus == Focus::Input {
        prompt.as_str().cyan().bold().to_string()
    } else {
        prompt.as_str().grey().to_string()
    };
    head.push(format!("{prompt_styled}{shown}{}", counter.dark_grey()));
    head.push(match &app.validation {
        Some(msg) => format!("    {}", msg).red().to_string(),
        None => String::new(),
    });
    head.push(
        format!("  {}", "─".repeat(cols.saturating_sub(4).min(76)))
            .dark_grey()
            .to_string(),
    );

    let (body, focus_row) = result_lines(app);
    let body_rows = rows.saturating_sub(head.len() + 1);
    let start = match focus_row {
        Some(row) if row >= body_rows => (row + 1).saturating_sub(body_rows),
        _ => 0,
    };

    let mut lines = head;
    lines.extend(body.into_iter().skip(start).take(body_rows));
    while lines.len() + 1 < rows {
        lines.push(String::new());
    }
    lines.push(hint_line(app).dark_grey().to_string());
    let lines = lines
        .into_iter()
        .take(rows)
        .map(|line| clip_line(line, cols))
        .collect();

    let cursor = (app.focus == Focus::Input && !app.generating)
        .then(|| (cursor_col.min(cols.saturating_sub(1)) as u16, input_row as u16));
    Frame { lines, cursor }
}

fn result_lines(app: &App) -> (Vec<String>, Option<usize>) {
    match &app.result {
        ResultArea::Placeholder => (placeholder_lines(), None),
        ResultArea::Loading => (skeleton_lines(app.spinner_tick), None),
        ResultArea::Failed(message) => (error_lines(message), None),
        ResultArea::Guide(view) => {
            let model = view.display();
            if app.show_errors {
                return (format_errors(&model), None);
            }
            let selected = (app.focus == Focus::Guide).then_some(app.selected);
            let mut out = format_guide(&model, selected, false);
            if let Some(hint) = errors_hint(&model) {
                out.lines.push(String::new());
                out.lines.push(hint);
            }
            (out.lines, out.selected_row)
        }
    }
}

fn hint_line(app: &App) -> String {
    let mode = format!("[{}]", app.mode.as_str());
    if app.generating {
        return format!("  {mode} generating… · Ctrl+C quit");
    }
    match (app.focus, app.guide().is_some()) {
        (Focus::Guide, true) => format!(
            "  {mode} ↑/↓ select · Space toggle done · e errors · Tab edit request · Ctrl+C quit"
        ),
        (_, true) => format!("  {mode} Enter generate · Tab back to guide · Ctrl+C quit"),
        _ => format!("  {mode} Enter generate · Ctrl+C quit"),
    }
}

fn clip_line(line: String, cols: usize) -> String {
    if rendered_text_width(&strip_ansi(&line)) <= cols {
        return line;
    }
    fit_single_line_head(&line, cols)
}

pub(crate) fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\u{1b}' && matches!(chars.peek(), Some('[')) {
            let _ = chars.next();
            for c in chars.by_ref() {
                if ('@'..='~').contains(&c) {
                    break;
                }
            }
            continue;
        }
        out.push(ch);
    }
    out
}

pub(crate) fn rendered_text_width(s: &str) -> usize {
    const TAB_STOP: usize = 8;
    let mut col = 0usize;
    for ch in s.chars() {
        match ch {
            '\t' => {
                let advance = TAB_STOP - (col % TAB_STOP);
                col += advance;
            }
            '\r' | '\n' => {}
            c if c.is_control() => {}
            c => col += UnicodeWidthChar::width(c).unwrap_or(0),
        }
    }
    col
}

/// Keep the end of `s` within `max_width`, prefixing an ellipsis when cut.
pub(crate) fn fit_single_line_tail(s: &str, max_width: usize) -> String {
    fit_single_line(s, max_width, true)
}

/// Keep the start of `s` within `max_width`, suffixing an ellipsis when cut.
pub(crate) fn fit_single_line_head(s: &str, max_width: usize) -> String {
    fit_single_line(s, max_width, false)
}

fn fit_single_line(s: &str, max_width: usize, keep_tail: bool) -> String {
    if max_width == 0 {
        return String::new();
    }

    let plain = strip_ansi(s).replace('\t', " ");
    if rendered_text_width(plain.as_str()) <= max_width {
        return plain;
    }

    let ellipsis = Symbols::current().ellipsis;
    let ellipsis_width = rendered_text_width(ellipsis);
    if max_width <= ellipsis_width {
        return ellipsis.to_string();
    }
    let budget = max_width - ellipsis_width;

    let visible = plain
        .chars()
        .filter(|ch| !(*ch == '\r' || *ch == '\n' || ch.is_control()));
    let ordered: Vec<char> = if keep_tail {
        visible.rev().collect()
    } else {
        visible.collect()
    };

    let mut kept: Vec<char> = Vec::new();
    let mut used = 0usize;
    for ch in ordered {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if w == 0 {
            continue;
        }
        if used + w > budget {
            break;
        }
        kept.push(ch);
        used += w;
    }

    if keep_tail {
        kept.reverse();
        let mut out = String::from(ellipsis);
        out.extend(kept);
        out
    } else {
        let mut out: String = kept.into_iter().collect();
        out.push_str(ellipsis);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::{compose_frame, fit_single_line_head, fit_single_line_tail, strip_ansi};
    use crate::agent::pipeline::GuideOutcome;
    use crate::app::state::App;
    use crate::types::{GuideData, GuideMode, GuideStep};

    fn frame_text(app: &App, rows: usize) -> Vec<String> {
        compose_frame(app, 100, rows)
            .lines
            .iter()
            .map(|l| strip_ansi(l))
            .collect()
    }

    #[test]
    fn idle_frame_shows_placeholder_and_counter() {
        let mut app = App::new(GuideMode::Steps);
        app.input = "Deploy".into();
        let frame = compose_frame(&app, 100, 30);
        assert_eq!(frame.lines.len(), 30);
        let text: Vec<String> = frame.lines.iter().map(|l| strip_ansi(l)).collect();
        assert!(text.iter().any(|l| l.contains("Ready for Liftoff?")));
        assert!(text.iter().any(|l| l.contains("❯ Deploy 6/200")));
        assert_eq!(frame.cursor, Some((10, 8)));
    }

    #[test]
    fn selected_step_stays_visible_in_short_terminals() {
        let mut app = App::new(GuideMode::Steps);
        app.input = "Deploy nginx to kubernetes".into();
        app.begin_submit();
        let guide = (0..20)
            .map(|i| GuideStep {
                step: format!("Step {i}"),
                details: "do it".into(),
            })
            .collect();
        app.finish_submit(GuideOutcome::Ready(GuideData::Steps {
            guide,
            errors: Vec::new(),
        }));
        app.move_selection(19);
        let text = frame_text(&app, 20);
        assert_eq!(text.len(), 20);
        assert!(text.iter().any(|l| l.contains("20. Step 19")));
        assert!(text.last().unwrap().contains("Space toggle done"));
    }

    #[test]
    fn failed_frame_shows_error_title() {
        let mut app = App::new(GuideMode::Tree);
        app.input = "Deploy nginx to kubernetes".into();
        app.begin_submit();
        app.finish_submit(GuideOutcome::Failed("nope".into()));
        let text = frame_text(&app, 24);
        assert!(text.iter().any(|l| l.contains("Error Generating Guide")));
        assert!(text.iter().any(|l| l.contains("nope")));
        assert!(text.last().unwrap().contains("[tree]"));
    }

    #[test]
    fn fitting_keeps_requested_end() {
        assert_eq!(fit_single_line_tail("abcdefgh", 5), "…efgh");
        assert_eq!(fit_single_line_head("abcdefgh", 5), "abcd…");
        assert_eq!(fit_single_line_head("abc", 5), "abc");
    }
}
