use crossterm::style::Stylize;

use crate::guide::render::{DisplayEntry, DisplayModel};
use crate::types::{ContentBlock, StepId};
use crate::ui::symbols::Symbols;

pub(crate) const GUIDE_TITLE: &str = "Your Step-by-Step Guide";
pub(crate) const ERRORS_TITLE: &str = "Potential Errors & Solutions";

/// Styled guide lines plus the row of the selected entry, if any.
pub(crate) struct GuideLines {
    pub lines: Vec<String>,
    pub selected_row: Option<usize>,
}

/// Lay out segmented content as terminal lines. Inline blocks flow into the
/// current line; code blocks, breadcrumbs and bullets start their own.
pub(crate) fn format_blocks(blocks: &[ContentBlock], indent: &str) -> Vec<String> {
    let sym = Symbols::current();
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut after_block = false;

    for block in blocks {
        match block {
            ContentBlock::Text(text) => {
                // The newline that ends a block-level item is not a blank line.
                let text = if after_block {
                    text.strip_prefix('\n').unwrap_or(text)
                } else {
                    text
                };
                let mut parts = text.split('\n');
                if let Some(first) = parts.next() {
                    current.push_str(first);
                }
                for part in parts {
                    lines.push(format!("{indent}{current}").trim_end().to_string());
                    current.clear();
                    current.push_str(part);
                }
                after_block = false;
                continue;
            }
            ContentBlock::InlineCode(code) => {
                current.push_str(&code.as_str().cyan().to_string());
                after_block = false;
                continue;
            }
            ContentBlock::Bold(text) => {
                current.push_str(&text.as_str().bold().to_string());
                after_block = false;
                continue;
            }
            ContentBlock::CodeBlock(code) => {
                flush_line(&mut lines, &mut current, indent);
                for line in code.lines() {
                    lines.push(format!("{indent}{} {}", sym.code_bar.dark_grey(), line.grey()));
                }
            }
            ContentBlock::Breadcrumb(parts) => {
                flush_line(&mut lines, &mut current, indent);
                let sep = format!(" {} ", sym.crumb_separator);
                lines.push(format!("{indent}{}", parts.join(&sep).dark_yellow()));
            }
            ContentBlock::BulletItem(item) => {
                flush_line(&mut lines, &mut current, indent);
                lines.push(format!("{indent}{} {}", sym.bullet.grey(), item));
            }
        }
        after_block = true;
    }
    flush_line(&mut lines, &mut current, indent);
    lines
}

fn flush_line(lines: &mut Vec<String>, current: &mut String, indent: &str) {
    if !current.trim().is_empty() {
        lines.push(format!("{indent}{current}").trim_end().to_string());
    }
    current.clear();
}

/// Checklist view of a guide. Step-list entries show their details when
/// `expand_all` is set or when they are selected; outline entries are one
/// line each, indented by level.
pub(crate) fn format_guide(
    model: &DisplayModel,
    selected: Option<usize>,
    expand_all: bool,
) -> GuideLines {
    let (done, total) = model.progress();
    let mut lines = vec![
        format!("  {} ({done}/{total})", GUIDE_TITLE.bold().yellow()),
        String::new(),
    ];
    let mut selected_row = None;

    for (i, entry) in model.entries.iter().enumerate() {
        let is_selected = selected == Some(i);
        if is_selected {
            selected_row = Some(lines.len());
        }
        lines.push(entry_header(entry, is_selected));

        if matches!(entry.id, StepId::Index(_)) && (expand_all || is_selected) {
            let indent = "        ";
            lines.extend(format_blocks(&entry.blocks, indent));
            lines.push(String::new());
        }
    }

    GuideLines {
        lines,
        selected_row,
    }
}

fn entry_header(entry: &DisplayEntry, is_selected: bool) -> String {
    let sym = Symbols::current();
    let pad = "  ".repeat(entry.level);
    let marker = if is_selected {
        sym.cursor.cyan().to_string()
    } else {
        " ".to_string()
    };
    let check = if entry.completed {
        sym.checked.green().to_string()
    } else {
        sym.unchecked.grey().to_string()
    };
    let title = match &entry.id {
        StepId::Index(n) => format!("{}. {}", n + 1, entry.title),
        StepId::Line(_) => format_blocks(&entry.blocks, "").join(" "),
    };
    let title = if entry.completed {
        title.green().to_string()
    } else if is_selected {
        title.bold().to_string()
    } else {
        title
    };
    format!("{marker} {pad}{check} {title}")
}

pub(crate) fn format_errors(model: &DisplayModel) -> Vec<String> {
    let sym = Symbols::current();
    let mut lines = vec![format!(
        "  {} {}",
        sym.warning.dark_yellow(),
        ERRORS_TITLE.bold().dark_yellow()
    )];
    for entry in &model.errors {
        lines.push(String::new());
        lines.push(format!("  {} {}", sym.bullet.red(), entry.error.as_str().bold()));
        lines.extend(format_blocks(&entry.blocks, "      "));
    }
    lines
}

/// One-line teaser shown under a guide that has potential errors.
pub(crate) fn errors_hint(model: &DisplayModel) -> Option<String> {
    let count = model.errors.len();
    if count == 0 {
        return None;
    }
    let noun = if count == 1 { "error" } else { "errors" };
    Some(
        format!(
            "  {} {count} potential {noun} · press e to view",
            Symbols::current().warning
        )
        .dark_yellow()
        .to_string(),
    )
}

pub(crate) fn placeholder_lines() -> Vec<String> {
    vec![
        String::new(),
        format!("  {}", "Ready for Liftoff?".bold()),
        "  Enter a DevOps task above, and we'll generate a clear, step-by-step guide to get you started."
            .grey()
            .to_string(),
    ]
}

/// Loading skeleton; bar widths mirror a short nested guide.
pub(crate) fn skeleton_lines(tick: u64) -> Vec<String> {
    const BARS: [(usize, usize); 7] = [(0, 20), (0, 30), (4, 26), (4, 20), (8, 14), (0, 34), (0, 30)];
    let sym = Symbols::current();
    let frame = sym.spinner_frames[(tick as usize) % sym.spinner_frames.len()];
    let mut lines = vec![format!("  {} Generating...", frame).cyan().to_string(), String::new()];
    for (indent, width) in BARS {
        lines.push(
            format!("  {}{}", " ".repeat(indent), sym.skeleton.repeat(width))
                .dark_grey()
                .to_string(),
        );
    }
    lines
}

pub(crate) fn error_lines(message: &str) -> Vec<String> {
    vec![
        String::new(),
        format!("  {}", "Error Generating Guide".red().bold()),
        format!("  {}", message).red().to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guide::completion::CompletedSet;
    use crate::guide::render::render;
    use crate::guide::segment::segment;
    use crate::types::{GuideData, GuideStep, PotentialError};
    use crate::ui::screen::strip_ansi;

    fn plain(lines: &[String]) -> Vec<String> {
        lines.iter().map(|l| strip_ansi(l)).collect()
    }

    fn sample() -> GuideData {
        GuideData::Steps {
            guide: vec![
                GuideStep {
                    step: "Install CLI".into(),
                    details: "Run `npm i -g tool`".into(),
                },
                GuideStep {
                    step: "Configure".into(),
                    details: "Open **Settings > Tokens**\n- create one\n- copy it".into(),
                },
            ],
            errors: vec![PotentialError {
                error: "EACCES".into(),
                solution: "Use ```sudo npm i -g tool```".into(),
            }],
        }
    }

    #[test]
    fn blocks_flow_inline_and_break_for_bullets() {
        let lines = plain(&format_blocks(&segment("intro `x` more\n- one\n- two\nend"), "  "));
        assert_eq!(lines, vec!["  intro x more", "  • one", "  • two", "  end"]);
    }

    #[test]
    fn code_block_gets_its_own_lines() {
        let lines = plain(&format_blocks(&segment("Apply:\n```\na\nb\n```\ndone"), ""));
        assert_eq!(lines, vec!["Apply:", "│ a", "│ b", "done"]);
    }

    #[test]
    fn breadcrumb_joins_with_separator() {
        let lines = plain(&format_blocks(&segment("**Home > Settings**"), ""));
        assert_eq!(lines, vec!["Home › Settings"]);
    }

    #[test]
    fn guide_shows_selected_details_only() {
        let model = render(&sample(), &CompletedSet::default());
        let out = format_guide(&model, Some(1), false);
        let text = plain(&out.lines).join("\n");
        assert!(text.contains("Your Step-by-Step Guide (0/2)"));
        assert!(text.contains("1. Install CLI"));
        assert!(!text.contains("npm i -g tool"));
        assert!(text.contains("Settings › Tokens"));
        assert!(text.contains("• create one"));
        assert_eq!(out.selected_row, Some(3));
    }

    #[test]
    fn completed_entries_are_checked() {
        let mut view = crate::guide::render::GuideView::new(sample());
        view.toggle(&StepId::Index(0));
        let out = format_guide(&view.display(), None, true);
        let text = plain(&out.lines);
        assert!(text[0].contains("(1/2)"));
        assert!(text.iter().any(|l| l.contains("☑ 1. Install CLI")));
        assert!(text.iter().any(|l| l.contains("☐ 2. Configure")));
    }

    #[test]
    fn tree_entries_are_indented_by_level() {
        let data = GuideData::Tree {
            tree: "Deploy\n  Build `image`\n".into(),
        };
        let model = render(&data, &CompletedSet::default());
        let text = plain(&format_guide(&model, None, true).lines);
        assert_eq!(text[2], "  ☐ Deploy");
        assert_eq!(text[3], "    ☐ Build image");
    }

    #[test]
    fn errors_panel_lists_solutions() {
        let model = render(&sample(), &CompletedSet::default());
        let text = plain(&format_errors(&model)).join("\n");
        assert!(text.contains(ERRORS_TITLE));
        assert!(text.contains("• EACCES"));
        assert!(text.contains("│ sudo npm i -g tool"));
        assert!(strip_ansi(&errors_hint(&model).unwrap()).contains("1 potential error "));
    }
}
