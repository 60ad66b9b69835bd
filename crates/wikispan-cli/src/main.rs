use anyhow::{Context, Result, anyhow};
use std::{env, path::PathBuf, process};
use wikispan_config::{Config, OutputMode};
use wikispan_engine::{DataOptions, ParseOptions, SyntaxNode, WikiText, format_tree};

const PREVIEW_CHARS: usize = 40;

/// First line of a construct's text, shortened for the outline.
fn preview(text: &str) -> String {
    let line = text.lines().next().unwrap_or_default();
    let mut short: String = line.chars().take(PREVIEW_CHARS).collect();
    if short.len() < text.trim_end().len() {
        short.push('…');
    }
    short
}

/// One line per construct, indented by nesting.
fn render_outline(tree: &SyntaxNode) -> String {
    let mut out = String::new();
    for node in tree.descendants().skip(1) {
        let depth = node.ancestors().count() - 2;
        out.push_str(&format!(
            "{}{:?} {:?} {:?}\n",
            "  ".repeat(depth),
            node.kind(),
            node.text_range(),
            preview(&node.text().to_string())
        ));
    }
    out
}

fn render_tables(page: &WikiText) -> String {
    let mut out = String::new();
    for (i, table) in page.tables().iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&format!("table {} (nesting {})\n", i + 1, table.nesting_level()));
        if let Some(caption) = table.caption() {
            out.push_str(&format!("caption: {}\n", caption.trim()));
        }
        for row in table.data(&DataOptions::default()) {
            let cells: Vec<&str> = row
                .iter()
                .map(|cell| cell.as_deref().unwrap_or("-"))
                .collect();
            out.push_str(&format!("| {} |\n", cells.join(" | ")));
        }
    }
    out
}

fn render(page: &WikiText, mode: OutputMode) -> String {
    match mode {
        OutputMode::Outline => render_outline(&page.syntax_tree()),
        OutputMode::Tree => format_tree(&page.syntax_tree()),
        OutputMode::Tables => render_tables(page),
    }
}

fn run(args: &[String]) -> Result<String> {
    let config = Config::load()
        .with_context(|| format!("Failed to load {}", Config::config_path().display()))?
        .unwrap_or_default();

    let (path, mode) = match args {
        [_, path] => (path, config.output),
        [_, path, mode] => (path, mode.parse().map_err(|e: String| anyhow!(e))?),
        _ => {
            let program = args.first().map_or("wikispan-cli", String::as_str);
            return Err(anyhow!("Usage: {program} <file> [outline|tree|tables]"));
        }
    };

    let path = config.resolve_input(&PathBuf::from(path));
    log::info!("Reading {} as {mode}", path.display());
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let options = ParseOptions::with_extra_opaque_tags(config.extra_opaque_tags.iter().cloned());
    let page = WikiText::with_options(&text, &options);
    Ok(render(&page, mode))
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = env::args().collect();
    match run(&args) {
        Ok(output) => print!("{output}"),
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_outline_is_indented_by_nesting() {
        let page = WikiText::new("x {{a|[[b]]}}");
        let outline = render(&page, OutputMode::Outline);
        assert_eq!(
            outline,
            "TEMPLATE 2..13 \"{{a|[[b]]}}\"\n  WIKILINK 6..11 \"[[b]]\"\n"
        );
    }

    #[test]
    fn test_preview_keeps_the_first_line() {
        assert_eq!(preview("{{a\n|b}}"), "{{a…");
        assert_eq!(preview("short"), "short");
        assert_eq!(preview(&"é".repeat(50)).chars().count(), PREVIEW_CHARS + 1);
    }

    #[test]
    fn test_tables_render_as_grids() {
        let page = WikiText::new("{|\n|+ Cap\n|a||b\n|-\n|colspan=2|c\n|}");
        assert_eq!(
            render(&page, OutputMode::Tables),
            "table 1 (nesting 0)\ncaption: Cap\n| a | b |\n| c | c |\n"
        );
    }

    #[test]
    fn test_tree_mode_is_lossless() {
        let page = WikiText::new("a <!--b-->");
        let tree = render(&page, OutputMode::Tree);
        assert!(tree.starts_with("ROOT@0..10\n"));
        assert!(tree.contains("COMMENT@2..10"));
    }

    #[test]
    fn test_run_reads_the_file() {
        let temp_dir = TempDir::new().unwrap();
        let page = temp_dir.path().join("page.wiki");
        std::fs::write(&page, "{|\n|x\n|}").unwrap();
        let args = vec![
            "wikispan-cli".to_owned(),
            page.to_string_lossy().into_owned(),
            "tables".to_owned(),
        ];
        assert_eq!(run(&args).unwrap(), "table 1 (nesting 0)\n| x |\n");
    }

    #[test]
    fn test_run_rejects_bad_arguments() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.wiki");
        let args = vec!["wikispan-cli".to_owned()];
        assert!(run(&args).unwrap_err().to_string().starts_with("Usage:"));

        let args = vec![
            "wikispan-cli".to_owned(),
            missing.to_string_lossy().into_owned(),
            "tree".to_owned(),
        ];
        assert!(run(&args).unwrap_err().to_string().contains("missing.wiki"));

        let args = vec![
            "wikispan-cli".to_owned(),
            missing.to_string_lossy().into_owned(),
            "html".to_owned(),
        ];
        assert!(run(&args).unwrap_err().to_string().contains("unknown output mode"));
    }
}
