//! The codebase digest: one text file holding a repository's structure and
//! the contents of its text files.
//!
//! ~~~text
//! # Repository Structure
//!
//! ```
//! repo/
//!   Cargo.toml
//!   src/main.rs
//! ```
//!
//! ## File: Cargo.toml
//!
//! ```
//! [package]
//! ```
//! ~~~
//!
//! The scanners read the digest instead of walking the codebase again.

const STRUCTURE_HEADER: &str = "# Repository Structure";
const FILE_HEADER: &str = "## File: ";
const FENCE: &str = "```";

/// A file included in the digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestFile {
  /// Path relative to the codebase root, `/`-separated.
  pub path: String,
  pub content: String,
}

/// Render a digest for the codebase named `root_name`.
///
/// `listed` is every path in the tree; `files` the subset whose contents are
/// included. Both are expected in display order.
pub fn render(root_name: &str, listed: &[String], files: &[DigestFile]) -> String {
  let mut out = String::new();
  out.push_str(STRUCTURE_HEADER);
  out.push_str("\n\n");
  out.push_str(FENCE);
  out.push('\n');
  out.push_str(root_name);
  out.push_str("/\n");
  for path in listed {
    out.push_str("  ");
    out.push_str(path);
    out.push('\n');
  }
  out.push_str(FENCE);
  out.push('\n');

  for file in files {
    out.push('\n');
    out.push_str(FILE_HEADER);
    out.push_str(&file.path);
    out.push_str("\n\n");
    out.push_str(&fence_for(&file.content));
    out.push('\n');
    out.push_str(&file.content);
    if !file.content.ends_with('\n') {
      out.push('\n');
    }
    out.push_str(&fence_for(&file.content));
    out.push('\n');
  }

  out
}

/// A fence longer than any backtick run in `content`.
fn fence_for(content: &str) -> String {
  let longest = content
    .lines()
    .filter_map(|line| {
      let run = line.trim_start().chars().take_while(|&c| c == '`').count();
      (run >= FENCE.len()).then_some(run)
    })
    .max()
    .unwrap_or(0);
  "`".repeat(longest.max(FENCE.len() - 1) + 1)
}

/// A parsed digest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Digest {
  /// Paths listed in the structure section.
  pub listed: Vec<String>,
  pub files: Vec<DigestFile>,
}

impl Digest {
  /// Parse a digest. Text that does not follow the layout is ignored, so any
  /// file parses, possibly to an empty digest.
  pub fn parse(text: &str) -> Self {
    let mut digest = Digest::default();
    let mut lines = text.lines();

    while let Some(line) = lines.next() {
      if line == STRUCTURE_HEADER {
        digest.listed = parse_structure(&mut lines);
      } else if let Some(path) = line.strip_prefix(FILE_HEADER) {
        if let Some(content) = parse_fenced(&mut lines) {
          digest.files.push(DigestFile {
            path: path.trim().to_string(),
            content,
          });
        }
      }
    }

    digest
  }
}

fn parse_structure<'a>(lines: &mut impl Iterator<Item = &'a str>) -> Vec<String> {
  let mut listed = Vec::new();
  if !lines.any(|l| l.starts_with(FENCE)) {
    return listed;
  }

  let mut root_seen = false;
  for line in lines.by_ref() {
    if line.starts_with(FENCE) {
      break;
    }
    if !root_seen {
      root_seen = true;
      continue;
    }
    let path = line.trim();
    if !path.is_empty() {
      listed.push(path.to_string());
    }
  }
  listed
}

fn parse_fenced<'a>(lines: &mut impl Iterator<Item = &'a str>) -> Option<String> {
  let fence = lines.by_ref().find(|l| l.starts_with(FENCE))?.trim_end();
  let mut content = String::new();
  for line in lines.by_ref() {
    if line.trim_end() == fence {
      return Some(content);
    }
    content.push_str(line);
    content.push('\n');
  }
  Some(content)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn file(path: &str, content: &str) -> DigestFile {
    DigestFile {
      path: path.to_string(),
      content: content.to_string(),
    }
  }

  #[test]
  fn test_render_layout() {
    let listed = vec!["README.md".to_string(), "src/main.rs".to_string()];
    let files = vec![file("README.md", "# Demo\n")];

    let text = render("demo", &listed, &files);

    assert_eq!(
      text,
      "# Repository Structure\n\n```\ndemo/\n  README.md\n  src/main.rs\n```\n\n\
       ## File: README.md\n\n```\n# Demo\n```\n"
    );
  }

  #[test]
  fn test_parse_rendered_digest() {
    let listed = vec!["a.py".to_string(), "docs/b.md".to_string()];
    let files = vec![
      file("a.py", "print('hi')\n"),
      file("docs/b.md", "Example:\n```sh\nrun\n```\n"),
    ];

    let digest = Digest::parse(&render("repo", &listed, &files));

    assert_eq!(digest.listed, listed);
    assert_eq!(digest.files, files);
  }

  #[test]
  fn test_parse_unrelated_text() {
    assert_eq!(Digest::parse("just some notes\n"), Digest::default());
  }
}
