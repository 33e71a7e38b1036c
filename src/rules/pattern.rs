//! Path patterns shared by rule matchers and include/exclude filters.
//!
//! Two spellings are accepted. A pattern wrapped in slashes (`/\.jsx?$/i`) is a regex literal and
//! is searched anywhere in the asset path, the way a bundler `test` expression behaves. Anything
//! else is a glob which is translated into an equivalent regex and matched at any directory depth,
//! so `*.css` applies to `src/App.css` and `fonts/**` applies to `assets/fonts/icon.svg`.
//!
//! Globs understand `*`, `**`, character classes (`[a-z]`, `[!a-z]`), alternation (`{png,jpg}`)
//! and a postfix `?` that makes the preceding literal, class or group optional. The last one keeps
//! familiar extension patterns such as `*.jsx?` working without a regex literal.

use std::fmt;

use regex::{Regex, RegexBuilder};

/// Reasons a pattern can fail to compile.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
  /// The pattern text was blank.
  #[error("pattern is empty")]
  Empty,
  /// A regex literal started with `/` but never closed.
  #[error("regex literal is missing its closing `/`")]
  UnterminatedRegex,
  /// A regex literal carried a flag other than `i`, `m` or `s`.
  #[error("unsupported regex flag `{0}`")]
  UnsupportedFlag(char),
  /// A `[` character class was never closed.
  #[error("unclosed `[` character class")]
  UnclosedClass,
  /// A `{` alternation was never closed.
  #[error("unclosed `{{` alternation")]
  UnclosedGroup,
  /// A `}` appeared without a matching `{`.
  #[error("unmatched `}}`")]
  UnmatchedGroupClose,
  /// A `?` appeared where there is nothing to make optional.
  #[error("`?` at offset {0} must follow a literal, class or group")]
  DanglingOptional(usize),
  /// The pattern ended with a lone `\`.
  #[error("pattern ends with a dangling escape")]
  TrailingEscape,
  /// The regex engine rejected the pattern.
  #[error("{0}")]
  Regex(String),
}

/// Which spelling a pattern was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
  /// Glob translated into an anchored regex.
  Glob,
  /// Regex literal searched anywhere in the path.
  Regex,
}

/// A compiled path pattern.
#[derive(Debug, Clone)]
pub struct PathPattern {
  source: String,
  kind: PatternKind,
  regex: Regex,
}

impl PathPattern {
  /// Compile a glob or `/regex/flags` literal.
  pub fn parse(source: &str) -> Result<Self, PatternError> {
    let source = source.trim();
    if source.is_empty() {
      return Err(PatternError::Empty);
    }

    if let Some(literal) = source.strip_prefix('/') {
      let (body, flags) = literal
        .rsplit_once('/')
        .ok_or(PatternError::UnterminatedRegex)?;
      if body.is_empty() {
        return Err(PatternError::Empty);
      }

      return Ok(Self {
        source: source.to_string(),
        kind: PatternKind::Regex,
        regex: compile_regex_literal(body, flags)?,
      });
    }

    let translated = glob_to_regex(source)?;
    let regex = Regex::new(&translated).map_err(|err| PatternError::Regex(err.to_string()))?;
    Ok(Self {
      source: source.to_string(),
      kind: PatternKind::Glob,
      regex,
    })
  }

  /// Returns `true` when the forward-slash separated `path` satisfies the pattern.
  pub fn is_match(&self, path: &str) -> bool {
    self.regex.is_match(path)
  }

  /// Pattern text as it was written.
  pub fn as_str(&self) -> &str {
    &self.source
  }

  /// Spelling the pattern was written in.
  pub fn kind(&self) -> PatternKind {
    self.kind
  }

  /// Returns `true` for patterns that accept every possible path.
  pub fn matches_everything(&self) -> bool {
    match self.kind {
      PatternKind::Glob => {
        let glob = self.source.strip_prefix("./").unwrap_or(&self.source);
        matches!(glob, "*" | "**" | "**/*" | "**/**")
      }
      PatternKind::Regex => matches!(
        self.regex.as_str().trim_start_matches('^').trim_end_matches('$'),
        "" | ".*" | "(?s:.*)" | "(?s).*"
      ),
    }
  }
}

impl fmt::Display for PathPattern {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.source)
  }
}

fn compile_regex_literal(body: &str, flags: &str) -> Result<Regex, PatternError> {
  let mut builder = RegexBuilder::new(body);
  for flag in flags.chars() {
    match flag {
      'i' => {
        builder.case_insensitive(true);
      }
      'm' => {
        builder.multi_line(true);
      }
      's' => {
        builder.dot_matches_new_line(true);
      }
      other => return Err(PatternError::UnsupportedFlag(other)),
    }
  }

  builder
    .build()
    .map_err(|err| PatternError::Regex(err.to_string()))
}

/// Translate a glob into a regex that matches whole path segments at any depth.
fn glob_to_regex(glob: &str) -> Result<String, PatternError> {
  let glob = glob.strip_prefix("./").unwrap_or(glob);
  if glob.is_empty() {
    return Err(PatternError::Empty);
  }

  let chars: Vec<char> = glob.chars().collect();
  let mut out = String::from("(?:^|/)");
  let mut depth = 0usize;
  // Whether the last emitted token may take a `?` quantifier.
  let mut quantifiable = false;
  let mut index = 0;

  while index < chars.len() {
    match chars[index] {
      '*' => {
        if chars.get(index + 1) == Some(&'*') {
          if chars.get(index + 2) == Some(&'/') {
            out.push_str("(?:.*/)?");
            index += 3;
          } else {
            out.push_str(".*");
            index += 2;
          }
        } else {
          out.push_str("[^/]*");
          index += 1;
        }
        quantifiable = false;
        continue;
      }
      '?' => {
        if !quantifiable {
          return Err(PatternError::DanglingOptional(index));
        }
        out.push('?');
        quantifiable = false;
      }
      '[' => {
        let (class, next) = translate_class(&chars, index)?;
        out.push_str(&class);
        index = next;
        quantifiable = true;
        continue;
      }
      '{' => {
        depth += 1;
        out.push_str("(?:");
        quantifiable = false;
      }
      '}' => {
        if depth == 0 {
          return Err(PatternError::UnmatchedGroupClose);
        }
        depth -= 1;
        out.push(')');
        quantifiable = true;
      }
      ',' if depth > 0 => {
        out.push('|');
        quantifiable = false;
      }
      '\\' => {
        let escaped = chars.get(index + 1).ok_or(PatternError::TrailingEscape)?;
        push_literal(&mut out, *escaped);
        index += 2;
        quantifiable = true;
        continue;
      }
      literal => {
        push_literal(&mut out, literal);
        quantifiable = true;
      }
    }
    index += 1;
  }

  if depth > 0 {
    return Err(PatternError::UnclosedGroup);
  }

  out.push('$');
  Ok(out)
}

fn translate_class(chars: &[char], start: usize) -> Result<(String, usize), PatternError> {
  let mut index = start + 1;
  let mut class = String::from("[");
  if matches!(chars.get(index), Some('!') | Some('^')) {
    // Negated classes never cross a separator.
    class.push_str("^/");
    index += 1;
  }

  let body_start = index;
  while let Some(&ch) = chars.get(index) {
    match ch {
      ']' if index > body_start => {
        class.push(']');
        return Ok((class, index + 1));
      }
      '\\' | '[' | ']' | '&' | '~' | '^' => {
        class.push('\\');
        class.push(ch);
      }
      _ => class.push(ch),
    }
    index += 1;
  }

  Err(PatternError::UnclosedClass)
}

fn push_literal(out: &mut String, ch: char) {
  let mut buffer = [0u8; 4];
  out.push_str(&regex::escape(ch.encode_utf8(&mut buffer)));
}
