use serde_json::Value;

/// Structured data pulled out of tool output on request
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedOutput {
    CommitHash(String),
    Created { number: u64, url: String },
    Json(Value),
}

/// Which parse, if any, the caller wants applied to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputParser {
    #[default]
    None,
    CommitHash,
    CreatedUrl,
    Json,
}

impl OutputParser {
    pub fn parse(self, stdout: &str) -> Result<Option<ParsedOutput>, String> {
        match self {
            OutputParser::None => Ok(None),
            OutputParser::CommitHash => parse_commit_hash(stdout).map(Some),
            OutputParser::CreatedUrl => parse_created_url(stdout).map(Some),
            OutputParser::Json => serde_json::from_str(stdout)
                .map(|value| Some(ParsedOutput::Json(value)))
                .map_err(|e| format!("invalid JSON: {}", e)),
        }
    }
}

/// Parse the short hash from `git commit` output
///
/// Expected first line: `[<branch> (root-commit)? <hash>] <subject>`
pub fn parse_commit_hash(output: &str) -> Result<ParsedOutput, String> {
    let first_line = output
        .lines()
        .find(|line| !line.trim().is_empty())
        .ok_or_else(|| "empty commit output".to_string())?;

    let inner = first_line
        .trim()
        .strip_prefix('[')
        .and_then(|rest| rest.split_once(']'))
        .map(|(inner, _)| inner)
        .ok_or_else(|| format!("unexpected commit output: {}", first_line))?;

    let hash = inner
        .split_whitespace()
        .last()
        .filter(|candidate| is_hex(candidate))
        .ok_or_else(|| format!("no commit hash in: {}", first_line))?;

    Ok(ParsedOutput::CommitHash(hash.to_string()))
}

fn is_hex(s: &str) -> bool {
    s.len() >= 4 && s.chars().all(|c| c.is_ascii_hexdigit())
}

/// Parse the URL printed by `gh pr create` / `gh issue create`
///
/// gh prints progress lines first; the URL is the last line, ending in
/// `/pull/<n>` or `/issues/<n>`.
pub fn parse_created_url(output: &str) -> Result<ParsedOutput, String> {
    let url = output
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| line.starts_with("https://") || line.starts_with("http://"))
        .ok_or_else(|| "no URL in output".to_string())?;

    let mut segments = url.trim_end_matches('/').rsplit('/');
    let number = segments
        .next()
        .and_then(|last| last.parse::<u64>().ok())
        .ok_or_else(|| format!("URL does not end in a number: {}", url))?;

    match segments.next() {
        Some("pull") | Some("issues") => Ok(ParsedOutput::Created {
            number,
            url: url.to_string(),
        }),
        _ => Err(format!("not a pull request or issue URL: {}", url)),
    }
}
