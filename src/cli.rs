use clap::Parser;
use log::LevelFilter;

#[derive(Parser, Debug)]
#[command(name = "zipview")]
#[command(version)]
#[command(about = "Inspect, test and extract ZIP archives from disk or HTTP", long_about = None)]
#[command(after_help = "Examples:\n  \
  zipview -t data1.zip           check every entry's CRC-32 without extracting\n  \
  zipview -p foo.zip '*.txt'     send matching members to stdout\n  \
  zipview -v https://example.com/archive.zip   list a remote archive verbosely")]
pub struct Cli {
    /// ZIP file path or HTTP URL
    #[arg(value_name = "FILE")]
    pub file: String,

    /// Members to process (default: all); `*` and `?` match any run / one char
    #[arg(value_name = "FILES")]
    pub files: Vec<String>,

    /// List files (short format)
    #[arg(short = 'l')]
    pub list: bool,

    /// List verbosely and log decoding details
    #[arg(short = 'v')]
    pub verbose: bool,

    /// Test archive: decompress every member and verify CRC-32 and size
    #[arg(short = 't')]
    pub test: bool,

    /// Print the archive comment
    #[arg(short = 'z')]
    pub comment: bool,

    /// Extract files to pipe, no messages
    #[arg(short = 'p')]
    pub pipe: bool,

    /// Extract files into exdir
    #[arg(short = 'd', value_name = "DIR")]
    pub extract_dir: Option<String>,

    /// Exclude files that follow
    #[arg(short = 'x', value_name = "FILE", num_args = 1..)]
    pub exclude: Vec<String>,

    /// Never overwrite existing files
    #[arg(short = 'n')]
    pub never_overwrite: bool,

    /// Overwrite files WITHOUT prompting
    #[arg(short = 'o')]
    pub overwrite: bool,

    /// Junk paths (do not make directories)
    #[arg(short = 'j')]
    pub junk_paths: bool,

    /// Quiet mode (-qq => quieter)
    #[arg(short = 'q', action = clap::ArgAction::Count)]
    pub quiet: u8,
}

impl Cli {
    pub fn is_http_url(&self) -> bool {
        crate::io::is_http_url(&self.file)
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet > 0 || self.pipe
    }

    pub fn is_very_quiet(&self) -> bool {
        self.quiet > 1
    }

    /// Default log filter when `RUST_LOG` is unset.
    pub fn log_level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::Debug
        } else if self.is_very_quiet() {
            LevelFilter::Error
        } else {
            LevelFilter::Warn
        }
    }

    /// Whether `name` is selected by the positional member patterns and not
    /// excluded by `-x`.
    pub fn selects(&self, name: &str) -> bool {
        let included = self.files.is_empty()
            || self.files.iter().any(|pattern| {
                if has_glob_chars(pattern) {
                    glob_match(pattern, name)
                } else {
                    name == pattern || base_name(name) == pattern
                }
            });

        included
            && !self
                .exclude
                .iter()
                .any(|x| name.contains(x.as_str()) || glob_match(x, name))
    }
}

/// Last path component of an archive member name.
pub fn base_name(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

fn has_glob_chars(pattern: &str) -> bool {
    pattern.contains(['*', '?'])
}

/// `*` matches any run of characters, `?` exactly one.
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();

    fn go(pattern: &[char], text: &[char]) -> bool {
        match (pattern.split_first(), text.split_first()) {
            (None, None) => true,
            (Some(('*', rest)), _) => {
                go(rest, text) || (!text.is_empty() && go(pattern, &text[1..]))
            }
            (Some(('?', rest)), Some((_, tail))) => go(rest, tail),
            (Some((p, rest)), Some((t, tail))) if p == t => go(rest, tail),
            _ => false,
        }
    }

    go(&pattern, &text)
}
