use crate::dom::{Document, InvalidMarkup, NodeData, NodeRef};
use crate::filter::{Filter, PointerFilters};
use crate::run::cli::OutputFormat;
use crate::run::RunOptions;
use crate::select::{ParseError, SelectorList};
use serde::Serialize;
use std::fmt::{Display, Formatter};
use std::io::Write;
use std::{env, io};
use tracing::debug;

/// The run's overall possible error.
#[derive(Debug)]
pub enum Error {
    /// User provided an invalid selector string, for any of the selector-taking options.
    ///
    /// This comes from [`SelectorList`'s `TryFrom::<&str>`][SelectorList#impl-TryFrom<%26str>-for-SelectorList].
    QueryParse(QueryParseError),

    /// The markup failed to parse.
    ///
    /// This comes from [`Document::parse`].
    MarkupParse(InvalidMarkup),

    /// Couldn't read an input file.
    FileReadError(Input, io::Error),

    /// No element matched the reference selector (which is given here).
    NoReference(String),

    /// No element matched an `--allow-within` or `--ignore-within` selector (which is given here).
    NoFilterNode(String),
}

impl std::error::Error for Error {}

/// Returned when a selector string is not valid.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct QueryParseError {
    query_string: String,
    error: ParseError,
}

impl std::error::Error for QueryParseError {}

impl Display for QueryParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.error.to_string(&self.query_string))
    }
}

/// Stdin or an input file by path.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Input {
    Stdin,
    FilePath(String),
}

impl Error {
    pub(crate) fn from_io_error(error: io::Error, file: Input) -> Self {
        Error::FileReadError(file, error)
    }
}

impl Display for Input {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Input::Stdin => f.write_str("stdin"),
            Input::FilePath(file) => write!(f, "file {file:?}"),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::QueryParse(err) => {
                writeln!(f, "Syntax error in selector:")?;
                writeln!(f, "{err}")
            }
            Error::MarkupParse(err) => {
                writeln!(f, "Markup parse error:")?;
                writeln!(f, "{err}")
            }
            Error::FileReadError(file, err) => {
                if env::var("NODEGATE_PORTABLE_ERRORS").unwrap_or_default().is_empty() {
                    writeln!(f, "{err} while reading {file}")
                } else {
                    writeln!(f, "{} while reading {file}", err.kind())
                }
            }
            Error::NoReference(selector) => writeln!(f, "no element matches the reference selector {selector:?}"),
            Error::NoFilterNode(selector) => writeln!(f, "no element matches {selector:?}"),
        }
    }
}

/// A simple facade for handling I/O.
///
/// This trait lets you do "I/O-y stuff" like mocking out stdin or reading files. The [`run`] method uses it.
pub trait OsFacade {
    /// Read stdin (or your mock of it) to a `String`.
    fn read_stdin(&self) -> io::Result<String>;

    /// Read a file path (or your mock of one) to a `String`.
    fn read_file(&self, path: &str) -> io::Result<String>;

    /// Get a writer for stdout (or your mock of it).
    fn stdout(&mut self) -> impl Write;

    /// Handle an error.
    fn write_error(&mut self, err: Error);

    /// Read a slice of file paths into a single, concatenated `String`.
    ///
    /// The default implementation (which you should feel free to use) treats the file path `"-"` as stdin. The first
    /// `"-"` reads all of stdin (via [`Self::read_stdin`]), and subsequent `"-"`s get silently ignored.
    fn read_all(&self, file_paths: &[String]) -> Result<String, Error> {
        if file_paths.is_empty() {
            return self.read_stdin().map_err(|err| Error::from_io_error(err, Input::Stdin));
        }
        let mut contents = String::new();
        let mut have_read_stdin = false;
        for path in file_paths {
            if path == "-" {
                if !have_read_stdin {
                    contents.push_str(
                        &self
                            .read_stdin()
                            .map_err(|err| Error::from_io_error(err, Input::Stdin))?,
                    );
                    have_read_stdin = true
                }
            } else {
                let path_contents = self
                    .read_file(path)
                    .map_err(|err| Error::from_io_error(err, Input::FilePath(path.to_string())))?;
                contents.push_str(&path_contents);
            }
            contents.push('\n');
        }
        Ok(contents)
    }
}

/// One row of output: how a single event target fared against the filters.
#[derive(Debug, Serialize)]
struct TargetReport {
    target: String,
    allowed: bool,
    allow_from: bool,
    ignore_from: bool,
}

/// Runs nodegate end to end.
///
/// This reads the markup via the [`OsFacade`], resolves [`RunOptions::reference`] and [`RunOptions::target`], and
/// then checks each target against the allow and ignore filters. Results go to the [`OsFacade`]'s stdout in the
/// format given by [`RunOptions::output`].
///
/// Returns whether any target was allowed.
pub fn run(cli: &RunOptions, os: &mut impl OsFacade) -> bool {
    match run_or_error(cli, os) {
        Ok(ok) => ok,
        Err(err) => {
            os.write_error(err);
            false
        }
    }
}

fn run_or_error(cli: &RunOptions, os: &mut impl OsFacade) -> Result<bool, Error> {
    let contents_str = os.read_all(&cli.input_file_paths)?;
    let doc = Document::parse(&contents_str).map_err(Error::MarkupParse)?;
    let root = doc.node(doc.root());

    let reference = parse_selector(&cli.reference)?
        .query_first(root)
        .ok_or_else(|| Error::NoReference(cli.reference.clone()))?;
    debug!("reference node: {reference:?}");

    let filters = PointerFilters {
        allow_from: resolve_filter(root, cli.allow_from.as_deref(), cli.allow_within.as_deref())?,
        ignore_from: resolve_filter(root, cli.ignore_from.as_deref(), cli.ignore_within.as_deref())?,
    };

    let mut targets = parse_selector(&cli.target)?.query_all(root);
    if cli.text_targets {
        targets = targets.into_iter().filter_map(first_text_child).collect();
    }
    debug!("testing {} target(s)", targets.len());

    let reports: Vec<_> = targets
        .into_iter()
        .map(|target| TargetReport {
            target: target.describe(),
            allowed: filters.test_ignore_allow(reference, target),
            allow_from: filters.test_allow(reference, target),
            ignore_from: filters.test_ignore(reference, target),
        })
        .collect();

    let found_any = reports.iter().any(|report| report.allowed);

    if !cli.quiet {
        let mut stdout = os.stdout();
        match cli.output {
            OutputFormat::Plain => {
                for report in &reports {
                    let verdict = if report.allowed { "allowed" } else { "denied" };
                    // Broken pipes and such aren't actionable here; the exit code still reflects the result.
                    let _ = writeln!(stdout, "{verdict} {}", report.target);
                }
            }
            OutputFormat::Json => {
                if let Err(err) = serde_json::to_writer(&mut stdout, &reports) {
                    debug!("couldn't write JSON output: {err}");
                }
            }
        }
    }

    Ok(found_any)
}

fn parse_selector(text: &str) -> Result<SelectorList, Error> {
    SelectorList::try_from(text).map_err(|error| {
        Error::QueryParse(QueryParseError {
            query_string: text.to_string(),
            error,
        })
    })
}

/// A `--*-from` selector becomes a selector filter; a `--*-within` selector becomes a node filter for the first
/// element it matches.
fn resolve_filter(root: NodeRef, from: Option<&str>, within: Option<&str>) -> Result<Filter, Error> {
    if let Some(from) = from {
        return Ok(Filter::Selector(parse_selector(from)?));
    }
    let Some(within) = within else {
        return Ok(Filter::None);
    };
    let node = parse_selector(within)?
        .query_first(root)
        .ok_or_else(|| Error::NoFilterNode(within.to_string()))?;
    Ok(Filter::from(node))
}

fn first_text_child(element: NodeRef) -> Option<NodeRef> {
    element
        .children()
        .find(|child| matches!(child.data(), NodeData::Text(text) if !text.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run::RunOptionsBuilder;
    use crate::util::utils_for_test::*;
    use indoc::indoc;

    struct MockIo {
        stdin: &'static str,
        stdout: Vec<u8>,
        errors: Vec<Error>,
    }

    impl MockIo {
        fn new(stdin: &'static str) -> Self {
            Self {
                stdin,
                stdout: Vec::new(),
                errors: Vec::new(),
            }
        }

        fn stdout_str(&self) -> String {
            String::from_utf8(self.stdout.clone()).unwrap()
        }
    }

    impl OsFacade for MockIo {
        fn read_stdin(&self) -> io::Result<String> {
            Ok(self.stdin.to_string())
        }

        fn read_file(&self, path: &str) -> io::Result<String> {
            Err(io::Error::new(io::ErrorKind::NotFound, path.to_string()))
        }

        fn stdout(&mut self) -> impl Write {
            &mut self.stdout
        }

        fn write_error(&mut self, err: Error) {
            self.errors.push(err)
        }
    }

    const CARD: &str = indoc! {r#"
        <main>
          <div class="card">
            <span class="handle">grab</span>
            <input class="field">
            <p>body <b>text</b></p>
          </div>
        </main>"#};

    fn options() -> RunOptionsBuilder {
        let mut builder = RunOptionsBuilder::default();
        builder.reference(".card");
        builder
    }

    #[test]
    fn plain_output() {
        let opts = options()
            .target("span, input, b")
            .allow_from(Some(".handle, b".to_string()))
            .ignore_from(Some("input".to_string()))
            .build()
            .unwrap();
        let mut os = MockIo::new(CARD);
        assert!(run(&opts, &mut os));
        assert_eq!(os.stdout_str(), "allowed span.handle\ndenied input.field\nallowed b\n");
        assert!(os.errors.is_empty());
    }

    #[test]
    fn json_output() {
        let opts = options()
            .target("input")
            .ignore_from(Some("input".to_string()))
            .output(OutputFormat::Json)
            .build()
            .unwrap();
        let mut os = MockIo::new(CARD);
        assert!(!run(&opts, &mut os));
        assert_eq!(
            os.stdout_str(),
            r#"[{"target":"input.field","allowed":false,"allow_from":true,"ignore_from":true}]"#
        );
    }

    #[test]
    fn ignore_wins_over_allow() {
        let opts = options()
            .target(".handle")
            .allow_from(Some(".handle".to_string()))
            .ignore_within(Some(".card".to_string()))
            .output(OutputFormat::Json)
            .build()
            .unwrap();
        let mut os = MockIo::new(CARD);
        assert!(!run(&opts, &mut os));
        assert_eq!(
            os.stdout_str(),
            r#"[{"target":"span.handle","allowed":false,"allow_from":true,"ignore_from":true}]"#
        );
    }

    #[test]
    fn text_targets_are_denied() {
        let opts = options().target("span, b").text_targets(true).build().unwrap();
        let mut os = MockIo::new(CARD);
        assert!(!run(&opts, &mut os));
        assert_eq!(os.stdout_str(), "denied #text\ndenied #text\n");
    }

    #[test]
    fn within_uses_containment() {
        let opts = options()
            .target("span, b")
            .allow_within(Some("p".to_string()))
            .build()
            .unwrap();
        let mut os = MockIo::new(CARD);
        assert!(run(&opts, &mut os));
        assert_eq!(os.stdout_str(), "denied span.handle\nallowed b\n");
    }

    #[test]
    fn quiet() {
        let opts = options().target("b").quiet(true).build().unwrap();
        let mut os = MockIo::new(CARD);
        assert!(run(&opts, &mut os));
        assert_eq!(os.stdout_str(), "");
    }

    #[test]
    fn missing_reference() {
        let opts = options().reference(".nope").build().unwrap();
        let mut os = MockIo::new(CARD);
        assert!(!run(&opts, &mut os));
        unwrap!(get_only(os.errors), Error::NoReference(selector));
        assert_eq!(selector, ".nope");
    }

    #[test]
    fn missing_within_node() {
        let opts = options().ignore_within(Some("table".to_string())).build().unwrap();
        let mut os = MockIo::new(CARD);
        assert!(!run(&opts, &mut os));
        let err = get_only(os.errors);
        assert_eq!(err.to_string(), "no element matches \"table\"\n");
    }

    #[test]
    fn bad_selector() {
        let opts = options().target("span >").build().unwrap();
        let mut os = MockIo::new(CARD);
        assert!(!run(&opts, &mut os));
        unwrap!(get_only(os.errors), Error::QueryParse(err));
        assert_eq!(err.query_string, "span >");
    }

    #[test]
    fn bad_markup() {
        let opts = options().build().unwrap();
        let mut os = MockIo::new("<div><span></div>");
        assert!(!run(&opts, &mut os));
        let err = get_only(os.errors);
        assert_eq!(err.to_string(), "Markup parse error:\nunexpected </div> at 1:12\n");
    }

    #[test]
    fn missing_file() {
        let opts = options().input_file_paths(vec!["nope.html".to_string()]).build().unwrap();
        let mut os = MockIo::new(CARD);
        assert!(!run(&opts, &mut os));
        unwrap!(get_only(os.errors), Error::FileReadError(Input::FilePath(path), _));
        assert_eq!(path, "nope.html");
    }
}
