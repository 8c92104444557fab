use clap::{Parser, ValueEnum};
use derive_builder::Builder;
use std::fmt::{Display, Formatter};

macro_rules! create_options_structs {
    (
        $(
            $(#[$meta:meta])*
            clap $clap:tt
            pub $name:ident : $ty:ty
        ),* $(,)?
    ) => {
        #[derive(Clone, Default, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Parser)]
        #[command(version, about, long_about = None)]
        #[doc(hidden)]
        pub struct CliOptions {
            $(
            $(#[$meta])*
            #[arg$clap]
            pub(crate) $name: $ty,
            )*

            // clap-only stuff:

            /// An optional list of markup files to read, by path. If not provided, standard input will be used.
            ///
            /// If these are provided, nodegate will act as if they were all concatenated into a single document.
            ///
            /// A path of "-" represents standard input. If you provide the same file twice, nodegate will read it
            /// twice, unless that file is "-"; all but the first "-" paths are ignored.
            #[arg()]
            pub(crate) input_file_paths: Vec<String>,
        }

        /// Options analogous to the nodegate CLI's switches.
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Builder)]
        #[builder(default)]
        pub struct RunOptions {
            $(
            $(#[$meta])*
            #[builder(setter(into))]
            pub $name: $ty,
            )*

            #[builder(setter(into))]
            pub input_file_paths: Vec<String>,
        }

        impl From<CliOptions> for RunOptions {
            fn from(value: CliOptions) -> Self {
                Self {
                    $($name: value.$name,)*
                    input_file_paths: value.input_file_paths,
                }
            }
        }
    };
}

create_options_structs! {
    /// Selector for the reference node: the element an interactable is bound to.
    ///
    /// The first matching element, in document order, is used. Selector filters never look above it.
    clap(long, short)
    pub reference: String,

    /// Selector for the event targets to test. Every matching element is tested.
    clap(long, short)
    pub target: String,

    /// Only allow interactions from targets that match this selector, or have an ancestor (up to and including the
    /// reference node) that does.
    clap(long, group = "allow")
    pub allow_from: Option<String>,

    /// Only allow interactions from within the first element matching this selector.
    ///
    /// Unlike --allow-from, this isn't bounded by the reference node.
    clap(long, group = "allow")
    pub allow_within: Option<String>,

    /// Ignore interactions from targets that match this selector, or have an ancestor (up to and including the
    /// reference node) that does.
    clap(long, group = "ignore")
    pub ignore_from: Option<String>,

    /// Ignore interactions from within the first element matching this selector.
    clap(long, group = "ignore")
    pub ignore_within: Option<String>,

    /// Test each target's first non-blank text node instead of the target element itself.
    ///
    /// Text nodes are never allowed, so this is mostly useful for seeing how pointer events that land on text are
    /// handled.
    clap(long)
    pub text_targets: bool,

    /// Specifies the output format. Defaults to plain.
    clap(long, short, default_value_t = OutputFormat::Plain)
    pub output: OutputFormat,

    /// Quiet: do not print anything to stdout. The exit code will still be 0 if any target is allowed, and non-0 if
    /// none are.
    clap(long, short)
    pub quiet: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            reference: ":root".to_string(),
            target: "*".to_string(),
            allow_from: None,
            allow_within: None,
            ignore_from: None,
            ignore_within: None,
            text_targets: false,
            output: OutputFormat::Plain,
            quiet: false,
            input_file_paths: vec![],
        }
    }
}

/// Output formats, analogous to `--output` in the CLI.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum)]
pub enum OutputFormat {
    /// One line per target: `allowed <target>` or `denied <target>`.
    #[default]
    Plain,

    /// A JSON array with one object per target, including which of the filters it satisfied.
    Json,
}

impl Display for OutputFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let self_str = match self {
            OutputFormat::Plain => "plain",
            OutputFormat::Json => "json",
        };
        f.write_str(self_str)
    }
}

#[cfg(test)]
mod tests {
    use crate::run::cli::{CliOptions, OutputFormat};
    use crate::run::{RunOptions, RunOptionsBuilder};
    use crate::util::utils_for_test::*;
    use clap::{Error, Parser};

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        CliOptions::command().debug_assert();
    }

    #[test]
    fn minimal_args() {
        let result = CliOptions::try_parse_from(["nodegate", "--reference", ".card", "--target", "span"]);
        unwrap!(result, Ok(cli));
        assert!(cli.input_file_paths.is_empty());
        let run_opts: RunOptions = cli.into();
        assert_eq!(run_opts.reference, ".card");
        assert_eq!(run_opts.target, "span");
        assert_eq!(run_opts.allow_from, None);
        assert_eq!(run_opts.output, OutputFormat::Plain);
    }

    #[test]
    fn short_args_and_files() {
        let result = CliOptions::try_parse_from(["nodegate", "-r", "div", "-t", "p", "-o", "json", "a.html", "-"]);
        unwrap!(result, Ok(cli));
        let run_opts: RunOptions = cli.into();
        assert_eq!(run_opts.output, OutputFormat::Json);
        assert_eq!(run_opts.input_file_paths, ["a.html", "-"]);
    }

    #[test]
    fn reference_is_required() {
        let result = CliOptions::try_parse_from(["nodegate", "--target", "span"]);
        check_err(&result, "the following required arguments were not provided:");
    }

    #[test]
    fn allow_from_and_within_conflict() {
        let result = CliOptions::try_parse_from([
            "nodegate",
            "-r",
            "div",
            "-t",
            "p",
            "--allow-from",
            ".a",
            "--allow-within",
            ".b",
        ]);
        check_err(&result, "the argument '--allow-from <ALLOW_FROM>' cannot be used with '--allow-within <ALLOW_WITHIN>'");
    }

    #[test]
    fn allow_and_ignore_combine() {
        let result = CliOptions::try_parse_from([
            "nodegate",
            "-r",
            "div",
            "-t",
            "p",
            "--allow-from",
            ".a",
            "--ignore-within",
            ".b",
        ]);
        unwrap!(result, Ok(cli));
        let run_opts: RunOptions = cli.into();
        assert_eq!(run_opts.allow_from.as_deref(), Some(".a"));
        assert_eq!(run_opts.ignore_within.as_deref(), Some(".b"));
    }

    #[test]
    fn builder_fills_defaults() {
        let built = RunOptionsBuilder::default()
            .reference(".card")
            .allow_from(Some(".handle".to_string()))
            .build()
            .unwrap();
        assert_eq!(built.reference, ".card");
        assert_eq!(built.target, "*");
        assert_eq!(built.allow_from.as_deref(), Some(".handle"));
        assert!(!built.quiet);
    }

    fn check_err(result: &Result<CliOptions, Error>, expect: &str) {
        unwrap!(result, Err(e));
        let e_str = e.to_string();
        let first_line = e_str.split('\n').next().expect("no error string found");
        let mut expect_full = "error: ".to_string();
        expect_full.push_str(expect);
        assert_eq!(first_line, &expect_full);
    }
}
