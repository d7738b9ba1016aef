//-
// Copyright (c) 2026, Jason Lingle
//
// This file is part of maildir-mbox.
//
// maildir-mbox is free software: you can redistribute it and/or modify it
// under the terms of the GNU General Public License as published by the Free
// Software Foundation, either version 3 of the License, or (at your option)
// any later version.
//
// maildir-mbox is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or
// FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for
// more details.
//
// You should have received a copy of the GNU General Public License along with
// maildir-mbox. If not, see <http://www.gnu.org/licenses/>.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use structopt::StructOpt;

use super::convert::convert_tree;
use crate::progress::Reporter;
use crate::support::config::ConvertConfig;
use crate::support::sysexits::*;
use crate::transfer::TransferOptions;

/// Convert a tree of Maildir folders into one mbox file per folder.
///
/// Every directory under SOURCE (including SOURCE itself) which contains
/// `cur`, `new` and `tmp` is converted into `<name>.mbox` in DESTINATION. The
/// root folder becomes `Inbox.mbox`; nested folders have their leading dot
/// removed and path separators replaced with underscores, so
/// `.Lists/rust` becomes `Lists_rust.mbox`. Existing archives are
/// overwritten.
///
/// Messages which cannot be parsed are copied verbatim. Messages which cannot
/// be read at all are replaced with a placeholder.
///
/// The exit status is 0 if at least one message was written, 1 on
/// configuration errors, and 2 if there was nothing to convert.
#[derive(StructOpt, Debug, Default)]
#[structopt(max_term_width = 80)]
pub(super) struct Options {
    /// Read settings from this TOML file. Command-line options override it.
    #[structopt(short, long, parse(from_os_str))]
    pub(super) config: Option<PathBuf>,

    /// Configure logging with this log4rs TOML file instead of writing
    /// warnings to standard error.
    #[structopt(long, parse(from_os_str))]
    pub(super) log_config: Option<PathBuf>,

    /// Print a line for every message instead of periodic summaries.
    #[structopt(short = "v", long)]
    pub(super) per_message: bool,

    /// Print a summary line every this many messages; 0 disables them
    /// [default: 200]
    #[structopt(long)]
    pub(super) tick: Option<usize>,

    /// Flush archives to disk every this many messages [default: 200]
    #[structopt(long)]
    pub(super) flush_interval: Option<usize>,

    /// The root of the Maildir tree.
    #[structopt(parse(from_os_str))]
    pub(super) source: Option<PathBuf>,

    /// The directory to write mbox files into. Created if needed.
    #[structopt(parse(from_os_str))]
    pub(super) destination: Option<PathBuf>,
}

impl Options {
    /// Apply these options on top of `config`.
    fn merge_into(self, config: &mut ConvertConfig) {
        if self.source.is_some() {
            config.source = self.source;
        }
        if self.destination.is_some() {
            config.destination = self.destination;
        }
        if self.per_message {
            config.progress.per_message = true;
        }
        if let Some(tick) = self.tick {
            config.progress.tick = tick;
        }
        if let Some(flush_interval) = self.flush_interval {
            config.archive.flush_interval = flush_interval;
        }
    }
}

pub fn main() {
    // Clap exits with status 1 instead of EX_USAGE if we use the more concise
    // API
    let options = Options::from_clap(&match Options::clap().get_matches_safe()
    {
        Ok(matches) => matches,
        Err(
            e @ clap::Error {
                kind: clap::ErrorKind::HelpDisplayed,
                ..
            },
        )
        | Err(
            e @ clap::Error {
                kind: clap::ErrorKind::VersionDisplayed,
                ..
            },
        ) => {
            println!("{}", e.message);
            return;
        }
        Err(e) => {
            eprintln!("{}", e.message);
            EX_USAGE.exit()
        }
    });

    if let Err(exit) = init_logging(options.log_config.as_deref()) {
        exit.exit();
    }

    let config = match load_config(options) {
        Ok(config) => config,
        Err(exit) => exit.exit(),
    };

    let (source, destination) = match check_paths(&config) {
        Ok(paths) => paths,
        Err(exit) => exit.exit(),
    };

    let transfer_options = TransferOptions {
        flush_interval: config.flush_interval(),
    };
    let mut reporter = Reporter::new(io::stdout(), config.progress_mode());
    match convert_tree(source, destination, &transfer_options, &mut reporter)
    {
        Ok(summary) => summary.exit_status().exit(),
        Err(e) => {
            eprintln!("Error converting '{}': {}", source.display(), e);
            EX_CONFIG.exit()
        }
    }
}

fn load_config(mut options: Options) -> Result<ConvertConfig, Sysexit> {
    let mut config = match options.config.take() {
        None => ConvertConfig::default(),
        Some(path) => match ConvertConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!(
                    "Error in config file at '{}': {}",
                    path.display(),
                    e
                );
                return Err(EX_CONFIG);
            }
        },
    };

    options.merge_into(&mut config);
    Ok(config)
}

fn check_paths(config: &ConvertConfig) -> Result<(&Path, &Path), Sysexit> {
    let source = match config.source {
        Some(ref source) => source,
        None => {
            eprintln!("No source provided. Exiting.");
            return Err(EX_CONFIG);
        }
    };

    if !source.is_dir() {
        eprintln!("Source path does not exist: {}", source.display());
        return Err(EX_CONFIG);
    }

    let destination = match config.destination {
        Some(ref destination) => destination,
        None => {
            eprintln!("No destination provided. Exiting.");
            return Err(EX_CONFIG);
        }
    };

    if let Err(e) = fs::create_dir_all(destination) {
        eprintln!(
            "Unable to create destination '{}': {}",
            destination.display(),
            e
        );
        return Err(EX_CONFIG);
    }

    Ok((source, destination))
}

fn init_logging(log_config: Option<&Path>) -> Result<(), Sysexit> {
    if let Some(path) = log_config {
        return log4rs::init_file(path, log4rs::config::Deserializers::new())
            .map_err(|e| {
                eprintln!(
                    "Error in logging configuration '{}': {}",
                    path.display(),
                    e
                );
                EX_CONFIG
            });
    }

    let pattern = if Ok(true) == nix::unistd::isatty(2) {
        "{h({l})}: {m}{n}"
    } else {
        "{d(%Y-%m-%dT%H:%M:%S)} {l} [{t}] {m}{n}"
    };
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(pattern)))
        .build();

    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(LevelFilter::Info))
        .map_err(|e| {
            eprintln!("Unable to configure logging: {}", e);
            EX_CONFIG
        })?;

    log4rs::init_config(config).map(|_| ()).map_err(|e| {
        eprintln!("Unable to initialise logging: {}", e);
        EX_CONFIG
    })
}

#[cfg(test)]
mod test {
    use std::io::Write;

    use super::*;
    use crate::progress::ProgressMode;

    fn parse(args: &[&str]) -> Options {
        Options::from_iter_safe(
            std::iter::once("maildir-mbox").chain(args.iter().copied()),
        )
        .unwrap()
    }

    #[test]
    fn defaults_without_config_file() {
        let config = load_config(parse(&["src", "dst"])).unwrap();
        assert_eq!(Some(Path::new("src")), config.source.as_deref());
        assert_eq!(Some(Path::new("dst")), config.destination.as_deref());
        assert_eq!(ProgressMode::Periodic(200), config.progress_mode());
        assert_eq!(200, config.flush_interval());
    }

    #[test]
    fn command_line_flags() {
        let config = load_config(parse(&[
            "-v",
            "--flush-interval",
            "0",
            "--tick",
            "5",
            "src",
        ]))
        .unwrap();
        assert_eq!(None, config.destination);
        assert_eq!(ProgressMode::PerMessage, config.progress_mode());
        assert_eq!(5, config.progress.tick);
        assert_eq!(1, config.flush_interval());
    }

    #[test]
    fn command_line_overrides_config_file() {
        let tmpdir = tempfile::TempDir::new().unwrap();
        let path = tmpdir.path().join("config.toml");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(
            file,
            "source = \"/file/src\"\n\
             destination = \"/file/dst\"\n\
             [progress]\n\
             tick = 10\n\
             [archive]\n\
             flush_interval = 50"
        )
        .unwrap();
        drop(file);

        let config = load_config(parse(&[
            "-c",
            path.to_str().unwrap(),
            "--tick",
            "20",
            "/cli/src",
        ]))
        .unwrap();
        assert_eq!(Some(Path::new("/cli/src")), config.source.as_deref());
        assert_eq!(Some(Path::new("/file/dst")), config.destination.as_deref());
        assert_eq!(ProgressMode::Periodic(20), config.progress_mode());
        assert_eq!(50, config.flush_interval());
    }

    #[test]
    fn bad_config_file() {
        let tmpdir = tempfile::TempDir::new().unwrap();
        let path = tmpdir.path().join("config.toml");
        fs::write(&path, "source = [").unwrap();
        assert_eq!(
            Err(EX_CONFIG),
            load_config(parse(&["-c", path.to_str().unwrap()])).map(|_| ())
        );

        let missing = tmpdir.path().join("nx.toml");
        assert_eq!(
            Err(EX_CONFIG),
            load_config(parse(&["-c", missing.to_str().unwrap()]))
                .map(|_| ())
        );
    }

    #[test]
    fn path_checks() {
        let tmpdir = tempfile::TempDir::new().unwrap();
        let src = tmpdir.path().join("src");
        let dst = tmpdir.path().join("a/b/dst");

        let mut config = ConvertConfig::default();
        assert_eq!(Err(EX_CONFIG), check_paths(&config).map(|_| ()));

        config.source = Some(src.clone());
        assert_eq!(Err(EX_CONFIG), check_paths(&config).map(|_| ()));

        fs::create_dir(&src).unwrap();
        assert_eq!(Err(EX_CONFIG), check_paths(&config).map(|_| ()));

        config.destination = Some(dst.clone());
        assert_eq!(
            Ok((src.as_path(), dst.as_path())),
            check_paths(&config)
        );
        assert!(dst.is_dir());
    }

    #[test]
    fn malformed_command_line() {
        assert!(Options::from_iter_safe(&["maildir-mbox", "--tick", "x"])
            .is_err());
        assert!(
            Options::from_iter_safe(&["maildir-mbox", "a", "b", "c"]).is_err()
        );
    }
}
