use std::{
    ffi::OsString,
    io::ErrorKind as IoErrorKind,
    path::{Path, PathBuf},
    time::Duration,
};

use clap::{
    CommandFactory, FromArgMatches,
    error::{ErrorKind as ClapErrorKind, Result as ClapResult},
};
use serde::Deserialize;
use trellis_codegen_typescript::GeneratorConfig;
use trellis_core::load::SchemaLocator;

const DEFAULT_CONFIG_FILE: &str = "trellis.toml";
const DEFAULT_PERIOD_SECS: u64 = 30;

#[derive(Debug)]
pub struct Main {
    pub verbose: bool,
    pub command: Command,
}

impl Main {
    pub fn parse() -> ClapResult<Main> {
        Self::parse_from(std::env::args_os())
    }

    pub fn parse_from<I, T>(args: I) -> ClapResult<Main>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let mut cmd = MainArgs::command();
        let mut matches = cmd
            .try_get_matches_from_mut(args)
            .map_err(|err| err.format(&mut cmd))?;
        let args =
            MainArgs::from_arg_matches_mut(&mut matches).map_err(|err| err.format(&mut cmd))?;

        let command = match args.command {
            CommandArgs::Types(types) => {
                let (file, base) = match &types.config {
                    Some(path) => (read_config_file(&mut cmd, path, true)?, path.parent()),
                    None => {
                        let path = Path::new(DEFAULT_CONFIG_FILE);
                        (read_config_file(&mut cmd, path, false)?, None)
                    }
                };
                let file = file.unwrap_or_default();
                // Paths in a config file are relative to that file.
                let base = base.unwrap_or(Path::new(""));

                let schema = match (types.schema, file.schema) {
                    (Some(schema), _) => schema,
                    (None, Some(schema))
                        if schema.starts_with("http://") || schema.starts_with("https://") =>
                    {
                        schema
                    }
                    (None, Some(schema)) => base.join(schema).to_string_lossy().into_owned(),
                    (None, None) => {
                        return Err(cmd.error(
                            ClapErrorKind::MissingRequiredArgument,
                            "a schema is required; pass `--schema`, or set it in config",
                        ));
                    }
                };
                let schema: SchemaLocator = schema.parse().map_err(|err| {
                    cmd.error(
                        ClapErrorKind::ValueValidation,
                        format!("Invalid schema URL `{schema}`: {err}"),
                    )
                })?;

                let destination = match (types.destination, file.destination) {
                    (Some(destination), _) => destination,
                    (None, Some(destination)) => base.join(destination),
                    (None, None) => {
                        return Err(cmd.error(
                            ClapErrorKind::MissingRequiredArgument,
                            "a destination is required; pass `--destination`, or set it in config",
                        ));
                    }
                };

                let period = match types.period.or(file.period) {
                    Some(0) => {
                        return Err(cmd.error(
                            ClapErrorKind::ValueValidation,
                            "the polling period must be at least 1 second",
                        ));
                    }
                    Some(secs) => Duration::from_secs(secs),
                    None => Duration::from_secs(DEFAULT_PERIOD_SECS),
                };

                Command::Types(Types {
                    config: GeneratorConfig {
                        path: schema,
                        destination,
                    },
                    period,
                    once: types.once,
                })
            }
        };

        Ok(Main {
            verbose: args.verbose,
            command,
        })
    }
}

fn read_config_file(
    cmd: &mut clap::Command,
    path: &Path,
    required: bool,
) -> ClapResult<Option<ConfigFile>> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(Some(toml::from_str(&contents).map_err(|err| {
            cmd.error(
                ClapErrorKind::ValueValidation,
                format!("Failed to parse `{}`: {err}", path.display()),
            )
        })?)),
        Err(err) if err.kind() == IoErrorKind::NotFound && !required => Ok(None),
        Err(err) => Err(cmd.error(
            ClapErrorKind::Io,
            format!("Failed to read `{}`: {err}", path.display()),
        )),
    }
}

#[derive(Debug)]
pub enum Command {
    Types(Types),
}

#[derive(Debug)]
pub struct Types {
    pub config: GeneratorConfig,
    /// How often to poll a remote schema.
    pub period: Duration,
    /// Generate once, and exit.
    pub once: bool,
}

#[derive(Debug, clap::Parser)]
#[command(version, about, long_about = None)]
struct MainArgs {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: CommandArgs,
}

#[derive(Debug, clap::Subcommand)]
enum CommandArgs {
    /// Generate router types from an OpenAPI document, and regenerate
    /// them when the document changes.
    Types(TypesArgs),
}

#[derive(Debug, clap::Args)]
struct TypesArgs {
    /// The OpenAPI document: an `http(s)://` URL, or a path
    /// to a `.json` or `.yaml` file.
    #[arg(short, long)]
    schema: Option<String>,

    /// The generated declaration file.
    #[arg(short, long)]
    destination: Option<PathBuf>,

    /// How often to poll a remote schema, in seconds. Defaults to 30.
    #[arg(short, long)]
    period: Option<u64>,

    /// Generate once, and exit instead of watching for changes.
    #[arg(long)]
    once: bool,

    /// The config file. Defaults to `trellis.toml` in the current directory,
    /// if it exists.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    schema: Option<String>,
    #[serde(default)]
    destination: Option<PathBuf>,
    #[serde(default)]
    period: Option<u64>,
}
