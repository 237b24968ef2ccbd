use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use ogham::build::build_site;
use ogham::config::Config;
use std::error::Error;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

fn main() {
    init_logging();

    let matches = App::new("ogham")
        .about("Builds a static blog from markdown posts")
        .version(env!("CARGO_PKG_VERSION"))
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(
            SubCommand::with_name("build")
                .about("Builds the site")
                .arg(
                    Arg::with_name("project")
                        .short("p")
                        .long("project")
                        .value_name("DIR")
                        .help("Directory in or below the project root [default: .]")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("output")
                        .short("o")
                        .long("output")
                        .value_name("DIR")
                        .help("Output directory [default: <project root>/_site]")
                        .takes_value(true),
                ),
        )
        .get_matches();

    let result = match matches.subcommand() {
        ("build", Some(matches)) => build(matches),
        _ => Ok(()),
    };

    if let Err(err) = result {
        let mut message = err.to_string();
        let mut source = err.source();
        while let Some(err) = source {
            message.push_str(": ");
            message.push_str(&err.to_string());
            source = err.source();
        }
        error!("{}", message);
        std::process::exit(1);
    }
}

fn build(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let project = PathBuf::from(matches.value_of("project").unwrap_or("."));
    let output = matches.value_of("output").map(Path::new);
    let config = Config::from_directory(&project, output)?;
    info!(output = %config.root_output_directory.display(), "building site");
    let summary = build_site(config)?;
    info!(posts = summary.posts, pages = summary.pages, "done");
    Ok(())
}

// Respects `RUST_LOG`, falling back to `info`.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}
