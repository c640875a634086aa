use clap::{value_parser, Arg, ArgMatches, Command};
use icotint::{Rebuilder, TintBand};
use std::path::PathBuf;
use std::process::ExitCode;

//===========================================================================//

fn main() -> ExitCode {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("warn"),
    )
    .init();
    let matches = Command::new("icotint")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Recolors orange hues to blue in ICO and PNG files")
        .arg(
            Arg::new("input")
                .required(true)
                .value_name("INPUT")
                .value_parser(value_parser!(PathBuf))
                .help("ICO or PNG file to read"),
        )
        .arg(
            Arg::new("output")
                .required(true)
                .value_name("OUTPUT")
                .value_parser(value_parser!(PathBuf))
                .help("Where to write the rebuilt file"),
        )
        .arg(hue_arg("low-hue", "Lowest hue that gets recolored [default: 15]"))
        .arg(hue_arg("high-hue", "Highest hue that gets recolored [default: 45]"))
        .arg(hue_arg("target-hue", "Hue given to recolored pixels [default: 195]"))
        .get_matches();

    let (input, output) = match (
        matches.get_one::<PathBuf>("input"),
        matches.get_one::<PathBuf>("output"),
    ) {
        (Some(input), Some(output)) => (input.clone(), output.clone()),
        _ => return ExitCode::FAILURE,
    };
    let result = tint_band(&matches)
        .and_then(|band| Rebuilder::new(band).rebuild_file(&input, &output));
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            log::error!("Failed to rebuild {:?}: {}", input, error);
            eprintln!("icotint: {}: {}", input.display(), error);
            ExitCode::FAILURE
        }
    }
}

fn hue_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .value_name("DEGREES")
        .value_parser(value_parser!(f32))
        .help(help)
}

fn tint_band(matches: &ArgMatches) -> icotint::Result<TintBand> {
    let defaults = TintBand::default();
    let hue = |name: &str, default: f32| {
        matches.get_one::<f32>(name).copied().unwrap_or(default)
    };
    TintBand::new(
        hue("low-hue", defaults.low_hue()),
        hue("high-hue", defaults.high_hue()),
        hue("target-hue", defaults.target_hue()),
    )
}

//===========================================================================//
