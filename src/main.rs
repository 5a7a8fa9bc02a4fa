use anyhow::{anyhow, Context, Result};
use clap::{arg, command, value_parser, ArgAction, ArgMatches, Command};
use httpglance::execute::{probe_urls, read_urls, show_burp_request, OutputFormat};
use httpglance::logging::init_logger;
use httpglance::options::{Options, DEFAULT_TIMEOUT_SECS};

fn options_from(matches: &ArgMatches) -> Options {
    Options {
        timeout: *matches.get_one::<u64>("timeout").unwrap_or(&DEFAULT_TIMEOUT_SECS),
        retry: *matches.get_one::<u32>("retry").unwrap_or(&0),
        headers: matches
            .get_many::<String>("header")
            .map(|values| values.cloned().collect())
            .unwrap_or_default(),
        debug: matches.get_flag("debug"),
        redirect: matches.get_flag("redirect"),
    }
}

fn output_format(matches: &ArgMatches) -> OutputFormat {
    if matches.get_flag("json") {
        OutputFormat::Json
    } else if matches.get_flag("headers-only") {
        OutputFormat::HeadersOnly
    } else {
        OutputFormat::Full
    }
}

fn main() -> Result<()> {
    let cmd = Command::new("httpglance")
        .author(clap::crate_authors!())
        .version(clap::crate_version!())
        .about(clap::crate_description!())
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            arg!(--debug)
                .help("Log what the client is doing")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .subcommand(
            command!("probe")
                .about("send a GET to one or more urls and print the raw response")
                .arg(
                    arg!(<URLS> "urls")
                        .help("urls to probe, or - to read them from stdin")
                        .required(true)
                        .value_parser(value_parser!(String))
                        .action(ArgAction::Append),
                )
                .arg(
                    arg!(-t --timeout <SECS>)
                        .help("Timeout in seconds for every phase of the request, 0 disables it")
                        .value_parser(value_parser!(u64))
                        .default_value("15"),
                )
                .arg(
                    arg!(-r --retry <COUNT>)
                        .help("Retry failed sends, only used together with --redirect")
                        .value_parser(value_parser!(u32))
                        .default_value("0"),
                )
                .arg(
                    arg!(-H --header <HEADER>)
                        .help("Extra \"Key: Value\" header - you can specify this argument multiple times")
                        .value_parser(value_parser!(String))
                        .action(ArgAction::Append),
                )
                .arg(
                    arg!(--redirect)
                        .help("Follow redirects instead of showing the first one")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"headers-only")
                        .help("Only print the status line and headers")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    arg!(--json)
                        .help("Print the response as json")
                        .conflicts_with("headers-only")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            command!("burp")
                .about("decode a base64 raw request saved from a proxy")
                .arg(
                    arg!(<REQUEST> "base64 request")
                        .required(true)
                        .value_parser(value_parser!(String)),
                )
                .arg(
                    arg!(--request)
                        .help("Print the whole decoded request instead of only its url")
                        .action(ArgAction::SetTrue),
                ),
        );

    let matches = cmd.get_matches();
    init_logger(matches.get_flag("debug")).context("while setting up logging")?;

    match matches.subcommand() {
        Some(("probe", matches)) => {
            let urls: Vec<String> = matches
                .get_many::<String>("URLS")
                .ok_or_else(|| anyhow!("no urls given"))?
                .cloned()
                .collect();
            let urls = if urls == ["-"] {
                read_urls(std::io::stdin().lock())?
            } else {
                urls
            };
            probe_urls(&options_from(matches), &urls, output_format(matches))
        }
        Some(("burp", matches)) => show_burp_request(
            matches
                .get_one::<String>("REQUEST")
                .ok_or_else(|| anyhow!("no request given"))?,
            matches.get_flag("request"),
        ),
        _ => unreachable!("this should've been prevented"),
    }
}
