use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use xmap::{CollapsePolicy, Evaluation, MapperError, XmlMapper};

/// Map XML documents to JSON records with a declarative mapping
#[derive(Parser, Debug)]
#[command(name = "xmap", version)]
#[command(about = "Map XML documents to JSON records with XPath binding rules", long_about = None)]
struct Args {
    /// JSON mapping definition
    #[arg(value_name = "MAPPING")]
    mapping: PathBuf,

    /// XML documents to map
    #[arg(value_name = "XML", required = true)]
    documents: Vec<PathBuf>,

    /// How multiple matches collapse: collect-all or strict-single
    #[arg(long, value_name = "POLICY")]
    policy: Option<CollapsePolicy>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Serialize)]
struct Output<'a> {
    document: String,
    #[serde(flatten)]
    evaluation: &'a Evaluation,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn load(args: &Args) -> Result<XmlMapper, MapperError> {
    let mut mapping = XmlMapper::load_mapping(&args.mapping)?;
    if let Some(policy) = args.policy {
        let config = mapping.config().clone().with_collapse(policy);
        mapping = mapping.with_config(config);
    }
    Ok(XmlMapper::new(mapping))
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let mapper = match load(&args) {
        Ok(mapper) => mapper,
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::from(2);
        }
    };

    let mut failed = false;
    let results = mapper.map_files_parallel(&args.documents);
    for (path, result) in args.documents.iter().zip(results) {
        match result {
            Ok(evaluation) => {
                let output = Output {
                    document: path.display().to_string(),
                    evaluation: &evaluation,
                };
                let json = if args.pretty {
                    serde_json::to_string_pretty(&output)
                } else {
                    serde_json::to_string(&output)
                };
                match json {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        log::error!("{}: cannot serialize result: {}", path.display(), e);
                        failed = true;
                    }
                }
            }
            Err(e) => {
                log::error!("{}: {}", path.display(), e);
                failed = true;
            }
        }
    }

    if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}
