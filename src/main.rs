//! odt2dita - ODT to DITA converter

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use odt2dita::{ConvertOptions, Severity, convert_file};

#[derive(Parser)]
#[command(name = "odt2dita")]
#[command(version, about = "Convert ODT documents to DITA topics", long_about = None)]
#[command(after_help = "EXAMPLES:
    odt2dita manual.odt out/           Convert into the out/ directory
    odt2dita -b uicontrol manual.odt out/
                                       Render bold runs as <uicontrol>")]
struct Cli {
    /// Input ODT file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output directory for the DITA files
    #[arg(value_name = "OUTDIR")]
    out_dir: PathBuf,

    /// Replace <b> with this tag in the output
    #[arg(short, long, value_name = "TAG")]
    bold_tag: Option<String>,

    /// Replace <i> with this tag in the output
    #[arg(short, long, value_name = "TAG")]
    italic_tag: Option<String>,

    /// Keep the first ordered list of a task in its context instead of
    /// rebuilding it into steps
    #[arg(long)]
    no_task_steps: bool,

    /// Do not prefix topic ids with their kind (c_, t_, r_)
    #[arg(long)]
    no_prefix: bool,

    /// Treat "antiqua" fonts as bold
    #[arg(long)]
    antiqua_bold: bool,

    /// Delete cross-references whose bookmark cannot be resolved
    #[arg(long)]
    delete_bad_links: bool,

    /// Treat every embedded object as a formula
    #[arg(long)]
    aggressive_formula: bool,

    /// Only print errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let opts = ConvertOptions {
        bold_tag: cli.bold_tag,
        italic_tag: cli.italic_tag,
        task_steps: !cli.no_task_steps,
        id_prefix: !cli.no_prefix,
        antiqua_is_bold: cli.antiqua_bold,
        delete_bad_links: cli.delete_bad_links,
        aggressive_formula: cli.aggressive_formula,
    };

    match convert_file(&cli.input, &cli.out_dir, &opts) {
        Ok(log) => {
            let min = if cli.quiet {
                Severity::Error
            } else {
                Severity::Info
            };
            eprint!("{}", log.render(min));
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
